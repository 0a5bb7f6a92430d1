//! Frontmatter codec.
//!
//! A document may open with a `---` delimited YAML block of scalar key/value
//! pairs:
//!
//! ```text
//! ---
//! github_issue: 42
//! owner: alice
//! ---
//! # Title
//! ```
//!
//! Reading is best-effort: [`parse`] never fails and treats a malformed block
//! as absent. Mutation ([`set_key`], [`remove_key`]) is parse, edit,
//! serialize, so a malformed opening block (often a `---` thematic break) is
//! kept as body text and a fresh block goes in front of it.

use std::fmt;

use serde_yaml::Value;

use crate::error::FrontmatterError;

/// Frontmatter key holding the linked tracker issue number.
pub const LINK_KEY: &str = "github_issue";

const DELIMITER: &str = "---";

/// A single scalar frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Integer(i64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontmatterValue::Integer(i) => write!(f, "{i}"),
            FrontmatterValue::String(s) => f.write_str(s),
            FrontmatterValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for FrontmatterValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<u64> for FrontmatterValue {
    fn from(v: u64) -> Self {
        Self::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<bool> for FrontmatterValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for FrontmatterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Insertion-ordered key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FrontmatterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FrontmatterValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Linked issue number, if the link key holds a positive integer.
    pub fn github_issue(&self) -> Option<u64> {
        match self.get(LINK_KEY)? {
            FrontmatterValue::Integer(n) if *n > 0 => u64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<FrontmatterValue>> FromIterator<(K, V)> for Frontmatter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fm = Frontmatter::new();
        for (k, v) in iter {
            fm.insert(k, v);
        }
        fm
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `text` into frontmatter and body.
///
/// Returns `Ok(None)` when the text has no frontmatter block at all, and an
/// error when a block is present but malformed.
pub fn try_parse(text: &str) -> Result<Option<(Frontmatter, &str)>, FrontmatterError> {
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if strip_eol(first) != DELIMITER {
        return Ok(None);
    }

    let mut offset = first.len();
    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut closed = false;
    for line in lines {
        offset += line.len();
        if strip_eol(line).trim_end() == DELIMITER {
            closed = true;
            break;
        }
        yaml_lines.push(strip_eol(line));
    }
    if !closed {
        return Err(FrontmatterError::Malformed {
            reason: "missing closing delimiter".to_string(),
        });
    }

    let yaml = yaml_lines.join("\n");
    let value: Value = serde_yaml::from_str(&yaml).map_err(|e| FrontmatterError::Malformed {
        reason: e.to_string(),
    })?;
    let fm = match value {
        Value::Null => Frontmatter::new(),
        Value::Mapping(mapping) => {
            let mut fm = Frontmatter::new();
            for (key, value) in mapping {
                let key = scalar_key(key)?;
                let value = scalar_value(&key, value)?;
                fm.insert(key, value);
            }
            fm
        }
        _ => {
            return Err(FrontmatterError::Malformed {
                reason: "frontmatter is not a key/value mapping".to_string(),
            })
        }
    };

    Ok(Some((fm, &text[offset..])))
}

/// Best-effort split. A malformed block yields an empty map and the original
/// text unchanged.
pub fn parse(text: &str) -> (Frontmatter, String) {
    match try_parse(text) {
        Ok(Some((fm, body))) => (fm, body.to_string()),
        Ok(None) | Err(_) => (Frontmatter::new(), text.to_string()),
    }
}

/// Body without any (well-formed) frontmatter block.
pub fn strip(text: &str) -> &str {
    match try_parse(text) {
        Ok(Some((_, body))) => body,
        Ok(None) | Err(_) => text,
    }
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

fn scalar_key(key: Value) -> Result<String, FrontmatterError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(FrontmatterError::Malformed {
            reason: "non-scalar key".to_string(),
        }),
    }
}

fn scalar_value(key: &str, value: Value) -> Result<FrontmatterValue, FrontmatterError> {
    match value {
        Value::Bool(b) => Ok(FrontmatterValue::Boolean(b)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => FrontmatterValue::Integer(i),
            None => FrontmatterValue::String(n.to_string()),
        }),
        Value::String(s) => {
            // Hand-edited links are often quoted: `github_issue: "42"`.
            if key == LINK_KEY {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Ok(FrontmatterValue::Integer(i));
                }
            }
            Ok(FrontmatterValue::String(s))
        }
        Value::Null => Ok(FrontmatterValue::String(String::new())),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
            Err(FrontmatterError::Malformed {
                reason: format!("value of '{key}' is not a scalar"),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Prepend `fm` to `body`. An empty map returns `body` unchanged.
pub fn serialize(fm: &Frontmatter, body: &str) -> String {
    if fm.is_empty() {
        return body.to_string();
    }
    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in fm.iter() {
        out.push_str(&render_string(key));
        out.push_str(": ");
        match value {
            FrontmatterValue::Integer(i) => out.push_str(&i.to_string()),
            FrontmatterValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            FrontmatterValue::String(s) => out.push_str(&render_string(s)),
        }
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out
}

/// YAML scalar rendering of a string, quoted where YAML would otherwise
/// reinterpret it (`'42'`, `'true'`, `''`).
fn render_string(s: &str) -> String {
    match serde_yaml::to_string(&Value::String(s.to_string())) {
        Ok(rendered) => rendered.trim_end_matches('\n').to_string(),
        Err(_) => format!("{s:?}"),
    }
}

// ---------------------------------------------------------------------------
// Single-key mutation
// ---------------------------------------------------------------------------

/// Set `key` to `value`, creating the block if the text has none.
pub fn set_key(text: &str, key: &str, value: impl Into<FrontmatterValue>) -> String {
    let (mut fm, body) = parse(text);
    fm.insert(key, value);
    serialize(&fm, &body)
}

/// Remove `key`. Removing the last key drops the block entirely; text without
/// a well-formed block comes back unchanged.
pub fn remove_key(text: &str, key: &str) -> String {
    match try_parse(text) {
        Ok(Some((mut fm, body))) => {
            fm.remove(key);
            serialize(&fm, body)
        }
        Ok(None) | Err(_) => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
