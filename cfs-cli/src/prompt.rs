//! Terminal prompts: the `Interaction` adapter used by `cfs sync`.
//!
//! Prompts go to stderr so stdout stays clean for results.

use std::io::{self, BufRead, IsTerminal, Write};

use colored::Colorize;

use cfs_core::Category;
use cfs_sync::{diff, Conflict, Interaction, Resolution};

/// `true` when both stdin and stderr are attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Read one line from stdin. `None` on EOF or read error.
fn read_answer(question: &str) -> Option<String> {
    eprint!("{question} ");
    io::stderr().flush().ok();
    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

/// Yes/no question, defaulting to no.
pub fn confirm(question: &str) -> bool {
    read_answer(&format!("{question} [y/N]"))
        .map(|a| matches!(a.to_ascii_lowercase().as_str(), "y" | "yes"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Answer parsing
// ---------------------------------------------------------------------------

/// Parsed answer to the category question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryAnswer {
    Pick(Category),
    Skip,
    Invalid,
}

/// Accepts a 1-based index into `candidates`, a category name, or `s`/`skip`
/// (empty input also skips).
pub fn parse_category_answer(input: &str, candidates: &[Category]) -> CategoryAnswer {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("s") || input.eq_ignore_ascii_case("skip") {
        return CategoryAnswer::Skip;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(c) => CategoryAnswer::Pick(*c),
            None => CategoryAnswer::Invalid,
        };
    }
    match input.parse::<Category>() {
        Ok(c) if candidates.contains(&c) => CategoryAnswer::Pick(c),
        _ => CategoryAnswer::Invalid,
    }
}

/// Parsed answer to the conflict question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAnswer {
    Resolve(Resolution),
    Abort,
    Invalid,
}

pub fn parse_conflict_answer(input: &str) -> ConflictAnswer {
    match input.trim().to_ascii_lowercase().as_str() {
        "l" | "local" => ConflictAnswer::Resolve(Resolution::Local),
        "r" | "remote" => ConflictAnswer::Resolve(Resolution::Remote),
        "s" | "skip" | "" => ConflictAnswer::Resolve(Resolution::Skip),
        "a" | "abort" | "q" | "quit" => ConflictAnswer::Abort,
        _ => ConflictAnswer::Invalid,
    }
}

// ---------------------------------------------------------------------------
// Interaction adapter
// ---------------------------------------------------------------------------

/// Line-oriented prompts on the controlling terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            interactive: is_interactive(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn select_category(&mut self, title: &str, candidates: &[Category]) -> Option<Category> {
        if !self.interactive {
            return None;
        }
        eprintln!();
        eprintln!("Issue {} has no cfs: label.", title.bold());
        for (i, c) in candidates.iter().enumerate() {
            eprintln!("  {}) {c}", i + 1);
        }
        loop {
            let answer = read_answer("Category number or name, [s]kip:")?;
            match parse_category_answer(&answer, candidates) {
                CategoryAnswer::Pick(c) => return Some(c),
                CategoryAnswer::Skip => return None,
                CategoryAnswer::Invalid => eprintln!("{}", "Not a listed category.".yellow()),
            }
        }
    }

    fn resolve_conflict(&mut self, conflict: &Conflict) -> Option<Resolution> {
        eprintln!();
        eprintln!(
            "{} {} ↔ #{} {}",
            "Conflict:".red().bold(),
            conflict.document,
            conflict.issue.number,
            conflict.issue.title
        );
        eprint!("{}", diff::render_conflict(conflict));
        loop {
            let answer = read_answer("Keep [l]ocal, [r]emote, [s]kip, or [a]bort?")?;
            match parse_conflict_answer(&answer) {
                ConflictAnswer::Resolve(r) => return Some(r),
                ConflictAnswer::Abort => return None,
                ConflictAnswer::Invalid => eprintln!("{}", "Answer l, r, s or a.".yellow()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &[Category] = &[Category::Features, Category::Fixes, Category::Ideas];

    #[test]
    fn category_by_index_or_name() {
        assert_eq!(
            parse_category_answer("2", CANDIDATES),
            CategoryAnswer::Pick(Category::Fixes)
        );
        assert_eq!(
            parse_category_answer(" Ideas ", CANDIDATES),
            CategoryAnswer::Pick(Category::Ideas)
        );
        assert_eq!(parse_category_answer("", CANDIDATES), CategoryAnswer::Skip);
        assert_eq!(parse_category_answer("skip", CANDIDATES), CategoryAnswer::Skip);
    }

    #[test]
    fn category_out_of_range_or_unlisted() {
        assert_eq!(parse_category_answer("0", CANDIDATES), CategoryAnswer::Invalid);
        assert_eq!(parse_category_answer("4", CANDIDATES), CategoryAnswer::Invalid);
        assert_eq!(parse_category_answer("docs", CANDIDATES), CategoryAnswer::Invalid);
        assert_eq!(parse_category_answer("wat", CANDIDATES), CategoryAnswer::Invalid);
    }

    #[test]
    fn conflict_answers() {
        assert_eq!(
            parse_conflict_answer("L"),
            ConflictAnswer::Resolve(Resolution::Local)
        );
        assert_eq!(
            parse_conflict_answer("remote"),
            ConflictAnswer::Resolve(Resolution::Remote)
        );
        assert_eq!(
            parse_conflict_answer(""),
            ConflictAnswer::Resolve(Resolution::Skip)
        );
        assert_eq!(parse_conflict_answer("a"), ConflictAnswer::Abort);
        assert_eq!(parse_conflict_answer("x"), ConflictAnswer::Invalid);
    }
}
