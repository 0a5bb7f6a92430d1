//! Markdown section extraction.
//!
//! Pulls the document title (first `#` heading) and the `## Working Directory`,
//! `## Contents` and `## Acceptance Criteria` sections out of a body whose
//! frontmatter has already been stripped. One left-to-right pass over the
//! lines; headings inside fenced code blocks are ignored.

/// Heading text of the working-directory section.
pub const WORKING_DIRECTORY: &str = "Working Directory";
/// Heading text of the contents section.
pub const CONTENTS: &str = "Contents";
/// Heading text of the acceptance-criteria section.
pub const ACCEPTANCE_CRITERIA: &str = "Acceptance Criteria";

/// Semantic sections of a document. Missing sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub title: String,
    pub working_directory: String,
    pub contents: String,
    pub acceptance_criteria: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    WorkingDirectory,
    Contents,
    AcceptanceCriteria,
}

impl Kind {
    fn from_heading(text: &str) -> Option<Kind> {
        let t = text.trim();
        if t.eq_ignore_ascii_case(WORKING_DIRECTORY) {
            Some(Kind::WorkingDirectory)
        } else if t.eq_ignore_ascii_case(CONTENTS) {
            Some(Kind::Contents)
        } else if t.eq_ignore_ascii_case(ACCEPTANCE_CRITERIA) {
            Some(Kind::AcceptanceCriteria)
        } else {
            None
        }
    }
}

/// Parse an ATX heading: `## Title` → `(2, "Title")`.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_end();
    let level = trimmed.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    Some((level, rest.trim()))
}

/// `true` for lines opening or closing a fenced code block.
pub fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Extract all sections from `body`.
pub fn extract(body: &str) -> Sections {
    let mut sections = Sections::default();
    let mut title_seen = false;
    let mut in_fence = false;
    let mut current: Option<(Kind, usize)> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        let heading = if in_fence || is_fence(line) {
            None
        } else {
            parse_heading(line)
        };

        let Some((level, text)) = heading else {
            if current.is_some() {
                buffer.push(line);
            }
            continue;
        };

        if let Some((kind, open_level)) = current {
            if level <= open_level {
                store(&mut sections, kind, &buffer);
                buffer.clear();
                current = None;
            } else {
                buffer.push(line);
                continue;
            }
        }

        if level == 1 && !title_seen {
            sections.title = text.to_string();
            title_seen = true;
            continue;
        }

        if level >= 2 {
            if let Some(kind) = Kind::from_heading(text) {
                if slot(&sections, kind).is_empty() {
                    current = Some((kind, level));
                }
            }
        }
    }

    if let Some((kind, _)) = current {
        store(&mut sections, kind, &buffer);
    }
    sections
}

fn slot(sections: &Sections, kind: Kind) -> &str {
    match kind {
        Kind::WorkingDirectory => &sections.working_directory,
        Kind::Contents => &sections.contents,
        Kind::AcceptanceCriteria => &sections.acceptance_criteria,
    }
}

fn store(sections: &mut Sections, kind: Kind, lines: &[&str]) {
    let text = trim_blank_lines(&lines.join("\n"));
    match kind {
        Kind::WorkingDirectory => sections.working_directory = text,
        Kind::Contents => sections.contents = text,
        Kind::AcceptanceCriteria => sections.acceptance_criteria = text,
    }
}

/// Drop leading and trailing whitespace-only lines, keeping inner text as-is.
pub fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(s), Some(e)) => lines[s..=e].join("\n"),
        _ => String::new(),
    }
}

/// Body with the first `#` title heading removed, for documents that carry no
/// recognised sections.
pub fn body_without_title(body: &str) -> String {
    let mut removed = false;
    let mut in_fence = false;
    let mut kept: Vec<&str> = Vec::new();
    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        if !removed && !in_fence && matches!(parse_heading(line), Some((1, _))) {
            removed = true;
            continue;
        }
        kept.push(line);
    }
    trim_blank_lines(&kept.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Test Feature

Intro paragraph.

## Working Directory

/srv/app

## Contents

Some content.

### Details

Nested detail.

## Acceptance Criteria

- [ ] works
- [ ] tested

## Notes

ignored
";

    #[test]
    fn extracts_all_sections() {
        let s = extract(DOC);
        assert_eq!(s.title, "Test Feature");
        assert_eq!(s.working_directory, "/srv/app");
        assert_eq!(s.contents, "Some content.\n\n### Details\n\nNested detail.");
        assert_eq!(s.acceptance_criteria, "- [ ] works\n- [ ] tested");
    }

    #[test]
    fn missing_sections_are_empty() {
        let s = extract("just text\n");
        assert_eq!(s, Sections::default());
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let s = extract("## CONTENTS\nx\n## acceptance criteria\ny\n");
        assert_eq!(s.contents, "x");
        assert_eq!(s.acceptance_criteria, "y");
    }

    #[test]
    fn headings_in_code_fences_are_ignored() {
        let s = extract("## Contents\n```\n## Acceptance Criteria\n```\nafter\n");
        assert_eq!(s.contents, "```\n## Acceptance Criteria\n```\nafter");
        assert!(s.acceptance_criteria.is_empty());
    }

    #[test]
    fn title_heading_closes_open_section() {
        let s = extract("## Contents\nfirst\n# Late Title\nafter\n");
        assert_eq!(s.contents, "first");
        assert_eq!(s.title, "Late Title");
    }

    #[test]
    fn parse_heading_requires_space() {
        assert_eq!(parse_heading("## Contents"), Some((2, "Contents")));
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading("#"), Some((1, "")));
    }

    #[test]
    fn body_without_title_drops_first_h1() {
        assert_eq!(body_without_title("# T\n\nline one\n\nline two\n"), "line one\n\nline two");
    }

    #[test]
    fn trim_blank_lines_keeps_inner_blank_lines() {
        assert_eq!(trim_blank_lines("\n  \na\n\nb\n \n"), "a\n\nb");
        assert_eq!(trim_blank_lines(" \n\n"), "");
    }
}
