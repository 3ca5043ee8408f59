//! Structural block detection.
//!
//! Classifies a document's lines into blocks with a [`StructuralRole`]:
//!
//! | Role | Detected from |
//! |------|---------------|
//! | Heading | `# Title`, `2.1 Scope`, `3 Results`, short ALL-CAPS or Title Case line followed by a longer body line |
//! | CodeBlock | ```` ``` ```` / `~~~` fences (unclosed runs to the end), or 4-space/tab indentation after a blank line |
//! | Table | two or more consecutive lines with ≥ 2 `\|` or ≥ 2 tab separators |
//! | List | `-`, `*`, `+`, `•`, `1.`, `1)` items plus their continuation lines |
//! | Content | everything else, grouped into paragraphs |
//!
//! Blocks are ordered, never overlap, and are trimmed of surrounding
//! whitespace. Blank lines separate blocks; inside a fence they do not.

use std::sync::LazyLock;

use regex::Regex;

use crate::span::{char_len, Span};
use crate::StructuralRole;

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+\S").expect("valid markdown heading regex"));

static NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+(?:\.\d+)+\.?|\d+)\s+\p{Lu}").expect("valid numbered heading regex")
});

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+•]|\d{1,3}[.)])\s+\S").expect("valid list item regex")
});

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(?:```|~~~)").expect("valid code fence regex"));

/// Longest line that can still be a heading, in chars.
const MAX_HEADING_CHARS: usize = 80;

/// Longest ALL-CAPS or Title Case line treated as a heading, in chars.
const MAX_CAPTION_HEADING_CHARS: usize = 60;

/// Words allowed in lowercase inside a Title Case heading.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// A run of lines sharing one structural role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Trimmed byte span of the block.
    pub span: Span,
    /// What the block is.
    pub role: StructuralRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    Fence,
    Heading,
    TableRow,
    ListItem,
    Indented,
    Text,
}

fn ends_like_sentence(line: &str) -> bool {
    line.trim_end()
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '。'))
}

fn is_table_row(line: &str) -> bool {
    let cells = line.trim().split('\t').filter(|cell| !cell.trim().is_empty()).count();
    line.matches('|').count() >= 2 || cells >= 3
}

fn is_indented(line: &str) -> bool {
    line.starts_with("    ") || line.starts_with('\t')
}

/// Whether `line` is a short ALL-CAPS or Title Case caption.
fn is_caption(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || char_len(line) > MAX_CAPTION_HEADING_CHARS || ends_like_sentence(line) {
        return false;
    }

    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase()) {
        return true;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    words.len() >= 2
        && words.len() <= 10
        && words.iter().enumerate().all(|(i, word)| {
            let Some(first) = word.chars().find(|c| c.is_alphanumeric()) else {
                return true;
            };
            first.is_uppercase()
                || first.is_numeric()
                || (i > 0 && MINOR_WORDS.contains(&word.to_lowercase().as_str()))
        })
}

/// Whether the line is a heading by its own shape, without context.
fn is_explicit_heading(line: &str) -> bool {
    if MARKDOWN_HEADING.is_match(line) {
        return true;
    }
    let trimmed = line.trim();
    NUMBERED_HEADING.is_match(trimmed)
        && char_len(trimmed) <= MAX_HEADING_CHARS
        && !ends_like_sentence(trimmed)
}

fn classify(lines: &[(usize, &str)], i: usize) -> LineKind {
    let line = lines[i].1;
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if FENCE.is_match(line) {
        return LineKind::Fence;
    }
    if is_explicit_heading(line) {
        return LineKind::Heading;
    }
    if is_table_row(line) {
        return LineKind::TableRow;
    }
    if LIST_ITEM.is_match(line) {
        return LineKind::ListItem;
    }
    if is_indented(line) {
        return LineKind::Indented;
    }
    if is_caption(line) {
        let body = lines[i + 1..]
            .iter()
            .map(|(_, l)| l.trim())
            .find(|l| !l.is_empty());
        if body.is_some_and(|b| char_len(b) > char_len(line.trim()) && !is_caption(b)) {
            return LineKind::Heading;
        }
    }
    LineKind::Text
}

/// An open run of lines being grouped into one block.
struct Group {
    start: usize,
    end: usize,
    role: StructuralRole,
    lines: usize,
}

fn flush(text: &str, group: &mut Option<Group>, blocks: &mut Vec<Block>) {
    let Some(group) = group.take() else {
        return;
    };
    // A lone pipe line is prose that happens to contain pipes
    let role = if group.role == StructuralRole::Table && group.lines < 2 {
        StructuralRole::Content
    } else {
        group.role
    };
    if let Some(span) = Span::new(group.start, group.end).trim(text) {
        blocks.push(Block { span, role });
    }
}

/// Split `text` into structural blocks.
///
/// ```rust
/// use quarry::structure::blocks;
/// use quarry::StructuralRole;
///
/// let text = "# Setup\n\nInstall it.\n\n```\ncargo build\n```\n";
/// let roles: Vec<StructuralRole> = blocks(text).iter().map(|b| b.role).collect();
/// assert_eq!(
///     roles,
///     vec![StructuralRole::Heading, StructuralRole::Content, StructuralRole::CodeBlock]
/// );
/// ```
#[must_use]
pub fn blocks(text: &str) -> Vec<Block> {
    let mut offset = 0;
    let lines: Vec<(usize, &str)> = text
        .split_inclusive('\n')
        .map(|line| {
            let start = offset;
            offset += line.len();
            (start, line)
        })
        .collect();

    let mut blocks = Vec::new();
    let mut group: Option<Group> = None;
    let mut i = 0;

    while i < lines.len() {
        let (start, line) = lines[i];
        let end = start + line.len();

        match classify(&lines, i) {
            LineKind::Blank => flush(text, &mut group, &mut blocks),
            LineKind::Fence => {
                flush(text, &mut group, &mut blocks);
                let close = (i + 1..lines.len())
                    .find(|&j| FENCE.is_match(lines[j].1))
                    .unwrap_or(lines.len() - 1);
                let (close_start, close_line) = lines[close];
                group = Some(Group {
                    start,
                    end: close_start + close_line.len(),
                    role: StructuralRole::CodeBlock,
                    lines: close - i + 1,
                });
                flush(text, &mut group, &mut blocks);
                i = close;
            }
            LineKind::Heading => {
                flush(text, &mut group, &mut blocks);
                group = Some(Group {
                    start,
                    end,
                    role: StructuralRole::Heading,
                    lines: 1,
                });
                flush(text, &mut group, &mut blocks);
            }
            kind => {
                let current = group.as_ref().map(|g| g.role);
                let role = match (kind, current) {
                    (LineKind::TableRow, _) => StructuralRole::Table,
                    (LineKind::ListItem, _) => StructuralRole::List,
                    (LineKind::Indented | LineKind::Text, Some(StructuralRole::List)) => {
                        StructuralRole::List
                    }
                    (LineKind::Indented, None | Some(StructuralRole::CodeBlock)) => {
                        StructuralRole::CodeBlock
                    }
                    _ => StructuralRole::Content,
                };

                match group.as_mut() {
                    Some(g) if g.role == role => {
                        g.end = end;
                        g.lines += 1;
                    }
                    _ => {
                        flush(text, &mut group, &mut blocks);
                        group = Some(Group {
                            start,
                            end,
                            role,
                            lines: 1,
                        });
                    }
                }
            }
        }
        i += 1;
    }
    flush(text, &mut group, &mut blocks);

    blocks
}

/// Whether the text contains at least one heading.
#[must_use]
pub fn has_headings(text: &str) -> bool {
    blocks(text)
        .iter()
        .any(|block| block.role == StructuralRole::Heading)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(text: &str) -> Vec<(StructuralRole, &str)> {
        blocks(text)
            .iter()
            .map(|b| (b.role, b.span.slice(text)))
            .collect()
    }

    #[test]
    fn test_markdown_and_numbered_headings() {
        let text = "# Overview\nIntro text here.\n\n2.1 Scope of Work\nDetails follow.";
        let found = roles(text);
        assert_eq!(found[0], (StructuralRole::Heading, "# Overview"));
        assert_eq!(found[1], (StructuralRole::Content, "Intro text here."));
        assert_eq!(found[2], (StructuralRole::Heading, "2.1 Scope of Work"));
    }

    #[test]
    fn test_caption_heading_needs_body() {
        let text = "INTRODUCTION\nThis section explains the overall goals of the work.";
        assert_eq!(roles(text)[0].0, StructuralRole::Heading);

        // Same line with nothing after it is not a heading
        assert_eq!(roles("INTRODUCTION")[0].0, StructuralRole::Content);
    }

    #[test]
    fn test_title_case_heading() {
        let text = "Results and Discussion\n\nWe measured throughput across three clusters.";
        assert_eq!(roles(text)[0].0, StructuralRole::Heading);
    }

    #[test]
    fn test_sentence_is_not_heading() {
        let text = "Short Sentence Here.\nAnd a longer line of body text follows it.";
        assert_eq!(roles(text)[0].0, StructuralRole::Content);
    }

    #[test]
    fn test_fenced_code_spans_blank_lines() {
        let text = "Intro.\n\n```rust\nfn main() {\n\n    run();\n}\n```\nAfter.";
        let found = roles(text);
        assert_eq!(found[1].0, StructuralRole::CodeBlock);
        assert!(found[1].1.starts_with("```rust"));
        assert!(found[1].1.ends_with("```"));
        assert_eq!(found[2], (StructuralRole::Content, "After."));
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let text = "```\nlet x = 1;\n\nlet y = 2;";
        let found = roles(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, StructuralRole::CodeBlock);
    }

    #[test]
    fn test_indented_code_after_blank_line() {
        let text = "Example:\n\n    let x = 1;\n    let y = 2;\n\nDone.";
        let found = roles(text);
        assert_eq!(found[1].0, StructuralRole::CodeBlock);
        assert_eq!(found[2].0, StructuralRole::Content);
    }

    #[test]
    fn test_tables() {
        let text = "| a | b |\n|---|---|\n| 1 | 2 |\n\nname\tqty\tprice\npen\t2\t1.50";
        let found = roles(text);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(role, _)| *role == StructuralRole::Table));
    }

    #[test]
    fn test_single_pipe_line_is_content() {
        let found = roles("Use a | b | c to pipe output.");
        assert_eq!(found[0].0, StructuralRole::Content);
    }

    #[test]
    fn test_lists_with_continuations() {
        let text = "- first item\n  continues here\n- second item\n1. numbered\n\nProse.";
        let found = roles(text);
        assert_eq!(found[0].0, StructuralRole::List);
        assert!(found[0].1.ends_with("numbered"));
        assert_eq!(found[1].0, StructuralRole::Content);
    }

    #[test]
    fn test_has_headings() {
        assert!(has_headings("## Usage\nRun it."));
        assert!(!has_headings("Just prose. Nothing else."));
    }
}
