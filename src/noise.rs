//! Running header/footer removal.
//!
//! ## The Problem
//!
//! Text extracted from paginated formats repeats the same lines on every
//! page: document titles, confidentiality banners, "Page 3 of 12". Left in,
//! they land in the middle of chunks and pollute every embedding.
//!
//! ## The Approach
//!
//! Each line is normalised so that lines differing only in page numbers,
//! dates, or other digits collapse to one key:
//!
//! ```text
//! "ACME Corp - Page 3 of 12"   -> "ACME Corp - <PAGE>"
//! "ACME Corp - Page 4 of 12"   -> "ACME Corp - <PAGE>"
//! "Report 2024-03-01"          -> "Report <DATE>"
//! "第3页" / "3페이지" / "Seite3" -> "<PAGE>"
//! ```
//!
//! A key seen on at least `repetition_threshold` of the pages (and at least
//! twice) is a running header. Long lines are assumed to be content and are
//! never removed; blank lines are always kept because they separate
//! paragraphs downstream.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::span::char_len;
use crate::{Error, Result};

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[-./]\d{1,2}[-./]\d{1,2}\b|\b\d{1,2}[-./]\d{1,2}[-./]\d{2,4}\b")
        .expect("valid date regex")
});

static PAGE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:page|seite|pagina|página|p\.)\s*\d+(?:\s*(?:of|von|de|/)\s*\d+)?",
        r"|\d+\s*페이지",
        r"|第\s*\d+\s*[页頁]",
        r"|\b\d+\s*/\s*\d+\b",
    ))
    .expect("valid page marker regex")
});

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Normalise a line into its repetition key.
///
/// ```rust
/// use quarry::noise::normalize_line;
///
/// assert_eq!(normalize_line("  Page 7 of 9 "), "<PAGE>");
/// assert_eq!(normalize_line("Draft v12"), normalize_line("Draft v13"));
/// ```
#[must_use]
pub fn normalize_line(line: &str) -> String {
    let line = DATE.replace_all(line.trim(), "<DATE>");
    let line = PAGE_MARKER.replace_all(&line, "<PAGE>");
    let line = DIGITS.replace_all(&line, "<NUM>");
    WHITESPACE.replace_all(&line, " ").into_owned()
}

/// Noise filter configuration.
///
/// Serde-deserialisable so a host can load it from its own config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFilterConfig {
    /// Master switch.
    pub enabled: bool,
    /// Documents with fewer pages are never filtered.
    pub min_page_count: usize,
    /// Lines longer than this many chars are content, never noise.
    pub max_line_length: usize,
    /// Minimum `occurrences / page_count` for a line to count as repeating.
    pub repetition_threshold: f64,
    /// Lines matching any of these regexes are never removed.
    pub preserve_patterns: Vec<String>,
    /// Lines matching any of these regexes are removed even if they do not repeat.
    pub remove_patterns: Vec<String>,
}

impl Default for NoiseFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_page_count: 3,
            max_line_length: 200,
            repetition_threshold: 0.5,
            preserve_patterns: Vec::new(),
            remove_patterns: Vec::new(),
        }
    }
}

impl NoiseFilterConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the threshold is outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if !(self.repetition_threshold > 0.0 && self.repetition_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "repetition_threshold {} must be in (0, 1]",
                self.repetition_threshold
            )));
        }
        Ok(())
    }
}

/// A repeating line found by [`NoiseFilter::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatingLine {
    /// The normalised key shared by all occurrences.
    pub key: String,
    /// The first raw occurrence, trimmed.
    pub sample: String,
    /// How many lines normalise to `key`.
    pub occurrences: usize,
    /// `occurrences / page_count`.
    pub ratio: f64,
    /// Whether [`NoiseFilter::filter`] would remove these lines.
    pub would_be_filtered: bool,
}

/// Removes running headers and footers from paginated text.
///
/// ## Example
///
/// ```rust
/// use quarry::NoiseFilter;
///
/// let bodies = ["Intro.", "Method.", "Results.", "Outlook."];
/// let pages: Vec<String> = bodies
///     .iter()
///     .enumerate()
///     .map(|(i, body)| format!("ACME Corp\n{body}\nPage {} of 4\n", i + 1))
///     .collect();
/// let text = pages.concat();
///
/// let filter = NoiseFilter::default();
/// let filtered = filter.filter(&text, 4);
/// assert!(!filtered.contains("ACME Corp"));
/// assert!(!filtered.contains("Page 2 of 4"));
/// assert!(filtered.contains("Method."));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    config: NoiseFilterConfig,
    preserve: Vec<Regex>,
    remove: Vec<Regex>,
}

/// One physical line and its place in the text.
struct Line<'a> {
    start: usize,
    /// The line including its terminator.
    full: &'a str,
    /// The line without its terminator, trimmed.
    body: &'a str,
}

fn lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|full| {
            let line = Line {
                start: offset,
                full,
                body: full.trim(),
            };
            offset += full.len();
            line
        })
        .collect()
}

fn compile_patterns(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(%pattern, %err, "skipping invalid noise filter pattern");
                None
            }
        })
        .collect()
}

impl NoiseFilter {
    /// Build a filter from its configuration.
    ///
    /// Invalid regexes in the pattern lists are skipped, not fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration values are out of range.
    pub fn new(config: NoiseFilterConfig) -> Result<Self> {
        config.validate()?;
        let preserve = compile_patterns(&config.preserve_patterns);
        let remove = compile_patterns(&config.remove_patterns);
        Ok(Self {
            config,
            preserve,
            remove,
        })
    }

    /// A filter that never removes anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            config: NoiseFilterConfig {
                enabled: false,
                ..NoiseFilterConfig::default()
            },
            preserve: Vec::new(),
            remove: Vec::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &NoiseFilterConfig {
        &self.config
    }

    fn is_active(&self, page_count: usize) -> bool {
        self.config.enabled && page_count >= self.config.min_page_count
    }

    fn count_keys(lines: &[Line<'_>]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for line in lines.iter().filter(|l| !l.body.is_empty()) {
            *counts.entry(normalize_line(line.body)).or_insert(0) += 1;
        }
        counts
    }

    fn is_repeating(&self, occurrences: usize, page_count: usize) -> bool {
        occurrences >= 2
            && occurrences as f64 / page_count as f64 >= self.config.repetition_threshold
    }

    fn should_remove(&self, body: &str, occurrences: usize, page_count: usize) -> bool {
        if body.is_empty() || char_len(body) > self.config.max_line_length {
            return false;
        }
        if self.preserve.iter().any(|re| re.is_match(body)) {
            return false;
        }
        self.is_repeating(occurrences, page_count) || self.remove.iter().any(|re| re.is_match(body))
    }

    /// Per-line removal decisions, or `None` when the filter is inactive.
    fn plan(&self, lines: &[Line<'_>], page_count: usize) -> Option<Vec<bool>> {
        if !self.is_active(page_count) {
            return None;
        }
        let counts = Self::count_keys(lines);
        let removals: Vec<bool> = lines
            .iter()
            .map(|line| {
                let occurrences = if line.body.is_empty() {
                    0
                } else {
                    counts.get(&normalize_line(line.body)).copied().unwrap_or(0)
                };
                self.should_remove(line.body, occurrences, page_count)
            })
            .collect();

        let removed = removals.iter().filter(|&&r| r).count();
        debug!(lines = lines.len(), removed, page_count, "noise filter pass");
        (removed > 0).then_some(removals)
    }

    /// Remove repeating lines from `text`, which spans `page_count` pages.
    ///
    /// Returns the input unchanged (borrowed) when the filter is disabled,
    /// the document is too short, or nothing repeats.
    #[must_use]
    pub fn filter<'a>(&self, text: &'a str, page_count: usize) -> Cow<'a, str> {
        let lines = lines(text);
        match self.plan(&lines, page_count) {
            None => Cow::Borrowed(text),
            Some(removals) => Cow::Owned(
                lines
                    .iter()
                    .zip(&removals)
                    .filter(|(_, &removed)| !removed)
                    .map(|(line, _)| line.full)
                    .collect(),
            ),
        }
    }

    /// Filter paginated text and move each page start onto the filtered text.
    ///
    /// `page_starts` must be sorted byte offsets into `text`. A page whose
    /// lines were all removed keeps a start equal to the next page's start.
    #[must_use]
    pub fn filter_pages(&self, text: &str, page_starts: &[usize]) -> (String, Vec<usize>) {
        let lines = lines(text);
        let Some(removals) = self.plan(&lines, page_starts.len().max(1)) else {
            return (text.to_string(), page_starts.to_vec());
        };

        let mut filtered = String::with_capacity(text.len());
        let mut mapped = Vec::with_capacity(page_starts.len());
        let mut pages = page_starts.iter().copied().peekable();

        for (line, &removed) in lines.iter().zip(&removals) {
            let line_end = line.start + line.full.len();
            while let Some(page) = pages.next_if(|&p| p < line_end) {
                let within = if removed { 0 } else { page.saturating_sub(line.start) };
                mapped.push(filtered.len() + within);
            }
            if !removed {
                filtered.push_str(line.full);
            }
        }
        mapped.extend(pages.map(|_| filtered.len()));

        (filtered, mapped)
    }

    /// Report every repeating line pattern without changing anything.
    ///
    /// Sorted by occurrences (descending), then key.
    #[must_use]
    pub fn analyze(&self, text: &str, page_count: usize) -> Vec<RepeatingLine> {
        let lines = lines(text);
        let counts = Self::count_keys(&lines);
        let page_count = page_count.max(1);
        let active = self.is_active(page_count);

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for line in lines.iter().filter(|l| !l.body.is_empty()) {
            let key = normalize_line(line.body);
            let occurrences = counts.get(&key).copied().unwrap_or(0);
            if occurrences < 2 || !seen.insert(key.clone()) {
                continue;
            }
            found.push(RepeatingLine {
                key,
                sample: line.body.to_string(),
                occurrences,
                ratio: occurrences as f64 / page_count as f64,
                would_be_filtered: active && self.should_remove(line.body, occurrences, page_count),
            });
        }

        found.sort_by(|a, b| b.occurrences.cmp(&a.occurrences).then_with(|| a.key.cmp(&b.key)));
        found
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            config: NoiseFilterConfig::default(),
            preserve: Vec::new(),
            remove: Vec::new(),
        }
    }
}
