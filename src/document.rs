//! Document input: text plus optional page boundaries.

use crate::{Error, Result};

/// Page separator emitted by most PDF text extractors.
pub const FORM_FEED: char = '\x0c';

/// Borrowed document text with validated page starts.
///
/// Page starts are byte offsets where each page begins. The first page
/// normally starts at 0; a document with no page starts is one page.
///
/// ## Example
///
/// ```rust
/// use quarry::Document;
///
/// let text = "Page one.\x0cPage two.\x0cPage three.";
/// let doc = Document::from_form_feeds(text);
/// assert_eq!(doc.page_count(), 3);
/// assert_eq!(doc.page_starts(), &[0, 10, 20]);
///
/// assert!(Document::new(text).with_page_starts(vec![5, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    text: &'a str,
    page_starts: Vec<usize>,
}

impl<'a> Document<'a> {
    /// A page-less document.
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            page_starts: Vec::new(),
        }
    }

    /// Attach page starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPageBoundary`] if an offset decreases, lies
    /// past the end of the text, or splits a `char`.
    pub fn with_page_starts(mut self, page_starts: Vec<usize>) -> Result<Self> {
        let len = self.text.len();
        let mut previous = 0;
        for &offset in &page_starts {
            if offset < previous || offset > len || !self.text.is_char_boundary(offset) {
                return Err(Error::InvalidPageBoundary { offset, len });
            }
            previous = offset;
        }
        self.page_starts = page_starts;
        Ok(self)
    }

    /// A document whose pages are separated by form feeds.
    ///
    /// Each page starts right after a form feed; the separators stay in the
    /// text, where they count as whitespace.
    #[must_use]
    pub fn from_form_feeds(text: &'a str) -> Self {
        if !text.contains(FORM_FEED) {
            return Self::new(text);
        }
        let page_starts = std::iter::once(0)
            .chain(text.match_indices(FORM_FEED).map(|(i, _)| i + 1))
            .collect();
        Self { text, page_starts }
    }

    /// The text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// Validated page starts, possibly empty.
    #[must_use]
    pub fn page_starts(&self) -> &[usize] {
        &self.page_starts
    }

    /// Number of pages, at least 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_starts.len().max(1)
    }
}

impl<'a> From<&'a str> for Document<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

/// 1-based page holding `offset`, given sorted page starts.
pub(crate) fn page_of(page_starts: &[usize], offset: usize) -> Option<usize> {
    if page_starts.is_empty() {
        return None;
    }
    Some(page_starts.partition_point(|&p| p <= offset).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_defaults_to_one() {
        assert_eq!(Document::new("text").page_count(), 1);
        assert_eq!(Document::new("").page_count(), 1);
    }

    #[test]
    fn test_page_starts_validation() {
        let doc = Document::new("abc");
        assert!(doc.clone().with_page_starts(vec![0, 1, 3]).is_ok());
        assert!(doc.clone().with_page_starts(vec![0, 0, 2]).is_ok());
        assert_eq!(
            doc.with_page_starts(vec![0, 4]).unwrap_err(),
            Error::InvalidPageBoundary { offset: 4, len: 3 }
        );
    }

    #[test]
    fn test_page_start_must_be_char_boundary() {
        let doc = Document::new("日本");
        assert!(doc.with_page_starts(vec![0, 1]).is_err());
    }

    #[test]
    fn test_form_feeds() {
        let doc = Document::from_form_feeds("no pages here");
        assert!(doc.page_starts().is_empty());
    }

    #[test]
    fn test_page_of() {
        let starts = [0, 10, 20];
        assert_eq!(page_of(&starts, 0), Some(1));
        assert_eq!(page_of(&starts, 9), Some(1));
        assert_eq!(page_of(&starts, 10), Some(2));
        assert_eq!(page_of(&starts, 25), Some(3));
        assert_eq!(page_of(&[], 5), None);
        // Text before a first page start that is not 0 belongs to page 1
        assert_eq!(page_of(&[4, 8], 2), Some(1));
    }
}
