//! Regex cleanup of a text column across flat records.
//!
//! [`TextFilter`] removes a list of literal terms (with the whitespace around
//! them) and then strips URLs. [`filter_records`] applies a filter to one
//! field of every record, splitting the records into row chunks that are
//! processed on scoped threads and reassembled in their original order.
//!
//! # Example
//!
//! ```
//! use convtree::core::filter::TextFilter;
//!
//! # fn main() -> convtree::Result<()> {
//! let filter = TextFilter::from_terms(["Seoul", "Busan"])?;
//! assert_eq!(filter.apply("from Seoul to see https://x.io/a"), "fromto see ");
//! # Ok(())
//! # }
//! ```
//!
//! # Behavior Notes
//!
//! - Terms are matched literally (regex metacharacters are escaped)
//! - Blank terms are ignored; with no terms only URLs are removed
//! - Records whose field is missing or not a string pass through unchanged

use std::path::Path;
use std::thread;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::node::MessageNode;

/// URLs removed after term filtering.
const URL_PATTERN: &str = r"http[s]?://\S+|www\.\S+";

/// A compiled term-and-URL filter.
#[derive(Debug, Clone)]
pub struct TextFilter {
    terms: Option<Regex>,
    urls: Regex,
    term_count: usize,
}

impl TextFilter {
    /// Builds a filter from literal terms.
    pub fn from_terms<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(|t| regex::escape(&t))
            .collect();

        let terms = if escaped.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"\s*({})\s*", escaped.join("|")))?)
        };

        Ok(Self {
            terms,
            urls: Regex::new(URL_PATTERN)?,
            term_count: escaped.len(),
        })
    }

    /// Builds a filter from a file holding one term per line.
    pub fn from_terms_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let filter = Self::from_terms(content.lines())?;
        info!(path = %path.display(), terms = filter.term_count, "loaded filter terms");
        Ok(filter)
    }

    /// A filter that only removes URLs.
    pub fn urls_only() -> Result<Self> {
        Self::from_terms(std::iter::empty::<&str>())
    }

    /// Number of distinct non-blank terms.
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Applies the filter to a single string.
    pub fn apply(&self, text: &str) -> String {
        let without_terms = match &self.terms {
            Some(re) => re.replace_all(text, ""),
            None => text.into(),
        };
        self.urls.replace_all(&without_terms, "").into_owned()
    }

    /// Applies the filter to `field` of one record, if it holds a string.
    /// Returns `true` if the value changed.
    pub fn apply_to_record(&self, record: &mut MessageNode, field: &str) -> bool {
        let Some(Value::String(text)) = record.fields.get_mut(field) else {
            return false;
        };
        let filtered = self.apply(text);
        if filtered == *text {
            return false;
        }
        *text = filtered;
        true
    }
}

/// Filters `text_field` of every record using up to `num_chunks` threads.
///
/// Records are split into contiguous chunks of `max(len / num_chunks, 1)`
/// rows; output order matches input order.
pub fn filter_records(
    mut records: Vec<MessageNode>,
    text_field: &str,
    filter: &TextFilter,
    num_chunks: usize,
) -> Vec<MessageNode> {
    if records.is_empty() {
        warn!("no records to filter");
        return records;
    }

    let chunk_size = chunk_size(records.len(), num_chunks);

    let changed: usize = thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks_mut(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter_mut()
                        .map(|record| filter.apply_to_record(record, text_field))
                        .filter(|changed| *changed)
                        .count()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .sum()
    });

    debug!(
        records = records.len(),
        chunk_size,
        changed,
        field = text_field,
        "filtered text field"
    );
    records
}

/// Rows per chunk for `len` records split `num_chunks` ways (at least 1).
pub fn chunk_size(len: usize, num_chunks: usize) -> usize {
    (len / num_chunks.max(1)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: u64, text: &str) -> MessageNode {
        MessageNode::new().with_field("id", id).with_field("text", text)
    }

    #[test]
    fn test_terms_and_surrounding_whitespace_removed() {
        let filter = TextFilter::from_terms(["서울", "부산"]).unwrap();
        assert_eq!(filter.apply("저는 서울 에 살아요"), "저는에 살아요");
        assert_eq!(filter.term_count(), 2);
    }

    #[test]
    fn test_terms_are_literal() {
        let filter = TextFilter::from_terms(["a.b", "(x)"]).unwrap();
        assert_eq!(filter.apply("a.b axb (x) x"), "axbx");
    }

    #[test]
    fn test_urls_removed() {
        let filter = TextFilter::urls_only().unwrap();
        assert_eq!(
            filter.apply("see https://example.com/a?b=1 and www.test.org now"),
            "see  and  now"
        );
        assert_eq!(filter.term_count(), 0);
    }

    #[test]
    fn test_blank_terms_ignored() {
        let filter = TextFilter::from_terms(["", "   ", "spam"]).unwrap();
        assert_eq!(filter.term_count(), 1);
        assert_eq!(filter.apply("no spam here"), "nohere");
    }

    #[test]
    fn test_from_terms_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "Seoul\n\nBusan\n").unwrap();
        let filter = TextFilter::from_terms_file(file.path()).unwrap();
        assert_eq!(filter.term_count(), 2);
    }

    #[test]
    fn test_apply_to_record_skips_non_strings() {
        let filter = TextFilter::from_terms(["x"]).unwrap();
        let mut rec = MessageNode::new().with_field("text", json!(["x"]));
        assert!(!filter.apply_to_record(&mut rec, "text"));
        assert!(!filter.apply_to_record(&mut rec, "missing"));
        assert_eq!(rec.get("text"), Some(&json!(["x"])));
    }

    #[test]
    fn test_filter_records_preserves_order() {
        let filter = TextFilter::from_terms(["drop"]).unwrap();
        let records: Vec<_> = (0..10)
            .map(|i| record(i, &format!("keep drop {i}")))
            .collect();

        let out = filter_records(records, "text", &filter, 3);

        assert_eq!(out.len(), 10);
        for (i, rec) in out.iter().enumerate() {
            assert_eq!(rec.get("id"), Some(&json!(i)));
            assert_eq!(rec.get("text"), Some(&json!(format!("keep{i}"))));
        }
    }

    #[test]
    fn test_filter_records_more_chunks_than_rows() {
        let filter = TextFilter::urls_only().unwrap();
        let out = filter_records(vec![record(1, "a http://x")], "text", &filter, 16);
        assert_eq!(out[0].get("text"), Some(&json!("a ")));
    }

    #[test]
    fn test_filter_records_empty() {
        let filter = TextFilter::urls_only().unwrap();
        assert!(filter_records(Vec::new(), "text", &filter, 4).is_empty());
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(10, 3), 3);
        assert_eq!(chunk_size(2, 8), 1);
        assert_eq!(chunk_size(10, 0), 10);
    }
}
