//! Selector-based text extraction from HTML and XML feeds.
//!
//! Feeds such as RSS exports carry one `<item>` per post, with the post body
//! as an HTML string inside one of the item's child tags. [`parse_and_extract_from_xml`]
//! turns every item into a flat record:
//!
//! - each requested tag becomes a field holding that tag's text
//!   ([`NO_CONTENT`] when the item has no such tag, `null` when it is empty)
//! - the HTML tag is run through an [`HtmlExtractor`] and stored under
//!   [`HTML_TEXTS_FIELD`] as `{selector: [text, ...]}`
//!
//! A selector that matches nothing maps to `[NO_MATCH]`, and an item without
//! HTML maps to `{NO_MATCH: [NO_MATCH]}`, so every record has the same shape.
//!
//! # Example
//!
//! ```
//! use convtree::core::extract::extract_texts_from_html;
//! use serde_json::json;
//!
//! # fn main() -> convtree::Result<()> {
//! let html = "<div><p class=\"body\"> Hello <b>there</b> </p></div>";
//! let texts = extract_texts_from_html(html, &["p.body", "h1"])?;
//!
//! assert_eq!(texts["p.body"], json!(["Hellothere"]));
//! assert_eq!(texts["h1"], json!(["None"]));
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{ConvtreeError, Result};
use crate::node::MessageNode;

/// Placeholder for a selector without matches, or an item without HTML.
pub const NO_MATCH: &str = "None";

/// Placeholder for a requested tag the item does not have.
pub const NO_CONTENT: &str = "No Content";

/// Field holding the per-selector HTML texts of an item.
pub const HTML_TEXTS_FIELD: &str = "html_texts";

/// A set of compiled CSS selectors.
#[derive(Debug)]
pub struct HtmlExtractor {
    selectors: Vec<(String, Selector)>,
}

impl HtmlExtractor {
    /// Compiles the selectors. An invalid selector is a configuration error.
    pub fn new<I, S>(selectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selectors = selectors
            .into_iter()
            .map(|s| {
                let source = s.as_ref();
                Selector::parse(source)
                    .map(|compiled| (source.to_string(), compiled))
                    .map_err(|e| {
                        ConvtreeError::invalid_config(format!("invalid selector '{source}': {e}"))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// Returns the texts matched by each selector, keyed by selector.
    ///
    /// An element's text is the concatenation of its trimmed, non-empty text
    /// pieces.
    pub fn extract(&self, html: &str) -> Map<String, Value> {
        let document = Html::parse_document(html);
        let mut result = Map::new();

        for (source, selector) in &self.selectors {
            let texts: Vec<Value> = document
                .select(selector)
                .map(|element| Value::String(element_text(element)))
                .collect();

            let texts = if texts.is_empty() {
                debug!(selector = %source, "selector matched no elements");
                vec![Value::from(NO_MATCH)]
            } else {
                texts
            };
            result.insert(source.clone(), Value::Array(texts));
        }
        result
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Extracts the texts matched by each CSS selector in `html`.
pub fn extract_texts_from_html<S: AsRef<str>>(html: &str, selectors: &[S]) -> Result<Map<String, Value>> {
    Ok(HtmlExtractor::new(selectors)?.extract(html))
}

/// Extracts one record per `<item>` element of an XML document.
///
/// `tags[0]` names the item child holding the HTML body; the remaining tags
/// are copied as plain text fields. Items are collected at any depth below
/// the document element, in document order. An `item` nested inside another
/// item is treated as an ordinary child of the outer one.
pub fn extract_items(xml: &str, tags: &[&str], html: &HtmlExtractor) -> Result<Vec<MessageNode>> {
    require_body_tag(tags)?;

    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut item: Option<Item> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                depth += 1;
                if let Some(open) = item.as_mut() {
                    open.open(depth, e.local_name().as_ref());
                } else if depth > 1 && e.local_name().as_ref() == b"item" {
                    item = Some(Item::new(depth));
                }
            }
            Event::Empty(ref e) => {
                if let Some(open) = item.as_mut() {
                    open.open(depth + 1, e.local_name().as_ref());
                    open.close(depth + 1);
                } else if depth > 0 && e.local_name().as_ref() == b"item" {
                    records.push(Item::new(depth + 1).into_record(tags, html));
                }
            }
            Event::Text(ref e) => {
                if let Some(item) = &mut item {
                    item.push_text(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let Some(item) = &mut item {
                    item.push_text(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                if item.as_ref().is_some_and(|open| open.depth == depth) {
                    if let Some(done) = item.take() {
                        records.push(done.into_record(tags, html));
                    }
                } else if let Some(open) = item.as_mut() {
                    open.close(depth);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Reads an XML feed and extracts one record per `<item>` element.
///
/// See [`extract_items`]. A file that is not well-formed XML is an error.
pub fn parse_and_extract_from_xml<S: AsRef<str>>(
    path: impl AsRef<Path>,
    tags: &[&str],
    selectors: &[S],
) -> Result<Vec<MessageNode>> {
    let path = path.as_ref();
    require_body_tag(tags)?;

    let extractor = HtmlExtractor::new(selectors)?;
    let content = fs::read_to_string(path)?;
    let records = extract_items(&content, tags, &extractor)?;

    info!(path = %path.display(), items = records.len(), "extracted feed items");
    Ok(records)
}

fn require_body_tag(tags: &[&str]) -> Result<()> {
    if tags.is_empty() {
        return Err(ConvtreeError::invalid_config(
            "at least one tag (the HTML body) is required",
        ));
    }
    Ok(())
}

/// Direct children of an `<item>` seen so far.
struct Item {
    depth: usize,
    /// `(name, text)` in document order; `text` is `None` for an element
    /// without leading text.
    children: Vec<(String, Option<String>)>,
    /// Text of the open direct child stops at its first nested element.
    collecting: bool,
}

impl Item {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            children: Vec::new(),
            collecting: false,
        }
    }

    fn open(&mut self, depth: usize, name: &[u8]) {
        if depth == self.depth + 1 {
            self.children
                .push((String::from_utf8_lossy(name).into_owned(), None));
            self.collecting = true;
        } else {
            self.collecting = false;
        }
    }

    fn close(&mut self, depth: usize) {
        if depth == self.depth + 1 {
            self.collecting = false;
        }
    }

    fn push_text(&mut self, text: &str) {
        if !self.collecting {
            return;
        }
        if let Some((_, slot)) = self.children.last_mut() {
            slot.get_or_insert_with(String::new).push_str(text);
        }
    }

    fn child(&self, name: &str) -> Option<&Option<String>> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text)
    }

    fn into_record(self, tags: &[&str], html: &HtmlExtractor) -> MessageNode {
        let Some((html_tag, text_tags)) = tags.split_first() else {
            return MessageNode::new();
        };

        let mut record = MessageNode::new();
        for tag in text_tags {
            let value = match self.child(tag) {
                Some(text) => text.as_deref().map_or(Value::Null, Value::from),
                None => Value::from(NO_CONTENT),
            };
            record.fields.insert((*tag).to_string(), value);
        }

        let body = self
            .child(html_tag)
            .and_then(|text| text.as_deref())
            .unwrap_or_default();
        let texts = if body.is_empty() {
            let mut none = Map::new();
            none.insert(NO_MATCH.to_string(), Value::Array(vec![Value::from(NO_MATCH)]));
            none
        } else {
            html.extract(body)
        };
        record
            .fields
            .insert(HTML_TEXTS_FIELD.to_string(), Value::Object(texts));
        record
    }
}
