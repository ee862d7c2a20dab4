/// Raw JSON shapes produced by the circular extraction pipeline.
///
/// Two document shapes are consumed:
///
/// - **Primary**: one per department:
///   `{ department, years: { "<year>": { circulars: [...], circular_letters: [...] } } }`
/// - **Cache**: a flat map of previously extracted circulars:
///   `{ "<id>": { content: { content: [...], references: [...] }, url? } }`
///
/// Parsing is best-effort. Only the outer document structure must be valid
/// JSON; individual entries are kept as raw [`Value`]s and decoded one at a
/// time by the graph builder through [`CircularEntry::from_value`],
/// [`RawReference::from_value`], and [`CacheEntry::from_value`], so one
/// malformed record never discards its siblings.
use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::serde_helpers::{lenient_list, lenient_string};

// ---------------------------------------------------------------------------
// Primary documents
// ---------------------------------------------------------------------------

/// A department's primary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryDocument {
    /// Department name as written by the source (e.g. `"BPRD"`, `"AC&MFD"`).
    #[serde(default, deserialize_with = "lenient_string")]
    pub department: Option<String>,
    /// Year label → raw bucket of entries issued that year, decoded with
    /// [`YearBucket::from_value`].
    #[serde(default)]
    pub years: BTreeMap<String, Value>,
}

impl PrimaryDocument {
    /// Parses a primary document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the text is not JSON
    /// or the outer structure is not an object of the expected shape.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decodes each year bucket in label order.
    pub fn buckets(
        &self,
    ) -> impl Iterator<Item = (&str, Result<YearBucket, serde_json::Error>)> {
        self.years
            .iter()
            .map(|(year, raw)| (year.as_str(), YearBucket::from_value(raw)))
    }
}

/// The entries issued in one year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearBucket {
    /// Circular entries.
    #[serde(default, deserialize_with = "lenient_list")]
    pub circulars: Vec<Value>,
    /// Circular-letter entries.
    #[serde(default, deserialize_with = "lenient_list")]
    pub circular_letters: Vec<Value>,
}

impl YearBucket {
    /// Decodes one raw year bucket.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Every raw entry, circulars first and circular letters second.
    pub fn entries(&self) -> impl Iterator<Item = &Value> {
        self.circulars.iter().chain(self.circular_letters.iter())
    }
}

/// One circular or circular letter inside a primary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CircularEntry {
    /// Reference number, e.g. `"BPRD Circular No. 01"`.
    #[serde(rename = "ID", alias = "id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    /// Display title.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Issue date as written.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    /// Canonical URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    /// Opaque content blocks.
    #[serde(default, deserialize_with = "lenient_list")]
    pub content: Vec<Value>,
    /// Outgoing references.
    #[serde(default, deserialize_with = "lenient_list")]
    pub references: Vec<Value>,
}

impl CircularEntry {
    /// Decodes one raw entry.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// One entry of a `references` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReference {
    /// Declared type: `circular`, `circular_letter`, `pdf`, or `web`.
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub ref_type: Option<String>,
    /// Reference text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Reference URL.
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    /// Extraction failure marker left by the pipeline.
    #[serde(default, deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

impl RawReference {
    /// Decodes one raw reference.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the value is not an object.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

// Extracted content of a followed reference is read from the raw value and
// never decoded into `RawReference`.

/// Returns the references nested inside a raw reference's extracted content,
/// or an empty slice.
pub fn nested_references(reference: &Value) -> &[Value] {
    extracted(reference, "references")
}

/// Returns the content blocks of a raw reference's extracted content, or an
/// empty slice.
pub fn content_blocks(reference: &Value) -> &[Value] {
    extracted(reference, "content")
}

fn extracted<'a>(reference: &'a Value, field: &str) -> &'a [Value] {
    reference
        .get("content")
        .and_then(|c| c.get(field))
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

// ---------------------------------------------------------------------------
// Cache document
// ---------------------------------------------------------------------------

/// The fallback content cache: id (usually the reference title the content was
/// fetched for) → cached entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CacheDocument {
    /// Raw entries, decoded individually with [`CacheEntry::from_value`].
    pub entries: BTreeMap<String, Value>,
}

impl CacheDocument {
    /// Parses a cache document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the text is not a
    /// JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// One cached circular.
#[derive(Debug, Clone, Default)]
pub struct CacheEntry {
    /// Display title, when the cached content records one.
    pub title: Option<String>,
    /// URL the content was fetched from.
    pub url: Option<String>,
    /// Opaque content blocks.
    pub content: Vec<Value>,
    /// Outgoing references.
    pub references: Vec<Value>,
}

#[derive(Deserialize)]
struct CacheEntryWire {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
}

#[derive(Deserialize)]
struct CachedContentWire {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    content: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    references: Vec<Value>,
}

impl CacheEntry {
    /// Decodes one raw cache entry.
    ///
    /// `content` may be the usual `{ content, references }` object or a bare
    /// array of content blocks.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when the value or its `content` object
    /// has the wrong shape.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let wire = CacheEntryWire::deserialize(value)?;
        let mut entry = CacheEntry {
            title: wire.title,
            url: wire.url,
            ..CacheEntry::default()
        };
        match wire.content {
            Some(Value::Array(blocks)) => entry.content = blocks,
            Some(inner @ Value::Object(_)) => {
                let content = CachedContentWire::deserialize(&inner)?;
                entry.title = entry.title.or(content.title);
                entry.url = entry.url.or(content.url);
                entry.content = content.content;
                entry.references = content.references;
            }
            Some(Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) | None => {}
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn primary_document_parses_years_and_entries() {
        let doc = PrimaryDocument::from_json(
            r#"{
                "department": "BPRD",
                "years": {
                    "2014": {
                        "circulars": [{"ID": "BPRD Circular No. 01", "title": "A"}],
                        "circular_letters": [{"ID": "BPRD Circular Letter No. 02"}]
                    },
                    "2015": {"circulars": null}
                }
            }"#,
        )
        .expect("parse");
        assert_eq!(doc.department.as_deref(), Some("BPRD"));
        let buckets: Vec<_> = doc.buckets().collect();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].0, "2014");
        let first = buckets[0].1.as_ref().expect("bucket");
        assert_eq!(first.entries().count(), 2);
        let second = buckets[1].1.as_ref().expect("bucket");
        assert_eq!(second.entries().count(), 0);
    }

    #[test]
    fn primary_document_missing_fields_default() {
        let doc = PrimaryDocument::from_json("{}").expect("parse");
        assert!(doc.department.is_none());
        assert_eq!(doc.buckets().count(), 0);
    }

    #[test]
    fn malformed_year_bucket_keeps_its_siblings() {
        let doc = PrimaryDocument::from_json(
            r#"{"years": {"2014": {"circulars": [{"ID": "A"}]}, "2015": "garbage"}}"#,
        )
        .expect("parse");
        let buckets: Vec<_> = doc.buckets().collect();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].1.as_ref().expect("bucket").entries().count(), 1);
        assert!(buckets[1].1.is_err());
    }

    #[test]
    fn primary_document_rejects_non_json() {
        assert!(PrimaryDocument::from_json("not json").is_err());
    }

    #[test]
    fn circular_entry_accepts_lowercase_id_alias() {
        let e = CircularEntry::from_value(&json!({"id": "X-1", "references": []})).expect("entry");
        assert_eq!(e.id.as_deref(), Some("X-1"));
    }

    #[test]
    fn circular_entry_rejects_non_object() {
        assert!(CircularEntry::from_value(&json!("just a string")).is_err());
    }

    #[test]
    fn nested_references_are_exposed() {
        let raw = json!({
            "type": "circular",
            "title": "BPRD Circular No. 3 of 2012",
            "content": {"references": [{"type": "web", "title": "w"}]}
        });
        assert_eq!(nested_references(&raw).len(), 1);
    }

    #[test]
    fn nested_references_default_to_empty() {
        assert!(nested_references(&json!({"type": "pdf", "content": "oops"})).is_empty());
        assert!(nested_references(&json!({"type": "pdf"})).is_empty());
    }

    #[test]
    fn reference_content_blocks_are_extracted() {
        let raw = json!({
            "type": "pdf",
            "title": "Annexure A",
            "content": {"content": [{"type": "text", "text": "p1"}], "references": []}
        });
        assert_eq!(content_blocks(&raw).len(), 1);
        assert!(content_blocks(&json!({"type": "web"})).is_empty());
    }

    #[test]
    fn cache_entry_reads_nested_content() {
        let e = CacheEntry::from_value(&json!({
            "content": {
                "content": [{"type": "text", "text": "hello"}],
                "references": [{"type": "pdf", "title": "Annex"}]
            },
            "url": "https://www.sbp.org.pk/bprd/2012/C3.htm",
            "extracted_at": "2025-01-01T00:00:00"
        }))
        .expect("entry");
        assert_eq!(e.content.len(), 1);
        assert_eq!(e.references.len(), 1);
        assert_eq!(e.url.as_deref(), Some("https://www.sbp.org.pk/bprd/2012/C3.htm"));
    }

    #[test]
    fn cache_entry_accepts_bare_block_array() {
        let e = CacheEntry::from_value(&json!({"content": [{"type": "text"}]})).expect("entry");
        assert_eq!(e.content.len(), 1);
        assert!(e.references.is_empty());
    }

    #[test]
    fn cache_document_is_a_flat_map() {
        let doc = CacheDocument::from_json(r#"{"a": {}, "b": {"content": {}}}"#).expect("parse");
        assert_eq!(doc.entries.len(), 2);
        assert!(CacheDocument::from_json("[]").is_err());
    }
}
