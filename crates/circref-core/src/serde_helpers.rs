/// Lenient serde helpers for best-effort parsing of scraped source data.
///
/// The extraction pipeline is loose about types: ids sometimes arrive as
/// numbers, lists sometimes arrive as `null` or as a single object, and
/// optional strings are sometimes empty. These helpers accept all of those
/// shapes instead of failing the whole record.
///
/// Use with `#[serde(default, deserialize_with = "...")]`:
///
/// ```rust,ignore
/// #[serde(default, deserialize_with = "crate::serde_helpers::lenient_list")]
/// pub references: Vec<serde_json::Value>,
/// ```
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes an optional string, accepting numbers and booleans and
/// mapping `null` and blank strings to `None`.
///
/// | JSON                | Rust result            |
/// |---------------------|------------------------|
/// | field absent        | `None` (via default)   |
/// | `null` / `""`       | `None`                 |
/// | `"text"`            | `Some("text")`         |
/// | `42`                | `Some("42")`           |
/// | array / object      | `None`                 |
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Deserializes a list of raw JSON values, accepting `null` (empty list) and a
/// single non-array value (one-element list).
pub fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Object(_)) => {
            vec![other]
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::lenient_string")]
        id: Option<String>,
        #[serde(default, deserialize_with = "super::lenient_list")]
        items: Vec<Value>,
    }

    fn parse(json: &str) -> Holder {
        serde_json::from_str(json).expect("deserialize")
    }

    #[test]
    fn absent_fields_default() {
        let h = parse("{}");
        assert_eq!(h.id, None);
        assert!(h.items.is_empty());
    }

    #[test]
    fn numeric_id_becomes_string() {
        assert_eq!(parse(r#"{"id": 42}"#).id.as_deref(), Some("42"));
    }

    #[test]
    fn blank_id_is_none() {
        assert_eq!(parse(r#"{"id": "   "}"#).id, None);
        assert_eq!(parse(r#"{"id": null}"#).id, None);
        assert_eq!(parse(r#"{"id": ["x"]}"#).id, None);
    }

    #[test]
    fn id_is_trimmed() {
        assert_eq!(parse(r#"{"id": "  BPRD-1 "}"#).id.as_deref(), Some("BPRD-1"));
    }

    #[test]
    fn null_list_is_empty() {
        assert!(parse(r#"{"items": null}"#).items.is_empty());
    }

    #[test]
    fn single_object_becomes_one_element_list() {
        let h = parse(r#"{"items": {"type": "pdf"}}"#);
        assert_eq!(h.items.len(), 1);
    }
}
