/// Synthetic document identifiers for records that carry no id of their own.
///
/// - Deterministic path: SHA-256 over the document URL (preferred) or its
///   title, truncated to 16 hex characters and prefixed with the document
///   kind (`doc-`, `pdf-`, `web-`). Re-building from the same input always
///   yields the same id, which keeps deduplication idempotent.
/// - Random path: 16 CSPRNG bytes hex-encoded under `doc-rand-` when the
///   record has neither URL nor title. Random ids are never registered for
///   title matching.
///
/// Use [`derive_document_id`] as the primary entry point.
use std::fmt;

use sha2::{Digest, Sha256};

use crate::enums::DocumentKind;

/// Number of digest bytes kept in a deterministic synthetic id.
const DIGEST_BYTES: usize = 8;

/// Errors that can occur when deriving a synthetic id.
#[derive(Debug)]
pub enum DocumentIdError {
    /// The platform CSPRNG failed when generating a random fallback id.
    CsprngFailure(getrandom::Error),
}

impl fmt::Display for DocumentIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsprngFailure(e) => write!(f, "CSPRNG failure: {e}"),
        }
    }
}

impl std::error::Error for DocumentIdError {}

/// An id produced by [`derive_document_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedId {
    /// The id string.
    pub value: String,
    /// `true` when the id came from the CSPRNG and must not be used for
    /// matching.
    pub random: bool,
}

/// Encodes a byte slice as a lowercase hexadecimal string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_CHARS[(b >> 4) as usize] as char);
        out.push(HEX_CHARS[(b & 0x0f) as usize] as char);
    }
    out
}

fn kind_prefix(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Circular => "doc",
        DocumentKind::Pdf => "pdf",
        DocumentKind::Web => "web",
    }
}

/// Returns the deterministic synthetic id for a document, or `None` when both
/// `url` and `title` are missing or blank.
pub fn synthetic_id(kind: DocumentKind, url: Option<&str>, title: Option<&str>) -> Option<String> {
    let (tag, basis) = match (non_blank(url), non_blank(title)) {
        (Some(url), _) => ("url", url),
        (None, Some(title)) => ("title", title),
        (None, None) => return None,
    };

    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    hasher.update(b"\n");
    hasher.update(basis.as_bytes());
    let digest = hasher.finalize();

    Some(format!(
        "{}-{}",
        kind_prefix(kind),
        hex_encode(&digest[..DIGEST_BYTES])
    ))
}

/// Generates a random fallback id from 16 CSPRNG bytes.
///
/// # Errors
///
/// Returns [`DocumentIdError::CsprngFailure`] if the platform CSPRNG is
/// unavailable.
pub fn random_fallback_id() -> Result<String, DocumentIdError> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).map_err(DocumentIdError::CsprngFailure)?;
    Ok(format!("doc-rand-{}", hex_encode(&buf)))
}

/// Derives an id for a document that has none: deterministic from the URL or
/// title when available, random otherwise.
///
/// # Errors
///
/// Returns [`DocumentIdError::CsprngFailure`] only on the random path.
pub fn derive_document_id(
    kind: DocumentKind,
    url: Option<&str>,
    title: Option<&str>,
) -> Result<DerivedId, DocumentIdError> {
    if let Some(value) = synthetic_id(kind, url, title) {
        return Ok(DerivedId {
            value,
            random: false,
        });
    }
    Ok(DerivedId {
        value: random_fallback_id()?,
        random: true,
    })
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn hex_encode_mixed_bytes() {
        assert_eq!(hex_encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
    }

    #[test]
    fn synthetic_id_is_deterministic() {
        let a = synthetic_id(DocumentKind::Pdf, Some("https://x/a.pdf"), None);
        let b = synthetic_id(DocumentKind::Pdf, Some("https://x/a.pdf"), Some("ignored"));
        assert!(a.is_some());
        assert_eq!(a, b, "url takes precedence over title");
    }

    #[test]
    fn synthetic_id_has_kind_prefix_and_fixed_length() {
        let id = synthetic_id(DocumentKind::Web, Some("https://example.com"), None)
            .expect("id from url");
        assert!(id.starts_with("web-"), "{id}");
        assert_eq!(id.len(), "web-".len() + DIGEST_BYTES * 2);
    }

    #[test]
    fn url_and_title_bases_do_not_collide() {
        let by_url = synthetic_id(DocumentKind::Pdf, Some("Annex A"), None);
        let by_title = synthetic_id(DocumentKind::Pdf, None, Some("Annex A"));
        assert_ne!(by_url, by_title);
    }

    #[test]
    fn blank_inputs_yield_no_synthetic_id() {
        assert!(synthetic_id(DocumentKind::Circular, Some("  "), Some("")).is_none());
        assert!(synthetic_id(DocumentKind::Circular, None, None).is_none());
    }

    #[test]
    fn derive_falls_back_to_random() {
        let a = derive_document_id(DocumentKind::Circular, None, None).expect("csprng");
        let b = derive_document_id(DocumentKind::Circular, None, None).expect("csprng");
        assert!(a.random);
        assert!(a.value.starts_with("doc-rand-"));
        assert_ne!(a.value, b.value);
    }

    #[test]
    fn derive_prefers_deterministic_path() {
        let d = derive_document_id(DocumentKind::Circular, None, Some("Some title")).expect("id");
        assert!(!d.random);
        assert!(d.value.starts_with("doc-"));
    }
}
