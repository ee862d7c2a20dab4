/// Enumerations of the circular reference graph data model.
///
/// Document kinds, reference types, and provenance serialize to/from lowercase
/// JSON strings. [`Department`] serializes to its upper-case code and accepts
/// the historical aliases emitted by the extraction pipeline when resolved
/// through [`Department::resolve`].
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a node in the reference graph represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A regulatory circular or circular letter.
    Circular,
    /// A PDF attachment referenced by a document.
    Pdf,
    /// A web page referenced by a document.
    Web,
}

impl DocumentKind {
    /// Returns the lowercase wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circular => "circular",
            Self::Pdf => "pdf",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a reference entry, carried on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    /// A reference to another circular (or circular letter).
    Circular,
    /// A reference to a PDF document.
    Pdf,
    /// A reference to a web page.
    Web,
}

impl RefType {
    /// Parses the `type` field of a raw reference entry.
    ///
    /// `circular_letter` is folded into [`RefType::Circular`]; matching is
    /// case-insensitive. Returns `None` for anything unrecognised.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "circular" | "circular_letter" | "circular letter" => Some(Self::Circular),
            "pdf" => Some(Self::Pdf),
            "web" | "url" | "link" => Some(Self::Web),
            _ => None,
        }
    }

    /// Returns the lowercase wire name of the reference type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circular => "circular",
            Self::Pdf => "pdf",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// A primary department document.
    Authoritative,
    /// The fallback content cache.
    Cache,
}

impl Provenance {
    /// Returns `true` for [`Provenance::Authoritative`].
    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

/// Issuing department of a document.
///
/// Only the codes the viewer knows how to colour and filter are enumerated;
/// everything else collapses into [`Department::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    /// Agricultural Credit & Microfinance Department.
    #[serde(rename = "ACD")]
    Acd,
    /// Banking Policy & Regulations Department.
    #[serde(rename = "BPRD")]
    Bprd,
    /// Banking Policy Department (historical name of BPRD, up to 2006).
    #[serde(rename = "BPD")]
    Bpd,
    /// Banking supervision department (code in use from late 2006).
    #[serde(rename = "BSRVD")]
    Bsrvd,
    /// Banking Supervision Department (historical name of BSRVD, up to 2006).
    #[serde(rename = "BSD")]
    Bsd,
    /// Any department not listed above.
    Other,
}

/// Last year in which the historical `BPD` / `BSD` codes were in use.
const LAST_HISTORICAL_YEAR: i32 = 2006;

impl Department {
    /// All enumerated departments, in display order.
    pub const ALL: [Department; 6] = [
        Self::Acd,
        Self::Bprd,
        Self::Bpd,
        Self::Bsrvd,
        Self::Bsd,
        Self::Other,
    ];

    /// Resolves a raw department name (as written in a document header or a
    /// reference title) to a [`Department`].
    ///
    /// Matching is case-insensitive and tolerates the `AC&MFD` family of
    /// aliases. The historical `BPD` and `BSD` names resolve to their modern
    /// successors for years after 2006, or when `year` is unknown.
    pub fn resolve(raw: &str, year: Option<i32>) -> Self {
        let name = raw.trim().to_ascii_uppercase().replace("&AMP;", "&");
        let name = name.trim_end_matches("'S").trim_end_matches("\u{2019}S");
        let historical = year.is_some_and(|y| y <= LAST_HISTORICAL_YEAR);
        match name {
            "AC&MFD" | "ACMFD" | "ACD" | "ACFID" => Self::Acd,
            "BPRD" | "BPD" => {
                if historical {
                    Self::Bpd
                } else {
                    Self::Bprd
                }
            }
            "BSRVD" => Self::Bsrvd,
            "BSD" => {
                if historical {
                    Self::Bsd
                } else {
                    Self::Bsrvd
                }
            }
            _ => Self::Other,
        }
    }

    /// Resolves a department from a document URL of the form
    /// `https://host/<code>/...` (the first path segment is the code).
    ///
    /// Returns `None` when the URL has no usable path segment.
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
        let segment = rest.split('/').nth(1)?.trim();
        if segment.is_empty() {
            return None;
        }
        match Self::resolve(segment, None) {
            Self::Other => None,
            dept @ (Self::Acd | Self::Bprd | Self::Bpd | Self::Bsrvd | Self::Bsd) => Some(dept),
        }
    }

    /// Parses an exact department code as written by [`Department::code`].
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Returns the canonical code used on the wire and in filter records.
    pub fn code(self) -> &'static str {
        match self {
            Self::Acd => "ACD",
            Self::Bprd => "BPRD",
            Self::Bpd => "BPD",
            Self::Bsrvd => "BSRVD",
            Self::Bsd => "BSD",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
