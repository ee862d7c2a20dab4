/// Normalized-title keys used to match circular references to documents.
///
/// Incoming reference text ("BPRD Circular No. 01 of 2014") and a target
/// document's own id or title ("BPRD Circular No. 1 dated January 29, 2014")
/// rarely agree character for character. Both sides are reduced to a
/// normalized key before lookup:
///
/// 1. **Structured form**: text matching
///    `<dept> circular [letter] [no.] <n> [of <date|year>] [dated <date>]`
///    becomes `<dept> circular[ letter] <n>[ <year>]`. The year is taken from
///    the `dated` clause when present, otherwise from the `of` clause.
/// 2. **Generic form**: anything else is lowercased, `no.` / `no` /
///    `number` / `#` variants collapse to the single token `no`, leading zeros
///    are stripped from embedded numbers, and whitespace is collapsed.
use std::sync::LazyLock;

use regex::Regex;

use crate::enums::Department;

// ---------------------------------------------------------------------------
// Regex statics
//
// Every pattern is a literal. A pattern that failed to compile would be
// `None`, and the lookups below treat it as matching nothing.
// ---------------------------------------------------------------------------

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

/// `<dept> circular letter [no.] <n> [of ...] [dated ...]` on lowercased text.
static LETTER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        r"([a-z&]+(?:['\x{2019}]s)?)\s+circular\s+letter\s+(?:(?:no\.?|number|#)\s*)?(\d+)(?:\s+of\s+([a-z]+\s+\d{1,2},\s+\d{4}|\d{4}))?(?:\s+dated\s+([a-z]+\s+\d{1,2},\s+\d{4}))?",
    )
});

/// `<dept> circular [no.] <n> [of ...] [dated ...]` on lowercased text.
static CIRCULAR_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(
        r"([a-z&]+(?:['\x{2019}]s)?)\s+circular\s+(?:(?:no\.?|number|#)\s*)?(\d+)(?:\s+of\s+([a-z]+\s+\d{1,2},\s+\d{4}|\d{4}))?(?:\s+dated\s+([a-z]+\s+\d{1,2},\s+\d{4}))?",
    )
});

/// Any four-digit year inside a date clause.
static YEAR_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\d{4}"));

/// `no.` style tokens in free text.
static NUMBER_TOKEN_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?:\b(?:no|number|nr)\b\.?|#)\s*"));

/// Runs of ASCII digits.
static DIGITS_RE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\d+"));

// ---------------------------------------------------------------------------
// ParsedReference
// ---------------------------------------------------------------------------

/// The structured parts of a circular reference title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// Lowercased department token as written (possessive stripped).
    pub department_token: String,
    /// `true` for a circular letter, `false` for a circular.
    pub letter: bool,
    /// Sequence number with leading zeros removed.
    pub number: String,
    /// Year from the `dated` clause, else from the `of` clause.
    pub year: Option<i32>,
}

impl ParsedReference {
    /// Resolves the department token through [`Department::resolve`].
    pub fn department(&self) -> Department {
        Department::resolve(&self.department_token, self.year)
    }

    /// Renders the normalized key for this reference.
    pub fn key(&self) -> String {
        let kind = if self.letter {
            "circular letter"
        } else {
            "circular"
        };
        match self.year {
            Some(year) => format!("{} {kind} {} {year}", self.department_token, self.number),
            None => format!("{} {kind} {}", self.department_token, self.number),
        }
    }
}

/// Parses a circular reference title into its structured parts.
///
/// Circular letters are tried first because the plain circular pattern would
/// otherwise stop at the word `letter`. Returns `None` when the text does not
/// look like a circular reference.
pub fn parse_reference(title: &str) -> Option<ParsedReference> {
    let lowered = prepare(title);
    let letter_caps = LETTER_RE.as_ref().and_then(|re| re.captures(&lowered));
    let (caps, letter) = match letter_caps {
        Some(caps) => (caps, true),
        None => (CIRCULAR_RE.as_ref()?.captures(&lowered)?, false),
    };

    let department_token = caps
        .get(1)?
        .as_str()
        .trim_end_matches("'s")
        .trim_end_matches("\u{2019}s")
        .to_owned();
    let number = strip_leading_zeros(caps.get(2)?.as_str());
    let year = caps
        .get(4)
        .or_else(|| caps.get(3))
        .and_then(|m| YEAR_RE.as_ref()?.find(m.as_str()))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    Some(ParsedReference {
        department_token,
        letter,
        number,
        year,
    })
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Returns the normalized lookup key for a title or reference string.
///
/// Empty or whitespace-only input yields an empty key, which callers must
/// never register or look up.
pub fn normalize_title(raw: &str) -> String {
    if let Some(parsed) = parse_reference(raw) {
        return parsed.key();
    }
    generic_key(raw)
}

/// Returns every key under which a document should be registered.
///
/// Keys are derived from the document id and its title. When a structured key
/// carries no year but the document's own `year` is known, the year-qualified
/// variant is added as well so that references written as
/// "... No. 5 of 2014" still find a document whose id is just "... No. 05".
/// The result is de-duplicated and never contains an empty key.
pub fn registration_keys(id: &str, title: &str, year: Option<i32>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::with_capacity(4);
    for raw in [id, title] {
        let parsed = parse_reference(raw);
        let key = match &parsed {
            Some(p) => p.key(),
            None => generic_key(raw),
        };
        push_unique(&mut keys, key);

        if let (Some(p), Some(y)) = (parsed, year) {
            if p.year.is_none() {
                let qualified = ParsedReference {
                    year: Some(y),
                    ..p
                };
                push_unique(&mut keys, qualified.key());
            }
        }
    }
    keys
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !key.is_empty() && !keys.contains(&key) {
        keys.push(key);
    }
}

/// Lowercases, decodes the one HTML entity the scraper leaves behind, and
/// collapses whitespace.
fn prepare(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace("&amp;", "&");
    collapse_whitespace(&lowered)
}

fn generic_key(raw: &str) -> String {
    let prepared = prepare(raw);
    let tokens = match NUMBER_TOKEN_RE.as_ref() {
        Some(re) => re.replace_all(&prepared, "no ").into_owned(),
        None => prepared,
    };
    let digits = match DIGITS_RE.as_ref() {
        Some(re) => re
            .replace_all(&tokens, |caps: &regex::Captures<'_>| {
                strip_leading_zeros(&caps[0])
            })
            .into_owned(),
        None => tokens,
    };
    collapse_whitespace(&digits)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}
