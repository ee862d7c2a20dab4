//! JSON builders for circulars, references, and cache entries.

use std::collections::BTreeMap;

use serde_json::{Value, json};

const TOPICS: &[&str] = &[
    "Prudential Regulations",
    "Credit Guidelines",
    "Branch Licensing",
    "Foreign Exchange Reporting",
    "Microfinance Framework",
    "Anti Money Laundering",
    "Capital Adequacy",
    "Deposit Protection",
    "Payment Systems",
    "Risk Management",
];

const MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One circular or circular letter in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDoc {
    /// Department code as written in the primary document header.
    pub department: &'static str,
    /// Issue year.
    pub year: i32,
    /// Sequence number within the department, year, and kind; starts at 1.
    pub number: usize,
    /// `true` for a circular letter.
    pub letter: bool,
}

impl CircularDoc {
    fn kind_label(&self) -> &'static str {
        if self.letter {
            "Circular Letter"
        } else {
            "Circular"
        }
    }

    /// The document id, zero-padded as the department sites write it.
    pub fn id(&self) -> String {
        format!(
            "{} {} No. {:02} of {}",
            self.department,
            self.kind_label(),
            self.number,
            self.year
        )
    }

    /// How another document cites this one.
    pub fn reference_title(&self) -> String {
        format!(
            "{} {} No. {} of {}",
            self.department,
            self.kind_label(),
            self.number,
            self.year
        )
    }

    /// Reference `type` used when citing this document.
    pub fn ref_type(&self) -> &'static str {
        if self.letter { "circular_letter" } else { "circular" }
    }

    fn path_stem(&self) -> String {
        let prefix = if self.letter { "CL" } else { "C" };
        format!(
            "https://www.sbp.org.pk/{}/{}/{prefix}{}",
            self.department.to_ascii_lowercase(),
            self.year,
            self.number
        )
    }

    /// Page URL of the document.
    pub fn url(&self) -> String {
        format!("{}.htm", self.path_stem())
    }

    /// A display title that no other document shares.
    pub fn title(&self) -> String {
        let topic = TOPICS[self.number % TOPICS.len()];
        format!(
            "{topic} ({} {}-{}{})",
            self.department,
            self.year,
            if self.letter { "L" } else { "" },
            self.number
        )
    }

    /// Issue date in the "Month D, YYYY" form.
    pub fn date(&self) -> String {
        let month = MONTHS[(self.number - 1) % MONTHS.len()];
        let day = (self.number - 1) % 28 + 1;
        format!("{month} {day}, {}", self.year)
    }
}

/// A reference citing `target`.
pub fn circular_reference(target: &CircularDoc) -> Value {
    json!({
        "type": target.ref_type(),
        "title": target.reference_title(),
        "url": target.url(),
    })
}

/// A reference to a circular that exists in no source.
///
/// The cited year precedes every generated year, so nothing can match it.
pub fn orphan_reference(owner: &CircularDoc, k: usize, first_year: i32) -> Value {
    json!({
        "type": "circular",
        "title": format!("{} Circular No. {} of {}", owner.department, k + 1, first_year - 1),
    })
}

/// The `k`-th attachment of `owner`: PDFs on even `k`, web pages on odd.
pub fn attachment(owner: &CircularDoc, k: usize) -> Value {
    if k % 2 == 0 {
        json!({
            "type": "pdf",
            "title": format!("Annexure {}", k + 1),
            "url": format!("{}-annex-{k}.pdf", owner.path_stem()),
        })
    } else {
        json!({
            "type": "web",
            "title": format!("{} Policy Page", owner.department),
            "url": format!("{}-page-{k}.htm", owner.path_stem()),
        })
    }
}

/// One entry of a primary document's `circulars` / `circular_letters` list.
pub fn entry(doc: &CircularDoc, references: &[Value]) -> Value {
    json!({
        "ID": doc.id(),
        "title": doc.title(),
        "date": doc.date(),
        "url": doc.url(),
        "content": [
            {"type": "text", "text": format!("{} applies to all banks.", doc.title())}
        ],
        "references": references,
    })
}

/// Entries of one year, split by kind.
#[derive(Debug, Default)]
pub struct YearEntries {
    /// Circular entries.
    pub circulars: Vec<Value>,
    /// Circular letter entries.
    pub circular_letters: Vec<Value>,
}

/// A whole primary document for one department.
pub fn primary_document(department: &str, years: BTreeMap<i32, YearEntries>) -> Value {
    let years: serde_json::Map<String, Value> = years
        .into_iter()
        .map(|(year, entries)| {
            (
                year.to_string(),
                json!({
                    "circulars": entries.circulars,
                    "circular_letters": entries.circular_letters,
                }),
            )
        })
        .collect();
    json!({ "department": department, "years": years })
}

/// A cache entry carrying extra content for `doc` and no references.
pub fn cache_entry(doc: &CircularDoc) -> Value {
    json!({
        "content": {
            "content": [
                {"type": "text", "text": format!("Cached copy of {}.", doc.id())}
            ],
            "references": [],
        },
        "url": doc.url(),
        "extracted_at": format!("{}-01-10T09:00:00", doc.year + 1),
    })
}
