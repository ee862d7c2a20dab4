/// Field-level merge of two records that resolved to the same document id.
///
/// The same circular frequently appears in more than one source: in its own
/// department's primary document and again in the content cache, sometimes
/// with fewer fields filled in. [`merge_documents`] folds two such records
/// into one:
///
/// 1. The **preferred** record is the authoritative one; between two records
///    of equal provenance the one seen first is preferred.
/// 2. Every field takes the preferred record's value when it is non-empty,
///    and is backfilled from the other record otherwise.
/// 3. Provenance becomes authoritative if either record is authoritative.
///
/// Annotation fields (`reference_count`, cycle membership, visibility) are
/// never merged; they are recomputed after the graph is validated.
use crate::enums::Department;
use crate::structures::DocumentNode;

/// A value that can be "empty" for merge purposes.
pub trait Blank {
    /// Returns `true` when the value carries no information.
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.is_none()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Department {
    fn is_blank(&self) -> bool {
        matches!(self, Department::Other)
    }
}

/// Returns `preferred` unless it is blank, in which case `fallback`.
pub fn prefer<T: Blank>(preferred: T, fallback: T) -> T {
    if preferred.is_blank() {
        fallback
    } else {
        preferred
    }
}

/// Merges two records for the same document id.
///
/// `existing` is the record already held by the builder; `incoming` is the
/// record just extracted. The returned node keeps `existing.id`.
pub fn merge_documents(existing: DocumentNode, incoming: DocumentNode) -> DocumentNode {
    let incoming_wins =
        incoming.provenance.is_authoritative() && !existing.provenance.is_authoritative();
    let (preferred, other) = if incoming_wins {
        (incoming, existing)
    } else {
        (existing, incoming)
    };

    let provenance = if preferred.provenance.is_authoritative() {
        preferred.provenance
    } else {
        other.provenance
    };

    DocumentNode {
        title: prefer(preferred.title, other.title),
        date: prefer(preferred.date, other.date),
        year: prefer(preferred.year, other.year),
        department: prefer(preferred.department, other.department),
        url: prefer(preferred.url, other.url),
        content: prefer(preferred.content, other.content),
        provenance,
        ..preferred
    }
}
