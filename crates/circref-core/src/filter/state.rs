/// The filter-state record and its validation.
///
/// The record is the single source of truth for what the viewer shows. It is
/// persisted as a flat camelCase JSON object:
///
/// ```json
/// {"departments": ["ACD", "BPRD"], "yearMin": 2001, "yearMax": 2024,
///  "searchQuery": "", "showCyclesOnly": false, "showLabels": false,
///  "showIsolated": true}
/// ```
///
/// and validated once when restored: an unparseable record, an unknown
/// department code, or an inverted year range rejects the whole record.
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::Department;
use crate::graph::ReferenceGraph;

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// Year span of the loaded graph, used for the default year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterBounds {
    /// Earliest known year.
    pub year_min: i32,
    /// Latest known year.
    pub year_max: i32,
}

impl FilterBounds {
    /// Bounds that exclude no year; used when no node has a year.
    pub const UNBOUNDED: FilterBounds = FilterBounds {
        year_min: i32::MIN,
        year_max: i32::MAX,
    };

    /// Computes the span of every known node year.
    pub fn from_graph(graph: &ReferenceGraph) -> Self {
        let mut years = graph.nodes().filter_map(|n| n.year);
        let Some(first) = years.next() else {
            return Self::UNBOUNDED;
        };
        let (year_min, year_max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
        Self { year_min, year_max }
    }
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a filter state was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStateError {
    /// The persisted record is not JSON of the expected shape, or names an
    /// unknown department code.
    Malformed(String),
    /// `yearMin` is greater than `yearMax`.
    InvertedYearRange {
        /// Lower bound as given.
        year_min: i32,
        /// Upper bound as given.
        year_max: i32,
    },
}

impl fmt::Display for FilterStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed filter state: {detail}"),
            Self::InvertedYearRange { year_min, year_max } => {
                write!(f, "year range is inverted: {year_min} > {year_max}")
            }
        }
    }
}

impl std::error::Error for FilterStateError {}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Every user-controlled filter input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Departments whose documents are shown.
    pub departments: BTreeSet<Department>,
    /// Inclusive lower year bound. Nodes without a year are never excluded.
    pub year_min: i32,
    /// Inclusive upper year bound.
    pub year_max: i32,
    /// Free-text query; non-matching nodes are dimmed, not hidden.
    #[serde(default)]
    pub search_query: String,
    /// Show only nodes lying on a cycle.
    #[serde(default)]
    pub show_cycles_only: bool,
    /// Cosmetic: whether the viewer draws node labels.
    #[serde(default)]
    pub show_labels: bool,
    /// Show nodes with no edges at all.
    #[serde(default = "default_true")]
    pub show_isolated: bool,
}

impl FilterState {
    /// The reset state: every department, the full year span, empty search,
    /// cycles-only off, labels off, isolated nodes shown.
    pub fn defaults(bounds: FilterBounds) -> Self {
        Self {
            departments: Department::ALL.into_iter().collect(),
            year_min: bounds.year_min,
            year_max: bounds.year_max,
            search_query: String::new(),
            show_cycles_only: false,
            show_labels: false,
            show_isolated: true,
        }
    }

    /// Checks the invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`FilterStateError::InvertedYearRange`] when
    /// `year_min > year_max`.
    pub fn validate(&self) -> Result<(), FilterStateError> {
        if self.year_min > self.year_max {
            return Err(FilterStateError::InvertedYearRange {
                year_min: self.year_min,
                year_max: self.year_max,
            });
        }
        Ok(())
    }

    /// Parses and validates a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`FilterStateError::Malformed`] when the text does not parse
    /// (including unknown department codes), or
    /// [`FilterStateError::InvertedYearRange`].
    pub fn from_record(text: &str) -> Result<Self, FilterStateError> {
        let state: FilterState =
            serde_json::from_str(text).map_err(|e| FilterStateError::Malformed(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }

    /// Serializes the state as a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`FilterStateError::Malformed`] if serialization fails, which
    /// cannot happen for this type in practice.
    pub fn to_record(&self) -> Result<String, FilterStateError> {
        serde_json::to_string(self).map_err(|e| FilterStateError::Malformed(e.to_string()))
    }

    /// Returns `true` if `department` is among the allowed departments.
    pub fn allows(&self, department: Department) -> bool {
        self.departments.contains(&department)
    }

    /// Returns `true` if `year` is unknown or lies within the range.
    pub fn year_in_range(&self, year: Option<i32>) -> bool {
        year.is_none_or(|y| (self.year_min..=self.year_max).contains(&y))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::enums::{DocumentKind, Provenance};
    use crate::structures::DocumentNode;

    #[test]
    fn defaults_select_everything() {
        let state = FilterState::defaults(FilterBounds {
            year_min: 2000,
            year_max: 2024,
        });
        assert_eq!(state.departments.len(), Department::ALL.len());
        assert!(state.show_isolated);
        assert!(!state.show_cycles_only);
        assert!(!state.show_labels);
        assert!(state.search_query.is_empty());
    }

    #[test]
    fn record_round_trips_every_field() {
        let mut state = FilterState::defaults(FilterBounds {
            year_min: 2001,
            year_max: 2020,
        });
        state.departments = [Department::Acd, Department::Bsrvd].into_iter().collect();
        state.search_query = "prudential".to_owned();
        state.show_cycles_only = true;
        state.show_labels = true;
        state.show_isolated = false;
        let record = state.to_record().expect("serialize");
        assert_eq!(FilterState::from_record(&record).expect("parse"), state);
    }

    #[test]
    fn record_uses_camel_case_keys_and_codes() {
        let state = FilterState::defaults(FilterBounds {
            year_min: 2010,
            year_max: 2011,
        });
        let v: serde_json::Value =
            serde_json::from_str(&state.to_record().expect("serialize")).expect("json");
        assert_eq!(v["yearMin"], 2010);
        assert_eq!(v["showIsolated"], true);
        assert_eq!(v["departments"][0], "ACD");
        assert!(v.get("searchQuery").is_some());
    }

    #[test]
    fn unknown_department_code_is_malformed() {
        let err = FilterState::from_record(
            r#"{"departments": ["XYZ"], "yearMin": 2000, "yearMax": 2001}"#,
        )
        .expect_err("unknown code");
        assert!(matches!(err, FilterStateError::Malformed(_)));
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let err = FilterState::from_record(
            r#"{"departments": [], "yearMin": 2010, "yearMax": 2000}"#,
        )
        .expect_err("inverted");
        assert_eq!(
            err,
            FilterStateError::InvertedYearRange {
                year_min: 2010,
                year_max: 2000
            }
        );
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let state = FilterState::from_record(
            r#"{"departments": ["BPRD"], "yearMin": 2000, "yearMax": 2001}"#,
        )
        .expect("parse");
        assert!(state.show_isolated);
        assert!(!state.show_labels);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            FilterState::from_record("{{"),
            Err(FilterStateError::Malformed(_))
        ));
    }

    #[test]
    fn bounds_span_known_years() {
        let mut a = DocumentNode::new("a", DocumentKind::Circular, Provenance::Authoritative);
        a.year = Some(2004);
        let mut b = DocumentNode::new("b", DocumentKind::Circular, Provenance::Authoritative);
        b.year = Some(2019);
        let c = DocumentNode::new("c", DocumentKind::Pdf, Provenance::Authoritative);
        let g = ReferenceGraph::from_parts(vec![a, b, c], vec![]).expect("graph");
        assert_eq!(
            FilterBounds::from_graph(&g),
            FilterBounds {
                year_min: 2004,
                year_max: 2019
            }
        );
        let empty = ReferenceGraph::from_parts(vec![], vec![]).expect("graph");
        assert_eq!(FilterBounds::from_graph(&empty), FilterBounds::UNBOUNDED);
    }

    #[test]
    fn unknown_year_is_always_in_range() {
        let state = FilterState::defaults(FilterBounds {
            year_min: 2010,
            year_max: 2012,
        });
        assert!(state.year_in_range(None));
        assert!(state.year_in_range(Some(2010)));
        assert!(!state.year_in_range(Some(2013)));
    }
}
