//! Circular corpus generator.
//!
//! Produces primary department documents and a content cache as JSON text,
//! ready to be served by a [`circref_core::SourceFetcher`], together with the
//! counts a build over them must report.

pub mod documents;
pub mod topology;

use std::collections::HashMap;

use circref_core::SourceManifest;
use rand::SeedableRng;
use rand::rngs::StdRng;

use topology::build_corpus;

/// Configuration for the corpus generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Department codes; one primary document is emitted per code.
    pub departments: Vec<&'static str>,
    /// First issue year. Keep it after 2006 so codes resolve to their
    /// modern departments.
    pub first_year: i32,
    /// Number of consecutive issue years.
    pub num_years: usize,
    /// Circulars per department per year.
    pub circulars_per_year: usize,
    /// Circular letters per department per year.
    pub letters_per_year: usize,
    /// Circular references attempted per document.
    pub references_per_document: usize,
    /// PDF and web references per document, alternating.
    pub attachments_per_document: usize,
    /// Fraction of circular references that point to a later document
    /// (0.0-1.0). Any non-zero value can close cycles.
    pub forward_ratio: f64,
    /// Fraction of circular references that name no document (0.0-1.0).
    pub orphan_ratio: f64,
    /// Number of three-document reference rings injected on top.
    pub injected_rings: usize,
    /// Fraction of documents that also get a content cache entry (0.0-1.0).
    pub cache_ratio: f64,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~50 documents, ~200 edges
    Small,
    /// ~600 documents, ~3000 edges
    Medium,
    /// ~2250 documents, ~14000 edges
    Large,
    /// ~6000 documents, ~40000 edges
    XLarge,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let base = GeneratorConfig {
            seed,
            departments: vec!["BPRD", "ACD", "BSRVD"],
            first_year: 2007,
            num_years: 2,
            circulars_per_year: 6,
            letters_per_year: 2,
            references_per_document: 3,
            attachments_per_document: 1,
            forward_ratio: 0.05,
            orphan_ratio: 0.05,
            injected_rings: 2,
            cache_ratio: 0.2,
        };
        match self {
            SizeTier::Small => base,
            SizeTier::Medium => GeneratorConfig {
                num_years: 5,
                circulars_per_year: 30,
                letters_per_year: 10,
                references_per_document: 4,
                injected_rings: 10,
                ..base
            },
            SizeTier::Large => GeneratorConfig {
                num_years: 10,
                circulars_per_year: 60,
                letters_per_year: 15,
                references_per_document: 5,
                attachments_per_document: 2,
                injected_rings: 40,
                ..base
            },
            SizeTier::XLarge => GeneratorConfig {
                num_years: 10,
                circulars_per_year: 150,
                letters_per_year: 50,
                references_per_document: 5,
                attachments_per_document: 2,
                injected_rings: 100,
                ..base
            },
        }
    }
}

/// A generated set of sources plus the counts a build must reproduce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    /// `(location, json)` per primary document.
    pub primaries: Vec<(String, String)>,
    /// `(location, json)` of the content cache, when any entry was emitted.
    pub cache: Option<(String, String)>,
    /// Circulars and circular letters across every department.
    pub documents: usize,
    /// PDF and web references; each becomes its own node.
    pub attachments: usize,
    /// Distinct document-to-document references.
    pub circular_references: usize,
    /// References that name no document.
    pub orphan_references: usize,
    /// Documents that also have a cache entry.
    pub cached_documents: usize,
}

impl Corpus {
    /// The manifest naming every generated source.
    pub fn manifest(&self) -> SourceManifest {
        SourceManifest {
            primaries: self.primaries.iter().map(|(loc, _)| loc.clone()).collect(),
            cache: self.cache.as_ref().map(|(loc, _)| loc.clone()),
        }
    }

    /// An in-memory fetcher serving every generated source.
    pub fn fetcher(&self) -> HashMap<String, String> {
        self.primaries
            .iter()
            .chain(self.cache.as_ref())
            .cloned()
            .collect()
    }

    /// Nodes a build must produce.
    pub fn expected_nodes(&self) -> usize {
        self.documents + self.attachments
    }

    /// Edges a build must produce.
    pub fn expected_edges(&self) -> usize {
        self.circular_references + self.attachments
    }
}

/// Generates a corpus from the given configuration.
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_corpus(config: &GeneratorConfig) -> Corpus {
    let mut rng = StdRng::seed_from_u64(config.seed);
    build_corpus(config, &mut rng)
}
