//! Synthetic circular corpus generator and benchmark utilities for circref.
//!
//! This crate provides deterministic generation of department documents and
//! content caches shaped like the real inputs, for benchmarking and
//! property-based testing of `circref-core`.

pub mod generator;

pub use generator::{Corpus, GeneratorConfig, SizeTier, generate_corpus};
