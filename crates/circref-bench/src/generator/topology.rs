//! Reference topology: mostly backward citations in issue order, a share of
//! forward citations that can close cycles, orphans, and injected rings.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::rngs::StdRng;
use serde_json::Value;

use super::documents::{self, CircularDoc, YearEntries};
use super::{Corpus, GeneratorConfig};

/// Lists every document in issue order: year, then department, circulars
/// before letters.
fn enumerate_documents(config: &GeneratorConfig) -> Vec<CircularDoc> {
    let mut docs = Vec::new();
    for offset in 0..config.num_years {
        let year = config.first_year + offset as i32;
        for &department in &config.departments {
            for (count, letter) in [
                (config.circulars_per_year, false),
                (config.letters_per_year, true),
            ] {
                for number in 1..=count {
                    docs.push(CircularDoc {
                        department,
                        year,
                        number,
                        letter,
                    });
                }
            }
        }
    }
    docs
}

/// Picks the circular targets of document `i` among `n` documents.
fn pick_targets(
    config: &GeneratorConfig,
    rng: &mut StdRng,
    i: usize,
    n: usize,
) -> (BTreeSet<usize>, usize) {
    let mut targets = BTreeSet::new();
    let mut orphans = 0;
    for _ in 0..config.references_per_document {
        if rng.gen_bool(config.orphan_ratio) {
            orphans += 1;
            continue;
        }
        let forward = i + 1 < n && rng.gen_bool(config.forward_ratio);
        let target = if forward {
            rng.gen_range(i + 1..n)
        } else if i > 0 {
            rng.gen_range(0..i)
        } else {
            continue;
        };
        targets.insert(target);
    }
    (targets, orphans)
}

/// Builds a complete corpus from the generator configuration.
pub fn build_corpus(config: &GeneratorConfig, rng: &mut StdRng) -> Corpus {
    let docs = enumerate_documents(config);
    let n = docs.len();

    let mut targets: Vec<BTreeSet<usize>> = Vec::with_capacity(n);
    let mut orphans: Vec<usize> = Vec::with_capacity(n);
    for i in 0..n {
        let (t, o) = pick_targets(config, rng, i, n);
        targets.push(t);
        orphans.push(o);
    }

    if n >= 3 {
        for _ in 0..config.injected_rings {
            let a = rng.gen_range(0..n);
            let b = (a + 1 + rng.gen_range(0..n - 2)) % n;
            let mut c = rng.gen_range(0..n);
            while c == a || c == b {
                c = (c + 1) % n;
            }
            for (from, to) in [(a, b), (b, c), (c, a)] {
                if let Some(set) = targets.get_mut(from) {
                    set.insert(to);
                }
            }
        }
    }

    let mut corpus = Corpus {
        primaries: Vec::with_capacity(config.departments.len()),
        cache: None,
        documents: n,
        attachments: n * config.attachments_per_document,
        circular_references: targets.iter().map(BTreeSet::len).sum(),
        orphan_references: orphans.iter().sum(),
        cached_documents: 0,
    };

    let mut by_department: BTreeMap<&'static str, BTreeMap<i32, YearEntries>> = BTreeMap::new();
    let mut cache = serde_json::Map::new();
    for (i, doc) in docs.iter().enumerate() {
        let mut references: Vec<Value> = Vec::new();
        if let Some(set) = targets.get(i) {
            references.extend(
                set.iter()
                    .filter_map(|&j| docs.get(j))
                    .map(documents::circular_reference),
            );
        }
        let orphan_count = orphans.get(i).copied().unwrap_or(0);
        references.extend(
            (0..orphan_count).map(|k| documents::orphan_reference(doc, k, config.first_year)),
        );
        references.extend(
            (0..config.attachments_per_document).map(|k| documents::attachment(doc, k)),
        );

        let year = by_department
            .entry(doc.department)
            .or_default()
            .entry(doc.year)
            .or_default();
        let entry = documents::entry(doc, &references);
        if doc.letter {
            year.circular_letters.push(entry);
        } else {
            year.circulars.push(entry);
        }

        if rng.gen_bool(config.cache_ratio) {
            cache.insert(doc.reference_title(), documents::cache_entry(doc));
        }
    }

    for department in &config.departments {
        let years = by_department.remove(department).unwrap_or_default();
        let json = documents::primary_document(department, years);
        corpus.primaries.push((
            format!("{}.json", department.to_ascii_lowercase()),
            json.to_string(),
        ));
    }

    corpus.cached_documents = cache.len();
    if !cache.is_empty() {
        corpus.cache = Some(("cache.json".to_owned(), Value::Object(cache).to_string()));
    }
    corpus
}
