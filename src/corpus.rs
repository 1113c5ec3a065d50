//! Parallel corpus generation.
//!
//! Every entry gets its own seed derived from `(plan.seed, index)` and its own
//! [`GenerationContext`], so the corpus is identical no matter how rayon
//! schedules the work.
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExtraOperation;
use crate::error::ConfigError;
use crate::synth::{GenerationContext, Synthesizer};
use crate::ty::{SemanticType, TypeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusPlan {
    pub seed: u64,
    pub count: usize,
    pub max_depth: u32,
    /// Target types, used round-robin. Empty means every registered type.
    pub types: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub index: usize,
    pub seed: u64,
    pub ty: TypeId,
    pub max_depth: u32,
    pub depth: u32,
    pub text: String,
}

/// Everything needed to regenerate the entries bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub max_depth: u32,
    pub leaf_bias: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_operations: Vec<ExtraOperation>,
    pub entries: Vec<CorpusEntry>,
}

impl Corpus {
    /// One JSON entry per line.
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// SplitMix64 step over `base ^ index`, spreading neighbouring indices apart.
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn generate(
    synth: &Synthesizer<'_>,
    plan: &CorpusPlan,
    extra_operations: &[ExtraOperation],
) -> Result<Corpus, ConfigError> {
    let registry = synth.registry();
    let targets: Vec<&SemanticType> = if plan.types.is_empty() {
        registry.types().collect()
    } else {
        plan.types.iter().map(|id| registry.resolve(id)).collect::<Result<_, _>>()?
    };
    debug!(count = plan.count, types = targets.len(), max_depth = plan.max_depth, "generating corpus");

    let entries: Vec<CorpusEntry> = if targets.is_empty() {
        Vec::new()
    } else {
        (0..plan.count)
            .into_par_iter()
            .map(|index| {
                let ty = targets[index % targets.len()];
                let seed = derive_seed(plan.seed, index as u64);
                let mut ctx = GenerationContext::seeded(seed, plan.max_depth);
                let term = synth.synthesize(ty, &mut ctx);
                CorpusEntry {
                    index,
                    seed,
                    ty: term.ty,
                    max_depth: plan.max_depth,
                    depth: term.depth,
                    text: term.text,
                }
            })
            .collect()
    };

    Ok(Corpus {
        generated_at: Utc::now(),
        seed: plan.seed,
        max_depth: plan.max_depth,
        leaf_bias: synth.leaf_bias(),
        extra_operations: extra_operations.to_vec(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BOOLEAN, INT8};
    use crate::registry::Registry;

    fn plan(count: usize, types: Vec<TypeId>) -> CorpusPlan {
        CorpusPlan { seed: 1234, count, max_depth: 3, types }
    }

    #[test]
    fn corpus_is_reproducible() {
        let reg = Registry::standard().unwrap();
        let synth = Synthesizer::new(&reg, 0.2).unwrap();
        let a = generate(&synth, &plan(64, vec![]), &[]).unwrap();
        let b = generate(&synth, &plan(64, vec![]), &[]).unwrap();
        assert_eq!(a.entries, b.entries);
        assert_eq!(a.entries.len(), 64);
        assert!(a.entries.iter().enumerate().all(|(i, e)| e.index == i));
    }

    #[test]
    fn entries_match_single_shot_synthesis() {
        let reg = Registry::standard().unwrap();
        let synth = Synthesizer::new(&reg, 0.2).unwrap();
        let corpus = generate(&synth, &plan(16, vec![INT8, BOOLEAN]), &[]).unwrap();
        for e in &corpus.entries {
            let expected_ty = if e.index % 2 == 0 { &INT8 } else { &BOOLEAN };
            assert_eq!(&e.ty, expected_ty);
            let again = synth.synthesize_seeded(reg.resolve(&e.ty).unwrap(), e.seed, e.max_depth);
            assert_eq!(again, e.text);
            assert!(e.depth <= e.max_depth);
        }
    }

    #[test]
    fn unknown_plan_type_fails() {
        let reg = Registry::standard().unwrap();
        let synth = Synthesizer::new(&reg, 0.2).unwrap();
        let err = generate(&synth, &plan(4, vec![TypeId::from("Quad")]), &[]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownType(TypeId::from("Quad")));
    }

    #[test]
    fn derived_seeds_differ() {
        let seeds: std::collections::BTreeSet<u64> = (0..1_000).map(|i| derive_seed(0, i)).collect();
        assert_eq!(seeds.len(), 1_000);
        assert_eq!(derive_seed(7, 3), derive_seed(7, 3));
    }

    #[test]
    fn ndjson_has_one_line_per_entry() {
        let reg = Registry::standard().unwrap();
        let synth = Synthesizer::new(&reg, 0.2).unwrap();
        let corpus = generate(&synth, &plan(5, vec![]), &[]).unwrap();
        let nd = corpus.to_ndjson().unwrap();
        assert_eq!(nd.lines().count(), 5);
        let first: CorpusEntry = serde_json::from_str(nd.lines().next().unwrap()).unwrap();
        assert_eq!(first, corpus.entries[0]);
    }

    #[test]
    fn corpus_json_round_trips() {
        let reg = Registry::standard().unwrap();
        let synth = Synthesizer::new(&reg, 0.2).unwrap();
        let corpus = generate(&synth, &plan(3, vec![]), &[]).unwrap();
        let json = serde_json::to_string(&corpus).unwrap();
        let back: Corpus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, corpus);
    }
}
