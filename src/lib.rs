//! Typed term synthesis for compiler/JIT stress testing.
//!
//! Produces random Java expressions that are type-correct by construction,
//! bounded in nesting depth and reproducible from a seed.
//!
//! Pipeline:
//! - [`catalog`] declares the primitive types and their operation templates,
//! - [`registry`] validates them once (closed under operand types),
//! - [`synth`] recursively instantiates templates under a depth budget,
//! - [`corpus`] fans that out over rayon, [`codegen`] wraps it in a class.
pub mod catalog;
pub mod codegen;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generator;
pub mod operation;
pub mod registry;
pub mod synth;
pub mod ty;

pub use error::ConfigError;
pub use registry::{Registry, RegistryBuilder};
pub use synth::{GenerationContext, Synthesizer, Term};
pub use ty::{SemanticType, TypeId};

/// One expression of `target` over the standard registry with the default leaf bias.
pub fn synthesize(target: &TypeId, seed: u64, max_depth: u32) -> Result<String, ConfigError> {
    let registry = registry::global()?;
    let synth = Synthesizer::new(registry, config::DEFAULT_LEAF_BIAS)?;
    Ok(synth.synthesize_seeded(registry.resolve(target)?, seed, max_depth))
}
