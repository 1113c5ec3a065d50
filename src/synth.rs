//! Term synthesizer.
//!
//! Given a target type and a depth budget, either emit a constant of that type
//! or pick one of its operation templates and synthesize every operand with the
//! budget reduced by one. The budget strictly decreases on every step, so the
//! recursion terminates even though types reference each other cyclically
//! (`Boolean` compares `Int32`s, `Int32` selects on a `Boolean`, ...).
//!
//! All randomness comes from the [`GenerationContext`] owned by the caller.
//! Same `(type, seed, depth)` → same text, on any thread.
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::trace;

use crate::config::validate_leaf_bias;
use crate::error::ConfigError;
use crate::operation::Operation;
use crate::registry::Registry;
use crate::ty::{SemanticType, TypeId};

/// Per-request state: remaining depth budget and the RNG. Never shared.
#[derive(Debug)]
pub struct GenerationContext<R = StdRng> {
    depth_budget: u32,
    rng: R,
}

impl GenerationContext<StdRng> {
    pub fn seeded(seed: u64, max_depth: u32) -> Self {
        Self::new(StdRng::seed_from_u64(seed), max_depth)
    }
}

impl<R: Rng> GenerationContext<R> {
    pub fn new(rng: R, max_depth: u32) -> Self {
        Self { depth_budget: max_depth, rng }
    }
    pub fn depth_budget(&self) -> u32 {
        self.depth_budget
    }
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Run `f` one level deeper; the budget is restored afterwards.
    fn descend<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.depth_budget;
        self.depth_budget = saved.saturating_sub(1);
        let out = f(self);
        self.depth_budget = saved;
        out
    }
}

/// A synthesized expression: rendered text plus its static type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub ty: TypeId,
    pub text: String,
    /// Nested operation applications; 0 for a constant.
    pub depth: u32,
}

impl Term {
    pub fn is_leaf(&self) -> bool {
        self.depth == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'r> {
    registry: &'r Registry,
    leaf_bias: f64,
}

impl<'r> Synthesizer<'r> {
    pub fn new(registry: &'r Registry, leaf_bias: f64) -> Result<Self, ConfigError> {
        validate_leaf_bias(leaf_bias)?;
        Ok(Self { registry, leaf_bias })
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }
    pub fn leaf_bias(&self) -> f64 {
        self.leaf_bias
    }

    /// One expression of `target` from a fresh seeded context.
    pub fn synthesize_seeded(&self, target: &SemanticType, seed: u64, max_depth: u32) -> String {
        let mut ctx = GenerationContext::seeded(seed, max_depth);
        self.synthesize(target, &mut ctx).text
    }

    /// Like [`Self::synthesize`], looking the type up by id first.
    pub fn synthesize_id<R: Rng>(
        &self,
        target: &TypeId,
        ctx: &mut GenerationContext<R>,
    ) -> Result<Term, ConfigError> {
        let ty = self.registry.resolve(target)?;
        Ok(self.synthesize(ty, ctx))
    }

    pub fn synthesize<R: Rng>(&self, ty: &SemanticType, ctx: &mut GenerationContext<R>) -> Term {
        let ops = ty.operations();
        if ctx.depth_budget == 0 || ops.is_empty() || ctx.rng.gen_bool(self.leaf_bias) {
            return self.leaf(ty, ctx);
        }
        let op = &ops[ctx.rng.gen_range(0..ops.len())];
        match self.compose(ty, op, ctx) {
            Some(term) => term,
            // operands are resolved at registry build, so this only guards the lookup
            None => self.leaf(ty, ctx),
        }
    }

    fn leaf<R: Rng>(&self, ty: &SemanticType, ctx: &mut GenerationContext<R>) -> Term {
        let literal = ty.constant(&mut ctx.rng);
        trace!(ty = %ty.id(), text = %literal.text, "leaf");
        Term { ty: ty.id().clone(), text: literal.text, depth: 0 }
    }

    fn compose<R: Rng>(
        &self,
        ty: &SemanticType,
        op: &Operation,
        ctx: &mut GenerationContext<R>,
    ) -> Option<Term> {
        let operand_types = op
            .operand_types()
            .into_iter()
            .map(|id| self.registry.get(id))
            .collect::<Option<Vec<_>>>()?;

        let operands: Vec<Term> = ctx.descend(|ctx| {
            operand_types.into_iter().map(|t| self.synthesize(t, ctx)).collect()
        });
        let depth = 1 + operands.iter().map(|t| t.depth).max().unwrap_or(0);
        let texts: Vec<&str> = operands.iter().map(|t| t.text.as_str()).collect();
        let text = op.render(texts.as_slice());
        trace!(ty = %ty.id(), depth, "composite");
        Some(Term { ty: ty.id().clone(), text, depth })
    }
}
