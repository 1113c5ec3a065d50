//! Restrictable value generators.
//!
//! A generator is an immutable range descriptor; all randomness comes from the
//! RNG the caller passes to [`RestrictableGenerator::next`]. Restricting a
//! generator never touches RNG state, so a restricted generator can be bound to
//! a type once at registration time and shared by every synthesis call.
use rand::Rng;

use crate::error::ConfigError;

pub trait RestrictableGenerator: Sized {
    type Value;

    /// Draw one value from the generator's current domain.
    fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Value;

    /// Derive a generator whose outputs lie in `[lo, hi]` (inclusive) and
    /// inside the current domain.
    fn restrict(&self, lo: Self::Value, hi: Self::Value) -> Result<Self, ConfigError>;
}

// ------------------------------- Integers -------------------------------- //

/// Share of draws that come from the "interesting values" pool.
const INT_EDGE_BIAS: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntGenerator {
    lo: i64,
    hi: i64,
}

impl IntGenerator {
    pub const fn full() -> Self {
        Self { lo: i64::MIN, hi: i64::MAX }
    }
    pub fn bounds(&self) -> (i64, i64) {
        (self.lo, self.hi)
    }

    /// Bounds, zero, and powers of two nudged by one, all clamped into range.
    fn edge_value<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        match rng.gen_range(0..4u8) {
            0 => self.lo,
            1 => self.hi,
            2 => 0i64.clamp(self.lo, self.hi),
            _ => {
                let base = 1i64 << rng.gen_range(0..63u32);
                let signed = if rng.gen_bool(0.5) { base } else { -base };
                signed
                    .saturating_add(rng.gen_range(-1..=1i64))
                    .clamp(self.lo, self.hi)
            }
        }
    }
}

impl RestrictableGenerator for IntGenerator {
    type Value = i64;

    fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        if rng.gen_bool(INT_EDGE_BIAS) {
            self.edge_value(rng)
        } else {
            rng.gen_range(self.lo..=self.hi)
        }
    }

    fn restrict(&self, lo: i64, hi: i64) -> Result<Self, ConfigError> {
        let (lo2, hi2) = (self.lo.max(lo), self.hi.min(hi));
        if lo > hi || lo2 > hi2 {
            return Err(ConfigError::EmptyRange { lo: lo.to_string(), hi: hi.to_string() });
        }
        Ok(Self { lo: lo2, hi: hi2 })
    }
}

// -------------------------------- Floats --------------------------------- //

const FLOAT_SPECIALS: [f64; 5] = [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -0.0];

/// Floating point generator over a finite `[lo, hi]` range. When `specials` is
/// set, NaN, the infinities and signed zeros are mixed in as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatGenerator {
    lo: f64,
    hi: f64,
    specials: bool,
}

impl FloatGenerator {
    pub const fn full_f64() -> Self {
        Self { lo: f64::MIN, hi: f64::MAX, specials: true }
    }
    pub const fn full_f32() -> Self {
        Self { lo: f32::MIN as f64, hi: f32::MAX as f64, specials: true }
    }
    pub fn bounds(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }
    pub fn has_specials(&self) -> bool {
        self.specials
    }
}

impl RestrictableGenerator for FloatGenerator {
    type Value = f64;

    fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let roll = rng.gen_range(0..8u8);
        let v = match roll {
            0 if self.specials => FLOAT_SPECIALS[rng.gen_range(0..FLOAT_SPECIALS.len())],
            0 | 1 => match rng.gen_range(0..3u8) {
                0 => self.lo,
                1 => self.hi,
                _ => f64::MIN_POSITIVE,
            },
            2 | 3 => rng.gen_range(-128..=128i32) as f64,
            _ => {
                // interpolate instead of `hi - lo` so the full range can't overflow
                let t: f64 = rng.gen_range(0.0..=1.0);
                self.lo * (1.0 - t) + self.hi * t
            }
        };
        if v.is_finite() { v.clamp(self.lo, self.hi) } else { v }
    }

    fn restrict(&self, lo: f64, hi: f64) -> Result<Self, ConfigError> {
        let (lo2, hi2) = (self.lo.max(lo), self.hi.min(hi));
        if !(lo <= hi) || !(lo2 <= hi2) || !lo2.is_finite() || !hi2.is_finite() {
            return Err(ConfigError::EmptyRange { lo: lo.to_string(), hi: hi.to_string() });
        }
        Ok(Self { lo: lo2, hi: hi2, specials: false })
    }
}

// ------------------------------- Booleans -------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolGenerator {
    lo: bool,
    hi: bool,
}

impl BoolGenerator {
    pub const fn full() -> Self {
        Self { lo: false, hi: true }
    }
}

impl RestrictableGenerator for BoolGenerator {
    type Value = bool;

    fn next<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.lo == self.hi { self.lo } else { rng.gen_bool(0.5) }
    }

    fn restrict(&self, lo: bool, hi: bool) -> Result<Self, ConfigError> {
        let (lo2, hi2) = (self.lo || lo, self.hi && hi);
        if lo > hi || lo2 > hi2 {
            return Err(ConfigError::EmptyRange { lo: lo.to_string(), hi: hi.to_string() });
        }
        Ok(Self { lo: lo2, hi: hi2 })
    }
}
