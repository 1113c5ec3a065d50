//! Synthesis configuration (JSON file + CLI overrides).
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::operation::Operation;
use crate::ty::TypeId;

pub const DEFAULT_MAX_DEPTH: u32 = 4;
pub const DEFAULT_LEAF_BIAS: f64 = 0.2;

/// Extra template contributed by the user, appended to `result`'s operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraOperation {
    pub result: TypeId,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    pub seed: u64,
    pub max_depth: u32,
    /// Probability of stopping early with a constant while budget remains.
    pub leaf_bias: f64,
    pub extra_operations: Vec<ExtraOperation>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            leaf_bias: DEFAULT_LEAF_BIAS,
            extra_operations: Vec::new(),
        }
    }
}

impl SynthConfig {
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = from_str_with_path(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_leaf_bias(self.leaf_bias)
    }
}

pub fn validate_leaf_bias(p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) { Ok(()) } else { Err(ConfigError::LeafBias(p)) }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ConfigError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ConfigError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = SynthConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SynthConfig::default());
    }

    #[test]
    fn extra_operations_parse() {
        let src = r#"{
            "seed": 7,
            "leaf_bias": 0.5,
            "extra_operations": [
                {"result": "Int32", "operation": {"kind": "binary", "prefix": "Integer.max(", "left": "Int32", "infix": ", ", "right": "Int32", "suffix": ")"}}
            ]
        }"#;
        let cfg = SynthConfig::from_json_str(src).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(cfg.extra_operations.len(), 1);
        assert_eq!(cfg.extra_operations[0].operation.arity(), 2);
    }

    #[test]
    fn parse_errors_carry_the_json_path() {
        let src = r#"{"extra_operations": [{"result": 5, "operation": {"kind": "unary", "prefix": "(!", "operand": "Boolean", "suffix": ")"}}]}"#;
        let ConfigError::Parse { path, .. } = SynthConfig::from_json_str(src).unwrap_err() else {
            panic!("expected a parse error");
        };
        assert_eq!(path, "extra_operations[0].result");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(SynthConfig::from_json_str(r#"{"depth": 3}"#), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn leaf_bias_out_of_range() {
        assert_eq!(SynthConfig::from_json_str(r#"{"leaf_bias": 1.5}"#).unwrap_err(), ConfigError::LeafBias(1.5));
        assert!(validate_leaf_bias(f64::NAN).is_err());
        assert!(validate_leaf_bias(0.0).is_ok());
        assert!(validate_leaf_bias(1.0).is_ok());
    }
}
