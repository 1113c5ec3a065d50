//! Configuration errors.
//!
//! These are the only failures the engine knows about. They are detected while the
//! registry or the config is being built; a successful synthesis call never errors.
use thiserror::Error;

use crate::ty::TypeId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("type `{0}` is registered twice")]
    DuplicateType(TypeId),

    #[error("type `{0}` has no constant producer")]
    MissingConstant(TypeId),

    /// An operation template names an operand type the registry does not know.
    #[error("operation #{index} of `{owner}` references unregistered operand type `{operand}`")]
    UnregisteredOperand {
        owner: TypeId,
        index: usize,
        operand: TypeId,
    },

    /// Extra operations were declared for a result type that is not registered.
    #[error("extra operation targets unregistered result type `{0}`")]
    UnregisteredResult(TypeId),

    #[error("unknown type `{0}`")]
    UnknownType(TypeId),

    /// Rendered output of the template would not be a single parenthesized unit.
    #[error("operation #{index} of `{owner}` is not self-delimiting: `{rendered}`")]
    NotSelfDelimiting {
        owner: TypeId,
        index: usize,
        rendered: String,
    },

    /// A narrow type got a template other than a cast or the Boolean select.
    #[error("operation #{index} of narrow type `{owner}` is neither a cast nor a select: `{rendered}`")]
    NarrowArithmetic {
        owner: TypeId,
        index: usize,
        rendered: String,
    },

    #[error("empty range [{lo}, {hi}]")]
    EmptyRange { lo: String, hi: String },

    #[error("leaf bias must lie in [0, 1], got {0}")]
    LeafBias(f64),

    #[error("config parse error at {path}: {message}")]
    Parse { path: String, message: String },
}
