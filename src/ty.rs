// src/ty.rs
//! Semantic types: a named value domain, its constant producer and the
//! operation templates that produce values of it.
//!
//! Types are declared with [`TypeDecl`] and become [`SemanticType`] only after
//! the registry has validated them, so a registered type always has a constant
//! producer.
use std::borrow::Cow;
use std::fmt;

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generator::{BoolGenerator, FloatGenerator, IntGenerator, RestrictableGenerator};
use crate::operation::Operation;

/// Registry key of a semantic type (`Int8`, `Boolean`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(Cow<'static, str>);

impl TypeId {
    pub const fn from_static(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeId {
    fn from(s: &str) -> Self {
        Self(Cow::Owned(s.to_owned()))
    }
}

impl From<String> for TypeId {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------- Literals -------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Bool(bool),
    Int(i64),
    /// f32 constants are stored already rounded to f32.
    Float(OrderedFloat<f64>),
}

/// Rendered source text of one constant, bounded to its type's domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub text: String,
    pub value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntStyle {
    /// `-17`
    Plain,
    /// `-17L`
    Long,
    /// `(byte)-17`
    Cast(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Constant producer bound to a (usually restricted) generator.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantProducer {
    Bool(BoolGenerator),
    Int { source: IntGenerator, style: IntStyle },
    Float { source: FloatGenerator, width: FloatWidth },
}

impl ConstantProducer {
    pub fn produce<R: Rng + ?Sized>(&self, rng: &mut R) -> Literal {
        match self {
            Self::Bool(source) => {
                let v = source.next(rng);
                Literal { text: v.to_string(), value: LiteralValue::Bool(v) }
            }
            Self::Int { source, style } => {
                let v = source.next(rng);
                let text = match style {
                    IntStyle::Plain => v.to_string(),
                    IntStyle::Long => format!("{v}L"),
                    IntStyle::Cast(name) => format!("({name}){v}"),
                };
                Literal { text, value: LiteralValue::Int(v) }
            }
            Self::Float { source, width } => {
                let v = source.next(rng);
                match width {
                    FloatWidth::F32 => {
                        let v = v as f32;
                        Literal {
                            text: render_float("Float", v as f64, format!("{v:?}f")),
                            value: LiteralValue::Float(OrderedFloat(v as f64)),
                        }
                    }
                    FloatWidth::F64 => Literal {
                        text: render_float("Double", v, format!("{v:?}")),
                        value: LiteralValue::Float(OrderedFloat(v)),
                    },
                }
            }
        }
    }
}

fn render_float(boxed: &str, v: f64, finite: String) -> String {
    if v.is_nan() {
        format!("{boxed}.NaN")
    } else if v == f64::INFINITY {
        format!("{boxed}.POSITIVE_INFINITY")
    } else if v == f64::NEG_INFINITY {
        format!("{boxed}.NEGATIVE_INFINITY")
    } else {
        finite
    }
}

// --------------------------------- Types --------------------------------- //

/// A type as declared, before registry validation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub id: TypeId,
    /// Source spelling, used in casts and diagnostics.
    pub name: Cow<'static, str>,
    pub constant: Option<ConstantProducer>,
    pub operations: Vec<Operation>,
    /// Narrower than `int`: only `((name)(X))` casts and the Boolean select
    /// may produce it, since arithmetic promotes its operands.
    pub narrow: bool,
}

impl TypeDecl {
    pub fn new(id: TypeId, name: impl Into<Cow<'static, str>>) -> Self {
        Self { id, name: name.into(), constant: None, operations: Vec::new(), narrow: false }
    }
    pub fn as_narrow(mut self) -> Self {
        self.narrow = true;
        self
    }
    pub fn with_constant(mut self, constant: ConstantProducer) -> Self {
        self.constant = Some(constant);
        self
    }
    pub fn with_operations(mut self, ops: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(ops);
        self
    }
}

/// A registered, validated semantic type. Immutable once the registry is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticType {
    pub(crate) id: TypeId,
    pub(crate) name: Cow<'static, str>,
    pub(crate) constant: ConstantProducer,
    pub(crate) operations: Vec<Operation>,
    pub(crate) narrow: bool,
}

impl SemanticType {
    pub fn id(&self) -> &TypeId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn constant<R: Rng + ?Sized>(&self, rng: &mut R) -> Literal {
        self.constant.produce(rng)
    }
    /// Templates whose result type is this type, in registration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
    pub fn is_narrow(&self) -> bool {
        self.narrow
    }
}
