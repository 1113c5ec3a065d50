//! Semantic type registry.
//!
//! Built once at startup, immutable afterwards. Building checks everything that
//! could make a synthesis call go wrong later:
//! - every type has a constant producer,
//! - every operand type named by a template is registered (the registry is
//!   closed under operand references, cycles between types are fine),
//! - every template renders to a self-delimiting unit,
//! - narrow types are produced only by casts and the Boolean select.
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::catalog;
use crate::config::ExtraOperation;
use crate::error::ConfigError;
use crate::operation::{is_self_delimiting, Operation};
use crate::ty::{SemanticType, TypeDecl, TypeId};

#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    decls: IndexMap<TypeId, TypeDecl>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preloaded with the standard Java catalog.
    pub fn standard() -> Result<Self, ConfigError> {
        let mut builder = Self::new();
        for decl in catalog::standard_types()? {
            builder.register(decl)?;
        }
        Ok(builder)
    }

    pub fn register(&mut self, decl: TypeDecl) -> Result<&mut Self, ConfigError> {
        if self.decls.contains_key(&decl.id) {
            return Err(ConfigError::DuplicateType(decl.id));
        }
        self.decls.insert(decl.id.clone(), decl);
        Ok(self)
    }

    /// Append one template to an already registered result type.
    pub fn add_operation(&mut self, result: &TypeId, op: Operation) -> Result<&mut Self, ConfigError> {
        let decl = self
            .decls
            .get_mut(result)
            .ok_or_else(|| ConfigError::UnregisteredResult(result.clone()))?;
        decl.operations.push(op);
        Ok(self)
    }

    pub fn build(self) -> Result<Registry, ConfigError> {
        for decl in self.decls.values() {
            for (index, op) in decl.operations.iter().enumerate() {
                if let Some(missing) = op.operand_types().into_iter().find(|t| !self.decls.contains_key(*t)) {
                    return Err(ConfigError::UnregisteredOperand {
                        owner: decl.id.clone(),
                        index,
                        operand: missing.clone(),
                    });
                }
                let rendered = op.render_probe();
                if !is_self_delimiting(&rendered) {
                    return Err(ConfigError::NotSelfDelimiting { owner: decl.id.clone(), index, rendered });
                }
                if decl.narrow && !narrow_template_allowed(decl, op) {
                    return Err(ConfigError::NarrowArithmetic { owner: decl.id.clone(), index, rendered });
                }
            }
        }

        let mut types = IndexMap::with_capacity(self.decls.len());
        for (id, decl) in self.decls {
            let TypeDecl { id: _, name, constant, operations, narrow } = decl;
            let constant = constant.ok_or_else(|| ConfigError::MissingConstant(id.clone()))?;
            types.insert(id.clone(), SemanticType { id, name, constant, operations, narrow });
        }

        let registry = Registry { types };
        debug!(
            types = registry.len(),
            operations = registry.types().map(|t| t.operations().len()).sum::<usize>(),
            "registry built"
        );
        Ok(registry)
    }
}

/// Validated, read-only set of semantic types, in registration order.
#[derive(Debug, Clone)]
pub struct Registry {
    types: IndexMap<TypeId, SemanticType>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn standard() -> Result<Self, ConfigError> {
        RegistryBuilder::standard()?.build()
    }

    pub fn get(&self, id: &TypeId) -> Option<&SemanticType> {
        self.types.get(id)
    }

    pub fn resolve(&self, id: &TypeId) -> Result<&SemanticType, ConfigError> {
        self.get(id).ok_or_else(|| ConfigError::UnknownType(id.clone()))
    }

    pub fn types(&self) -> impl Iterator<Item = &SemanticType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// New registry with `extra` templates appended, fully re-validated.
    pub fn with_operations(&self, extra: &[ExtraOperation]) -> Result<Registry, ConfigError> {
        let mut builder = self.to_builder();
        for ExtraOperation { result, operation } in extra {
            builder.add_operation(result, operation.clone())?;
        }
        builder.build()
    }

    fn to_builder(&self) -> RegistryBuilder {
        let decls = self
            .types
            .iter()
            .map(|(id, ty)| {
                let decl = TypeDecl {
                    id: id.clone(),
                    name: ty.name.clone(),
                    constant: Some(ty.constant.clone()),
                    operations: ty.operations.clone(),
                    narrow: ty.narrow,
                };
                (id.clone(), decl)
            })
            .collect();
        RegistryBuilder { decls }
    }
}

/// `((name)(X))` with X of another non-Boolean type, or `(B ? T : T)`.
/// Anything else would have the promoted type `int`.
fn narrow_template_allowed(decl: &TypeDecl, op: &Operation) -> bool {
    match op {
        Operation::Unary { prefix, operand, suffix } => {
            *prefix == format!("(({})(", decl.name)
                && *suffix == "))"
                && operand != &decl.id
                && operand != &catalog::BOOLEAN
        }
        Operation::Ternary { prefix, cond, mid1, middle, mid2, right, suffix } => {
            *prefix == "("
                && *mid1 == " ? "
                && *mid2 == " : "
                && *suffix == ")"
                && cond == &catalog::BOOLEAN
                && middle == &decl.id
                && right == &decl.id
        }
        Operation::Binary { .. } => false,
    }
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// Process-wide standard registry, built on first use.
pub fn global() -> Result<&'static Registry, ConfigError> {
    GLOBAL.get_or_try_init(Registry::standard)
}
