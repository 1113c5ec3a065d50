//! Standard catalog: the Java primitive types.
//!
//! Narrow types (`byte`, `short`, `char`) never get arithmetic templates of
//! their own. Java promotes their operands to `int`, so arithmetic over them
//! only appears inside `Int32` templates and comes back down through a cast.
use crate::error::ConfigError;
use crate::generator::{BoolGenerator, FloatGenerator, IntGenerator, RestrictableGenerator};
use crate::operation::Operation;
use crate::ty::{ConstantProducer, FloatWidth, IntStyle, TypeDecl, TypeId};

pub const BOOLEAN: TypeId = TypeId::from_static("Boolean");
pub const INT8: TypeId = TypeId::from_static("Int8");
pub const INT16: TypeId = TypeId::from_static("Int16");
pub const CHAR16: TypeId = TypeId::from_static("Char16");
pub const INT32: TypeId = TypeId::from_static("Int32");
pub const INT64: TypeId = TypeId::from_static("Int64");
pub const FLOAT32: TypeId = TypeId::from_static("Float32");
pub const FLOAT64: TypeId = TypeId::from_static("Float64");

/// Types narrower than `int`.
pub const NARROW: [TypeId; 3] = [INT8, INT16, CHAR16];

pub fn standard_types() -> Result<Vec<TypeDecl>, ConfigError> {
    let ints = IntGenerator::full();
    Ok(vec![
        boolean(),
        narrow(INT8, "byte", ints.restrict(-128, 127)?, &[INT16, CHAR16, INT32, INT64, FLOAT32, FLOAT64]),
        narrow(INT16, "short", ints.restrict(-32768, 32767)?, &[CHAR16, INT32, INT64, FLOAT32, FLOAT64]),
        narrow(CHAR16, "char", ints.restrict(0, 65535)?, &[INT16, INT32, INT64, FLOAT32, FLOAT64]),
        int32(ints.restrict(i32::MIN as i64, i32::MAX as i64)?),
        int64(ints),
        float32(),
        float64(),
    ])
}

// ------------------------------- Helpers --------------------------------- //

fn un(prefix: &'static str, t: TypeId, suffix: &'static str) -> Operation {
    Operation::unary(prefix, t, suffix)
}

fn bin(l: TypeId, infix: &'static str, r: TypeId) -> Operation {
    Operation::binary("(", l, infix, r, ")")
}

fn call2(name: &'static str, l: TypeId, r: TypeId) -> Operation {
    Operation::binary(name, l, ", ", r, ")")
}

fn select(t: TypeId) -> Operation {
    Operation::ternary("(", BOOLEAN, " ? ", t.clone(), " : ", t, ")")
}

fn cast(name: &str, from: TypeId) -> Operation {
    Operation::unary(format!("(({name})("), from, "))")
}

// --------------------------------- Types --------------------------------- //

fn boolean() -> TypeDecl {
    TypeDecl::new(BOOLEAN, "boolean")
        .with_constant(ConstantProducer::Bool(BoolGenerator::full()))
        .with_operations([
            un("(!", BOOLEAN, ")"),
            bin(BOOLEAN, " && ", BOOLEAN),
            bin(BOOLEAN, " || ", BOOLEAN),
            bin(BOOLEAN, " ^ ", BOOLEAN),
            bin(BOOLEAN, " == ", BOOLEAN),
            bin(BOOLEAN, " != ", BOOLEAN),
            bin(INT32, " < ", INT32),
            bin(INT32, " <= ", INT32),
            bin(INT32, " == ", INT32),
            bin(INT32, " != ", INT32),
            bin(INT64, " < ", INT64),
            bin(INT64, " >= ", INT64),
            bin(INT64, " == ", INT64),
            bin(FLOAT32, " < ", FLOAT32),
            bin(FLOAT32, " == ", FLOAT32),
            bin(FLOAT64, " > ", FLOAT64),
            bin(FLOAT64, " != ", FLOAT64),
            bin(INT8, " < ", INT8),
            bin(INT16, " == ", INT16),
            bin(CHAR16, " > ", CHAR16),
            un("Float.isNaN(", FLOAT32, ")"),
            un("Float.isFinite(", FLOAT32, ")"),
            un("Double.isNaN(", FLOAT64, ")"),
            un("Double.isInfinite(", FLOAT64, ")"),
            select(BOOLEAN),
        ])
}

fn narrow(id: TypeId, name: &'static str, range: IntGenerator, wider: &[TypeId]) -> TypeDecl {
    let constant = ConstantProducer::Int { source: range, style: IntStyle::Cast(name) };
    let mut ops: Vec<Operation> = wider.iter().map(|from| cast(name, from.clone())).collect();
    ops.push(select(id.clone()));
    TypeDecl::new(id, name).as_narrow().with_constant(constant).with_operations(ops)
}

fn int32(range: IntGenerator) -> TypeDecl {
    TypeDecl::new(INT32, "int")
        .with_constant(ConstantProducer::Int { source: range, style: IntStyle::Plain })
        .with_operations([
            un("(-(", INT32, "))"),
            un("(~", INT32, ")"),
            bin(INT32, " + ", INT32),
            bin(INT32, " - ", INT32),
            bin(INT32, " * ", INT32),
            bin(INT32, " & ", INT32),
            bin(INT32, " | ", INT32),
            bin(INT32, " ^ ", INT32),
            bin(INT32, " << ", INT32),
            bin(INT32, " >> ", INT32),
            bin(INT32, " >>> ", INT32),
            // promoted arithmetic over the narrow types
            bin(INT8, " + ", INT8),
            bin(INT8, " * ", INT16),
            bin(INT16, " - ", INT16),
            bin(CHAR16, " + ", CHAR16),
            bin(CHAR16, " & ", INT8),
            bin(INT16, " >> ", INT32),
            call2("Integer.min(", INT32, INT32),
            call2("Integer.max(", INT32, INT32),
            call2("Integer.rotateLeft(", INT32, INT32),
            call2("Integer.compare(", INT32, INT32),
            call2("Long.compare(", INT64, INT64),
            call2("Float.compare(", FLOAT32, FLOAT32),
            call2("Double.compare(", FLOAT64, FLOAT64),
            call2("Boolean.compare(", BOOLEAN, BOOLEAN),
            un("Integer.bitCount(", INT32, ")"),
            un("Integer.reverse(", INT32, ")"),
            un("Integer.reverseBytes(", INT32, ")"),
            un("Integer.numberOfLeadingZeros(", INT32, ")"),
            un("Integer.signum(", INT32, ")"),
            un("Long.bitCount(", INT64, ")"),
            un("Long.signum(", INT64, ")"),
            un("Float.floatToRawIntBits(", FLOAT32, ")"),
            cast("int", INT64),
            cast("int", FLOAT32),
            cast("int", FLOAT64),
            select(INT32),
        ])
}

fn int64(range: IntGenerator) -> TypeDecl {
    TypeDecl::new(INT64, "long")
        .with_constant(ConstantProducer::Int { source: range, style: IntStyle::Long })
        .with_operations([
            un("(-(", INT64, "))"),
            un("(~", INT64, ")"),
            bin(INT64, " + ", INT64),
            bin(INT64, " - ", INT64),
            bin(INT64, " * ", INT64),
            bin(INT64, " & ", INT64),
            bin(INT64, " | ", INT64),
            bin(INT64, " ^ ", INT64),
            bin(INT64, " << ", INT32),
            bin(INT64, " >> ", INT32),
            bin(INT64, " >>> ", INT32),
            bin(INT32, " + ", INT64),
            call2("Long.min(", INT64, INT64),
            call2("Long.max(", INT64, INT64),
            call2("Long.rotateRight(", INT64, INT32),
            un("Long.reverse(", INT64, ")"),
            un("Long.reverseBytes(", INT64, ")"),
            un("Long.highestOneBit(", INT64, ")"),
            un("Math.abs(", INT64, ")"),
            un("Double.doubleToRawLongBits(", FLOAT64, ")"),
            cast("long", FLOAT32),
            cast("long", FLOAT64),
            select(INT64),
        ])
}

fn float32() -> TypeDecl {
    TypeDecl::new(FLOAT32, "float")
        .with_constant(ConstantProducer::Float {
            source: FloatGenerator::full_f32(),
            width: FloatWidth::F32,
        })
        .with_operations([
            un("(-(", FLOAT32, "))"),
            bin(FLOAT32, " + ", FLOAT32),
            bin(FLOAT32, " - ", FLOAT32),
            bin(FLOAT32, " * ", FLOAT32),
            bin(FLOAT32, " / ", FLOAT32),
            bin(FLOAT32, " % ", FLOAT32),
            bin(FLOAT32, " * ", INT32),
            call2("Math.min(", FLOAT32, FLOAT32),
            call2("Math.max(", FLOAT32, FLOAT32),
            call2("Math.copySign(", FLOAT32, FLOAT32),
            un("Math.abs(", FLOAT32, ")"),
            un("Math.signum(", FLOAT32, ")"),
            un("Float.intBitsToFloat(", INT32, ")"),
            Operation::ternary("Math.fma(", FLOAT32, ", ", FLOAT32, ", ", FLOAT32, ")"),
            cast("float", INT64),
            cast("float", FLOAT64),
            select(FLOAT32),
        ])
}

fn float64() -> TypeDecl {
    TypeDecl::new(FLOAT64, "double")
        .with_constant(ConstantProducer::Float {
            source: FloatGenerator::full_f64(),
            width: FloatWidth::F64,
        })
        .with_operations([
            un("(-(", FLOAT64, "))"),
            bin(FLOAT64, " + ", FLOAT64),
            bin(FLOAT64, " - ", FLOAT64),
            bin(FLOAT64, " * ", FLOAT64),
            bin(FLOAT64, " / ", FLOAT64),
            bin(FLOAT64, " % ", FLOAT64),
            bin(FLOAT64, " + ", FLOAT32),
            bin(FLOAT64, " * ", INT64),
            call2("Math.min(", FLOAT64, FLOAT64),
            call2("Math.max(", FLOAT64, FLOAT64),
            call2("Math.pow(", FLOAT64, FLOAT64),
            un("Math.abs(", FLOAT64, ")"),
            un("Math.sqrt(", FLOAT64, ")"),
            un("Math.sin(", FLOAT64, ")"),
            un("Math.floor(", FLOAT64, ")"),
            un("Double.longBitsToDouble(", INT64, ")"),
            Operation::ternary("Math.fma(", FLOAT64, ", ", FLOAT64, ", ", FLOAT64, ")"),
            select(FLOAT64),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(id: &TypeId) -> TypeDecl {
        standard_types().unwrap().into_iter().find(|d| &d.id == id).unwrap()
    }

    #[test]
    fn every_standard_type_has_constant_and_operations() {
        let types = standard_types().unwrap();
        assert_eq!(types.len(), 8);
        for d in &types {
            assert!(d.constant.is_some(), "{} lacks a constant", d.id);
            assert!(!d.operations.is_empty(), "{} has no operations", d.id);
        }
    }

    #[test]
    fn narrow_types_only_cast_or_select() {
        for id in NARROW {
            let d = decl(&id);
            assert!(d.narrow, "{id} is not flagged narrow");
            let cast_prefix = format!("(({})(", d.name);
            for op in &d.operations {
                match op {
                    Operation::Unary { prefix, suffix, .. } => {
                        assert_eq!(*prefix, cast_prefix);
                        assert_eq!(*suffix, "))");
                    }
                    Operation::Ternary { cond, middle, right, .. } => {
                        assert_eq!(cond, &BOOLEAN);
                        assert_eq!(middle, &id);
                        assert_eq!(right, &id);
                    }
                    Operation::Binary { .. } => panic!("{id} defines direct arithmetic: {op:?}"),
                }
            }
        }
    }

    #[test]
    fn narrow_casts_never_come_from_self() {
        for id in NARROW {
            for op in &decl(&id).operations {
                if let Operation::Unary { operand, .. } = op {
                    assert_ne!(operand, &id);
                    assert_ne!(operand, &BOOLEAN);
                }
            }
        }
    }

    /// Library calls used by the catalog and what javac types them as.
    /// `None` means overloaded on the promoted operand type.
    const CALLS: &[(&str, Option<&str>)] = &[
        ("Integer.min(", Some("int")),
        ("Integer.max(", Some("int")),
        ("Integer.rotateLeft(", Some("int")),
        ("Integer.compare(", Some("int")),
        ("Integer.bitCount(", Some("int")),
        ("Integer.reverse(", Some("int")),
        ("Integer.reverseBytes(", Some("int")),
        ("Integer.numberOfLeadingZeros(", Some("int")),
        ("Integer.signum(", Some("int")),
        ("Long.compare(", Some("int")),
        ("Float.compare(", Some("int")),
        ("Double.compare(", Some("int")),
        ("Boolean.compare(", Some("int")),
        ("Long.bitCount(", Some("int")),
        ("Long.signum(", Some("int")),
        ("Float.floatToRawIntBits(", Some("int")),
        ("Long.min(", Some("long")),
        ("Long.max(", Some("long")),
        ("Long.rotateRight(", Some("long")),
        ("Long.reverse(", Some("long")),
        ("Long.reverseBytes(", Some("long")),
        ("Long.highestOneBit(", Some("long")),
        ("Double.doubleToRawLongBits(", Some("long")),
        ("Float.intBitsToFloat(", Some("float")),
        ("Double.longBitsToDouble(", Some("double")),
        ("Math.pow(", Some("double")),
        ("Math.sqrt(", Some("double")),
        ("Math.sin(", Some("double")),
        ("Math.floor(", Some("double")),
        ("Float.isNaN(", Some("boolean")),
        ("Float.isFinite(", Some("boolean")),
        ("Double.isNaN(", Some("boolean")),
        ("Double.isInfinite(", Some("boolean")),
        ("Math.abs(", None),
        ("Math.min(", None),
        ("Math.max(", None),
        ("Math.copySign(", None),
        ("Math.signum(", None),
        ("Math.fma(", None),
    ];

    const NUMERIC_RANK: [&str; 4] = ["int", "long", "float", "double"];

    /// Unary numeric promotion.
    fn promote1(t: &str) -> &str {
        match t {
            "byte" | "short" | "char" => "int",
            other => other,
        }
    }

    /// Binary numeric promotion.
    fn promote2<'a>(a: &'a str, b: &'a str) -> &'a str {
        let (a, b) = (promote1(a), promote1(b));
        let rank = |t: &str| NUMERIC_RANK.iter().position(|r| *r == t);
        if rank(a) >= rank(b) { a } else { b }
    }

    /// Static Java type of a template applied to operands of the given Java types.
    fn java_type_of(op: &Operation, operands: &[&'static str]) -> String {
        let call = |prefix: &str| -> Option<String> {
            let (_, ty) = CALLS.iter().find(|(name, _)| *name == prefix)?;
            Some(match ty {
                Some(ty) => ty.to_string(),
                None => operands.iter().fold(operands[0], |acc, t| promote2(acc, *t)).to_string(),
            })
        };
        match op {
            Operation::Unary { prefix, .. } => {
                if let Some(ty) = call(&**prefix) {
                    return ty;
                }
                match &**prefix {
                    "(-(" | "(~" => promote1(operands[0]).to_string(),
                    "(!" => "boolean".to_string(),
                    cast => cast
                        .strip_prefix("((")
                        .and_then(|rest| rest.strip_suffix(")("))
                        .unwrap_or_else(|| panic!("unknown unary template {op:?}"))
                        .to_string(),
                }
            }
            Operation::Binary { prefix, infix, .. } => {
                if let Some(ty) = call(&**prefix) {
                    return ty;
                }
                let (l, r) = (operands[0], operands[1]);
                match infix.trim() {
                    "<" | "<=" | ">" | ">=" | "==" | "!=" | "&&" | "||" => "boolean".to_string(),
                    "<<" | ">>" | ">>>" => promote1(l).to_string(),
                    "&" | "|" | "^" if l == "boolean" && r == "boolean" => "boolean".to_string(),
                    "+" | "-" | "*" | "/" | "%" | "&" | "|" | "^" => promote2(l, r).to_string(),
                    other => panic!("unknown operator {other:?}"),
                }
            }
            Operation::Ternary { prefix, mid1, .. } => {
                if let Some(ty) = call(&**prefix) {
                    return ty;
                }
                assert_eq!(*mid1, " ? ", "{op:?}");
                assert_eq!(operands[1], operands[2], "select arms must share a type: {op:?}");
                operands[1].to_string()
            }
        }
    }

    #[test]
    fn every_template_has_its_result_type() {
        let reg = crate::registry::Registry::standard().unwrap();
        let java_name = |id: &TypeId| -> &'static str {
            match reg.resolve(id).unwrap().name() {
                "boolean" => "boolean",
                "byte" => "byte",
                "short" => "short",
                "char" => "char",
                "int" => "int",
                "long" => "long",
                "float" => "float",
                "double" => "double",
                other => panic!("not a primitive: {other}"),
            }
        };
        for ty in reg.types() {
            for op in ty.operations() {
                let operands: Vec<&'static str> = op.operand_types().into_iter().map(&java_name).collect();
                assert_eq!(java_type_of(op, &operands), ty.name(), "{}: {}", ty.id(), op.render_probe());
            }
        }
    }

    #[test]
    fn result_type_table_catches_promotion() {
        let byte_sum = Operation::binary("(", INT8, " + ", INT8, ")");
        assert_eq!(java_type_of(&byte_sum, &["byte", "byte"]), "int");
        let mixed = Operation::binary("(", INT32, " * ", FLOAT32, ")");
        assert_eq!(java_type_of(&mixed, &["int", "float"]), "float");
        let shift = Operation::binary("(", INT16, " << ", INT64, ")");
        assert_eq!(java_type_of(&shift, &["short", "long"]), "int");
        assert_eq!(java_type_of(&cast("char", INT32), &["int"]), "char");
    }

    #[test]
    fn boolean_has_no_casts() {
        for op in &decl(&BOOLEAN).operations {
            assert!(!op.render_probe().contains("(boolean)"), "{op:?}");
        }
    }
}
