//! Java program skeleton around a corpus.
//!
//! One static method per entry returning the expression, plus a `main` that
//! prints every result. Compiling and running it is the harness's business.
//!
//! Primitive results go through `var v = expr; Boxed exact = v;`. A `var` local
//! is never a constant, and boxing admits no widening or narrowing, so javac
//! only accepts the method when the expression's static type is exactly the
//! declared one.
use std::fmt::Write as _;

use crate::corpus::{Corpus, CorpusEntry};
use crate::error::ConfigError;
use crate::registry::Registry;

pub struct Codegen {
    class_name: String,
    methods: String,
    calls: Vec<String>,
}

impl Codegen {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into(), methods: String::new(), calls: Vec::new() }
    }

    /// Emit one method; `java_type` is the source spelling of the entry's type.
    pub fn emit(&mut self, java_type: &str, entry: &CorpusEntry) {
        let name = format!("t{}", entry.index);
        // writing into a String can't fail
        let _ = writeln!(
            self.methods,
            "    // {} seed={} depth={}/{}",
            entry.ty, entry.seed, entry.depth, entry.max_depth
        );
        let _ = writeln!(self.methods, "    static {java_type} {name}() {{");
        match boxed(java_type) {
            Some(boxed) => {
                let _ = writeln!(self.methods, "        var v = {};", entry.text);
                let _ = writeln!(self.methods, "        {boxed} exact = v;");
                let _ = writeln!(self.methods, "        return exact;");
            }
            None => {
                let _ = writeln!(self.methods, "        return {};", entry.text);
            }
        }
        let _ = writeln!(self.methods, "    }}\n");
        self.calls.push(name);
    }

    pub fn emit_corpus(&mut self, registry: &Registry, corpus: &Corpus) -> Result<(), ConfigError> {
        for entry in &corpus.entries {
            let ty = registry.resolve(&entry.ty)?;
            self.emit(ty.name(), entry);
        }
        Ok(())
    }

    pub fn into_string(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// generated by term-synth");
        let _ = writeln!(out, "public class {} {{", self.class_name);
        out.push_str(&self.methods);
        let _ = writeln!(out, "    public static void main(String[] args) {{");
        for call in &self.calls {
            let _ = writeln!(out, "        System.out.println(\"{call} = \" + {call}());");
        }
        let _ = writeln!(out, "    }}");
        let _ = writeln!(out, "}}");
        out
    }
}

fn boxed(primitive: &str) -> Option<&'static str> {
    Some(match primitive {
        "boolean" => "Boolean",
        "byte" => "Byte",
        "short" => "Short",
        "char" => "Character",
        "int" => "Integer",
        "long" => "Long",
        "float" => "Float",
        "double" => "Double",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::INT8;

    fn entry(index: usize, text: &str) -> CorpusEntry {
        CorpusEntry { index, seed: 9, ty: INT8, max_depth: 2, depth: 1, text: text.into() }
    }

    #[test]
    fn emits_method_per_entry_and_main() {
        let mut cg = Codegen::new("Fuzz");
        cg.emit("byte", &entry(0, "((byte)(1))"));
        cg.emit("byte", &entry(1, "(byte)-3"));
        let src = cg.into_string();
        assert!(src.contains("public class Fuzz {"));
        assert!(src.contains(
            "    static byte t0() {\n        var v = ((byte)(1));\n        Byte exact = v;\n        return exact;\n    }"
        ));
        assert!(src.contains("    static byte t1() {"));
        assert!(src.contains("System.out.println(\"t1 = \" + t1());"));
        assert!(src.trim_end().ends_with('}'));
    }

    #[test]
    fn unknown_type_names_return_directly() {
        let mut cg = Codegen::new("G");
        cg.emit("java.math.BigInteger", &entry(0, "java.math.BigInteger.ONE"));
        let src = cg.into_string();
        assert!(src.contains("        return java.math.BigInteger.ONE;"));
        assert!(!src.contains("exact"));
    }

    #[test]
    fn corpus_types_use_java_names() {
        let reg = Registry::standard().unwrap();
        let corpus = Corpus {
            generated_at: chrono::Utc::now(),
            seed: 0,
            max_depth: 2,
            leaf_bias: 0.2,
            extra_operations: Vec::new(),
            entries: vec![entry(0, "(byte)5")],
        };
        let mut cg = Codegen::new("G");
        cg.emit_corpus(&reg, &corpus).unwrap();
        assert!(cg.into_string().contains("static byte t0()"));
    }
}
