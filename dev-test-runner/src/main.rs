//! Replays a generated corpus and checks the synthesizer's guarantees:
//! - every entry re-synthesizes byte-identically from its seed,
//! - nesting depth stays within the entry's budget,
//! - composites are balanced, self-delimiting units,
//! - Boolean terms contain no `(boolean)` cast,
//! - narrow literals lie inside their domain.
//!
//! Usage: `dev-test-runner corpus.json`
use std::borrow::Cow;
use std::process::ExitCode;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

use term_synth::catalog::BOOLEAN;
use term_synth::corpus::{Corpus, CorpusEntry};
use term_synth::operation::{is_self_delimiting, parens_balanced};
use term_synth::{Registry, Synthesizer};

static BOOLEAN_CAST: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*boolean\s*\)").expect("valid regex"));
static NARROW_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((byte|short|char)\)(-?\d+)").expect("valid regex"));

/// Deserialize with JSON-path context in error messages.
fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

fn domain(cast: &str) -> (i64, i64) {
    match cast {
        "byte" => (-128, 127),
        "short" => (-32768, 32767),
        _ => (0, 65535),
    }
}

fn check_entry(synth: &Synthesizer<'_>, entry: &CorpusEntry) -> Vec<String> {
    let mut problems = Vec::new();
    let ty = match synth.registry().resolve(&entry.ty) {
        Ok(ty) => ty,
        Err(error) => return vec![error.to_string()],
    };

    let again = synth.synthesize_seeded(ty, entry.seed, entry.max_depth);
    if again != entry.text {
        problems.push(format!("not reproducible: got {again}"));
    }
    if entry.depth > entry.max_depth {
        problems.push(format!("depth {} exceeds budget {}", entry.depth, entry.max_depth));
    }
    if !parens_balanced(&entry.text) {
        problems.push("unbalanced parentheses".to_string());
    }
    if entry.depth > 0 && !is_self_delimiting(&entry.text) {
        problems.push("composite is not self-delimiting".to_string());
    }
    if entry.ty == BOOLEAN && BOOLEAN_CAST.is_match(&entry.text) {
        problems.push("boolean term contains a cast".to_string());
    }
    for caps in NARROW_LITERAL.captures_iter(&entry.text) {
        let (lo, hi) = domain(&caps[1]);
        match caps[2].parse::<i64>() {
            Ok(v) if (lo..=hi).contains(&v) => {}
            _ => problems.push(format!("literal ({}){} out of [{lo}, {hi}]", &caps[1], &caps[2])),
        }
    }
    problems
}

fn run(path: &str) -> Result<usize, String> {
    let src = std::fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
    let corpus: Corpus = from_str_with_path(&src)?;

    let base = term_synth::registry::global().map_err(|e| e.to_string())?;
    let registry: Cow<'static, Registry> = if corpus.extra_operations.is_empty() {
        Cow::Borrowed(base)
    } else {
        Cow::Owned(base.with_operations(&corpus.extra_operations).map_err(|e| e.to_string())?)
    };
    let synth = Synthesizer::new(&registry, corpus.leaf_bias).map_err(|e| e.to_string())?;

    let mut failures = 0;
    for entry in &corpus.entries {
        let problems = check_entry(&synth, entry);
        if !problems.is_empty() {
            failures += 1;
            eprintln!("❌ #{} {} (seed {}): {}", entry.index, entry.ty, entry.seed, problems.join("; "));
        }
    }
    eprintln!(
        "checked {} entries, {} failed",
        corpus.entries.len(),
        failures
    );
    Ok(failures)
}

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: dev-test-runner <corpus.json>");
        return ExitCode::from(2);
    };
    match run(&path) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("❌ {error}");
            ExitCode::from(2)
        }
    }
}
