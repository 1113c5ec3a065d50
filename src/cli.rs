//! CLI: synthesize → (expr | corpus | class | types)
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use term_synth::codegen::Codegen;
use term_synth::config::SynthConfig;
use term_synth::corpus::{self, CorpusPlan};
use term_synth::{GenerationContext, Registry, Synthesizer, TypeId};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate random, type-correct Java expressions for compiler stress testing
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print one expression
    Expr(ExprOut),
    /// generate a corpus of expressions as JSON or NDJSON
    Corpus(CorpusOut),
    /// generate a Java class with one method per expression
    Class(ClassOut),
    /// list registered types and their templates
    Types(TypesOut),
}

#[derive(Args, Debug, Clone)]
struct SynthSettings {
    /// JSON config file (seed, max_depth, leaf_bias, extra_operations)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// base seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// maximum number of nested operations (overrides config)
    #[arg(long)]
    max_depth: Option<u32>,

    /// probability of stopping early with a constant (overrides config)
    #[arg(long)]
    leaf_bias: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct PlanSettings {
    /// number of expressions
    #[arg(long, short = 'n', default_value_t = 100)]
    count: usize,

    /// target types, round-robin (all registered types if omitted)
    #[arg(long = "type", short = 't')]
    types: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ExprOut {
    #[command(flatten)]
    settings: SynthSettings,

    /// target type id
    #[arg(long = "type", short = 't', default_value = "Int32")]
    ty: String,
}

#[derive(clap::Parser, Debug)]
struct CorpusOut {
    #[command(flatten)]
    settings: SynthSettings,

    #[command(flatten)]
    plan: PlanSettings,

    /// emit newline-delimited JSON entries instead of one document
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ClassOut {
    #[command(flatten)]
    settings: SynthSettings,

    #[command(flatten)]
    plan: PlanSettings,

    /// name of the generated class
    #[arg(long, default_value = "Generated")]
    class_name: String,

    /// output .java file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct TypesOut {
    #[command(flatten)]
    settings: SynthSettings,

    /// also print every template
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SynthSettings {
    fn load(&self) -> Result<SynthConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                SynthConfig::from_json_str(&src)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => SynthConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(leaf_bias) = self.leaf_bias {
            config.leaf_bias = leaf_bias;
        }
        config.validate()?;
        Ok(config)
    }
}

impl PlanSettings {
    fn plan(&self, config: &SynthConfig) -> CorpusPlan {
        CorpusPlan {
            seed: config.seed,
            count: self.count,
            max_depth: config.max_depth,
            types: self.types.iter().map(|t| TypeId::from(t.as_str())).collect(),
        }
    }
}

/// Standard registry, extended with the config's extra templates if any.
fn load_registry(config: &SynthConfig) -> Result<Cow<'static, Registry>> {
    let base = term_synth::registry::global()?;
    if config.extra_operations.is_empty() {
        Ok(Cow::Borrowed(base))
    } else {
        Ok(Cow::Owned(base.with_operations(&config.extra_operations)?))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Expr(target) => {
                let config = target.settings.load()?;
                let registry = load_registry(&config)?;
                let synth = Synthesizer::new(&registry, config.leaf_bias)?;
                let mut ctx = GenerationContext::seeded(config.seed, config.max_depth);
                let term = synth.synthesize_id(&TypeId::from(target.ty.as_str()), &mut ctx)?;
                println!("{}", term.text);
            }
            Command::Corpus(target) => {
                let config = target.settings.load()?;
                let registry = load_registry(&config)?;
                let synth = Synthesizer::new(&registry, config.leaf_bias)?;
                let corpus = corpus::generate(&synth, &target.plan.plan(&config), &config.extra_operations)?;
                let src = if target.ndjson {
                    corpus.to_ndjson()?
                } else {
                    serde_json::to_string_pretty(&corpus)?
                };
                write_output(target.out.as_deref(), &src)?;
                report(corpus.entries.len(), target.out.as_deref());
            }
            Command::Class(target) => {
                let config = target.settings.load()?;
                let registry = load_registry(&config)?;
                let synth = Synthesizer::new(&registry, config.leaf_bias)?;
                let corpus = corpus::generate(&synth, &target.plan.plan(&config), &config.extra_operations)?;
                let mut cg = Codegen::new(target.class_name.as_str());
                cg.emit_corpus(&registry, &corpus)?;
                write_output(target.out.as_deref(), &cg.into_string())?;
                report(corpus.entries.len(), target.out.as_deref());
            }
            Command::Types(target) => {
                let config = target.settings.load()?;
                let registry = load_registry(&config)?;
                for ty in registry.types() {
                    println!(
                        "{:<8} {:<8} {} operations",
                        ty.id().as_str().bold(),
                        ty.name(),
                        ty.operations().len()
                    );
                    if target.verbose {
                        for op in ty.operations() {
                            println!("    {}", op.render_probe().as_str().dimmed());
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn report(count: usize, out: Option<&Path>) {
    if let Some(out) = out {
        eprintln!("{} {count} expressions → {}", "wrote".green().bold(), out.display());
    }
}
