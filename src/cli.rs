//! Minimal CLI: model files → (schema | check | classes)
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use annot_schema::{GeneratorOptions, Model, SchemaGenerator, TuplePolicy};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile annotated data-model classes into JSON Schema (draft-07)
#[derive(Parser, Debug)]
#[command(name = "annot-schema", version)]
pub struct CommandLineInterface {
    /// debug logging (overridden by ANNOT_SCHEMA_LOG)
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// errors only
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the inlined JSON schema of one class
    Generate(GenerateOut),
    /// generate every class and report all failures
    Check(CheckArgs),
    /// list registered classes and enums
    Classes(ModelSettings),
}

#[derive(Args, Debug, Clone)]
struct ModelSettings {
    /// One or more model files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    model: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct GeneratorSettings {
    /// reject `array{..}` shapes whose elements differ in type
    #[arg(long, default_value_t = false)]
    strict_tuples: bool,

    /// maximum class nesting below the root
    #[arg(long, default_value_t = annot_schema::generate::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    model_settings: ModelSettings,

    #[command(flatten)]
    generator_settings: GeneratorSettings,

    /// class to start from
    #[arg(long, short)]
    root: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    model_settings: ModelSettings,

    #[command(flatten)]
    generator_settings: GeneratorSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ModelSettings {
    fn load(&self) -> Result<Model> {
        let paths = resolve_file_path_patterns(&self.model)
            .context("failed to resolve model file paths")?;
        Ok(Model::load(&paths)?)
    }
}

impl GeneratorSettings {
    fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            max_depth: self.max_depth,
            tuple_policy: if self.strict_tuples {
                TuplePolicy::Homogeneous
            } else {
                TuplePolicy::FirstElement
            },
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_tracing(&self) -> Result<()> {
        let level = if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        };
        let filter = tracing_subscriber::EnvFilter::try_from_env("ANNOT_SCHEMA_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let model = target.model_settings.load()?;
                let generator = SchemaGenerator::new(&model.classes, &model.enums)
                    .with_options(target.generator_settings.options());
                let schema = generator.generate(&target.root)?;
                let schema_src = serde_json::to_string_pretty(&schema)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)
                            .with_context(|| format!("creating {}", parent.display()))?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("writing schema to {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
                Ok(())
            }
            Command::Check(target) => {
                let model = target.model_settings.load()?;
                let generator = SchemaGenerator::new(&model.classes, &model.enums)
                    .with_options(target.generator_settings.options());
                let names: Vec<&str> = model.classes.names().collect();
                // registries are read-only; each call tracks its own expansion
                let results: Vec<_> = names
                    .par_iter()
                    .map(|name| (*name, generator.generate(name)))
                    .collect();
                let mut failed = 0usize;
                for (name, result) in &results {
                    match result {
                        Ok(_) => println!("{} {name}", "ok".green()),
                        Err(error) => {
                            failed += 1;
                            println!("{} {name}: {error}", "FAIL".red().bold());
                        }
                    }
                }
                if failed > 0 {
                    bail!("{failed} of {} classes failed", results.len());
                }
                Ok(())
            }
            Command::Classes(settings) => {
                let model = settings.load()?;
                for name in model.classes.names() {
                    println!("class {name}");
                }
                for name in model.enums.names() {
                    println!("enum  {name}");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched: Vec<PathBuf> = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {pattern}"))?
                .collect::<Result<_, _>>()?;
            if matched.is_empty() {
                bail!("glob pattern matched no files: {pattern}");
            }
            // glob order is filesystem order; keep merges deterministic
            matched.sort();
            out.append(&mut matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
