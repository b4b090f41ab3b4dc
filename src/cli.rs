//! Minimal CLI: manifest in → (generate | schema)

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;

use crate::diag::Diagnostics;
use crate::emit::schema_literal;
use crate::generate::{generate, GenerateOptions, Target};
use crate::infer::{infer, DurationType, InferOptions};
use crate::model::{ConfigFile, ConfigType};

/// generate typed client accessors from a feature-flag/config manifest
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate accessor source files for one or more targets
    Generate(GenerateOut),
    /// infer and print the schema literal for every config
    Schema(SchemaOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// path to the downloaded config manifest (JSON)
    #[arg(long, short)]
    input: PathBuf,

    /// representation for DURATION values
    #[arg(long, value_enum, default_value_t = DurationAs::Number)]
    duration_as: DurationAs,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DurationAs {
    Number,
    String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TargetArg {
    Typescript,
    Python,
}

#[derive(Args, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// one or more output languages
    #[arg(long, short, value_enum, num_args = 1.., required = true)]
    target: Vec<TargetArg>,

    /// output directory (stdout if omitted)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// emit single-assertion accessors instead of navigating expressions
    #[arg(long)]
    raw: bool,
}

#[derive(Args, Debug)]
struct SchemaOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl InputSettings {
    fn load_manifest(&self) -> anyhow::Result<ConfigFile> {
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read manifest {}", self.input.display()))?;
        Ok(ConfigFile::from_json(&source)?)
    }

    fn infer_options(&self) -> InferOptions {
        InferOptions {
            duration_type: match self.duration_as {
                DurationAs::Number => DurationType::Number,
                DurationAs::String => DurationType::String,
            },
        }
    }
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Typescript => Target::TypeScript,
            TargetArg::Python => Target::Python,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let file = target.input_settings.load_manifest()?;
                let infer_options = target.input_settings.infer_options();
                let diag = CliDiagnostics;

                let mut targets: Vec<Target> =
                    target.target.iter().copied().map(Target::from).collect();
                targets.dedup();

                // Targets are independent; render them in parallel.
                let rendered: Vec<(Target, String)> = targets
                    .par_iter()
                    .map(|&t| {
                        let options = GenerateOptions {
                            target: t,
                            infer: infer_options.clone(),
                            raw_accessors: target.raw,
                        };
                        generate(&file, &options, &diag).map(|source| (t, source))
                    })
                    .collect::<Result<_, _>>()?;

                for (t, source) in rendered {
                    match target.out_dir.as_ref() {
                        Some(out_dir) => {
                            std::fs::create_dir_all(out_dir).with_context(|| {
                                format!("failed to create {}", out_dir.display())
                            })?;
                            let path = out_dir.join(t.file_name());
                            std::fs::write(&path, &source)
                                .with_context(|| format!("failed to write {}", path.display()))?;
                            eprintln!("{} {}", "wrote".green(), path.display());
                        }
                        None => print!("{source}"),
                    }
                }
                Ok(())
            }
            Command::Schema(target) => {
                let file = target.input_settings.load_manifest()?;
                let infer_options = target.input_settings.infer_options();
                let diag = CliDiagnostics;

                let mut configs: Vec<_> = file
                    .configs
                    .iter()
                    .filter(|c| !c.rows.is_empty() && c.config_type != ConfigType::Schema)
                    .collect();
                configs.sort_by(|a, b| a.key.cmp(&b.key));

                let mut out = String::new();
                for config in configs {
                    let schema = infer(config, &file, &infer_options, &diag);
                    out.push_str(&format!(
                        "{}: {}\n",
                        config.key,
                        schema_literal::schema_to_source(&schema)
                    ));
                }

                match target.out.as_ref() {
                    Some(path) => {
                        if let Some(parent) = path.parent() {
                            std::fs::create_dir_all(parent).with_context(|| {
                                format!("failed to create {}", parent.display())
                            })?;
                        }
                        std::fs::write(path, &out)
                            .with_context(|| format!("failed to write {}", path.display()))?;
                    }
                    None => print!("{out}"),
                }
                Ok(())
            }
        }
    }
}

/// Warnings rendered for a terminal. Non-fatal by construction.
struct CliDiagnostics;

impl Diagnostics for CliDiagnostics {
    fn log(&self, category: &str, message: &str) {
        eprintln!("{} {message}", format!("warning({category}):").yellow());
    }
}
