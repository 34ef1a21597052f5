//! CLI: Go structs → (graphql | inspect)
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::convert::Converter;
use crate::discover::discover_file;
use crate::ir::TypeDefinition;
use crate::logging::LogLevel;
use crate::render::{RenderOptions, RequireTag, render};
use crate::scalars::ScalarTable;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// converts Go structs into GraphQL types ready for gqlgen-style servers
#[derive(Parser, Debug)]
#[command(name = "structql", version)]
pub struct CommandLineInterface {
    /// log verbosity (logs go to stderr; RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the GraphQL schema (scalars + object types)
    Graphql(GraphqlOut),
    /// print the converted type forest as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// path to the Go source file containing the structs to convert
    #[arg(long, short)]
    src: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct NamingSettings {
    /// use tags as field names when present; `json` unless --tags is given
    #[arg(long, short)]
    use_tags: bool,

    /// tag key to take field names from; implies --use-tags
    #[arg(long, short)]
    tags: Option<String>,

    /// drop fields whose resolved name equals this (default `-` with json tags)
    #[arg(long)]
    ignore_value: Option<String>,

    /// mark fields required when a tag matches, e.g. validate=required
    #[arg(long, short)]
    required_tags: Option<RequireTag>,
}

#[derive(clap::Parser, Debug)]
struct GraphqlOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    naming: NamingSettings,

    /// output .graphql file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load(path).context("loading config"),
            None => Ok(Config::default()),
        }
    }

    /// discover → convert
    fn load_types(&self, scalars: &ScalarTable) -> anyhow::Result<Vec<TypeDefinition>> {
        let catalog = discover_file(&self.src)
            .with_context(|| format!("error getting structs from {}", self.src.display()))?;
        tracing::info!(count = catalog.len(), "structs found");
        let defs = Converter::new(scalars, &catalog).build_all()?;
        Ok(defs)
    }
}

impl NamingSettings {
    /// Config file values, overridden by whatever was given on the command line.
    fn apply(&self, mut opts: RenderOptions) -> RenderOptions {
        if self.use_tags {
            opts.use_json_tags = true;
        }
        if let Some(tag) = &self.tags {
            opts.custom_tag = Some(tag.clone());
        }
        if let Some(value) = &self.ignore_value {
            opts.ignore_value = Some(value.clone());
        }
        if let Some(require) = &self.required_tags {
            opts.require = Some(require.clone());
        }
        opts
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Graphql(target) => {
                let config = target.input_settings.load_config()?;
                let scalars = config.scalar_table()?;
                let opts = target.naming.apply(config.render_options()?);
                tracing::debug!(?opts, "render options");

                let defs = target.input_settings.load_types(&scalars)?;
                let schema = render(&defs, &opts)?;
                write_output(target.out.as_deref(), &schema)
            }
            Command::Inspect(target) => {
                let config = target.input_settings.load_config()?;
                let scalars = config.scalar_table()?;
                let defs = target.input_settings.load_types(&scalars)?;
                let json = serde_json::to_string_pretty(&defs)?;
                write_output(target.out.as_deref(), &json)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(file = %out.display(), "written");
        }
        None => println!("{text}"),
    }
    Ok(())
}
