use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use viewgraph::config::{self, DuplicateMappingPolicy};
use viewgraph::graph_ddl::{DdlDefinition, GraphDdlResolver};

/// ViewGraph - resolve graph DDL definitions onto tabular views
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a definition file and print every resolved graph
    Resolve(ResolveArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Definition tree (YAML or JSON)
    definition: PathBuf,

    /// Resolver configuration file (YAML); environment variables are used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Behaviour on duplicate (type, view) mappings: fail or overwrite
    #[arg(long)]
    duplicate_mappings: Option<DuplicateMappingPolicy>,

    /// Maximum number of patterns one pattern definition may expand to
    #[arg(long)]
    max_pattern_expansion: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

impl From<&ResolveArgs> for config::CliConfig {
    fn from(args: &ResolveArgs) -> Self {
        config::CliConfig {
            config_file: args.config.clone(),
            duplicate_mappings: args.duplicate_mappings,
            max_pattern_expansion: args.max_pattern_expansion,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Resolve(args) => run_resolve(&args),
    }
}

fn run_resolve(args: &ResolveArgs) -> anyhow::Result<()> {
    let config = config::ResolverConfig::from_cli(args.into())
        .context("Configuration error")?;

    let is_json = args
        .definition
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let ddl = if is_json {
        let content = std::fs::read_to_string(&args.definition)
            .with_context(|| format!("Failed to read {}", args.definition.display()))?;
        DdlDefinition::from_json_str(&content)?
    } else {
        DdlDefinition::from_yaml_file(&args.definition)?
    };

    let model = GraphDdlResolver::new(&config)
        .resolve(&ddl)
        .with_context(|| format!("Failed to resolve {}", args.definition.display()))?;
    info!("Resolved {} graph(s)", model.graphs().len());

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&model)?,
        OutputFormat::Yaml => serde_yaml::to_string(&model)?,
    };
    println!("{}", output);
    Ok(())
}
