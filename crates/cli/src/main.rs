use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use scenario::Scenario;
use share_composer::ChooserConfig;
use share_protocol::serialize_json_pretty;
use std::path::{Path, PathBuf};

mod report;
mod scenario;

#[derive(Parser)]
#[command(name = "share-chooser")]
#[command(about = "Compose share chooser target lists from recorded sessions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print the composed target list
    Compose(ComposeArgs),

    /// Print the effective configuration after environment overrides
    Config(ConfigArgs),
}

#[derive(Args)]
struct ComposeArgs {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Config JSON file; takes precedence over the scenario's own config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    /// Config JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Compose(args) => args.json,
        Commands::Config(_) => true,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Compose(args) => run_compose(args).await?,
        Commands::Config(args) => run_config(args)?,
    }

    Ok(())
}

async fn run_compose(args: ComposeArgs) -> Result<()> {
    let mut scenario = Scenario::from_path(&args.scenario)?;
    let config = match (&args.config, scenario.config.take()) {
        (Some(path), _) => load_config(path)?,
        (None, Some(config)) => {
            let config = config.with_env_overrides();
            config.validate().context("Invalid scenario config")?;
            config
        }
        (None, None) => ChooserConfig::from_env().context("Invalid configuration")?,
    };

    let snapshot = scenario.run(config).await?;
    if args.json {
        println!("{}", serialize_json_pretty(&snapshot)?);
    } else {
        print!("{}", report::render_snapshot(&snapshot));
    }
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ChooserConfig::from_env().context("Invalid configuration")?,
    };
    println!("{}", serialize_json_pretty(&config)?);
    Ok(())
}

fn load_config(path: &Path) -> Result<ChooserConfig> {
    ChooserConfig::from_path(path)
        .with_context(|| format!("Failed to load config {}", path.display()))
}
