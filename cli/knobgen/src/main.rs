//! knobgen: generate C headers from configuration knob schemas.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::ProjectConfig;
use knob_codegen::DialectKind;

#[derive(Parser)]
#[command(name = "knobgen", version, about = "Configuration knob header generator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Project configuration file (default: nearest knobgen.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Label written to the generated provenance comments
    #[arg(long, global = true)]
    script: Option<String>,
    /// Extra enum span tolerated before validators switch to a full switch
    #[arg(long, global = true)]
    sparse_slack: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate headers in the generic C dialect
    #[command(alias = "generateheader")]
    GenerateHeader(GenerateArgs),
    /// Generate headers in the firmware (UEFI) dialect
    #[command(alias = "generateheader_efi")]
    GenerateHeaderFirmware(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Schema file (.toml or .json)
    schema: PathBuf,
    /// Public header output path
    public_header: PathBuf,
    /// Service header output path
    service_header: PathBuf,
    /// Profile header output path (requires at least one override source)
    profile_header: Option<PathBuf>,
    /// Override source files; each file stem names a profile
    sources: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (dialect, args) = match cli.command {
        Commands::GenerateHeader(args) => (DialectKind::Generic, args),
        Commands::GenerateHeaderFirmware(args) => (DialectKind::Firmware, args),
    };
    if args.profile_header.is_some() && args.sources.is_empty() {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "a profile header needs at least one override source",
            )
            .exit();
    }

    let project = match &cli.config {
        Some(path) => Some(ProjectConfig::load(path)?),
        None => {
            let cwd = std::env::current_dir()?;
            ProjectConfig::find_and_load(&cwd)?.map(|(config, _)| config)
        }
    };

    let mut settings = project.map(|p| p.codegen_config()).unwrap_or_default();
    settings.dialect = dialect;
    if let Some(script) = cli.script {
        settings.script = script;
    }
    if let Some(slack) = cli.sparse_slack {
        settings.sparse_slack = slack;
    }

    commands::generate::run(
        &args.schema,
        &args.public_header,
        &args.service_header,
        args.profile_header.as_deref(),
        &args.sources,
        &settings,
    )
}
