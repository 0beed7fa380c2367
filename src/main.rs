use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundrank::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Raw fund CSV to read (overrides the config file)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Directory for generated artifacts (overrides the config file)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundrank::AppCommand {
    fn from(cmd: Commands) -> fundrank::AppCommand {
        match cmd {
            Commands::Analyze => fundrank::AppCommand::Analyze,
            Commands::Describe => fundrank::AppCommand::Describe,
            Commands::Top { count } => fundrank::AppCommand::Top { count },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Clean, score and rank funds, then write all outputs
    Analyze,
    /// Display descriptive statistics of the cleaned dataset
    Describe,
    /// Display the highest ranked funds
    Top {
        /// Number of funds to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let overrides = fundrank::Overrides {
        input: cli.input,
        output_dir: cli.output_dir,
    };

    let result = match cli.command {
        Some(Commands::Setup) => fundrank::cli::setup::setup(),
        Some(cmd) => fundrank::run_command(cmd.into(), cli.config_path.as_deref(), &overrides),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "Application failed");
    }
    result
}
