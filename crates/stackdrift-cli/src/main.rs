//! stackdrift CLI
//!
//! Compares committed CloudFormation templates with the templates of the
//! deployed stacks and reports drift.

use clap::{Parser, Subcommand, ValueEnum};
use stackdrift_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "stackdrift")]
#[command(about = "stackdrift - CloudFormation template drift detection", long_about = None)]
struct Cli {
    /// Log output format on stderr
    #[arg(
        long,
        global = true,
        env = "STACKDRIFT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive stack names from template file names
    Convention(commands::convention::ConventionArgs),
    /// Read template/stack pairs from a JSON manifest
    Pairs(commands::pairs::PairsArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging_facility::init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = match cli.command {
        Commands::Convention(args) => commands::convention::execute(args),
        Commands::Pairs(args) => commands::pairs::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
