//! Subcommand handlers
//!
//! Each handler turns its arguments into a `RunConfig` plus collaborators
//! and hands them to the engine.

pub mod convention;
pub mod pairs;

use clap::Args;
use stackdrift_core::resolver::PairResolver;
use stackdrift_engine::{run_drift_check, AwsCli, Collaborators, RunConfig, SnsNotifier};
use std::path::PathBuf;

/// Options for the `aws` command-line tool
#[derive(Debug, Args)]
pub struct AwsArgs {
    /// Path or name of the aws executable
    #[arg(long, env = "AWS_CLI_BIN", default_value = "aws")]
    pub aws_bin: PathBuf,

    /// Region passed to every aws call
    #[arg(long, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// Named profile passed to every aws call
    #[arg(long, env = "AWS_PROFILE")]
    pub aws_profile: Option<String>,
}

impl AwsArgs {
    pub fn cli(&self) -> AwsCli {
        AwsCli::new(&self.aws_bin)
            .with_region(self.aws_region.clone())
            .with_profile(self.aws_profile.clone())
    }
}

/// Run a drift check against the aws tool, printing to stdout
fn run(
    config: &RunConfig,
    resolver: &dyn PairResolver,
    cli: &AwsCli,
    notifier: Option<&SnsNotifier>,
) -> Result<(), Box<dyn std::error::Error>> {
    let collaborators = Collaborators {
        source: cli,
        store: Some(cli),
        notifier: notifier.map(|n| n as &dyn stackdrift_engine::Notifier),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = run_drift_check(config, resolver, collaborators, &mut out)?;

    tracing::debug!(
        diff_count = outcome.summary.diff_count,
        error_count = outcome.summary.error_count,
        notified = outcome.notified,
        "drift check finished"
    );
    Ok(())
}
