//! Manifest-based drift check
//!
//! Usage: stackdrift pairs --pairs <PATH> --sns-topic-arn <ARN>
//!        [--branch <NAME>] [--stack-name-label <LABEL>]
//!        [--output-dir <DIR>] [--s3-bucket <BUCKET> --s3-prefix <PREFIX>]

use super::{run, AwsArgs};
use clap::Args;
use stackdrift_core::resolver::ManifestResolver;
use stackdrift_engine::config::require;
use stackdrift_engine::{OutputConfig, RunConfig, SnsNotifier, UploadTarget};
use std::path::PathBuf;

const DEFAULT_OUTPUT_DIR: &str = "/tmp/out";

#[derive(Debug, Args)]
pub struct PairsArgs {
    /// JSON array of {"GithubPath", "StackName"} objects
    #[arg(long, env = "PAIRS_JSON_PATH")]
    pub pairs: PathBuf,

    /// Topic notified on drift
    #[arg(long, env = "SNS_TOPIC_ARN")]
    pub sns_topic_arn: String,

    /// Branch shown in the report
    #[arg(long, env = "GIT_BRANCH")]
    pub branch: Option<String>,

    /// System label shown in the notification
    #[arg(long, env = "STACK_NAME_LABEL")]
    pub stack_name_label: Option<String>,

    /// Write canonical templates and `_meta.json` here
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Upload the run output to this bucket
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// Key prefix for the upload
    #[arg(long)]
    pub s3_prefix: Option<String>,

    #[command(flatten)]
    pub aws: AwsArgs,
}

/// Execute pairs command
pub fn execute(args: PairsArgs) -> Result<(), Box<dyn std::error::Error>> {
    require("PAIRS_JSON_PATH", &args.pairs.to_string_lossy())?;

    let cli = args.aws.cli();
    let notifier = SnsNotifier::new(cli.clone(), args.sns_topic_arn)?;

    let upload = args
        .s3_bucket
        .filter(|b| !b.trim().is_empty())
        .map(|bucket| UploadTarget::new(bucket, args.s3_prefix.unwrap_or_default()));
    let output = match (args.output_dir, upload) {
        (Some(dir), upload) => Some(OutputConfig { dir, upload }),
        (None, Some(upload)) => Some(OutputConfig::new(DEFAULT_OUTPUT_DIR).with_upload(upload)),
        (None, None) => None,
    };

    let mut config = RunConfig::new(args.branch.unwrap_or_default())
        .with_stack_name_label(args.stack_name_label);
    if let Some(output) = output {
        config = config.with_output(output);
    }

    let resolver = ManifestResolver::new(args.pairs);
    run(&config, &resolver, &cli, Some(&notifier))
}
