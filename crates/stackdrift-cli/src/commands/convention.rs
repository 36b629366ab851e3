//! Convention-based drift check
//!
//! Usage: stackdrift convention --templates <LIST> --branch <ENV> --stack-prefix <PREFIX>
//!        --s3-bucket <BUCKET> --s3-prefix <PREFIX> [--sns-topic-arn <ARN>]

use super::{run, AwsArgs};
use clap::Args;
use stackdrift_core::resolver::ConventionResolver;
use stackdrift_engine::config::require;
use stackdrift_engine::{OutputConfig, RunConfig, SnsNotifier, UploadTarget};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConventionArgs {
    /// Comma-separated template paths
    #[arg(long, env = "TEMPLATE_LIST")]
    pub templates: String,

    /// Environment name used in stack names and the report
    #[arg(long, env = "GITHUB_BRANCH")]
    pub branch: String,

    /// First segment of every stack name
    #[arg(long, env = "STACK_PREFIX")]
    pub stack_prefix: String,

    /// Bucket the run output is uploaded to
    #[arg(long, env = "S3_BUCKET")]
    pub s3_bucket: String,

    /// Key prefix the run output is uploaded under
    #[arg(long, env = "S3_PREFIX")]
    pub s3_prefix: String,

    /// Local directory for the run output
    #[arg(long, env = "STACKDRIFT_OUTPUT_DIR", default_value = "/tmp/out")]
    pub output_dir: PathBuf,

    /// Topic notified on drift; stdout only when unset
    #[arg(long, env = "SNS_TOPIC_ARN")]
    pub sns_topic_arn: Option<String>,

    #[command(flatten)]
    pub aws: AwsArgs,
}

/// Execute convention command
pub fn execute(args: ConventionArgs) -> Result<(), Box<dyn std::error::Error>> {
    require("TEMPLATE_LIST", &args.templates)?;
    require("GITHUB_BRANCH", &args.branch)?;
    require("STACK_PREFIX", &args.stack_prefix)?;
    require("S3_BUCKET", &args.s3_bucket)?;
    require("S3_PREFIX", &args.s3_prefix)?;

    let resolver =
        ConventionResolver::from_list(&args.templates, &args.stack_prefix, &args.branch);
    let config = RunConfig::new(&args.branch).with_output(
        OutputConfig::new(&args.output_dir)
            .with_upload(UploadTarget::new(&args.s3_bucket, &args.s3_prefix)),
    );

    let cli = args.aws.cli();
    let notifier = match args.sns_topic_arn.filter(|t| !t.trim().is_empty()) {
        Some(topic) => Some(SnsNotifier::new(cli.clone(), topic)?),
        None => None,
    };

    run(&config, &resolver, &cli, notifier.as_ref())
}
