//! Collaborators backed by the `aws` command-line tool
//!
//! Each call spawns one `aws` process and waits for it. Credentials, region
//! and retries are whatever the tool's own configuration says.

use super::{Notifier, ObjectStore, TemplateSource};
use stackdrift_core::errors::{DriftError, ExError, ExErrorKind, Result};
use stackdrift_core::template::TemplateBody;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Handle on the `aws` executable
#[derive(Debug, Clone)]
pub struct AwsCli {
    program: PathBuf,
    region: Option<String>,
    profile: Option<String>,
}

impl Default for AwsCli {
    fn default() -> Self {
        Self::new("aws")
    }
}

impl AwsCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            region: None,
            profile: None,
        }
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region.filter(|r| !r.is_empty());
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile.filter(|p| !p.is_empty());
        self
    }

    /// Run `aws <args>` and return its stdout
    ///
    /// A non-zero exit becomes an `ExternalService` error whose message is
    /// the trimmed stderr, or `fallback` when stderr is empty.
    fn run(&self, op: &str, args: &[&str], fallback: &str) -> Result<String> {
        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(region) = &self.region {
            command.args(["--region", region.as_str()]);
        }
        if let Some(profile) = &self.profile {
            command.args(["--profile", profile.as_str()]);
        }

        tracing::debug!(op, program = %self.program.display(), ?args, "spawning aws");

        let output = command.output().map_err(|e| {
            ExError::new(ExErrorKind::ExternalService)
                .with_op(op)
                .with_message(format!(
                    "failed to run {}: {}",
                    self.program.display(),
                    e
                ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() { fallback } else { stderr };
            return Err(ExError::new(ExErrorKind::ExternalService)
                .with_op(op)
                .with_message(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TemplateSource for AwsCli {
    fn fetch_template(&self, stack_name: &str) -> Result<TemplateBody> {
        let stdout = self
            .run(
                "fetch_template",
                &[
                    "cloudformation",
                    "get-template",
                    "--stack-name",
                    stack_name,
                    "--output",
                    "json",
                ],
                &format!("get-template failed: {}", stack_name),
            )
            .map_err(|e| e.with_stack_name(stack_name))?;

        TemplateBody::from_response(&stdout).map_err(|e| e.with_stack_name(stack_name))
    }
}

impl ObjectStore for AwsCli {
    fn upload_file(&self, local: &Path, destination: &str) -> Result<()> {
        let local = local.to_string_lossy().into_owned();
        self.run(
            "upload_file",
            &["s3", "cp", local.as_str(), destination],
            &format!("s3 cp failed: {}", destination),
        )
        .map(|_| ())
    }

    fn upload_dir(&self, local: &Path, destination: &str) -> Result<()> {
        let local = local.to_string_lossy().into_owned();
        self.run(
            "upload_dir",
            &["s3", "cp", local.as_str(), destination, "--recursive"],
            &format!("s3 cp failed: {}", destination),
        )
        .map(|_| ())
    }
}

/// Notifier publishing to one SNS topic
#[derive(Debug, Clone)]
pub struct SnsNotifier {
    cli: AwsCli,
    topic_arn: String,
}

impl SnsNotifier {
    /// # Errors
    ///
    /// Returns `ExErrorKind::MissingConfig` if the topic ARN is empty.
    pub fn new(cli: AwsCli, topic_arn: impl Into<String>) -> Result<Self> {
        let topic_arn = topic_arn.into();
        if topic_arn.trim().is_empty() {
            return Err(DriftError::MissingConfig {
                name: "SNS_TOPIC_ARN".to_string(),
            }
            .into());
        }
        Ok(Self { cli, topic_arn })
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }
}

impl Notifier for SnsNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<()> {
        self.cli
            .run(
                "publish_notification",
                &[
                    "sns",
                    "publish",
                    "--topic-arn",
                    self.topic_arn.as_str(),
                    "--subject",
                    subject,
                    "--message",
                    message,
                ],
                "sns publish failed",
            )
            .map(|_| ())
    }
}
