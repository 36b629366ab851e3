//! Run configuration
//!
//! Built once at startup by the binary and passed down; nothing below this
//! point reads the process environment.

use stackdrift_core::errors::{DriftError, Result};
use std::path::PathBuf;

/// Settings for one drift check
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Branch or environment label shown in the summary and notification
    pub branch: String,
    /// Optional system label shown in the notification
    pub stack_name_label: Option<String>,
    /// Directory local template paths are resolved against
    pub template_root: PathBuf,
    /// Persist canonical documents and the summary when set
    pub output: Option<OutputConfig>,
}

impl RunConfig {
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            stack_name_label: None,
            template_root: PathBuf::from("."),
            output: None,
        }
    }

    pub fn with_stack_name_label(mut self, label: Option<String>) -> Self {
        self.stack_name_label = label.filter(|l| !l.is_empty());
        self
    }

    pub fn with_template_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.template_root = root.into();
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    /// Reject configurations that cannot produce a complete run
    pub fn validate(&self) -> Result<()> {
        if let Some(output) = &self.output {
            if output.dir.as_os_str().is_empty() {
                return Err(missing("output directory"));
            }
            if let Some(upload) = &output.upload {
                if upload.bucket.trim().is_empty() {
                    return Err(missing("S3_BUCKET"));
                }
            }
        }
        Ok(())
    }
}

/// Where run output is written and uploaded
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub upload: Option<UploadTarget>,
}

impl OutputConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            upload: None,
        }
    }

    pub fn with_upload(mut self, upload: UploadTarget) -> Self {
        self.upload = Some(upload);
        self
    }
}

/// Bucket and key prefix uploads go to
///
/// The prefix is used verbatim, so it normally ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub prefix: String,
}

impl UploadTarget {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// `s3://<bucket>/<prefix><key>`
    pub fn destination(&self, key: &str) -> String {
        format!("s3://{}/{}{}", self.bucket, self.prefix, key)
    }
}

/// Fail fast on an empty required value
pub fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(missing(name));
    }
    Ok(())
}

fn missing(name: &str) -> stackdrift_core::ExError {
    DriftError::MissingConfig {
        name: name.to_string(),
    }
    .into()
}
