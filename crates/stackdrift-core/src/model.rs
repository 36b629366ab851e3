//! Run-scoped data model
//!
//! Every value here is created during one run and dropped at its end.

use serde::{Deserialize, Serialize};

/// Maximum number of characters of error text kept on a result
pub const MAX_ERROR_CHARS: usize = 500;

/// One local template and the deployed stack it should match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePair {
    #[serde(rename = "githubPath")]
    pub local_path: String,
    #[serde(rename = "stackName")]
    pub remote_identifier: String,
}

impl TemplatePair {
    pub fn new(local_path: impl Into<String>, remote_identifier: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_identifier: remote_identifier.into(),
        }
    }

    /// File name of the local template without directory or final extension
    ///
    /// `templates/net/vpc.yaml` → `vpc`, `a.b.json` → `a.b`
    pub fn stem(&self) -> &str {
        template_stem(&self.local_path)
    }
}

/// Strip directory and final extension from a template path
pub fn template_stem(path: &str) -> &str {
    let base = path.rsplit('/').next().unwrap_or(path);
    match base.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => base,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    Ok,
    Error,
}

/// Outcome of comparing one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub status: ComparisonStatus,
    #[serde(flatten)]
    pub pair: TemplatePair,
    pub equal: bool,
    #[serde(rename = "githubSha256", skip_serializing_if = "Option::is_none")]
    pub local_digest: Option<String>,
    #[serde(rename = "cfnSha256", skip_serializing_if = "Option::is_none")]
    pub remote_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComparisonResult {
    pub fn compared(
        pair: TemplatePair,
        equal: bool,
        local_digest: String,
        remote_digest: String,
    ) -> Self {
        Self {
            status: ComparisonStatus::Ok,
            pair,
            equal,
            local_digest: Some(local_digest),
            remote_digest: Some(remote_digest),
            error: None,
        }
    }

    /// Error result; the message is cut to [`MAX_ERROR_CHARS`] characters
    pub fn failed(pair: TemplatePair, error: &str) -> Self {
        Self {
            status: ComparisonStatus::Error,
            pair,
            equal: false,
            local_digest: None,
            remote_digest: None,
            error: Some(truncate_chars(error, MAX_ERROR_CHARS).to_string()),
        }
    }

    pub fn is_diff(&self) -> bool {
        self.status == ComparisonStatus::Ok && !self.equal
    }

    pub fn is_error(&self) -> bool {
        self.status == ComparisonStatus::Error
    }
}

/// Truncate on a character boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Aggregate of all results plus run metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub checked_at_utc: String,
    pub branch: String,
    /// Empty when no label was configured
    #[serde(default)]
    pub stack_name_label: String,
    pub diff_count: usize,
    pub error_count: usize,
    pub items: Vec<ComparisonResult>,
}

impl RunSummary {
    pub fn from_results(
        checked_at_utc: impl Into<String>,
        branch: impl Into<String>,
        stack_name_label: Option<String>,
        items: Vec<ComparisonResult>,
    ) -> Self {
        let diff_count = items.iter().filter(|r| r.is_diff()).count();
        let error_count = items.iter().filter(|r| r.is_error()).count();
        Self {
            checked_at_utc: checked_at_utc.into(),
            branch: branch.into(),
            stack_name_label: stack_name_label.unwrap_or_default(),
            diff_count,
            error_count,
            items,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diff_count == 0 && self.error_count == 0
    }

    pub fn diffs(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.items.iter().filter(|r| r.is_diff())
    }

    pub fn errors(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.items.iter().filter(|r| r.is_error())
    }

    /// Pretty JSON used for stdout and `_meta.json`
    pub fn to_pretty_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
