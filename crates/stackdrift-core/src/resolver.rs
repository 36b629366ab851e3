//! Pair resolution
//!
//! A run starts from an ordered list of [`TemplatePair`]s. Two sources exist:
//! a naming convention over a template list, and an explicit manifest file.

use crate::errors::{io_error, DriftError, Result};
use crate::model::{template_stem, TemplatePair};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Produces the ordered pairs for a run
pub trait PairResolver {
    /// Resolve every pair up front
    ///
    /// # Errors
    ///
    /// Any error is fatal to the run; no pair is processed.
    fn resolve(&self) -> Result<Vec<TemplatePair>>;
}

/// Stack names derived as `{prefix}-{environment}-{stem}`
#[derive(Debug, Clone)]
pub struct ConventionResolver {
    templates: Vec<String>,
    prefix: String,
    environment: String,
}

impl ConventionResolver {
    pub fn new(
        templates: Vec<String>,
        prefix: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            prefix: prefix.into(),
            environment: environment.into(),
        }
    }

    /// Build from a comma-separated template list, skipping blank entries
    pub fn from_list(
        list: &str,
        prefix: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self::new(split_template_list(list), prefix, environment)
    }

    pub fn stack_name_for(&self, template_path: &str) -> String {
        format!(
            "{}-{}-{}",
            self.prefix,
            self.environment,
            template_stem(template_path)
        )
    }
}

impl PairResolver for ConventionResolver {
    fn resolve(&self) -> Result<Vec<TemplatePair>> {
        Ok(self
            .templates
            .iter()
            .map(|t| TemplatePair::new(t.clone(), self.stack_name_for(t)))
            .collect())
    }
}

/// Split `a.yaml, b.yaml,,c.yaml` into trimmed, non-empty entries
pub fn split_template_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pairs read from a JSON manifest:
///
/// ```json
/// [{"GithubPath": "templates/vpc.yaml", "StackName": "acme-dev-vpc"}]
/// ```
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    path: PathBuf,
}

impl ManifestResolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PairResolver for ManifestResolver {
    fn resolve(&self) -> Result<Vec<TemplatePair>> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DriftError::InvalidManifest {
                reason: format!("Pairs JSON not found: {}", self.path.display()),
            }
            .into(),
            _ => io_error("read_pairs_manifest", e),
        })?;
        parse_manifest_str(&text)
    }
}

/// Parse and validate manifest text
///
/// The whole document is validated before any pair is returned.
pub fn parse_manifest_str(text: &str) -> Result<Vec<TemplatePair>> {
    let document: Value =
        serde_json::from_str(text.trim()).map_err(|e| DriftError::InvalidManifest {
            reason: format!("Pairs JSON parse error: {}", e),
        })?;

    let Value::Array(items) = document else {
        return Err(DriftError::InvalidManifest {
            reason: "Pairs JSON must be a JSON array".to_string(),
        }
        .into());
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_manifest_item(i + 1, item))
        .collect()
}

fn parse_manifest_item(index: usize, item: &Value) -> Result<TemplatePair> {
    let Value::Object(entry) = item else {
        return Err(DriftError::InvalidManifest {
            reason: format!("Pairs JSON item #{} must be an object", index),
        }
        .into());
    };

    let field = |name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };

    match (field("GithubPath"), field("StackName")) {
        (Some(path), Some(stack)) => Ok(TemplatePair::new(path, stack)),
        _ => Err(DriftError::ManifestFieldMissing { index }.into()),
    }
}
