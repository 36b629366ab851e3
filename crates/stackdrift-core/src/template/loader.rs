//! Local and remote template loaders

use crate::errors::{io_error, DriftError, ExError, Result};
use crate::template::body::TemplateBody;
use crate::template::intrinsic::yaml_to_json;
use crate::template::ParsedTemplate;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Load a template file from the working tree
///
/// `relative` is resolved against `root`; errors report it as written.
/// JSON and YAML are both accepted; see [`parse_local_text`].
pub fn load_local_template(root: &Path, relative: &str) -> Result<ParsedTemplate> {
    let text = fs::read_to_string(root.join(relative)).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DriftError::TemplateNotFound {
            path: relative.to_string(),
        }
        .into(),
        _ => io_error("read_local_template", e).with_template_path(relative),
    })?;

    parse_local_text(&text).map_err(|e| e.with_template_path(relative))
}

/// Parse local template text
///
/// Text that looks like JSON (first non-blank character `{` or `[`) goes
/// through the strict JSON parser first. Anything else, and JSON that fails
/// to parse, goes through the YAML parser with intrinsic tag expansion.
pub fn parse_local_text(text: &str) -> Result<ParsedTemplate> {
    let text = text.trim();
    if text.starts_with('{') || text.starts_with('[') {
        if let Ok(value) = serde_json::from_str(text) {
            return Ok(value);
        }
    }
    parse_yaml(text)
}

/// Parse a remote template string: JSON first, YAML on failure
pub fn parse_remote_text(text: &str) -> Result<ParsedTemplate> {
    let text = text.trim();
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) => parse_yaml(text),
    }
}

/// Turn a retrieved body into a template tree
pub fn decode_template_body(body: TemplateBody) -> Result<ParsedTemplate> {
    match body {
        TemplateBody::Object(map) => Ok(ParsedTemplate::Object(map)),
        TemplateBody::Text(text) => parse_remote_text(&text),
        TemplateBody::Unsupported(kind) => Err(DriftError::UnsupportedBody {
            kind: kind.to_string(),
        }
        .into()),
    }
}

fn parse_yaml(text: &str) -> Result<ParsedTemplate> {
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| {
        ExError::from(DriftError::TemplateParse {
            reason: format!("YAML parse error: {}", e),
        })
        .with_op("parse_template")
    })?;
    yaml_to_json(value).map_err(|e| e.with_op("parse_template"))
}
