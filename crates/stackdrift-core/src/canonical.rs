//! Canonical JSON serialization
//!
//! The canonical form is the only basis for template equality:
//!
//! - object keys sorted by byte order at every level
//! - arrays keep their order
//! - `,` and `:` separators, no whitespace anywhere
//! - strings and numbers use serde_json's spelling (UTF-8, no ASCII escaping)
//!
//! The same value always yields the same bytes, whatever the key insertion
//! order of the source document was.

use crate::errors::Result;
use crate::template::ParsedTemplate;
use serde_json::Value;
use std::fmt;

/// Deterministic serialization of a template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalize a template tree
///
/// # Errors
///
/// Returns `ExErrorKind::Serialization` if a string cannot be encoded.
pub fn canonicalize(template: &ParsedTemplate) -> Result<CanonicalForm> {
    let mut out = String::new();
    write_value(&mut out, template)?;
    Ok(CanonicalForm(out))
}

fn write_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key)?;
                out.push(':');
                write_value(out, item)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) -> Result<()> {
    out.push_str(&serde_json::to_string(s)?);
    Ok(())
}
