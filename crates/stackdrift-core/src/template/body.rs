//! Remote template body decoding
//!
//! `get-template` answers with a document whose `TemplateBody` is either an
//! already-structured object or a string holding JSON or YAML. The response
//! is classified once here so the loader can match on it exhaustively.

use crate::errors::{DriftError, ExError, ExErrorKind, Result};
use serde_json::{Map, Value};

/// Template body as returned by the retrieval collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateBody {
    /// Body already decoded into an object
    Object(Map<String, Value>),
    /// Body serialized as JSON or YAML text
    Text(String),
    /// Any other JSON type; carries the type name for the error message
    Unsupported(&'static str),
}

impl TemplateBody {
    /// Classify a raw `TemplateBody` value (`None` when the key is absent)
    pub fn from_value(body: Option<Value>) -> Self {
        match body {
            Some(Value::Object(map)) => TemplateBody::Object(map),
            Some(Value::String(text)) => TemplateBody::Text(text),
            Some(Value::Array(_)) => TemplateBody::Unsupported("array"),
            Some(Value::Number(_)) => TemplateBody::Unsupported("number"),
            Some(Value::Bool(_)) => TemplateBody::Unsupported("bool"),
            Some(Value::Null) | None => TemplateBody::Unsupported("null"),
        }
    }

    /// Decode the JSON printed by `get-template --output json`
    pub fn from_response(response: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(response).map_err(|e| {
            ExError::new(ExErrorKind::ExternalService)
                .with_op("decode_get_template_response")
                .with_message(format!("Invalid get-template response: {}", e))
        })?;

        match document {
            Value::Object(mut map) => Ok(Self::from_value(map.remove("TemplateBody"))),
            _ => Err(DriftError::UnsupportedBody {
                kind: "response is not an object".to_string(),
            }
            .into()),
        }
    }
}
