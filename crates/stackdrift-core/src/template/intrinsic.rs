//! YAML to JSON conversion with intrinsic function expansion
//!
//! CloudFormation YAML templates use local tags as shorthand for intrinsic
//! functions. They expand to the same objects the long form produces:
//!
//! | shorthand            | expanded                          |
//! |----------------------|-----------------------------------|
//! | `!Ref X`             | `{"Ref": "X"}`                    |
//! | `!Condition X`       | `{"Condition": "X"}`              |
//! | `!GetAtt A.B.C`      | `{"Fn::GetAtt": ["A", "B.C"]}`    |
//! | `!GetAtt [A, B]`     | `{"Fn::GetAtt": ["A", "B"]}`      |
//! | `!Name value`        | `{"Fn::Name": value}`             |
//!
//! Tagged scalars keep their source text as a string (`!Base64 123` gives
//! `"123"`, a bare `!GetAZs` gives `""`). Nothing else is normalized:
//! `Fn::GetAtt: A.B` stays a string and therefore differs from `!GetAtt A.B`.

use crate::errors::{DriftError, Result};
use serde_json::{Map, Number, Value};
use serde_yaml::value::TaggedValue;

/// Convert a YAML value tree into a JSON value tree
pub fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => number_to_json(&n).map(Value::Number),
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            Ok(Value::Object(map))
        }
        serde_yaml::Value::Tagged(tagged) => expand_intrinsic(*tagged),
    }
}

fn expand_intrinsic(tagged: TaggedValue) -> Result<Value> {
    let tag = tagged.tag.to_string();
    let name = tag.trim_start_matches('!');

    let (key, value) = match name {
        "Ref" | "Condition" => (name.to_string(), tagged_operand(tagged.value)?),
        "GetAtt" => ("Fn::GetAtt".to_string(), get_att_operand(tagged.value)?),
        // Non-specific `!` tag: the plain operand
        "" => return tagged_operand(tagged.value),
        other => (format!("Fn::{}", other), tagged_operand(tagged.value)?),
    };

    let mut map = Map::with_capacity(1);
    map.insert(key, value);
    Ok(Value::Object(map))
}

/// Operand of a tagged node: collections convert normally, scalars become
/// their source text
fn tagged_operand(value: serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::String(String::new())),
        serde_yaml::Value::Bool(b) => Ok(Value::String(b.to_string())),
        serde_yaml::Value::Number(n) => Ok(Value::String(n.to_string())),
        other => yaml_to_json(other),
    }
}

fn get_att_operand(value: serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::String(s) => Ok(Value::Array(
            s.splitn(2, '.')
                .map(|part| Value::String(part.to_string()))
                .collect(),
        )),
        other => tagged_operand(other),
    }
}

/// Object keys must be strings in JSON; scalar YAML keys use their JSON text
fn mapping_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Number(n) => Ok(number_to_json(&n)?.to_string()),
        other => Err(DriftError::TemplateParse {
            reason: format!("unsupported mapping key: {:?}", other),
        }
        .into()),
    }
}

fn number_to_json(n: &serde_yaml::Number) -> Result<Number> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| {
            DriftError::TemplateParse {
                reason: format!("number has no JSON representation: {}", n),
            }
            .into()
        })
}
