//! YAML parsing into documents.
//!
//! This module converts YAML text (a single document or a `---` separated
//! stream) into [`Value`] trees and [`Document`]s. Empty documents in a
//! stream, such as a trailing `---`, are skipped.
//!
//! # Example
//!
//! ```
//! use bundlequill::document::parser::parse_documents;
//!
//! let yaml = "kind: Namespace\nmetadata:\n  name: test\n---\nkind: ConfigMap\nmetadata:\n  name: cfg\n";
//! let docs = parse_documents(yaml).unwrap();
//! assert_eq!(docs.len(), 2);
//! assert_eq!(docs[1].name(), "cfg");
//! ```

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as SerdeValue;

use super::manifest::Document;
use super::value::{Number, Value};

/// Parses a YAML stream into documents, in input order.
pub fn parse_documents(yaml: &str) -> Result<Vec<Document>> {
    parse_values(yaml)?
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            Document::from_value(value)
                .with_context(|| format!("Invalid manifest in YAML document {}", index + 1))
        })
        .collect()
}

/// Parses a YAML stream into raw data trees, skipping empty documents.
pub fn parse_values(yaml: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for (index, de) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
        let serde_value = SerdeValue::deserialize(de)
            .with_context(|| format!("Failed to parse YAML document {}", index + 1))?;
        if serde_value.is_null() {
            continue;
        }
        let value = parse_value(&serde_value)
            .with_context(|| format!("Unsupported content in YAML document {}", index + 1))?;
        values.push(value);
    }
    Ok(values)
}

/// Converts a `serde_yaml::Value` into a [`Value`].
///
/// Tags are dropped and the tagged value kept. Map keys must be scalars;
/// they are rendered to strings (`1: a` has the key `"1"`).
pub fn parse_value(value: &SerdeValue) -> Result<Value> {
    let converted = match value {
        SerdeValue::Mapping(mapping) => {
            let mut entries = IndexMap::with_capacity(mapping.len());
            for (key, child) in mapping {
                entries.insert(key_to_string(key)?, parse_value(child)?);
            }
            Value::Map(entries)
        }
        SerdeValue::Sequence(items) => {
            Value::Seq(items.iter().map(parse_value).collect::<Result<_>>()?)
        }
        SerdeValue::String(s) => Value::String(s.clone()),
        SerdeValue::Number(n) => Value::Number(convert_number(n)),
        SerdeValue::Bool(b) => Value::Bool(*b),
        SerdeValue::Null => Value::Null,
        SerdeValue::Tagged(tagged) => parse_value(&tagged.value)?,
    };
    Ok(converted)
}

fn convert_number(n: &serde_yaml::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Integer(i)
    } else {
        // u64 beyond i64::MAX and real floats both land here
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn key_to_string(key: &SerdeValue) -> Result<String> {
    match key {
        SerdeValue::String(s) => Ok(s.clone()),
        SerdeValue::Number(n) => Ok(n.to_string()),
        SerdeValue::Bool(b) => Ok(b.to_string()),
        SerdeValue::Null => Ok("null".to_string()),
        SerdeValue::Tagged(tagged) => key_to_string(&tagged.value),
        SerdeValue::Mapping(_) | SerdeValue::Sequence(_) => {
            Err(anyhow!("map keys must be scalars"))
        }
    }
}
