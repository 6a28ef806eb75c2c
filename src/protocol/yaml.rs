//! YAML documents
//!
//! The server answers the stats and list verbs with a YAML document: a
//! mapping of counters and settings, or a sequence of tube names. Scalars
//! are kept in their text form; callers read numbers with
//! [`YamlValue::get_u64`].

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{Error, Result};

/// A parsed stats or list document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YamlValue {
    Mapping(BTreeMap<String, String>),
    Sequence(Vec<String>),
}

impl YamlValue {
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            YamlValue::Mapping(map) => Some(map),
            YamlValue::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[String]> {
        match self {
            YamlValue::Sequence(items) => Some(items),
            YamlValue::Mapping(_) => None,
        }
    }

    /// Look a key up in a mapping document
    pub fn get(&self, key: &str) -> Option<&str> {
        self.as_mapping()
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    /// Look a key up and read it as an unsigned number
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|value| value.parse().ok())
    }
}

/// Parse a document, expecting a sequence when `is_list` is set and a
/// mapping otherwise
pub fn parse(text: &str, is_list: bool) -> Result<YamlValue> {
    let doc: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::protocol(format!("Malformed YAML document: {}", e)))?;

    match (untag(doc), is_list) {
        (Value::Sequence(items), true) => items
            .iter()
            .map(scalar_text)
            .collect::<Result<Vec<_>>>()
            .map(YamlValue::Sequence),
        (Value::Mapping(map), false) => map
            .iter()
            .map(|(key, value)| Ok((scalar_text(key)?, scalar_text(value)?)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(YamlValue::Mapping),
        // a document with no entries
        (Value::Null, true) => Ok(YamlValue::Sequence(Vec::new())),
        (Value::Null, false) => Ok(YamlValue::Mapping(BTreeMap::new())),
        (other, _) => Err(Error::protocol(format!(
            "Expected a YAML {}, got {}",
            if is_list { "sequence" } else { "mapping" },
            kind_name(&other)
        ))),
    }
}

fn untag(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => untag(tagged.value),
        other => other,
    }
}

/// Text form of a scalar; nested collections are re-emitted as YAML
fn scalar_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        nested => serde_yaml::to_string(nested)
            .map(|text| text.trim_end().to_string())
            .map_err(|e| Error::protocol(format!("Unreadable YAML value: {}", e))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
