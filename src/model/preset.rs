use std::collections::BTreeMap;

use serde_yaml::Value;

/// A named bundle of default form values.
#[derive(Clone, Debug)]
pub struct Preset {
    pub name: String,
    pub values: BTreeMap<String, PresetValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresetValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
    Other(String),
}

impl PresetValue {
    pub fn from_yaml(value: &Value) -> Self {
        match value {
            Value::String(s) => PresetValue::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PresetValue::Integer(i),
                None => PresetValue::Other(n.to_string()),
            },
            Value::Sequence(items) => PresetValue::List(items.iter().map(scalar_text).collect()),
            other => PresetValue::Other(scalar_text(other)),
        }
    }

    /// Text placed into a form buffer when the preset becomes active.
    pub fn form_text(&self) -> String {
        match self {
            PresetValue::Text(s) | PresetValue::Other(s) => s.clone(),
            PresetValue::Integer(i) => i.to_string(),
            PresetValue::List(items) => items.join(","),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
