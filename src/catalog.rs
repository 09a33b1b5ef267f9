use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Parameter keys in the order the create form presents them.
pub const FORM_FIELDS: &[&str] = &[
    "vm_app",
    "platform_description",
    "zone",
    "platform_id",
    "vm_network_suffix",
    "vm_id_prefix",
    "vm_memory",
    "vm_cpu_cores",
    "vm_disk_count",
    "vm_disk_size",
    "vm_count",
    "vm_template",
    "cluster",
];

/// Create-form fields always written quoted, whatever `fields.yaml` declares.
pub const CREATE_STRING_FIELDS: &[&str] = &[
    "vm_app",
    "platform_description",
    "zone",
    "cluster",
    "platform_id",
    "vm_template",
];

/// Multi-value field always written as a quoted list.
pub const DISK_SIZE_FIELD: &str = "vm_disk_size";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct FieldMeta {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub help: String,
    #[serde(default, rename = "readOnly")]
    pub read_only: bool,
    /// Declared value type; only `string` changes serialization.
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl FieldMeta {
    pub fn is_string(&self) -> bool {
        self.kind == "string"
    }
}

#[derive(Debug, Deserialize)]
struct FieldsFile {
    #[serde(default)]
    fields: HashMap<String, FieldMeta>,
}

/// Static display and typing metadata for every editable parameter.
#[derive(Clone, Debug, Default)]
pub struct FieldCatalog {
    fields: HashMap<String, FieldMeta>,
}

impl FieldCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: FieldsFile = serde_yaml::from_str(text).context("parse field metadata")?;
        Ok(Self {
            fields: file.fields,
        })
    }

    pub fn from_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, FieldMeta)>) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, m)| (k.into(), m)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldMeta> {
        self.fields.get(key)
    }

    /// Display label, falling back to the raw key.
    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        match self.fields.get(key) {
            Some(meta) if !meta.label.is_empty() => &meta.label,
            _ => key,
        }
    }

    pub fn help(&self, key: &str) -> &str {
        self.fields.get(key).map(|m| m.help.as_str()).unwrap_or("")
    }

    pub fn is_read_only(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(|m| m.read_only)
    }

    pub fn is_string(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(FieldMeta::is_string)
    }
}
