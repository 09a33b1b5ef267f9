//! Line-oriented `key = value` parameter files shared with the provisioning
//! engine. Rewrites are strictly in place: untouched lines keep their exact
//! bytes and position, and unknown keys are never appended.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::{CREATE_STRING_FIELDS, DISK_SIZE_FIELD, FieldCatalog};
use crate::fsutil::write_atomic;

pub const PARAMS_FILE: &str = "terraform.tfvars";

/// Key/value pairs in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn parse(text: &str) -> Self {
        let mut set = Self::default();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            set.insert(key.trim(), value.trim());
        }
        set
    }

    fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn load(path: &Path) -> Result<ParameterSet> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(ParameterSet::parse(&text))
}

pub fn save(path: &Path, updates: &BTreeMap<String, String>) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let out = rewrite(&text, updates);
    write_atomic(path, out.as_bytes()).with_context(|| format!("write {}", path.display()))
}

/// Replaces every line assigning a key from `updates` with `key = value`.
pub fn rewrite(text: &str, updates: &BTreeMap<String, String>) -> String {
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            let mut out = None;
            for (key, value) in updates {
                let assigns = trimmed
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('='));
                if assigns {
                    out = Some(format!("{} = {}", key, value));
                }
            }
            out.unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serializes a form value the way the provisioning engine expects it.
pub fn format_value(key: &str, raw: &str, catalog: &FieldCatalog) -> String {
    format_with(key, raw, catalog.is_string(key))
}

/// Like [`format_value`], but the fixed create-form string fields are quoted
/// even when the catalog does not mark them.
pub fn format_create_value(key: &str, raw: &str, catalog: &FieldCatalog) -> String {
    format_with(key, raw, CREATE_STRING_FIELDS.contains(&key) || catalog.is_string(key))
}

fn format_with(key: &str, raw: &str, quoted: bool) -> String {
    if key == DISK_SIZE_FIELD {
        let items: Vec<String> = raw
            .split(',')
            .map(|part| format!("\"{}\"", part.trim().trim_matches(['"', '[', ']'])))
            .collect();
        return format!("[{}]", items.join(", "));
    }
    if quoted {
        return format!("\"{}\"", raw);
    }
    raw.to_string()
}

/// Formats every `(key, raw)` pair into an update set.
pub fn format_updates<'a>(
    values: impl IntoIterator<Item = (&'a str, &'a str)>,
    catalog: &FieldCatalog,
) -> BTreeMap<String, String> {
    values
        .into_iter()
        .map(|(key, raw)| (key.to_string(), format_value(key, raw, catalog)))
        .collect()
}

/// Formats the create form's values into an update set.
pub fn format_create_updates<'a>(
    values: impl IntoIterator<Item = (&'a str, &'a str)>,
    catalog: &FieldCatalog,
) -> BTreeMap<String, String> {
    values
        .into_iter()
        .map(|(key, raw)| (key.to_string(), format_create_value(key, raw, catalog)))
        .collect()
}

/// Strips the quoting and list brackets added by [`format_value`]; list
/// items come back comma separated.
pub fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return inner
            .split(',')
            .map(|part| part.trim().trim_matches('"'))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(",");
    }
    raw.trim_matches('"').to_string()
}

#[cfg(test)]
#[path = "tests/params_tests.rs"]
mod tests;
