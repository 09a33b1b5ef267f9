use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_yaml::Value;

use crate::model::{Preset, PresetValue};

/// Loads every `*.yaml` file in `dir` as a preset, sorted by name.
///
/// Files that fail to parse are skipped; an unreadable directory is an error.
pub fn load_presets(dir: &Path) -> Result<Vec<Preset>> {
    let entries = fs::read_dir(dir).with_context(|| format!("read presets dir {}", dir.display()))?;

    let mut presets = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        match load_preset(&path) {
            Ok(values) => presets.push(Preset {
                name: name.to_string(),
                values,
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", err), "skipping preset");
            }
        }
    }
    presets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(presets)
}

fn load_preset(path: &Path) -> Result<BTreeMap<String, PresetValue>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_preset(&text)
}

pub fn parse_preset(text: &str) -> Result<BTreeMap<String, PresetValue>> {
    let raw: BTreeMap<String, Value> = serde_yaml::from_str(text).context("parse preset")?;
    Ok(raw
        .iter()
        .map(|(key, value)| (key.clone(), PresetValue::from_yaml(value)))
        .collect())
}

#[cfg(test)]
#[path = "tests/presets_tests.rs"]
mod tests;
