use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use time::format_description::FormatItem;

use crate::catalog::FieldCatalog;
use crate::lifecycle::read_state;
use crate::model::{DeploymentInfo, StateRecord};
use crate::params::{self, PARAMS_FILE};

fn modified_format() -> &'static [FormatItem<'static>] {
    static FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse("[year]-[month]-[day] [hour]:[minute]")
            .unwrap_or_default()
    })
}

/// Snapshot of every deployment directory under `apps_path`, in directory
/// enumeration order.
///
/// Per-deployment read failures degrade to defaults; only failing to read
/// `apps_path` itself is an error.
pub fn list(apps_path: &Path) -> Result<Vec<DeploymentInfo>> {
    let entries = fs::read_dir(apps_path)
        .with_context(|| format!("read apps dir {}", apps_path.display()))?;

    let mut infos = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if !meta.is_dir() {
            continue;
        }

        let description = params::load(&path.join(PARAMS_FILE))
            .ok()
            .and_then(|set| set.get("platform_description").map(|d| d.trim_matches('"').to_string()))
            .unwrap_or_default();

        let record = read_state(&path).unwrap_or_else(|err| {
            tracing::debug!(path = %path.display(), error = %format!("{:#}", err), "no readable state");
            StateRecord::unknown()
        });
        let last_action = record.timestamp.chars().take(16).collect();

        let last_modified = meta
            .modified()
            .ok()
            .map(OffsetDateTime::from)
            .and_then(|t| t.format(modified_format()).ok())
            .unwrap_or_default();

        infos.push(DeploymentInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            description,
            state: record.state,
            last_action,
            last_modified,
            path,
        });
    }
    Ok(infos)
}

/// Parameter rows of one deployment as `(label, raw value)`, sorted by label.
pub fn details(info: &DeploymentInfo, catalog: &FieldCatalog) -> Vec<(String, String)> {
    let Ok(set) = params::load(&info.path.join(PARAMS_FILE)) else {
        return Vec::new();
    };
    let mut rows: Vec<(String, String)> = set
        .iter()
        .map(|(key, value)| (catalog.label(key).to_string(), value.to_string()))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}
