use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::fsutil::write_atomic;
use crate::model::{LifecycleState, StateRecord};

pub const STATE_FILE: &str = "launcher.state";

#[derive(Debug, Serialize, Deserialize)]
struct StateDoc {
    state: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    last_action: String,
}

/// Reads the state record of the deployment in `dir`.
///
/// Callers that want the read-time default should fall back to
/// [`StateRecord::unknown`] on error.
pub fn read_state(dir: &Path) -> Result<StateRecord> {
    let path = dir.join(STATE_FILE);
    let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let doc: StateDoc =
        serde_yaml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(StateRecord {
        state: LifecycleState::parse(&doc.state),
        timestamp: doc.timestamp,
        last_action: doc.last_action,
    })
}

/// Overwrites the state record. `Unknown` is a read-time value and is refused.
pub(crate) fn write_state(dir: &Path, state: LifecycleState, action: &str) -> Result<StateRecord> {
    if state == LifecycleState::Unknown {
        anyhow::bail!("refusing to persist UNKNOWN state");
    }
    let record = StateRecord {
        state,
        timestamp: now_ts(),
        last_action: action.to_string(),
    };
    let doc = StateDoc {
        state: state.as_str().to_string(),
        timestamp: record.timestamp.clone(),
        last_action: record.last_action.clone(),
    };
    let text = serde_yaml::to_string(&doc).context("serialize state")?;
    write_atomic(&dir.join(STATE_FILE), text.as_bytes()).context("write state file")?;
    Ok(record)
}

fn now_ts() -> String {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0)
        .unwrap_or(now)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "<time>".to_string())
}
