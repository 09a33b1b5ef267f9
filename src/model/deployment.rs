use std::path::PathBuf;

use serde::Serialize;

use super::LifecycleState;

/// One row of the registry snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct DeploymentInfo {
    pub name: String,
    pub description: String,
    pub state: LifecycleState,
    /// Timestamp of the last recorded action, truncated to minutes.
    pub last_action: String,
    pub last_modified: String,
    pub path: PathBuf,
}
