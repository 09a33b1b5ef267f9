mod deployment;
mod preset;
mod state;

pub use self::deployment::DeploymentInfo;
pub use self::preset::{Preset, PresetValue};
pub use self::state::{LifecycleState, StateRecord};
