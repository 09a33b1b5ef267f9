use anyhow::Result;

use crate::catalog::FieldCatalog;
use crate::config::{ClusterOptions, Settings};
use crate::model::Preset;

/// Everything loaded at startup that the interactive session needs.
#[derive(Clone, Debug)]
pub struct TuiRunOptions {
    pub settings: Settings,
    pub catalog: FieldCatalog,
    pub presets: Vec<Preset>,
    pub options: ClusterOptions,
}

pub fn run_with_options(opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run_with_options(opts)
}
