//! Seam to the provisioning engine. The real implementation shells out to
//! `terraform` in the deployment directory.

use std::fmt;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProvisionAction {
    Init,
    Apply,
    Destroy,
    PlanDestroy,
}

impl ProvisionAction {
    pub fn args(self) -> &'static [&'static str] {
        match self {
            ProvisionAction::Init => &["init", "-input=false"],
            ProvisionAction::Apply => &["apply", "-auto-approve", "-input=false"],
            ProvisionAction::Destroy => &["destroy", "-auto-approve", "-input=false"],
            ProvisionAction::PlanDestroy => &["plan", "-destroy", "-input=false"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProvisionAction::Init => "terraform init",
            ProvisionAction::Apply => "terraform apply",
            ProvisionAction::Destroy => "terraform destroy",
            ProvisionAction::PlanDestroy => "terraform plan -destroy",
        }
    }
}

impl fmt::Display for ProvisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub trait Provisioner: Send + Sync {
    /// Runs `action` with `dir` as the working directory. On failure the
    /// error carries the engine's combined output.
    fn run(&self, dir: &Path, action: ProvisionAction) -> Result<()>;
}

pub struct TerraformCli {
    bin: String,
}

impl TerraformCli {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }
}

impl Provisioner for TerraformCli {
    fn run(&self, dir: &Path, action: ProvisionAction) -> Result<()> {
        tracing::info!(dir = %dir.display(), %action, "running provisioning engine");
        let out = Command::new(&self.bin)
            .args(action.args())
            .current_dir(dir)
            .output()
            .with_context(|| format!("spawn {}", self.bin))?;

        if !out.status.success() {
            let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&out.stderr));
            anyhow::bail!("{} failed: {}\n{}", action, out.status, combined);
        }
        Ok(())
    }
}
