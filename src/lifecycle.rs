//! Create, apply and destroy sequences for deployment instances.
//!
//! Every sequence stops at the first hard failure and leaves whatever the
//! completed steps produced in place. Only this module writes lifecycle state.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};

use crate::catalog::FieldCatalog;
use crate::config::Settings;
use crate::fsutil::{copy_dir, write_atomic};
use crate::model::LifecycleState;
use crate::params::{self, PARAMS_FILE};
use crate::provision::{ProvisionAction, Provisioner, TerraformCli};
use crate::remote_state::{AwsCliStore, BACKEND_FILE, RemoteStateStore, render_backend, state_key};

mod outcome;
mod state_file;

pub use self::outcome::{SequenceReport, SequenceResult, SoftFailure, Step, StepFailure};
pub use self::state_file::{STATE_FILE, read_state};
use self::state_file::write_state;

/// Where the create sequence gets its remote-state backend settings.
#[derive(Clone, Debug, Default)]
pub struct BackendSettings {
    pub bucket: String,
    pub region: Option<String>,
    pub profile: Option<String>,
}

pub struct LifecycleOrchestrator {
    provisioner: Box<dyn Provisioner>,
    remote_state: Box<dyn RemoteStateStore>,
    catalog: Arc<FieldCatalog>,
    apps_path: PathBuf,
    template_path: PathBuf,
    provider: String,
    backend: BackendSettings,
}

impl LifecycleOrchestrator {
    pub fn new(
        settings: &Settings,
        catalog: Arc<FieldCatalog>,
        provisioner: Box<dyn Provisioner>,
        remote_state: Box<dyn RemoteStateStore>,
    ) -> Self {
        Self {
            provisioner,
            remote_state,
            catalog,
            apps_path: settings.apps_path.clone(),
            template_path: settings.template_path.clone(),
            provider: settings.provider.clone(),
            backend: BackendSettings {
                bucket: settings.s3_bucket.clone(),
                region: settings.aws_region.clone(),
                profile: settings.aws_profile.clone(),
            },
        }
    }

    /// Wires the real terraform and AWS CLI collaborators.
    pub fn from_settings(settings: &Settings, catalog: Arc<FieldCatalog>) -> Self {
        let provisioner = TerraformCli::new(settings.terraform_bin.clone());
        let remote_state = AwsCliStore::new(
            settings.aws_bin.clone(),
            settings.s3_bucket.clone(),
            settings.aws_profile.clone(),
            settings.aws_region.clone(),
        );
        Self::new(
            settings,
            catalog,
            Box::new(provisioner),
            Box::new(remote_state),
        )
    }

    pub fn deployment_name(&self, values: &[(String, String)]) -> String {
        deployment_name(&self.provider, values)
    }

    /// Creates a deployment from raw form values and provisions it.
    pub fn create(
        &self,
        values: &[(String, String)],
        progress: &mut dyn FnMut(String),
    ) -> SequenceResult {
        let name = self.deployment_name(values);
        let dir = self.apps_path.join(&name);
        let mut run = Run::new(&name, progress);
        tracing::info!(deployment = %name, "create sequence started");

        run.step(Step::CheckTarget, || {
            if dir.exists() {
                return Err(anyhow!("Deployment '{}' already exists!", name));
            }
            Ok(())
        })?;
        run.step(Step::CopyTemplate, || copy_dir(&self.template_path, &dir))?;
        run.step(Step::WriteParameters, || {
            let updates = params::format_create_updates(
                values.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                &self.catalog,
            );
            params::save(&dir.join(PARAMS_FILE), &updates)
        })?;
        run.step(Step::WriteBackend, || {
            let text = render_backend(
                &self.backend.bucket,
                &name,
                self.backend.region.as_deref(),
                self.backend.profile.as_deref(),
            );
            write_atomic(&dir.join(BACKEND_FILE), text.as_bytes())
        })?;
        run.step(Step::MarkReady, || {
            write_state(&dir, LifecycleState::Ready, "save").map(drop)
        })?;

        run.note(format!(
            "Deployment '{}' created. Running terraform init...",
            name
        ));
        self.provision(&mut run, &dir)?;
        run.note(format!("Deployment '{}' deployed and ready!", name));
        Ok(run.finish())
    }

    /// Re-runs init and apply against an existing deployment.
    pub fn apply_existing(&self, dir: &Path, progress: &mut dyn FnMut(String)) -> SequenceResult {
        let name = dir_name(dir);
        let mut run = Run::new(&name, progress);
        tracing::info!(deployment = %name, "apply sequence started");
        run.note("Running terraform init...".to_string());
        self.provision(&mut run, dir)?;
        run.note("Deployment applied and ready!".to_string());
        Ok(run.finish())
    }

    fn provision(&self, run: &mut Run<'_>, dir: &Path) -> Result<(), StepFailure> {
        run.step(Step::Init, || self.provisioner.run(dir, ProvisionAction::Init))?;
        run.step(Step::MarkInitialized, || {
            write_state(dir, LifecycleState::Initialized, "init").map(drop)
        })?;
        run.note(format!("Deployment '{}' initialized. Running terraform apply...", run.name()));
        run.step(Step::Apply, || self.provisioner.run(dir, ProvisionAction::Apply))?;
        run.step(Step::MarkDeployed, || {
            write_state(dir, LifecycleState::Deployed, "apply").map(drop)
        })?;
        Ok(())
    }

    /// Destroys the infrastructure, then its remote state and directory.
    ///
    /// Only a failing `terraform destroy` is fatal; later steps degrade to
    /// soft failures.
    pub fn destroy(&self, dir: &Path, progress: &mut dyn FnMut(String)) -> SequenceResult {
        let name = dir_name(dir);
        let mut run = Run::new(&name, progress);
        tracing::info!(deployment = %name, "destroy sequence started");

        run.note("Running terraform destroy...".to_string());
        run.step(Step::Destroy, || {
            self.provisioner.run(dir, ProvisionAction::Destroy)
        })?;
        run.soft(Step::MarkDestroyed, || {
            write_state(dir, LifecycleState::Destroyed, "destroy").map(drop)
        });
        run.soft(Step::PurgeRemoteState, || {
            let prefix = format!("{}/", name);
            self.remote_state.delete_prefix(&prefix).or_else(|err| {
                tracing::debug!(error = %format!("{:#}", err), "prefix delete failed; deleting state object");
                self.remote_state
                    .delete_object(&state_key(&name))
                    .map_err(|_| err)
            })
        });
        run.soft(Step::RemoveDirectory, || {
            fs::remove_dir_all(dir).with_context(|| format!("remove {}", dir.display()))
        });
        Ok(run.finish())
    }

    /// Dry-run destroy; touches nothing.
    pub fn plan_destroy(&self, dir: &Path, progress: &mut dyn FnMut(String)) -> SequenceResult {
        let name = dir_name(dir);
        let mut run = Run::new(&name, progress);
        run.note("Running terraform plan -destroy...".to_string());
        run.step(Step::PlanDestroy, || {
            self.provisioner.run(dir, ProvisionAction::PlanDestroy)
        })?;
        Ok(run.finish())
    }
}

/// `<provider>_<vm_app>_<zone>_<platform_id>`
pub fn deployment_name(provider: &str, values: &[(String, String)]) -> String {
    let get = |key: &str| {
        values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    };
    format!(
        "{}_{}_{}_{}",
        provider,
        get("vm_app"),
        get("zone"),
        get("platform_id")
    )
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

struct Run<'a> {
    report: SequenceReport,
    progress: &'a mut dyn FnMut(String),
}

impl<'a> Run<'a> {
    fn new(name: &str, progress: &'a mut dyn FnMut(String)) -> Self {
        Self {
            report: SequenceReport {
                name: name.to_string(),
                ..SequenceReport::default()
            },
            progress,
        }
    }

    fn name(&self) -> &str {
        &self.report.name
    }

    fn note(&mut self, msg: String) {
        (self.progress)(msg);
    }

    fn step(
        &mut self,
        step: Step,
        f: impl FnOnce() -> anyhow::Result<()>,
    ) -> Result<(), StepFailure> {
        match f() {
            Ok(()) => {
                tracing::debug!(deployment = %self.report.name, step = step.describe(), "step done");
                self.report.completed.push(step);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    deployment = %self.report.name,
                    step = step.describe(),
                    error = %format!("{:#}", error),
                    "sequence stopped"
                );
                Err(StepFailure { step, error })
            }
        }
    }

    fn soft(&mut self, step: Step, f: impl FnOnce() -> anyhow::Result<()>) {
        match f() {
            Ok(()) => self.report.completed.push(step),
            Err(error) => {
                let message = format!("{:#}", error);
                tracing::warn!(
                    deployment = %self.report.name,
                    step = step.describe(),
                    error = %message,
                    "continuing after failure"
                );
                self.report.soft_failures.push(SoftFailure { step, message });
            }
        }
    }

    fn finish(self) -> SequenceReport {
        self.report
    }
}
