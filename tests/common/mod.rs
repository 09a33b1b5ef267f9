#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use infracat::catalog::{FieldCatalog, FieldMeta};
use infracat::config::Settings;
use infracat::lifecycle::{LifecycleOrchestrator, read_state};
use infracat::model::LifecycleState;
use infracat::provision::{ProvisionAction, Provisioner};
use infracat::remote_state::RemoteStateStore;

pub const TEMPLATE_TFVARS: &str = "# generated from template
vm_app = \"\"
platform_description = \"\"
zone = \"\"
platform_id = \"\"
vm_memory = 0
vm_disk_size = []
vm_template = \"\"
cluster = \"\"
";

/// Temporary apps/template layout plus matching settings.
pub struct Fixture {
    pub root: tempfile::TempDir,
    pub settings: Settings,
    pub catalog: Arc<FieldCatalog>,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("create fixture dir")?;
        let apps = root.path().join("apps");
        let template = root.path().join("template");
        fs::create_dir_all(&apps)?;
        fs::create_dir_all(template.join("modules"))?;
        fs::write(template.join("terraform.tfvars"), TEMPLATE_TFVARS)?;
        fs::write(template.join("main.tf"), "module \"vm\" {}\n")?;
        fs::write(template.join("modules").join("vm.tf"), "# vm\n")?;

        let settings = Settings::parse(&format!(
            "apps_path: {}\ntemplate_path: {}\npresets_path: {}\ns3_bucket: state-bucket\n",
            apps.display(),
            template.display(),
            root.path().join("presets").display()
        ))?;
        let string = |label: &str| FieldMeta {
            label: label.to_string(),
            kind: "string".to_string(),
            ..FieldMeta::default()
        };
        let catalog = FieldCatalog::from_fields([
            ("vm_app", string("Application")),
            ("platform_description", string("Description")),
            ("zone", string("Zone")),
            ("platform_id", string("Platform ID")),
            ("vm_template", string("Template")),
            ("cluster", string("Cluster")),
        ]);
        Ok(Self {
            root,
            settings,
            catalog: Arc::new(catalog),
        })
    }

    pub fn apps(&self) -> &Path {
        &self.settings.apps_path
    }

    pub fn orchestrator(
        &self,
        provisioner: &FakeProvisioner,
        store: &FakeRemoteStore,
    ) -> LifecycleOrchestrator {
        LifecycleOrchestrator::new(
            &self.settings,
            Arc::clone(&self.catalog),
            Box::new(provisioner.clone()),
            Box::new(store.clone()),
        )
    }
}

pub fn web_dmz_values() -> Vec<(String, String)> {
    [
        ("vm_app", "web"),
        ("platform_description", "Public web tier"),
        ("zone", "dmz"),
        ("platform_id", "01"),
        ("vm_memory", "2048"),
        ("vm_disk_size", "20, 40"),
        ("vm_template", "ubuntu-server-24.04.1"),
        ("cluster", "cl10400"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Records every engine invocation together with the lifecycle state the
/// deployment had at that moment.
#[derive(Clone, Default)]
pub struct FakeProvisioner {
    calls: Arc<Mutex<Vec<(ProvisionAction, LifecycleState)>>>,
    fail_on: Option<ProvisionAction>,
}

impl FakeProvisioner {
    pub fn failing_on(action: ProvisionAction) -> Self {
        Self {
            fail_on: Some(action),
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<ProvisionAction> {
        self.calls().into_iter().map(|(a, _)| a).collect()
    }

    pub fn calls(&self) -> Vec<(ProvisionAction, LifecycleState)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Provisioner for FakeProvisioner {
    fn run(&self, dir: &Path, action: ProvisionAction) -> Result<()> {
        let state = read_state(dir)
            .map(|r| r.state)
            .unwrap_or(LifecycleState::Unknown);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((action, state));
        }
        if self.fail_on == Some(action) {
            anyhow::bail!("{} failed: exit status: 1\nError: simulated failure", action);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deletion {
    Object(String),
    Prefix(String),
}

/// Remembers deletions; optionally records the watched deployment's state at
/// the time of each call.
#[derive(Clone, Default)]
pub struct FakeRemoteStore {
    deletions: Arc<Mutex<Vec<Deletion>>>,
    states: Arc<Mutex<Vec<LifecycleState>>>,
    watch: Option<PathBuf>,
    fail_prefix: bool,
    fail_object: bool,
}

impl FakeRemoteStore {
    pub fn watching(dir: &Path) -> Self {
        Self {
            watch: Some(dir.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn failing(prefix: bool, object: bool) -> Self {
        Self {
            fail_prefix: prefix,
            fail_object: object,
            ..Self::default()
        }
    }

    pub fn deletions(&self) -> Vec<Deletion> {
        self.deletions.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn observed_states(&self) -> Vec<LifecycleState> {
        self.states.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, deletion: Deletion) {
        if let Some(dir) = &self.watch {
            let state = read_state(dir)
                .map(|r| r.state)
                .unwrap_or(LifecycleState::Unknown);
            if let Ok(mut states) = self.states.lock() {
                states.push(state);
            }
        }
        if let Ok(mut deletions) = self.deletions.lock() {
            deletions.push(deletion);
        }
    }
}

impl RemoteStateStore for FakeRemoteStore {
    fn delete_object(&self, key: &str) -> Result<()> {
        self.record(Deletion::Object(key.to_string()));
        if self.fail_object {
            anyhow::bail!("delete s3://state-bucket/{} failed", key);
        }
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.record(Deletion::Prefix(prefix.to_string()));
        if self.fail_prefix {
            anyhow::bail!("delete s3://state-bucket/{} failed", prefix);
        }
        Ok(())
    }
}
