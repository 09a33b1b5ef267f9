use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_CLUSTERS: &[&str] = &["cl10400", "cl12600k", "cl12900h", "cl13600k"];
pub const DEFAULT_ZONES: &[&str] = &["standard", "admin", "dmz"];
pub const DEFAULT_TEMPLATE_FILTER: &str = r"^ubuntu-server-24\.04\..*";

/// Process-wide settings read from `config.yaml`.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub repo: String,

    /// Directory holding one subdirectory per deployment instance.
    #[serde(default)]
    pub apps_path: PathBuf,

    /// Directory tree copied into every new deployment.
    #[serde(default)]
    pub template_path: PathBuf,

    #[serde(default)]
    pub presets_path: PathBuf,

    #[serde(default)]
    pub aws_profile: Option<String>,

    #[serde(default)]
    pub aws_region: Option<String>,

    /// Bucket holding remote state for every deployment.
    #[serde(default)]
    pub s3_bucket: String,

    /// Repository checkout whose git status is shown in the header.
    #[serde(default)]
    pub terraform_path: Option<PathBuf>,

    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_terraform_bin")]
    pub terraform_bin: String,

    #[serde(default = "default_aws_bin")]
    pub aws_bin: String,

    /// Regex a VM template name must match to be offered in the create form.
    #[serde(default = "default_template_filter")]
    pub template_filter: String,

    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_provider() -> String {
    "proxmox".to_string()
}

fn default_terraform_bin() -> String {
    "terraform".to_string()
}

fn default_aws_bin() -> String {
    "aws".to_string()
}

fn default_template_filter() -> String {
    DEFAULT_TEMPLATE_FILTER.to_string()
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut settings: Settings = serde_yaml::from_str(text).context("parse settings")?;
        settings.aws_profile = settings.aws_profile.filter(|s| !s.trim().is_empty());
        settings.aws_region = settings.aws_region.filter(|s| !s.trim().is_empty());
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("apps_path", &self.apps_path),
            ("template_path", &self.template_path),
            ("presets_path", &self.presets_path),
        ] {
            if value.as_os_str().is_empty() {
                anyhow::bail!("{} must be set", name);
            }
        }
        if self.provider.trim().is_empty() {
            anyhow::bail!("provider must not be empty");
        }
        regex::Regex::new(&self.template_filter).context("compile template_filter")?;
        Ok(())
    }
}

/// Choices offered by the cycle-only `cluster` and `zone` fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterOptions {
    pub clusters: Vec<String>,
    pub zones: Vec<String>,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS.iter().map(|s| s.to_string()).collect(),
            zones: DEFAULT_ZONES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OptionsFile {
    #[serde(default)]
    clusters: Vec<String>,
    #[serde(default)]
    zones: Vec<String>,
}

impl ClusterOptions {
    /// Reads the optional overrides file. A missing or unreadable file leaves
    /// the defaults in place; only non-empty lists replace them.
    pub fn load_or_default(path: &Path) -> Self {
        let mut options = Self::default();
        if !path.exists() {
            return options;
        }
        let parsed = fs::read_to_string(path)
            .context("read options file")
            .and_then(|text| {
                serde_yaml::from_str::<OptionsFile>(&text).context("parse options file")
            });
        match parsed {
            Ok(file) => {
                if !file.clusters.is_empty() {
                    options.clusters = file.clusters;
                }
                if !file.zones.is_empty() {
                    options.zones = file.zones;
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", err), "ignoring cluster options");
            }
        }
        options
    }
}

/// Whether credentials for the external collaborators look present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvStatus {
    pub aws_ok: bool,
    pub vault_ok: bool,
}

impl EnvStatus {
    pub fn detect(settings: &Settings) -> Self {
        Self::from_lookup(settings, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let vault_ok = set("TF_VAR_role_id").is_some() && set("TF_VAR_secret_id").is_some();
        let profile = set("AWS_PROFILE").or_else(|| settings.aws_profile.clone());
        let region = set("AWS_REGION").or_else(|| settings.aws_region.clone());

        Self {
            aws_ok: profile.is_some() && region.is_some(),
            vault_ok,
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
