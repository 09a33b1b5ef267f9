//! VM template lookup for a cluster: Vault AppRole login, a cluster-scoped
//! secret read, then a Proxmox resource listing filtered to usable templates.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_VAULT_ADDR: &str = "http://127.0.0.1:8200";
const INVENTORY_TIMEOUT: Duration = Duration::from_secs(5);
const EXCLUDED_SUFFIX: &str = "-test";

pub trait TemplateSource: Send + Sync {
    fn templates_for_cluster(&self, cluster: &str) -> Result<Vec<String>>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxmoxCreds {
    pub api_url: String,
    pub token_id: String,
    pub token_secret: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProxmoxVm {
    #[serde(default)]
    pub vmid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub template: i64,
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    data: Vec<ProxmoxVm>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    auth: Option<LoginAuth>,
}

#[derive(Debug, Deserialize)]
struct LoginAuth {
    client_token: String,
}

pub struct VaultProxmoxSource {
    vault_addr: String,
    filter: Regex,
    vault: reqwest::blocking::Client,
    inventory: reqwest::blocking::Client,
}

impl VaultProxmoxSource {
    pub fn new(vault_addr: impl Into<String>, filter: &str) -> Result<Self> {
        let filter = Regex::new(filter).context("compile template filter")?;
        let vault = reqwest::blocking::Client::builder()
            .user_agent("infracat")
            .build()
            .context("build vault client")?;
        // Proxmox clusters commonly serve self-signed certificates.
        let inventory = reqwest::blocking::Client::builder()
            .user_agent("infracat")
            .danger_accept_invalid_certs(true)
            .timeout(INVENTORY_TIMEOUT)
            .build()
            .context("build inventory client")?;
        Ok(Self {
            vault_addr: vault_addr.into(),
            filter,
            vault,
            inventory,
        })
    }

    /// Vault address from `VAULT_ADDR`, else the local default.
    pub fn from_env(filter: &str) -> Result<Self> {
        let addr = std::env::var("VAULT_ADDR")
            .ok()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string());
        Self::new(addr, filter)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.vault_addr.trim_end_matches('/'), path)
    }

    fn login(&self) -> Result<String> {
        let role_id = std::env::var("TF_VAR_role_id").unwrap_or_default();
        let secret_id = std::env::var("TF_VAR_secret_id").unwrap_or_default();
        if role_id.is_empty() || secret_id.is_empty() {
            anyhow::bail!("vault approle credentials not set");
        }

        let resp = self
            .vault
            .post(self.url("auth/approle/login"))
            .json(&serde_json::json!({ "role_id": role_id, "secret_id": secret_id }))
            .send()
            .context("vault approle login")?
            .error_for_status()
            .context("vault approle login status")?;
        let body: LoginResponse = resp.json().context("parse vault login response")?;
        body.auth
            .map(|a| a.client_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| anyhow!("vault approle login returned no token"))
    }

    fn read_creds(&self, token: &str, cluster: &str) -> Result<ProxmoxCreds> {
        let path = format!("proxmox_api_keys/data/{}", cluster);
        let resp = self
            .vault
            .get(self.url(&path))
            .header("X-Vault-Token", token)
            .send()
            .with_context(|| format!("vault read {}", path))?
            .error_for_status()
            .with_context(|| format!("vault read {} status", path))?;
        let body: Value = resp
            .json()
            .with_context(|| format!("parse vault secret {}", path))?;
        parse_cluster_secret(&body, &path)
    }

    fn list_vms(&self, creds: &ProxmoxCreds) -> Result<Vec<ProxmoxVm>> {
        let url = format!(
            "https://{}:8006/api2/json/cluster/resources?type=vm",
            creds.api_url
        );
        let resp = self
            .inventory
            .get(&url)
            .header(
                "Authorization",
                format!("PVEAPIToken={}={}", creds.token_id, creds.token_secret),
            )
            .send()
            .context("query cluster resources")?
            .error_for_status()
            .context("cluster resources status")?;
        let body: ResourcesResponse = resp.json().context("parse cluster resources")?;
        Ok(body.data)
    }
}

impl TemplateSource for VaultProxmoxSource {
    fn templates_for_cluster(&self, cluster: &str) -> Result<Vec<String>> {
        let token = self.login()?;
        let creds = self
            .read_creds(&token, cluster)
            .context("failed to get Proxmox creds from Vault")?;
        let vms = self
            .list_vms(&creds)
            .context("failed to list Proxmox VMs")?;
        let templates = select_templates(&vms, &self.filter);
        tracing::info!(cluster, count = templates.len(), "fetched templates");
        Ok(templates)
    }
}

/// Extracts API credentials from a KV read response, unwrapping the v2
/// `data.data` nesting when present.
pub fn parse_cluster_secret(body: &Value, path: &str) -> Result<ProxmoxCreds> {
    let mut data = body
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| anyhow!("vault read failed for {}: no data", path))?;
    if let Some(inner) = data.get("data").filter(|d| d.is_object()) {
        data = inner;
    }

    let field = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let creds = ProxmoxCreds {
        api_url: field("proxmox_api_url"),
        token_id: field("proxmox_api_token_id"),
        token_secret: field("proxmox_api_token_secret"),
    };
    if creds.api_url.is_empty() || creds.token_id.is_empty() || creds.token_secret.is_empty() {
        anyhow::bail!("missing fields in Vault secret {}", path);
    }
    Ok(creds)
}

/// Template-flagged VMs whose name matches `filter`, minus test builds.
pub fn select_templates(vms: &[ProxmoxVm], filter: &Regex) -> Vec<String> {
    vms.iter()
        .filter(|vm| vm.template == 1)
        .filter(|vm| filter.is_match(&vm.name) && !vm.name.ends_with(EXCLUDED_SUFFIX))
        .map(|vm| vm.name.clone())
        .collect()
}

#[cfg(test)]
#[path = "tests/templates_tests.rs"]
mod tests;
