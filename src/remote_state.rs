use std::process::Command;

use anyhow::{Context, Result};

pub const BACKEND_FILE: &str = "s3.tf";
pub const DEFAULT_REGION: &str = "ap-southeast-2";

/// Object-store key holding the remote state of deployment `name`.
pub fn state_key(name: &str) -> String {
    format!("{}/s3/terraform.tfstate", name)
}

/// Renders the backend block written into every new deployment.
pub fn render_backend(
    bucket: &str,
    name: &str,
    region: Option<&str>,
    profile: Option<&str>,
) -> String {
    let region = region.unwrap_or(DEFAULT_REGION);
    let profile_line = profile
        .map(|p| format!("\n    profile         = \"{}\"", p))
        .unwrap_or_default();
    format!(
        "terraform {{
  backend \"s3\" {{
    bucket          = \"{}\"
    key             = \"{}\"
    use_lockfile    = true
    region          = \"{}\"
    encrypt         = true{}
  }}
}}
",
        bucket,
        state_key(name),
        region,
        profile_line
    )
}

/// Deletion side of the remote state backend.
pub trait RemoteStateStore: Send + Sync {
    fn delete_object(&self, key: &str) -> Result<()>;
    fn delete_prefix(&self, prefix: &str) -> Result<()>;
}

/// Shells out to the AWS CLI instead of linking an SDK.
pub struct AwsCliStore {
    bin: String,
    bucket: String,
    profile: Option<String>,
    region: Option<String>,
}

impl AwsCliStore {
    pub fn new(
        bin: impl Into<String>,
        bucket: impl Into<String>,
        profile: Option<String>,
        region: Option<String>,
    ) -> Self {
        Self {
            bin: bin.into(),
            bucket: bucket.into(),
            profile,
            region,
        }
    }

    fn rm(&self, key: &str, recursive: bool) -> Result<()> {
        if self.bucket.is_empty() || key.is_empty() {
            anyhow::bail!("missing bucket or key for S3 deletion");
        }
        let uri = format!("s3://{}/{}", self.bucket, key.trim_start_matches('/'));
        let mut cmd = Command::new(&self.bin);
        cmd.args(["s3", "rm", uri.as_str()]);
        if recursive {
            cmd.arg("--recursive");
        }
        if let Some(profile) = &self.profile {
            cmd.env("AWS_PROFILE", profile);
        }
        if let Some(region) = &self.region {
            cmd.env("AWS_REGION", region);
        }

        tracing::info!(%uri, recursive, "deleting remote state");
        let out = cmd.output().with_context(|| format!("spawn {}", self.bin))?;
        if !out.status.success() {
            let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&out.stderr));
            let what = if recursive { "aws s3 rm --recursive" } else { "aws s3 rm" };
            anyhow::bail!("{} failed: {}\n{}", what, out.status, combined);
        }
        Ok(())
    }
}

impl RemoteStateStore for AwsCliStore {
    fn delete_object(&self, key: &str) -> Result<()> {
        self.rm(key, false)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.rm(prefix, true)
    }
}

#[cfg(test)]
#[path = "tests/remote_state_tests.rs"]
mod tests;
