use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitStatus {
    pub branch: String,
    pub dirty: bool,
}

/// Branch and dirty flag of the checkout at `repo`.
pub fn git_status(repo: &Path) -> Result<GitStatus> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["status", "--porcelain", "--branch"])
        .output()
        .context("spawn git")?;
    if !out.status.success() {
        anyhow::bail!(
            "git status failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }
    Ok(parse_porcelain(&String::from_utf8_lossy(&out.stdout)))
}

pub fn parse_porcelain(text: &str) -> GitStatus {
    let mut lines = text.lines();
    let branch = lines
        .next()
        .and_then(|l| l.strip_prefix("## "))
        .map(|rest| {
            let end = rest
                .find("...")
                .or_else(|| rest.find(' '))
                .unwrap_or(rest.len());
            rest[..end].to_string()
        })
        .unwrap_or_else(|| "main".to_string());
    let dirty = lines.any(|l| !l.trim().is_empty());
    GitStatus { branch, dirty }
}

#[cfg(test)]
#[path = "tests/gitstatus_tests.rs"]
mod tests;
