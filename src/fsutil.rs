use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Replaces `path` through a temp file and rename. An existing file keeps
/// its permission bits.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let existing = fs::metadata(path).ok().map(|m| m.permissions());
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    if let Some(perms) = existing {
        fs::set_permissions(&tmp, perms)
            .with_context(|| format!("set permissions {}", tmp.display()))?;
    }
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

/// Recursively copies `src` into `dst`, carrying permission bits along.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).with_context(|| format!("stat {}", src.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("{} is not a directory", src.display());
    }
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;

    for entry in fs::read_dir(src).with_context(|| format!("read dir {}", src.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", src.display()))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("file type {}", from.display()))?;
        if file_type.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            // fs::copy also copies the permission bits.
            fs::copy(&from, &to)
                .with_context(|| format!("copy {} -> {}", from.display(), to.display()))?;
        }
    }

    // After the children: the copied mode may deny writes.
    fs::set_permissions(dst, meta.permissions())
        .with_context(|| format!("set permissions {}", dst.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/fsutil_tests.rs"]
mod tests;
