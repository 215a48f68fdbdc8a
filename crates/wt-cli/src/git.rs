//! Git integration for committing ledger updates.
//!
//! Invokes the `git` binary in the data directory; the ledger repo is
//! expected to already be initialized there.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Stages `file` and commits it with `message` in `repo_dir`.
pub fn commit(repo_dir: &Path, file: &Path, message: &str) -> Result<()> {
    let file_arg = file.to_string_lossy();
    run_git(repo_dir, &["add", file_arg.as_ref()])?;
    run_git(repo_dir, &["commit", "-m", message])
}

/// Pushes the current branch to `origin`.
pub fn push(repo_dir: &Path) -> Result<()> {
    run_git(repo_dir, &["push", "origin", "HEAD"])
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<()> {
    tracing::debug!(dir = %repo_dir.display(), ?args, "running git");
    let status = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .status()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;
    if !status.success() {
        bail!("git {} exited with {status}", args.join(" "));
    }
    Ok(())
}
