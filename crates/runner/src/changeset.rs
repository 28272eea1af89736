//! Change-set resolution via git.
//!
//! Lists the file paths touched by a single revision relative to its
//! parent, in the diff's native order. Paths may include files deleted in
//! that revision; the orchestrator re-checks existence before processing.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Failure to resolve the change set. Always fatal for the whole run:
/// nothing has been registered yet when this can occur.
#[derive(Debug, Error)]
pub enum ChangesetError {
    #[error("failed to run git: {0}")]
    Launch(#[from] std::io::Error),

    #[error("git diff-tree failed for revision {revision}: {detail}")]
    Failed { revision: String, detail: String },
}

/// Paths changed in `revision`, as reported by
/// `git diff-tree --no-commit-id --name-only -r`.
pub fn resolve_changes(repo_root: &Path, revision: &str) -> Result<Vec<String>, ChangesetError> {
    let output = Command::new("git")
        .arg("diff-tree")
        .arg("--no-commit-id")
        .arg("--name-only")
        .arg("-r")
        .arg(revision)
        .current_dir(repo_root)
        .output()?;

    if !output.status.success() {
        return Err(ChangesetError::Failed {
            revision: revision.to_string(),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(parse_name_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Split diff output into paths, dropping blank lines, preserving order.
fn parse_name_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
