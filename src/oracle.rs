//! Pass/fail oracle: one call runs the test program once inside a fresh
//! sandbox under a candidate capability configuration.
//!
//! The oracle is a noisy boolean function, not a throwing one: launch
//! failures, runtime crashes, and resource exhaustion all collapse to
//! `false` locally. A bad trial never aborts its batch.

use crate::bundle::WorkloadSpec;
use crate::config::types::{MincapsError, ProbeSettings, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use uuid::Uuid;

/// One trial against the sandboxed runtime.
pub trait TrialOracle: Sync {
    /// Whether the workload completed successfully under `spec`.
    fn execute(&self, spec: &WorkloadSpec) -> bool;
}

/// Oracle backed by an OCI runtime binary (`crun` by default).
///
/// Each call materializes a per-trial bundle directory holding the candidate
/// `config.json`, runs the workload under a fresh unique name, and tears
/// both down again whichever way the trial ends.
pub struct RuntimeOracle {
    runtime: PathBuf,
    staging_root: PathBuf,
}

impl RuntimeOracle {
    pub fn new(runtime: PathBuf) -> Self {
        Self {
            runtime,
            staging_root: ProbeSettings::staging_root_dir(),
        }
    }

    fn run_trial(&self, spec: &WorkloadSpec, name: &str) -> Result<bool> {
        let stage = TrialStage::create(&self.runtime, &self.staging_root, name)?;

        let rendered = serde_json::to_string(spec).map_err(|err| {
            MincapsError::Oracle(format!("cannot serialize trial config: {}", err))
        })?;
        fs::write(stage.dir().join("config.json"), rendered)?;

        let status = Command::new(&self.runtime)
            .arg("run")
            .arg("--bundle")
            .arg(stage.dir())
            .arg(name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| {
                MincapsError::Oracle(format!(
                    "cannot launch {}: {}",
                    self.runtime.display(),
                    err
                ))
            })?;

        log::debug!("trial {} exited with {}", name, status);
        Ok(status.success())
    }
}

impl TrialOracle for RuntimeOracle {
    fn execute(&self, spec: &WorkloadSpec) -> bool {
        let name = format!("mincaps-{}", Uuid::new_v4());
        match self.run_trial(spec, &name) {
            Ok(passed) => passed,
            Err(err) => {
                log::warn!("trial {} treated as failed: {}", name, err);
                false
            }
        }
    }
}

/// Per-trial bundle directory, torn down on drop.
///
/// The container name is unique per trial, so teardown can force-delete any
/// instance the runtime left behind without touching concurrent trials.
struct TrialStage {
    runtime: PathBuf,
    name: String,
    dir: PathBuf,
}

impl TrialStage {
    fn create(runtime: &Path, staging_root: &Path, name: &str) -> Result<Self> {
        let dir = staging_root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            runtime: runtime.to_path_buf(),
            name: name.to_string(),
            dir,
        })
    }

    fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for TrialStage {
    fn drop(&mut self) {
        // A trial that exited cleanly is already gone from the runtime's
        // view; force-delete only matters when the run path errored out.
        let _ = Command::new(&self.runtime)
            .arg("delete")
            .arg("--force")
            .arg(&self.name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        if let Err(err) = fs::remove_dir_all(&self.dir) {
            log::warn!(
                "failed to remove trial bundle {}: {}",
                self.dir.display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> WorkloadSpec {
        serde_json::from_value(json!({
            "process": {"args": ["/usr/bin/test-script"]},
            "root": {"path": "/tmp/rootfs"}
        }))
        .unwrap()
    }

    fn oracle_with(runtime: &str) -> RuntimeOracle {
        RuntimeOracle::new(PathBuf::from(runtime))
    }

    #[test]
    fn zero_exit_status_is_success() {
        assert!(oracle_with("/bin/true").execute(&spec()));
    }

    #[test]
    fn nonzero_exit_status_is_failure() {
        assert!(!oracle_with("/bin/false").execute(&spec()));
    }

    #[test]
    fn launch_error_is_failure_not_panic() {
        assert!(!oracle_with("/nonexistent/runtime").execute(&spec()));
    }

    #[test]
    fn stage_teardown_removes_bundle_dir() {
        let root = std::env::temp_dir().join(format!("mincaps-stage-{}", Uuid::new_v4()));
        let dir = {
            let stage = TrialStage::create(Path::new("/bin/true"), &root, "trial-a").unwrap();
            assert!(stage.dir().is_dir());
            stage.dir().to_path_buf()
        };
        assert!(!dir.exists());
        let _ = fs::remove_dir_all(&root);
    }
}
