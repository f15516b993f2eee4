/// Shared types and error definitions for the mincaps crate
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Settings consumed by the probing engine.
#[derive(Clone, Debug)]
pub struct ProbeSettings {
    /// OCI runtime binary used to run trials.
    pub runtime: PathBuf,
    /// Maximum number of trials in flight at once (1 = sequential).
    pub parallelism: usize,
    /// Test program bind-mounted into the container and run as its entry point.
    pub test_executable: PathBuf,
}

impl ProbeSettings {
    /// Validate the settings before any trial is launched.
    /// The test program must exist on the host and be executable.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(MincapsError::Config(
                "parallelism must be at least 1".to_string(),
            ));
        }

        if !self.test_executable.is_file() {
            return Err(MincapsError::Config(format!(
                "test program {} does not exist or is not a regular file",
                self.test_executable.display()
            )));
        }

        if let Err(err) = nix::unistd::access(
            self.test_executable.as_path(),
            nix::unistd::AccessFlags::X_OK,
        ) {
            return Err(MincapsError::Config(format!(
                "test program {} is not executable: {}",
                self.test_executable.display(),
                err
            )));
        }

        Ok(())
    }

    /// Staging root scoped by effective UID.
    /// Prevents root and non-root runs from colliding on shared `/tmp/mincaps`.
    pub fn staging_root_dir() -> PathBuf {
        let euid = unsafe { libc::geteuid() };
        std::env::temp_dir().join(format!("mincaps-uid-{}", euid))
    }
}

/// Resolve a path to its canonical absolute form, keeping the path in the
/// error message.
pub fn canonicalize_with_context(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|err| {
        MincapsError::Bundle(format!("cannot resolve {}: {}", path.display(), err))
    })
}

pub type Result<T> = std::result::Result<T, MincapsError>;

#[derive(Error, Debug)]
pub enum MincapsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bundle error: {0}")]
    Bundle(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Capability catalog invariant violated: {0}")]
    Invariant(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_parallelism_is_rejected() {
        let settings = ProbeSettings {
            runtime: PathBuf::from("crun"),
            parallelism: 0,
            test_executable: PathBuf::from("/bin/true"),
        };

        let err = settings.validate().unwrap_err();
        assert!(matches!(err, MincapsError::Config(_)));
    }

    #[test]
    fn missing_test_program_is_rejected() {
        let settings = ProbeSettings {
            runtime: PathBuf::from("crun"),
            parallelism: 4,
            test_executable: PathBuf::from("/does/not/exist"),
        };

        let err = settings.validate().unwrap_err();
        assert!(matches!(err, MincapsError::Config(_)));
    }

    #[test]
    fn executable_test_program_passes() {
        let settings = ProbeSettings {
            runtime: PathBuf::from("crun"),
            parallelism: 4,
            test_executable: PathBuf::from("/bin/sh"),
        };

        assert!(settings.validate().is_ok());
    }

    #[test]
    fn staging_root_is_uid_scoped() {
        let root = ProbeSettings::staging_root_dir();
        let name = root.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("mincaps-uid-"));
    }
}
