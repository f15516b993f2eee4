//! OCI bundle loading and the workload specification model.
//!
//! Only the fields the prober manipulates are modeled as typed structs;
//! everything else in `config.json` is carried through a flattened map so
//! the rewritten configuration stays a faithful superset of the input.

use crate::catalog::{self, CapabilitySetKind};
use crate::config::types::{canonicalize_with_context, MincapsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// In-container path the test program is bind-mounted to and invoked from.
pub const TEST_DESTINATION: &str = "/usr/bin/test-script";

/// Name of the rewritten configuration written next to the original.
pub const REDUCED_CONFIG_NAME: &str = "config.json.new";

/// One capability assignment across the five set kinds.
///
/// Sets are `BTreeSet`s: duplicates are impossible by construction and the
/// serialized lists come out in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySets {
    #[serde(default)]
    pub bounding: BTreeSet<String>,
    #[serde(default)]
    pub effective: BTreeSet<String>,
    #[serde(default)]
    pub permitted: BTreeSet<String>,
    #[serde(default)]
    pub ambient: BTreeSet<String>,
    #[serde(default)]
    pub inheritable: BTreeSet<String>,
}

impl CapabilitySets {
    /// Assignment where every kind holds the same capability list.
    pub fn uniform(caps: &BTreeSet<String>) -> Self {
        Self {
            bounding: caps.clone(),
            effective: caps.clone(),
            permitted: caps.clone(),
            ambient: caps.clone(),
            inheritable: caps.clone(),
        }
    }

    /// Assignment where every kind holds the full catalog.
    pub fn full_catalog() -> Self {
        let all: BTreeSet<String> = catalog::ALL_CAPABILITIES
            .iter()
            .map(|cap| (*cap).to_string())
            .collect();
        Self::uniform(&all)
    }

    pub fn get(&self, kind: CapabilitySetKind) -> &BTreeSet<String> {
        match kind {
            CapabilitySetKind::Bounding => &self.bounding,
            CapabilitySetKind::Effective => &self.effective,
            CapabilitySetKind::Permitted => &self.permitted,
            CapabilitySetKind::Ambient => &self.ambient,
            CapabilitySetKind::Inheritable => &self.inheritable,
        }
    }

    pub fn set(&mut self, kind: CapabilitySetKind, caps: BTreeSet<String>) {
        match kind {
            CapabilitySetKind::Bounding => self.bounding = caps,
            CapabilitySetKind::Effective => self.effective = caps,
            CapabilitySetKind::Permitted => self.permitted = caps,
            CapabilitySetKind::Ambient => self.ambient = caps,
            CapabilitySetKind::Inheritable => self.inheritable = caps,
        }
    }

    /// True when no kind holds any capability.
    pub fn all_empty(&self) -> bool {
        CapabilitySetKind::ALL
            .iter()
            .all(|kind| self.get(*kind).is_empty())
    }

    /// Every entry must be a catalog member. A violation means candidate
    /// generation is defective and the run must stop.
    pub fn ensure_catalog_members(&self) -> Result<()> {
        for kind in CapabilitySetKind::ALL {
            for cap in self.get(kind) {
                if !catalog::is_known_capability(cap) {
                    return Err(MincapsError::Invariant(format!(
                        "{} set references unknown capability {}",
                        kind, cap
                    )));
                }
            }
        }
        Ok(())
    }
}

/// OCI mount entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mount {
    pub destination: PathBuf,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Mount {
    /// Bind mount exposing the host-side test program inside the container.
    fn test_program(source: PathBuf) -> Self {
        Self {
            destination: PathBuf::from(TEST_DESTINATION),
            kind: Some("bind".to_string()),
            source: Some(source),
            options: vec![
                "nosuid".to_string(),
                "nodev".to_string(),
                "mode=777".to_string(),
            ],
            extra: Map::new(),
        }
    }
}

/// OCI process description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessSpec {
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySets>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// OCI root filesystem description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootSpec {
    pub path: PathBuf,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The workload's runtime specification (`config.json`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub process: ProcessSpec,
    pub root: RootSpec,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkloadSpec {
    /// Fresh copy of this specification with the capability mapping
    /// overwritten. Candidates never share capability state with the
    /// specification they were derived from.
    pub fn with_capabilities(&self, caps: CapabilitySets) -> Self {
        let mut spec = self.clone();
        spec.process.capabilities = Some(caps);
        spec
    }

    /// The capability assignment carried by this specification.
    pub fn capability_sets(&self) -> CapabilitySets {
        self.process.capabilities.clone().unwrap_or_default()
    }
}

/// An on-disk OCI bundle: the directory plus its parsed `config.json`.
///
/// The parsed specification is kept pristine; probing works on derived
/// copies and only [`Bundle::write_reduced`] merges the final capability
/// sets back in.
pub struct Bundle {
    dir: PathBuf,
    original: WorkloadSpec,
}

impl Bundle {
    pub fn load(dir: &Path) -> Result<Self> {
        let dir = canonicalize_with_context(dir)?;
        let config_path = dir.join("config.json");
        let raw = fs::read_to_string(&config_path).map_err(|err| {
            MincapsError::Bundle(format!("cannot read {}: {}", config_path.display(), err))
        })?;
        let original: WorkloadSpec = serde_json::from_str(&raw).map_err(|err| {
            MincapsError::Bundle(format!("cannot parse {}: {}", config_path.display(), err))
        })?;

        Ok(Self { dir, original })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn reduced_config_path(&self) -> PathBuf {
        self.dir.join(REDUCED_CONFIG_NAME)
    }

    /// Specification every trial candidate derives from: root path made
    /// absolute (trial bundles live elsewhere and share the rootfs), the
    /// test program bind-mounted in, and `args` rewritten to invoke it.
    pub fn probe_spec(&self, test_executable: &Path) -> Result<WorkloadSpec> {
        let rootfs = if self.original.root.path.is_absolute() {
            self.original.root.path.clone()
        } else {
            self.dir.join(&self.original.root.path)
        };
        let rootfs = canonicalize_with_context(&rootfs)?;
        let test_source = canonicalize_with_context(test_executable)?;

        let mut spec = self.original.clone();
        spec.root.path = rootfs;
        spec.mounts.push(Mount::test_program(test_source));
        spec.process.args = vec![TEST_DESTINATION.to_string()];
        Ok(spec)
    }

    /// Merge the final capability sets into the original specification and
    /// write it next to the input config. Refuses to overwrite an existing
    /// file unless `force` is set.
    pub fn write_reduced(&self, caps: &CapabilitySets, force: bool) -> Result<PathBuf> {
        let dest = self.reduced_config_path();
        if !force && dest.exists() {
            return Err(MincapsError::Bundle(format!(
                "{} already exists (use --force to overwrite)",
                dest.display()
            )));
        }

        let reduced = self.original.with_capabilities(caps.clone());
        let rendered = serde_json::to_string_pretty(&reduced).map_err(|err| {
            MincapsError::Bundle(format!("cannot serialize reduced config: {}", err))
        })?;
        fs::write(&dest, rendered + "\n")?;
        Ok(dest)
    }
}
