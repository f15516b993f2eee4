// Capability catalog shared by candidate generation and reduction.
// The list is fixed for the lifetime of a run; every probed configuration
// must stay within it.

use std::fmt;

/// All capability names the prober knows about, in kernel numbering order.
pub const ALL_CAPABILITIES: &[&str] = &[
    "CAP_CHOWN",
    "CAP_DAC_OVERRIDE",
    "CAP_DAC_READ_SEARCH",
    "CAP_FOWNER",
    "CAP_FSETID",
    "CAP_KILL",
    "CAP_SETGID",
    "CAP_SETUID",
    "CAP_SETPCAP",
    "CAP_LINUX_IMMUTABLE",
    "CAP_NET_BIND_SERVICE",
    "CAP_NET_BROADCAST",
    "CAP_NET_ADMIN",
    "CAP_NET_RAW",
    "CAP_IPC_LOCK",
    "CAP_IPC_OWNER",
    "CAP_SYS_MODULE",
    "CAP_SYS_RAWIO",
    "CAP_SYS_CHROOT",
    "CAP_SYS_PTRACE",
    "CAP_SYS_PACCT",
    "CAP_SYS_ADMIN",
    "CAP_SYS_BOOT",
    "CAP_SYS_NICE",
    "CAP_SYS_RESOURCE",
    "CAP_SYS_TIME",
    "CAP_SYS_TTY_CONFIG",
    "CAP_MKNOD",
    "CAP_LEASE",
    "CAP_AUDIT_WRITE",
    "CAP_AUDIT_CONTROL",
    "CAP_SETFCAP",
    "CAP_MAC_OVERRIDE",
    "CAP_MAC_ADMIN",
    "CAP_SYSLOG",
    "CAP_WAKE_ALARM",
    "CAP_BLOCK_SUSPEND",
    "CAP_AUDIT_READ",
];

/// The five capability set kinds of an OCI process specification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilitySetKind {
    /// Bounding set - limits capabilities that can be gained
    Bounding,
    /// Effective set - currently active capabilities
    Effective,
    /// Permitted set - capabilities that can be made effective
    Permitted,
    /// Ambient set - capabilities inherited across execve
    Ambient,
    /// Inheritable set - capabilities preserved across execve
    Inheritable,
}

impl CapabilitySetKind {
    /// Iteration order for per-kind probe rounds and for output.
    pub const ALL: [CapabilitySetKind; 5] = [
        CapabilitySetKind::Bounding,
        CapabilitySetKind::Effective,
        CapabilitySetKind::Permitted,
        CapabilitySetKind::Ambient,
        CapabilitySetKind::Inheritable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bounding => "bounding",
            Self::Effective => "effective",
            Self::Permitted => "permitted",
            Self::Ambient => "ambient",
            Self::Inheritable => "inheritable",
        }
    }
}

impl fmt::Display for CapabilitySetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog membership check used to validate generated candidates.
pub fn is_known_capability(name: &str) -> bool {
    ALL_CAPABILITIES.contains(&name)
}
