//! mincaps: discover the smallest set of Linux capabilities an OCI workload
//! needs to run a test program successfully.
//!
//! The search repeatedly re-runs the workload under shrinking capability
//! configurations and observes pass/fail:
//!
//! - [`catalog`]: the fixed capability catalog and the five set kinds
//! - [`bundle`]: OCI bundle loading and the workload specification model
//! - [`oracle`]: one-trial pass/fail execution against the sandbox runtime
//! - [`search`]: candidate generation, the concurrent trial scheduler, the
//!   intersection reducer, and the two-phase minimization driver
//! - [`config`]: run settings and shared error types
//! - [`cli`]: command-line entry point shared by the `mincaps` binary
//!
//! The search is a greedy single-removal probe: each round runs "remove
//! exactly one capability" variants and keeps only capabilities present in
//! every successful trial. Capabilities that are only jointly removable are
//! not detected.

pub mod bundle;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod oracle;
pub mod search;

// Re-export commonly used types for convenience
pub use config::types::*;
