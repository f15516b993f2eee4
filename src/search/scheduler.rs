//! Bounded-parallelism trial execution.
//!
//! Trials within a batch are mutually independent: each candidate is an
//! owned specification, so workers share nothing but the oracle reference.
//! Outcome order is unspecified; the reducer's fold does not depend on it.

use crate::bundle::{CapabilitySets, WorkloadSpec};
use crate::oracle::TrialOracle;
use std::thread;

/// Result of one trial, attributable to the configuration it was given.
/// Never mutated after creation.
#[derive(Clone, Debug)]
pub struct TrialOutcome {
    pub success: bool,
    pub capabilities: CapabilitySets,
}

pub struct TrialScheduler<'a> {
    oracle: &'a dyn TrialOracle,
    parallelism: usize,
}

impl<'a> TrialScheduler<'a> {
    pub fn new(oracle: &'a dyn TrialOracle, parallelism: usize) -> Self {
        Self {
            oracle,
            parallelism: parallelism.max(1),
        }
    }

    /// Run every candidate through the oracle, with at most `parallelism`
    /// trials in flight. Returns one outcome per candidate.
    pub fn run_batch(&self, candidates: Vec<WorkloadSpec>) -> Vec<TrialOutcome> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let expected = candidates.len();
        let workers = self.parallelism.min(expected);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<WorkloadSpec>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<TrialOutcome>();

        for candidate in candidates {
            // The receiver outlives this loop; send cannot fail here.
            let _ = job_tx.send(candidate);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let outcome_tx = outcome_tx.clone();
                scope.spawn(move || {
                    while let Ok(spec) = job_rx.recv() {
                        let capabilities = spec.capability_sets();
                        let success = self.oracle.execute(&spec);
                        let _ = outcome_tx.send(TrialOutcome {
                            success,
                            capabilities,
                        });
                    }
                });
            }
        });
        drop(outcome_tx);

        let outcomes: Vec<TrialOutcome> = outcome_rx.iter().collect();
        debug_assert_eq!(outcomes.len(), expected);
        outcomes
    }
}
