//! Two-phase minimization: one joint round over all five set kinds, then
//! one round per kind against the already-narrowed baseline.
//!
//! Rounds are strictly sequential because each round's candidates derive
//! from the previous round's reduced baseline. Every round runs exactly
//! once; the search performs at most `1 + 5` batches.

use crate::bundle::{CapabilitySets, WorkloadSpec};
use crate::catalog::{self, CapabilitySetKind};
use crate::config::types::Result;
use crate::oracle::TrialOracle;
use crate::search::candidates;
use crate::search::reduce::reduce;
use crate::search::scheduler::TrialScheduler;
use std::collections::BTreeSet;

/// Discover the minimal capability sets `base` needs to pass its test
/// program, starting from the full catalog for every kind.
pub fn minimize(
    base: &WorkloadSpec,
    oracle: &dyn TrialOracle,
    parallelism: usize,
) -> Result<CapabilitySets> {
    let scheduler = TrialScheduler::new(oracle, parallelism);

    let full: BTreeSet<String> = catalog::ALL_CAPABILITIES
        .iter()
        .map(|cap| (*cap).to_string())
        .collect();
    let baseline = CapabilitySets::uniform(&full);

    let batch = candidates::uniform(base, &full);
    let (mut baseline, joint_successes) = run_round(&scheduler, "joint", &baseline, batch)?;

    if joint_successes == 0 {
        log::warn!(
            "no trial succeeded in the joint round; the capability set cannot be narrowed"
        );
    }

    if baseline.all_empty() {
        log::info!("workload needs no capabilities; skipping per-kind rounds");
        return Ok(baseline);
    }

    for kind in CapabilitySetKind::ALL {
        if baseline.get(kind).is_empty() {
            // Already minimal for this kind; nothing to probe.
            continue;
        }

        let probe_base = base.with_capabilities(baseline.clone());
        let batch = candidates::for_kind(&probe_base, &baseline, kind);
        let (narrowed, _) = run_round(&scheduler, kind.as_str(), &baseline, batch)?;
        baseline = narrowed;
    }

    Ok(baseline)
}

/// Run one batch and fold its outcomes into the baseline. Returns the
/// narrowed baseline and the number of successful trials.
fn run_round(
    scheduler: &TrialScheduler,
    label: &str,
    baseline: &CapabilitySets,
    batch: Vec<WorkloadSpec>,
) -> Result<(CapabilitySets, usize)> {
    for candidate in &batch {
        candidate.capability_sets().ensure_catalog_members()?;
    }

    log::info!("{} round: running {} trials", label, batch.len());
    let outcomes = scheduler.run_batch(batch);
    let successes = outcomes.iter().filter(|outcome| outcome.success).count();
    log::info!(
        "{} round: {} of {} trials succeeded",
        label,
        successes,
        outcomes.len()
    );

    Ok((reduce(baseline, &outcomes), successes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn base_spec() -> WorkloadSpec {
        serde_json::from_value(json!({
            "process": {"args": ["/usr/bin/test-script"]},
            "root": {"path": "/tmp/rootfs"}
        }))
        .unwrap()
    }

    /// Succeeds iff no kind's set contains the forbidden capability.
    struct ForbiddenCapOracle {
        forbidden: &'static str,
        calls: AtomicUsize,
    }

    impl ForbiddenCapOracle {
        fn new(forbidden: &'static str) -> Self {
            Self {
                forbidden,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TrialOracle for ForbiddenCapOracle {
        fn execute(&self, spec: &WorkloadSpec) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let sets = spec.capability_sets();
            CapabilitySetKind::ALL
                .iter()
                .all(|kind| !sets.get(*kind).contains(self.forbidden))
        }
    }

    /// Succeeds unconditionally.
    struct AlwaysPassOracle {
        calls: AtomicUsize,
    }

    impl TrialOracle for AlwaysPassOracle {
        fn execute(&self, _spec: &WorkloadSpec) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    /// Fails unconditionally.
    struct AlwaysFailOracle;

    impl TrialOracle for AlwaysFailOracle {
        fn execute(&self, _spec: &WorkloadSpec) -> bool {
            false
        }
    }

    #[test]
    fn jointly_unnecessary_capabilities_all_get_dropped() {
        // Only the joint-round trial omitting the forbidden capability
        // succeeds, narrowing every kind to "catalog minus forbidden".
        // Each per-kind round then finds every remaining capability
        // individually removable.
        let oracle = ForbiddenCapOracle::new("CAP_SYS_ADMIN");
        let minimal = minimize(&base_spec(), &oracle, 4).unwrap();
        assert!(minimal.all_empty());
    }

    #[test]
    fn always_passing_workload_short_circuits_after_joint_round() {
        let oracle = AlwaysPassOracle {
            calls: AtomicUsize::new(0),
        };
        let minimal = minimize(&base_spec(), &oracle, 4).unwrap();

        assert!(minimal.all_empty());
        // One trial per catalog entry, and not a single per-kind probe.
        assert_eq!(
            oracle.calls.load(Ordering::SeqCst),
            catalog::ALL_CAPABILITIES.len()
        );
    }

    #[test]
    fn all_failures_degrade_to_the_full_catalog() {
        let minimal = minimize(&base_spec(), &AlwaysFailOracle, 2).unwrap();
        assert_eq!(minimal, CapabilitySets::full_catalog());
    }

    #[test]
    fn search_runs_exactly_six_rounds_when_nothing_short_circuits() {
        // Every trial fails, so no round shrinks anything and all five
        // per-kind rounds probe the full catalog.
        struct CountingFailOracle {
            calls: AtomicUsize,
        }
        impl TrialOracle for CountingFailOracle {
            fn execute(&self, _spec: &WorkloadSpec) -> bool {
                self.calls.fetch_add(1, Ordering::SeqCst);
                false
            }
        }

        let oracle = CountingFailOracle {
            calls: AtomicUsize::new(0),
        };
        minimize(&base_spec(), &oracle, 8).unwrap();
        assert_eq!(
            oracle.calls.load(Ordering::SeqCst),
            catalog::ALL_CAPABILITIES.len() * 6
        );
    }
}
