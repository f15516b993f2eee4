//! Intersection aggregation of batch outcomes.
//!
//! A capability survives a round iff it was present in every successful
//! trial's set for that kind. Failed trials carry no information under the
//! single-removal approximation and are ignored entirely. The fold is
//! commutative and associative, so outcome order cannot affect the result.

use crate::bundle::CapabilitySets;
use crate::catalog::CapabilitySetKind;
use crate::search::scheduler::TrialOutcome;

pub fn reduce(original: &CapabilitySets, outcomes: &[TrialOutcome]) -> CapabilitySets {
    let mut narrowed = original.clone();
    for kind in CapabilitySetKind::ALL {
        let mut survivors = narrowed.get(kind).clone();
        for outcome in outcomes {
            if !outcome.success {
                continue;
            }
            survivors = survivors
                .intersection(outcome.capabilities.get(kind))
                .cloned()
                .collect();
        }
        narrowed.set(kind, survivors);
    }
    narrowed
}
