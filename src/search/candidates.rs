//! Leave-one-out candidate generation.
//!
//! Both modes produce one candidate per capability in the probed list, each
//! omitting exactly that capability. An empty list yields no candidates;
//! the driver treats that as already minimal.

use crate::bundle::{CapabilitySets, WorkloadSpec};
use crate::catalog::CapabilitySetKind;
use std::collections::BTreeSet;

/// Joint-round candidates: all five set kinds simultaneously hold
/// `caps \ {c}` for each capability `c`.
pub fn uniform(base: &WorkloadSpec, caps: &BTreeSet<String>) -> Vec<WorkloadSpec> {
    leave_one_out(caps)
        .map(|subset| base.with_capabilities(CapabilitySets::uniform(&subset)))
        .collect()
}

/// Per-kind candidates: equal to `baseline` except that `kind`'s set is
/// `baseline[kind] \ {c}` for each capability `c` in that set.
pub fn for_kind(
    base: &WorkloadSpec,
    baseline: &CapabilitySets,
    kind: CapabilitySetKind,
) -> Vec<WorkloadSpec> {
    leave_one_out(baseline.get(kind))
        .map(|subset| {
            let mut sets = baseline.clone();
            sets.set(kind, subset);
            base.with_capabilities(sets)
        })
        .collect()
}

fn leave_one_out(caps: &BTreeSet<String>) -> impl Iterator<Item = BTreeSet<String>> + '_ {
    caps.iter()
        .map(move |omitted| caps.iter().filter(|cap| *cap != omitted).cloned().collect())
}
