//! Per-mode validation: reserved signals a mode does not allow are cleared.
//!
//! Validation only ever deletes — it never inserts or rewrites a value.
//! It runs on a normalized snapshot, after classification, and again after
//! every public mutation.

use crate::catalog::{self, SignalCatalog};
use crate::types::{Mode, SignalKind, SlotEntry};

/// Reserved signals a Depot keeps; everything else is cleared.
const DEPOT_KEEP: &[&str] = &[catalog::DEPOT, catalog::DEPOT_PRIORITY, catalog::NETWORK_ID];

/// Cleared when the station only requests: provider-side controls make no
/// sense, except provider-threshold, which may carry the high sentinel.
const REQUESTER_ONLY_CLEAR: &[&str] = &[
    catalog::PROVIDER_STACK_THRESHOLD,
    catalog::PROVIDER_PRIORITY,
    catalog::LOCKED_SLOTS,
    catalog::DEPOT,
    catalog::DEPOT_PRIORITY,
];

/// Cleared when the station only provides.
const PROVIDER_ONLY_CLEAR: &[&str] = &[
    catalog::REQUESTER_THRESHOLD,
    catalog::REQUESTER_STACK_THRESHOLD,
    catalog::REQUESTER_PRIORITY,
    catalog::DISABLE_WARNINGS,
    catalog::DEPOT,
    catalog::DEPOT_PRIORITY,
];

/// Cleared for Provider+Requester and for a dormant (None) station.
const OPERATING_CLEAR: &[&str] = &[catalog::DEPOT];

/// The reserved-signal names disallowed under a mode.
pub fn cleared_names(mode: Mode, catalog: &SignalCatalog) -> Vec<&'static str> {
    match mode {
        Mode::Depot => catalog
            .entries()
            .iter()
            .map(|e| e.name)
            .filter(|name| !DEPOT_KEEP.contains(name))
            .collect(),
        Mode::Operating {
            provider: false,
            requester: true,
        } => REQUESTER_ONLY_CLEAR.to_vec(),
        Mode::Operating {
            provider: true,
            requester: false,
        } => PROVIDER_ONLY_CLEAR.to_vec(),
        Mode::Operating { .. } => OPERATING_CLEAR.to_vec(),
    }
}

/// Clear every reserved signal the mode disallows. Returns how many slots
/// were cleared.
pub fn validate(
    slots: &mut [Option<SlotEntry>],
    catalog: &SignalCatalog,
    mode: Mode,
) -> usize {
    let mut cleared = 0;
    for name in cleared_names(mode, catalog) {
        let Some(cat) = catalog.entry(name) else { continue };
        let idx = (cat.slot - 1) as usize;
        let occupied_by_name = slots[idx]
            .as_ref()
            .is_some_and(|e| e.signal.kind == SignalKind::Virtual && e.signal.name == name);
        if occupied_by_name {
            slots[idx] = None;
            cleared += 1;
        }
    }
    if cleared > 0 {
        log::debug!("validator cleared {} reserved signals for {}", cleared, mode);
    }
    cleared
}
