//! Mode classification: which operating role the reserved signals imply.
//!
//! Runs on a normalized snapshot, so every reserved signal is either absent
//! or sitting on its catalog slot. The result is a pure function of the
//! snapshot and the host config — same inputs, same mode.

use crate::catalog::{
    self, SignalCatalog, LTN_SLOT_COUNT,
};
use crate::types::{CombinatorConfig, Mode, SignalKind, SlotEntry};

/// Classify a normalized snapshot into a [`Mode`].
///
/// The decision tree, in order:
/// 1. Depot present (any value) → Depot. Nothing else is consulted.
/// 2. Otherwise start from Provider, the unconditional baseline.
/// 3. Requester when the high-threshold sentinel is armed, when any
///    requester-side control signal is present, or when the free range
///    carries an outstanding request (negative Item/Fluid count).
/// 4. Provider drops out when provider-threshold carries the sentinel.
pub fn classify(
    slots: &[Option<SlotEntry>],
    catalog: &SignalCatalog,
    config: &CombinatorConfig,
) -> Mode {
    if reserved_value(slots, catalog, catalog::DEPOT).is_some() {
        return Mode::Depot;
    }

    let provider_threshold = reserved_value(slots, catalog, catalog::PROVIDER_THRESHOLD);
    let sentinel_armed = config.high_provider_threshold
        && provider_threshold == Some(config.high_threshold_count);

    let requester = sentinel_armed
        || [
            catalog::REQUESTER_THRESHOLD,
            catalog::REQUESTER_STACK_THRESHOLD,
            catalog::REQUESTER_PRIORITY,
            catalog::DISABLE_WARNINGS,
        ]
        .into_iter()
        .any(|name| reserved_value(slots, catalog, name).is_some())
        || has_outstanding_requests(slots);

    // The sentinel means "not really a provider", flag or no flag.
    let provider = provider_threshold != Some(config.high_threshold_count);

    Mode::Operating {
        provider,
        requester,
    }
}

/// Read a reserved signal off its catalog slot. `None` when absent (or when
/// the slot holds something else, which a normalized snapshot never does).
fn reserved_value(
    slots: &[Option<SlotEntry>],
    catalog: &SignalCatalog,
    name: &str,
) -> Option<i32> {
    let cat = catalog.entry(name)?;
    let entry = slots[(cat.slot - 1) as usize].as_ref()?;
    if entry.signal.kind == SignalKind::Virtual && entry.signal.name == name {
        Some(entry.count)
    } else {
        None
    }
}

/// Request probe: any Item/Fluid signal in the free range with a strictly
/// negative count means the station is asking for deliveries.
fn has_outstanding_requests(slots: &[Option<SlotEntry>]) -> bool {
    slots
        .iter()
        .skip(LTN_SLOT_COUNT as usize)
        .flatten()
        .any(|entry| {
            matches!(entry.signal.kind, SignalKind::Item | SignalKind::Fluid)
                && entry.count < 0
        })
}
