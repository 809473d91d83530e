//! Bank normalization: default-stripping and slot re-sorting.
//!
//! Runs once per refresh, before classification. Two phases over a slot
//! snapshot: a pure scan that decides what to do, then an apply step that
//! does it. Nothing here touches the port — the facade snapshots all N
//! slots, normalizes the snapshot, and writes back the diff.

use crate::catalog::{
    self, SignalCatalog, CatalogEntry, ITEM_SLOT_COUNT, LTN_SLOT_COUNT,
};
use crate::types::{CombinatorConfig, SlotEntry};

/// What a normalization pass did to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizeOutcome {
    /// Reserved slots cleared because they held a default/zero value.
    pub stripped: usize,
    /// Whether a full re-sort was performed.
    pub sorted: bool,
    /// Signals lost to capacity exhaustion during the re-sort.
    pub dropped: usize,
}

impl NormalizeOutcome {
    /// Whether the pass changed the snapshot at all.
    pub fn changed(&self) -> bool {
        self.stripped > 0 || self.sorted
    }
}

/// Scan result: the decision, without any mutation yet.
struct ScanReport {
    needs_sort: bool,
    /// 0-based snapshot indices to clear in place.
    strip: Vec<usize>,
}

/// Normalize a full-bank snapshot in place.
///
/// `slots[i]` is bank slot `i + 1`; the slice must cover all N slots.
/// After this returns, every reserved signal present sits at its catalog
/// slot, the free range is compacted from K+1 with no gaps, and reserved
/// signals at their default/zero value are gone (threshold and network-id
/// exceptions aside).
pub fn normalize(
    slots: &mut [Option<SlotEntry>],
    catalog: &SignalCatalog,
    config: &CombinatorConfig,
) -> NormalizeOutcome {
    debug_assert_eq!(slots.len(), ITEM_SLOT_COUNT as usize);

    let report = scan(slots, catalog, config);
    let mut outcome = NormalizeOutcome {
        stripped: report.strip.len(),
        ..NormalizeOutcome::default()
    };

    // Default-stripping happens whether or not a sort follows.
    for &idx in &report.strip {
        slots[idx] = None;
    }

    if report.needs_sort {
        outcome.sorted = true;
        outcome.dropped = resort(slots, catalog);
        log::debug!(
            "bank re-sorted: {} stripped, {} dropped",
            outcome.stripped,
            outcome.dropped
        );
    } else if outcome.stripped > 0 {
        log::debug!("stripped {} defaulted reserved signals", outcome.stripped);
    }

    outcome
}

/// Phase one: walk the snapshot and decide, without mutating.
fn scan(
    slots: &[Option<SlotEntry>],
    catalog: &SignalCatalog,
    config: &CombinatorConfig,
) -> ScanReport {
    let mut report = ScanReport {
        needs_sort: false,
        strip: Vec::new(),
    };

    for idx in 0..LTN_SLOT_COUNT as usize {
        let Some(entry) = &slots[idx] else { continue };
        match catalog.lookup(&entry.signal) {
            Some(cat) => {
                if cat.slot as usize != idx + 1 {
                    report.needs_sort = true;
                }
                if strippable(cat, entry.count, config) {
                    report.strip.push(idx);
                }
            }
            // A foreign signal has leaked into reserved territory.
            None => report.needs_sort = true,
        }
    }

    // A reserved signal in the free range is garbage. Strippable ones are
    // cleared outright (stripping, not relocating, keeps a single pass
    // idempotent); either way a sort follows, to send survivors home and
    // close the gap the strip leaves behind.
    for (idx, slot) in slots.iter().enumerate().skip(LTN_SLOT_COUNT as usize) {
        let Some(entry) = slot else { continue };
        if let Some(cat) = catalog.lookup(&entry.signal) {
            if strippable(cat, entry.count, config) {
                report.strip.push(idx);
            }
            report.needs_sort = true;
        }
    }

    report
}

/// Whether a reserved signal at this count is redundant and removable.
///
/// Absent reserved signals read as their default, so defaulted/zeroed
/// entries only waste slots — except the two thresholds and (behind the
/// host flag) network-id, whose presence means something distinct from
/// absence even at value 0.
fn strippable(cat: &CatalogEntry, count: i32, config: &CombinatorConfig) -> bool {
    match cat.name {
        catalog::REQUESTER_THRESHOLD | catalog::PROVIDER_THRESHOLD => false,
        catalog::NETWORK_ID if config.emit_default_network_id => false,
        _ => count == cat.default || count == 0,
    }
}

/// Phase two, sort branch: snapshot every occupied slot in order, clear the
/// bank, and replay. Reserved signals land on their catalog slot (last
/// writer wins); everything else is appended to the free range. Returns the
/// number of signals dropped because the free range ran out.
fn resort(slots: &mut [Option<SlotEntry>], catalog: &SignalCatalog) -> usize {
    let survivors: Vec<SlotEntry> = slots.iter_mut().filter_map(Option::take).collect();

    let mut cursor = LTN_SLOT_COUNT as usize;
    let mut dropped = 0usize;
    for entry in survivors {
        match catalog.lookup(&entry.signal) {
            Some(cat) => slots[(cat.slot - 1) as usize] = Some(entry),
            None if cursor < slots.len() => {
                slots[cursor] = Some(entry);
                cursor += 1;
            }
            // Capacity exhausted: fixed device size, documented data loss.
            None => dropped += 1,
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        DEPOT, FREE_SLOT_COUNT, NETWORK_ID, PROVIDER_THRESHOLD, REQUESTER_THRESHOLD,
    };
    use crate::types::Signal;

    fn empty_bank() -> Vec<Option<SlotEntry>> {
        vec![None; ITEM_SLOT_COUNT as usize]
    }

    fn virt(name: &str, count: i32) -> Option<SlotEntry> {
        Some(SlotEntry::new(Signal::virt(name), count))
    }

    fn item(name: &str, count: i32) -> Option<SlotEntry> {
        Some(SlotEntry::new(Signal::item(name), count))
    }

    #[test]
    fn empty_bank_is_untouched() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(!outcome.changed());
        assert!(slots.iter().all(Option::is_none));
    }

    #[test]
    fn strips_defaulted_reserved_signals() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[0] = virt(DEPOT, 0); // catalog slot, default value
        let outcome = normalize(&mut slots, &catalog, &config);
        assert_eq!(outcome.stripped, 1);
        assert!(!outcome.sorted);
        assert!(slots[0].is_none());
    }

    #[test]
    fn strips_network_id_at_default_and_zero() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        for count in [-1, 0] {
            let mut slots = empty_bank();
            slots[2] = virt(NETWORK_ID, count);
            normalize(&mut slots, &catalog, &config);
            assert!(slots[2].is_none(), "network-id at {} should strip", count);
        }
        // Nonzero, non-default value survives.
        let mut slots = empty_bank();
        slots[2] = virt(NETWORK_ID, 3);
        normalize(&mut slots, &catalog, &config);
        assert_eq!(slots[2], virt(NETWORK_ID, 3));
    }

    #[test]
    fn emit_flag_protects_network_id() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig {
            emit_default_network_id: true,
            ..CombinatorConfig::default()
        };
        let mut slots = empty_bank();
        slots[2] = virt(NETWORK_ID, -1);
        normalize(&mut slots, &catalog, &config);
        assert_eq!(slots[2], virt(NETWORK_ID, -1));
    }

    #[test]
    fn thresholds_survive_at_zero() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[5] = virt(PROVIDER_THRESHOLD, 0);
        slots[8] = virt(REQUESTER_THRESHOLD, 0);
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(!outcome.changed());
        assert_eq!(slots[5], virt(PROVIDER_THRESHOLD, 0));
        assert_eq!(slots[8], virt(REQUESTER_THRESHOLD, 0));
    }

    #[test]
    fn misplaced_reserved_signal_triggers_sort() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[4] = virt(DEPOT, 7); // depot belongs at slot 1
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(outcome.sorted);
        assert_eq!(slots[0], virt(DEPOT, 7));
        assert!(slots[4].is_none());
    }

    #[test]
    fn foreign_signal_in_reserved_range_moves_to_free_range() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[2] = item("iron-plate", 100); // inside the reserved range
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(outcome.sorted);
        assert!(slots[2].is_none());
        assert_eq!(slots[LTN_SLOT_COUNT as usize], item("iron-plate", 100));
    }

    #[test]
    fn reserved_signal_in_free_range_returns_home() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[20] = virt(REQUESTER_THRESHOLD, 5);
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(outcome.sorted);
        assert!(slots[20].is_none());
        assert_eq!(slots[8], virt(REQUESTER_THRESHOLD, 5));
    }

    #[test]
    fn duplicate_reserved_signals_last_writer_wins() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[0] = virt(DEPOT, 1);
        slots[15] = virt(DEPOT, 9); // duplicate leaked into the free range
        normalize(&mut slots, &catalog, &config);
        assert_eq!(slots[0], virt(DEPOT, 9));
        assert!(slots[15].is_none());
    }

    #[test]
    fn sort_compacts_free_range_gaps() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        let k = LTN_SLOT_COUNT as usize;
        slots[k + 2] = item("iron-plate", 1);
        slots[k + 7] = item("copper-plate", 2);
        // Something in the reserved range forces the sort.
        slots[1] = item("steel-plate", 3);
        normalize(&mut slots, &catalog, &config);
        assert_eq!(slots[k], item("steel-plate", 3));
        assert_eq!(slots[k + 1], item("iron-plate", 1));
        assert_eq!(slots[k + 2], item("copper-plate", 2));
        assert!(slots[k + 3..].iter().all(Option::is_none));
    }

    #[test]
    fn capacity_exhaustion_drops_silently() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        let k = LTN_SLOT_COUNT as usize;
        // Fill the whole free range, then force one more in via the
        // reserved range.
        for i in 0..FREE_SLOT_COUNT as usize {
            slots[k + i] = item(&format!("item-{}", i), 1);
        }
        slots[0] = item("overflow", 99);
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(outcome.sorted);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(
            slots[k..].iter().filter(|s| s.is_some()).count(),
            FREE_SLOT_COUNT as usize
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let catalog = SignalCatalog::ltn();
        let config = CombinatorConfig::default();
        let mut slots = empty_bank();
        slots[2] = item("iron-plate", 100);
        slots[9] = virt(REQUESTER_THRESHOLD, 5);
        slots[20] = virt(DEPOT, 0);
        normalize(&mut slots, &catalog, &config);
        let first = slots.clone();
        let outcome = normalize(&mut slots, &catalog, &config);
        assert!(!outcome.changed());
        assert_eq!(slots, first);
    }
}
