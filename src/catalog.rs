//! The reserved-signal catalog: which control signals exist, which slot
//! each one owns, and what its default value is.
//!
//! The catalog is fixed at construction and never mutated. Lookups are
//! linear scans over thirteen entries, which beats a hash map at this size.

use crate::types::{Signal, SignalKind};

/// Number of reserved control-signal slots at the front of the bank (K).
pub const LTN_SLOT_COUNT: u32 = 13;

/// Total number of slots in the bank (N).
pub const ITEM_SLOT_COUNT: u32 = 27;

/// Number of free-range slots available to user signals.
pub const FREE_SLOT_COUNT: u32 = ITEM_SLOT_COUNT - LTN_SLOT_COUNT;

// Reserved control-signal names. Every name owns exactly one slot in 1..=K.
pub const DEPOT: &str = "ltn-depot";
pub const DEPOT_PRIORITY: &str = "ltn-depot-priority";
pub const NETWORK_ID: &str = "ltn-network-id";
pub const MIN_TRAIN_LENGTH: &str = "ltn-min-train-length";
pub const MAX_TRAIN_LENGTH: &str = "ltn-max-train-length";
pub const PROVIDER_THRESHOLD: &str = "ltn-provider-threshold";
pub const PROVIDER_STACK_THRESHOLD: &str = "ltn-provider-stack-threshold";
pub const PROVIDER_PRIORITY: &str = "ltn-provider-priority";
pub const REQUESTER_THRESHOLD: &str = "ltn-requester-threshold";
pub const REQUESTER_STACK_THRESHOLD: &str = "ltn-requester-stack-threshold";
pub const REQUESTER_PRIORITY: &str = "ltn-requester-priority";
pub const LOCKED_SLOTS: &str = "ltn-locked-slots";
pub const DISABLE_WARNINGS: &str = "ltn-disable-warnings";

/// One catalog row: a reserved name, its owned slot, and its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    /// 1-based slot inside the reserved range.
    pub slot: u32,
    /// Value an absent signal reads as. Network-id defaults to -1
    /// ("all networks"); everything else to 0.
    pub default: i32,
}

/// The static reserved-signal table: a total, unique name → {slot, default}
/// mapping over the reserved range.
#[derive(Debug, Clone)]
pub struct SignalCatalog {
    entries: Vec<CatalogEntry>,
}

impl SignalCatalog {
    /// The standard LTN control-signal catalog.
    pub fn ltn() -> Self {
        Self {
            entries: vec![
                CatalogEntry { name: DEPOT, slot: 1, default: 0 },
                CatalogEntry { name: DEPOT_PRIORITY, slot: 2, default: 0 },
                CatalogEntry { name: NETWORK_ID, slot: 3, default: -1 },
                CatalogEntry { name: MIN_TRAIN_LENGTH, slot: 4, default: 0 },
                CatalogEntry { name: MAX_TRAIN_LENGTH, slot: 5, default: 0 },
                CatalogEntry { name: PROVIDER_THRESHOLD, slot: 6, default: 0 },
                CatalogEntry { name: PROVIDER_STACK_THRESHOLD, slot: 7, default: 0 },
                CatalogEntry { name: PROVIDER_PRIORITY, slot: 8, default: 0 },
                CatalogEntry { name: REQUESTER_THRESHOLD, slot: 9, default: 0 },
                CatalogEntry { name: REQUESTER_STACK_THRESHOLD, slot: 10, default: 0 },
                CatalogEntry { name: REQUESTER_PRIORITY, slot: 11, default: 0 },
                CatalogEntry { name: LOCKED_SLOTS, slot: 12, default: 0 },
                CatalogEntry { name: DISABLE_WARNINGS, slot: 13, default: 0 },
            ],
        }
    }

    /// Look up a catalog row by reserved name.
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up the catalog row for a signal, if it is a reserved signal.
    /// Only Virtual-kind signals can be reserved.
    pub fn lookup(&self, signal: &Signal) -> Option<&CatalogEntry> {
        if signal.kind != SignalKind::Virtual {
            return None;
        }
        self.entry(&signal.name)
    }

    /// Whether a name is in the catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// The reserved name owning a given slot, if any.
    pub fn name_at(&self, slot: u32) -> Option<&'static str> {
        self.entries.iter().find(|e| e.slot == slot).map(|e| e.name)
    }

    /// All catalog rows, in slot order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl Default for SignalCatalog {
    fn default() -> Self {
        Self::ltn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_total_and_unique() {
        let catalog = SignalCatalog::ltn();
        assert_eq!(catalog.entries().len(), LTN_SLOT_COUNT as usize);
        // Every reserved slot maps to exactly one name.
        for slot in 1..=LTN_SLOT_COUNT {
            let name = catalog.name_at(slot).expect("slot owned by a name");
            assert_eq!(catalog.entry(name).unwrap().slot, slot);
        }
        // No name appears twice.
        for entry in catalog.entries() {
            let count = catalog
                .entries()
                .iter()
                .filter(|e| e.name == entry.name)
                .count();
            assert_eq!(count, 1, "{} appears {} times", entry.name, count);
        }
    }

    #[test]
    fn lookup_requires_virtual_kind() {
        let catalog = SignalCatalog::ltn();
        assert!(catalog.lookup(&Signal::virt(DEPOT)).is_some());
        // Same name, wrong namespace: not a reserved signal.
        assert!(catalog.lookup(&Signal::item(DEPOT)).is_none());
        assert!(catalog.lookup(&Signal::virt("iron-plate")).is_none());
    }

    #[test]
    fn network_id_defaults_to_all_networks() {
        let catalog = SignalCatalog::ltn();
        assert_eq!(catalog.entry(NETWORK_ID).unwrap().default, -1);
        assert_eq!(catalog.entry(DEPOT).unwrap().default, 0);
    }

    #[test]
    fn geometry_constants_are_consistent() {
        assert!(LTN_SLOT_COUNT < ITEM_SLOT_COUNT);
        assert_eq!(FREE_SLOT_COUNT, ITEM_SLOT_COUNT - LTN_SLOT_COUNT);
    }
}
