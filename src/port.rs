//! The control-behavior port: the seam between this crate and the host's
//! live entity handle.
//!
//! The host owns the actual slot storage (the entity's control behavior);
//! everything here goes through [`ControlPort`]. Validity can change
//! between calls at arbitrary ticks, so every facade operation re-checks
//! `is_valid()` before touching a slot.

use crate::catalog::ITEM_SLOT_COUNT;
use crate::types::SlotEntry;

/// Name of the entity kind a [`crate::Combinator`] attaches to.
pub const COMBINATOR_ENTITY: &str = "ltn-combinator";

/// Host-provided entity/control-behavior handle.
///
/// Slot indices are 1-based over the whole bank (1..=N). Reads of empty or
/// out-of-range slots return `None`; writes outside the bank are ignored by
/// the implementation.
pub trait ControlPort {
    /// Whether the backing entity still exists.
    fn is_valid(&self) -> bool;

    /// The entity kind this handle points at (e.g. "ltn-combinator").
    fn entity_name(&self) -> &str;

    /// Read one slot. `None` means empty (or out of range).
    fn slot(&self, index: u32) -> Option<SlotEntry>;

    /// Write one slot. `None` clears it.
    fn set_slot(&mut self, index: u32, entry: Option<SlotEntry>);

    /// Whether the device's output is switched on.
    fn is_enabled(&self) -> bool;

    /// Switch the device's output on or off.
    fn set_enabled(&mut self, enabled: bool);
}

/// In-memory [`ControlPort`] for hosts without a live entity, and for tests.
///
/// Models entity destruction via [`MemoryPort::invalidate`]: once
/// invalidated, the port reports invalid forever, the way a destroyed
/// entity handle does.
#[derive(Debug, Clone)]
pub struct MemoryPort {
    slots: Vec<Option<SlotEntry>>,
    entity_name: String,
    valid: bool,
    enabled: bool,
}

impl MemoryPort {
    /// A valid, empty, enabled port with the standard bank geometry.
    pub fn new() -> Self {
        Self {
            slots: vec![None; ITEM_SLOT_COUNT as usize],
            entity_name: COMBINATOR_ENTITY.to_string(),
            valid: true,
            enabled: true,
        }
    }

    /// A port reporting a different entity kind (attachment must reject it).
    pub fn with_entity_name(name: impl Into<String>) -> Self {
        Self {
            entity_name: name.into(),
            ..Self::new()
        }
    }

    /// Simulate destruction of the backing entity.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

impl Default for MemoryPort {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlPort for MemoryPort {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn slot(&self, index: u32) -> Option<SlotEntry> {
        if index == 0 || index > ITEM_SLOT_COUNT {
            return None;
        }
        self.slots[(index - 1) as usize].clone()
    }

    fn set_slot(&mut self, index: u32, entry: Option<SlotEntry>) {
        if index == 0 || index > ITEM_SLOT_COUNT {
            return;
        }
        self.slots[(index - 1) as usize] = entry;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
