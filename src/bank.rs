use crate::catalog::{
    self, SignalCatalog, FREE_SLOT_COUNT, ITEM_SLOT_COUNT, LTN_SLOT_COUNT,
};
use crate::classify::classify;
use crate::error::{CombinatorError, Result};
use crate::normalize::normalize;
use crate::port::{ControlPort, COMBINATOR_ENTITY};
use crate::types::{CombinatorConfig, Mode, Signal, SignalKind, SlotEntry};
use crate::validate::validate;

/// A signal-slot register bank attached to one live combinator entity.
///
/// The host owns the slot storage behind the [`ControlPort`]; this facade
/// owns the policy: on open and on every refresh it normalizes the bank
/// (reserved signals home, free range compacted, defaults stripped),
/// classifies the operating [`Mode`], and validates the reserved range
/// against that mode. Mutation entry points re-run classification and
/// validation, so the cached mode is never stale.
///
/// The backing entity can be destroyed between calls at arbitrary ticks.
/// Every operation checks validity first and returns
/// [`CombinatorError::InvalidHandle`] instead of touching dead storage.
pub struct Combinator<P: ControlPort> {
    port: P,
    catalog: SignalCatalog,
    config: CombinatorConfig,
    /// Derived projection of the reserved slots. Recomputed on attach and
    /// after every mutation; never persisted on its own.
    mode: Mode,
}

impl<P: ControlPort> Combinator<P> {
    /// Attach to a combinator entity and run the initial refresh.
    ///
    /// Fails when the handle is already invalid or points at an entity of
    /// the wrong kind.
    pub fn attach(port: P, config: CombinatorConfig) -> Result<Self> {
        if !port.is_valid() {
            return Err(CombinatorError::InvalidHandle);
        }
        if port.entity_name() != COMBINATOR_ENTITY {
            let name = port.entity_name().to_string();
            log::warn!("refusing to attach to entity kind {}", name);
            return Err(CombinatorError::UnexpectedEntity { name });
        }
        let mut combinator = Self {
            port,
            catalog: SignalCatalog::ltn(),
            config,
            mode: Mode::NONE,
        };
        combinator.refresh()?;
        Ok(combinator)
    }

    /// Re-run normalize → classify → validate over the whole bank.
    /// Idempotent: a second refresh leaves the bank untouched.
    pub fn refresh(&mut self) -> Result<Mode> {
        self.guard()?;
        let before = self.snapshot();
        let mut after = before.clone();
        normalize(&mut after, &self.catalog, &self.config);
        let mode = classify(&after, &self.catalog, &self.config);
        validate(&mut after, &self.catalog, mode);
        self.write_back(&before, &after);
        self.mode = mode;
        Ok(mode)
    }

    /// The mode derived by the last refresh or mutation.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Explicitly assign an operating mode.
    ///
    /// Keeping Provider while the high-threshold sentinel is armed undoes
    /// the sentinel; dropping Provider (with the host flag on) arms it.
    /// A Depot target raises the depot signal. The Validator then clears
    /// whatever the target mode disallows.
    pub fn set_mode(&mut self, target: Mode) -> Result<()> {
        self.guard()?;

        let sentinel = self.config.high_threshold_count;
        if self.config.high_provider_threshold {
            let current = self.reserved(catalog::PROVIDER_THRESHOLD);
            if target.is_provider() && current == Some(sentinel) {
                self.write_reserved(catalog::PROVIDER_THRESHOLD, None);
            } else if !target.is_provider() {
                self.write_reserved(catalog::PROVIDER_THRESHOLD, Some(sentinel));
            }
        }
        if target.is_depot() {
            self.write_reserved(catalog::DEPOT, Some(1));
        }

        let before = self.snapshot();
        let mut after = before.clone();
        validate(&mut after, &self.catalog, target);
        self.write_back(&before, &after);
        self.mode = target;
        Ok(())
    }

    /// [`Combinator::set_mode`] for hosts speaking the raw bitmask.
    /// Bit patterns no mode maps to are rejected without mutation.
    pub fn set_mode_bits(&mut self, bits: u8) -> Result<()> {
        let Some(target) = Mode::from_bits(bits) else {
            log::warn!("rejecting invalid mode bits {:#05b}", bits);
            return Err(CombinatorError::InvalidMode { bits });
        };
        self.set_mode(target)
    }

    /// Read a catalog signal: its count when present, its catalog default
    /// when absent.
    pub fn get(&self, name: &str) -> Result<i32> {
        self.guard()?;
        let cat = self.catalog.entry(name).ok_or_else(|| self.unknown(name))?;
        Ok(self.reserved(name).unwrap_or(cat.default))
    }

    /// Write a catalog signal at its catalog slot, then re-validate.
    pub fn set(&mut self, name: &str, value: i32) -> Result<()> {
        self.guard()?;
        let cat = self.catalog.entry(name).ok_or_else(|| self.unknown(name))?;
        self.port.set_slot(
            cat.slot,
            Some(SlotEntry::new(Signal::virt(cat.name), value)),
        );
        self.revalidate();
        Ok(())
    }

    /// Read a free-range slot. External indices are 1-based relative to the
    /// free range: external 1 is internal slot K+1.
    pub fn slot(&self, external: u32) -> Result<Option<SlotEntry>> {
        self.guard()?;
        let index = self.internal_index(external)?;
        Ok(self.port.slot(index))
    }

    /// Write a free-range slot, then re-validate.
    pub fn set_slot(&mut self, external: u32, entry: SlotEntry) -> Result<()> {
        self.guard()?;
        let index = self.internal_index(external)?;
        self.port.set_slot(index, Some(entry));
        self.revalidate();
        Ok(())
    }

    /// Change the count of an occupied free-range slot. A no-op when the
    /// slot is empty — there is no signal to attach the count to.
    pub fn set_slot_value(&mut self, external: u32, count: i32) -> Result<()> {
        self.guard()?;
        let index = self.internal_index(external)?;
        match self.port.slot(index) {
            Some(mut entry) => {
                entry.count = count;
                self.port.set_slot(index, Some(entry));
                self.revalidate();
            }
            None => log::debug!("set_slot_value on empty free slot {}", external),
        }
        Ok(())
    }

    /// Clear a free-range slot, then re-validate.
    pub fn remove_slot(&mut self, external: u32) -> Result<()> {
        self.guard()?;
        let index = self.internal_index(external)?;
        self.port.set_slot(index, None);
        self.revalidate();
        Ok(())
    }

    /// Number of occupied free-range slots.
    pub fn free_len(&self) -> Result<usize> {
        self.guard()?;
        Ok((LTN_SLOT_COUNT + 1..=ITEM_SLOT_COUNT)
            .filter(|&i| self.port.slot(i).is_some())
            .count())
    }

    /// Total free-range slots, occupied or not.
    pub fn free_capacity(&self) -> u32 {
        FREE_SLOT_COUNT
    }

    /// Whether the device's output is switched on.
    pub fn is_enabled(&self) -> Result<bool> {
        self.guard()?;
        Ok(self.port.is_enabled())
    }

    /// Switch the device's output on or off.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.guard()?;
        self.port.set_enabled(enabled);
        Ok(())
    }

    /// The backing port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Detach, returning the port.
    pub fn into_port(self) -> P {
        self.port
    }

    // -- internals ----------------------------------------------------------

    fn guard(&self) -> Result<()> {
        if self.port.is_valid() {
            Ok(())
        } else {
            Err(CombinatorError::InvalidHandle)
        }
    }

    fn unknown(&self, name: &str) -> CombinatorError {
        log::warn!("unknown catalog signal {}", name);
        CombinatorError::UnknownSignal {
            name: name.to_string(),
        }
    }

    /// Map an external free-range index to an internal bank slot.
    fn internal_index(&self, external: u32) -> Result<u32> {
        if external == 0 || external > FREE_SLOT_COUNT {
            log::warn!("free-range slot index {} out of range", external);
            return Err(CombinatorError::InvalidSlot { index: external });
        }
        Ok(LTN_SLOT_COUNT + external)
    }

    /// Read a reserved signal off its catalog slot via the port.
    fn reserved(&self, name: &str) -> Option<i32> {
        let cat = self.catalog.entry(name)?;
        let entry = self.port.slot(cat.slot)?;
        (entry.signal.kind == SignalKind::Virtual && entry.signal.name == name)
            .then_some(entry.count)
    }

    /// Write (or clear) a reserved signal at its catalog slot.
    fn write_reserved(&mut self, name: &str, value: Option<i32>) {
        if let Some(cat) = self.catalog.entry(name) {
            self.port.set_slot(
                cat.slot,
                value.map(|v| SlotEntry::new(Signal::virt(cat.name), v)),
            );
        }
    }

    fn snapshot(&self) -> Vec<Option<SlotEntry>> {
        (1..=ITEM_SLOT_COUNT).map(|i| self.port.slot(i)).collect()
    }

    /// Write only the slots a pure pass changed.
    fn write_back(&mut self, before: &[Option<SlotEntry>], after: &[Option<SlotEntry>]) {
        for (idx, (b, a)) in before.iter().zip(after).enumerate() {
            if b != a {
                self.port.set_slot(idx as u32 + 1, a.clone());
            }
        }
    }

    /// Recompute the mode and enforce it. Runs after every mutation entry
    /// point; skips normalization, which only the refresh path owns.
    fn revalidate(&mut self) {
        let before = self.snapshot();
        let mut after = before.clone();
        let mode = classify(&after, &self.catalog, &self.config);
        validate(&mut after, &self.catalog, mode);
        self.write_back(&before, &after);
        self.mode = mode;
    }
}
