//! Signal-slot register banks for virtual LTN combinators.
//!
//! Combinator-rs manages the fixed-capacity signal bank of a logistics
//! combinator: reserved control signals pinned to their own slots at the
//! front, user signals compacted into the free range behind them. On every
//! refresh the bank is normalized (misplaced signals re-sorted, defaulted
//! reserved signals stripped), the operating mode — Depot, Provider,
//! Requester, both, or neither — is derived from the reserved slots, and
//! reserved signals the mode disallows are cleared.
//!
//! Slot storage lives behind the host's [`ControlPort`] handle; this crate
//! owns the sorting, classification, and validation policy.

pub mod bank;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod normalize;
pub mod port;
pub mod types;
pub mod validate;

pub use bank::Combinator;
pub use catalog::{CatalogEntry, SignalCatalog, FREE_SLOT_COUNT, ITEM_SLOT_COUNT, LTN_SLOT_COUNT};
pub use classify::classify;
pub use error::{CombinatorError, Result};
pub use normalize::{normalize, NormalizeOutcome};
pub use port::{ControlPort, MemoryPort, COMBINATOR_ENTITY};
pub use types::{CombinatorConfig, Mode, Signal, SignalKind, SlotEntry};
pub use validate::{cleared_names, validate};
