/// All errors that can occur in combinator operations.
///
/// None of these are hard failures: the host maps them to its own "silent
/// default" policy (mutators no-op, accessors fall back to defaults). They
/// are typed so call sites can distinguish a destroyed entity from a
/// programming error without guard checks before every call.
#[derive(Debug, thiserror::Error)]
pub enum CombinatorError {
    /// The backing entity handle is missing or no longer valid.
    #[error("backing entity handle is invalid")]
    InvalidHandle,

    /// The handle points at an entity of the wrong kind.
    #[error("unexpected entity kind: {name}")]
    UnexpectedEntity { name: String },

    /// A by-name accessor was given a name outside the signal catalog.
    /// This is a programming error at the call site.
    #[error("unknown catalog signal: {name}")]
    UnknownSignal { name: String },

    /// A free-range slot index outside 1..=FREE_SLOT_COUNT.
    #[error("free-range slot index out of range: {index}")]
    InvalidSlot { index: u32 },

    /// A mode bitmask no reachable state allows.
    #[error("invalid mode bits: {bits:#05b}")]
    InvalidMode { bits: u8 },
}

/// Convenience alias for combinator results.
pub type Result<T> = std::result::Result<T, CombinatorError>;
