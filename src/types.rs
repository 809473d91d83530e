use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SignalKind — the three signal namespaces of the circuit network
// ---------------------------------------------------------------------------

/// The namespace a signal name lives in.
///
/// Item and Fluid signals carry cargo counts; Virtual signals carry control
/// values. All catalog (reserved) signals are Virtual — an Item signal that
/// happens to share a catalog name is a different signal entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SignalKind {
    Item = 0,
    Fluid = 1,
    Virtual = 2,
}

impl SignalKind {
    /// Convert a raw u8 to a SignalKind, if valid.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Item),
            1 => Some(Self::Fluid),
            2 => Some(Self::Virtual),
            _ => None,
        }
    }

    /// Convert this SignalKind to its raw u8 discriminant.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Signal — (kind, name) identity
// ---------------------------------------------------------------------------

/// A typed signal. Identity is the (kind, name) pair — two signals are
/// equal iff both fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub name: String,
}

impl Signal {
    /// An Item-kind signal.
    pub fn item(name: impl Into<String>) -> Self {
        Self {
            kind: SignalKind::Item,
            name: name.into(),
        }
    }

    /// A Fluid-kind signal.
    pub fn fluid(name: impl Into<String>) -> Self {
        Self {
            kind: SignalKind::Fluid,
            name: name.into(),
        }
    }

    /// A Virtual-kind signal.
    pub fn virt(name: impl Into<String>) -> Self {
        Self {
            kind: SignalKind::Virtual,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            SignalKind::Item => "item",
            SignalKind::Fluid => "fluid",
            SignalKind::Virtual => "virtual",
        };
        write!(f, "{}/{}", kind, self.name)
    }
}

// ---------------------------------------------------------------------------
// SlotEntry — one occupied register slot
// ---------------------------------------------------------------------------

/// The content of one occupied slot: a signal and its signed count.
/// An empty slot is represented as `None` in an `Option<SlotEntry>` cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub signal: Signal,
    pub count: i32,
}

impl SlotEntry {
    pub fn new(signal: Signal, count: i32) -> Self {
        Self { signal, count }
    }
}

// ---------------------------------------------------------------------------
// Mode — derived operating role
// ---------------------------------------------------------------------------

/// The inferred operating role of a combinator.
///
/// Depot is exclusive by construction: it is a separate variant, so a value
/// can never carry Depot together with Provider or Requester. The host-facing
/// bitmask (Provider=1, Requester=2, Depot=4) is bridged via [`Mode::bits`]
/// and [`Mode::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Depot station. Suppresses all provider/requester behavior.
    Depot,
    /// Normal station: any combination of providing and requesting,
    /// including neither (a dormant station).
    Operating { provider: bool, requester: bool },
}

impl Mode {
    pub const NONE: Mode = Mode::Operating {
        provider: false,
        requester: false,
    };
    pub const PROVIDER: Mode = Mode::Operating {
        provider: true,
        requester: false,
    };
    pub const REQUESTER: Mode = Mode::Operating {
        provider: false,
        requester: true,
    };
    pub const PROVIDER_REQUESTER: Mode = Mode::Operating {
        provider: true,
        requester: true,
    };

    /// The host-facing bitmask for this mode.
    pub fn bits(self) -> u8 {
        match self {
            Mode::Depot => 0b100,
            Mode::Operating {
                provider,
                requester,
            } => (provider as u8) | ((requester as u8) << 1),
        }
    }

    /// Decode a host-facing bitmask.
    ///
    /// Accepts exactly {0, 1, 2, 3, 4}: 5..=7 would combine Depot with
    /// Provider/Requester, which no reachable state allows, and anything
    /// above 7 is out of range. Both are rejected as `None`.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b100 => Some(Mode::Depot),
            b if b <= 0b011 => Some(Mode::Operating {
                provider: b & 0b001 != 0,
                requester: b & 0b010 != 0,
            }),
            _ => None,
        }
    }

    /// Whether this mode includes the Provider role.
    pub fn is_provider(self) -> bool {
        matches!(self, Mode::Operating { provider: true, .. })
    }

    /// Whether this mode includes the Requester role.
    pub fn is_requester(self) -> bool {
        matches!(
            self,
            Mode::Operating {
                requester: true,
                ..
            }
        )
    }

    /// Whether this mode is Depot.
    pub fn is_depot(self) -> bool {
        matches!(self, Mode::Depot)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Depot => write!(f, "DEPOT"),
            Mode::Operating {
                provider: true,
                requester: true,
            } => write!(f, "PROVIDER+REQUESTER"),
            Mode::Operating {
                provider: true,
                requester: false,
            } => write!(f, "PROVIDER"),
            Mode::Operating {
                provider: false,
                requester: true,
            } => write!(f, "REQUESTER"),
            Mode::Operating { .. } => write!(f, "NONE"),
        }
    }
}

// ---------------------------------------------------------------------------
// CombinatorConfig — host-supplied classification/validation settings
// ---------------------------------------------------------------------------

/// Host configuration consulted during normalization, classification and
/// validation. Passed explicitly at construction — never read from ambient
/// state — so mode derivation stays a pure function of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinatorConfig {
    /// Keep the network-id signal even at its default/zero value. When set,
    /// the presence of a defaulted network-id carries meaning and the
    /// normalizer must not strip it.
    pub emit_default_network_id: bool,
    /// Enable the high-threshold sentinel: a provider-threshold equal to
    /// `high_threshold_count` means "this station does not really provide".
    pub high_provider_threshold: bool,
    /// The sentinel count used when `high_provider_threshold` is enabled.
    pub high_threshold_count: i32,
}

impl Default for CombinatorConfig {
    fn default() -> Self {
        Self {
            emit_default_network_id: false,
            high_provider_threshold: false,
            high_threshold_count: 10_000_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_kind_round_trip() {
        for v in 0..=2u8 {
            let k = SignalKind::from_u8(v).expect("valid kind");
            assert_eq!(k.as_u8(), v);
        }
        assert!(SignalKind::from_u8(3).is_none());
    }

    #[test]
    fn signal_identity_is_kind_and_name() {
        assert_eq!(Signal::item("iron-plate"), Signal::item("iron-plate"));
        assert_ne!(Signal::item("iron-plate"), Signal::fluid("iron-plate"));
        assert_ne!(Signal::item("iron-plate"), Signal::item("copper-plate"));
    }

    #[test]
    fn mode_bits_round_trip() {
        for bits in 0..=4u8 {
            let mode = Mode::from_bits(bits).expect("valid mode bits");
            assert_eq!(mode.bits(), bits);
        }
    }

    #[test]
    fn mode_rejects_depot_combinations() {
        assert!(Mode::from_bits(0b101).is_none());
        assert!(Mode::from_bits(0b110).is_none());
        assert!(Mode::from_bits(0b111).is_none());
        assert!(Mode::from_bits(8).is_none());
        assert!(Mode::from_bits(255).is_none());
    }

    #[test]
    fn mode_role_predicates() {
        assert!(Mode::Depot.is_depot());
        assert!(!Mode::Depot.is_provider());
        assert!(!Mode::Depot.is_requester());
        assert!(Mode::PROVIDER_REQUESTER.is_provider());
        assert!(Mode::PROVIDER_REQUESTER.is_requester());
        assert!(!Mode::NONE.is_provider());
        assert!(!Mode::NONE.is_requester());
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::Depot.to_string(), "DEPOT");
        assert_eq!(Mode::NONE.to_string(), "NONE");
        assert_eq!(Mode::PROVIDER.to_string(), "PROVIDER");
        assert_eq!(Mode::PROVIDER_REQUESTER.to_string(), "PROVIDER+REQUESTER");
    }
}
