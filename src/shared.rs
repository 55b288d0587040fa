use std::fmt;

/// Directed relationship class between two ASes, from the holder's point of
/// view (i.e. "this route was received from a provider/peer/customer", or
/// "this AS originated it").
///
/// The discriminant order is load-bearing: it is compared directly during
/// Gao-Rexford preference ranking (`PROVIDERS < PEERS < CUSTOMERS < ORIGIN`),
/// so it is pinned with explicit values rather than left to rely on
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Relationships {
    Providers = 1,
    Peers = 2,
    Customers = 3,
    Origin = 4,
}

impl Relationships {
    /// The relationship as seen from the other side of the same link.
    pub fn invert(&self) -> Self {
        match self {
            Relationships::Providers => Relationships::Customers,
            Relationships::Customers => Relationships::Providers,
            Relationships::Peers => Relationships::Peers,
            Relationships::Origin => Relationships::Origin,
        }
    }
}

impl fmt::Display for Relationships {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relationships::Providers => "PROVIDERS",
            Relationships::Peers => "PEERS",
            Relationships::Customers => "CUSTOMERS",
            Relationships::Origin => "ORIGIN",
        };
        write!(f, "{}", s)
    }
}

/// Named membership sets over an `ASGraph`, used for result aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ASNGroups {
    Tier1,
    Etc,
    StubsOrMh,
    Stubs,
    Multihomed,
    Transit,
    Input,
    Ixp,
    All,
}

impl fmt::Display for ASNGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ASNGroups::Tier1 => "TIER_1",
            ASNGroups::Etc => "ETC",
            ASNGroups::StubsOrMh => "STUBS_OR_MH",
            ASNGroups::Stubs => "STUBS",
            ASNGroups::Multihomed => "MULTIHOMED",
            ASNGroups::Transit => "TRANSIT",
            ASNGroups::Input => "INPUT",
            ASNGroups::Ixp => "IXP",
            ASNGroups::All => "ALL",
        };
        write!(f, "{}", s)
    }
}

/// Tri-state validity used by ROA/path-end/ASPA/BGPsec checks: an absent or
/// incomplete attestation is `Unknown`, not `Invalid` — §4.4 treats `Unknown`
/// as passing the security gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    Unknown,
}

/// ROA outcome broken out by length/origin mismatch, matching the trie
/// lookup performed by the route validator (C11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ROAValidity {
    Valid = 0,
    Unknown = 1,
    InvalidLength = 2,
    InvalidOrigin = 3,
    InvalidLengthAndOrigin = 4,
}

impl ROAValidity {
    pub fn as_validity(&self) -> Validity {
        match self {
            ROAValidity::Valid => Validity::Valid,
            ROAValidity::Unknown => Validity::Unknown,
            _ => Validity::Invalid,
        }
    }
}

impl fmt::Display for ROAValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ROAValidity::Valid => "VALID",
            ROAValidity::Unknown => "UNKNOWN",
            ROAValidity::InvalidLength => "INVALID_LENGTH",
            ROAValidity::InvalidOrigin => "INVALID_ORIGIN",
            ROAValidity::InvalidLengthAndOrigin => "INVALID_LENGTH_AND_ORIGIN",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ROARouted {
    Routed = 0,
    Unknown = 1,
    NonRouted = 2,
}

/// Ambient diagnostic ordering of which side seeded a prefix first in a
/// multi-round scenario. Not used for route-selection tie-breaking
/// (spec.md §4.3 step 6 explicitly has no timestamp tie-break).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Timestamps {
    Victim = 0,
    Attacker = 1,
}

/// Final per-AS classification produced by the outcome analyzer (C8).
/// `Undetermined` only ever appears as a transient marker during traceback;
/// it never escapes `analyze()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcomes {
    AttackerSuccess,
    VictimSuccess,
    Disconnected,
    Undetermined,
}

/// Named, pre-built policy classes an AS can adopt. Distinct from
/// `crate::security::SecurityProfile`/`crate::policy::PolicyKind` (the
/// engine's internal, composable representation) — `Settings` is the
/// external vocabulary a `Scenario` assigns per-AS (spec.md §4.7,
/// "adoption assignment"); `crate::policy::Settings` conversion methods
/// turn each variant into the flag set C3 actually runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Settings {
    /// BGP-Simple: no withdrawals, no security extensions.
    Bgp,
    /// BGP-Full: withdrawals tracked via `ribs_in`/`SendQueue`, still no
    /// security extensions.
    BgpFull,
    Rov,
    PeerRov,
    PathEnd,
    Aspa,
    Bgpsec,
    Otc,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Settings::Bgp => "BGP",
            Settings::BgpFull => "BGP_FULL",
            Settings::Rov => "ROV",
            Settings::PeerRov => "PEER_ROV",
            Settings::PathEnd => "PATH_END",
            Settings::Aspa => "ASPA",
            Settings::Bgpsec => "BGPSEC",
            Settings::Otc => "OTC",
        };
        write!(f, "{}", s)
    }
}

/// Well-known ASNs used by the built-in scenarios and the test suite,
/// matching the original source's convention.
pub struct CommonASNs;

impl CommonASNs {
    pub const ATTACKER: u32 = 666;
    pub const VICTIM: u32 = 777;
}
