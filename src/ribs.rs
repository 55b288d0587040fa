use std::collections::HashMap;

use crate::announcement::{Announcement, Prefix};
use crate::as_graph::ASN;
use crate::error::SimError;

/// Chosen routes: at most one entry per prefix, `as_path[0] == owning AS`
/// (spec.md §3's LocalRIB invariant is enforced by callers — `Policy` never
/// inserts an announcement it hasn't already prepended itself to).
#[derive(Debug, Clone, Default)]
pub struct LocalRib {
    entries: HashMap<Prefix, Announcement>,
}

impl LocalRib {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prefix: &Prefix) -> Option<&Announcement> {
        self.entries.get(prefix)
    }

    pub fn set(&mut self, ann: Announcement) {
        self.entries.insert(ann.prefix, ann);
    }

    pub fn remove(&mut self, prefix: &Prefix) -> Option<Announcement> {
        self.entries.remove(prefix)
    }

    pub fn contains(&self, prefix: &Prefix) -> bool {
        self.entries.contains_key(prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Prefix, &Announcement)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Routes as received from each neighbor, before this AS prepends itself.
/// Read by Feasible-Path uRPF (C5) and by BGP-Full's withdrawal re-selection,
/// regardless of which `PolicyKind` produced the entry (SPEC_FULL.md §4.3).
#[derive(Debug, Clone, Default)]
pub struct AdjRibsIn {
    entries: HashMap<(ASN, Prefix), Announcement>,
}

impl AdjRibsIn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, neighbor_asn: ASN, ann: Announcement) {
        self.entries.insert((neighbor_asn, ann.prefix), ann);
    }

    pub fn remove(&mut self, neighbor_asn: ASN, prefix: &Prefix) -> Option<Announcement> {
        self.entries.remove(&(neighbor_asn, *prefix))
    }

    pub fn get(&self, neighbor_asn: ASN, prefix: &Prefix) -> Option<&Announcement> {
        self.entries.get(&(neighbor_asn, *prefix))
    }

    /// All candidate routes currently on file for `prefix`, one per
    /// neighbor that has ever announced (and not withdrawn) it.
    pub fn candidates_for(&self, prefix: &Prefix) -> impl Iterator<Item = (&ASN, &Announcement)> {
        self.entries
            .iter()
            .filter(move |((_, p), _)| p == prefix)
            .map(|((asn, _), ann)| (asn, ann))
    }

    /// Every entry received from `neighbor_asn`, for a given `source` origin
    /// — used by Feasible-Path uRPF, which only cares whether *any* route to
    /// that origin was ever received across that interface.
    pub fn received_from(&self, neighbor_asn: ASN, origin_asn: ASN) -> bool {
        self.entries.iter().any(|((n, _), ann)| {
            *n == neighbor_asn && ann.origin_asn() == origin_asn
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Staged outgoing announcement/withdrawal pair for one (neighbor, prefix).
/// At most one of each field is ever set at a time (spec.md §3).
#[derive(Debug, Clone, Default)]
pub struct SendInfo {
    pub ann: Option<Announcement>,
    pub withdrawal_ann: Option<Announcement>,
}

impl SendInfo {
    pub fn is_empty(&self) -> bool {
        self.ann.is_none() && self.withdrawal_ann.is_none()
    }
}

/// Adj-RIBs-Out staging area. `add_ann` enforces the invariants from
/// spec.md §3 exactly as the original `SendQueue.add_ann` does (there,
/// via `assert`; here, via a returned `SimError::InvariantViolation`, since
/// spec.md §7 treats these as engine bugs that must fail loudly rather than
/// panic the whole trial).
#[derive(Debug, Clone, Default)]
pub struct SendQueue {
    entries: HashMap<ASN, HashMap<Prefix, SendInfo>>,
}

impl SendQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ann(&mut self, owner_asn: ASN, neighbor_asn: ASN, ann: Announcement) -> Result<(), SimError> {
        let send_info = self
            .entries
            .entry(neighbor_asn)
            .or_default()
            .entry(ann.prefix)
            .or_default();

        if ann.withdraw {
            if send_info.withdrawal_ann.is_some() {
                return Err(SimError::InvariantViolation {
                    asn: owner_asn,
                    detail: format!(
                        "replacing a pending withdrawal to {} for {}",
                        neighbor_asn, ann.prefix
                    ),
                });
            }
            match &send_info.ann {
                Some(pending) if pending.prefix_path_attributes_eq(&ann) => {
                    send_info.ann = None;
                }
                _ => {
                    send_info.withdrawal_ann = Some(ann);
                }
            }
        } else {
            if send_info.ann.is_some() {
                return Err(SimError::InvariantViolation {
                    asn: owner_asn,
                    detail: format!(
                        "replacing a pending announcement to {} for {} without an intervening withdrawal",
                        neighbor_asn, ann.prefix
                    ),
                });
            }
            match &send_info.withdrawal_ann {
                // An announcement attribute-equal to a pending withdrawal
                // collapses with it rather than replacing it (spec.md §3):
                // the withdrawal never needs to go out if nothing changed.
                Some(pending) if pending.prefix_path_attributes_eq(&ann) => {
                    send_info.withdrawal_ann = None;
                }
                _ => send_info.ann = Some(ann),
            }
        }

        Ok(())
    }

    /// Drains every pending item for `neighbor_asn`, removing it from the
    /// queue. Called once per propagation phase by the scheduler.
    pub fn drain_for(&mut self, neighbor_asn: ASN) -> Vec<SendInfo> {
        match self.entries.remove(&neighbor_asn) {
            Some(by_prefix) => by_prefix.into_values().filter(|si| !si.is_empty()).collect(),
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .values()
            .all(|by_prefix| by_prefix.values().all(SendInfo::is_empty))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
