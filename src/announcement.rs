use crate::as_graph::ASN;
use crate::shared::{Relationships, Timestamps, Validity};

pub type Prefix = ipnetwork::IpNetwork;

/// A single route advertisement. Immutable by convention: every
/// transformation (prepending self, clearing `seed_asn`, marking a
/// withdrawal) goes through `copy_with`/`copy_and_process`, which return a
/// new value rather than mutating in place — this is what lets RIBs hand out
/// plain clones without aliasing concerns.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub prefix: Prefix,
    /// index 0 = most recent hop, last = origin.
    pub as_path: Vec<ASN>,
    pub next_hop_asn: ASN,
    pub recv_relationship: Relationships,
    /// Set only on scenario-injected announcements; cleared on every
    /// re-announcement (`copy_and_process`).
    pub seed_asn: Option<ASN>,
    /// If true, the outcome analyzer stops traceback at this hop instead of
    /// recursing further (used by blackhole-style defenses, not otherwise
    /// set by the extensions implemented here).
    pub traceback_end: bool,
    pub withdraw: bool,
    pub roa_valid: Validity,
    pub bgpsec_path: Option<Vec<ASN>>,
    pub only_to_customers: Option<ASN>,
    pub path_end_valid: Validity,
    pub aspa_valid: Validity,
    pub timestamp: Timestamps,
}

impl Announcement {
    /// A freshly seeded, not-yet-propagated announcement: `as_path` is empty
    /// until `Policy::seed` prepends the originator.
    pub fn new_seed(prefix: Prefix, origin_asn: ASN, timestamp: Timestamps) -> Self {
        Announcement {
            prefix,
            as_path: Vec::new(),
            next_hop_asn: origin_asn,
            recv_relationship: Relationships::Origin,
            seed_asn: Some(origin_asn),
            traceback_end: false,
            withdraw: false,
            roa_valid: Validity::Unknown,
            bgpsec_path: None,
            only_to_customers: None,
            path_end_valid: Validity::Unknown,
            aspa_valid: Validity::Unknown,
            timestamp,
        }
    }

    pub fn origin_asn(&self) -> ASN {
        *self.as_path.last().unwrap_or(&self.next_hop_asn)
    }

    /// Equality over "is this the same route", ignoring `recv_relationship`
    /// and `seed_asn` (spec.md §4.1) — used by the SendQueue collapse rule to
    /// decide whether a pending announcement and a pending withdrawal cancel
    /// out.
    pub fn prefix_path_attributes_eq(&self, other: &Announcement) -> bool {
        self.prefix == other.prefix
            && self.as_path == other.as_path
            && self.next_hop_asn == other.next_hop_asn
            && self.roa_valid == other.roa_valid
            && self.bgpsec_path == other.bgpsec_path
            && self.only_to_customers == other.only_to_customers
            && self.path_end_valid == other.path_end_valid
            && self.aspa_valid == other.aspa_valid
    }

    /// Returns a copy prepended with `prepend_asn` at the front of
    /// `as_path` (and, if present, `bgpsec_path`), with `recv_relationship`
    /// updated for the receiving side and `seed_asn` cleared. This is the
    /// single place a hop is ever added to a path — called when a policy
    /// inserts a selected candidate into its own LocalRIB (prepend = the
    /// policy's own ASN). `next_hop_asn` is left untouched: it was already
    /// set to the sending AS by that AS's own `copy_for_emission`, and the
    /// next-hop-self convention means the importer never needs to rewrite it.
    pub fn copy_and_process(&self, prepend_asn: ASN, recv_relationship: Relationships) -> Self {
        let mut as_path = self.as_path.clone();
        if !self.withdraw {
            as_path.insert(0, prepend_asn);
        }
        let bgpsec_path = self.bgpsec_path.clone().map(|mut p| {
            if !self.withdraw {
                p.insert(0, prepend_asn);
            }
            p
        });

        Announcement {
            prefix: self.prefix,
            as_path,
            next_hop_asn: self.next_hop_asn,
            recv_relationship,
            seed_asn: None,
            traceback_end: self.traceback_end,
            withdraw: self.withdraw,
            roa_valid: self.roa_valid,
            bgpsec_path,
            only_to_customers: self.only_to_customers,
            path_end_valid: self.path_end_valid,
            aspa_valid: self.aspa_valid,
            timestamp: self.timestamp,
        }
    }

    /// A copy re-emitted toward a neighbor: same path as held in the
    /// LocalRIB (the emitter does *not* prepend itself a second time — it
    /// already did so when it selected this as its best route), with
    /// `next_hop_asn` rewritten to `emitter_asn` (next-hop-self, so the
    /// receiver always forwards data through whoever last re-advertised the
    /// route), `recv_relationship` set to the receiver's view of the link,
    /// and `seed_asn` cleared.
    pub fn copy_for_emission(&self, emitter_asn: ASN, recv_relationship: Relationships) -> Self {
        Announcement {
            next_hop_asn: emitter_asn,
            recv_relationship,
            seed_asn: None,
            ..self.clone()
        }
    }

    /// Turns a seeded announcement into the LocalRIB entry for its own
    /// originating AS. A crafted seed may already carry a non-empty
    /// `as_path` (e.g. a scenario injecting a bogus upstream hop to probe
    /// loop prevention) — that path is kept as-is, mirroring the teacher's
    /// "prepend only if not already at front" seed handling; only a truly
    /// empty `as_path` (the common case, from `new_seed`) defaults to
    /// `vec![origin_asn]`. Unlike `copy_and_process`, `seed_asn` is left
    /// intact — spec.md §3 only clears it on re-announcement, not on the
    /// initial seed.
    pub fn originate(&self, origin_asn: ASN) -> Self {
        let as_path = if self.as_path.is_empty() {
            vec![origin_asn]
        } else {
            self.as_path.clone()
        };
        Announcement {
            as_path,
            next_hop_asn: origin_asn,
            recv_relationship: Relationships::Origin,
            ..self.clone()
        }
    }

    /// A withdrawal for the same route (prefix/path/attributes kept, so
    /// `prefix_path_attributes_eq` against the original still holds).
    pub fn as_withdrawal(&self) -> Self {
        Announcement {
            withdraw: true,
            ..self.clone()
        }
    }
}
