//! The Policy engine (C3): per-AS route processing — receive, validate,
//! select, and propagate. Grounded on `simulation_engine/policy/mod.rs` and
//! the `policy_extensions/bgp.rs` base case in the teacher, but generalized
//! from a `BGP -> ROV -> ROVFull -> ...` class hierarchy into a single
//! struct parameterized by `PolicyKind` and `SecurityProfile`, per
//! spec.md §9's explicit redesign guidance.

use std::collections::HashMap;

use crate::announcement::{Announcement, Prefix};
use crate::as_graph::{ASGraph, ASN, AS};
use crate::error::SimResult;
use crate::ribs::{AdjRibsIn, LocalRib, SendInfo, SendQueue};
use crate::route_validator::RouteValidator;
use crate::security::{self, validate_security, SecurityProfile};
use crate::shared::{Relationships, Settings, Validity};

/// Whether a Policy tracks withdrawals through `ribs_out`/`SendQueue` (Full)
/// or only ever emits fresh announcements, never retracting them (Simple).
/// `ribs_in` is maintained identically either way (SPEC_FULL.md §4.3) — the
/// distinction is purely about what gets queued for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Simple,
    Full,
}

impl Settings {
    /// The `PolicyKind` a given adoption setting runs under. Only plain
    /// `Bgp` runs BGP-Simple; every security extension implies BGP-Full,
    /// since a withdrawal is the only way to retract a route that a
    /// newly-adopted check has started rejecting.
    pub fn policy_kind(&self) -> PolicyKind {
        match self {
            Settings::Bgp => PolicyKind::Simple,
            _ => PolicyKind::Full,
        }
    }

    /// The `SecurityProfile` a given adoption setting enables.
    pub fn security_profile(&self) -> SecurityProfile {
        let mut profile = SecurityProfile::none();
        match self {
            Settings::Bgp | Settings::BgpFull => {}
            Settings::Rov => profile.rov = true,
            Settings::PeerRov => profile.peer_rov = true,
            Settings::PathEnd => profile.path_end = true,
            Settings::Aspa => profile.aspa = true,
            Settings::Bgpsec => profile.bgpsec = true,
            Settings::Otc => profile.otc = true,
        }
        profile
    }
}

/// One AS's routing state and decision logic. Owns no neighbors directly —
/// like `AS` itself, it only ever addresses other policies through the
/// `SimulationEngine`'s `HashMap<ASN, Policy>` (scheduler.rs), never via a
/// Rust reference, so a propagation phase can mutably borrow two different
/// ASes' policies without fighting the borrow checker.
#[derive(Debug, Clone)]
pub struct Policy {
    pub asn: ASN,
    pub kind: PolicyKind,
    pub security_profile: SecurityProfile,
    pub local_rib: LocalRib,
    pub ribs_in: AdjRibsIn,
    /// Last announcement actually queued to each (neighbor, prefix), so
    /// `propagate_to` only re-queues on an actual change and a Full policy
    /// knows what to withdraw when its best route disappears.
    ribs_out: HashMap<(ASN, Prefix), Announcement>,
    /// This AS's own Adj-RIBs-Out staging area (spec.md §3). Each policy
    /// owns one rather than the scheduler holding a single shared queue, so
    /// a propagation phase can drain one AS's outgoing items and deliver
    /// them into a different AS's `process_incoming` without the two
    /// borrows ever overlapping.
    send_queue: SendQueue,
}

impl Policy {
    pub fn new(asn: ASN, kind: PolicyKind, security_profile: SecurityProfile) -> Self {
        Policy {
            asn,
            kind,
            security_profile,
            local_rib: LocalRib::new(),
            ribs_in: AdjRibsIn::new(),
            ribs_out: HashMap::new(),
            send_queue: SendQueue::new(),
        }
    }

    /// Drains every item this AS has queued for `neighbor_asn` since the
    /// last time it was drained. Called once per propagation phase by the
    /// scheduler.
    pub fn drain_to(&mut self, neighbor_asn: ASN) -> Vec<SendInfo> {
        self.send_queue.drain_for(neighbor_asn)
    }

    /// Installs a scenario-injected seed announcement as this AS's own
    /// LocalRIB entry for its prefix (spec.md §3, "seed"). The caller is
    /// responsible for queuing it for export on the next propagation phase;
    /// `seed` only ever touches `local_rib`.
    pub fn seed(&mut self, ann: &Announcement) {
        self.local_rib.set(ann.originate(self.asn));
    }

    /// Applies one received announcement or withdrawal from `neighbor_asn`:
    /// updates `ribs_in` (always, regardless of `kind`), then re-runs
    /// selection for that prefix. Returns whether the LocalRIB's best route
    /// for the prefix changed, so the scheduler only re-queues export when
    /// something downstream actually needs to see it.
    pub fn process_incoming(
        &mut self,
        neighbor_asn: ASN,
        incoming: Announcement,
        as_graph: &ASGraph,
        route_validator: &RouteValidator,
    ) -> bool {
        let as_self = as_graph
            .get(&self.asn)
            .expect("policy's own AS missing from graph");
        let relationship = as_self
            .relationship_with(neighbor_asn)
            .unwrap_or(Relationships::Peers);

        let prefix = incoming.prefix;
        if incoming.withdraw {
            self.ribs_in.remove(neighbor_asn, &prefix);
        } else {
            let mut annotated = security::annotate(&incoming, as_graph, route_validator);
            annotated.recv_relationship = relationship;
            self.ribs_in.insert(neighbor_asn, annotated);
        }

        self.reselect_best(&prefix, as_self, as_graph, route_validator)
    }

    /// Re-runs Gao-Rexford selection (spec.md §4.3) over every candidate
    /// currently on file in `ribs_in` for `prefix`, and installs the winner
    /// (or clears the LocalRIB entry, if none remain) into `local_rib`.
    fn reselect_best(
        &mut self,
        prefix: &Prefix,
        as_self: &AS,
        as_graph: &ASGraph,
        route_validator: &RouteValidator,
    ) -> bool {
        let mut best: Option<Announcement> = None;

        for (_neighbor_asn, candidate) in self.ribs_in.candidates_for(prefix) {
            // Loop prevention (spec.md §4.2): never select a path that
            // already transits us.
            if candidate.as_path.contains(&self.asn) {
                continue;
            }
            if validate_security(
                candidate,
                as_self,
                as_graph,
                &self.security_profile,
                route_validator,
            ) == Validity::Invalid
            {
                continue;
            }

            let processed = candidate.copy_and_process(self.asn, candidate.recv_relationship);
            best = match best {
                None => Some(processed),
                Some(current) => {
                    if Self::is_better(&processed, &current) {
                        Some(processed)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        let changed = match (&best, self.local_rib.get(prefix)) {
            (Some(new), Some(old)) => !new.prefix_path_attributes_eq(old),
            (Some(_), None) | (None, Some(_)) => true,
            (None, None) => false,
        };

        match best {
            Some(ann) => self.local_rib.set(ann),
            None => {
                self.local_rib.remove(prefix);
            }
        }

        changed
    }

    /// Gao-Rexford preference order: relationship (provider < peer <
    /// customer < origin, per `Relationships`'s pinned discriminants), then
    /// shorter AS-path, then lower next-hop ASN as the final deterministic
    /// tie-break. Ties resolve to `false` (keep the incumbent) — spec.md
    /// §4.3 step 6 has no timestamp tie-break, so a previously-selected
    /// route is never displaced by an equally-good newcomer.
    fn is_better(candidate: &Announcement, current: &Announcement) -> bool {
        if candidate.recv_relationship != current.recv_relationship {
            return candidate.recv_relationship > current.recv_relationship;
        }
        if candidate.as_path.len() != current.as_path.len() {
            return candidate.as_path.len() < current.as_path.len();
        }
        candidate.next_hop_asn < current.next_hop_asn
    }

    /// Gao-Rexford export rule (spec.md §4.6): a route received from a
    /// customer (or originated here) may be re-advertised to anyone; a route
    /// received from a peer or provider is only ever re-advertised to
    /// customers.
    fn export_permitted(recv_relationship: Relationships, export_relationship: Relationships) -> bool {
        matches!(recv_relationship, Relationships::Customers | Relationships::Origin)
            || export_relationship == Relationships::Customers
    }

    /// Queues this AS's current best routes for export toward every
    /// neighbor reachable via `export_relationship`, diffing against
    /// `ribs_out` so a route already sent unchanged is never re-queued —
    /// this is what lets the scheduler call every phase every round until
    /// `SendQueue` goes quiet (spec.md §4.6) without looping forever.
    pub fn propagate_to(
        &mut self,
        as_graph: &ASGraph,
        export_relationship: Relationships,
    ) -> SimResult<()> {
        let as_self = as_graph
            .get(&self.asn)
            .expect("policy's own AS missing from graph");
        let neighbor_asns = as_self.get_neighbors(export_relationship).to_vec();
        if neighbor_asns.is_empty() {
            return Ok(());
        }

        let routes: Vec<Announcement> = self.local_rib.iter().map(|(_, ann)| ann.clone()).collect();

        for &neighbor_asn in &neighbor_asns {
            for ann in &routes {
                if !Self::export_permitted(ann.recv_relationship, export_relationship) {
                    continue;
                }
                if !security::otc::permits_export(ann.only_to_customers, as_self, as_graph, export_relationship) {
                    continue;
                }

                let key = (neighbor_asn, ann.prefix);
                let emission = ann.copy_for_emission(self.asn, export_relationship.invert());

                let already_sent = self
                    .ribs_out
                    .get(&key)
                    .map(|sent| sent.prefix_path_attributes_eq(&emission))
                    .unwrap_or(false);
                if already_sent {
                    continue;
                }

                self.send_queue.add_ann(self.asn, neighbor_asn, emission.clone())?;
                self.ribs_out.insert(key, emission);
            }

            if self.kind == PolicyKind::Full {
                let stale_prefixes: Vec<Prefix> = self
                    .ribs_out
                    .keys()
                    .filter(|(n, p)| *n == neighbor_asn && !self.local_rib.contains(p))
                    .map(|(_, p)| *p)
                    .collect();
                for prefix in stale_prefixes {
                    if let Some(prev) = self.ribs_out.remove(&(neighbor_asn, prefix)) {
                        self.send_queue.add_ann(self.asn, neighbor_asn, prev.as_withdrawal())?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Timestamps;
    use ipnetwork::IpNetwork;
    use std::str::FromStr;

    fn graph_1_provider_2_customer_3() -> ASGraph {
        // AS1 -- provider of --> AS2 -- provider of --> AS3
        let mut graph = ASGraph::new();
        let mut as1 = AS::new(1);
        as1.customers.push(2);
        let mut as2 = AS::new(2);
        as2.providers.push(1);
        as2.customers.push(3);
        let mut as3 = AS::new(3);
        as3.providers.push(2);
        graph.insert(as1);
        graph.insert(as2);
        graph.insert(as3);
        graph.add_provider_cone_asns();
        graph
    }

    fn route_validator() -> RouteValidator {
        RouteValidator::new()
    }

    #[test]
    fn seed_installs_self_originated_route() {
        let mut policy = Policy::new(3, PolicyKind::Simple, SecurityProfile::none());
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();
        let seed = Announcement::new_seed(prefix, 3, Timestamps::Victim);
        policy.seed(&seed);

        let best = policy.local_rib.get(&prefix).unwrap();
        assert_eq!(best.as_path, vec![3]);
        assert_eq!(best.recv_relationship, Relationships::Origin);
    }

    #[test]
    fn prefers_customer_route_over_provider_route() {
        let graph = graph_1_provider_2_customer_3();
        let rv = route_validator();
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();

        let mut policy = Policy::new(2, PolicyKind::Full, SecurityProfile::none());

        let mut from_provider = Announcement::new_seed(prefix, 9, Timestamps::Victim);
        from_provider.as_path = vec![9, 1];
        from_provider.next_hop_asn = 1;
        policy.process_incoming(1, from_provider, &graph, &rv);

        let mut from_customer = Announcement::new_seed(prefix, 3, Timestamps::Victim);
        from_customer.as_path = vec![3];
        from_customer.next_hop_asn = 3;
        let changed = policy.process_incoming(3, from_customer, &graph, &rv);

        assert!(changed);
        let best = policy.local_rib.get(&prefix).unwrap();
        assert_eq!(best.recv_relationship, Relationships::Customers);
        assert_eq!(best.as_path.first(), Some(&2));
    }

    #[test]
    fn withdrawal_clears_local_rib_when_no_alternative() {
        let graph = graph_1_provider_2_customer_3();
        let rv = route_validator();
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();

        let mut policy = Policy::new(2, PolicyKind::Full, SecurityProfile::none());
        let mut ann = Announcement::new_seed(prefix, 3, Timestamps::Victim);
        ann.as_path = vec![3];
        ann.next_hop_asn = 3;
        policy.process_incoming(3, ann.clone(), &graph, &rv);
        assert!(policy.local_rib.contains(&prefix));

        let withdrawal = ann.as_withdrawal();
        let changed = policy.process_incoming(3, withdrawal, &graph, &rv);
        assert!(changed);
        assert!(!policy.local_rib.contains(&prefix));
    }

    #[test]
    fn propagate_to_customers_exports_provider_route() {
        let graph = graph_1_provider_2_customer_3();
        let rv = route_validator();
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();

        let mut policy = Policy::new(2, PolicyKind::Full, SecurityProfile::none());
        let mut from_provider = Announcement::new_seed(prefix, 9, Timestamps::Victim);
        from_provider.as_path = vec![9, 1];
        from_provider.next_hop_asn = 1;
        policy.process_incoming(1, from_provider, &graph, &rv);

        policy.propagate_to(&graph, Relationships::Customers).unwrap();
        let drained = policy.drain_to(3);
        assert_eq!(drained.len(), 1);
        assert!(drained[0].ann.is_some());
    }

    #[test]
    fn propagate_to_providers_withholds_provider_learned_route() {
        let graph = graph_1_provider_2_customer_3();
        let rv = route_validator();
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();

        let mut policy = Policy::new(2, PolicyKind::Full, SecurityProfile::none());
        let mut from_provider = Announcement::new_seed(prefix, 9, Timestamps::Victim);
        from_provider.as_path = vec![9, 1];
        from_provider.next_hop_asn = 1;
        policy.process_incoming(1, from_provider, &graph, &rv);

        policy.propagate_to(&graph, Relationships::Providers).unwrap();
        assert!(policy.drain_to(1).is_empty());
    }
}
