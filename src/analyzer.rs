//! The Outcome Analyzer (C8). Grounded on `GraphAnalyzer` in the teacher.
//! Per spec.md §9's resolved Open Question ("likely a typo" in the source,
//! where control-plane determination called into the data-plane helper),
//! `control_plane_outcome` and `data_plane_outcome` are kept as two
//! intentionally separate functions rather than sharing a helper.

use std::collections::{HashMap, HashSet};

use log::warn;

use crate::announcement::{Announcement, Prefix};
use crate::as_graph::ASN;
use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::sav::{self, SavKind};
use crate::shared::{Outcomes, Relationships};

/// Classifies every AS's outcome after a trial has converged (or hit its
/// round cap). Built fresh per trial from the scenario's role sets and
/// subprefix ordering — it never mutates the engine it reads from.
pub struct OutcomeAnalyzer<'a> {
    engine: &'a SimulationEngine,
    attacker_asns: HashSet<ASN>,
    victim_asns: HashSet<ASN>,
    /// Most-specific-first, as seeded by the scenario (spec.md §3).
    prefixes_most_specific_first: Vec<Prefix>,
    sav_kind: SavKind,
}

impl<'a> OutcomeAnalyzer<'a> {
    pub fn new(
        engine: &'a SimulationEngine,
        attacker_asns: HashSet<ASN>,
        victim_asns: HashSet<ASN>,
        prefixes_most_specific_first: Vec<Prefix>,
        sav_kind: SavKind,
    ) -> Self {
        OutcomeAnalyzer {
            engine,
            attacker_asns,
            victim_asns,
            prefixes_most_specific_first,
            sav_kind,
        }
    }

    /// The LocalRIB entry for the most specific of the scenario's prefixes
    /// that `asn` has any route to at all (spec.md §4.8).
    fn most_specific_ann(&self, asn: ASN) -> Option<&Announcement> {
        let policy = self.engine.policies.get(&asn)?;
        self.prefixes_most_specific_first
            .iter()
            .find_map(|prefix| policy.local_rib.get(prefix))
    }

    /// Control-plane outcome for every AS: which party's route each AS
    /// actually chose, independent of whether traffic would ever reach it.
    pub fn control_plane_outcomes(&self) -> HashMap<ASN, Outcomes> {
        self.engine
            .policies
            .keys()
            .map(|&asn| (asn, self.control_plane_outcome(asn)))
            .collect()
    }

    fn control_plane_outcome(&self, asn: ASN) -> Outcomes {
        match self.most_specific_ann(asn) {
            None => Outcomes::Disconnected,
            Some(ann) => {
                let origin = ann.origin_asn();
                if self.attacker_asns.contains(&origin) {
                    Outcomes::AttackerSuccess
                } else if self.victim_asns.contains(&origin) {
                    Outcomes::VictimSuccess
                } else {
                    Outcomes::Disconnected
                }
            }
        }
    }

    /// Data-plane outcome for every AS: a memoized recursive traceback of
    /// where traffic sent by that AS toward the contested prefix actually
    /// ends up, per spec.md §4.8.
    pub fn data_plane_outcomes(&self) -> HashMap<ASN, Outcomes> {
        let mut cache = HashMap::new();
        for &asn in self.engine.policies.keys() {
            self.trace(asn, asn, &mut cache, &mut HashSet::new());
        }
        cache
    }

    /// `root_asn` is the AS the overall traceback is being computed for —
    /// held fixed across the recursion since spec.md §4.8's SAV check
    /// validates the packet's source against `root_asn`'s identity at every
    /// hop, not the immediate previous hop's. `asn` is the AS currently
    /// being visited.
    fn trace(
        &self,
        root_asn: ASN,
        asn: ASN,
        cache: &mut HashMap<ASN, Outcomes>,
        in_progress: &mut HashSet<ASN>,
    ) -> Outcomes {
        if let Some(outcome) = cache.get(&asn) {
            return *outcome;
        }
        if self.attacker_asns.contains(&asn) {
            cache.insert(asn, Outcomes::AttackerSuccess);
            return Outcomes::AttackerSuccess;
        }
        if self.victim_asns.contains(&asn) {
            cache.insert(asn, Outcomes::VictimSuccess);
            return Outcomes::VictimSuccess;
        }
        if !in_progress.insert(asn) {
            warn!("{}", SimError::TracebackCycle { asn });
            return Outcomes::Disconnected;
        }

        let outcome = self.trace_uncached(root_asn, asn, cache, in_progress);
        in_progress.remove(&asn);
        cache.insert(asn, outcome);
        outcome
    }

    fn trace_uncached(
        &self,
        root_asn: ASN,
        asn: ASN,
        cache: &mut HashMap<ASN, Outcomes>,
        in_progress: &mut HashSet<ASN>,
    ) -> Outcomes {
        let ann = match self.most_specific_ann(asn) {
            None => return Outcomes::Disconnected,
            Some(ann) => ann.clone(),
        };

        if ann.as_path.len() <= 1 || ann.recv_relationship == Relationships::Origin || ann.traceback_end {
            return Outcomes::Disconnected;
        }

        let next_hop_asn = ann.as_path[1];

        if self.sav_kind != SavKind::None {
            let Some(next_policy) = self.engine.policies.get(&next_hop_asn) else {
                return Outcomes::Disconnected;
            };
            let interface = self
                .engine
                .as_graph
                .get(&next_hop_asn)
                .and_then(|a| a.relationship_with(asn))
                .unwrap_or(Relationships::Peers);

            let accepted = match self.sav_kind {
                SavKind::None => true,
                SavKind::Strict => sav::strict_urpf(next_policy, &ann.prefix, asn, interface),
                SavKind::FeasiblePath => {
                    let root_origin = self.most_specific_ann(root_asn).map(|a| a.origin_asn()).unwrap_or(root_asn);
                    sav::feasible_path_urpf(next_policy, root_origin, asn, interface)
                }
            };
            if !accepted {
                return Outcomes::Disconnected;
            }
        }

        self.trace(root_asn, next_hop_asn, cache, in_progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announcement::Announcement;
    use crate::as_graph::{ASGraph, AS};
    use crate::shared::Timestamps;
    use ipnetwork::IpNetwork;
    use std::str::FromStr;

    // AS1 (tier-1) -- provider of --> AS2 -- provider of --> AS3 (victim)
    fn linear_graph() -> ASGraph {
        let mut graph = ASGraph::new();
        let mut as1 = AS::new(1);
        as1.customers.push(2);
        as1.tier_1 = true;
        let mut as2 = AS::new(2);
        as2.providers.push(1);
        as2.customers.push(3);
        let mut as3 = AS::new(3);
        as3.providers.push(2);
        graph.insert(as1);
        graph.insert(as2);
        graph.insert(as3);
        graph.assign_as_propagation_rank();
        graph.add_provider_cone_asns();
        graph
    }

    #[test]
    fn victim_success_propagates_to_every_as() {
        let graph = linear_graph();
        let mut engine = SimulationEngine::new(graph);
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();
        let seed = Announcement::new_seed(prefix, 3, Timestamps::Victim);
        engine.seed(3, &seed).unwrap();
        engine.run(10).unwrap();

        let analyzer = OutcomeAnalyzer::new(
            &engine,
            HashSet::new(),
            HashSet::from([3]),
            vec![prefix],
            SavKind::None,
        );

        let data_plane = analyzer.data_plane_outcomes();
        assert_eq!(data_plane[&1], Outcomes::VictimSuccess);
        assert_eq!(data_plane[&2], Outcomes::VictimSuccess);
        assert_eq!(data_plane[&3], Outcomes::VictimSuccess);

        let control_plane = analyzer.control_plane_outcomes();
        assert_eq!(control_plane[&1], Outcomes::VictimSuccess);
    }

    #[test]
    fn disconnected_when_no_route() {
        let graph = linear_graph();
        let engine = SimulationEngine::new(graph);
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();

        let analyzer = OutcomeAnalyzer::new(
            &engine,
            HashSet::new(),
            HashSet::from([3]),
            vec![prefix],
            SavKind::None,
        );

        assert_eq!(analyzer.data_plane_outcomes()[&1], Outcomes::Disconnected);
    }
}
