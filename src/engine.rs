//! The propagation scheduler (C6). Grounded on `simulation_engine/engine.rs`
//! in the teacher, rewritten around the new `Policy`/`ASGraph` foundation:
//! three directional phases per round (customers exporting to providers,
//! peers exporting to peers, providers exporting to customers), repeated
//! until a full sweep produces no activity or `max_rounds` is hit.

use std::collections::HashMap;

use log::warn;

use crate::announcement::Announcement;
use crate::as_graph::{ASGraph, ASN};
use crate::error::{SimError, SimResult};
use crate::policy::{Policy, PolicyKind};
use crate::route_validator::RouteValidator;
use crate::security::SecurityProfile;
use crate::shared::Relationships;

/// Owns the whole simulated network for one trial: the topology, the shared
/// route validator (ROA trie + LRU cache, C11), and one `Policy` per AS.
pub struct SimulationEngine {
    pub as_graph: ASGraph,
    pub route_validator: RouteValidator,
    pub policies: HashMap<ASN, Policy>,
}

impl SimulationEngine {
    /// Builds a fresh engine over `as_graph` with every AS defaulted to
    /// plain BGP-Simple (no security extensions) — callers adopt extensions
    /// per-AS afterward via `assign_settings`, matching how a `Scenario`
    /// assigns adoption (spec.md §4.7).
    pub fn new(as_graph: ASGraph) -> Self {
        let policies = as_graph
            .iter()
            .map(|as_obj| {
                (
                    as_obj.asn,
                    Policy::new(as_obj.asn, PolicyKind::Simple, SecurityProfile::none()),
                )
            })
            .collect();

        SimulationEngine {
            as_graph,
            route_validator: RouteValidator::new(),
            policies,
        }
    }

    /// Re-creates `asn`'s policy under a new `PolicyKind`/`SecurityProfile`,
    /// discarding any RIB state it had accumulated so far. Scenarios call
    /// this once, before seeding, to assign adoption (spec.md §4.7).
    pub fn assign_settings(&mut self, asn: ASN, kind: PolicyKind, security_profile: SecurityProfile) {
        self.policies.insert(asn, Policy::new(asn, kind, security_profile));
    }

    /// Installs a scenario-injected announcement as `asn`'s own LocalRIB
    /// entry, ready to be exported on the next `run`.
    pub fn seed(&mut self, asn: ASN, ann: &Announcement) -> SimResult<()> {
        let policy = self
            .policies
            .get_mut(&asn)
            .ok_or_else(|| SimError::ConfigError(format!("seed: AS {asn} is not in this graph")))?;
        policy.seed(ann);
        Ok(())
    }

    /// Runs propagation sweeps until one produces no activity (convergence)
    /// or `max_rounds` is reached. A stalled sweep at the cap is logged via
    /// `log::warn!` rather than returned as an error (spec.md §7's
    /// `ConvergenceWarning` is diagnostic, not fatal — partial propagation is
    /// still a valid, analyzable outcome).
    pub fn run(&mut self, max_rounds: u32) -> SimResult<()> {
        for _round in 0..max_rounds {
            if !self.sweep()? {
                return Ok(());
            }
        }
        warn!("{}", SimError::ConvergenceWarning { rounds: max_rounds });
        Ok(())
    }

    /// One full three-phase sweep (spec.md §4.6). Returns whether any
    /// announcement or withdrawal was actually delivered.
    fn sweep(&mut self) -> SimResult<bool> {
        let mut activity = false;
        activity |= self.propagate_phase(Relationships::Providers, true)?;
        activity |= self.propagate_phase(Relationships::Peers, false)?;
        activity |= self.propagate_phase(Relationships::Customers, false)?;
        Ok(activity)
    }

    /// Exports every policy's current best routes toward its neighbors of
    /// `export_relationship`, then delivers everything queued. `ascending`
    /// selects the cone-size order the iteration visits ASes in — ascending
    /// for the customer->provider phase (leaves first), descending for
    /// provider->customer (core first) — per spec.md §4.6; peer->peer order
    /// is unconstrained and reuses the ascending order for determinism.
    fn propagate_phase(&mut self, export_relationship: Relationships, ascending: bool) -> SimResult<bool> {
        let order = self.cone_ordered_asns(ascending);

        for &asn in &order {
            if let Some(policy) = self.policies.get_mut(&asn) {
                policy.propagate_to(&self.as_graph, export_relationship)?;
            }
        }

        let mut activity = false;
        for &exporter_asn in &order {
            let neighbor_asns = match self.as_graph.get(&exporter_asn) {
                Some(as_obj) => as_obj.get_neighbors(export_relationship).to_vec(),
                None => continue,
            };
            for neighbor_asn in neighbor_asns {
                let drained = match self.policies.get_mut(&exporter_asn) {
                    Some(policy) => policy.drain_to(neighbor_asn),
                    None => continue,
                };
                for send_info in drained {
                    if let Some(ann) = send_info.ann {
                        activity = true;
                        self.deliver(exporter_asn, neighbor_asn, ann);
                    }
                    if let Some(withdrawal) = send_info.withdrawal_ann {
                        activity = true;
                        self.deliver(exporter_asn, neighbor_asn, withdrawal);
                    }
                }
            }
        }

        Ok(activity)
    }

    fn deliver(&mut self, from_asn: ASN, to_asn: ASN, ann: Announcement) {
        if let Some(policy) = self.policies.get_mut(&to_asn) {
            policy.process_incoming(from_asn, ann, &self.as_graph, &self.route_validator);
        }
    }

    fn cone_ordered_asns(&self, ascending: bool) -> Vec<ASN> {
        let mut asns: Vec<ASN> = self.as_graph.iter().map(|a| a.asn).collect();
        asns.sort_by_key(|asn| {
            self.as_graph
                .get(asn)
                .map(|a| a.provider_cone_asns.len())
                .unwrap_or(0)
        });
        if !ascending {
            asns.reverse();
        }
        asns
    }

    /// Snapshot of every AS's current best route for `prefix`, keyed by ASN.
    /// Used by the outcome analyzer (C8) and by tests.
    pub fn local_rib_snapshot(&self, prefix: &crate::announcement::Prefix) -> HashMap<ASN, Announcement> {
        self.policies
            .iter()
            .filter_map(|(asn, policy)| policy.local_rib.get(prefix).map(|ann| (*asn, ann.clone())))
            .collect()
    }
}
