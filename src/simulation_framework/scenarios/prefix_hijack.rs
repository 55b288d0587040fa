//! Prefix hijack (spec.md §8, scenario 2): attacker and victim originate the
//! *same* prefix. Which one each AS ends up routing toward depends purely on
//! Gao-Rexford ranking and whichever security extensions that AS has
//! adopted — no subprefix trick involved.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use ipnetwork::IpNetwork;

use crate::announcement::{Announcement, Prefix};
use crate::as_graph::{ASGraph, ASN};
use crate::engine::SimulationEngine;
use crate::error::SimResult;
use crate::route_validator::ROA;
use crate::shared::Timestamps;

use super::super::scenario::{Scenario, ScenarioTrait};
use super::super::scenario_config::ScenarioConfig;

pub struct PrefixHijack {
    base: Scenario,
    prefix: Prefix,
}

impl PrefixHijack {
    pub fn new(config: ScenarioConfig, as_graph: &ASGraph, percent_ases_randomly_adopting: f64) -> Self {
        let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();
        PrefixHijack {
            base: Scenario::new(config, as_graph, percent_ases_randomly_adopting),
            prefix,
        }
    }
}

impl ScenarioTrait for PrefixHijack {
    fn name(&self) -> &str {
        "PrefixHijack"
    }

    fn get_attacker_asns(&self, _as_graph: &ASGraph) -> HashSet<ASN> {
        self.base.attacker_asns.clone()
    }

    fn get_victim_asns(&self, _as_graph: &ASGraph) -> HashSet<ASN> {
        self.base.victim_asns.clone()
    }

    fn get_seed_asn_ann_dict(&self, _as_graph: &ASGraph) -> HashMap<ASN, Vec<Announcement>> {
        let mut seed_dict = HashMap::new();
        for &asn in &self.base.victim_asns {
            seed_dict.insert(asn, vec![Announcement::new_seed(self.prefix, asn, Timestamps::Victim)]);
        }
        for &asn in &self.base.attacker_asns {
            seed_dict.insert(asn, vec![Announcement::new_seed(self.prefix, asn, Timestamps::Attacker)]);
        }
        seed_dict
    }

    fn get_roas(&self, _as_graph: &ASGraph) -> Vec<ROA> {
        self.base
            .victim_asns
            .iter()
            .map(|&asn| ROA::new(self.prefix, asn, None))
            .collect()
    }

    fn get_prefixes_most_specific_first(&self) -> Vec<Prefix> {
        vec![self.prefix]
    }

    fn setup_engine(
        &self,
        engine: &mut SimulationEngine,
        _percent_adopt: f64,
        _prev_scenario: Option<&dyn ScenarioTrait>,
    ) -> SimResult<()> {
        let seed_dict = self.get_seed_asn_ann_dict(&engine.as_graph);
        let roas = self.get_roas(&engine.as_graph);
        self.base.apply_default_setup(engine, &seed_dict, &roas)
    }

    fn is_successful(&self, engine: &SimulationEngine) -> bool {
        let snapshot = engine.local_rib_snapshot(&self.prefix);
        snapshot
            .values()
            .any(|ann| self.base.attacker_asns.contains(&ann.origin_asn()))
    }
}
