//! Single-run demo driver (C13, ambient). Grounded on
//! `engine_runner/engine_runner.rs` in the teacher: a named run gets its own
//! storage directory under `base_dir`, writes its outcome guess and config
//! as JSON, and optionally checks itself against a stored ground truth.
//! Per SPEC_FULL.md §13 this stays intentionally small — it is a demo
//! harness around the real kernel (`engine`, `analyzer`), not part of it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::analyzer::OutcomeAnalyzer;
use crate::announcement::Prefix;
use crate::as_graph::ASN;
use crate::engine::SimulationEngine;
use crate::sav::SavKind;
use crate::shared::Outcomes;
use crate::simulation_framework::scenario::ScenarioTrait;
use crate::simulation_framework::scenarios::{LegitimatePrefixOnly, PrefixHijack, SubprefixHijack};

use super::engine_run_config::EngineRunConfig;

pub struct EngineRunner {
    pub config: EngineRunConfig,
    pub base_dir: PathBuf,
    pub overwrite: bool,
    pub compare_against_ground_truth: bool,
    pub max_rounds: u32,
    pub storage_dir: PathBuf,
}

impl EngineRunner {
    pub fn new(config: EngineRunConfig) -> Self {
        let base_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bgp_route_sim_engine_runs");

        let storage_dir = base_dir.join(&config.name);

        EngineRunner {
            config,
            base_dir,
            overwrite: false,
            compare_against_ground_truth: false,
            max_rounds: 100,
            storage_dir,
        }
    }

    pub fn with_base_dir(mut self, dir: PathBuf) -> Self {
        self.base_dir = dir;
        self.storage_dir = self.base_dir.join(&self.config.name);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_compare_against_ground_truth(mut self, compare: bool) -> Self {
        self.compare_against_ground_truth = compare;
        self
    }

    pub fn run(&self) -> Result<HashMap<ASN, Outcomes>, Box<dyn std::error::Error>> {
        if self.storage_dir.exists() && !self.overwrite {
            return Err(format!("run directory {:?} already exists", self.storage_dir).into());
        }
        fs::create_dir_all(&self.storage_dir)?;

        let (mut engine, scenario) = self.build_engine_and_scenario()?;
        engine.run(self.max_rounds)?;

        let outcomes = self.data_plane_outcomes(&engine, scenario.as_ref());
        self.store_data(&engine, &outcomes)?;

        if self.compare_against_ground_truth {
            self.check_ground_truth(&outcomes)?;
        }

        Ok(outcomes)
    }

    fn build_engine_and_scenario(
        &self,
    ) -> Result<(SimulationEngine, Box<dyn ScenarioTrait>), Box<dyn std::error::Error>> {
        let mut engine = SimulationEngine::new(self.config.as_graph.clone());

        let scenario: Box<dyn ScenarioTrait> = match self.config.scenario_config.scenario_name.as_str() {
            "SubprefixHijack" => Box::new(SubprefixHijack::new(
                self.config.scenario_config.clone(),
                &self.config.as_graph,
                0.0,
            )),
            "PrefixHijack" => Box::new(PrefixHijack::new(
                self.config.scenario_config.clone(),
                &self.config.as_graph,
                0.0,
            )),
            "LegitimatePrefixOnly" => Box::new(LegitimatePrefixOnly::new(
                self.config.scenario_config.clone(),
                &self.config.as_graph,
                0.0,
            )),
            other => return Err(format!("unknown scenario: {other}").into()),
        };

        scenario.setup_engine(&mut engine, 0.0, None)?;
        scenario.pre_aspa_check(&mut engine);

        Ok((engine, scenario))
    }

    fn data_plane_outcomes(&self, engine: &SimulationEngine, scenario: &dyn ScenarioTrait) -> HashMap<ASN, Outcomes> {
        let attacker_asns = scenario.get_attacker_asns(&engine.as_graph);
        let victim_asns = scenario.get_victim_asns(&engine.as_graph);
        let prefixes: Vec<Prefix> = scenario.get_prefixes_most_specific_first();

        let analyzer = OutcomeAnalyzer::new(engine, attacker_asns, victim_asns, prefixes, SavKind::None);
        analyzer.data_plane_outcomes()
    }

    fn store_data(&self, engine: &SimulationEngine, outcomes: &HashMap<ASN, Outcomes>) -> Result<(), Box<dyn std::error::Error>> {
        let engine_path = self.storage_dir.join("engine_guess.json");
        let engine_json = serde_json::json!({
            "as_graph_size": engine.as_graph.len(),
            "policy_count": engine.policies.len(),
        });
        fs::write(engine_path, serde_json::to_string_pretty(&engine_json)?)?;

        let outcomes_path = self.storage_dir.join("outcomes_guess.json");
        fs::write(outcomes_path, serde_json::to_string_pretty(outcomes)?)?;

        let config_path = self.storage_dir.join("config.json");
        fs::write(config_path, serde_json::to_string_pretty(&self.config.to_json())?)?;

        Ok(())
    }

    /// Compares this run's guessed outcomes against a `ground_truth.json`
    /// file in the storage directory, if one was placed there beforehand.
    /// Used by the demo binary to sanity-check a known scenario; there is
    /// nothing to compare against on a first run, so a missing file is not
    /// an error.
    fn check_ground_truth(&self, outcomes: &HashMap<ASN, Outcomes>) -> Result<(), Box<dyn std::error::Error>> {
        let ground_truth_path = self.storage_dir.join("ground_truth.json");
        if !ground_truth_path.exists() {
            log::warn!("no ground_truth.json in {:?}, skipping comparison", self.storage_dir);
            return Ok(());
        }

        let contents = fs::read_to_string(&ground_truth_path)?;
        let expected: HashMap<ASN, Outcomes> = serde_json::from_str(&contents)?;

        let mut mismatches = 0;
        for (asn, expected_outcome) in &expected {
            match outcomes.get(asn) {
                Some(actual) if actual == expected_outcome => {}
                Some(actual) => {
                    mismatches += 1;
                    log::warn!("AS{asn}: expected {expected_outcome:?}, got {actual:?}");
                }
                None => {
                    mismatches += 1;
                    log::warn!("AS{asn}: expected {expected_outcome:?}, got no outcome");
                }
            }
        }

        if mismatches > 0 {
            return Err(format!("{mismatches} outcome mismatches against ground truth").into());
        }
        Ok(())
    }
}
