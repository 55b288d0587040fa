//! Experiment driver (C13, ambient — spec.md §1 calls "experiment drivers
//! that iterate adoption percentages and trials" out of scope for the hard
//! kernel, so this stays a thin wrapper around `SimulationEngine` and
//! `OutcomeAnalyzer`). Grounded on `simulation_framework/simulation.rs` in
//! the teacher: same adoption-percentage/trial-count sweep shape, same
//! `indicatif` progress bar, same per-percentage/per-summary JSON output via
//! `DataTracker`.

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use crate::analyzer::OutcomeAnalyzer;
use crate::as_graph::ASGraph;
use crate::engine::SimulationEngine;
use crate::sav::SavKind;
use crate::shared::{Outcomes, Settings};

use super::data_tracker::{DataTracker, SimulationSummary};
use super::scenario::ScenarioTrait;
use super::scenario_config::ScenarioConfig;
use super::scenarios::{LegitimatePrefixOnly, PrefixHijack, SubprefixHijack};

/// Sweeps one or more scenario configurations across a range of adoption
/// percentages, running `num_trials` independent trials at each point across
/// a `num_cpus`-sized worker pool (spec.md §5, "trials are embarrassingly
/// parallel and partitioned into chunks processed by a worker pool"). Each
/// trial builds its own fresh `SimulationEngine` and `Scenario`, so chunk
/// boundaries and worker count never change a trial's outcome.
pub struct Simulation {
    pub output_dir: PathBuf,
    pub percent_ases_randomly_adopting: Vec<f64>,
    pub scenario_configs: Vec<ScenarioConfig>,
    pub num_trials: usize,
    pub max_rounds: u32,
    pub as_graph: ASGraph,
}

impl Simulation {
    pub fn new(as_graph: ASGraph) -> Self {
        let output_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bgp_route_sim_runs");

        Simulation {
            output_dir,
            percent_ases_randomly_adopting: vec![10.0, 20.0, 50.0, 80.0, 99.0],
            scenario_configs: vec![ScenarioConfig::new(
                "Subprefix Hijack; ROV Adopting".to_string(),
                "SubprefixHijack".to_string(),
            )
            .with_adoption_setting(Settings::Rov, true)],
            num_trials: 10,
            max_rounds: 100,
            as_graph,
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_adoption_percentages(mut self, percentages: Vec<f64>) -> Self {
        self.percent_ases_randomly_adopting = percentages;
        self
    }

    pub fn with_scenario_configs(mut self, configs: Vec<ScenarioConfig>) -> Self {
        self.scenario_configs = configs;
        self
    }

    pub fn with_num_trials(mut self, trials: usize) -> Self {
        self.num_trials = trials;
        self
    }

    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("running BGP simulations; output directory {:?}", self.output_dir);
        std::fs::create_dir_all(&self.output_dir)?;

        let start_time = Instant::now();
        for scenario_config in &self.scenario_configs {
            log::info!("running scenario: {}", scenario_config.label);
            self.run_scenario(scenario_config)?;
        }

        log::info!("simulation complete in {:.2}s", start_time.elapsed().as_secs_f64());
        Ok(())
    }

    fn run_scenario(&self, scenario_config: &ScenarioConfig) -> Result<(), Box<dyn std::error::Error>> {
        let mut summary = SimulationSummary::new(scenario_config.label.clone());

        for &percent in &self.percent_ases_randomly_adopting {
            let tracker = self.run_trials_for_percentage(scenario_config, percent)?;
            let success_rate = tracker.success_rate();
            log::info!("  {}% adoption -> {:.2}% attacker success", percent, success_rate);
            summary.add_data_point(percent, success_rate);
            tracker.save_to_file(&self.output_dir)?;
        }

        summary.save_to_file(&self.output_dir)?;
        Ok(())
    }

    /// Partitions `num_trials` independent trials across a `num_cpus`-sized
    /// worker pool (spec.md §5, "trials are embarrassingly parallel and
    /// partitioned into chunks processed by a worker pool"). Each worker
    /// builds its own `SimulationEngine`/`Scenario` per trial — nothing is
    /// shared across threads but `self` (read-only: the template
    /// `ASGraph`, cloned fresh inside every `run_single_trial` call) — so
    /// chunk boundaries never affect which outcome a given trial produces,
    /// matching the "worker count must not affect per-trial results"
    /// ordering guarantee.
    fn run_trials_for_percentage(
        &self,
        scenario_config: &ScenarioConfig,
        percent: f64,
    ) -> Result<DataTracker, Box<dyn std::error::Error>> {
        let mut tracker = DataTracker::new(scenario_config.label.clone(), percent);

        let pb = ProgressBar::new(self.num_trials as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} trials")?
                .progress_chars("##-"),
        );

        let num_workers = num_cpus::get().max(1).min(self.num_trials.max(1));
        let base = self.num_trials / num_workers;
        let extra = self.num_trials % num_workers;

        let outcomes: Vec<Outcomes> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..num_workers)
                .map(|worker| {
                    let share = base + usize::from(worker < extra);
                    scope.spawn(move || {
                        let mut results = Vec::with_capacity(share);
                        for _ in 0..share {
                            if let Ok(outcome) = self.run_single_trial(scenario_config, percent) {
                                results.push(outcome);
                            }
                        }
                        results
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| handle.join().expect("trial worker panicked"))
                .collect()
        });

        for outcome in outcomes {
            pb.inc(1);
            tracker.add_outcome(outcome);
        }
        pb.finish();

        Ok(tracker)
    }

    /// Builds the concrete `Scenario` named by `scenario_config.scenario_name`,
    /// seeds a fresh engine, runs it to convergence, and classifies the
    /// attacker's own data-plane outcome (spec.md §4.8) as this trial's
    /// result.
    fn run_single_trial(
        &self,
        scenario_config: &ScenarioConfig,
        percent_adopt: f64,
    ) -> Result<Outcomes, Box<dyn std::error::Error>> {
        let scenario = self.build_scenario(scenario_config, percent_adopt)?;
        let mut engine = SimulationEngine::new(self.as_graph.clone());
        scenario.setup_engine(&mut engine, percent_adopt, None)?;
        scenario.pre_aspa_check(&mut engine);
        engine.run(self.max_rounds)?;

        let attacker_asns = scenario.get_attacker_asns(&engine.as_graph);
        let analyzer = OutcomeAnalyzer::new(
            &engine,
            attacker_asns.clone(),
            scenario.get_victim_asns(&engine.as_graph),
            scenario.get_prefixes_most_specific_first(),
            SavKind::None,
        );

        let data_plane = analyzer.data_plane_outcomes();
        let outcome = attacker_asns
            .iter()
            .find_map(|asn| data_plane.get(asn).copied())
            .unwrap_or(Outcomes::Disconnected);
        Ok(outcome)
    }

    fn build_scenario(
        &self,
        scenario_config: &ScenarioConfig,
        percent_adopt: f64,
    ) -> Result<Box<dyn ScenarioTrait>, Box<dyn std::error::Error>> {
        let scenario: Box<dyn ScenarioTrait> = match scenario_config.scenario_name.as_str() {
            "SubprefixHijack" => Box::new(SubprefixHijack::new(scenario_config.clone(), &self.as_graph, percent_adopt)),
            "PrefixHijack" => Box::new(PrefixHijack::new(scenario_config.clone(), &self.as_graph, percent_adopt)),
            "LegitimatePrefixOnly" => {
                Box::new(LegitimatePrefixOnly::new(scenario_config.clone(), &self.as_graph, percent_adopt))
            }
            other => return Err(format!("unknown scenario: {other}").into()),
        };
        Ok(scenario)
    }
}
