//! Small CLI demo (C13). Grounded on the teacher's `main.rs`: build a toy AS
//! topology, seed an announcement or two, run the engine to convergence,
//! and print the resulting routing/outcome state. Not part of the library's
//! public contract, just a way to exercise it end to end.

use std::collections::HashSet;
use std::str::FromStr;

use ipnetwork::IpNetwork;

use bgp_route_sim::{
    Announcement, ASGraph, CommonASNs, OutcomeAnalyzer, PolicyKind, Prefix, SavKind,
    SecurityProfile, SimulationEngine, Timestamps, AS,
};

fn main() {
    env_logger::init();

    println!("BGP route simulator\n");

    run_simple_propagation_example();
    println!("\n{}\n", "=".repeat(80));
    run_hijack_scenario_example();
    println!("\n{}\n", "=".repeat(80));
    run_defense_scenario_example();
}

/// Example 1: a three-hop provider chain with a single origin, no security.
fn run_simple_propagation_example() {
    println!("Example 1: simple propagation");
    println!("------------------------------");

    let as_graph = simple_chain_topology();
    let mut engine = SimulationEngine::new(as_graph);

    let prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();
    let ann = Announcement::new_seed(prefix, 65003, Timestamps::Victim);
    engine.seed(65003, &ann).expect("65003 is in the graph");

    println!("\nrunning to convergence (cap 5 rounds)...");
    engine.run(5).expect("engine run");

    println!("\nfinal routing state:");
    for (asn, ann) in engine.local_rib_snapshot(&prefix) {
        println!("  AS{asn}: {} via {:?}", ann.prefix, ann.as_path);
    }
}

/// Example 2: subprefix hijack with no defenses adopted anywhere.
fn run_hijack_scenario_example() {
    println!("Example 2: subprefix hijack (no defenses)");
    println!("------------------------------------------");

    let as_graph = attack_topology();
    let (legitimate_prefix, hijacked_prefix, mut engine) = seed_hijack(as_graph, &[]);

    engine.run(10).expect("engine run");
    report_attack_outcome(&engine, legitimate_prefix, hijacked_prefix);
}

/// Example 3: the same attack with ROV adopted on half the network.
fn run_defense_scenario_example() {
    println!("Example 3: subprefix hijack with ROV adoption");
    println!("------------------------------------------------------");

    let as_graph = attack_topology();
    let mut all_asns: Vec<u32> = as_graph.iter().map(|as_obj| as_obj.asn).collect();
    all_asns.sort_unstable();
    let adopting: Vec<u32> = all_asns.iter().take(all_asns.len() / 2).copied().collect();

    println!(
        "\nenabling ROV for {} out of {} ASes",
        adopting.len(),
        all_asns.len()
    );

    let (legitimate_prefix, hijacked_prefix, mut engine) = seed_hijack(as_graph, &adopting);
    engine.run(10).expect("engine run");
    report_attack_outcome(&engine, legitimate_prefix, hijacked_prefix);
}

fn seed_hijack(as_graph: ASGraph, rov_adopters: &[u32]) -> (Prefix, Prefix, SimulationEngine) {
    let mut engine = SimulationEngine::new(as_graph);

    for &asn in rov_adopters {
        let mut profile = SecurityProfile::none();
        profile.rov = true;
        engine.assign_settings(asn, PolicyKind::Simple, profile);
    }

    if !rov_adopters.is_empty() {
        engine.route_validator.add_roa(bgp_route_sim::ROA::new(
            IpNetwork::from_str("10.0.0.0/24").unwrap(),
            CommonASNs::VICTIM,
            Some(24),
        ));
    }

    let legitimate_prefix = IpNetwork::from_str("10.0.0.0/24").unwrap();
    let hijacked_prefix = IpNetwork::from_str("10.0.0.0/25").unwrap();

    let legitimate_ann = Announcement::new_seed(legitimate_prefix, CommonASNs::VICTIM, Timestamps::Victim);
    let hijack_ann = Announcement::new_seed(hijacked_prefix, CommonASNs::ATTACKER, Timestamps::Attacker);

    engine.seed(CommonASNs::VICTIM, &legitimate_ann).expect("victim is in the graph");
    engine.seed(CommonASNs::ATTACKER, &hijack_ann).expect("attacker is in the graph");

    println!(
        "\nvictim AS{} announces {}, attacker AS{} announces {} (more specific)",
        CommonASNs::VICTIM,
        legitimate_prefix,
        CommonASNs::ATTACKER,
        hijacked_prefix
    );

    (legitimate_prefix, hijacked_prefix, engine)
}

fn report_attack_outcome(engine: &SimulationEngine, legitimate_prefix: Prefix, hijacked_prefix: Prefix) {
    let attacker_asns: HashSet<u32> = [CommonASNs::ATTACKER].into_iter().collect();
    let victim_asns: HashSet<u32> = [CommonASNs::VICTIM].into_iter().collect();

    let analyzer = OutcomeAnalyzer::new(
        engine,
        attacker_asns,
        victim_asns,
        vec![hijacked_prefix, legitimate_prefix],
        SavKind::None,
    );

    let outcomes = analyzer.data_plane_outcomes();
    let attacker_wins = outcomes
        .values()
        .filter(|outcome| **outcome == bgp_route_sim::Outcomes::AttackerSuccess)
        .count();
    let victim_wins = outcomes
        .values()
        .filter(|outcome| **outcome == bgp_route_sim::Outcomes::VictimSuccess)
        .count();

    println!("\nASes tracing back to attacker: {attacker_wins}");
    println!("ASes tracing back to victim: {victim_wins}");
    println!(
        "attacker success rate: {:.1}%",
        attacker_wins as f64 / (attacker_wins + victim_wins).max(1) as f64 * 100.0
    );
}

fn simple_chain_topology() -> ASGraph {
    let mut as1 = AS::new(65001);
    as1.tier_1 = true;
    as1.customers.push(65002);

    let mut as2 = AS::new(65002);
    as2.providers.push(65001);
    as2.customers.push(65003);

    let mut as3 = AS::new(65003);
    as3.providers.push(65002);

    let mut graph = ASGraph::new();
    graph.insert(as1);
    graph.insert(as2);
    graph.insert(as3);
    graph.check_for_cycles().expect("no cycles in a three-AS chain");
    graph.assign_as_propagation_rank();
    graph.add_provider_cone_asns();
    graph.add_asn_groups();
    graph
}

/// Victim and attacker each dual-homed to two of eight upstream ASes, which
/// in turn connect through two Tier-1s. Mirrors the teacher's toy attack
/// topology used across its own examples and tests.
fn attack_topology() -> ASGraph {
    let mut graph = ASGraph::new();

    let mut victim = AS::new(CommonASNs::VICTIM);
    victim.providers.push(1);
    victim.providers.push(2);
    graph.insert(victim);

    let mut attacker = AS::new(CommonASNs::ATTACKER);
    attacker.providers.push(3);
    attacker.providers.push(4);
    graph.insert(attacker);

    for asn in 1..=10u32 {
        let mut as_obj = AS::new(asn);
        if asn <= 4 {
            as_obj.providers.push(asn + 4);
        } else {
            as_obj.tier_1 = true;
        }
        match asn {
            1 | 2 => as_obj.customers.push(CommonASNs::VICTIM),
            3 | 4 => as_obj.customers.push(CommonASNs::ATTACKER),
            5 => as_obj.customers.extend([1, 3]),
            6 => as_obj.customers.extend([2, 4]),
            7 => as_obj.customers.extend([1, 2]),
            8 => as_obj.customers.extend([3, 4]),
            _ => {}
        }
        graph.insert(as_obj);
    }

    graph.check_for_cycles().expect("no cycles in the attack topology");
    graph.assign_as_propagation_rank();
    graph.add_provider_cone_asns();
    graph.add_asn_groups();
    graph
}
