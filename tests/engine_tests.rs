use bgp_route_sim::as_graph::{ASGraph, AS};
use bgp_route_sim::policy::PolicyKind;
use bgp_route_sim::security::SecurityProfile;
use bgp_route_sim::{Announcement, SimulationEngine, Timestamps};

/// AS1 (tier-1) has customers AS2, AS3; AS2 has customer AS4.
///
///      AS1
///     /   \
///   AS2   AS3
///    |
///   AS4
fn simple_graph() -> ASGraph {
    let mut as1 = AS::new(1);
    as1.tier_1 = true;
    as1.customers.extend([2, 3]);

    let mut as2 = AS::new(2);
    as2.providers.push(1);
    as2.customers.push(4);

    let mut as3 = AS::new(3);
    as3.providers.push(1);

    let mut as4 = AS::new(4);
    as4.providers.push(2);

    let mut graph = ASGraph::new();
    graph.insert(as1);
    graph.insert(as2);
    graph.insert(as3);
    graph.insert(as4);
    graph.check_for_cycles().expect("no cycles");
    graph.assign_as_propagation_rank();
    graph.add_provider_cone_asns();
    graph
}

/// AS2 and AS3 peer with each other, both are customers of tier-1 AS1, and
/// both are providers of AS4.
fn diamond_graph() -> ASGraph {
    let mut as1 = AS::new(1);
    as1.tier_1 = true;
    as1.customers.extend([2, 3]);

    let mut as2 = AS::new(2);
    as2.providers.push(1);
    as2.peers.push(3);
    as2.customers.push(4);

    let mut as3 = AS::new(3);
    as3.providers.push(1);
    as3.peers.push(2);
    as3.customers.push(4);

    let mut as4 = AS::new(4);
    as4.providers.extend([2, 3]);

    let mut graph = ASGraph::new();
    graph.insert(as1);
    graph.insert(as2);
    graph.insert(as3);
    graph.insert(as4);
    graph.check_for_cycles().expect("no cycles");
    graph.assign_as_propagation_rank();
    graph.add_provider_cone_asns();
    graph
}

#[test]
fn test_basic_propagation() {
    let as_graph = simple_graph();
    let mut engine = SimulationEngine::new(as_graph);

    let prefix = "10.0.0.0/24".parse().unwrap();
    let ann = Announcement::new_seed(prefix, 4, Timestamps::Victim);
    engine.seed(4, &ann).unwrap();
    engine.run(5).unwrap();

    let snapshot = engine.local_rib_snapshot(&prefix);

    assert_eq!(snapshot[&4].as_path, vec![4]);
    assert_eq!(snapshot[&2].as_path, vec![2, 4]);
    assert_eq!(snapshot[&1].as_path, vec![1, 2, 4]);
    assert_eq!(snapshot[&3].as_path, vec![3, 1, 2, 4]);
}

#[test]
fn test_loop_prevention() {
    let as_graph = simple_graph();
    let mut engine = SimulationEngine::new(as_graph);

    let prefix = "10.0.0.0/24".parse().unwrap();
    let mut ann = Announcement::new_seed(prefix, 1, Timestamps::Victim);
    // AS 3 already appears in the path, so it must refuse re-advertising it.
    ann.as_path = vec![1, 3];
    ann.next_hop_asn = 1;
    engine.seed(1, &ann).unwrap();
    engine.run(5).unwrap();

    let snapshot = engine.local_rib_snapshot(&prefix);

    assert!(snapshot.contains_key(&1));
    assert!(snapshot.contains_key(&2));
    assert!(!snapshot.contains_key(&3));
}

#[test]
fn test_gao_rexford_prefers_customer_over_peer() {
    let as_graph = diamond_graph();
    let mut engine = SimulationEngine::new(as_graph);

    // AS 2 originates; AS 3 learns it both from its peer AS 2 directly and
    // (after AS 1 re-advertises it down) from its provider AS 1. The peer
    // route must win.
    let prefix = "20.0.0.0/24".parse().unwrap();
    let ann = Announcement::new_seed(prefix, 2, Timestamps::Victim);
    engine.seed(2, &ann).unwrap();
    engine.run(5).unwrap();

    let snapshot = engine.local_rib_snapshot(&prefix);

    assert!(snapshot.contains_key(&1));
    assert_eq!(snapshot[&3].as_path, vec![3, 2]);
    assert_eq!(snapshot[&4].as_path, vec![4, 2]);
}

#[test]
fn test_withdrawal_clears_every_rib() {
    let as_graph = simple_graph();
    let mut engine = SimulationEngine::new(as_graph);
    for asn in [1u32, 2, 3, 4] {
        engine.assign_settings(asn, PolicyKind::Full, SecurityProfile::none());
    }

    let prefix = "10.0.0.0/24".parse().unwrap();
    let ann = Announcement::new_seed(prefix, 4, Timestamps::Victim);
    engine.seed(4, &ann).unwrap();
    engine.run(5).unwrap();
    assert_eq!(engine.local_rib_snapshot(&prefix).len(), 4);

    // The origin retracts its own route; every downstream AS must follow.
    engine.policies.get_mut(&4).unwrap().local_rib.remove(&prefix);
    engine.run(5).unwrap();

    assert!(engine.local_rib_snapshot(&prefix).is_empty());
}
