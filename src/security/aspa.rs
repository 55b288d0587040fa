//! ASPA (AS Provider Authorization), grounded on `policy_extensions/aspa.rs`
//! in the teacher (which stubbed the graph-dependent checks with `TODO`s —
//! this is the filled-in version). Walks the path from origin toward the
//! receiver, checking that every "up-ramp" (customer announcing to its
//! provider) hop is attested by the customer's ASPA object, and that the
//! path never climbs again once it has turned into a "down-ramp"
//! (provider announcing to its customer) — the valley-free shape an
//! honestly-propagated path must have.

use crate::announcement::Announcement;
use crate::as_graph::ASGraph;
use crate::shared::Validity;

pub fn aspa_validity(ann: &Announcement, as_graph: &ASGraph) -> Validity {
    let path = &ann.as_path;
    if path.len() < 2 {
        return Validity::Valid;
    }

    let mut unknown = false;
    let mut turned_down_ramp = false;

    // path[i+1] is closer to the origin than path[i]; path[i+1] is the AS
    // that sent the announcement to path[i] one hop ago.
    for i in (0..path.len() - 1).rev() {
        let sender = path[i + 1];
        let receiver = path[i];

        match as_graph.get(&sender).and_then(|a| a.aspa_providers.as_ref()) {
            None => unknown = true,
            Some(authorized_providers) => {
                let is_up_ramp_hop = authorized_providers.contains(&receiver);
                if is_up_ramp_hop {
                    if turned_down_ramp {
                        return Validity::Invalid;
                    }
                } else {
                    turned_down_ramp = true;
                }
            }
        }
    }

    if unknown {
        Validity::Unknown
    } else {
        Validity::Valid
    }
}

pub fn validate(ann: &Announcement, as_graph: &ASGraph) -> Validity {
    aspa_validity(ann, as_graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::as_graph::AS;
    use crate::shared::Timestamps;
    use ipnetwork::IpNetwork;
    use std::collections::HashSet;
    use std::str::FromStr;

    fn as_with_providers(asn: u32, providers: &[u32]) -> AS {
        let mut a = AS::new(asn);
        a.aspa_providers = Some(providers.iter().copied().collect::<HashSet<_>>());
        a
    }

    #[test]
    fn valid_straight_up_ramp() {
        // path (receiver .. origin) = [1, 2, 3]; 2 attests 3 as a provider,
        // 1... wait only one ramp direction matters per hop: sender=path[i+1].
        let mut graph = ASGraph::new();
        graph.insert(as_with_providers(2, &[3]));
        graph.insert(as_with_providers(1, &[2]));
        graph.insert(AS::new(3));

        let ann = Announcement {
            as_path: vec![1, 2, 3],
            ..Announcement::new_seed(IpNetwork::from_str("10.0.0.0/24").unwrap(), 3, Timestamps::Victim)
        };
        assert_eq!(aspa_validity(&ann, &graph), Validity::Valid);
    }

    #[test]
    fn invalid_when_climbing_again_after_down_ramp() {
        let mut graph = ASGraph::new();
        // 3 is NOT an authorized provider of 2 -> hop (sender=3, receiver=2) is down-ramp
        graph.insert(as_with_providers(2, &[9]));
        // then hop (sender=2, receiver=1) claims to be up-ramp again -> invalid
        graph.insert(as_with_providers(1, &[2]));
        graph.insert(AS::new(3));

        let ann = Announcement {
            as_path: vec![1, 2, 3],
            ..Announcement::new_seed(IpNetwork::from_str("10.0.0.0/24").unwrap(), 3, Timestamps::Victim)
        };
        assert_eq!(aspa_validity(&ann, &graph), Validity::Invalid);
    }

    #[test]
    fn unknown_when_attestation_missing() {
        let mut graph = ASGraph::new();
        graph.insert(AS::new(2));
        graph.insert(AS::new(1));
        graph.insert(AS::new(3));

        let ann = Announcement {
            as_path: vec![1, 2, 3],
            ..Announcement::new_seed(IpNetwork::from_str("10.0.0.0/24").unwrap(), 3, Timestamps::Victim)
        };
        assert_eq!(aspa_validity(&ann, &graph), Validity::Unknown);
    }
}
