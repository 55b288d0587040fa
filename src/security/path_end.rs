//! Path-End, grounded on `policy_extensions/path_end.rs` in the teacher, but
//! reworked to match spec.md §4.4: an origin AS publishes (at most) one
//! required penultimate hop, and any announcement for a prefix it originates
//! must have been re-advertised through that AS.

use crate::announcement::Announcement;
use crate::as_graph::ASGraph;
use crate::shared::Validity;

pub fn path_end_validity(ann: &Announcement, as_graph: &ASGraph) -> Validity {
    let origin = ann.origin_asn();
    let required_provider = match as_graph.get(&origin).and_then(|a| a.path_end_provider) {
        Some(asn) => asn,
        None => return Validity::Unknown,
    };

    // The origin hasn't been re-advertised by anyone yet (we are looking at
    // its own freshly seeded announcement) — nothing to check.
    if ann.as_path.len() < 2 {
        return Validity::Unknown;
    }

    let penultimate_hop = ann.as_path[ann.as_path.len() - 2];
    if penultimate_hop == required_provider {
        Validity::Valid
    } else {
        Validity::Invalid
    }
}

pub fn validate(ann: &Announcement, as_graph: &ASGraph) -> Validity {
    path_end_validity(ann, as_graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::as_graph::AS;
    use crate::shared::{Relationships, Timestamps};
    use ipnetwork::IpNetwork;
    use std::str::FromStr;

    fn graph_with_origin(origin: u32, required_provider: u32) -> ASGraph {
        let mut graph = ASGraph::new();
        let mut origin_as = AS::new(origin);
        origin_as.path_end_provider = Some(required_provider);
        graph.insert(origin_as);
        graph
    }

    #[test]
    fn valid_when_penultimate_hop_matches() {
        let graph = graph_with_origin(3, 2);
        let ann = Announcement {
            as_path: vec![2, 3],
            ..Announcement::new_seed(
                IpNetwork::from_str("10.0.0.0/24").unwrap(),
                3,
                Timestamps::Victim,
            )
        };
        let mut ann = ann;
        ann.recv_relationship = Relationships::Customers;
        assert_eq!(path_end_validity(&ann, &graph), Validity::Valid);
    }

    #[test]
    fn invalid_when_penultimate_hop_mismatches() {
        let graph = graph_with_origin(3, 2);
        let mut ann = Announcement::new_seed(
            IpNetwork::from_str("10.0.0.0/24").unwrap(),
            3,
            Timestamps::Victim,
        );
        ann.as_path = vec![9, 3];
        assert_eq!(path_end_validity(&ann, &graph), Validity::Invalid);
    }
}
