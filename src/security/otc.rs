//! Only-To-Customers (OTC), grounded on `policy_extensions/only_to_customers.rs`
//! in the teacher. Unlike the other extensions in this module, OTC is not an
//! import-time validity check — spec.md §4.4 describes it as a constraint on
//! *re-advertisement* — so it is consulted by `Policy::propagate_to` (policy.rs)
//! rather than folded into `validate_security`.

use crate::as_graph::{ASGraph, AS};
use crate::shared::Relationships;

/// Whether `ann`'s OTC attribute (if any) permits `as_self` to export it in
/// the direction named by `export_relationship`. Exporting to customers is
/// always permitted; exporting to peers/providers requires `as_self` to sit
/// within the declaring AS's customer cone (spec.md §4.4, "any AS that is
/// not a customer of X (transitively, along the received path) must reject
/// the route when it would re-advertise to peers/providers").
pub fn permits_export(
    only_to_customers: Option<crate::as_graph::ASN>,
    as_self: &AS,
    as_graph: &ASGraph,
    export_relationship: Relationships,
) -> bool {
    let otc_origin = match only_to_customers {
        None => return true,
        Some(asn) => asn,
    };

    if export_relationship == Relationships::Customers {
        return true;
    }

    as_graph
        .get(&otc_origin)
        .map(|declaring_as| declaring_as.provider_cone_asns.contains(&as_self.asn))
        .unwrap_or(false)
}
