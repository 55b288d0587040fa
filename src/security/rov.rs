//! Route Origin Validation, grounded on `policy_extensions/rov.rs` and
//! `policy_extensions/peer_rov.rs` in the teacher, and on `route_validator.rs`
//! (C11) for the actual ROA lookup.

use crate::announcement::Announcement;
use crate::as_graph::AS;
use crate::route_validator::RouteValidator;
use crate::shared::{Relationships, Validity};

pub fn roa_validity(ann: &Announcement, route_validator: &RouteValidator) -> Validity {
    let (validity, _routed) = route_validator.get_roa_outcome(&ann.prefix, ann.origin_asn());
    validity.as_validity()
}

/// `peer_only`: PeerROV applies only to routes received from peers or
/// providers — routes received from a customer bypass the check entirely
/// (spec.md §4.4, "PeerROV variant applies only to routes received from
/// peers/providers (customers bypass)").
pub fn validate(
    ann: &Announcement,
    as_self: &AS,
    route_validator: &RouteValidator,
    peer_only: bool,
) -> Validity {
    if peer_only
        && !matches!(
            ann.recv_relationship,
            Relationships::Peers | Relationships::Providers
        )
    {
        return Validity::Valid;
    }
    let _ = as_self;
    roa_validity(ann, route_validator)
}
