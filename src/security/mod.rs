//! Security extensions (C4). Per spec.md §9's explicit redesign guidance,
//! these are not a class hierarchy (the original source's `BGP -> ROV ->
//! ROVFull -> ...` cooperative-inheritance tree). A `Policy` instead owns a
//! `SecurityProfile` — a small struct of flags — and `validate_security`
//! folds over whichever are set, calling straight functions grounded on the
//! corresponding `policy_extensions/*.rs` file in the teacher.

mod aspa;
mod bgpsec;
pub mod otc;
mod path_end;
mod rov;

use crate::announcement::Announcement;
use crate::as_graph::{ASGraph, AS};
use crate::route_validator::RouteValidator;
use crate::shared::Validity;

/// Which security extensions a Policy enforces. Multiple may be set at
/// once; `validate_security` accepts the candidate only if every enabled
/// extension returns `Valid` or `Unknown` (spec.md §4.4).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityProfile {
    pub rov: bool,
    /// Stricter ROV variant: routes received from customers bypass the
    /// check entirely; peers/providers do not.
    pub peer_rov: bool,
    pub path_end: bool,
    pub aspa: bool,
    pub bgpsec: bool,
    /// Only-To-Customers is an export-side constraint rather than an
    /// import-time validity check (spec.md §4.4's description is about
    /// re-advertisement), so it is not folded here — see
    /// `security::otc::permits_export`, called from `Policy::propagate_to`
    /// in `policy.rs`.
    pub otc: bool,
}

impl SecurityProfile {
    pub const fn none() -> Self {
        SecurityProfile {
            rov: false,
            peer_rov: false,
            path_end: false,
            aspa: false,
            bgpsec: false,
            otc: false,
        }
    }
}

/// Folds every enabled extension's verdict into one: starts at `Valid`,
/// downgrades to `Invalid` on the first extension that rejects, otherwise
/// settles on `Unknown` if any enabled extension was merely unsure. This
/// directly implements "a route is accepted only if all return valid or
/// unknown" (spec.md §4.4) without ever needing to special-case ordering
/// between extensions.
pub fn validate_security(
    ann: &Announcement,
    as_self: &AS,
    as_graph: &ASGraph,
    profile: &SecurityProfile,
    route_validator: &RouteValidator,
) -> Validity {
    let mut saw_unknown = false;

    macro_rules! fold {
        ($verdict:expr) => {
            match $verdict {
                Validity::Invalid => return Validity::Invalid,
                Validity::Unknown => saw_unknown = true,
                Validity::Valid => {}
            }
        };
    }

    if profile.rov {
        fold!(rov::validate(ann, as_self, route_validator, false));
    }
    if profile.peer_rov {
        fold!(rov::validate(ann, as_self, route_validator, true));
    }
    if profile.path_end {
        fold!(path_end::validate(ann, as_graph));
    }
    if profile.aspa {
        fold!(aspa::validate(ann, as_graph));
    }
    if profile.bgpsec {
        fold!(bgpsec::validate(ann));
    }

    if saw_unknown {
        Validity::Unknown
    } else {
        Validity::Valid
    }
}

/// Recomputes the per-extension tri-state fields carried on `Announcement`
/// (`roa_valid`, `path_end_valid`, `aspa_valid`) so that a route sitting in a
/// RIB always reflects the freshest evaluation, independent of whether the
/// corresponding extension is actually enabled on this Policy (enabling it
/// later, e.g. via adoption, should not require re-deriving history).
pub fn annotate(ann: &Announcement, as_graph: &ASGraph, route_validator: &RouteValidator) -> Announcement {
    let mut out = ann.clone();
    out.roa_valid = rov::roa_validity(ann, route_validator);
    out.path_end_valid = path_end::path_end_validity(ann, as_graph);
    out.aspa_valid = aspa::aspa_validity(ann, as_graph);
    out
}
