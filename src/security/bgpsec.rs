//! BGPsec, grounded on `policy_extensions/bgpsec.rs` in the teacher.
//! Cryptographic signing itself is out of scope for a simulator (spec.md §1,
//! "no packet forwarding, no TCP/BGP wire session"); `Announcement.bgpsec_path`
//! stands in for "the chain every scenario-side signer has verified", so
//! validity reduces to comparing it against the plain `as_path`.

use crate::announcement::Announcement;
use crate::shared::Validity;

pub fn validate(ann: &Announcement) -> Validity {
    match &ann.bgpsec_path {
        None => Validity::Unknown,
        Some(signed_path) if signed_path == &ann.as_path => Validity::Valid,
        Some(_) => Validity::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Timestamps;
    use ipnetwork::IpNetwork;
    use std::str::FromStr;

    fn base_ann() -> Announcement {
        let mut ann = Announcement::new_seed(IpNetwork::from_str("10.0.0.0/24").unwrap(), 3, Timestamps::Victim);
        ann.as_path = vec![1, 2, 3];
        ann
    }

    #[test]
    fn unknown_without_signed_path() {
        assert_eq!(validate(&base_ann()), Validity::Unknown);
    }

    #[test]
    fn valid_when_signed_chain_matches() {
        let mut ann = base_ann();
        ann.bgpsec_path = Some(vec![1, 2, 3]);
        assert_eq!(validate(&ann), Validity::Valid);
    }

    #[test]
    fn invalid_when_signed_chain_diverges() {
        let mut ann = base_ann();
        ann.bgpsec_path = Some(vec![1, 99, 3]);
        assert_eq!(validate(&ann), Validity::Invalid);
    }
}
