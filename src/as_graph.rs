use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::shared::{ASNGroups, Relationships};

pub type ASN = u32;

/// An Autonomous System node. Owns no neighbors directly — `peers` /
/// `providers` / `customers` are ASN back-references into the owning
/// `ASGraph`, never pointers, so the graph can hold arbitrary cycles and stay
/// trivially `Send + Sync` (spec.md §9, "Cyclic AS graph").
#[derive(Debug, Clone)]
pub struct AS {
    pub asn: ASN,
    pub peers: Vec<ASN>,
    pub providers: Vec<ASN>,
    pub customers: Vec<ASN>,
    pub tier_1: bool,
    pub ixp: bool,
    pub provider_cone_asns: HashSet<ASN>,
    pub propagation_rank: Option<u32>,
    /// Path-End attestation (C4): the penultimate hop this AS, as an
    /// origin, requires its announcements to have been re-advertised
    /// through. `None` means this AS has published no Path-End record.
    pub path_end_provider: Option<ASN>,
    /// ASPA attestation (C4): the set of this AS's authorized upstream
    /// providers. `None` means this AS has issued no ASPA attestation
    /// (validators must then treat up-ramp hops through it as `Unknown`).
    pub aspa_providers: Option<HashSet<ASN>>,
}

impl AS {
    pub fn new(asn: ASN) -> Self {
        AS {
            asn,
            peers: Vec::new(),
            providers: Vec::new(),
            customers: Vec::new(),
            tier_1: false,
            ixp: false,
            provider_cone_asns: HashSet::new(),
            propagation_rank: None,
            path_end_provider: None,
            aspa_providers: None,
        }
    }

    pub fn from_asn_sets(
        asn: ASN,
        peer_asns: HashSet<ASN>,
        provider_asns: HashSet<ASN>,
        customer_asns: HashSet<ASN>,
    ) -> Self {
        AS {
            asn,
            peers: peer_asns.into_iter().collect(),
            providers: provider_asns.into_iter().collect(),
            customers: customer_asns.into_iter().collect(),
            tier_1: false,
            ixp: false,
            provider_cone_asns: HashSet::new(),
            propagation_rank: None,
            path_end_provider: None,
            aspa_providers: None,
        }
    }

    pub fn get_neighbors(&self, rel: Relationships) -> &[ASN] {
        match rel {
            Relationships::Providers => &self.providers,
            Relationships::Peers => &self.peers,
            Relationships::Customers => &self.customers,
            Relationships::Origin => &[],
        }
    }

    pub fn is_stub(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn is_multihomed(&self) -> bool {
        self.customers.is_empty() && (self.providers.len() + self.peers.len()) > 1
    }

    pub fn is_transit(&self) -> bool {
        !self.customers.is_empty()
    }

    pub fn neighbor_asns(&self) -> HashSet<ASN> {
        let mut result = HashSet::new();
        result.extend(&self.peers);
        result.extend(&self.providers);
        result.extend(&self.customers);
        result
    }

    /// The relationship this AS has with `neighbor_asn`, if any, from this
    /// AS's point of view. Used by the policy engine to derive
    /// `recv_relationship` on receipt and by the export filter to derive the
    /// direction of propagation.
    pub fn relationship_with(&self, neighbor_asn: ASN) -> Option<Relationships> {
        if self.customers.contains(&neighbor_asn) {
            Some(Relationships::Customers)
        } else if self.peers.contains(&neighbor_asn) {
            Some(Relationships::Peers)
        } else if self.providers.contains(&neighbor_asn) {
            Some(Relationships::Providers)
        } else {
            None
        }
    }
}

/// Owns every AS node; all cross-references are ASN lookups into
/// `as_dict`, never Rust references — see spec.md §9's explicit rejection of
/// self-referential pointer graphs.
#[derive(Debug, Clone)]
pub struct ASGraph {
    pub as_dict: HashMap<ASN, AS>,
    pub asn_groups: HashMap<ASNGroups, HashSet<ASN>>,
    pub propagation_ranks: Vec<Vec<ASN>>,
}

impl ASGraph {
    pub fn new() -> Self {
        ASGraph {
            as_dict: HashMap::new(),
            asn_groups: HashMap::new(),
            propagation_ranks: Vec::new(),
        }
    }

    pub fn get(&self, asn: &ASN) -> Option<&AS> {
        self.as_dict.get(asn)
    }

    pub fn get_mut(&mut self, asn: &ASN) -> Option<&mut AS> {
        self.as_dict.get_mut(asn)
    }

    pub fn insert(&mut self, as_obj: AS) {
        self.as_dict.insert(as_obj.asn, as_obj);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AS> {
        self.as_dict.values()
    }

    pub fn len(&self) -> usize {
        self.as_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_dict.is_empty()
    }

    /// Rejects the direct self-loops that would make customer-cone and
    /// propagation-rank computation diverge. Does not attempt to detect
    /// longer provider/customer cycles — those are legal in real topologies
    /// (a customer can be a provider's provider several hops away) and the
    /// rank assignment below tolerates them by construction.
    pub fn check_for_cycles(&self) -> Result<(), GraphError> {
        for as_obj in self.as_dict.values() {
            if as_obj.providers.contains(&as_obj.asn) || as_obj.customers.contains(&as_obj.asn) {
                return Err(GraphError::SelfLoop(as_obj.asn));
            }
        }
        Ok(())
    }

    /// Customer cone: the transitive set of customers beneath each tier-1 AS,
    /// used by the scheduler to order the customer->provider and
    /// provider->customer sweeps (spec.md §4.6).
    pub fn add_provider_cone_asns(&mut self) {
        let all_asns: Vec<ASN> = self.as_dict.keys().copied().collect();
        let mut cache: HashMap<ASN, HashSet<ASN>> = HashMap::new();
        for asn in &all_asns {
            self.customer_cone(*asn, &mut cache, &mut HashSet::new());
        }
        for (asn, cone) in cache {
            if let Some(as_obj) = self.as_dict.get_mut(&asn) {
                as_obj.provider_cone_asns = cone;
            }
        }
    }

    fn customer_cone(
        &self,
        asn: ASN,
        cache: &mut HashMap<ASN, HashSet<ASN>>,
        in_progress: &mut HashSet<ASN>,
    ) -> HashSet<ASN> {
        if let Some(cone) = cache.get(&asn) {
            return cone.clone();
        }
        // A customer/provider relationship cycle would otherwise recurse
        // forever; treat an AS visited higher up the same recursion as
        // contributing nothing further.
        if !in_progress.insert(asn) {
            return HashSet::new();
        }

        let mut cone = HashSet::new();
        cone.insert(asn);
        if let Some(as_obj) = self.as_dict.get(&asn) {
            for &customer_asn in &as_obj.customers {
                let customer_cone = self.customer_cone(customer_asn, cache, in_progress);
                cone.extend(customer_cone);
            }
        }

        in_progress.remove(&asn);
        cache.insert(asn, cone.clone());
        cone
    }

    /// BFS-like rank assignment: an AS is assigned the next rank once every
    /// one of its providers already has a rank (or it has none, i.e. it is
    /// tier-1). Used by the scheduler to order customer->provider sweeps by
    /// ascending cone size and provider->customer sweeps descending.
    pub fn assign_as_propagation_rank(&mut self) {
        let mut unassigned: HashSet<ASN> = self.as_dict.keys().copied().collect();
        let mut current_rank = 0u32;
        let mut propagation_ranks = Vec::new();

        while !unassigned.is_empty() {
            let mut current_rank_asns = Vec::new();
            for &asn in &unassigned {
                if let Some(as_obj) = self.as_dict.get(&asn) {
                    let all_providers_ranked = as_obj
                        .providers
                        .iter()
                        .all(|p| !unassigned.contains(p));
                    if all_providers_ranked {
                        current_rank_asns.push(asn);
                    }
                }
            }

            if current_rank_asns.is_empty() {
                // Remaining ASes form a provider/customer cycle with no
                // fully-ranked entry point; flush them all at the current
                // rank rather than looping forever.
                current_rank_asns = unassigned.iter().copied().collect();
            }

            for &asn in &current_rank_asns {
                unassigned.remove(&asn);
                if let Some(as_obj) = self.as_dict.get_mut(&asn) {
                    as_obj.propagation_rank = Some(current_rank);
                }
            }

            propagation_ranks.push(current_rank_asns);
            current_rank += 1;
        }

        self.propagation_ranks = propagation_ranks;
    }

    pub fn add_asn_groups(&mut self) {
        let mut groups: HashMap<ASNGroups, HashSet<ASN>> = HashMap::new();

        let tier_1_asns: HashSet<ASN> = self
            .as_dict
            .values()
            .filter(|as_obj| as_obj.tier_1)
            .map(|as_obj| as_obj.asn)
            .collect();
        groups.insert(ASNGroups::Tier1, tier_1_asns);

        let stubs: HashSet<ASN> = self
            .as_dict
            .values()
            .filter(|as_obj| as_obj.is_stub())
            .map(|as_obj| as_obj.asn)
            .collect();
        groups.insert(ASNGroups::Stubs, stubs.clone());

        let multihomed: HashSet<ASN> = self
            .as_dict
            .values()
            .filter(|as_obj| as_obj.is_multihomed())
            .map(|as_obj| as_obj.asn)
            .collect();
        groups.insert(ASNGroups::Multihomed, multihomed.clone());

        let mut stubs_or_mh = stubs;
        stubs_or_mh.extend(&multihomed);
        groups.insert(ASNGroups::StubsOrMh, stubs_or_mh);

        let transit: HashSet<ASN> = self
            .as_dict
            .values()
            .filter(|as_obj| as_obj.is_transit())
            .map(|as_obj| as_obj.asn)
            .collect();
        groups.insert(ASNGroups::Transit, transit);

        let ixp: HashSet<ASN> = self
            .as_dict
            .values()
            .filter(|as_obj| as_obj.ixp)
            .map(|as_obj| as_obj.asn)
            .collect();
        groups.insert(ASNGroups::Ixp, ixp);

        groups.insert(ASNGroups::All, self.as_dict.keys().copied().collect());
        groups.insert(ASNGroups::Etc, HashSet::new());
        groups.insert(ASNGroups::Input, HashSet::new());

        self.asn_groups = groups;
    }
}

impl Default for ASGraph {
    fn default() -> Self {
        Self::new()
    }
}
