use bit_vec::BitVec;
use log::{debug, trace, warn};
use std::time::Instant;
use crate::config::JidoConfig;
use crate::geo::CoordinateResolver;
use crate::types::Listing;
use super::administrative::AdministrativeGrouper;
use super::greedy::GreedyDistanceClusterer;
use super::policy::{ClusteringParams, ClusteringPolicy, ClusteringStrategy};
use super::price::PriceAggregator;
use super::style::ClusterStyler;
use super::types::{Cluster, ClusterDraft, ClusterMember};

/// Computes map clusters for one listing set at one zoom level.
///
/// Each call is an isolated, deterministic pass: coordinates are resolved,
/// the policy picks a strategy, listings are partitioned into clusters and
/// every cluster is annotated with its price and style. Nothing is kept
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    resolver: CoordinateResolver,
    policy: ClusteringPolicy,
    grouper: AdministrativeGrouper,
    clusterer: GreedyDistanceClusterer,
    aggregator: PriceAggregator,
    styler: ClusterStyler,
}

impl ClusterEngine {
    pub fn new(config: &JidoConfig) -> Self {
        Self {
            resolver: CoordinateResolver::new(&config.resolver),
            policy: ClusteringPolicy::new(config.clustering.clone()),
            grouper: AdministrativeGrouper::new(),
            clusterer: GreedyDistanceClusterer::new(config.clustering.parallel_districts),
            aggregator: PriceAggregator::new(),
            styler: ClusterStyler::new(config.styling.clone()),
        }
    }

    pub fn policy(&self) -> &ClusteringPolicy {
        &self.policy
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    pub fn cluster(&self, listings: &[Listing], zoom: i32) -> Vec<Cluster> {
        self.cluster_with(listings, zoom, self.policy.strategy_for(zoom))
    }

    /// Runs a pass with an explicit strategy instead of the zoom policy's choice.
    /// `zoom` still drives the undersized-group override.
    pub fn cluster_with(&self, listings: &[Listing], zoom: i32, strategy: ClusteringStrategy) -> Vec<Cluster> {
        if listings.is_empty() {
            return Vec::new();
        }
        let start_time = Instant::now();

        let members: Vec<ClusterMember> = listings.iter()
            .map(|listing| ClusterMember {
                listing: listing.clone(),
                point: self.resolver.resolve(listing),
            })
            .collect();
        let mut processed = BitVec::from_elem(members.len(), false);

        let params = strategy.params();
        trace!(
            "Zoom {}: threshold {} km, min size {}, by region {}",
            zoom, params.distance_threshold_km, params.min_cluster_size, params.group_by_region
        );

        let drafts = match strategy {
            ClusteringStrategy::Regional(params) => {
                let mut drafts = self.grouper.group(&members, &params, &mut processed);
                drafts.extend(self.cluster_remaining(&members, &params, zoom, &mut processed));
                drafts
            }
            ClusteringStrategy::Proximity(params) => {
                self.cluster_remaining(&members, &params, zoom, &mut processed)
            }
        };
        debug_assert!(processed.all(), "every listing must be claimed by a cluster");

        let clusters = self.finalize(members, drafts);
        debug!(
            "Clustered {} listings into {} clusters at zoom {} using {} strategy in {:?}",
            listings.len(), clusters.len(), zoom, strategy.name(), start_time.elapsed()
        );
        clusters
    }

    /// Proximity pass over whatever the regional pass left, or one marker
    /// per listing when distance merging is off.
    fn cluster_remaining(
        &self,
        members: &[ClusterMember],
        params: &ClusteringParams,
        zoom: i32,
        processed: &mut BitVec,
    ) -> Vec<ClusterDraft> {
        if params.merges_by_distance() {
            let keep_undersized = self.policy.keeps_undersized(zoom);
            return self.clusterer.cluster(members, params, keep_undersized, processed);
        }

        let mut drafts = Vec::new();
        for (idx, member) in members.iter().enumerate() {
            if !processed.get(idx).unwrap_or(true) {
                processed.set(idx, true);
                drafts.push(ClusterDraft::single(idx, &member.listing));
            }
        }
        drafts
    }

    fn finalize(&self, members: Vec<ClusterMember>, drafts: Vec<ClusterDraft>) -> Vec<Cluster> {
        let mut slots: Vec<Option<ClusterMember>> = members.into_iter().map(Some).collect();
        let mut clusters = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let cluster_members: Vec<ClusterMember> = draft.indices.iter()
                .filter_map(|&idx| slots.get_mut(idx).and_then(Option::take))
                .collect();
            if cluster_members.len() != draft.indices.len() {
                warn!("Cluster {} referenced listings already assigned elsewhere", draft.id);
            }

            let price = self.aggregator.aggregate(cluster_members.iter().map(|m| &m.listing));
            let style = self.styler.style(cluster_members.len(), price.map(|p| p.value));
            if let Some(cluster) = Cluster::assemble(
                draft.kind,
                draft.id,
                draft.region_label,
                cluster_members,
                price,
                style,
            ) {
                clusters.push(cluster);
            }
        }

        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::types::ClusterKind;
    use crate::cluster::style::SizeTier;
    use crate::config::subsystems::ClusteringConfig;
    use crate::types::{PriceRange, TransactionType};

    fn listing(id: &str, district: &str, sub: &str, lat: f64, lng: f64) -> Listing {
        Listing::new(id, format!("단지{}", id))
            .with_region(district, sub)
            .with_coordinates(lat, lng)
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        let engine = ClusterEngine::default();
        assert!(engine.cluster(&[], 6).is_empty());
        assert!(engine.cluster(&[], 2).is_empty());
    }

    #[test]
    fn near_zoom_emits_one_cluster_per_listing() {
        let engine = ClusterEngine::default();
        let listings = vec![
            listing("1", "강남구", "역삼동", 37.5, 127.0),
            listing("2", "강남구", "역삼동", 37.5, 127.0),
            listing("3", "서초구", "반포동", 37.5, 127.0),
        ];
        let clusters = engine.cluster(&listings, 3);
        assert_eq!(clusters.len(), 3);
        for (cluster, listing) in clusters.iter().zip(&listings) {
            assert_eq!(cluster.kind, ClusterKind::Single);
            assert_eq!(cluster.members[0].listing, *listing);
            assert_eq!(cluster.style.size_tier, SizeTier::Single);
        }
    }

    #[test]
    fn far_zoom_aggregates_regions() {
        let engine = ClusterEngine::default();
        let listings = vec![
            listing("1", "강남구", "역삼동", 37.500, 127.030),
            listing("2", "서초구", "반포동", 37.505, 126.990),
            listing("3", "강남구", "역삼동", 37.502, 127.034),
        ];
        let clusters = engine.cluster(&listings, 8);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].kind, ClusterKind::Region);
        assert_eq!(clusters[0].member_ids(), vec!["1", "3"]);
        assert_eq!(clusters[0].region_label.as_deref(), Some("역삼동"));
        assert!((clusters[0].center.latitude - 37.501).abs() < 1e-9);
        assert!((clusters[0].center.longitude - 127.032).abs() < 1e-9);
    }

    #[test]
    fn leftovers_of_regional_pass_go_through_proximity() {
        let config = JidoConfig {
            clustering: ClusteringConfig { far_min_cluster_size: 2, ..ClusteringConfig::default() },
            ..JidoConfig::default()
        };
        let engine = ClusterEngine::new(&config);
        let listings = vec![
            listing("1", "강남구", "역삼동", 37.5000, 127.0),
            listing("2", "강남구", "역삼동", 37.5300, 127.0),
            // Lone sub-districts, close to each other
            listing("3", "강남구", "대치동", 37.4900, 127.06),
            listing("4", "강남구", "도곡동", 37.4901, 127.06),
            // Alone in its district
            listing("5", "서초구", "반포동", 37.5050, 126.99),
        ];
        let clusters = engine.cluster(&listings, 6);

        let kinds: Vec<ClusterKind> = clusters.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ClusterKind::Region, ClusterKind::Proximity, ClusterKind::Single]);
        assert_eq!(clusters[0].member_ids(), vec!["1", "2"]);
        assert_eq!(clusters[1].member_ids(), vec!["3", "4"]);
        assert_eq!(clusters[2].member_ids(), vec!["5"]);
        let total: usize = clusters.iter().map(Cluster::len).sum();
        assert_eq!(total, listings.len());
    }

    #[test]
    fn clusters_carry_price_and_style() {
        let engine = ClusterEngine::default();
        let listings = vec![
            listing("1", "강남구", "역삼동", 37.5, 127.0)
                .with_price(TransactionType::Sale, PriceRange::new(100_000.0, 120_000.0)),
            listing("2", "강남구", "역삼동", 37.5, 127.0)
                .with_price(TransactionType::Jeonse, PriceRange::single(60_000.0)),
        ];
        let clusters = engine.cluster(&listings, 6);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].representative_price, Some(110_000.0));
        assert_eq!(clusters[0].style, engine.styler.style(2, Some(110_000.0)));
    }
}
