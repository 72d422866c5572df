use ahash::AHashMap;
use bit_vec::BitVec;
use log::{debug, trace};
use rayon::prelude::*;
use crate::geo::haversine_km;
use super::policy::ClusteringParams;
use super::types::{ClusterDraft, ClusterKind, ClusterMember};

/// Greedy single-pass distance clustering, one district at a time.
///
/// Listings are visited in input order. The first unprocessed listing seeds
/// a group and claims every later unprocessed listing of the same district
/// within the threshold of the seed's own point. Groups below the minimum
/// size are exploded into singletons unless `keep_undersized` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyDistanceClusterer {
    parallel: bool,
}

impl GreedyDistanceClusterer {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    /// Unprocessed member indices bucketed by district, districts in
    /// first-appearance order.
    fn districts(members: &[ClusterMember], processed: &BitVec) -> Vec<Vec<usize>> {
        let mut slot_of: AHashMap<&str, usize> = AHashMap::new();
        let mut buckets: Vec<Vec<usize>> = Vec::new();
        for (idx, member) in members.iter().enumerate() {
            if processed.get(idx).unwrap_or(false) {
                continue;
            }
            let district = member.listing.district.as_deref().map(str::trim).unwrap_or("");
            let slot = *slot_of.entry(district).or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
            buckets[slot].push(idx);
        }
        buckets
    }

    pub fn cluster(
        &self,
        members: &[ClusterMember],
        params: &ClusteringParams,
        keep_undersized: bool,
        processed: &mut BitVec,
    ) -> Vec<ClusterDraft> {
        let districts = Self::districts(members, processed);
        debug!(
            "Proximity pass over {} districts (threshold {} km, min size {}, parallel {})",
            districts.len(), params.distance_threshold_km, params.min_cluster_size, self.parallel
        );

        let per_district: Vec<Vec<ClusterDraft>> = if self.parallel {
            districts.par_iter()
                .map(|indices| cluster_district(members, indices, params, keep_undersized))
                .collect()
        } else {
            districts.iter()
                .map(|indices| cluster_district(members, indices, params, keep_undersized))
                .collect()
        };

        for idx in districts.iter().flatten() {
            processed.set(*idx, true);
        }
        per_district.into_iter().flatten().collect()
    }
}

fn cluster_district(
    members: &[ClusterMember],
    indices: &[usize],
    params: &ClusteringParams,
    keep_undersized: bool,
) -> Vec<ClusterDraft> {
    let mut done = BitVec::from_elem(indices.len(), false);
    let mut drafts = Vec::new();

    for i in 0..indices.len() {
        if done[i] {
            continue;
        }
        done.set(i, true);
        let seed = &members[indices[i]];
        let mut group = vec![indices[i]];

        for j in (i + 1)..indices.len() {
            if done[j] {
                continue;
            }
            let candidate = &members[indices[j]];
            if haversine_km(&seed.point, &candidate.point) <= params.distance_threshold_km {
                group.push(indices[j]);
                done.set(j, true);
            }
        }

        if group.len() == 1 {
            drafts.push(ClusterDraft::single(group[0], &seed.listing));
        } else if group.len() >= params.min_cluster_size || keep_undersized {
            trace!("Seed {} merged {} listings", seed.listing.id, group.len());
            drafts.push(ClusterDraft {
                kind: ClusterKind::Proximity,
                id: format!("proximity:{}", seed.listing.id),
                region_label: None,
                indices: group,
            });
        } else {
            trace!(
                "Seed {} group of {} is below minimum {}, emitting singletons",
                seed.listing.id, group.len(), params.min_cluster_size
            );
            drafts.extend(group.into_iter().map(|idx| ClusterDraft::single(idx, &members[idx].listing)));
        }
    }

    drafts
}
