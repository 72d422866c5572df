use ahash::AHashMap;
use bit_vec::BitVec;
use log::{debug, trace};
use super::policy::ClusteringParams;
use super::types::{ClusterDraft, ClusterKind, ClusterMember, UNKNOWN_REGION};

fn region_part(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("")
}

/// Groups listings by (district, sub-district) and emits one regional
/// cluster per group that reaches the minimum size.
///
/// Members of emitted groups are marked in `processed`; smaller groups are
/// left untouched for the proximity pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdministrativeGrouper;

impl AdministrativeGrouper {
    pub fn new() -> Self {
        Self
    }

    pub fn group(
        &self,
        members: &[ClusterMember],
        params: &ClusteringParams,
        processed: &mut BitVec,
    ) -> Vec<ClusterDraft> {
        // Keys in first-appearance order keep the output deterministic
        let mut order: Vec<(&str, &str)> = Vec::new();
        let mut groups: AHashMap<(&str, &str), Vec<usize>> = AHashMap::new();

        for (idx, member) in members.iter().enumerate() {
            if processed.get(idx).unwrap_or(false) {
                continue;
            }
            let key = (
                region_part(member.listing.district.as_deref()),
                region_part(member.listing.sub_district.as_deref()),
            );
            groups.entry(key)
                .or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                })
                .push(idx);
        }

        let mut drafts = Vec::with_capacity(order.len());
        let mut deferred = 0usize;
        for key in order {
            let Some(indices) = groups.remove(&key) else { continue };
            if indices.len() < params.min_cluster_size {
                trace!(
                    "Region {}/{} has {} listings (< {}), deferring to proximity pass",
                    key.0, key.1, indices.len(), params.min_cluster_size
                );
                deferred += indices.len();
                continue;
            }

            for &idx in &indices {
                processed.set(idx, true);
            }
            let district = if key.0.is_empty() { UNKNOWN_REGION } else { key.0 };
            let label = if key.1.is_empty() { UNKNOWN_REGION } else { key.1 };
            drafts.push(ClusterDraft {
                kind: ClusterKind::Region,
                id: format!("region:{}/{}", district, label),
                region_label: Some(label.to_string()),
                indices,
            });
        }

        debug!(
            "Administrative grouping produced {} regional clusters, {} listings deferred",
            drafts.len(), deferred
        );
        drafts
    }
}
