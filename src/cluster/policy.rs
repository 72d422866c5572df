use serde::{Serialize, Deserialize};
use crate::config::subsystems::ClusteringConfig;

/// Parameters for one clustering pass. Exactly one set is active per pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    pub distance_threshold_km: f64,
    pub min_cluster_size: usize,
    pub group_by_region: bool,
}

impl ClusteringParams {
    /// Whether nearby listings may be merged at all. At zero every listing
    /// stands alone.
    pub fn merges_by_distance(&self) -> bool {
        self.distance_threshold_km > 0.0
    }

    pub fn strategy(self) -> ClusteringStrategy {
        if self.group_by_region {
            ClusteringStrategy::Regional(self)
        } else {
            ClusteringStrategy::Proximity(self)
        }
    }
}

/// The two grouping algorithms a pass can run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusteringStrategy {
    /// Aggregate by (district, sub-district); leftovers go through the
    /// proximity pass.
    Regional(ClusteringParams),
    /// Greedy distance merging within each district, or one marker per
    /// listing when the threshold is zero.
    Proximity(ClusteringParams),
}

impl ClusteringStrategy {
    pub fn params(&self) -> &ClusteringParams {
        match self {
            ClusteringStrategy::Regional(params) | ClusteringStrategy::Proximity(params) => params,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClusteringStrategy::Regional(_) => "regional",
            ClusteringStrategy::Proximity(_) => "proximity",
        }
    }
}

/// Maps a zoom level to clustering parameters.
///
/// Larger zoom values are further out: at or above `far_zoom_threshold`
/// listings are aggregated by administrative region, below it they are
/// shown individually (or merged by distance if a near threshold is set).
#[derive(Debug, Clone, Default)]
pub struct ClusteringPolicy {
    config: ClusteringConfig,
}

impl ClusteringPolicy {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    pub fn is_far(&self, zoom: i32) -> bool {
        zoom >= self.config.far_zoom_threshold
    }

    pub fn params_for(&self, zoom: i32) -> ClusteringParams {
        if self.is_far(zoom) {
            ClusteringParams {
                distance_threshold_km: self.config.far_distance_km,
                min_cluster_size: self.config.far_min_cluster_size,
                group_by_region: true,
            }
        } else {
            ClusteringParams {
                distance_threshold_km: self.config.near_distance_km,
                min_cluster_size: self.config.near_min_cluster_size,
                group_by_region: false,
            }
        }
    }

    pub fn strategy_for(&self, zoom: i32) -> ClusteringStrategy {
        self.params_for(zoom).strategy()
    }

    /// Whether a proximity group smaller than the minimum size is still kept whole.
    pub fn keeps_undersized(&self, zoom: i32) -> bool {
        self.config.undersized_override_zoom.map_or(false, |limit| zoom > limit)
    }
}
