// types.rs
use serde::{Serialize, Deserialize};
use crate::types::{Bounds, GeoPoint, Listing};
use super::price::{format_price, PriceBasis, RepresentativePrice};
use super::style::ClusterStyle;

/// Label used for regional clusters whose sub-district is missing.
pub const UNKNOWN_REGION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterKind {
    /// One (district, sub-district) group
    Region,
    /// Listings merged by distance within a district
    Proximity,
    /// A single listing
    Single,
}

/// A listing with the point resolved for the current pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub listing: Listing,
    pub point: GeoPoint,
}

/// Membership decided by a grouping pass, before geometry and annotations.
/// Indices refer to the pass's resolved member list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDraft {
    pub kind: ClusterKind,
    pub id: String,
    pub region_label: Option<String>,
    pub indices: Vec<usize>,
}

impl ClusterDraft {
    pub fn single(index: usize, listing: &Listing) -> Self {
        Self {
            kind: ClusterKind::Single,
            id: format!("listing:{}", listing.id),
            region_label: None,
            indices: vec![index],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub kind: ClusterKind,
    pub center: GeoPoint,
    pub bounds: Bounds,
    pub members: Vec<ClusterMember>,
    pub representative_price: Option<f64>,
    pub price_basis: Option<PriceBasis>,
    pub region_label: Option<String>,
    pub style: ClusterStyle,
}

impl Cluster {
    /// Builds a cluster from a non-empty member list. Center is the centroid
    /// of the member points and bounds their extent.
    pub fn assemble(
        kind: ClusterKind,
        id: String,
        region_label: Option<String>,
        members: Vec<ClusterMember>,
        price: Option<RepresentativePrice>,
        style: ClusterStyle,
    ) -> Option<Self> {
        let points: Vec<GeoPoint> = members.iter().map(|m| m.point).collect();
        let center = GeoPoint::centroid(&points)?;
        let bounds = Bounds::from_points(&points)?;
        Some(Self {
            id,
            kind,
            center,
            bounds,
            members,
            representative_price: price.map(|p| p.value),
            price_basis: price.map(|p| p.basis),
            region_label,
            style,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.members.iter().map(|m| &m.listing)
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.listings().map(|l| l.id.clone()).collect()
    }
}

// Flat record for the map renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub zoom: i32,
    pub id: String,
    pub kind: ClusterKind,
    pub center_lat: f64,
    pub center_lng: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub member_count: usize,
    pub member_ids: Vec<String>,
    pub representative_price: Option<f64>,
    pub price_basis: Option<PriceBasis>,
    pub price_label: String,
    pub region_label: Option<String>,
    pub size_tier: String,
    pub price_band: String,
    pub color: String,
    pub diameter_px: u32,
}

impl ClusterSummary {
    pub fn from_cluster(cluster: &Cluster, zoom: i32) -> Self {
        Self {
            zoom,
            id: cluster.id.clone(),
            kind: cluster.kind,
            center_lat: cluster.center.latitude,
            center_lng: cluster.center.longitude,
            north: cluster.bounds.north,
            south: cluster.bounds.south,
            east: cluster.bounds.east,
            west: cluster.bounds.west,
            member_count: cluster.len(),
            member_ids: cluster.member_ids(),
            representative_price: cluster.representative_price,
            price_basis: cluster.price_basis,
            price_label: format_price(cluster.representative_price),
            region_label: cluster.region_label.clone(),
            size_tier: cluster.style.size_tier.as_str().to_string(),
            price_band: cluster.style.price_band.as_str().to_string(),
            color: cluster.style.price_band.color().to_string(),
            diameter_px: cluster.style.size_tier.diameter_px(),
        }
    }
}
