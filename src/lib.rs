//! jido computes map-display clusters for geolocated real-estate listings.
//! Far zoom levels aggregate listings by administrative region, near zoom
//! levels show individual markers, and every cluster carries its bounds,
//! a representative price and a display style for the map renderer.

// Module declarations
pub mod error;
pub mod types;
pub mod geo;
pub mod cluster;
pub mod config;

// Re-exports
pub use error::{Error, Result};
pub use types::{Bounds, GeoPoint, Listing, PriceRange, RawNumber, TransactionType};
pub use cluster::{Cluster, ClusterEngine, ClusterKind, ClusterSummary};

// Re-export the config from config module
pub use config::JidoConfig;

/// Clusters `listings` at `zoom` with the default configuration.
pub fn cluster_listings(listings: &[Listing], zoom: i32) -> Vec<Cluster> {
    ClusterEngine::default().cluster(listings, zoom)
}
