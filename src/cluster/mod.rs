// cluster/mod.rs
pub mod administrative;
pub mod engine;
pub mod greedy;
pub mod policy;
pub mod price;
pub mod style;
pub mod types;

// Re-export the main types
pub use self::engine::ClusterEngine;
pub use self::administrative::AdministrativeGrouper;
pub use self::greedy::GreedyDistanceClusterer;
pub use self::policy::{ClusteringParams, ClusteringPolicy, ClusteringStrategy};
pub use self::price::{format_price, parse_price_text, PriceAggregator, PriceBasis, RepresentativePrice};
pub use self::style::{ClusterStyle, ClusterStyler, PriceBand, SizeTier};
pub use self::types::{Cluster, ClusterKind, ClusterMember, ClusterSummary, UNKNOWN_REGION};
