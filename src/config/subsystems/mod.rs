pub mod clustering;
pub mod resolver;
pub mod styling;
pub mod output;

pub use clustering::ClusteringConfig;
pub use resolver::ResolverConfig;
pub use styling::StylingConfig;
pub use output::{OutputConfig, OutputFormat};
