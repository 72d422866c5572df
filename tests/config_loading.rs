use std::io::Write;
use jido::cluster::{ClusterEngine, ClusterKind, PriceBand};
use jido::config::subsystems::OutputFormat;
use jido::{Error, JidoConfig, Listing, PriceRange, TransactionType};

fn ini_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loaded_config_drives_the_engine() {
    let file = ini_file("\
# clustering for a suburban map
[clustering]
far_zoom_threshold = 8
near_distance_km = 0.05
near_min_cluster_size = 2
undersized_override_zoom = none

[resolver]
default_district = \"분당구\"

[resolver.districts]
분당구 = 37.3827, 127.1189

[styling]
affordable_max = 30000

[output]
format = jsonl
log_level = debug
");
    let config = JidoConfig::from_ini(file.path()).unwrap();
    assert_eq!(config.clustering.far_zoom_threshold, 8);
    assert_eq!(config.clustering.undersized_override_zoom, None);
    assert_eq!(config.output.format, OutputFormat::Jsonl);
    assert_eq!(config.output.get_log_level(), log::LevelFilter::Debug);

    let engine = ClusterEngine::new(&config);
    let listings = vec![
        Listing::new("a", "a").with_district("분당구").with_coordinates(37.3800, 127.1100)
            .with_price(TransactionType::Sale, PriceRange::single("4억원")),
        Listing::new("b", "b").with_district("분당구").with_coordinates(37.3801, 127.1100)
            .with_price(TransactionType::Sale, PriceRange::single("4억")),
    ];
    // Zoom 6 is below the configured far threshold, so these merge by distance
    let clusters = engine.cluster(&listings, 6);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].kind, ClusterKind::Proximity);
    assert_eq!(clusters[0].style.price_band, PriceBand::Mid);

    let unknown = engine.resolver().district_center(Some("없는구"));
    let bundang = engine.resolver().district_center(Some("분당구"));
    assert_eq!(unknown, bundang);
}

#[test]
fn invalid_thresholds_are_rejected_on_load() {
    let file = ini_file("[styling]\nmid_max = 20000\n");
    assert!(matches!(JidoConfig::from_ini(file.path()), Err(Error::Config(_))));
}
