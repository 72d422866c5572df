use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::{info, debug, warn, LevelFilter};
use rayon::prelude::*;
use serde::Serialize;
use jido::{
    JidoConfig,
    Result,
    Error,
    Listing,
    cluster::{Cluster, ClusterEngine, ClusterKind, ClusterSummary},
    config::subsystems::{OutputFormat, output::parse_log_level},
};

/// Compute map clusters for a set of listings at one or more zoom levels
#[derive(Debug, Parser)]
#[command(name = "cluster_listings", version)]
struct Args {
    /// Listings file: a JSON array, or one listing per line for .jsonl
    #[arg(short, long)]
    input: PathBuf,

    /// Zoom level to cluster at (repeatable)
    #[arg(short, long = "zoom", required = true, allow_negative_numbers = true)]
    zooms: Vec<i32>,

    /// INI configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json or jsonl (overrides the config file)
    #[arg(short, long)]
    format: Option<String>,

    /// Write a per-zoom summary report as CSV
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace, none
    #[arg(long)]
    log_level: Option<String>,

    /// Log to a timestamped file under the configured log directory
    #[arg(long)]
    log_to_file: bool,

    /// Worker threads for clustering several zoom levels (0 = rayon default)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

#[derive(Debug, Serialize)]
struct ZoomReport {
    zoom: i32,
    strategy: &'static str,
    listings: usize,
    clusters: usize,
    region_clusters: usize,
    proximity_clusters: usize,
    single_clusters: usize,
    priced_clusters: usize,
    largest_cluster: usize,
    elapsed_ms: u128,
}

impl ZoomReport {
    fn new(zoom: i32, strategy: &'static str, listings: usize, clusters: &[Cluster], elapsed_ms: u128) -> Self {
        let count_kind = |kind: ClusterKind| clusters.iter().filter(|c| c.kind == kind).count();
        Self {
            zoom,
            strategy,
            listings,
            clusters: clusters.len(),
            region_clusters: count_kind(ClusterKind::Region),
            proximity_clusters: count_kind(ClusterKind::Proximity),
            single_clusters: count_kind(ClusterKind::Single),
            priced_clusters: clusters.iter().filter(|c| c.representative_price.is_some()).count(),
            largest_cluster: clusters.iter().map(Cluster::len).max().unwrap_or(0),
            elapsed_ms,
        }
    }
}

fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level);

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    } else {
        builder.target(env_logger::Target::Stderr);
    }
    builder.init();
    Ok(())
}

fn read_listings(path: &Path) -> Result<Vec<Listing>> {
    let is_jsonl = path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson"));

    if !is_jsonl {
        let reader = BufReader::new(File::open(path)?);
        return Ok(serde_json::from_reader(reader)?);
    }

    let reader = BufReader::new(File::open(path)?);
    let mut listings = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let listing: Listing = serde_json::from_str(&line).map_err(|e| {
            Error::input(format!("{:?} line {}: {}", path, line_num + 1, e))
        })?;
        listings.push(listing);
    }
    Ok(listings)
}

fn write_summaries<W: Write>(writer: W, summaries: &[ClusterSummary], format: OutputFormat) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, summaries)?;
            writeln!(writer)?;
        }
        OutputFormat::Jsonl => {
            for summary in summaries {
                serde_json::to_writer(&mut writer, summary)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_report(path: &Path, reports: &[ZoomReport]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for report in reports {
        writer.serialize(report)?;
    }
    writer.flush()?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => JidoConfig::from_ini(path)?,
        None => JidoConfig::default(),
    };
    if let Some(format) = &args.format {
        config.output.format = OutputFormat::from_str(format)
            .ok_or_else(|| Error::config(format!("Invalid output format: {}", format)))?;
    }

    let level = match &args.log_level {
        Some(level) => parse_log_level(level)
            .ok_or_else(|| Error::config(format!("Invalid log level: {}", level)))?,
        None => config.output.get_log_level(),
    };
    let log_path = if args.log_to_file {
        fs::create_dir_all(&config.output.log_dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        Some(config.output.log_dir.join(format!("cluster_listings_{}.log", timestamp)))
    } else {
        None
    };
    init_logging(level, log_path.as_deref())?;
    info!("Starting clustering with log level: {:?}", level);

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global()?;
    }

    let listings = read_listings(&args.input)?;
    info!("Loaded {} listings from {:?}", listings.len(), args.input);

    let engine = ClusterEngine::new(&config);

    // Each zoom level is an independent pass
    let results: Vec<(Vec<ClusterSummary>, ZoomReport)> = args.zooms.par_iter()
        .map(|&zoom| {
            let start_time = Instant::now();
            let strategy = engine.policy().strategy_for(zoom);
            let clusters = engine.cluster_with(&listings, zoom, strategy);
            let report = ZoomReport::new(
                zoom,
                strategy.name(),
                listings.len(),
                &clusters,
                start_time.elapsed().as_millis(),
            );
            let summaries = clusters.iter()
                .map(|cluster| ClusterSummary::from_cluster(cluster, zoom))
                .collect();
            (summaries, report)
        })
        .collect();

    let mut summaries = Vec::new();
    let mut reports = Vec::with_capacity(results.len());
    for (zoom_summaries, report) in results {
        info!(
            "Zoom {}: {} clusters ({} regional, {} proximity, {} single) in {} ms",
            report.zoom, report.clusters, report.region_clusters,
            report.proximity_clusters, report.single_clusters, report.elapsed_ms
        );
        summaries.extend(zoom_summaries);
        reports.push(report);
    }

    match &args.output {
        Some(path) => {
            debug!("Writing {} cluster summaries to {:?}", summaries.len(), path);
            write_summaries(File::create(path)?, &summaries, config.output.format)?;
        }
        None => write_summaries(io::stdout().lock(), &summaries, config.output.format)?,
    }

    if let Some(path) = &args.summary_csv {
        write_report(path, &reports)?;
        info!("Wrote zoom report to {:?}", path);
    }

    if listings.is_empty() {
        warn!("Input contained no listings; output is empty");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn summaries(zoom: i32) -> Vec<ClusterSummary> {
        let listings = vec![
            Listing::new("1", "래미안").with_region("서초구", "반포동").with_coordinates(37.505, 126.998),
            Listing::new("2", "자이").with_region("서초구", "반포동").with_coordinates(37.506, 126.999),
            Listing::new("3", "파크뷰").with_region("강남구", "역삼동"),
        ];
        ClusterEngine::default().cluster(&listings, zoom).iter()
            .map(|cluster| ClusterSummary::from_cluster(cluster, zoom))
            .collect()
    }

    #[test]
    fn reads_json_array() {
        let file = listings_file(".json", r#"[{"id": "1", "name": "a"}, {"id": "2", "district": "강남구"}]"#);
        let listings = read_listings(file.path()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[1].district.as_deref(), Some("강남구"));
    }

    #[test]
    fn reads_jsonl_skipping_blank_lines() {
        let file = listings_file(".jsonl", "{\"id\": \"1\", \"sale\": {\"min\": \"5억원\"}}\n\n{\"id\": \"2\"}\n");
        let listings = read_listings(file.path()).unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].sale_price(), Some(50_000.0));
        assert_eq!(listings[1].id, "2");
    }

    #[test]
    fn bad_jsonl_line_is_reported_by_number() {
        let file = listings_file(".jsonl", "{\"id\": \"1\"}\n{\"id\": \"2\"}\nnot json\n");
        match read_listings(file.path()) {
            Err(Error::Input(msg)) => assert!(msg.contains("line 3"), "{}", msg),
            other => panic!("expected input error, got {:?}", other),
        }
    }

    #[test]
    fn writes_json_array() {
        let summaries = summaries(6);
        let mut buf = Vec::new();
        write_summaries(&mut buf, &summaries, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), summaries.len());
        assert_eq!(array[0]["id"], summaries[0].id.as_str());
    }

    #[test]
    fn writes_one_summary_per_jsonl_line() {
        let summaries = summaries(2);
        let mut buf = Vec::new();
        write_summaries(&mut buf, &summaries, OutputFormat::Jsonl).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for (line, summary) in lines.iter().zip(&summaries) {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["zoom"], 2);
            assert_eq!(value["id"], summary.id.as_str());
        }
    }
}
