use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{ClusterConfig, PipelineConfig};
use crate::constants::feed::{ENRICHED_FILENAME, GOLDEN_FILENAME, STEWARDSHIP_FILENAME};
use crate::errors::DedupeError;
use crate::feed::{FeedReader, write_enriched, write_golden, write_stewardship};
use crate::geocode::{Geocoder, StaticGeocoder, enrich_records};
use crate::metrics::group_skew;
use crate::pipeline;

/// CLI for `dedupe_feeds`.
///
/// Common usage:
/// - Dedupe a feed directory offline: `--feeds-dir data/feeds --out-dir out`
/// - Resolve addresses from a prepared cache: `--geocache data/geocache.csv`
/// - Loosen the radius for rural datasets: `--distance-threshold-m 300`
#[derive(Debug, Parser)]
#[command(
    name = "dedupe_feeds",
    disable_help_subcommand = true,
    about = "Dedupe lodging-property feeds and emit golden records",
    long_about = "Read CSV feeds, geo-enrich records from an offline cache, cluster duplicates per city block, and write the enriched, golden, and stewardship reports.",
    after_help = "The geocache is a CSV of `query,lat,lon,confidence` rows; records whose address misses the cache are queued for stewardship."
)]
struct DedupeFeedsCli {
    #[arg(long = "feeds-dir", value_name = "DIR", help = "Directory scanned for .csv feed files")]
    feeds_dir: PathBuf,
    #[arg(
        long = "out-dir",
        value_name = "DIR",
        default_value = "output",
        help = "Directory the three reports are written into"
    )]
    out_dir: PathBuf,
    #[arg(
        long = "geocache",
        value_name = "PATH",
        help = "Optional offline geocoding table (query,lat,lon,confidence)"
    )]
    geocache: Option<PathBuf>,
    #[arg(
        long = "distance-threshold-m",
        default_value_t = crate::constants::clustering::DISTANCE_THRESHOLD_M,
        help = "Candidate radius in meters (urban 80-150, rural 250-400)"
    )]
    distance_threshold_m: f64,
    #[arg(
        long = "name-similarity",
        default_value_t = crate::constants::clustering::NAME_SIMILARITY_THRESHOLD,
        help = "Minimum token-set name similarity on the 0-100 scale"
    )]
    name_similarity: u32,
}

/// Entry point shared by the `dedupe_feeds` demo binary.
pub fn run_dedupe_feeds() -> Result<(), Box<dyn Error>> {
    let cli = DedupeFeedsCli::parse();
    let config = PipelineConfig {
        cluster: ClusterConfig {
            distance_threshold_m: cli.distance_threshold_m,
            name_similarity_threshold: cli.name_similarity,
        },
        ..PipelineConfig::default()
    };
    config.cluster.validate()?;

    let mut reader = FeedReader::new();
    let mut records = reader.read_dir(&cli.feeds_dir)?;
    println!(
        "Loaded {} records from {} ({} rows skipped)",
        records.len(),
        cli.feeds_dir.display(),
        reader.skipped_rows()
    );

    let providers: Vec<Box<dyn Geocoder>> = match &cli.geocache {
        Some(path) => vec![Box::new(load_geocache(path)?)],
        None => Vec::new(),
    };
    let geolocated = enrich_records(&mut records, &providers, &config.enrich);
    println!("Geolocated {geolocated}/{} records", records.len());

    let report = pipeline::run(&records, &config)?;

    fs::create_dir_all(&cli.out_dir)?;
    write_enriched(&cli.out_dir.join(ENRICHED_FILENAME), &records, &report)?;
    write_golden(&cli.out_dir.join(GOLDEN_FILENAME), &records, &report)?;
    write_stewardship(&cli.out_dir.join(STEWARDSHIP_FILENAME), &records, &report)?;

    let summary = match group_skew(&report.groups) {
        Some(skew) => serde_json::json!({
            "records": skew.total_records,
            "groups": skew.groups,
            "singletons": skew.singletons,
            "largest_group": skew.max,
            "duplicate_rate": skew.duplicate_rate,
            "stewardship": report.stewardship.len(),
            "failed_blocks": report.failed_blocks,
        }),
        None => serde_json::json!({ "records": 0, "groups": 0 }),
    };
    let summary_path = cli.out_dir.join("groups_summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;

    println!(
        "Resolved {} groups ({} stewardship rows); reports in {}",
        report.groups.len(),
        report.stewardship.len(),
        cli.out_dir.display()
    );
    Ok(())
}

/// Load an offline geocoding table: CSV rows of `query,lat,lon,confidence`.
fn load_geocache(path: &Path) -> Result<StaticGeocoder, DedupeError> {
    let mut geocoder = StaticGeocoder::new("geocache");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| DedupeError::Feed {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
    for row in reader.records() {
        let row = row?;
        let line = row.get(0).unwrap_or("").trim();
        let lat = row.get(1).and_then(|v| v.trim().parse::<f64>().ok());
        let lon = row.get(2).and_then(|v| v.trim().parse::<f64>().ok());
        let confidence = row
            .get(3)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(1.0);
        if let (Some(lat), Some(lon)) = (lat, lon) {
            if !line.is_empty() {
                geocoder = geocoder.with_entry(line, lat, lon, confidence);
            }
        }
    }
    Ok(geocoder)
}
