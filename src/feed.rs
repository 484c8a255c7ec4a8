//! Feed ingestion and report writing.
//!
//! Feeds are headered CSV files. Known columns map onto
//! [`PropertyRecord`] fields; everything else rides along in `extras` and
//! counts toward completeness scoring. Unreadable rows are skipped with a
//! warning, never fatal; unreadable files fail that feed only.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::constants::feed::{
    COL_ADDRESS, COL_CITY, COL_FEED, COL_GEO_SOURCE, COL_GEO_STATUS, COL_GROUP_ID, COL_LAT,
    COL_LON, COL_NAME, COL_ROW_ID, COL_SOURCE_CODE, COL_ZIP, ROW_ID_PREFIX, SKIP_UNREADABLE_MSG,
};
use crate::data::{Coordinates, GeoStatus, PropertyRecord};
use crate::errors::DedupeError;
use crate::pipeline::PipelineReport;
use crate::types::{FeedId, RecordId};

/// Reads CSV feeds into property records, minting row ids as it goes.
///
/// One reader should ingest every feed of a run so minted ids stay unique
/// across files.
#[derive(Debug, Default)]
pub struct FeedReader {
    next_row: usize,
    skipped_rows: usize,
}

impl FeedReader {
    /// Reader starting at `ROW-000001`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows skipped as unreadable so far.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Read a single feed file. The feed id defaults to the file stem.
    pub fn read_path(&mut self, path: &Path) -> Result<Vec<PropertyRecord>, DedupeError> {
        let default_feed: FeedId = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("feed")
            .to_string();
        let mut reader =
            csv::Reader::from_path(path).map_err(|err| DedupeError::Feed {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        let headers = reader
            .headers()
            .map_err(|err| DedupeError::Feed {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?
            .clone();
        let observed_at = file_mtime(path).unwrap_or_else(Utc::now);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    warn!(path = %path.display(), %err, "{SKIP_UNREADABLE_MSG}");
                    self.skipped_rows += 1;
                    continue;
                }
            };
            let field = |name: &str| -> String {
                headers
                    .iter()
                    .position(|header| header == name)
                    .and_then(|idx| row.get(idx))
                    .unwrap_or("")
                    .trim()
                    .to_string()
            };

            let id: RecordId = {
                let supplied = field(COL_ROW_ID);
                if supplied.is_empty() {
                    self.next_row += 1;
                    format!("{ROW_ID_PREFIX}{:06}", self.next_row)
                } else {
                    supplied
                }
            };

            let feed = {
                let supplied = field(COL_FEED);
                if supplied.is_empty() {
                    default_feed.clone()
                } else {
                    supplied
                }
            };
            let mut record = PropertyRecord::new(id, feed, field(COL_NAME));
            record.address = field(COL_ADDRESS);
            record.city = field(COL_CITY);
            record.zip = field(COL_ZIP);
            record.source_code = Some(field(COL_SOURCE_CODE)).filter(|code| !code.is_empty());
            record.coordinates = parse_coordinates(&field(COL_LAT), &field(COL_LON));
            record.observed_at = observed_at;

            let known = [
                COL_ROW_ID,
                COL_FEED,
                COL_NAME,
                COL_ADDRESS,
                COL_CITY,
                COL_ZIP,
                COL_SOURCE_CODE,
                COL_LAT,
                COL_LON,
                COL_GEO_SOURCE,
                COL_GEO_STATUS,
                COL_GROUP_ID,
            ];
            for (idx, header) in headers.iter().enumerate() {
                if known.contains(&header) {
                    continue;
                }
                let value = row.get(idx).unwrap_or("").trim();
                record.extras.insert(header.to_string(), value.to_string());
            }
            records.push(record);
        }
        info!(path = %path.display(), records = records.len(), "feed ingested");
        Ok(records)
    }

    /// Read every feed under `root` in discovery order.
    pub fn read_dir(&mut self, root: &Path) -> Result<Vec<PropertyRecord>, DedupeError> {
        let mut records = Vec::new();
        for path in discover_feeds(root) {
            records.extend(self.read_path(&path)?);
        }
        Ok(records)
    }
}

/// All `.csv` files under `root`, in deterministic (sorted) order.
pub fn discover_feeds(root: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| is_csv_file(path))
        .collect();
    candidates.sort();
    candidates
}

/// True if the path has a `.csv` extension (case-insensitive).
pub fn is_csv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Best-effort file modified time.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Both components must coerce to numbers; anything else means no usable
/// coordinates.
fn parse_coordinates(lat: &str, lon: &str) -> Option<Coordinates> {
    let lat = lat.parse::<f64>().ok()?;
    let lon = lon.parse::<f64>().ok()?;
    Some(Coordinates::new(lat, lon))
}

/// Report writers share one column layout: the core columns followed by the
/// sorted union of extra columns seen across `records`.
fn extra_columns(records: &[PropertyRecord]) -> Vec<String> {
    let mut columns: Vec<String> = records
        .iter()
        .flat_map(|record| record.extras.keys().cloned())
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

fn core_header() -> Vec<&'static str> {
    vec![
        COL_ROW_ID,
        COL_FEED,
        COL_NAME,
        COL_ADDRESS,
        COL_CITY,
        COL_ZIP,
        COL_SOURCE_CODE,
        COL_LAT,
        COL_LON,
        COL_GEO_SOURCE,
        COL_GEO_STATUS,
        COL_GROUP_ID,
    ]
}

fn write_rows<'a, I>(
    path: &Path,
    records: I,
    extras: &[String],
    group_of: impl Fn(&PropertyRecord) -> String,
) -> Result<(), DedupeError>
where
    I: IntoIterator<Item = &'a PropertyRecord>,
{
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = core_header().into_iter().map(str::to_string).collect();
    header.extend(extras.iter().cloned());
    writer.write_record(&header)?;

    for record in records {
        let (lat, lon) = match record.coordinates {
            Some(coords) => (coords.lat.to_string(), coords.lon.to_string()),
            None => (String::new(), String::new()),
        };
        let mut row: Vec<String> = vec![
            record.id.clone(),
            record.feed.clone(),
            record.name.clone(),
            record.address.clone(),
            record.city.clone(),
            record.zip.clone(),
            record.source_code.clone().unwrap_or_default(),
            lat,
            lon,
            record.geo_source.clone().unwrap_or_default(),
            record.geo_status.as_str().to_string(),
            group_of(record),
        ];
        for column in extras {
            row.push(record.extras.get(column).cloned().unwrap_or_default());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every record with its enrichment columns and resolved group id.
pub fn write_enriched(
    path: &Path,
    records: &[PropertyRecord],
    report: &PipelineReport,
) -> Result<(), DedupeError> {
    let extras = extra_columns(records);
    write_rows(path, records.iter(), &extras, |record| {
        report
            .assignment
            .get(&record.id)
            .cloned()
            .unwrap_or_default()
    })
}

/// Write one representative row per resolved group, in group order.
pub fn write_golden(
    path: &Path,
    records: &[PropertyRecord],
    report: &PipelineReport,
) -> Result<(), DedupeError> {
    let by_id: IndexMap<&str, &PropertyRecord> = records
        .iter()
        .map(|record| (record.id.as_str(), record))
        .collect();
    let golden: Vec<&PropertyRecord> = report
        .golden
        .values()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect();
    let extras = extra_columns(records);
    write_rows(path, golden, &extras, |record| {
        report
            .assignment
            .get(&record.id)
            .cloned()
            .unwrap_or_default()
    })
}

/// Write the manual-review queue: records whose enrichment failed.
pub fn write_stewardship(
    path: &Path,
    records: &[PropertyRecord],
    report: &PipelineReport,
) -> Result<(), DedupeError> {
    let queue: Vec<&PropertyRecord> = records
        .iter()
        .filter(|record| report.stewardship.contains(&record.id))
        .collect();
    let extras = extra_columns(records);
    write_rows(path, queue, &extras, |_| String::new())
}
