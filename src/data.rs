use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use crate::types::{FeedId, GeoSource, RecordId, SourceCode};

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create a coordinate pair without validation.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both components are finite and inside the valid
    /// latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Outcome of a geo-enrichment attempt for one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoStatus {
    /// No enrichment attempted yet.
    Pending,
    /// A provider (or the feed itself) supplied usable coordinates.
    Success,
    /// Every provider attempt failed; the record has no usable coordinates.
    Failed,
}

impl GeoStatus {
    /// Stable label used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeoStatus::Pending => "pending",
            GeoStatus::Success => "success",
            GeoStatus::Failed => "failed",
        }
    }
}

/// The `(latitude, longitude, source, status)` tuple produced by the
/// geo-enrichment adapter. The clustering engine consumes nothing else
/// from enrichment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub coordinates: Option<Coordinates>,
    pub source: GeoSource,
    pub status: GeoStatus,
}

impl GeoFix {
    /// A successful fix from `source`.
    pub fn success(lat: f64, lon: f64, source: impl Into<GeoSource>) -> Self {
        Self {
            coordinates: Some(Coordinates::new(lat, lon)),
            source: source.into(),
            status: GeoStatus::Success,
        }
    }

    /// A failed fix with no usable coordinates.
    pub fn failed(source: impl Into<GeoSource>) -> Self {
        Self {
            coordinates: None,
            source: source.into(),
            status: GeoStatus::Failed,
        }
    }
}

/// Canonical lodging-property record as read from a feed and carried
/// through enrichment, clustering, and reporting.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Stable record identifier (minted by the feed reader when absent).
    pub id: RecordId,
    /// Feed that produced this record.
    pub feed: FeedId,
    /// Raw property name (possibly empty).
    pub name: String,
    /// Raw street address (possibly empty).
    pub address: String,
    /// Raw city (possibly empty); normalized form becomes the block key.
    pub city: String,
    /// Raw postal code (possibly empty).
    pub zip: String,
    /// External chain/provider code; a strong same-entity signal when two
    /// records share a non-empty code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<SourceCode>,
    /// Enriched coordinates; `None` until enrichment or when it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Provenance of the enriched coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_source: Option<GeoSource>,
    /// Enrichment status for this record.
    pub geo_status: GeoStatus,
    /// Feed observation timestamp.
    pub observed_at: DateTime<Utc>,
    /// Passthrough columns preserved for completeness scoring and reports.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extras: IndexMap<String, String>,
}

impl PropertyRecord {
    /// Minimal record with empty optional fields, used by builders and tests.
    pub fn new(id: impl Into<RecordId>, feed: impl Into<FeedId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            feed: feed.into(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            zip: String::new(),
            source_code: None,
            coordinates: None,
            geo_source: None,
            geo_status: GeoStatus::Pending,
            observed_at: Utc::now(),
            extras: IndexMap::new(),
        }
    }

    /// True when the record carries valid coordinates.
    pub fn is_geolocated(&self) -> bool {
        self.coordinates.map(|c| c.is_valid()).unwrap_or(false)
    }

    /// Non-empty source code, if any.
    pub fn source_code_nonempty(&self) -> Option<&str> {
        self.source_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
    }

    /// Apply an enrichment outcome to this record.
    pub fn apply_fix(&mut self, fix: GeoFix) {
        self.coordinates = fix.coordinates;
        self.geo_source = Some(fix.source);
        self.geo_status = fix.status;
    }
}
