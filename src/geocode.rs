//! Geo-enrichment adapter: provider trait, orchestration, and the offline
//! table-backed provider.
//!
//! Enrichment is the only blocking external operation in the pipeline and
//! completes before any record reaches the clustering engine, which
//! consumes nothing but the resulting [`GeoFix`].

use std::collections::HashMap;
use std::thread;

use tracing::{debug, warn};

use crate::config::EnrichConfig;
use crate::constants::geocode::{
    DEFAULT_CONFIDENCE_FLOOR, FALLBACK_SOURCE_SUFFIX, SOURCE_FEED, SOURCE_NONE,
};
use crate::data::{GeoFix, GeoStatus, PropertyRecord};
use crate::errors::DedupeError;
use crate::normalize::normalize_text;

#[cfg(feature = "providers")]
pub use self::providers::{LocationIqGeocoder, MapsCoGeocoder};

/// Address query submitted to a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeoQuery {
    pub address: String,
    pub city: String,
    pub zip: String,
}

impl GeoQuery {
    /// Query for a record's full address.
    pub fn from_record(record: &PropertyRecord) -> Self {
        Self {
            address: record.address.clone(),
            city: record.city.clone(),
            zip: record.zip.clone(),
        }
    }

    /// The same query with the postal code dropped.
    pub fn without_zip(&self) -> Self {
        Self {
            zip: String::new(),
            ..self.clone()
        }
    }

    /// Single-line form providers and caches key on, empty parts elided.
    pub fn as_line(&self) -> String {
        [&self.address, &self.city, &self.zip]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One provider answer: coordinates plus the provider's own confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoHit {
    pub lat: f64,
    pub lon: f64,
    pub confidence: f64,
}

/// A forward-geocoding provider.
///
/// Implementations may be HTTP clients or offline tables; for a fixed
/// query the answer should be deterministic.
pub trait Geocoder: Send + Sync {
    /// Stable provider identifier used in provenance labels.
    fn id(&self) -> &str;

    /// Resolve a query to a hit, `Ok(None)` when the provider has no
    /// answer, `Err` on transport or decoding failure.
    fn lookup(&self, query: &GeoQuery) -> Result<Option<GeoHit>, DedupeError>;

    /// Minimum confidence this provider's hits must clear.
    fn confidence_floor(&self) -> f64 {
        DEFAULT_CONFIDENCE_FLOOR
    }
}

/// Resolve one record against `providers` in order.
///
/// Round one queries the full address; when that round fails (or the record
/// has no postal code) and the fallback is enabled, round two retries with
/// the postal code dropped and tags the provenance with a fallback suffix.
/// Provider errors are recoverable: the orchestration falls through to the
/// next provider. A final failure is paced to respect provider rate limits.
pub fn enrich_record(
    record: &PropertyRecord,
    providers: &[Box<dyn Geocoder>],
    config: &EnrichConfig,
) -> GeoFix {
    let full = GeoQuery::from_record(record);

    if let Some(fix) = try_providers(&full, providers, "") {
        return fix;
    }
    if config.drop_zip_fallback {
        let without_zip = full.without_zip();
        if without_zip != full {
            if let Some(fix) = try_providers(&without_zip, providers, FALLBACK_SOURCE_SUFFIX) {
                return fix;
            }
        }
    }

    if !config.pacing_delay.is_zero() {
        thread::sleep(config.pacing_delay);
    }
    GeoFix::failed(SOURCE_NONE)
}

/// Enrich every record that does not already carry valid coordinates.
///
/// Feed-supplied coordinates are kept and marked as such. Returns the
/// number of records that ended up geolocated.
pub fn enrich_records(
    records: &mut [PropertyRecord],
    providers: &[Box<dyn Geocoder>],
    config: &EnrichConfig,
) -> usize {
    let mut geolocated = 0;
    for record in records.iter_mut() {
        if record.is_geolocated() {
            if record.geo_status == GeoStatus::Pending {
                record.geo_source = Some(SOURCE_FEED.to_string());
                record.geo_status = GeoStatus::Success;
            }
            geolocated += 1;
            continue;
        }
        let fix = enrich_record(record, providers, config);
        if fix.status == GeoStatus::Success {
            geolocated += 1;
        } else {
            debug!(id = %record.id, "no provider resolved the address");
        }
        record.apply_fix(fix);
    }
    geolocated
}

fn try_providers(
    query: &GeoQuery,
    providers: &[Box<dyn Geocoder>],
    source_suffix: &str,
) -> Option<GeoFix> {
    for provider in providers {
        match provider.lookup(query) {
            Ok(Some(hit)) if hit.confidence > provider.confidence_floor() => {
                return Some(GeoFix::success(
                    hit.lat,
                    hit.lon,
                    format!("{}{source_suffix}", provider.id()),
                ));
            }
            Ok(_) => {}
            Err(err) => {
                warn!(provider = provider.id(), %err, "geocoding lookup failed");
            }
        }
    }
    None
}

/// Offline provider backed by a normalized-query table. Used by tests and
/// demos, and as a cache layer in front of online providers.
#[derive(Debug, Default)]
pub struct StaticGeocoder {
    id: String,
    entries: HashMap<String, GeoHit>,
}

impl StaticGeocoder {
    /// Empty table with the given provider id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: HashMap::new(),
        }
    }

    /// Register a hit for an address line. The key is normalized with the
    /// same rules as record fields, so lookups tolerate case and spacing.
    pub fn with_entry(mut self, line: &str, lat: f64, lon: f64, confidence: f64) -> Self {
        self.entries.insert(
            normalize_text(line),
            GeoHit {
                lat,
                lon,
                confidence,
            },
        );
        self
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn id(&self) -> &str {
        &self.id
    }

    fn lookup(&self, query: &GeoQuery) -> Result<Option<GeoHit>, DedupeError> {
        Ok(self.entries.get(&normalize_text(&query.as_line())).copied())
    }
}

#[cfg(feature = "providers")]
mod providers {
    //! Online forward-geocoding clients (blocking HTTP + JSON).

    use serde::Deserialize;

    use crate::constants::geocode::{
        LOCATIONIQ_CONFIDENCE_FLOOR, LOCATIONIQ_ENDPOINT, MAPS_CO_CONFIDENCE_FLOOR,
        MAPS_CO_ENDPOINT,
    };
    use crate::errors::DedupeError;

    use super::{GeoHit, GeoQuery, Geocoder};

    /// Candidate row in a provider response; both providers share the
    /// Nominatim-style shape (string lat/lon plus an importance score).
    #[derive(Debug, Deserialize)]
    struct SearchRow {
        lat: String,
        lon: String,
        #[serde(default)]
        importance: Option<f64>,
    }

    fn best_hit(rows: Vec<SearchRow>, provider: &str) -> Result<Option<GeoHit>, DedupeError> {
        let Some(best) = rows.into_iter().next() else {
            return Ok(None);
        };
        let parse = |value: &str, which: &str| {
            value.parse::<f64>().map_err(|_| DedupeError::Provider {
                provider: provider.to_string(),
                reason: format!("non-numeric {which} '{value}' in response"),
            })
        };
        Ok(Some(GeoHit {
            lat: parse(&best.lat, "latitude")?,
            lon: parse(&best.lon, "longitude")?,
            confidence: best.importance.unwrap_or(0.5),
        }))
    }

    fn fetch_rows(
        client: &reqwest::blocking::Client,
        provider: &str,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<SearchRow>, DedupeError> {
        let transport = |err: reqwest::Error| DedupeError::Provider {
            provider: provider.to_string(),
            reason: err.to_string(),
        };
        client
            .get(endpoint)
            .query(params)
            .send()
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .json::<Vec<SearchRow>>()
            .map_err(transport)
    }

    /// maps.co forward-geocoding client.
    pub struct MapsCoGeocoder {
        api_key: String,
        client: reqwest::blocking::Client,
    }

    impl MapsCoGeocoder {
        /// Client authenticated with `api_key`.
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                api_key: api_key.into(),
                client: reqwest::blocking::Client::new(),
            }
        }
    }

    impl Geocoder for MapsCoGeocoder {
        fn id(&self) -> &str {
            "maps_co"
        }

        fn lookup(&self, query: &GeoQuery) -> Result<Option<GeoHit>, DedupeError> {
            let line = query.as_line();
            let rows = fetch_rows(
                &self.client,
                self.id(),
                MAPS_CO_ENDPOINT,
                &[("q", line.as_str()), ("api_key", self.api_key.as_str())],
            )?;
            best_hit(rows, self.id())
        }

        fn confidence_floor(&self) -> f64 {
            MAPS_CO_CONFIDENCE_FLOOR
        }
    }

    /// LocationIQ forward-geocoding client.
    pub struct LocationIqGeocoder {
        api_key: String,
        client: reqwest::blocking::Client,
    }

    impl LocationIqGeocoder {
        /// Client authenticated with `api_key`.
        pub fn new(api_key: impl Into<String>) -> Self {
            Self {
                api_key: api_key.into(),
                client: reqwest::blocking::Client::new(),
            }
        }
    }

    impl Geocoder for LocationIqGeocoder {
        fn id(&self) -> &str {
            "locationiq"
        }

        fn lookup(&self, query: &GeoQuery) -> Result<Option<GeoHit>, DedupeError> {
            let line = query.as_line();
            let rows = fetch_rows(
                &self.client,
                self.id(),
                LOCATIONIQ_ENDPOINT,
                &[
                    ("key", self.api_key.as_str()),
                    ("q", line.as_str()),
                    ("format", "json"),
                ],
            )?;
            best_hit(rows, self.id())
        }

        fn confidence_floor(&self) -> f64 {
            LOCATIONIQ_CONFIDENCE_FLOOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn no_pacing() -> EnrichConfig {
        EnrichConfig {
            pacing_delay: Duration::ZERO,
            ..EnrichConfig::default()
        }
    }

    fn record_with_address(address: &str, city: &str, zip: &str) -> PropertyRecord {
        let mut record = PropertyRecord::new("ROW-000001", "feed_a", "Grand Plaza");
        record.address = address.to_string();
        record.city = city.to_string();
        record.zip = zip.to_string();
        record
    }

    #[test]
    fn query_line_elides_empty_parts() {
        let query = GeoQuery {
            address: "1 Main St.".to_string(),
            city: "Springfield".to_string(),
            zip: String::new(),
        };
        assert_eq!(query.as_line(), "1 Main St., Springfield");
    }

    #[test]
    fn full_query_hit_wins_without_fallback() {
        let provider = StaticGeocoder::new("cache").with_entry(
            "1 Main St., Springfield, 01101",
            42.1,
            -72.6,
            0.9,
        );
        let record = record_with_address("1 Main St.", "Springfield", "01101");
        let fix = enrich_record(&record, &[Box::new(provider)], &no_pacing());
        assert_eq!(fix.status, GeoStatus::Success);
        assert_eq!(fix.source, "cache");
    }

    #[test]
    fn zip_dropped_retry_tags_the_source() {
        // Only the zip-less line is in the table: round one misses.
        let provider =
            StaticGeocoder::new("cache").with_entry("1 Main St., Springfield", 42.1, -72.6, 0.9);
        let record = record_with_address("1 Main St.", "Springfield", "99999");
        let fix = enrich_record(&record, &[Box::new(provider)], &no_pacing());
        assert_eq!(fix.status, GeoStatus::Success);
        assert_eq!(fix.source, "cache_fallback");
    }

    #[test]
    fn low_confidence_hits_are_rejected() {
        let provider = StaticGeocoder::new("cache").with_entry(
            "1 Main St., Springfield, 01101",
            42.1,
            -72.6,
            0.2,
        );
        let record = record_with_address("1 Main St.", "Springfield", "01101");
        let fix = enrich_record(&record, &[Box::new(provider)], &no_pacing());
        assert_eq!(fix.status, GeoStatus::Failed);
        assert_eq!(fix.source, "none");
    }

    #[test]
    fn providers_are_tried_in_order() {
        let miss = StaticGeocoder::new("first");
        let hit = StaticGeocoder::new("second").with_entry(
            "1 Main St., Springfield, 01101",
            42.1,
            -72.6,
            0.9,
        );
        let record = record_with_address("1 Main St.", "Springfield", "01101");
        let providers: Vec<Box<dyn Geocoder>> = vec![Box::new(miss), Box::new(hit)];
        let fix = enrich_record(&record, &providers, &no_pacing());
        assert_eq!(fix.source, "second");
    }

    #[test]
    fn bulk_enrich_keeps_feed_coordinates() {
        let mut records = vec![
            record_with_address("1 Main St.", "Springfield", "01101"),
            record_with_address("2 Oak Ave.", "Springfield", "01101"),
        ];
        records[0].coordinates = Some(crate::data::Coordinates::new(42.1, -72.6));

        let providers: Vec<Box<dyn Geocoder>> = vec![Box::new(StaticGeocoder::new("cache"))];
        let geolocated = enrich_records(&mut records, &providers, &no_pacing());

        assert_eq!(geolocated, 1);
        assert_eq!(records[0].geo_source.as_deref(), Some("feed"));
        assert_eq!(records[0].geo_status, GeoStatus::Success);
        assert_eq!(records[1].geo_status, GeoStatus::Failed);
    }
}
