#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Single-pass clustering engine.
pub mod cluster;
/// Cluster and pipeline configuration types.
pub mod config;
/// Centralized constants used across clustering, normalization, and feeds.
pub mod constants;
/// Property record and enrichment types.
pub mod data;
mod errors;
/// Reusable demo runners shared by downstream binaries.
pub mod example_apps;
/// Feed ingestion and report writers.
pub mod feed;
/// Geo-enrichment adapter: provider trait, orchestration, offline table.
pub mod geocode;
/// Golden-record selection by field completeness.
pub mod golden;
/// Aggregate grouping metrics.
pub mod metrics;
/// Text normalization helpers.
pub mod normalize;
/// Caller-side orchestration: blocking, composite ids, stewardship.
pub mod pipeline;
/// Token-set name similarity.
pub mod similarity;
/// Great-circle spatial index.
pub mod spatial;
/// Shared type aliases.
pub mod types;

pub use cluster::{ClusterOutcome, ClusterRecord, build_clusters};
pub use config::{ClusterConfig, EnrichConfig, PipelineConfig};
pub use data::{Coordinates, GeoFix, GeoStatus, PropertyRecord};
pub use errors::DedupeError;
pub use feed::{FeedReader, discover_feeds, write_enriched, write_golden, write_stewardship};
pub use geocode::{GeoHit, GeoQuery, Geocoder, StaticGeocoder, enrich_record, enrich_records};
#[cfg(feature = "providers")]
pub use geocode::{LocationIqGeocoder, MapsCoGeocoder};
pub use golden::{completeness_score, select_golden};
pub use metrics::{GroupShare, GroupSkew, group_skew};
pub use normalize::{normalize_name, normalize_text};
pub use pipeline::PipelineReport;
pub use similarity::{related_names, token_set_ratio};
pub use spatial::{SpatialIndex, haversine_distance_m};
pub use types::{
    BlockKey, ClusterId, FeedId, GeoSource, GroupId, RecordId, SourceCode,
};
