/// Unique record identifier (stable for the lifetime of a run).
/// Example: `ROW-000042`
pub type RecordId = String;
/// Identifier for the travel-data feed that produced a record.
/// Examples: `gds_extract`, `ota_partner_eu`
pub type FeedId = String;
/// External chain/provider code attached to a property by a feed.
/// Example: `MC1234` (a GDS property code)
pub type SourceCode = String;
/// Normalized blocking key used to partition records before clustering.
/// Examples: `new york`, `san francisco`, `` (records with no city)
pub type BlockKey = String;
/// Per-block cluster identifier minted in discovery order.
pub type ClusterId = usize;
/// Composite group label assigned to a resolved cluster.
/// Example: `new york_3` (block key + per-block cluster id)
pub type GroupId = String;
/// Provenance label for an enriched coordinate pair.
/// Examples: `maps_co`, `locationiq_fallback`, `none`
pub type GeoSource = String;
