/// Constants used by the clustering engine and spatial index.
pub mod clustering {
    /// Mean Earth radius in meters used for haversine distances.
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;
    /// Default geospatial radius for candidate generation.
    /// Urban density: 80-150. Rural/sparse density: 250-400.
    pub const DISTANCE_THRESHOLD_M: f64 = 120.0;
    /// Default minimum token-set similarity (0-100) for a name-based match.
    pub const NAME_SIMILARITY_THRESHOLD: u32 = 75;
    /// Slack added to the inclusive radius comparison.
    ///
    /// Far below one meter, so a candidate exactly at the threshold is
    /// included and one a meter beyond is not, regardless of float rounding.
    pub const DISTANCE_EPSILON_M: f64 = 1e-6;
}

/// Constants used by text normalization.
pub mod normalize {
    /// Generic lodging words stripped from names before comparison.
    pub const NAME_STOPWORDS: [&str; 7] = [
        "hotel",
        "the",
        "inn",
        "resort",
        "by",
        "and",
        "international",
    ];
    /// Address abbreviations expanded to their full forms.
    pub const ADDRESS_ABBREVIATIONS: [(&str, &str); 13] = [
        ("st.", "street"),
        ("rd.", "road"),
        ("ave.", "avenue"),
        ("blvd.", "boulevard"),
        ("dr.", "drive"),
        ("ln.", "lane"),
        ("hwy.", "highway"),
        ("mt.", "mount"),
        ("ctr.", "center"),
        ("plz.", "plaza"),
        ("sq.", "square"),
        ("apt.", "apartment"),
        ("fl.", "floor"),
    ];
    /// City nicknames mapped to their canonical spellings.
    pub const CITY_SYNONYMS: [(&str, &str); 4] = [
        ("nyc", "new york"),
        ("sf", "san francisco"),
        ("la", "los angeles"),
        ("washington dc", "washington"),
    ];
}

/// Constants used by geo-enrichment orchestration and providers.
pub mod geocode {
    /// Minimum provider confidence accepted from maps.co responses.
    pub const MAPS_CO_CONFIDENCE_FLOOR: f64 = 0.6;
    /// Minimum provider confidence accepted from LocationIQ responses.
    pub const LOCATIONIQ_CONFIDENCE_FLOOR: f64 = 0.5;
    /// Confidence floor applied to providers that do not override it.
    pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.5;
    /// Pause between failed lookup rounds, for provider rate limits.
    pub const PACING_DELAY_MS: u64 = 600;
    /// Suffix appended to a provider id when the zip-less retry succeeded.
    pub const FALLBACK_SOURCE_SUFFIX: &str = "_fallback";
    /// Provenance label for records no provider could resolve.
    pub const SOURCE_NONE: &str = "none";
    /// Provenance label for coordinates supplied by the feed itself.
    pub const SOURCE_FEED: &str = "feed";
    /// maps.co forward-geocoding endpoint.
    pub const MAPS_CO_ENDPOINT: &str = "https://geocode.maps.co/search";
    /// LocationIQ forward-geocoding endpoint.
    pub const LOCATIONIQ_ENDPOINT: &str = "https://us1.locationiq.com/v1/search";
}

/// Constants used by feed ingestion and report layout.
pub mod feed {
    /// Property name column.
    pub const COL_NAME: &str = "Hotel Name";
    /// Street address column.
    pub const COL_ADDRESS: &str = "Hotel Address";
    /// City column (also the blocking key source).
    pub const COL_CITY: &str = "Hotel City";
    /// Postal code column.
    pub const COL_ZIP: &str = "Hotel Zip";
    /// External chain/provider code column.
    pub const COL_SOURCE_CODE: &str = "GDS Code";
    /// Minted row identifier column.
    pub const COL_ROW_ID: &str = "Row_Id";
    /// Originating feed column in reports.
    pub const COL_FEED: &str = "Feed";
    /// Enriched latitude column.
    pub const COL_LAT: &str = "Enriched_Lat";
    /// Enriched longitude column.
    pub const COL_LON: &str = "Enriched_Lon";
    /// Enrichment provenance column.
    pub const COL_GEO_SOURCE: &str = "Geo_Source";
    /// Enrichment status column.
    pub const COL_GEO_STATUS: &str = "Geo_Status";
    /// Resolved group id column.
    pub const COL_GROUP_ID: &str = "Id";
    /// Prefix for minted row identifiers (`ROW-000001`, ...).
    pub const ROW_ID_PREFIX: &str = "ROW-";
    /// Default filename for the full enriched/grouped report.
    pub const ENRICHED_FILENAME: &str = "enriched_properties.csv";
    /// Default filename for the golden-record report.
    pub const GOLDEN_FILENAME: &str = "golden_properties.csv";
    /// Default filename for the manual-review queue.
    pub const STEWARDSHIP_FILENAME: &str = "stewardship_queue.csv";
    /// Log message used when unreadable feed rows are skipped.
    pub const SKIP_UNREADABLE_MSG: &str = "skipping unreadable feed row";
}
