//! Single-pass clustering engine.
//!
//! Consumes the spatial index, the name-similarity gate, and per-record
//! metadata (source code, normalized name) and produces a partition of
//! record ids into clusters. The pass is sequential and order-dependent:
//! consumption marking must happen-before later iterations observe it, so
//! the anchor loop must not be parallelized. Blocking (for example by city)
//! is a caller concern; the engine sees one flat record sequence at a time
//! and is unaware of block identity.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::ClusterConfig;
use crate::data::Coordinates;
use crate::errors::DedupeError;
use crate::similarity::related_names;
use crate::spatial::SpatialIndex;
use crate::types::{ClusterId, RecordId, SourceCode};

/// Engine-facing view of one record: identity plus the only fields the
/// matching gate reads.
#[derive(Clone, Debug)]
pub struct ClusterRecord {
    /// Stable record identifier.
    pub id: RecordId,
    /// Enriched coordinates; invalid or missing demotes to a singleton.
    pub coordinates: Option<Coordinates>,
    /// External chain/provider code, if any.
    pub source_code: Option<SourceCode>,
    /// Pre-normalized comparison name (possibly empty).
    pub norm_name: String,
}

impl ClusterRecord {
    /// Build a record view from its parts.
    pub fn new(
        id: impl Into<RecordId>,
        coordinates: Option<Coordinates>,
        source_code: Option<SourceCode>,
        norm_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            coordinates,
            source_code: source_code.filter(|code| !code.trim().is_empty()),
            norm_name: norm_name.into(),
        }
    }

    fn valid_coordinates(&self) -> Option<Coordinates> {
        self.coordinates.filter(|c| c.is_valid())
    }
}

/// Result of one clustering pass: an ordered partition of the input.
#[derive(Clone, Debug, Default)]
pub struct ClusterOutcome {
    /// Cluster id (minted in discovery order) to ordered member ids.
    /// Every input record appears in exactly one cluster.
    pub groups: IndexMap<ClusterId, Vec<RecordId>>,
    /// Ids of records that lacked valid coordinates and were emitted as
    /// unresolved-location singletons.
    pub unresolved: Vec<RecordId>,
}

impl ClusterOutcome {
    /// Total records covered by the partition.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Run one clustering pass over `records` in input order.
///
/// Records with valid coordinates are indexed and clustered by radius
/// candidacy plus the source-code/name gate; all others are emitted as
/// singletons. Single-pass semantics: a candidate rejected by one anchor
/// stays unconsumed and may anchor or join a later cluster, so transitive
/// chains are not closed. Known limitation, kept for output compatibility.
pub fn build_clusters(
    records: &[ClusterRecord],
    config: &ClusterConfig,
) -> Result<ClusterOutcome, DedupeError> {
    config.validate()?;

    let mut outcome = ClusterOutcome::default();
    if records.is_empty() {
        return Ok(outcome);
    }

    // Step 1: partition by coordinate validity.
    let mut geolocated: Vec<(usize, Coordinates)> = Vec::new();
    let mut unresolved_slots: Vec<usize> = Vec::new();
    for (slot, record) in records.iter().enumerate() {
        match record.valid_coordinates() {
            Some(coords) => geolocated.push((slot, coords)),
            None => unresolved_slots.push(slot),
        }
    }

    // Step 2: spatial index over the geolocated subset.
    let index = SpatialIndex::build(&geolocated)?;
    debug!(
        geolocated = geolocated.len(),
        unresolved = unresolved_slots.len(),
        "clustering pass started"
    );

    // Step 3: sequential cluster formation. The consumed-set is owned by
    // this pass alone.
    let mut consumed: HashSet<usize> = HashSet::with_capacity(geolocated.len());
    let mut next_id: ClusterId = 0;
    for &(anchor_slot, anchor_coords) in &geolocated {
        if consumed.contains(&anchor_slot) {
            continue;
        }
        let anchor = &records[anchor_slot];
        let candidates = index.query_radius(anchor_coords, config.distance_threshold_m);

        let mut members: Vec<usize> = vec![anchor_slot];
        for candidate_slot in candidates {
            if candidate_slot == anchor_slot || consumed.contains(&candidate_slot) {
                continue;
            }
            let candidate = &records[candidate_slot];
            if accepts(anchor, candidate, config) {
                members.push(candidate_slot);
            }
        }

        for slot in &members {
            consumed.insert(*slot);
        }
        outcome.groups.insert(
            next_id,
            members.iter().map(|slot| records[*slot].id.clone()).collect(),
        );
        next_id += 1;
    }

    // Unresolved-location records are always isolated singletons; name-only
    // matching without coordinates is unsafe.
    for slot in unresolved_slots {
        let id = records[slot].id.clone();
        outcome.groups.insert(next_id, vec![id.clone()]);
        outcome.unresolved.push(id);
        next_id += 1;
    }

    debug!(clusters = outcome.groups.len(), "clustering pass finished");
    Ok(outcome)
}

/// Membership gate evaluated pairwise against the anchor: a shared
/// non-empty source code short-circuits the name comparison.
fn accepts(anchor: &ClusterRecord, candidate: &ClusterRecord, config: &ClusterConfig) -> bool {
    if let (Some(a), Some(c)) = (anchor.source_code.as_deref(), candidate.source_code.as_deref()) {
        if a == c {
            return true;
        }
    }
    related_names(
        &anchor.norm_name,
        &candidate.norm_name,
        config.name_similarity_threshold,
    )
}
