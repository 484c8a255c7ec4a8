//! Caller-side orchestration around the engine: blocking by normalized
//! city, per-block clustering, composite group ids, golden selection, and
//! the stewardship queue.
//!
//! Blocks are independent clustering units: each owns its spatial index and
//! consumed-set, so the per-block fan-out shares no mutable state. Within a
//! block the engine stays strictly sequential.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::cluster::{ClusterOutcome, ClusterRecord, build_clusters};
use crate::config::PipelineConfig;
use crate::data::{GeoStatus, PropertyRecord};
use crate::errors::DedupeError;
use crate::golden::select_golden;
use crate::normalize::{normalize_name, normalize_text};
use crate::types::{BlockKey, GroupId, RecordId};

/// Everything a clustering run produces for its caller.
#[derive(Clone, Debug, Default)]
pub struct PipelineReport {
    /// Composite group id (`<block key>_<cluster id>`) to ordered members.
    pub groups: IndexMap<GroupId, Vec<RecordId>>,
    /// Record id to its resolved group.
    pub assignment: IndexMap<RecordId, GroupId>,
    /// Group id to the representative record chosen by completeness.
    pub golden: IndexMap<GroupId, RecordId>,
    /// Records whose enrichment failed, queued for manual review.
    pub stewardship: Vec<RecordId>,
    /// Blocks whose clustering pass failed, with the failure reason.
    /// Records of a failed block are absent from `groups`.
    pub failed_blocks: Vec<(BlockKey, String)>,
}

/// Run the full dedupe pass over already-enriched records.
///
/// Configuration errors are fatal; a per-block index failure is recorded in
/// `failed_blocks` while the remaining blocks complete.
pub fn run(records: &[PropertyRecord], config: &PipelineConfig) -> Result<PipelineReport, DedupeError> {
    config.cluster.validate()?;

    let views: Vec<ClusterRecord> = records
        .iter()
        .map(|record| {
            ClusterRecord::new(
                record.id.clone(),
                record.coordinates,
                record.source_code.clone(),
                normalize_name(&record.name),
            )
        })
        .collect();

    // Sorted block iteration keeps group ids stable across runs.
    let mut blocks: BTreeMap<BlockKey, Vec<usize>> = BTreeMap::new();
    for (slot, record) in records.iter().enumerate() {
        blocks
            .entry(normalize_text(&record.city))
            .or_default()
            .push(slot);
    }
    let blocks: Vec<(BlockKey, Vec<usize>)> = blocks.into_iter().collect();
    info!(records = records.len(), blocks = blocks.len(), "dedupe run started");

    let outcomes: Vec<(BlockKey, Result<ClusterOutcome, DedupeError>)> = blocks
        .par_iter()
        .map(|(key, slots)| {
            let block_view: Vec<ClusterRecord> =
                slots.iter().map(|slot| views[*slot].clone()).collect();
            (key.clone(), build_clusters(&block_view, &config.cluster))
        })
        .collect();

    let mut report = PipelineReport::default();
    for (key, outcome) in outcomes {
        match outcome {
            Ok(outcome) => {
                for (cluster_id, members) in outcome.groups {
                    let group_id: GroupId = format!("{key}_{cluster_id}");
                    for member in &members {
                        report.assignment.insert(member.clone(), group_id.clone());
                    }
                    report.groups.insert(group_id, members);
                }
            }
            Err(err) => {
                warn!(block = %key, %err, "block clustering failed");
                report.failed_blocks.push((key, err.to_string()));
            }
        }
    }

    let by_id: HashMap<&str, &PropertyRecord> = records
        .iter()
        .map(|record| (record.id.as_str(), record))
        .collect();
    for (group_id, members) in &report.groups {
        let present: Vec<&PropertyRecord> = members
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect();
        if let Some(golden) = select_golden(&present) {
            report.golden.insert(group_id.clone(), golden.clone());
        }
    }

    report.stewardship = records
        .iter()
        .filter(|record| record.geo_status == GeoStatus::Failed)
        .map(|record| record.id.clone())
        .collect();

    info!(
        groups = report.groups.len(),
        stewardship = report.stewardship.len(),
        failed_blocks = report.failed_blocks.len(),
        "dedupe run finished"
    );
    Ok(report)
}
