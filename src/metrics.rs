use indexmap::IndexMap;

use crate::types::{GroupId, RecordId};

/// Aggregate size metrics for a resolved grouping.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSkew {
    pub total_records: usize,
    pub groups: usize,
    pub singletons: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Share of records that were folded into another record's group.
    pub duplicate_rate: f64,
    pub largest: Vec<GroupShare>,
}

/// Per-group share of the record set for skew inspection.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupShare {
    pub group: GroupId,
    pub count: usize,
    pub share: f64,
}

/// Compute size metrics from a group-to-members mapping.
pub fn group_skew(groups: &IndexMap<GroupId, Vec<RecordId>>) -> Option<GroupSkew> {
    if groups.is_empty() {
        return None;
    }
    let total_records: usize = groups.values().map(Vec::len).sum();
    let group_count = groups.len();
    let min = groups.values().map(Vec::len).min().expect("groups non-empty");
    let max = groups.values().map(Vec::len).max().expect("groups non-empty");
    let singletons = groups.values().filter(|members| members.len() == 1).count();
    let mean = total_records as f64 / group_count as f64;
    let duplicate_rate = if total_records == 0 {
        0.0
    } else {
        (total_records - group_count) as f64 / total_records as f64
    };
    let mut largest: Vec<GroupShare> = groups
        .iter()
        .map(|(group, members)| GroupShare {
            group: group.clone(),
            count: members.len(),
            share: if total_records == 0 {
                0.0
            } else {
                members.len() as f64 / total_records as f64
            },
        })
        .collect();
    largest.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.group.cmp(&b.group)));
    Some(GroupSkew {
        total_records,
        groups: group_count,
        singletons,
        min,
        max,
        mean,
        duplicate_rate,
        largest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(entries: &[(&str, &[&str])]) -> IndexMap<GroupId, Vec<RecordId>> {
        entries
            .iter()
            .map(|(group, members)| {
                (
                    group.to_string(),
                    members.iter().map(|id| id.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn group_skew_reports_dedupe_rate() {
        let groups = groups(&[
            ("nyc_0", &["a", "b", "c"]),
            ("nyc_1", &["d"]),
            ("boston_0", &["e", "f"]),
        ]);
        let skew = group_skew(&groups).expect("skew");
        assert_eq!(skew.total_records, 6);
        assert_eq!(skew.groups, 3);
        assert_eq!(skew.singletons, 1);
        assert_eq!(skew.min, 1);
        assert_eq!(skew.max, 3);
        assert!((skew.mean - 2.0).abs() < 1e-6);
        assert!((skew.duplicate_rate - 0.5).abs() < 1e-6);
        assert_eq!(skew.largest[0].group, "nyc_0");
        assert_eq!(skew.largest[0].count, 3);
    }

    #[test]
    fn all_singletons_mean_no_duplicates() {
        let groups = groups(&[("a_0", &["a"]), ("b_0", &["b"])]);
        let skew = group_skew(&groups).expect("skew");
        assert_eq!(skew.singletons, 2);
        assert!((skew.duplicate_rate - 0.0).abs() < 1e-6);
    }

    #[test]
    fn empty_mapping_has_no_skew() {
        assert!(group_skew(&IndexMap::new()).is_none());
    }
}
