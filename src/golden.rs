//! Golden-record selection: one representative per resolved group, chosen
//! by field completeness.

use crate::data::PropertyRecord;
use crate::types::RecordId;

/// Count of populated fields used to rank group members.
///
/// Core string fields count when non-empty; the source code, coordinates,
/// and enrichment provenance count when present; each non-empty extra
/// column counts once.
pub fn completeness_score(record: &PropertyRecord) -> usize {
    let mut score = 0;
    for field in [&record.name, &record.address, &record.city, &record.zip] {
        if !field.trim().is_empty() {
            score += 1;
        }
    }
    if record.source_code_nonempty().is_some() {
        score += 1;
    }
    if record.is_geolocated() {
        score += 2; // latitude and longitude
    }
    if record.geo_source.is_some() {
        score += 1;
    }
    score += record
        .extras
        .values()
        .filter(|value| !value.trim().is_empty())
        .count();
    score
}

/// Pick the representative of one group: highest completeness wins, ties
/// break on ascending record id so repeated runs agree.
pub fn select_golden<'a>(members: &[&'a PropertyRecord]) -> Option<&'a RecordId> {
    members
        .iter()
        .max_by(|a, b| {
            completeness_score(a)
                .cmp(&completeness_score(b))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|record| &record.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinates, GeoStatus};

    fn record(id: &str, name: &str, address: &str) -> PropertyRecord {
        let mut record = PropertyRecord::new(id, "feed_a", name);
        record.address = address.to_string();
        record
    }

    #[test]
    fn fuller_record_wins() {
        let sparse = record("ROW-000001", "Grand Plaza", "");
        let mut full = record("ROW-000002", "Grand Plaza Hotel", "1 Main Street");
        full.city = "New York".to_string();
        full.zip = "10001".to_string();
        full.coordinates = Some(Coordinates::new(40.7, -74.0));
        full.geo_status = GeoStatus::Success;

        let golden = select_golden(&[&sparse, &full]).unwrap();
        assert_eq!(golden, "ROW-000002");
    }

    #[test]
    fn ties_break_on_ascending_id() {
        let a = record("ROW-000002", "Grand Plaza", "1 Main Street");
        let b = record("ROW-000001", "Plaza Grand", "1 Main Street");
        assert_eq!(completeness_score(&a), completeness_score(&b));

        let golden = select_golden(&[&a, &b]).unwrap();
        assert_eq!(golden, "ROW-000001");
    }

    #[test]
    fn extras_contribute_to_the_score() {
        let plain = record("ROW-000001", "Grand Plaza", "1 Main Street");
        let mut tagged = record("ROW-000002", "Grand Plaza", "1 Main Street");
        tagged
            .extras
            .insert("Phone".to_string(), "+1 555 0100".to_string());
        tagged.extras.insert("Stars".to_string(), String::new());

        assert_eq!(completeness_score(&tagged), completeness_score(&plain) + 1);
        let golden = select_golden(&[&plain, &tagged]).unwrap();
        assert_eq!(golden, "ROW-000002");
    }

    #[test]
    fn empty_group_has_no_representative() {
        assert!(select_golden(&[]).is_none());
    }
}
