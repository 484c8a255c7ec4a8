use golden::constants::clustering::EARTH_RADIUS_M;
use golden::{
    ClusterConfig, ClusterOutcome, ClusterRecord, Coordinates, build_clusters, normalize_name,
    related_names,
};

/// Latitude offset in degrees spanning `meters` along a meridian.
fn lat_offset_deg(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}

fn record(id: &str, coords: Option<(f64, f64)>, code: Option<&str>, raw_name: &str) -> ClusterRecord {
    ClusterRecord::new(
        id,
        coords.map(|(lat, lon)| Coordinates::new(lat, lon)),
        code.map(str::to_string),
        normalize_name(raw_name),
    )
}

fn membership(outcome: &ClusterOutcome) -> Vec<Vec<&str>> {
    outcome
        .groups
        .values()
        .map(|members| members.iter().map(String::as_str).collect())
        .collect()
}

#[test]
fn partition_property_holds_for_mixed_input() {
    let records = vec![
        record("r1", Some((40.7128, -74.0060)), None, "Grand Hotel Downtown"),
        record("r2", Some((40.7128, -74.0060)), None, "Downtown Grand Hotel"),
        record("r3", Some((40.7200, -74.0060)), Some("GDS1"), "Harbor View"),
        record("r4", Some((40.7200, -74.0060)), Some("GDS1"), "Completely Other"),
        record("r5", None, None, "Grand Hotel Downtown"),
        record("r6", Some((f64::INFINITY, 0.0)), None, "Broken Coords"),
        record("r7", Some((51.5074, -0.1278)), None, ""),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();

    let mut seen: Vec<&str> = outcome
        .groups
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    assert_eq!(seen.len(), records.len(), "no omissions");
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), records.len(), "no duplicates");
}

#[test]
fn ungeolocated_records_are_always_singletons() {
    let records = vec![
        record("r1", None, Some("GDS1"), "Grand Hotel"),
        record("r2", None, Some("GDS1"), "Grand Hotel"),
        record("r3", Some((40.0, -74.0)), Some("GDS1"), "Grand Hotel"),
        record("r4", Some((200.0, 0.0)), Some("GDS1"), "Grand Hotel"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();

    for unresolved in ["r1", "r2", "r4"] {
        let home = outcome
            .groups
            .values()
            .find(|members| members.iter().any(|id| id == unresolved))
            .unwrap();
        assert_eq!(home.len(), 1, "{unresolved} must be isolated");
    }
    assert_eq!(outcome.unresolved.len(), 3);
}

#[test]
fn name_matching_is_symmetric_after_normalization() {
    let raw_pairs = [
        ("Grand Hotel Downtown", "Downtown Grand Hotel"),
        ("The Marriott", "Marriott Downtown Hotel"),
        ("Seaside Villa", "Airport Budget Lodge"),
        ("Hôtel Première", "Hotel Premiere"),
        ("", "Grand Hotel"),
    ];
    for threshold in [0, 50, 75, 100] {
        for (a, b) in raw_pairs {
            let (na, nb) = (normalize_name(a), normalize_name(b));
            assert_eq!(
                related_names(&na, &nb, threshold),
                related_names(&nb, &na, threshold),
                "asymmetry for ({a}, {b}) at threshold {threshold}"
            );
        }
    }
}

#[test]
fn shared_source_code_merges_regardless_of_names() {
    let records = vec![
        record("r1", Some((40.0, -74.0)), Some("UA890"), "Totally Different"),
        record("r2", Some((40.0, -74.0)), Some("UA890"), "Unrelated Property"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&outcome), vec![vec!["r1", "r2"]]);
}

#[test]
fn distance_boundary_is_inclusive_at_threshold_exclusive_beyond() {
    let base = 40.7128;
    let at_threshold = base + lat_offset_deg(120.0);
    let one_meter_beyond = base + lat_offset_deg(121.0);

    let records = vec![
        record("anchor", Some((base, -74.0)), None, "Grand Plaza"),
        record("edge", Some((at_threshold, -74.0)), None, "Grand Plaza"),
        record("outside", Some((one_meter_beyond, -74.0)), None, "Grand Plaza"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(
        membership(&outcome),
        vec![vec!["anchor", "edge"], vec!["outside"]]
    );
}

#[test]
fn identical_partitions_across_repeated_runs() {
    let records: Vec<ClusterRecord> = (0..40)
        .map(|i| {
            let lat = 40.0 + lat_offset_deg(30.0 * (i % 7) as f64);
            let code = if i % 5 == 0 { Some("GDSX") } else { None };
            record(
                &format!("r{i:02}"),
                Some((lat, -74.0)),
                code,
                if i % 2 == 0 { "Grand Plaza Hotel" } else { "Harbor View Inn" },
            )
        })
        .collect();

    let first = build_clusters(&records, &ClusterConfig::default()).unwrap();
    let second = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&first), membership(&second));
}

#[test]
fn reordered_name_tokens_merge_at_default_threshold() {
    let records = vec![
        record("r1", Some((40.7128, -74.0060)), None, "Grand Hotel Downtown"),
        record("r2", Some((40.7128, -74.0060)), None, "Downtown Grand Hotel"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&outcome), vec![vec!["r1", "r2"]]);
}

#[test]
fn identical_names_two_hundred_meters_apart_stay_separate() {
    let records = vec![
        record("r1", Some((40.7128, -74.0060)), None, "Grand Hotel Downtown"),
        record(
            "r2",
            Some((40.7128 + lat_offset_deg(200.0), -74.0060)),
            None,
            "Grand Hotel Downtown",
        ),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&outcome), vec![vec!["r1"], vec!["r2"]]);
}

#[test]
fn missing_longitude_is_an_automatic_singleton() {
    // A record whose longitude failed numeric coercion arrives with no
    // coordinate pair at all; its neighbor is evaluated normally.
    let records = vec![
        record("complete", Some((40.7128, -74.0060)), None, "Grand Plaza"),
        record("truncated", None, None, "Grand Plaza"),
        record("nearby", Some((40.7128, -74.0060)), None, "Plaza Grand"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(
        membership(&outcome),
        vec![vec!["complete", "nearby"], vec!["truncated"]]
    );
}

#[test]
fn chain_without_direct_anchor_match_splits() {
    // A-B and B-C are each within radius and name-related, but C is outside
    // A's radius: the single pass consumes B into A's cluster and leaves C
    // to anchor alone. No transitive closure.
    let step = lat_offset_deg(100.0);
    let records = vec![
        record("a", Some((40.0, -74.0)), None, "Grand Plaza"),
        record("b", Some((40.0 + step, -74.0)), None, "Grand Plaza Suites"),
        record("c", Some((40.0 + 2.0 * step, -74.0)), None, "Grand Plaza Suites"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&outcome), vec![vec!["a", "b"], vec!["c"]]);
}

#[test]
fn chain_with_direct_anchor_match_merges_in_one_pass() {
    // All three fall inside the anchor's radius and match it directly, so
    // one pass emits a single cluster.
    let step = lat_offset_deg(50.0);
    let records = vec![
        record("a", Some((40.0, -74.0)), None, "Grand Plaza"),
        record("b", Some((40.0 + step, -74.0)), None, "Grand Plaza Suites"),
        record("c", Some((40.0 + 2.0 * step, -74.0)), None, "Grand Plaza Annex"),
    ];
    let outcome = build_clusters(&records, &ClusterConfig::default()).unwrap();
    assert_eq!(membership(&outcome), vec![vec!["a", "b", "c"]]);
}

#[test]
fn empty_input_returns_empty_mapping() {
    let outcome = build_clusters(&[], &ClusterConfig::default()).unwrap();
    assert!(outcome.groups.is_empty());
    assert!(outcome.unresolved.is_empty());
}
