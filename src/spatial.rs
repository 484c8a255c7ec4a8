//! Great-circle spatial index over enriched coordinates.
//!
//! Built once per clustering pass from the geolocated subset and immutable
//! for its duration. Radius queries are answered in angular distance space:
//! the search radius in meters is converted to radians
//! (`radius_m / EARTH_RADIUS_M`), a latitude-aware bounding envelope
//! prefilters the R-tree, and an exact haversine test decides membership,
//! inclusive at the boundary.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, PI};

use rstar::{AABB, RTree, RTreeObject};

use crate::constants::clustering::{DISTANCE_EPSILON_M, EARTH_RADIUS_M};
use crate::data::Coordinates;
use crate::errors::DedupeError;
use crate::types::BlockKey;

/// One indexed record position, stored in radians.
#[derive(Clone, Debug)]
struct IndexedPoint {
    slot: usize,
    lat_rad: f64,
    lon_rad: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat_rad, self.lon_rad])
    }
}

/// Immutable radius-query index over a set of `(slot, coordinates)` pairs.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load an index from slot/coordinate pairs.
    ///
    /// Coordinates are converted to radians once here. Non-finite input is
    /// an index build failure; callers are expected to have validated
    /// ranges already. An empty slice builds an empty, queryable index.
    pub fn build(points: &[(usize, Coordinates)]) -> Result<Self, DedupeError> {
        let mut entries = Vec::with_capacity(points.len());
        for (slot, coords) in points {
            if !coords.lat.is_finite() || !coords.lon.is_finite() {
                return Err(DedupeError::IndexBuild {
                    block: BlockKey::new(),
                    details: format!(
                        "non-finite coordinates ({}, {}) at slot {slot}",
                        coords.lat, coords.lon
                    ),
                });
            }
            entries.push(IndexedPoint {
                slot: *slot,
                lat_rad: coords.lat.to_radians(),
                lon_rad: coords.lon.to_radians(),
            });
        }
        let len = entries.len();
        Ok(Self {
            tree: RTree::bulk_load(entries),
            len,
        })
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// All indexed slots within `radius_m` meters of the query point,
    /// boundary inclusive, in ascending slot order. Includes the query
    /// point's own slot when it is indexed.
    pub fn query_radius(&self, center: Coordinates, radius_m: f64) -> Vec<usize> {
        if self.len == 0 {
            return Vec::new();
        }
        let lat_rad = center.lat.to_radians();
        let lon_rad = center.lon.to_radians();
        let ang = (radius_m + DISTANCE_EPSILON_M) / EARTH_RADIUS_M;

        let dlat = ang;
        let dlon = if lat_rad.abs() + dlat >= FRAC_PI_2 {
            // The circle reaches a pole; every longitude qualifies.
            PI
        } else {
            (ang.sin() / lat_rad.cos()).asin()
        };

        let mut hits: BTreeSet<usize> = BTreeSet::new();
        for shift in [0.0, -2.0 * PI, 2.0 * PI] {
            let lo = [lat_rad - dlat, lon_rad - dlon + shift];
            let hi = [lat_rad + dlat, lon_rad + dlon + shift];
            if lo[1] > PI || hi[1] < -PI {
                continue;
            }
            let envelope = AABB::from_corners(lo, hi);
            for point in self.tree.locate_in_envelope(&envelope) {
                let distance =
                    haversine_rad(lat_rad, lon_rad, point.lat_rad, point.lon_rad) * EARTH_RADIUS_M;
                if distance <= radius_m + DISTANCE_EPSILON_M {
                    hits.insert(point.slot);
                }
            }
        }
        hits.into_iter().collect()
    }
}

/// Great-circle distance between two coordinate pairs, in meters.
pub fn haversine_distance_m(a: Coordinates, b: Coordinates) -> f64 {
    haversine_rad(
        a.lat.to_radians(),
        a.lon.to_radians(),
        b.lat.to_radians(),
        b.lon.to_radians(),
    ) * EARTH_RADIUS_M
}

/// Angular haversine distance in radians.
fn haversine_rad(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * a.sqrt().min(1.0).asin()
}
