use serde_derive::{Deserialize, Serialize};

use crate::track::Snapshot;

/// Horizons used when a deployment does not configure its own.
pub const DEFAULT_HORIZONS: [f32; 2] = [0.5, 1.0];

/// One point of a projected trajectory, in pixel coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub horizon_secs: f32,
}

/// Linear dead-reckoning from a track's current centroid and velocity.
///
/// The first point is always the horizon-0 centroid so consumers can draw
/// the path anchored at the object, followed by one point per requested
/// horizon in the given order.
pub fn forecast(snapshot: &Snapshot, horizons_secs: &[f32]) -> Vec<PathPoint> {
    let centroid = snapshot.centroid();

    let mut path = Vec::with_capacity(1 + horizons_secs.len());
    path.push(PathPoint {
        x: centroid.x,
        y: centroid.y,
        horizon_secs: 0.0,
    });

    for &h in horizons_secs {
        path.push(PathPoint {
            x: centroid.x + snapshot.vx * h,
            y: centroid.y + snapshot.vy * h,
            horizon_secs: h,
        });
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;
    use approx::assert_relative_eq;

    fn snapshot(vx: f32, vy: f32) -> Snapshot {
        Snapshot {
            id: 1,
            class: 2,
            label: "car".into(),
            confidence: 0.9,
            bbox: BBox::ltwh(90.0, 40.0, 20.0, 20.0),
            vx,
            vy,
            last_update_ms: 1_000,
        }
    }

    #[test]
    fn first_point_is_current_centroid() {
        let path = forecast(&snapshot(30.0, -10.0), &DEFAULT_HORIZONS);
        assert_eq!(path.len(), 3);
        assert_relative_eq!(path[0].x, 100.0);
        assert_relative_eq!(path[0].y, 50.0);
        assert_relative_eq!(path[0].horizon_secs, 0.0);
    }

    #[test]
    fn horizons_extrapolate_linearly() {
        let path = forecast(&snapshot(30.0, -10.0), &DEFAULT_HORIZONS);

        assert_relative_eq!(path[1].x, 115.0);
        assert_relative_eq!(path[1].y, 45.0);
        assert_relative_eq!(path[1].horizon_secs, 0.5);

        assert_relative_eq!(path[2].x, 130.0);
        assert_relative_eq!(path[2].y, 40.0);
        assert_relative_eq!(path[2].horizon_secs, 1.0);
    }

    #[test]
    fn zero_velocity_collapses_to_the_centroid() {
        let path = forecast(&snapshot(0.0, 0.0), &[0.5, 1.0, 2.0]);
        for p in &path {
            assert_relative_eq!(p.x, 100.0);
            assert_relative_eq!(p.y, 50.0);
        }
    }

    #[test]
    fn empty_horizons_still_yield_the_anchor_point() {
        let path = forecast(&snapshot(30.0, -10.0), &[]);
        assert_eq!(path.len(), 1);
        assert_relative_eq!(path[0].horizon_secs, 0.0);
    }
}
