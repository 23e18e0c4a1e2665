use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

use crate::association::TrackView;
use crate::bbox::BBox;
use crate::detection::Detection;
use crate::filter::MotionEstimator;

/// Persistent identity for one object observed across frames.
///
/// A track is born already initialized from its first matching detection
/// and is owned exclusively by the camera context that created it.
pub struct Track {
    id: u64,
    filter: Box<dyn MotionEstimator + Send>,
    class: i32,
    label: String,
    confidence: f32,
    last_update_ms: i64,
}

impl Track {
    pub fn new(id: u64, filter: Box<dyn MotionEstimator + Send>) -> Self {
        Self {
            id,
            filter,
            class: -1,
            label: "unknown".to_string(),
            confidence: 0.0,
            last_update_ms: 0,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn last_update_ms(&self) -> i64 {
        self.last_update_ms
    }

    /// Age the track forward without a matching detection.
    pub fn predict(&mut self, now_ms: i64) {
        self.filter.predict(now_ms);
    }

    /// Blend a matched detection into the track state.
    pub fn apply(&mut self, detection: &Detection, now_ms: i64) {
        self.filter.update(detection);
        self.class = detection.class;
        self.label = detection.label.clone();
        self.confidence = detection.confidence;
        // Frames arrive in order per camera, so this never decreases.
        self.last_update_ms = self.last_update_ms.max(now_ms);
    }

    #[inline]
    pub fn is_stale(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms - self.last_update_ms > ttl_ms
    }

    #[inline]
    pub fn view(&self) -> TrackView {
        TrackView {
            bbox: self.filter.state().bbox(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.filter.state();
        Snapshot {
            id: self.id,
            class: self.class,
            label: self.label.clone(),
            confidence: self.confidence,
            bbox: state.bbox(),
            vx: state.velocity.x,
            vy: state.velocity.y,
            last_update_ms: self.last_update_ms,
        }
    }
}

/// Read-only projection of a track for downstream consumers; produced
/// fresh every frame and safe to move across threads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: u64,
    pub class: i32,
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox,
    pub vx: f32,
    pub vy: f32,
    pub last_update_ms: i64,
}

impl Snapshot {
    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.bbox.centroid()
    }
}
