use serde_derive::{Deserialize, Serialize};

use crate::bbox::BBox;

/// One frame's raw perception output, immutable once produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub camera_id: String,
    pub class: i32,
    pub label: String,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
    pub bbox: BBox,
    /// Capture timestamp, monotonic milliseconds.
    pub timestamp_ms: i64,
}

impl Detection {
    #[inline]
    pub fn centroid(&self) -> nalgebra::Point2<f32> {
        self.bbox.centroid()
    }
}
