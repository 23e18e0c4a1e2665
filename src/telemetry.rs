use serde_derive::{Deserialize, Serialize};

use crate::track::Snapshot;

/// Per-track payload inside a telemetry record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjectTelemetry {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vx: f32,
    pub vy: f32,
    pub label: String,
    pub confidence: f32,
}

/// One camera's tracking output for one frame, ready for serialization.
///
/// A record is published every processed frame, including frames with no
/// surviving tracks, so subscribers can distinguish "no objects" from
/// "camera silent".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub camera_id: String,
    pub timestamp_ms: i64,
    pub objects: Vec<ObjectTelemetry>,
}

impl TelemetryRecord {
    pub fn from_snapshots(
        camera_id: impl Into<String>,
        timestamp_ms: i64,
        snapshots: &[Snapshot],
    ) -> Self {
        let objects = snapshots
            .iter()
            .map(|s| ObjectTelemetry {
                id: s.id,
                x: s.bbox.x,
                y: s.bbox.y,
                width: s.bbox.w,
                height: s.bbox.h,
                vx: s.vx,
                vy: s.vy,
                label: s.label.clone(),
                confidence: s.confidence,
            })
            .collect();

        Self {
            camera_id: camera_id.into(),
            timestamp_ms,
            objects,
        }
    }
}
