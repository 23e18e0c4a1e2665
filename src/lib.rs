//! Multi-camera object tracking and short-horizon trajectory forecasting.
//!
//! Detections flow in per camera, the engine maintains per-camera track
//! sets behind a shared registry, and every processed frame yields track
//! snapshots, forecast paths and a telemetry record.

pub mod association;
pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod frame;
pub mod pipeline;
pub mod store;
pub mod synthetic;
pub mod telemetry;
pub mod track;

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;

pub use crate::bbox::BBox;
pub use crate::config::{CameraConfig, EngineConfig, TrackerConfig};
pub use crate::detection::Detection;
pub use crate::error::Error;
pub use crate::frame::Frame;
pub use crate::store::CameraTracks;
pub use crate::track::Snapshot;

/// Shared, concurrently accessible map of camera id to track state.
///
/// Lookups for an unknown camera create its state atomically, so two
/// threads racing on the same first frame end up sharing one
/// [`CameraTracks`] instance. After creation each camera's state sits
/// behind its own lock and cameras never contend with each other.
pub struct TrackRegistry {
    cameras: DashMap<String, Arc<Mutex<CameraTracks>>>,
    config: TrackerConfig,
}

impl TrackRegistry {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            cameras: DashMap::new(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Handle to a camera's track state, creating it on first touch.
    pub fn camera(&self, camera_id: &str) -> Arc<Mutex<CameraTracks>> {
        if let Some(existing) = self.cameras.get(camera_id) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .cameras
            .entry(camera_id.to_string())
            .or_insert_with(|| {
                info!(camera = %camera_id, "registered camera");
                Arc::new(Mutex::new(CameraTracks::new(
                    camera_id,
                    self.config.clone(),
                )))
            });
        Arc::clone(entry.value())
    }

    /// Run one tracking step for a camera's frame.
    pub fn process_frame(
        &self,
        camera_id: &str,
        detections: &[Detection],
        now_ms: i64,
    ) -> Vec<Snapshot> {
        self.camera(camera_id).lock().process_frame(detections, now_ms)
    }

    /// Non-stale tracks for a camera; empty for cameras never seen.
    pub fn active_tracks(&self, camera_id: &str, now_ms: i64) -> Vec<Snapshot> {
        match self.cameras.get(camera_id) {
            Some(entry) => entry.value().lock().active_tracks(now_ms),
            None => Vec::new(),
        }
    }

    #[inline]
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }
}
