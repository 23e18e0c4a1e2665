use serde_derive::{Deserialize, Serialize};

/// Association and motion-estimation thresholds.
///
/// Defaults mirror the values the engine was tuned with; they are plain
/// fields so tests and deployments can override any of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum centroid distance (px) for a detection to join a track.
    pub max_association_distance: f32,
    /// Minimum box IoU accepted when the distance override does not apply.
    pub min_iou: f32,
    /// Track eviction threshold: maximum gap since last update (ms).
    pub ttl_ms: i64,
    /// Per-predict velocity decay coefficient.
    pub process_noise: f32,
    /// Measurement blend weight kept on the previous estimate.
    pub measurement_noise: f32,
    /// Forecast horizons in seconds, emitted after the horizon-0 point.
    pub horizons_secs: Vec<f32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_association_distance: 150.0,
            min_iou: 0.1,
            ttl_ms: 2_000,
            process_noise: 0.01,
            measurement_noise: 0.1,
            horizons_secs: vec![0.5, 1.0],
        }
    }
}

/// One camera/video source definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub camera_id: String,
    pub source: String,
    /// Target processing rate; 0 disables pacing.
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

fn default_target_fps() -> u32 {
    30
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default)]
    pub tracker: TrackerConfig,
}
