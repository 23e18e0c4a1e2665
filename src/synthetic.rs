use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::bbox::BBox;
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::pipeline::Detector;

/// Deterministic-shape detection generator for running the pipeline
/// without a perception model.
///
/// Boxes sweep the frame on a 15 second cycle with a sinusoidal vertical
/// path, so downstream tracking and forecasting see plausible motion.
pub struct SyntheticDetector {
    rng: StdRng,
}

impl SyntheticDetector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn generate(&mut self, frame: &Frame) -> Vec<Detection> {
        let width = frame.width() as f32;
        let height = frame.height() as f32;
        if width == 0.0 || height == 0.0 {
            return Vec::new();
        }

        let count = self.rng.gen_range(1..=3);
        let phase = (frame.timestamp_ms.rem_euclid(15_000)) as f32 / 15_000.0;

        (0..count)
            .map(|i| {
                let jitter = self.rng.gen::<f32>() * 0.2;
                let box_w = width * (0.08 + 0.04 * jitter);
                let box_h = height * (0.08 + 0.04 * jitter);

                let normalized = (phase + i as f32 * 0.25) % 1.0;
                let x = (width - box_w) * normalized;
                let y = (height - box_h)
                    * (0.2 + 0.6 * ((normalized + jitter) * std::f32::consts::TAU).sin().abs());

                Detection {
                    camera_id: frame.camera_id.clone(),
                    class: i,
                    label: "test-object".to_string(),
                    confidence: 0.65 + self.rng.gen::<f32>() * 0.1,
                    bbox: BBox::ltwh(x, y, box_w, box_h),
                    timestamp_ms: frame.timestamp_ms,
                }
            })
            .collect()
    }
}

impl Default for SyntheticDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SyntheticDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Error> {
        Ok(self.generate(frame))
    }
}

/// Decorator that substitutes synthetic detections whenever the wrapped
/// detector fails or comes back empty.
///
/// Fabrication is an explicit deployment choice made by wrapping the real
/// detector; a bare detector never invents measurements on its own.
pub struct FallbackDetector<D: Detector> {
    inner: D,
    synthetic: SyntheticDetector,
}

impl<D: Detector> FallbackDetector<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            synthetic: SyntheticDetector::new(),
        }
    }
}

impl<D: Detector> Detector for FallbackDetector<D> {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Error> {
        match self.inner.detect(frame) {
            Ok(detections) if !detections.is_empty() => Ok(detections),
            Ok(_) => Ok(self.synthetic.generate(frame)),
            Err(err) => {
                warn!(camera = %frame.camera_id, error = %err, "detector failed, substituting synthetic detections");
                Ok(self.synthetic.generate(frame))
            }
        }
    }
}
