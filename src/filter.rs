use nalgebra as na;

use crate::bbox::BBox;
use crate::detection::Detection;

/// Immutable view of an estimator's current belief.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    /// Top-left corner of the estimated box.
    pub position: na::Point2<f32>,
    pub size: na::Vector2<f32>,
    /// Pixels per second.
    pub velocity: na::Vector2<f32>,
}

impl FilterState {
    #[inline]
    pub fn bbox(&self) -> BBox {
        BBox::ltwh(self.position.x, self.position.y, self.size.x, self.size.y)
    }

    #[inline]
    pub fn centroid(&self) -> na::Point2<f32> {
        self.position + self.size / 2.0
    }
}

/// Per-track motion estimation strategy.
///
/// `predict` ages the state when no detection matched this frame; `update`
/// blends a new measurement in. The engine only depends on this contract,
/// so a covariance-propagating filter can replace [`VelocityFilter`]
/// without touching association or lifecycle code.
pub trait MotionEstimator {
    fn predict(&mut self, now_ms: i64);
    fn update(&mut self, detection: &Detection);
    fn state(&self) -> FilterState;
}

/// Constant-velocity estimator with fixed-coefficient exponential
/// smoothing. There is no covariance propagation here; the blend weights
/// are constants, which is enough for fixed-camera surveillance motion.
#[derive(Debug, Clone)]
pub struct VelocityFilter {
    pos: na::Point2<f32>,
    size: na::Vector2<f32>,
    vel: na::Vector2<f32>,
    /// Last time the state was advanced (predict or update).
    last_ts: i64,
    /// Last time a measurement arrived; basis for the velocity dt.
    last_measurement_ts: i64,
    initialized: bool,
    process_noise: f32,
    measurement_noise: f32,
}

impl VelocityFilter {
    pub fn new(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            pos: na::Point2::new(0.0, 0.0),
            size: na::Vector2::new(0.0, 0.0),
            vel: na::Vector2::new(0.0, 0.0),
            last_ts: 0,
            last_measurement_ts: 0,
            initialized: false,
            process_noise,
            measurement_noise,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    fn delta_seconds(previous_ms: i64, current_ms: i64) -> f32 {
        ((current_ms - previous_ms) as f32 / 1000.0).max(0.0)
    }
}

impl MotionEstimator for VelocityFilter {
    fn predict(&mut self, now_ms: i64) {
        if !self.initialized {
            return;
        }

        let dt = Self::delta_seconds(self.last_ts, now_ms);
        self.last_ts = now_ms;

        self.pos += self.vel * dt;
        self.vel *= 1.0 - self.process_noise;
    }

    fn update(&mut self, detection: &Detection) {
        let ts = detection.timestamp_ms;
        let b = detection.bbox;

        if !self.initialized {
            self.pos = na::Point2::new(b.x, b.y);
            self.size = na::Vector2::new(b.w, b.h);
            self.vel = na::Vector2::new(0.0, 0.0);
            self.last_ts = ts;
            self.last_measurement_ts = ts;
            self.initialized = true;
            return;
        }

        let dt = Self::delta_seconds(self.last_measurement_ts, ts);
        self.last_ts = ts;
        self.last_measurement_ts = ts;

        let alpha = 1.0 - self.measurement_noise;
        let measured = na::Point2::new(b.x, b.y);

        self.pos = (measured.coords * alpha + self.pos.coords * self.measurement_noise).into();
        self.size = na::Vector2::new(b.w, b.h) * alpha + self.size * self.measurement_noise;

        if dt > 0.0 {
            let instantaneous = (measured - self.pos) / dt;
            self.vel = instantaneous * alpha + self.vel * self.measurement_noise;
        }
    }

    fn state(&self) -> FilterState {
        FilterState {
            position: self.pos,
            size: self.size,
            velocity: self.vel,
        }
    }
}
