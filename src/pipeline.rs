use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::CameraConfig;
use crate::detection::Detection;
use crate::error::Error;
use crate::forecast::{forecast, PathPoint};
use crate::frame::Frame;
use crate::telemetry::TelemetryRecord;
use crate::track::Snapshot;
use crate::TrackRegistry;

/// Produces frames for one camera. Returning `Ok(None)` signals a clean
/// end of stream; errors are treated as fatal for the camera.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>, Error>;
}

/// Turns a frame into detections. A failing detector costs one frame of
/// measurements, never the camera.
pub trait Detector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Error>;
}

/// Draws one processed frame. Purely an output concern; failures are
/// logged and the pipeline moves on.
pub trait Renderer: Send {
    fn render(
        &mut self,
        frame: &Frame,
        snapshots: &[Snapshot],
        paths: &HashMap<u64, Vec<PathPoint>>,
    ) -> Result<(), Error>;
}

/// Publishes per-frame telemetry records.
pub trait TelemetrySink: Send {
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), Error>;
}

/// I/O endpoints for one camera worker.
pub struct CameraIo {
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn Detector>,
    pub renderer: Box<dyn Renderer>,
    pub sink: Box<dyn TelemetrySink>,
}

/// The per-camera processing loop.
///
/// One worker owns its I/O endpoints outright and shares only the track
/// registry and the stop flag with the rest of the engine.
pub struct CameraWorker {
    camera_id: String,
    frame_interval: Duration,
    registry: Arc<TrackRegistry>,
    running: Arc<AtomicBool>,
    io: CameraIo,
}

impl CameraWorker {
    pub fn new(
        config: &CameraConfig,
        registry: Arc<TrackRegistry>,
        running: Arc<AtomicBool>,
        io: CameraIo,
    ) -> Self {
        let frame_interval = if config.target_fps > 0 {
            Duration::from_millis(1_000 / u64::from(config.target_fps))
        } else {
            Duration::ZERO
        };
        Self {
            camera_id: config.camera_id.clone(),
            frame_interval,
            registry,
            running,
            io,
        }
    }

    pub fn run(mut self) {
        info!(camera = %self.camera_id, "camera worker started");
        let store = self.registry.camera(&self.camera_id);
        let horizons = self.registry.config().horizons_secs.clone();

        while self.running.load(Ordering::Relaxed) {
            let frame = match self.io.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!(camera = %self.camera_id, "end of stream");
                    break;
                }
                Err(err) => {
                    warn!(camera = %self.camera_id, error = %err, "frame source failed");
                    break;
                }
            };

            let detections = match self.io.detector.detect(&frame) {
                Ok(detections) => detections,
                Err(err) => {
                    // Existing tracks still age this frame.
                    warn!(camera = %self.camera_id, error = %err, "detector failed");
                    Vec::new()
                }
            };

            let snapshots = store.lock().process_frame(&detections, frame.timestamp_ms);

            let mut paths = HashMap::with_capacity(snapshots.len());
            for snapshot in &snapshots {
                paths.insert(snapshot.id, forecast(snapshot, &horizons));
            }

            if let Err(err) = self.io.renderer.render(&frame, &snapshots, &paths) {
                warn!(camera = %self.camera_id, error = %err, "renderer failed");
            }

            let record =
                TelemetryRecord::from_snapshots(&self.camera_id, frame.timestamp_ms, &snapshots);
            if let Err(err) = self.io.sink.publish(&record) {
                warn!(camera = %self.camera_id, error = %err, "telemetry publish failed");
            }

            if !self.frame_interval.is_zero() {
                thread::sleep(self.frame_interval);
            }
        }

        info!(camera = %self.camera_id, "camera worker stopped");
    }
}

/// Owns the camera threads and the shared stop flag.
pub struct PipelineOrchestrator {
    registry: Arc<TrackRegistry>,
    running: Arc<AtomicBool>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl PipelineOrchestrator {
    pub fn new(registry: Arc<TrackRegistry>) -> Self {
        Self {
            registry,
            running: Arc::new(AtomicBool::new(true)),
            handles: Vec::new(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TrackRegistry> {
        &self.registry
    }

    /// Start a dedicated thread for one camera.
    pub fn spawn_camera(&mut self, config: &CameraConfig, io: CameraIo) -> Result<(), Error> {
        let worker = CameraWorker::new(
            config,
            Arc::clone(&self.registry),
            Arc::clone(&self.running),
            io,
        );

        let handle = thread::Builder::new()
            .name(format!("camera-{}", config.camera_id))
            .spawn(move || worker.run())
            .map_err(|e| Error::Source(format!("failed to spawn camera thread: {e}")))?;

        self.handles.push((config.camera_id.clone(), handle));
        Ok(())
    }

    /// Ask every worker to stop after its current frame.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Wait for all camera threads to finish.
    pub fn join(&mut self) {
        for (camera_id, handle) in self.handles.drain(..) {
            if handle.join().is_err() {
                error!(camera = %camera_id, "camera worker panicked");
            }
        }
    }
}
