/// Frame metadata handed from the video source to the detector.
///
/// Pixel data stays with the capture backend; the tracking core only needs
/// the dimensions and the capture timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub camera_id: String,
    pub dims: (u32, u32),
    /// Capture timestamp, monotonic milliseconds.
    pub timestamp_ms: i64,
}

impl Frame {
    #[inline]
    pub fn width(&self) -> u32 {
        self.dims.0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dims.1
    }
}
