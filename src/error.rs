use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("video source error: {0}")]
    Source(String),

    #[error("detector error: {0}")]
    Detector(String),

    #[error("renderer error: {0}")]
    Renderer(String),

    #[error("telemetry error: {0}")]
    Telemetry(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
