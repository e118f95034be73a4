use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

// Error
//------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Frames
    #[error("Failed to load image {path}: {source}")]
    Image { path: PathBuf, source: image::ImageError },

    #[error("Failed to walk {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Frame buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    FrameSize { width: u32, height: u32, expected: usize, actual: usize },

    #[error("Frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Frame {width}x{height} exceeds the {max} byte limit")]
    FrameTooLarge { width: u32, height: u32, max: usize },

    #[error("Invalid rotation {0}, expected one of 0, 90, 180 or 270")]
    InvalidRotation(u32),

    #[error("Raw stream ended inside a frame: {read} of {expected} bytes")]
    TruncatedFrame { read: usize, expected: usize },

    // Config
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration in {path}: {source}")]
    ConfigInvalid { path: PathBuf, source: toml::de::Error },

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("No {0} directory available on this platform")]
    NoBaseDir(&'static str),

    // Session
    #[error("Failed to open {url}: {source}")]
    OpenLink { url: String, source: std::io::Error },

    #[error("No way to open links on this platform; set `browser` in the config")]
    NoOpener,

    #[error("Scan worker stopped unexpectedly")]
    WorkerPanicked,
}
