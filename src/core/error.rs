//! Error types for the renderer

use thiserror::Error;

/// Main error type for the renderer
#[derive(Debug, Error)]
pub enum Error {
    #[error("heightfield pool is full (capacity {0})")]
    PoolExhausted(usize),

    #[error("billboard pool \"{0}\" is full (capacity {1})")]
    BillboardPoolFull(&'static str, usize),

    #[error("invalid heightfield handle {0}")]
    InvalidHandle(u32),

    #[error("invalid billboard slot")]
    InvalidSlot,

    #[error("height cache not built for heightfield {0}")]
    InvalidCache(u32),

    #[error("invalid heightfield dimensions {0}x{1}")]
    InvalidDimensions(u32, u32),

    #[error("handle counter overflow")]
    HandleOverflow,

    #[error("invalid texture handle {0}")]
    InvalidTexture(u32),

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
