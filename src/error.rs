use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no usable font found (tried {tried:?}); pass --font or set CYBERSCENE_FONT")]
    FontNotFound { tried: Vec<PathBuf> },

    #[error("{0} is not a valid TrueType/OpenType font")]
    FontParse(PathBuf),

    #[error("invalid hex color {0:?}")]
    InvalidColor(String),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("unable to create GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("unable to create window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("failed to map frame buffer: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("frame buffer mapping was cancelled")]
    BufferMapCancelled,

    #[error("uniform layout: {0}")]
    Uniform(#[from] encase::internal::Error),

    #[error("failed to encode frame: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("unable to create window: {0}")]
    Window(#[from] winit::error::OsError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
