//! Error taxonomy.
//!
//! Every error here surfaces before rendering starts: settings are validated
//! when a render is requested and scenes fail while they are being built.
//! The intersection and scattering hot path has no error type, "no hit" and
//! "no scatter" are ordinary `None` values.

use lumen_math::Vec3;
use thiserror::Error;

/// Invalid render settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("at least one render pass is required")]
    NoPasses,

    #[error("render pass {pass} requests zero samples per pixel")]
    EmptyPass { pass: usize },

    #[error("{total} samples per pixel overflows the per-pixel sample counter")]
    TooManySamples { total: u64 },

    #[error("parallelism must be at least 1")]
    NoWorkers,

    #[error("max depth must be at least 1")]
    ZeroDepth,

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Unsupported scene construction states.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("cannot build a BVH from zero primitives")]
    EmptyBvh,

    #[error("rectangle from {min:?} to {max:?} must be flat along exactly one axis")]
    DegenerateRectangle { min: Vec3, max: Vec3 },

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("volume density must be positive, got {0}")]
    InvalidDensity(f64),

    #[error("time span [{t0}, {t1}] is empty")]
    InvalidTimeSpan { t0: f64, t1: f64 },

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Errors that can occur while loading texture rasters.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to open texture {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0} has no pixels")]
    Empty(String),

    #[error("texture {path} expects {expected} pixels, got {actual}")]
    SizeMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;
