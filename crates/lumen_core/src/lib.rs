//! Lumen Core - settings, errors and decoded rasters.
//!
//! This crate provides:
//!
//! - **Settings**: `RenderSettings` and `CameraSettings`, loadable from JSON
//! - **Errors**: the configuration, scene-build and texture error taxonomy
//! - **Rasters**: decoded images backing image textures
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::RenderSettings;
//!
//! let settings = RenderSettings::from_json_str(r#"{ "width": 320, "height": 200 }"#)?;
//! settings.validate()?;
//! println!("{} samples per pixel", settings.total_samples());
//! ```

pub mod config;
pub mod error;
pub mod raster;

// Re-export commonly used types
pub use config::{Background, CameraSettings, RenderSettings};
pub use error::{ConfigError, SceneError, TextureError, TextureResult};
pub use raster::{Raster, RasterCache};
