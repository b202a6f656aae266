//! Render and camera settings.
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields take the defaults below.

use std::path::Path;

use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a ray that leaves the scene sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Pure path tracing: only emissive materials contribute light.
    #[default]
    Black,
    /// White-to-blue gradient by ray elevation.
    Sky,
}

/// Settings for one render invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples added to every pixel by each progressive pass, in order
    pub samples_per_pass: Vec<u32>,
    /// Number of worker threads
    pub parallelism: usize,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Seed of the master generator the worker streams are drawn from
    pub seed: u64,
    /// Miss policy
    pub background: Background,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            samples_per_pass: vec![1, 399],
            parallelism: default_parallelism(),
            max_depth: 10,
            seed: 1337,
            background: Background::Black,
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl RenderSettings {
    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the progressive pass schedule.
    pub fn with_passes(mut self, samples_per_pass: impl Into<Vec<u32>>) -> Self {
        self.samples_per_pass = samples_per_pass.into();
        self
    }

    /// Set the worker count.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the bounce limit.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the miss policy.
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Check the settings can drive a render.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pass.is_empty() {
            return Err(ConfigError::NoPasses);
        }
        if let Some(pass) = self.samples_per_pass.iter().position(|&n| n == 0) {
            return Err(ConfigError::EmptyPass { pass });
        }
        let total = self.total_samples();
        if total > u64::from(u32::MAX) {
            return Err(ConfigError::TooManySamples { total });
        }
        if self.parallelism == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }

    /// Samples per pixel once every pass has run.
    pub fn total_samples(&self) -> u64 {
        self.samples_per_pass.iter().map(|&n| n as u64).sum()
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Number of pixels in the image.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded render settings from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }
}

/// Thin-lens camera parameters.
///
/// The aspect ratio is not stored here, it comes from the image size of
/// the render the camera is used for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Lens diameter; zero gives a pinhole camera
    pub aperture: f64,
    /// Distance to the plane of perfect focus
    pub focus_dist: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }
}
