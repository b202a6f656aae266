//! Shared plumbing for the demo scenes: settings, progress and PNG output.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use lumen_renderer::{render, Camera, Hittable, RenderSettings};

/// Command line of every demo: `[settings.json] [output.png]`.
pub struct DemoArgs {
    pub settings: RenderSettings,
    pub output: PathBuf,
}

impl DemoArgs {
    /// Parse the arguments, falling back to `defaults` and `<name>.png`.
    pub fn parse(name: &str, defaults: RenderSettings) -> Result<Self> {
        let mut args = env::args().skip(1);

        let settings = match args.next() {
            Some(path) if path != "-" => RenderSettings::from_json_file(&path)
                .with_context(|| format!("Failed to load settings from {path}"))?,
            _ => defaults,
        };
        let output = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{name}.png")));

        Ok(Self { settings, output })
    }
}

/// Render in the background, report progress, and save the result.
pub fn render_to_png(world: Arc<dyn Hittable>, camera: Camera, args: DemoArgs) -> Result<()> {
    let (width, height) = (args.settings.width, args.settings.height);
    let handle = render(world, camera, args.settings).context("Failed to start render")?;
    let pixels = Arc::clone(handle.pixels());

    let mut shown = 0;
    while !handle.is_complete() {
        thread::sleep(Duration::from_millis(250));
        let done = handle.passes_completed();
        if done != shown {
            println!("  pass {}/{} done", done, handle.pass_count());
            shown = done;
        }
    }

    let report = handle.wait().context("Render thread stopped before finishing")?;
    println!(
        "Rendered {} samples per pixel in {:.2?}",
        report.samples_per_pixel(),
        report.elapsed()
    );

    let image = image::RgbImage::from_raw(width, height, pixels.to_rgb8())
        .context("Pixel buffer does not match the image size")?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
