//! Progressive path tracing renderer.
//!
//! A render runs a list of passes. In each pass every scanline is handed
//! to a pool of workers, each owning its own random stream, which add the
//! pass's samples to every pixel and publish the refined averages to a
//! shared [`PixelBuffer`]. Passes are strictly sequential: a pass ends when
//! all workers have drained the queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use lumen_core::{Background, ConfigError, RenderSettings};
use lumen_math::{random, Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::pixels::PixelBuffer;
use crate::scanline::{generate_scanlines, Scanline};
use crate::{Camera, Hittable};

/// Smallest hit distance accepted on every bounce, avoids self-intersection.
pub const T_MIN: f64 = 0.001;

/// Per-render parameters of the light transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shading {
    /// Bounces before a path is cut off and contributes black
    pub max_depth: u32,
    /// What a ray that leaves the scene sees
    pub background: Background,
}

impl Shading {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            max_depth: settings.max_depth,
            background: settings.background,
        }
    }
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and accumulating color.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    shading: &Shading,
    rng: &mut dyn RngCore,
) -> Color {
    // Out of bounces, no more light is gathered
    if depth >= shading.max_depth {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY), rng) else {
        return background_color(ray, shading.background);
    };

    let material = rec.material();
    let emission = material.emitted(&rec);

    match material.scatter(ray, &rec, rng) {
        Some(result) => {
            let scattered = ray_color(&result.scattered, world, depth + 1, shading, rng);
            emission + result.attenuation * scattered
        }
        // Absorbed
        None => emission,
    }
}

/// Radiance arriving along a ray that hit nothing.
pub fn background_color(ray: &Ray, background: Background) -> Color {
    match background {
        Background::Black => Color::ZERO,
        Background::Sky => sky_gradient(ray),
    }
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let a = 0.5 * (ray.direction().y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Trace one jittered sample through pixel `(x, y)`, `y` counted from the bottom.
pub fn sample_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    (x, y): (u32, u32),
    (width, height): (u32, u32),
    shading: &Shading,
    rng: &mut dyn RngCore,
) -> Color {
    let s = (x as f64 + random::gen_f64(rng)) / width as f64;
    let t = (y as f64 + random::gen_f64(rng)) / height as f64;
    let ray = camera.ray(s, t, rng);
    ray_color(&ray, world, 0, shading, rng)
}

/// Timing of one completed pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassStats {
    /// Zero-based pass number
    pub pass: usize,
    /// Samples per pixel added by this pass
    pub samples: u32,
    /// Samples per pixel accumulated so far
    pub accumulated: u64,
    /// Wall time of this pass
    pub elapsed: Duration,
    /// Wall time since the render started
    pub total_elapsed: Duration,
    /// Estimated time until the last pass finishes
    pub remaining: Duration,
}

impl PassStats {
    fn new(
        pass: usize,
        samples: u32,
        (accumulated, total): (u64, u64),
        elapsed: Duration,
        total_elapsed: Duration,
    ) -> Self {
        // Assumes time per sample stays constant
        let remaining = if accumulated == 0 || accumulated >= total {
            Duration::ZERO
        } else {
            total_elapsed
                .mul_f64(total as f64 / accumulated as f64)
                .saturating_sub(total_elapsed)
        };
        Self {
            pass,
            samples,
            accumulated,
            elapsed,
            total_elapsed,
            remaining,
        }
    }
}

/// Summary of a finished render.
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub passes: Vec<PassStats>,
}

impl RenderReport {
    /// Samples per pixel in the final image.
    pub fn samples_per_pixel(&self) -> u64 {
        self.passes.last().map_or(0, |p| p.accumulated)
    }

    pub fn elapsed(&self) -> Duration {
        self.passes.last().map_or(Duration::ZERO, |p| p.total_elapsed)
    }
}

/// What a worker needs to refine a scanline during one pass.
struct PassContext<'a> {
    world: &'a dyn Hittable,
    camera: &'a Camera,
    shading: &'a Shading,
    pixels: &'a PixelBuffer,
    size: (u32, u32),
    samples: u32,
}

impl PassContext<'_> {
    fn render_scanline(&self, line: &mut Scanline, rng: &mut dyn RngCore) {
        line.write_preview(self.pixels);

        for pixel in &mut line.pixels {
            for _ in 0..self.samples {
                let color = sample_pixel(
                    self.camera,
                    self.world,
                    (pixel.x, pixel.y),
                    self.size,
                    self.shading,
                    rng,
                );
                pixel.add(color);
            }
        }

        line.write_result(self.pixels);
    }
}

/// A configured render: scene, camera, settings and its worker pool.
pub struct Renderer {
    world: Arc<dyn Hittable>,
    camera: Camera,
    settings: RenderSettings,
    shading: Shading,
    pool: rayon::ThreadPool,
}

impl Renderer {
    /// Validate the settings and build the worker pool.
    pub fn new(
        world: Arc<dyn Hittable>,
        camera: Camera,
        settings: RenderSettings,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.parallelism)
            .thread_name(|i| format!("lumen-worker-{i}"))
            .build()
            .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;

        Ok(Self {
            world,
            camera,
            shading: Shading::from_settings(&settings),
            settings,
            pool,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// An empty buffer of the right size for [`Renderer::run`].
    pub fn pixel_buffer(&self) -> PixelBuffer {
        PixelBuffer::new(self.settings.width, self.settings.height)
    }

    /// Render every pass into `pixels`, blocking until done.
    ///
    /// # Panics
    ///
    /// If `pixels` does not match the configured resolution.
    pub fn run(&self, pixels: &PixelBuffer) -> RenderReport {
        self.run_with_progress(pixels, &AtomicUsize::new(0))
    }

    fn run_with_progress(&self, pixels: &PixelBuffer, passes_done: &AtomicUsize) -> RenderReport {
        let size = (self.settings.width, self.settings.height);
        assert_eq!(
            (pixels.width(), pixels.height()),
            size,
            "pixel buffer does not match the render resolution"
        );

        let total = self.settings.total_samples();
        let mut master = StdRng::seed_from_u64(self.settings.seed);
        let mut streams: Vec<StdRng> = (0..self.settings.parallelism)
            .map(|_| StdRng::seed_from_u64(master.gen()))
            .collect();

        log::info!(
            "Rendering {}x{} ({} pixels) with {} passes ({} samples per pixel) on {} workers",
            size.0,
            size.1,
            self.settings.pixel_count(),
            self.settings.samples_per_pass.len(),
            total,
            self.settings.parallelism
        );

        let mut scanlines = generate_scanlines(size.0, size.1);
        let mut report = RenderReport::default();
        let mut accumulated = 0u64;
        let started = Instant::now();

        for (pass, &samples) in self.settings.samples_per_pass.iter().enumerate() {
            let pass_started = Instant::now();

            // Queue every scanline, then close the queue so workers stop when it drains
            let (work_tx, work_rx) = crossbeam_channel::unbounded::<Scanline>();
            for line in scanlines.drain(..) {
                // Cannot fail, `work_rx` is alive
                let _ = work_tx.send(line);
            }
            drop(work_tx);

            let (done_tx, done_rx) = crossbeam_channel::unbounded::<Scanline>();
            let ctx = PassContext {
                world: self.world.as_ref(),
                camera: &self.camera,
                shading: &self.shading,
                pixels,
                size,
                samples,
            };
            let ctx = &ctx;

            // Returns once every worker has finished: the end-of-pass barrier
            self.pool.scope(|scope| {
                for rng in streams.iter_mut() {
                    let work_rx = work_rx.clone();
                    let done_tx = done_tx.clone();
                    scope.spawn(move |_| {
                        for mut line in work_rx.iter() {
                            ctx.render_scanline(&mut line, rng);
                            let _ = done_tx.send(line);
                        }
                    });
                }
            });
            drop(done_tx);

            scanlines = done_rx.try_iter().collect();
            scanlines.sort_unstable_by_key(|line| line.row);

            accumulated += u64::from(samples);
            let stats = PassStats::new(
                pass,
                samples,
                (accumulated, total),
                pass_started.elapsed(),
                started.elapsed(),
            );
            log::info!(
                "Pass {}/{}: {} samples in {:.2?}, {}/{} total after {:.2?}, ~{:.0?} remaining",
                pass + 1,
                self.settings.samples_per_pass.len(),
                samples,
                stats.elapsed,
                stats.accumulated,
                total,
                stats.total_elapsed,
                stats.remaining
            );
            report.passes.push(stats);
            passes_done.fetch_add(1, Ordering::Release);
        }

        log::info!("Render complete in {:.2?}", started.elapsed());
        report
    }

    /// Run on a background thread and return immediately.
    pub fn start(self) -> Result<RenderHandle, ConfigError> {
        let pixels = Arc::new(self.pixel_buffer());
        let passes_done = Arc::new(AtomicUsize::new(0));
        let pass_count = self.settings.samples_per_pass.len();
        let (report_tx, report_rx) = crossbeam_channel::bounded(1);

        {
            let pixels = Arc::clone(&pixels);
            let passes_done = Arc::clone(&passes_done);
            thread::Builder::new()
                .name("lumen-render".to_string())
                .spawn(move || {
                    let report = self.run_with_progress(&pixels, &passes_done);
                    // The handle may have been dropped
                    let _ = report_tx.send(report);
                })?;
        }

        Ok(RenderHandle {
            pixels,
            passes_done,
            pass_count,
            report: report_rx,
        })
    }
}

/// Start a progressive render in the background.
///
/// The returned handle gives live access to the pixels; dropping it does
/// not stop the render.
pub fn render(
    world: Arc<dyn Hittable>,
    camera: Camera,
    settings: RenderSettings,
) -> Result<RenderHandle, ConfigError> {
    Renderer::new(world, camera, settings)?.start()
}

/// Handle to a render running in the background.
pub struct RenderHandle {
    pixels: Arc<PixelBuffer>,
    passes_done: Arc<AtomicUsize>,
    pass_count: usize,
    report: Receiver<RenderReport>,
}

impl RenderHandle {
    /// The live output buffer.
    pub fn pixels(&self) -> &Arc<PixelBuffer> {
        &self.pixels
    }

    pub fn passes_completed(&self) -> usize {
        self.passes_done.load(Ordering::Acquire)
    }

    pub fn pass_count(&self) -> usize {
        self.pass_count
    }

    /// Whether the final report is ready.
    pub fn is_complete(&self) -> bool {
        !self.report.is_empty()
    }

    /// Block until the render finishes.
    ///
    /// Returns `None` if the render thread died without reporting.
    pub fn wait(self) -> Option<RenderReport> {
        self.report.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, DiffuseLight, HittableList, Lambertian, Rectangle, Sphere};
    use lumen_math::{Unit, Vec3};

    fn settings(width: u32, height: u32, passes: &[u32]) -> RenderSettings {
        RenderSettings::default()
            .with_resolution(width, height)
            .with_passes(passes.to_vec())
            .with_parallelism(2)
            .with_max_depth(5)
            .with_seed(7)
    }

    fn look_down_z(aspect: f64) -> Camera {
        Camera::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, aspect, 0.0, 1.0).unwrap()
    }

    fn unpack(packed: u32) -> [u8; 3] {
        crate::unpack_rgb(packed)
    }

    /// Red sphere in front of the camera, lit only by a large panel behind it.
    fn red_sphere_scene() -> Arc<dyn Hittable> {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Lambertian::new(Color::new(0.8, 0.1, 0.1)),
        ));
        world.add(
            Rectangle::new(
                Vec3::new(-100.0, -100.0, 1.0),
                Vec3::new(100.0, 100.0, 1.0),
                DiffuseLight::new(Color::ONE),
            )
            .unwrap(),
        );
        Arc::new(world)
    }

    /// Camera sits inside a large light, every path ends on it.
    fn emissive_scene() -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(Vec3::ZERO, 10.0, DiffuseLight::new(Color::splat(0.25))))
    }

    #[test]
    fn test_ray_color_at_max_depth_is_black() {
        let world = emissive_scene();
        let shading = Shading {
            max_depth: 3,
            background: Background::Sky,
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Unit::NEG_Z, 0.0);

        assert_eq!(ray_color(&ray, world.as_ref(), 3, &shading, &mut rng), Color::ZERO);
        assert_eq!(ray_color(&ray, world.as_ref(), 4, &shading, &mut rng), Color::ZERO);
        assert_eq!(
            ray_color(&ray, world.as_ref(), 2, &shading, &mut rng),
            Color::splat(0.25)
        );
    }

    #[test]
    fn test_miss_policy() {
        let world = HittableList::new();
        let mut rng = StdRng::seed_from_u64(0);
        let up = Ray::new(Vec3::ZERO, Unit::Y, 0.0);

        let black = Shading {
            max_depth: 5,
            background: Background::Black,
        };
        assert_eq!(ray_color(&up, &world, 0, &black, &mut rng), Color::ZERO);

        let sky = Shading {
            max_depth: 5,
            background: Background::Sky,
        };
        assert_eq!(ray_color(&up, &world, 0, &sky, &mut rng), Color::new(0.5, 0.7, 1.0));
        let down = Ray::new(Vec3::ZERO, -Unit::Y, 0.0);
        assert_eq!(ray_color(&down, &world, 0, &sky, &mut rng), Color::ONE);
    }

    #[test]
    fn test_red_sphere_lit_from_behind() {
        let renderer =
            Renderer::new(red_sphere_scene(), look_down_z(1.0), settings(9, 9, &[4])).unwrap();
        let pixels = renderer.pixel_buffer();
        renderer.run(&pixels);

        let [r, g, b] = unpack(pixels.get(4, 4));
        assert!(r > 0, "center should be lit");
        assert!(r > g && r > b, "center should be red, got {r} {g} {b}");

        for (x, y) in [(0, 0), (8, 0), (0, 8), (8, 8)] {
            assert_eq!(pixels.get(x, y), 0, "corner ({x}, {y}) should be black");
        }
    }

    #[test]
    fn test_blue_left_red_right_under_sky() {
        let r = std::f64::consts::FRAC_PI_4.cos();
        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::new(-r, 0.0, -1.0), r, Lambertian::new(Color::new(0.0, 0.0, 1.0))));
        world.add(Sphere::new(Vec3::new(r, 0.0, -1.0), r, Lambertian::new(Color::new(1.0, 0.0, 0.0))));

        let settings = settings(40, 20, &[8]).with_background(Background::Sky);
        let renderer = Renderer::new(Arc::new(world), look_down_z(2.0), settings).unwrap();
        let pixels = renderer.pixel_buffer();
        renderer.run(&pixels);

        // Per-half channel sums as [red, blue]
        let mut left = [0u64; 2];
        let mut right = [0u64; 2];
        for y in 0..20 {
            for x in 0..40 {
                let [r, _, b] = unpack(pixels.get(x, y));
                let half = if x < 20 { &mut left } else { &mut right };
                half[0] += u64::from(r);
                half[1] += u64::from(b);
            }
        }
        assert!(left[1] > left[0], "left half should be bluer, got {left:?}");
        assert!(right[0] > right[1], "right half should be redder, got {right:?}");
    }

    fn closed_box(with_light: bool) -> Arc<dyn Hittable> {
        let mut world = HittableList::new();
        world.add(
            Block::new(Vec3::splat(-5.0), Vec3::splat(5.0), Lambertian::new(Color::splat(0.7))).unwrap(),
        );
        if with_light {
            world.add(
                Rectangle::new(
                    Vec3::new(-2.0, 4.9, -2.0),
                    Vec3::new(2.0, 4.9, 2.0),
                    DiffuseLight::new(Color::splat(15.0)),
                )
                .unwrap(),
            );
        }
        Arc::new(world)
    }

    #[test]
    fn test_closed_box_without_light_is_black() {
        let settings = settings(10, 10, &[4]).with_background(Background::Sky);
        let renderer = Renderer::new(closed_box(false), look_down_z(1.0), settings).unwrap();
        let pixels = renderer.pixel_buffer();
        renderer.run(&pixels);
        assert!(pixels.snapshot().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_closed_box_with_light_is_lit() {
        let renderer =
            Renderer::new(closed_box(true), look_down_z(1.0), settings(10, 10, &[4])).unwrap();
        let pixels = renderer.pixel_buffer();
        renderer.run(&pixels);
        assert!(pixels.snapshot().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_sample_counts_follow_passes() {
        for passes in [vec![1], vec![1, 2], vec![1, 2, 3]] {
            let expected: u32 = passes.iter().sum();
            let renderer =
                Renderer::new(red_sphere_scene(), look_down_z(1.0), settings(6, 4, &passes)).unwrap();
            let pixels = renderer.pixel_buffer();
            let report = renderer.run(&pixels);

            assert_eq!(report.passes.len(), passes.len());
            assert_eq!(report.samples_per_pixel(), u64::from(expected));
            let running: Vec<u64> = report.passes.iter().map(|p| p.accumulated).collect();
            let mut sum = 0;
            let sums: Vec<u64> = passes.iter().map(|&n| { sum += u64::from(n); sum }).collect();
            assert_eq!(running, sums);

            for y in 0..4 {
                for x in 0..6 {
                    assert_eq!(pixels.sample_count(x, y), expected);
                }
            }
        }
    }

    #[test]
    fn test_split_passes_match_single_pass() {
        // Deterministic scene: identical pixels whatever the pass split
        let run = |world: Arc<dyn Hittable>, passes: &[u32]| {
            let renderer = Renderer::new(world, look_down_z(1.0), settings(8, 8, passes)).unwrap();
            let pixels = renderer.pixel_buffer();
            renderer.run(&pixels);
            pixels
        };

        let whole = run(emissive_scene(), &[8]);
        let split = run(emissive_scene(), &[4, 4]);
        assert_eq!(whole.snapshot(), split.snapshot());
        assert_eq!(whole.get(0, 0), crate::pack_gamma(Color::splat(0.25)));

        // Noisy scene: image means agree within Monte Carlo tolerance
        let mean = |pixels: &PixelBuffer| {
            let bytes = pixels.to_rgb8();
            bytes.iter().map(|&b| f64::from(b)).sum::<f64>() / bytes.len() as f64
        };
        let whole = run(red_sphere_scene(), &[32]);
        let split = run(red_sphere_scene(), &[16, 16]);
        assert!((mean(&whole) - mean(&split)).abs() < 10.0);
    }

    #[test]
    fn test_single_worker_is_deterministic() {
        let run = || {
            let settings = settings(8, 6, &[2, 3]).with_parallelism(1);
            let renderer = Renderer::new(red_sphere_scene(), look_down_z(4.0 / 3.0), settings).unwrap();
            let pixels = renderer.pixel_buffer();
            renderer.run(&pixels);
            pixels.snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_background_render_reports() {
        let handle = render(red_sphere_scene(), look_down_z(1.0), settings(8, 8, &[1, 2])).unwrap();
        assert_eq!(handle.pass_count(), 2);
        let pixels = Arc::clone(handle.pixels());

        while !handle.is_complete() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(handle.passes_completed(), 2);

        let report = handle.wait().unwrap();
        assert_eq!(report.passes.len(), 2);
        assert_eq!(report.samples_per_pixel(), 3);
        assert_eq!(report.passes[1].remaining, Duration::ZERO);
        assert_eq!(pixels.sample_count(3, 3), 3);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = render(red_sphere_scene(), look_down_z(1.0), settings(0, 8, &[1]));
        assert!(matches!(result, Err(ConfigError::EmptyImage { .. })));

        let result = render(red_sphere_scene(), look_down_z(1.0), settings(8, 8, &[]));
        assert!(matches!(result, Err(ConfigError::NoPasses)));

        let result = render(red_sphere_scene(), look_down_z(1.0), settings(8, 8, &[2, 0]));
        assert!(matches!(result, Err(ConfigError::EmptyPass { .. })));
    }
}
