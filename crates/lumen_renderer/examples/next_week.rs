//! The "next week" showcase: ground of boxes, moving sphere, glass, metal,
//! fog, noise textures and an optional image-textured globe.
//!
//! Run with: cargo run --release --example next_week -- [settings.json] [output.png] [globe.jpg]

mod common;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use common::DemoArgs;
use lumen_core::RasterCache;
use lumen_renderer::{
    Block, Bvh, Camera, Color, Dielectric, DiffuseLight, Hittable, HittableList, ImageTexture,
    Interval, Isotropic, Lambertian, Material, Metal, MovingSphere, NoiseStyle, NoiseTexture,
    Rectangle, RenderSettings, RotateY, Sphere, Translate, Vec3, Volume,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TIME: Interval = Interval::new(0.0, 1.0);

fn build_scene(rng: &mut StdRng, globe: Option<&str>) -> Result<Bvh> {
    let mut objects: Vec<Box<dyn Hittable>> = Vec::new();

    // Ground: a 20x20 grid of boxes of random height
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.48, 0.83, 0.53)));
    let mut boxes: Vec<Box<dyn Hittable>> = Vec::new();
    let w = 100.0;
    for i in 0..20 {
        for j in 0..20 {
            let min = Vec3::new(-1000.0 + i as f64 * w, 0.0, -1000.0 + j as f64 * w);
            let max = min + Vec3::new(w, rng.gen_range(1.0..100.0), w);
            boxes.push(Box::new(Block::new(min, max, ground.clone())?));
        }
    }
    objects.push(Box::new(Bvh::new(boxes, TIME)?));

    objects.push(Box::new(Rectangle::new(
        Vec3::new(123.0, 554.0, 147.0),
        Vec3::new(423.0, 554.0, 412.0),
        DiffuseLight::new(Color::splat(7.0)),
    )?));

    let center = Vec3::new(400.0, 400.0, 200.0);
    objects.push(Box::new(MovingSphere::new(
        (center, 0.0),
        (center + Vec3::new(30.0, 0.0, 0.0), 1.0),
        50.0,
        Lambertian::new(Color::new(0.7, 0.3, 0.1)),
    )?));

    objects.push(Box::new(Sphere::new(
        Vec3::new(260.0, 150.0, 45.0),
        50.0,
        Dielectric::new(1.5),
    )));
    objects.push(Box::new(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Metal::new(Color::new(0.8, 0.8, 0.9), 1.0),
    )));

    // Glass ball filled with blue haze
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let boundary = || Sphere::new(Vec3::new(360.0, 150.0, 145.0), 70.0, glass.clone());
    objects.push(Box::new(boundary()));
    objects.push(Box::new(Volume::new(
        boundary(),
        0.2,
        Isotropic::new(Color::new(0.2, 0.4, 0.9)),
    )?));

    // Thin mist over the whole scene
    objects.push(Box::new(Volume::new(
        Sphere::new(Vec3::ZERO, 5000.0, glass.clone()),
        0.0001,
        Isotropic::new(Color::ONE),
    )?));

    let globe_center = Vec3::new(400.0, 200.0, 400.0);
    match globe {
        Some(path) => {
            let mut cache = RasterCache::new();
            let raster = cache
                .load(path)
                .with_context(|| format!("Failed to load globe texture {path}"))?;
            objects.push(Box::new(Sphere::new(
                globe_center,
                100.0,
                Lambertian::textured(ImageTexture::new(raster)),
            )));
        }
        None => objects.push(Box::new(Sphere::new(
            globe_center,
            100.0,
            Lambertian::textured(NoiseTexture::new(rng, 0.05, NoiseStyle::Marble)),
        ))),
    }

    objects.push(Box::new(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Lambertian::textured(NoiseTexture::new(rng, 0.1, NoiseStyle::Smooth)),
    )));

    // A rotated cluster of small spheres
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        let center = Vec3::new(
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
            rng.gen_range(0.0..165.0),
        );
        cluster.add(Sphere::new(center, 10.0, white.clone()));
    }
    objects.push(Box::new(Translate::new(
        RotateY::new(Bvh::new(cluster.into_objects(), TIME)?, 15.0),
        Vec3::new(-100.0, 270.0, 395.0),
    )));

    Ok(Bvh::new(objects, TIME)?)
}

fn main() -> Result<()> {
    env_logger::init();

    let defaults = RenderSettings::default()
        .with_resolution(800, 800)
        .with_passes(vec![1, 31, 96]);
    let args = DemoArgs::parse("next_week", defaults)?;
    let globe = env::args().nth(3);

    println!("Lumen - next week");
    let start = std::time::Instant::now();
    let mut rng = StdRng::seed_from_u64(args.settings.seed);
    let world = build_scene(&mut rng, globe.as_deref())?;
    println!("Scene built in {:?}", start.elapsed());

    let camera = Camera::new(
        Vec3::new(478.0, 278.0, -600.0),
        Vec3::new(278.0, 278.0, 0.0),
        Vec3::Y,
        40.0,
        args.settings.aspect_ratio(),
        0.0,
        10.0,
    )?;

    common::render_to_png(Arc::new(world), camera, args)
}
