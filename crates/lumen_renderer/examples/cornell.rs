//! Cornell box with two rotated blocks.
//!
//! Run with: cargo run --release --example cornell -- [settings.json] [output.png]

mod common;

use std::sync::Arc;

use anyhow::Result;
use common::DemoArgs;
use lumen_renderer::{
    Block, Bvh, Camera, Color, DiffuseLight, Flip, Hittable, Interval, Lambertian, Material,
    Rectangle, RenderSettings, RotateY, SceneError, Translate, Vec3,
};

fn build_scene() -> Result<Bvh, SceneError> {
    let red = Lambertian::new(Color::new(0.65, 0.05, 0.05));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.73, 0.73, 0.73)));
    let green = Lambertian::new(Color::new(0.12, 0.45, 0.15));
    let light = DiffuseLight::new(Color::new(15.0, 15.0, 15.0));

    let mut objects: Vec<Box<dyn Hittable>> = vec![
        Box::new(Flip::new(Rectangle::new(
            Vec3::new(555.0, 0.0, 0.0),
            Vec3::new(555.0, 555.0, 555.0),
            green,
        )?)),
        Box::new(Rectangle::new(Vec3::ZERO, Vec3::new(0.0, 555.0, 555.0), red)?),
        Box::new(Rectangle::new(
            Vec3::new(213.0, 554.0, 227.0),
            Vec3::new(343.0, 554.0, 332.0),
            light,
        )?),
        // Floor, back wall, ceiling
        Box::new(Rectangle::new(Vec3::ZERO, Vec3::new(555.0, 0.0, 555.0), white.clone())?),
        Box::new(Flip::new(Rectangle::new(
            Vec3::new(0.0, 0.0, 555.0),
            Vec3::new(555.0, 555.0, 555.0),
            white.clone(),
        )?)),
        Box::new(Flip::new(Rectangle::new(
            Vec3::new(0.0, 555.0, 0.0),
            Vec3::new(555.0, 555.0, 555.0),
            white.clone(),
        )?)),
    ];

    let short = Block::new(Vec3::ZERO, Vec3::splat(165.0), white.clone())?;
    objects.push(Box::new(Translate::new(
        RotateY::new(short, -18.0),
        Vec3::new(130.0, 0.0, 65.0),
    )));
    let tall = Block::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white)?;
    objects.push(Box::new(Translate::new(
        RotateY::new(tall, 15.0),
        Vec3::new(265.0, 0.0, 295.0),
    )));

    Bvh::new(objects, Interval::new(0.0, 1.0))
}

fn main() -> Result<()> {
    env_logger::init();

    let defaults = RenderSettings::default()
        .with_resolution(500, 500)
        .with_passes(vec![1, 15, 48]);
    let args = DemoArgs::parse("cornell", defaults)?;

    println!("Lumen - Cornell box");
    let world = build_scene()?;
    let camera = Camera::new(
        Vec3::new(278.0, 278.0, -800.0),
        Vec3::new(278.0, 278.0, 0.0),
        Vec3::Y,
        40.0,
        args.settings.aspect_ratio(),
        0.1,
        10.0,
    )?;

    common::render_to_png(Arc::new(world), camera, args)
}
