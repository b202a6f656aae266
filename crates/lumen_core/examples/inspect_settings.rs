//! Example: load and validate render settings.
//!
//! Run with: cargo run --example inspect_settings -- settings.json

use std::env;

use lumen_core::RenderSettings;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: inspect_settings <path-to-settings.json>");
        println!("\nDefaults:");
        println!("{:#?}", RenderSettings::default());
        return;
    }

    let path = &args[1];
    println!("Loading settings: {}", path);

    match RenderSettings::from_json_file(path) {
        Ok(settings) => {
            println!("\n=== {}x{} ({} pixels) ===", settings.width, settings.height, settings.pixel_count());
            println!("Passes: {:?}", settings.samples_per_pass);
            println!("Total samples per pixel: {}", settings.total_samples());
            println!("Workers: {}", settings.parallelism);
            println!("Max depth: {}", settings.max_depth);
            println!("Background: {:?}", settings.background);

            match settings.validate() {
                Ok(()) => println!("\nSettings are valid"),
                Err(e) => println!("\nInvalid settings: {}", e),
            }
        }
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    }
}
