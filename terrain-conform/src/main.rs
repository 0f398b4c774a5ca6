/// Scene description to terrain textures entry point
use std::env;
use std::path::Path;
use terrain_conform::TerrainGenerator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <scene.json>", args[0]);
        std::process::exit(1);
    }

    let generator = TerrainGenerator::new(Path::new(&args[1]));
    generator.generate()?;

    Ok(())
}
