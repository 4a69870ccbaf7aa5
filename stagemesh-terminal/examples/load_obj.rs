//! Example: Parse an OBJ file and print the buffers each model produces
//!
//! Usage: cargo run --example load_obj -- path/to/file.obj

use std::env;
use std::path::Path;
use stagemesh_core::{load_obj_file, MeshModel, Transform, DEFAULT_MODEL_NAME};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let models = if args.len() < 2 {
        eprintln!("Usage: {} <obj-file>", args[0]);
        eprintln!("\nNo OBJ file provided, using default cube...");
        vec![MeshModel::cube(DEFAULT_MODEL_NAME, 1.0)]
    } else {
        println!("Loading OBJ file: {}", args[1]);
        let document = load_obj_file(Path::new(&args[1]))?;
        for warning in &document.warnings {
            println!("warning: {}", warning);
        }
        document.models
    };

    // Lift every model one unit up, as a setpiece would be placed
    let mut transform = Transform::from_translation(0.0, 1.0, 0.0);
    let matrix = transform.recompute();

    for model in &models {
        model.validate()?;
        let vertices: Vec<f32> = model.transformed_vertices(&matrix).collect();
        println!(
            "{}: {} vertices -> {} floats, {} indices",
            if model.name.is_empty() { "<unnamed>" } else { model.name.as_str() },
            model.vertex_count(),
            vertices.len(),
            model.indices.len()
        );
    }
    Ok(())
}
