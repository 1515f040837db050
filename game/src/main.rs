//! Demo scene: a lit ground plane with shadow-casting primitives
//!
//! Usage: `umbra_demo [renderer-config.json]`
//!
//! WASD moves, Shift sprints, drag with the left mouse button to look
//! around, digits 0-8 switch the G-buffer debug view.

use std::error::Error;
use tracing::info;
use umbra_engine::prelude::*;

const CUBE_COUNT: usize = 3;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => RendererConfig::from_json_file(&path)?,
        None => demo_config(),
    };

    let app = EngineBuilder::new()
        .title("Umbra Deferred Renderer")
        .window_size(1280, 720)
        .renderer_config(config)
        .on_init(build_scene)
        .on_update(spin_cubes())
        .build();

    info!("Starting demo");
    app.run()?;
    Ok(())
}

/// Defaults scaled down to a scene a few dozen units across
fn demo_config() -> RendererConfig {
    let mut config = RendererConfig::default();
    config.camera.move_speed = 0.02;
    config.shadow.far = 60.0;
    config
}

fn build_scene(renderer: &mut Renderer, scene: &mut Scene) -> Result<(), RenderError> {
    let camera = renderer.camera_mut();
    camera.set_position(Vec3::new(0.0, 8.0, 22.0));
    camera.look_at(Vec3::new(0.0, -0.35, -1.0));

    let ground = MeshData::plane("ground", 60.0, 60.0)
        .with_factors(MaterialFactors::from_rgb(0.55, 0.55, 0.5).with_metallic_roughness(0.0, 0.9));
    let mut ground = renderer.create_mesh(&ground, RenderMode::Deferred)?;
    ground.set_cast_shadows(false);
    scene.add_renderable(ground);

    let colors = [[0.8, 0.2, 0.2], [0.2, 0.7, 0.3], [0.2, 0.3, 0.8]];
    for (i, [r, g, b]) in colors.into_iter().enumerate().take(CUBE_COUNT) {
        let mesh = MeshData::cube(cube_id(i), 2.0)
            .with_factors(MaterialFactors::from_rgb(r, g, b).with_metallic_roughness(0.1, 0.6));
        let mut cube = renderer.create_mesh(&mesh, RenderMode::Deferred)?;
        cube.set_translation(Vec3::new(-6.0 + 6.0 * i as f32, 1.5, 0.0));
        scene.add_renderable(cube);
    }

    let sphere = MeshData::sphere("sphere", 1.5, 32, 16)
        .with_factors(MaterialFactors::from_rgb(0.9, 0.9, 0.9).with_metallic_roughness(1.0, 0.3));
    let mut sphere = renderer.create_mesh(&sphere, RenderMode::Deferred)?;
    sphere.set_translation(Vec3::new(0.0, 1.5, -6.0));
    scene.add_renderable(sphere);

    let lamp = MeshData::sphere("lamp", 0.75, 24, 12).with_factors(
        MaterialFactors::from_rgb(1.0, 0.8, 0.4).with_emissive([1.0, 0.6, 0.2]),
    );
    let mut lamp = renderer.create_mesh(&lamp, RenderMode::Forward)?;
    lamp.set_translation(Vec3::new(5.0, 3.0, 4.0));
    scene.add_renderable(lamp);

    let sun = renderer.create_directional_light("sun", Vec3::new(0.4, 1.0, 0.3))?;
    scene.add_light(sun);
    Ok(())
}

fn cube_id(index: usize) -> String {
    format!("cube_{index}")
}

/// Rotate the cubes about Y at different rates
fn spin_cubes() -> impl FnMut(&mut Scene, f32) {
    let mut elapsed_ms = 0.0_f32;
    move |scene, delta_ms| {
        elapsed_ms += delta_ms;
        for i in 0..CUBE_COUNT {
            if let Some(cube) = scene.renderable_mut(&cube_id(i)) {
                let degrees = elapsed_ms * 0.02 * (i + 1) as f32;
                cube.set_rotation_degrees(Vec3::new(0.0, degrees % 360.0, 0.0));
            }
        }
    }
}
