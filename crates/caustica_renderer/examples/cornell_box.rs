//! Cornell box example.
//!
//! Renders a coloured room with a diffuse box and a glass sphere lit by a
//! small ceiling triangle, then saves the result to PPM.

use caustica_renderer::{
    Camera, Color, ImageBuffer, Material, MaterialId, Ray, RenderConfig, Scene, Sphere, Triangle,
    Vec3,
};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Pinhole camera looking down -Z.
struct PinholeCamera {
    eye: Vec3,
    width: u32,
    height: u32,
    tan_half_fov: f32,
}

impl PinholeCamera {
    fn new(eye: Vec3, fov_degrees: f32, width: u32, height: u32) -> Self {
        Self {
            eye,
            width,
            height,
            tan_half_fov: (fov_degrees.to_radians() / 2.0).tan(),
        }
    }
}

impl Camera for PinholeCamera {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn cast_ray(&self, x: u32, y: u32, jitter_x: f32, jitter_y: f32) -> Ray {
        let aspect = self.width as f32 / self.height as f32;
        let u = ((x as f32 + 0.5 + jitter_x) / self.width as f32 * 2.0 - 1.0) * aspect;
        let v = 1.0 - (y as f32 + 0.5 + jitter_y) / self.height as f32 * 2.0;
        let direction = Vec3::new(u * self.tan_half_fov, v * self.tan_half_fov, -1.0);
        Ray::new(self.eye, direction)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("Caustica - Cornell Box Example");
    println!("==============================");

    let config = RenderConfig {
        max_depth: 4,
        photon_radius: 0.05,
        ..RenderConfig::default()
    };

    let start = std::time::Instant::now();
    let mut scene = build_scene(config)?;
    println!("Scene built in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    scene.generate_photon_map(200_000);
    println!(
        "Photon map: {} photons in {:?}",
        scene.photon_map().len(),
        start.elapsed()
    );

    let camera = PinholeCamera::new(Vec3::new(0.0, 0.0, 3.5), 45.0, 320, 240);
    let start = std::time::Instant::now();
    let image = scene.render(&camera, 16);
    println!("Rendered in {:?}", start.elapsed());

    let filename = "cornell_box.ppm";
    save_ppm(&image, filename)?;
    println!("Saved to {}", filename);
    Ok(())
}

fn build_scene(config: RenderConfig) -> Result<Scene, Box<dyn std::error::Error>> {
    let mut scene = Scene::new(config)?;

    let white = scene.add_material(Material::lambertian(Color::ONE));
    let red = scene.add_material(Material::lambertian(Color::new(1.0, 0.0, 0.0)));
    let green = scene.add_material(Material::lambertian(Color::new(0.0, 1.0, 0.0)));
    let blue = scene.add_material(Material::lambertian(Color::new(0.0, 0.0, 1.0)));
    let cyan = scene.add_material(Material::lambertian(Color::new(0.0, 1.0, 1.0)));
    let glass = scene.add_material(Material::transparent(1.5));
    let lamp = scene.add_material(Material::emissive(Color::ONE, 30.0));

    // Room corners
    let v0 = Vec3::new(-1.5, -1.0, -1.0);
    let v1 = Vec3::new(1.5, -1.0, -1.0);
    let v2 = Vec3::new(1.5, 1.0, -1.0);
    let v3 = Vec3::new(-1.5, 1.0, -1.0);
    let v4 = Vec3::new(-1.5, -1.0, 4.0);
    let v5 = Vec3::new(1.5, -1.0, 4.0);
    let v6 = Vec3::new(1.5, 1.0, 4.0);
    let v7 = Vec3::new(-1.5, 1.0, 4.0);

    add_quad(&mut scene, [v0, v1, v2, v3], red)?; // back
    add_quad(&mut scene, [v4, v7, v6, v5], white)?; // front
    add_quad(&mut scene, [v0, v3, v7, v4], blue)?; // left
    add_quad(&mut scene, [v1, v5, v6, v2], green)?; // right
    add_quad(&mut scene, [v2, v6, v7, v3], white)?; // ceiling
    add_quad(&mut scene, [v0, v4, v5, v1], white)?; // floor

    add_box(&mut scene, Vec3::new(-0.4, -0.5, 0.7), Vec3::splat(0.5), cyan)?;
    scene.add_surface(Sphere::new(Vec3::new(0.4, -0.5, 0.7), 0.3, glass))?;

    scene.add_surface(Triangle::new(
        Vec3::new(-0.3, 0.99, 1.2),
        Vec3::new(-0.3, 0.99, 0.6),
        Vec3::new(0.3, 0.99, 0.6),
        lamp,
    ))?;

    Ok(scene)
}

fn add_quad(
    scene: &mut Scene,
    [a, b, c, d]: [Vec3; 4],
    material: MaterialId,
) -> Result<(), Box<dyn std::error::Error>> {
    scene.add_surface(Triangle::new(a, b, c, material))?;
    scene.add_surface(Triangle::new(c, d, a, material))?;
    Ok(())
}

/// Axis-aligned box as a single mesh, wound outwards.
fn add_box(
    scene: &mut Scene,
    center: Vec3,
    size: Vec3,
    material: MaterialId,
) -> Result<(), Box<dyn std::error::Error>> {
    let h = size / 2.0;
    let positions = (0..8)
        .map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { -h.x } else { h.x },
                if i & 2 == 0 { -h.y } else { h.y },
                if i & 4 == 0 { -h.z } else { h.z },
            );
            center + corner
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 2, 3, 0, 3, 1, // -z
        4, 5, 7, 4, 7, 6, // +z
        0, 4, 6, 0, 6, 2, // -x
        1, 3, 7, 1, 7, 5, // +x
        0, 1, 5, 0, 5, 4, // -y
        2, 6, 7, 2, 7, 3, // +y
    ];

    scene.add_mesh(positions, indices, None, material)?;
    Ok(())
}

fn save_ppm(image: &ImageBuffer, filename: &str) -> std::io::Result<()> {
    let file = File::create(filename)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in &image.pixels {
        // Gamma 2
        let to_byte = |c: f32| (c.clamp(0.0, 1.0).sqrt() * 255.999) as u8;
        writeln!(
            writer,
            "{} {} {}",
            to_byte(color.x),
            to_byte(color.y),
            to_byte(color.z)
        )?;
    }

    Ok(())
}
