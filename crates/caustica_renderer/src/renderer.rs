//! Parallel render driver.
//!
//! Columns are rendered one after another; the pixels of a column are
//! split across rayon's thread pool. Each pixel owns a generator seeded
//! from the scene seed and its index, so images do not depend on thread
//! scheduling.

use crate::material::Color;
use crate::ray::Ray;
use crate::sampling::gen_f32;
use crate::scene::Scene;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

/// Source of primary rays.
pub trait Camera: Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Ray through pixel (x, y) offset by a jitter in [-0.5, 0.5) pixels.
    fn cast_ray(&self, x: u32, y: u32, jitter_x: f32, jitter_y: f32) -> Ray;
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }
}

/// Seed for the generator of one pixel. Never equal to `seed` itself, which
/// drives the photon pass.
fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    let index = ((y as u64) << 32) | x as u64;
    seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl Scene {
    /// Render the whole image with `subsamples` jittered rays per pixel.
    ///
    /// Build the photon map first if caustics are enabled.
    pub fn render(&self, camera: &dyn Camera, subsamples: u32) -> ImageBuffer {
        let (width, height) = (camera.width(), camera.height());
        let mut image = ImageBuffer::new(width, height);

        log::info!(
            "Rendering {}x{} with {} subsamples: {} surfaces, {} lights, {} photons",
            width,
            height,
            subsamples.max(1),
            self.surface_count(),
            self.lights().len(),
            self.photon_map().len()
        );

        let start = Instant::now();
        let mut next_report = 1;
        for x in 0..width {
            let column: Vec<Color> = (0..height)
                .into_par_iter()
                .map(|y| self.render_pixel(camera, x, y, subsamples))
                .collect();
            for (y, color) in column.into_iter().enumerate() {
                image.set(x, y as u32, color);
            }

            // Progress every 10% of columns
            let done = x + 1;
            if done * 10 >= next_report * width {
                let elapsed = start.elapsed().as_secs_f32();
                let remaining = elapsed / done as f32 * (width - done) as f32;
                log::info!(
                    "{}% done, about {:.1}s left",
                    done * 100 / width,
                    remaining
                );
                next_report = done * 10 / width + 1;
            }
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        image
    }

    /// Average of `subsamples` jittered camera rays through one pixel.
    pub fn render_pixel(&self, camera: &dyn Camera, x: u32, y: u32, subsamples: u32) -> Color {
        let samples = subsamples.max(1);
        let mut rng = StdRng::seed_from_u64(pixel_seed(self.config.seed, x, y));

        let mut color = Color::ZERO;
        for _ in 0..samples {
            let jitter_x = gen_f32(&mut rng) - 0.5;
            let jitter_y = gen_f32(&mut rng) - 0.5;
            let mut ray = camera.cast_ray(x, y, jitter_x, jitter_y);
            color += self.trace_ray(&mut ray, 0, &mut rng);
        }
        color / samples as f32
    }
}
