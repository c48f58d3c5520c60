//! Seeded synthetic swatches for demos and benchmarks

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use crate::io::configuration::{SYNTHETIC_NOISE, SYNTHETIC_SWATCH_SIZE};
use crate::io::swatch::{Swatch, SwatchLibrary};

/// Generate `count` noisy solid-color swatches
///
/// Each swatch has a random base color with per-pixel noise of up to
/// [`SYNTHETIC_NOISE`] per channel. Identical seeds give identical libraries.
pub fn synthetic_library(count: usize, seed: u64) -> SwatchLibrary {
    let mut rng = StdRng::seed_from_u64(seed);
    let swatches = (0..count)
        .map(|index| {
            let image = synthetic_swatch(&mut rng, SYNTHETIC_SWATCH_SIZE);
            Swatch::new(PathBuf::from(format!("synthetic_{index:04}.png")), image)
        })
        .collect();
    SwatchLibrary::new(swatches)
}

fn synthetic_swatch(rng: &mut StdRng, size: u32) -> RgbaImage {
    let base: [u8; 3] = [rng.random(), rng.random(), rng.random()];
    let noise = i16::from(SYNTHETIC_NOISE);

    RgbaImage::from_fn(size, size, |_, _| {
        let mut channels = [0u8; 3];
        for (channel, &value) in channels.iter_mut().zip(&base) {
            let jitter = rng.random_range(-noise..=noise);
            *channel = (i16::from(value) + jitter).clamp(0, 255) as u8;
        }
        let [r, g, b] = channels;
        Rgba([r, g, b, 255])
    })
}
