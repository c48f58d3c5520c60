//! Swatch loading and color statistics
//!
//! A swatch is a small square texture read from disk. Its average color is
//! always available; its dominant color (the mean of the pixels close to the
//! average) only counts when enough of the swatch agrees with it.

use image::{Rgba, RgbaImage};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::io::configuration::{DOMINANT_MAX_DIFF, DOMINANT_SHARE_PERCENT, MIN_SWATCH_SIZE};
use crate::io::error::{MosaicError, Result};
use crate::math::vector::{add, dot, scale, sub};
use crate::spatial::tiles::TileSource;

/// Color statistics of a swatch, components in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwatchStats {
    /// Mean color over every pixel
    pub average: [f64; 3],
    /// Mean color over pixels near the average; equals the average when none are
    pub dominant: [f64; 3],
    /// Fraction of pixels that contributed to the dominant color
    pub dominant_share: f64,
}

fn rgb(pixel: &Rgba<u8>) -> [f64; 3] {
    let [r, g, b, _] = pixel.0;
    [f64::from(r), f64::from(g), f64::from(b)]
}

impl SwatchStats {
    /// Compute statistics over every pixel of `image`
    pub fn analyze(image: &RgbaImage) -> Self {
        let pixel_count = image.pixels().len();
        if pixel_count == 0 {
            return Self {
                average: [0.0; 3],
                dominant: [0.0; 3],
                dominant_share: 0.0,
            };
        }

        let total = image
            .pixels()
            .fold([0.0; 3], |sum, pixel| add(&sum, &rgb(pixel)));
        let average = scale(&total, 1.0 / pixel_count as f64);

        let mut near_total = [0.0; 3];
        let mut near_count = 0usize;
        for pixel in image.pixels() {
            let color = rgb(pixel);
            let diff = sub(&color, &average);
            if dot(&diff, &diff) <= DOMINANT_MAX_DIFF {
                near_total = add(&near_total, &color);
                near_count += 1;
            }
        }

        let dominant = if near_count == 0 {
            average
        } else {
            scale(&near_total, 1.0 / near_count as f64)
        };

        Self {
            average: scale(&average, 1.0 / 255.0),
            dominant: scale(&dominant, 1.0 / 255.0),
            dominant_share: near_count as f64 / pixel_count as f64,
        }
    }

    /// Whether the dominant color represents enough of the swatch
    pub fn has_dominant(&self) -> bool {
        self.dominant_share * 100.0 > DOMINANT_SHARE_PERCENT as f64
    }
}

/// A loaded swatch and every path it was read from
#[derive(Clone, Debug)]
pub struct Swatch {
    /// Source files with identical contents, in load order
    pub paths: Vec<PathBuf>,
    /// Pixel data
    pub image: RgbaImage,
    /// Color statistics
    pub stats: SwatchStats,
}

impl Swatch {
    /// Analyze `image` loaded from `path`
    pub fn new(path: PathBuf, image: RgbaImage) -> Self {
        let stats = SwatchStats::analyze(&image);
        Self {
            paths: vec![path],
            image,
            stats,
        }
    }

    /// Display name: the file name of the first source path
    pub fn name(&self) -> String {
        self.paths
            .first()
            .and_then(|path| path.file_name())
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
    }
}

/// Deduplicated collection of swatches in load order
#[derive(Clone, Debug, Default)]
pub struct SwatchLibrary {
    swatches: Vec<Swatch>,
    skipped: usize,
}

impl SwatchLibrary {
    /// Wrap already analyzed swatches
    pub const fn new(swatches: Vec<Swatch>) -> Self {
        Self {
            swatches,
            skipped: 0,
        }
    }

    /// Load every `.png` directly inside `dir`, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be read
    /// - A PNG file cannot be decoded
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|source| MosaicError::FileSystem {
            path: dir.to_path_buf(),
            operation: "read directory",
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| MosaicError::FileSystem {
                    path: dir.to_path_buf(),
                    operation: "read directory entry",
                    source,
                })?
                .path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let image = image::open(&path)
                .map_err(|source| MosaicError::ImageLoad {
                    path: path.clone(),
                    source,
                })?
                .into_rgba8();
            images.push((path, image));
        }

        let library = Self::from_images(images);
        info!(
            "loaded {} swatches from {} ({} skipped)",
            library.len(),
            dir.display(),
            library.skipped()
        );
        Ok(library)
    }

    /// Analyze decoded images, skipping undersized ones and merging duplicates
    pub fn from_images(images: impl IntoIterator<Item = (PathBuf, RgbaImage)>) -> Self {
        let mut swatches: Vec<Swatch> = Vec::new();
        let mut by_content: BTreeMap<(u32, u32, Vec<u8>), usize> = BTreeMap::new();
        let mut skipped = 0;

        for (path, image) in images {
            if image.width() < MIN_SWATCH_SIZE || image.height() < MIN_SWATCH_SIZE {
                debug!(
                    "skipping {}: {}x{} is below {MIN_SWATCH_SIZE}x{MIN_SWATCH_SIZE}",
                    path.display(),
                    image.width(),
                    image.height()
                );
                skipped += 1;
                continue;
            }

            let key = (image.width(), image.height(), image.as_raw().clone());
            if let Some(existing) = by_content.get(&key).and_then(|&i| swatches.get_mut(i)) {
                debug!("{} duplicates {}", path.display(), existing.name());
                existing.paths.push(path);
                continue;
            }

            by_content.insert(key, swatches.len());
            swatches.push(Swatch::new(path, image));
        }

        Self { swatches, skipped }
    }

    /// Loaded swatches
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// Number of distinct swatches
    pub fn len(&self) -> usize {
        self.swatches.len()
    }

    /// Whether no swatch was loaded
    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    /// Images rejected for being too small
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Convert into builder input; dominant colors are attached only when valid
    pub fn into_sources(self) -> Vec<TileSource<Swatch>> {
        self.swatches
            .into_iter()
            .map(|swatch| {
                let stats = swatch.stats;
                let source = TileSource::new(swatch, stats.average);
                if stats.has_dominant() {
                    source.with_dominant(stats.dominant)
                } else {
                    source
                }
            })
            .collect()
    }
}
