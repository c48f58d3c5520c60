//! Tile records, color modes and the color-feature transform
//!
//! A [`TileSource`] is what tile acquisition hands to the builder: an opaque
//! payload plus its average color and, when one exists, a dominant color.
//! The builder turns each usable source into an immutable [`Tile`] carrying
//! its feature vector, seam color and projected layout coordinate.

use crate::math::projection::ProjectionAxes;
use crate::math::vector::scale;

/// Dense index of a tile within a build
pub type TileId = usize;

/// Which color statistic drives the layout
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Mean color over all pixels; always available
    #[default]
    Average,
    /// Mean color over the pixels close to the average; may be absent
    Dominant,
}

/// Input record supplied by tile acquisition
#[derive(Clone, Debug)]
pub struct TileSource<P> {
    /// Caller data carried through to the finished mosaic unchanged
    pub payload: P,
    /// Average RGB color, components in `[0, 1]`
    pub average: [f64; 3],
    /// Dominant RGB color, `None` when missing or not representative
    pub dominant: Option<[f64; 3]>,
}

impl<P> TileSource<P> {
    /// Create a source with only an average color
    pub const fn new(payload: P, average: [f64; 3]) -> Self {
        Self {
            payload,
            average,
            dominant: None,
        }
    }

    /// Attach a dominant color
    #[must_use]
    pub fn with_dominant(mut self, dominant: [f64; 3]) -> Self {
        self.dominant = Some(dominant);
        self
    }

    /// Color used under `mode`, if the source has one
    pub const fn color(&self, mode: ColorMode) -> Option<[f64; 3]> {
        match mode {
            ColorMode::Average => Some(self.average),
            ColorMode::Dominant => self.dominant,
        }
    }
}

/// Decorrelated color-opponent feature vector
///
/// Components are `(blue-opponent, luma, red-opponent)`, where luma is
/// centred on mid-grey and damped so that hue differences dominate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorFeature(pub [f64; 3]);

impl ColorFeature {
    /// Derive the feature vector of an RGB color
    pub fn from_rgb(rgb: [f64; 3]) -> Self {
        let [r, g, b] = rgb;
        let luma = (r + g + b) / 3.0;
        Self([(b - luma) / 2.0, (luma - 0.5) / 6.0, (r - luma) / 2.0])
    }

    /// Raw feature components
    pub const fn vector(&self) -> &[f64; 3] {
        &self.0
    }
}

/// A tile placed by the builder
#[derive(Clone, Debug)]
pub struct Tile<P> {
    /// Caller payload
    pub payload: P,
    /// Color feature the tile was projected from
    pub feature: ColorFeature,
    /// Scaled feature used for seam color distances
    pub seam_color: [f64; 3],
    /// Position on the projection plane
    pub coordinate: [f64; 2],
}

impl<P> Tile<P> {
    /// Build a tile from its payload and feature
    pub fn new(payload: P, feature: ColorFeature, axes: &ProjectionAxes, seam_scale: f64) -> Self {
        Self {
            payload,
            feature,
            seam_color: scale(feature.vector(), seam_scale),
            coordinate: axes.project(feature.vector()),
        }
    }
}

/// Split sources into usable features and payloads excluded by `mode`
///
/// A source is excluded when it has no color for `mode` or the color has a
/// non-finite component.
///
/// Order of the usable sources is preserved so that tile ids follow input order.
pub fn partition_sources<P>(
    sources: Vec<TileSource<P>>,
    mode: ColorMode,
) -> (Vec<(P, ColorFeature)>, Vec<P>) {
    let mut usable = Vec::with_capacity(sources.len());
    let mut excluded = Vec::new();

    for source in sources {
        match source.color(mode) {
            Some(rgb) if rgb.iter().all(|c| c.is_finite()) => {
                usable.push((source.payload, ColorFeature::from_rgb(rgb)));
            }
            _ => excluded.push(source.payload),
        }
    }

    (usable, excluded)
}
