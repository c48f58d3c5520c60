//! PNG export of finished mosaics with transparent holes

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;

use crate::algorithm::mosaic::Mosaic;
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::swatch::Swatch;

/// How a cell is drawn
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellStyle {
    /// The swatch image scaled to the cell
    #[default]
    Texture,
    /// A solid fill with the swatch's average color
    Flat,
}

fn average_pixel(swatch: &Swatch) -> Rgba<u8> {
    let [r, g, b] = swatch
        .stats
        .average
        .map(|channel| (channel * 255.0).round().clamp(0.0, 255.0) as u8);
    Rgba([r, g, b, 255])
}

fn render_cell(swatch: &Swatch, cell_size: u32, style: CellStyle) -> RgbaImage {
    match style {
        CellStyle::Flat => RgbaImage::from_pixel(cell_size, cell_size, average_pixel(swatch)),
        CellStyle::Texture
            if swatch.image.width() == cell_size && swatch.image.height() == cell_size =>
        {
            swatch.image.clone()
        }
        CellStyle::Texture => {
            imageops::resize(&swatch.image, cell_size, cell_size, FilterType::Triangle)
        }
    }
}

/// Render `mosaic` with each cell drawn at `cell_size` pixels
///
/// # Errors
///
/// Returns [`MosaicError::InvalidParameter`] if `cell_size` is zero or the
/// rendered image would not fit in `u32` dimensions.
pub fn render_mosaic(mosaic: &Mosaic<Swatch>, cell_size: u32, style: CellStyle) -> Result<RgbaImage> {
    if cell_size == 0 {
        return Err(invalid_parameter("cell_size", &cell_size, &"must be at least 1"));
    }

    let scaled = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(cell_size))
            .ok_or_else(|| {
                invalid_parameter("cell_size", &cell_size, &"rendered mosaic is too large")
            })
    };
    let mut canvas = RgbaImage::new(scaled(mosaic.width())?, scaled(mosaic.height())?);

    for (col, row, swatch) in mosaic.cells() {
        let cell = render_cell(swatch, cell_size, style);
        imageops::replace(
            &mut canvas,
            &cell,
            col as i64 * i64::from(cell_size),
            row as i64 * i64::from(cell_size),
        );
    }

    Ok(canvas)
}

/// Render `mosaic` and save it as a PNG at `output_path`
///
/// # Errors
///
/// Returns an error if:
/// - The mosaic cannot be rendered at `cell_size`
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_mosaic_png(
    mosaic: &Mosaic<Swatch>,
    cell_size: u32,
    style: CellStyle,
    output_path: &Path,
) -> Result<()> {
    let canvas = render_mosaic(mosaic, cell_size, style)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    canvas
        .save(output_path)
        .map_err(|e| MosaicError::ImageExport {
            path: output_path.to_path_buf(),
            source: e,
        })
}
