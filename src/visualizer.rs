//! Rendering of intensity grids and feature maps.
//!
//! Numeric work (normalization, alpha mapping) is kept separate from
//! painting: painting goes through a [`RendererBase`] so the same routines
//! feed an in-memory image, a canvas, or a file.

use crate::basics::{CANVAS_SIZE, CELL_SIZE, GRID_SIZE};
use crate::color::Rgba8;
use crate::error::Result;
use crate::feature_map::{FeatureMap, LayerActivations};
use crate::grid::IntensityGrid;
use crate::image::RgbaImage;
use crate::pixfmt_rgba::{PixelFormat, PixfmtRgba32};
use crate::renderer_base::RendererBase;
use crate::rendering_buffer::RenderingBuffer;

/// Canvas background behind the guide lines.
pub const GUIDE_BACKGROUND: Rgba8 = Rgba8::from_hex(0x000000);
/// Regular cell boundary.
pub const GUIDE_LINE: Rgba8 = Rgba8::from_hex(0x1a1a1a);
/// Every seventh boundary, for orientation.
pub const GUIDE_LINE_MAJOR: Rgba8 = Rgba8::from_hex(0x2a2a2a);

// ============================================================================
// Intensity grid
// ============================================================================

/// Paint every positive cell as a `CELL_SIZE` white square whose alpha is the
/// cell intensity. Cells at or below zero are left untouched.
pub fn render_grid_into<PF>(ren: &mut RendererBase<PF>, grid: &IntensityGrid)
where
    PF: PixelFormat<ColorType = Rgba8>,
{
    for (x, y, v) in grid.iter_cells() {
        if v > 0.0 {
            let x1 = x as i32 * CELL_SIZE;
            let y1 = y as i32 * CELL_SIZE;
            ren.copy_bar(
                x1,
                y1,
                x1 + CELL_SIZE - 1,
                y1 + CELL_SIZE - 1,
                &Rgba8::white_with_intensity(v),
            );
        }
    }
}

/// Same as [`render_grid_into`] but blends over what is already there, for
/// compositing on top of the guide lines.
pub fn blend_grid_into<PF>(ren: &mut RendererBase<PF>, grid: &IntensityGrid)
where
    PF: PixelFormat<ColorType = Rgba8>,
{
    for (x, y, v) in grid.iter_cells() {
        if v > 0.0 {
            let x1 = x as i32 * CELL_SIZE;
            let y1 = y as i32 * CELL_SIZE;
            ren.blend_bar(
                x1,
                y1,
                x1 + CELL_SIZE - 1,
                y1 + CELL_SIZE - 1,
                &Rgba8::white_with_intensity(v),
            );
        }
    }
}

/// Render the grid onto a transparent `CANVAS_SIZE` square.
pub fn render_grid(grid: &IntensityGrid) -> RgbaImage {
    let mut rb = RenderingBuffer::new(CANVAS_SIZE, CANVAS_SIZE);
    let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
    render_grid_into(&mut ren, grid);
    RgbaImage::from(rb)
}

/// Paint the black background and cell boundary lines.
pub fn render_guides_into<PF>(ren: &mut RendererBase<PF>)
where
    PF: PixelFormat<ColorType = Rgba8>,
{
    ren.clear(&GUIDE_BACKGROUND);
    let last = CANVAS_SIZE as i32 - 1;
    for i in 0..=GRID_SIZE as i32 {
        let pos = (i * CELL_SIZE).min(last);
        let c = if i % 7 == 0 {
            GUIDE_LINE_MAJOR
        } else {
            GUIDE_LINE
        };
        ren.blend_vline(pos, 0, last, &c);
        ren.blend_hline(0, pos, last, &c);
    }
}

/// Strokes composited over the guide grid, as shown on screen.
pub fn compose_grid_image(grid: &IntensityGrid) -> RgbaImage {
    let mut rb = RenderingBuffer::new(CANVAS_SIZE, CANVAS_SIZE);
    let mut ren = RendererBase::new(PixfmtRgba32::new(&mut rb));
    render_guides_into(&mut ren);
    blend_grid_into(&mut ren, grid);
    RgbaImage::from(rb)
}

// ============================================================================
// Feature maps
// ============================================================================

/// Greyscale image of a feature map, one pixel per activation.
///
/// Each map is normalized against its own min and max, so contrast is
/// comparable within a map but not across maps.
pub fn feature_map_to_image(map: &FeatureMap) -> RgbaImage {
    let side = map.side() as u32;
    let mut rb = RenderingBuffer::new(side, side);
    let mut pf = PixfmtRgba32::new(&mut rb);
    for (i, v) in map.normalized().into_iter().enumerate() {
        let level = (v * 255.0).floor().clamp(0.0, 255.0) as u8;
        let x = (i % map.side()) as i32;
        let y = (i / map.side()) as i32;
        pf.copy_pixel(x, y, &Rgba8::grey(level));
    }
    RgbaImage::from(rb)
}

/// Validate raw rows, then render them with [`feature_map_to_image`].
pub fn feature_map_rows_to_image(rows: &[Vec<f64>]) -> Result<RgbaImage> {
    Ok(feature_map_to_image(&FeatureMap::from_rows(rows)?))
}

/// Render every map of every layer, keeping layer and channel order.
pub fn render_layers(layers: &LayerActivations) -> Vec<(String, Vec<RgbaImage>)> {
    layers
        .iter()
        .map(|layer| {
            (
                layer.name.clone(),
                layer.maps.iter().map(feature_map_to_image).collect(),
            )
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
