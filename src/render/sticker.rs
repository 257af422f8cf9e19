use kurbo::{BezPath, Ellipse, Point, Rect, Shape};

use crate::{
    annotation::model::StickerKind,
    assets::{
        decode::{rasterize_svg_to_premul_rgba8, resample_premul},
        palette::Palette,
        store::StickerAsset,
    },
    foundation::{
        core::{Rgb8, Rgba8},
        error::StampResult,
    },
    render::surface::{fill, pixmap_from_image, render_layer, stroke, stroke_inside},
};

/// Offset of every drop shadow, in pixels.
pub(crate) const SHADOW_OFFSET: f64 = 4.0;
/// Alpha of the `circle-filled` interior.
const FILL_ALPHA: u8 = 180;
const HIGHLIGHT: Rgba8 = Rgba8::new(255, 255, 255, 100);

/// White border width shared by all vector stickers.
pub(crate) fn outline_width(width: u32) -> f64 {
    f64::from((width / 25).max(3))
}

fn ring_width(width: u32) -> f64 {
    f64::from((width / 15).max(4))
}

/// The seven arrow vertices for a `w`x`h` box, tail at the left and apex at `(w, h/2)`.
pub(crate) fn arrow_points(w: f64, h: f64) -> [Point; 7] {
    let shaft = h * 0.4;
    let head = h * 0.8;
    let head_len = w * 0.4;
    let cy = h / 2.0;
    let neck = w - head_len;
    [
        Point::new(0.0, cy - shaft / 2.0),
        Point::new(neck, cy - shaft / 2.0),
        Point::new(neck, cy - head / 2.0),
        Point::new(w, cy),
        Point::new(neck, cy + head / 2.0),
        Point::new(neck, cy + shaft / 2.0),
        Point::new(0.0, cy + shaft / 2.0),
    ]
}

fn polygon(points: impl IntoIterator<Item = Point>) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in points.into_iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn ellipse_path(rect: Rect) -> Option<BezPath> {
    if !(rect.width() > 0.0 && rect.height() > 0.0) {
        return None;
    }
    Some(Ellipse::from_rect(rect).to_path(0.1))
}

/// Draw a vector sticker into its own transparent `width`x`height` buffer.
pub(crate) fn render_vector_sticker(
    kind: StickerKind,
    width: u32,
    height: u32,
    color: Rgb8,
) -> StampResult<vello_cpu::Pixmap> {
    render_layer(width, height, |ctx| {
        match kind {
            StickerKind::Arrow => draw_arrow(ctx, width, height, color),
            StickerKind::Circle | StickerKind::Crosshair => {
                draw_ring(ctx, width, height, color, false)
            }
            StickerKind::CircleFilled => draw_ring(ctx, width, height, color, true),
        }
        Ok(())
    })
}

fn draw_arrow(ctx: &mut vello_cpu::RenderContext, width: u32, height: u32, color: Rgb8) {
    let (w, h) = (f64::from(width), f64::from(height));
    let points = arrow_points(w, h);
    let ow = outline_width(width);

    let shadow = polygon(
        points
            .iter()
            .map(|p| Point::new(p.x + SHADOW_OFFSET, p.y + SHADOW_OFFSET)),
    );
    fill(ctx, &shadow, Palette::SHADOW);

    let body = polygon(points);
    fill(ctx, &body, color.with_alpha(255));
    stroke_inside(ctx, &body, ow, Palette::OUTLINE.with_alpha(255));

    // Bevel highlight just inside the shaft's top edge.
    let shaft_top = points[0].y;
    let hl_width = (h * 0.4 / 4.0).floor();
    let (x0, x1) = (ow, points[1].x - ow);
    if hl_width > 0.0 && x1 > x0 {
        let mut line = BezPath::new();
        line.move_to((x0, shaft_top + ow));
        line.line_to((x1, shaft_top + ow));
        stroke(ctx, &line, hl_width, HIGHLIGHT);
    }
}

fn draw_ring(
    ctx: &mut vello_cpu::RenderContext,
    width: u32,
    height: u32,
    color: Rgb8,
    filled: bool,
) {
    let (w, h) = (f64::from(width), f64::from(height));
    let ow = outline_width(width);
    let sw = ring_width(width);

    if let Some(shadow) = ellipse_path(Rect::new(SHADOW_OFFSET, SHADOW_OFFSET, w - ow, h - ow)) {
        fill(ctx, &shadow, Palette::SHADOW);
    }

    let body = Rect::new(0.0, 0.0, w - SHADOW_OFFSET, h - SHADOW_OFFSET);
    if filled && let Some(inner) = ellipse_path(body) {
        fill(ctx, &inner, color.with_alpha(FILL_ALPHA));
    }
    // Rings are drawn inside the box, so inset by half the stroke.
    if let Some(ring) = ellipse_path(body.inset(-sw / 2.0)) {
        stroke(ctx, &ring, sw, color.with_alpha(255));
    }
    if let Some(contour) = ellipse_path(body.inset(-ow / 2.0)) {
        stroke(ctx, &contour, ow, Palette::OUTLINE.with_alpha(255));
    }
}

/// Scale sticker artwork to exactly `width`x`height`.
pub(crate) fn render_asset_sticker(
    asset: &StickerAsset,
    width: u32,
    height: u32,
) -> StampResult<vello_cpu::Pixmap> {
    let img = match asset {
        StickerAsset::Raster(img) => resample_premul(img, width, height)?,
        StickerAsset::Svg(svg) => rasterize_svg_to_premul_rgba8(&svg.tree, width, height)?,
    };
    pixmap_from_image(&img)
}

#[cfg(test)]
#[path = "../../tests/unit/render/sticker.rs"]
mod tests;
