use std::sync::Arc;

use kurbo::{Affine, BezPath, Rect};

use crate::{
    assets::store::PreparedImage,
    foundation::{
        core::Rgba8,
        error::{StampError, StampResult},
    },
};

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

pub(crate) fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn dims_u16(width: u32, height: u32) -> StampResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StampError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StampError::render("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(StampError::render("pixmap must be at least 1x1"));
    }
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StampResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StampError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    let mut opaque = true;
    for px in bytes.chunks_exact(4) {
        opaque &= px[3] == 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, !opaque,
    ))
}

pub(crate) fn pixmap_from_image(img: &PreparedImage) -> StampResult<vello_cpu::Pixmap> {
    pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)
}

/// Image paint sampling `pixmap` in its own pixel space.
pub(crate) fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

/// Fill a path in the context's current transform.
pub(crate) fn fill(ctx: &mut vello_cpu::RenderContext, path: &BezPath, color: Rgba8) {
    ctx.set_paint(color_to_cpu(color));
    ctx.fill_path(&bezpath_to_cpu(path));
}

/// Stroke a path centered on its outline by expanding it to a fillable outline first.
pub(crate) fn stroke(
    ctx: &mut vello_cpu::RenderContext,
    path: &BezPath,
    width: f64,
    color: Rgba8,
) {
    if width <= 0.0 {
        return;
    }
    let outline = kurbo::stroke(
        path.iter(),
        &kurbo::Stroke::new(width).with_join(kurbo::Join::Miter),
        &kurbo::StrokeOpts::default(),
        0.1,
    );
    fill(ctx, &outline, color);
}

/// Stroke of `width` lying entirely inside the closed `path`.
pub(crate) fn stroke_inside(
    ctx: &mut vello_cpu::RenderContext,
    path: &BezPath,
    width: f64,
    color: Rgba8,
) {
    if width <= 0.0 {
        return;
    }
    ctx.push_clip_layer(&bezpath_to_cpu(path));
    stroke(ctx, path, 2.0 * width, color);
    ctx.pop_layer();
}

/// Render into a fresh transparent `width`x`height` pixmap.
pub(crate) fn render_layer(
    width: u32,
    height: u32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> StampResult<()>,
) -> StampResult<vello_cpu::Pixmap> {
    let (w, h) = dims_u16(width, height)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx)?;
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
