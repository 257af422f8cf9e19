use kurbo::{Affine, Point, Rect};

use crate::{
    assets::{decode::resample_premul, store::PreparedImage},
    foundation::{
        core::Rgba8,
        error::{StampError, StampResult},
    },
    render::surface::{affine_to_cpu, color_to_cpu, image_paint, pixmap_from_image, rect_to_cpu},
    text::shape::{ShapedText, TextShaper},
};

const BAND_FILL: Rgba8 = Rgba8::new(0, 0, 0, 255);
const TEXT_FILL: Rgba8 = Rgba8::new(255, 255, 255, 255);

/// Image segments are this many reference font sizes tall.
pub(crate) const IMAGE_HEIGHT_RATIO: f64 = 1.3;

/// Horizontal placement of a band's content. The band itself always spans the full width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Content starts one padding in from the left edge.
    Left,
    /// Content ends one padding in from the right edge.
    Right,
}

/// One piece of band content, in reading order.
#[derive(Clone, Debug)]
pub(crate) enum Segment {
    Text(String),
    Image(PreparedImage),
}

impl Segment {
    pub(crate) fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

/// Join runs of adjacent text pieces so separators shape with their neighbours.
pub(crate) fn merge_text(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        match (out.last_mut(), seg) {
            (Some(Segment::Text(prev)), Segment::Text(next)) => prev.push_str(&next),
            (_, seg) => out.push(seg),
        }
    }
    out.retain(|s| !matches!(s, Segment::Text(t) if t.is_empty()));
    out
}

/// Where a band and each of its segments ended up.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BandGeometry {
    pub(crate) top: f64,
    pub(crate) bottom: f64,
    pub(crate) padding: f64,
    pub(crate) content_height: f64,
    pub(crate) start_x: f64,
    pub(crate) total_width: f64,
    /// Segment boxes in drawing order.
    pub(crate) boxes: Vec<Rect>,
}

impl BandGeometry {
    pub(crate) fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Place already measured `(width, height)` segments into a band whose bottom edge is
/// `bottom_y`. The top edge is rounded to a whole pixel row.
pub(crate) fn measure_band(
    sizes: &[(f64, f64)],
    bottom_y: f64,
    image_width: u32,
    align: Alignment,
    font_size: f64,
) -> BandGeometry {
    if sizes.is_empty() {
        return BandGeometry {
            top: bottom_y,
            bottom: bottom_y,
            padding: 0.0,
            content_height: 0.0,
            start_x: 0.0,
            total_width: 0.0,
            boxes: Vec::new(),
        };
    }

    let padding = 0.5 * font_size;
    let spacing = 0.3 * font_size;
    let content_height = sizes.iter().map(|&(_, h)| h).fold(0.0, f64::max);
    let band_height = content_height + 2.0 * padding;
    let total_width = sizes.iter().map(|&(w, _)| w).sum::<f64>()
        + spacing * (sizes.len() - 1) as f64;

    // Whole pixel rows, so neighbouring bands never share a partially covered row.
    let top = (bottom_y - band_height).round();
    let start_x = match align {
        Alignment::Left => padding,
        Alignment::Right => f64::from(image_width) - total_width - padding,
    };

    let mut x = start_x;
    let boxes = sizes
        .iter()
        .map(|&(w, h)| {
            let y = top + padding + (content_height - h) / 2.0;
            let r = Rect::new(x, y, x + w, y + h);
            x += w + spacing;
            r
        })
        .collect();

    BandGeometry {
        top,
        bottom: bottom_y,
        padding,
        content_height,
        start_x,
        total_width,
        boxes,
    }
}

/// Transparent layer that all bands of one call are drawn into.
pub(crate) struct OverlayTarget {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl OverlayTarget {
    pub(crate) fn new(width: u32, height: u32) -> StampResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| StampError::render("overlay width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| StampError::render("overlay height exceeds u16"))?;
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(Self {
            ctx,
            width: w,
            height: h,
        })
    }

    pub(crate) fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub(crate) fn finish(mut self) -> vello_cpu::Pixmap {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        pixmap
    }

    fn fill_band(&mut self, top: f64, bottom: f64) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(BAND_FILL));
        self.ctx.fill_rect(&rect_to_cpu(Rect::new(
            0.0,
            top,
            f64::from(self.width),
            bottom,
        )));
    }

    fn draw_image(&mut self, img: &PreparedImage, at: Rect) -> StampResult<()> {
        let pw = (at.width().round() as u32).max(1);
        let ph = (at.height().round() as u32).max(1);
        let scaled = resample_premul(img, pw, ph)?;
        let pixmap = pixmap_from_image(&scaled)?;
        let origin = (at.x0.round(), at.y0.round());
        self.ctx
            .set_transform(affine_to_cpu(Affine::translate(origin)));
        self.ctx.set_paint(image_paint(pixmap));
        self.ctx.fill_rect(&rect_to_cpu(Rect::new(
            0.0,
            0.0,
            f64::from(pw),
            f64::from(ph),
        )));
        Ok(())
    }
}

enum Measured {
    Text(ShapedText),
    Image(PreparedImage),
}

/// Lay out and draw one full-width band. Returns its geometry; `height()` is what the caller
/// subtracts from `bottom_y` before the next band.
#[tracing::instrument(skip_all, fields(segments = segments.len(), ?align, bottom_y))]
pub(crate) fn layout_band(
    target: &mut OverlayTarget,
    shaper: &mut TextShaper,
    segments: &[Segment],
    bottom_y: f64,
    align: Alignment,
    font_size: f64,
) -> StampResult<BandGeometry> {
    let image_height = IMAGE_HEIGHT_RATIO * font_size;
    let mut measured = Vec::with_capacity(segments.len());
    let mut sizes = Vec::with_capacity(segments.len());
    for seg in segments {
        match seg {
            Segment::Text(s) => {
                let shaped = shaper.shape(s, font_size);
                sizes.push(shaped.size());
                measured.push(Measured::Text(shaped));
            }
            Segment::Image(img) if img.width > 0 && img.height > 0 => {
                let w = image_height * f64::from(img.width) / f64::from(img.height);
                sizes.push((w, image_height));
                measured.push(Measured::Image(img.clone()));
            }
            Segment::Image(_) => tracing::debug!("skipping empty image segment"),
        }
    }

    let geometry = measure_band(&sizes, bottom_y, target.width(), align, font_size);
    if geometry.boxes.is_empty() {
        return Ok(geometry);
    }

    target.fill_band(geometry.top, geometry.bottom);
    for (m, at) in measured.iter().zip(&geometry.boxes) {
        match m {
            Measured::Text(shaped) => {
                shaped.draw(&mut target.ctx, Point::new(at.x0, at.y0), TEXT_FILL)
            }
            Measured::Image(img) => target.draw_image(img, *at)?,
        }
    }
    Ok(geometry)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/band.rs"]
mod tests;
