use kurbo::{Affine, Point, Rect};

use crate::{
    foundation::error::StampResult,
    render::{
        composite::{Plane, over_at},
        surface::{affine_to_cpu, image_paint, rect_to_cpu, render_layer},
    },
};

/// Rotation reduced to `[0, 360)`.
pub(crate) fn normalize_rotation(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

fn snap(v: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() < 1e-6 { r } else { v }
}

/// Size of the axis-aligned box enclosing a `width`x`height` buffer rotated by `degrees`.
pub(crate) fn rotated_extent(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let r = normalize_rotation(degrees);
    if r == 0.0 {
        return (width, height);
    }
    let (w, h) = (f64::from(width), f64::from(height));
    let bbox = Affine::rotate_about(r.to_radians(), Point::new(w / 2.0, h / 2.0))
        .transform_rect_bbox(Rect::new(0.0, 0.0, w, h));
    let nw = snap(bbox.x1).ceil() - snap(bbox.x0).floor();
    let nh = snap(bbox.y1).ceil() - snap(bbox.y0).floor();
    (nw.max(1.0) as u32, nh.max(1.0) as u32)
}

/// Rotate a sticker buffer clockwise by `degrees` about its center, growing the canvas so no
/// corner is clipped. A zero rotation returns the buffer unchanged.
pub(crate) fn rotate_expand(src: vello_cpu::Pixmap, degrees: f64) -> StampResult<vello_cpu::Pixmap> {
    let r = normalize_rotation(degrees);
    if r == 0.0 {
        return Ok(src);
    }
    let (w, h) = (u32::from(src.width()), u32::from(src.height()));
    let (nw, nh) = rotated_extent(w, h, r);
    let xf = Affine::translate((f64::from(nw) / 2.0, f64::from(nh) / 2.0))
        * Affine::rotate(r.to_radians())
        * Affine::translate((-f64::from(w) / 2.0, -f64::from(h) / 2.0));
    render_layer(nw, nh, |ctx| {
        ctx.set_transform(affine_to_cpu(xf));
        ctx.set_paint(image_paint(src));
        ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, f64::from(w), f64::from(h))));
        Ok(())
    })
}

/// Top-left paste position that puts the buffer's center on `center`.
pub(crate) fn paste_offset(center: Point, width: u32, height: u32) -> (i64, i64) {
    (
        (center.x - f64::from(width) / 2.0).floor() as i64,
        (center.y - f64::from(height) / 2.0).floor() as i64,
    )
}

/// A rotated sticker buffer and where it lands on the photo.
pub(crate) struct Placement {
    pub(crate) offset: (i64, i64),
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl Placement {
    pub(crate) fn new(buffer: vello_cpu::Pixmap, degrees: f64, center: Point) -> StampResult<Self> {
        let pixmap = rotate_expand(buffer, degrees)?;
        let offset = paste_offset(
            center,
            u32::from(pixmap.width()),
            u32::from(pixmap.height()),
        );
        Ok(Self { offset, pixmap })
    }

    /// Alpha-composite onto `base`, clipped to its bounds.
    pub(crate) fn composite_onto(&self, base: &mut vello_cpu::Pixmap) -> StampResult<()> {
        let (bw, bh) = (u32::from(base.width()), u32::from(base.height()));
        let plane = Plane {
            data: self.pixmap.data_as_u8_slice(),
            width: u32::from(self.pixmap.width()),
            height: u32::from(self.pixmap.height()),
        };
        over_at(
            base.data_as_u8_slice_mut(),
            bw,
            bh,
            plane,
            self.offset.0,
            self.offset.1,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/placement.rs"]
mod tests;
