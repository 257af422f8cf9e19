use crate::foundation::{
    error::{StampError, StampResult},
    math::{mul_div255_u8, unpremultiply_channel},
};

pub(crate) type PremulRgba8 = [u8; 4];

/// Premultiplied source-over.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(src[i], mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Source-over of two equally sized premultiplied buffers.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> StampResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StampError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Premultiplied buffer with its dimensions.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Plane<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// Source-over of `src` with its top-left corner at `(x, y)` in `dst`.
///
/// Any part of `src` falling outside `dst` is dropped.
pub(crate) fn over_at(
    dst: &mut [u8],
    dst_width: u32,
    dst_height: u32,
    src: Plane<'_>,
    x: i64,
    y: i64,
) -> StampResult<()> {
    let expect = |w: u32, h: u32| (w as usize) * (h as usize) * 4;
    if dst.len() != expect(dst_width, dst_height) || src.data.len() != expect(src.width, src.height)
    {
        return Err(StampError::render(
            "over_at expects buffers matching width*height*4",
        ));
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src.width)).min(i64::from(dst_width));
    let y1 = (y + i64::from(src.height)).min(i64::from(dst_height));
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let span = ((x1 - x0) as usize) * 4;
    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let sx = (x0 - x) as usize;
        let s_off = (sy * src.width as usize + sx) * 4;
        let d_off = (dy as usize * dst_width as usize + x0 as usize) * 4;
        over_in_place(
            &mut dst[d_off..d_off + span],
            &src.data[s_off..s_off + span],
        )?;
    }
    Ok(())
}

/// Drop alpha from a premultiplied buffer, yielding packed RGB8.
pub(crate) fn flatten_to_rgb(premul: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premul.len() / 4 * 3);
    for px in premul.chunks_exact(4) {
        let a = px[3];
        out.push(unpremultiply_channel(px[0], a));
        out.push(unpremultiply_channel(px[1], a));
        out.push(unpremultiply_channel(px[2], a));
    }
    out
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
