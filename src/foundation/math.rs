pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

/// Inverse of [`premultiply_rgba8_in_place`] for a single channel, rounding to nearest.
pub(crate) fn unpremultiply_channel(c: u8, a: u8) -> u8 {
    match a {
        0 => 0,
        255 => c,
        _ => {
            let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
            v.min(255) as u8
        }
    }
}

/// Pixel extent of a float length: floored, never below one pixel.
pub(crate) fn px_extent(len: f64) -> u32 {
    if !len.is_finite() || len < 1.0 {
        return 1;
    }
    len.floor().min(f64::from(u32::MAX)) as u32
}
