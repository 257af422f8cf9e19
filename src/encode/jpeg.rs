use anyhow::Context;

use crate::foundation::error::{StampError, StampResult};

/// Encode packed RGB8 as a baseline JPEG.
pub(crate) fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> StampResult<Vec<u8>> {
    if rgb.len() != (width as usize) * (height as usize) * 3 {
        return Err(StampError::render("jpeg input does not match width*height*3"));
    }
    let mut out = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    image::ImageEncoder::write_image(encoder, rgb, width, height, image::ExtendedColorType::Rgb8)
        .context("encode jpeg")?;
    Ok(out)
}
