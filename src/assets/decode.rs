use std::{io::Cursor, sync::Arc};

use image::{ImageDecoder, metadata::Orientation};

use crate::{
    assets::store::{PreparedImage, PreparedSvg},
    foundation::{
        error::{StampError, StampResult},
        math::premultiply_rgba8_in_place,
    },
};

/// Largest side accepted for any rasterized asset.
const MAX_DIM: u32 = 16_384;

/// Decode the uploaded photo to straight RGBA8 with its EXIF orientation applied.
pub(crate) fn decode_photo(bytes: &[u8]) -> StampResult<image::RgbaImage> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StampError::decode(format!("sniff photo format: {e}")))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| StampError::decode(format!("open photo decoder: {e}")))?;
    let orientation = match decoder.orientation() {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable orientation tag, keeping pixels as stored");
            Orientation::NoTransforms
        }
    };
    let mut img = image::DynamicImage::from_decoder(decoder)
        .map_err(|e| StampError::decode(format!("decode photo: {e}")))?;
    img.apply_orientation(orientation);
    Ok(img.to_rgba8())
}

/// Decode an encoded raster (badge or sticker asset) into premultiplied RGBA8.
pub(crate) fn decode_image(bytes: &[u8]) -> StampResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StampError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn parse_svg(bytes: &[u8]) -> StampResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| StampError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Rasterize an SVG stretched to exactly `width`x`height`.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StampResult<PreparedImage> {
    if width > MAX_DIM || height > MAX_DIM {
        return Err(StampError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StampError::render("failed to allocate svg pixmap"))?;

    let size = tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

/// Lanczos resample of a premultiplied image.
///
/// Ringing can push a color channel above its alpha; channels are clamped back so the result
/// stays valid premultiplied data.
pub(crate) fn resample_premul(
    src: &PreparedImage,
    width: u32,
    height: u32,
) -> StampResult<PreparedImage> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(StampError::render(format!(
            "invalid resample target {width}x{height}"
        )));
    }
    if src.width == width && src.height == height {
        return Ok(src.clone());
    }
    let buf = image::RgbaImage::from_raw(src.width, src.height, src.rgba8_premul.to_vec())
        .ok_or_else(|| StampError::render("image buffer does not match its dimensions"))?;
    let mut out = image::imageops::resize(
        &buf,
        width,
        height,
        image::imageops::FilterType::Lanczos3,
    )
    .into_raw();
    for px in out.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = px[0].min(a);
        px[1] = px[1].min(a);
        px[2] = px[2].min(a);
    }
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(out),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
