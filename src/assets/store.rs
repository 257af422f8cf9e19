use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    annotation::model::{PackagingOrigin, PackagingRef, StickerKind},
    assets::decode::{decode_image, parse_svg},
    foundation::error::{StampError, StampResult},
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub(crate) struct PreparedImage {
    /// Width in pixels.
    pub(crate) width: u32,
    /// Height in pixels.
    pub(crate) height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub(crate) rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Prepared SVG asset represented as a parsed `usvg` tree.
pub(crate) struct PreparedSvg {
    /// Parsed SVG tree.
    pub(crate) tree: Arc<usvg::Tree>,
}

#[derive(Clone, Debug)]
/// Sticker artwork loaded from the asset store.
pub(crate) enum StickerAsset {
    Raster(PreparedImage),
    Svg(PreparedSvg),
}

/// Normalize and validate store-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> StampResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StampError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(StampError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StampError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StampError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Read-only view of the asset directory.
///
/// ```text
/// <root>/stickers/<type>.png|svg
/// <root>/packages/builtin/<file>
/// <root>/packages/custom/<file>
/// <root>/fonts/<file>
/// ```
#[derive(Clone, Debug)]
pub(crate) struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, rel: &str) -> StampResult<PathBuf> {
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(Path::new(&norm)))
    }

    fn read_bytes(&self, rel: &str) -> StampResult<Vec<u8>> {
        let p = self.resolve(rel)?;
        std::fs::read(&p).map_err(|e| {
            StampError::decode(format!("failed to read asset '{}': {e}", p.display()))
        })
    }

    /// Store-relative location of a packaging badge.
    pub(crate) fn badge_rel_path(packaging: &PackagingRef) -> StampResult<String> {
        let dir = match packaging.origin {
            PackagingOrigin::Builtin => "packages/builtin",
            PackagingOrigin::Custom => "packages/custom",
        };
        let file = normalize_rel_path(&packaging.badge_source)?;
        Ok(format!("{dir}/{file}"))
    }

    /// Load a packaging badge. Any failure degrades to `None` so the caller renders text only.
    #[tracing::instrument(skip(self), fields(badge = %packaging.badge_source))]
    pub(crate) fn load_badge(&self, packaging: &PackagingRef) -> Option<PreparedImage> {
        let loaded = Self::badge_rel_path(packaging)
            .and_then(|rel| self.read_bytes(&rel))
            .and_then(|bytes| decode_image(&bytes));
        match loaded {
            Ok(img) if img.width > 0 && img.height > 0 => Some(img),
            Ok(_) => {
                tracing::warn!("packaging badge is empty, rendering name only");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "packaging badge unavailable, rendering name only");
                None
            }
        }
    }

    /// Load the artwork for a sticker kind, trying PNG before SVG.
    pub(crate) fn sticker_asset(&self, kind: StickerKind) -> Option<StickerAsset> {
        let stem = kind.asset_stem();
        let png = format!("stickers/{stem}.png");
        if let Ok(p) = self.resolve(&png)
            && p.is_file()
        {
            return match self.read_bytes(&png).and_then(|b| decode_image(&b)) {
                Ok(img) => Some(StickerAsset::Raster(img)),
                Err(e) => {
                    tracing::warn!(sticker = stem, error = %e, "sticker asset failed to decode");
                    None
                }
            };
        }
        let svg = format!("stickers/{stem}.svg");
        match self.read_bytes(&svg).and_then(|b| parse_svg(&b)) {
            Ok(tree) => Some(StickerAsset::Svg(tree)),
            Err(e) => {
                tracing::warn!(sticker = stem, error = %e, "no usable sticker asset");
                None
            }
        }
    }

    /// Absolute path of a font candidate. Relative paths live under `fonts/`.
    pub(crate) fn font_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join("fonts").join(path)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
