use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    assets::palette::Palette,
    foundation::error::{StampError, StampResult},
};

/// One entry of the ordered font fallback chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontCandidate {
    /// Font file; relative paths resolve under `<asset_root>/fonts`.
    File(PathBuf),
    /// Installed system family, looked up by name.
    Family(String),
    /// Whatever the system reports as its sans-serif family.
    SansSerif,
    /// Embedded bitmap glyph set. Always loads.
    Builtin,
}

/// The candidate chain used when the config does not name one.
pub fn default_font_candidates() -> Vec<FontCandidate> {
    vec![
        FontCandidate::Family("Arial".to_string()),
        FontCandidate::File(PathBuf::from("/System/Library/Fonts/Helvetica.ttc")),
        FontCandidate::SansSerif,
        FontCandidate::Builtin,
    ]
}

/// How large information bands are relative to the photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandScale {
    /// `max(16, height / 60)` reference font size.
    #[default]
    Compact,
    /// `max(32, height / 30)` reference font size.
    Strip,
}

impl BandScale {
    /// Reference font size in pixels for a photo of the given height.
    pub fn reference_font_size(self, image_height: u32) -> f64 {
        let h = f64::from(image_height);
        match self {
            Self::Compact => (h / 60.0).floor().max(16.0),
            Self::Strip => (h / 30.0).floor().max(32.0),
        }
    }
}

/// Where sticker pixels come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickerSource {
    /// Draw stickers as vector shapes.
    #[default]
    Vector,
    /// Load `stickers/<type>.png|svg` from the asset store.
    Asset,
}

/// Construction-time settings for a [`Compositor`](crate::Compositor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Root of the read-only asset store.
    pub asset_root: PathBuf,
    /// Sticker color table.
    pub palette: Palette,
    /// Ordered font fallback chain; the first candidate that loads is used.
    pub fonts: Vec<FontCandidate>,
    /// Band proportions.
    pub band_scale: BandScale,
    /// Vector or asset-backed stickers.
    pub sticker_source: StickerSource,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
    /// Draw the project band even when it would only hold the project label.
    pub always_show_project_band: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            palette: Palette::default(),
            fonts: default_font_candidates(),
            band_scale: BandScale::default(),
            sticker_source: StickerSource::default(),
            jpeg_quality: 95,
            always_show_project_band: false,
        }
    }
}

impl CompositorConfig {
    /// Config rooted at `asset_root` with every other field at its default.
    pub fn with_asset_root(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> StampResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            StampError::validation(format!("cannot read config '{}': {e}", path.display()))
        })?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|e| {
            StampError::serde(format!("invalid config '{}': {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PHOTOSTAMP_ASSET_ROOT`, `PHOTOSTAMP_FONT` and `PHOTOSTAMP_JPEG_QUALITY`.
    pub fn with_env_overrides(self) -> StampResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> StampResult<Self> {
        if let Some(root) = lookup("PHOTOSTAMP_ASSET_ROOT").filter(|v| !v.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(font) = lookup("PHOTOSTAMP_FONT").filter(|v| !v.is_empty()) {
            self.fonts.insert(0, FontCandidate::File(PathBuf::from(font)));
        }
        if let Some(q) = lookup("PHOTOSTAMP_JPEG_QUALITY") {
            self.jpeg_quality = q.trim().parse().map_err(|_| {
                StampError::validation(format!("PHOTOSTAMP_JPEG_QUALITY is not a number: '{q}'"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> StampResult<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StampError::validation(format!(
                "jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
