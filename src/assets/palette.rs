use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    annotation::model::StickerColor,
    foundation::core::{Rgb8, Rgba8},
};

/// Mapping from sticker color names to concrete RGB values.
///
/// Deserializing merges the given entries over [`Palette::default`], so a config only needs to
/// list the colors it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    colors: BTreeMap<StickerColor, Rgb8>,
}

impl Default for Palette {
    fn default() -> Self {
        let colors = StickerColor::ALL
            .into_iter()
            .map(|c| (c, default_rgb(c)))
            .collect();
        Self { colors }
    }
}

impl Palette {
    /// Sticker outline color.
    pub const OUTLINE: Rgb8 = Rgb8::WHITE;
    /// Translucent drop shadow shared by every vector sticker.
    pub const SHADOW: Rgba8 = Rgba8::new(0, 0, 0, 100);

    /// Resolve a named color.
    pub fn resolve(&self, color: StickerColor) -> Rgb8 {
        self.colors
            .get(&color)
            .copied()
            .unwrap_or_else(|| default_rgb(color))
    }

    /// Return a copy with one color replaced.
    pub fn with_color(mut self, color: StickerColor, rgb: Rgb8) -> Self {
        self.colors.insert(color, rgb);
        self
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let overrides = BTreeMap::<StickerColor, Rgb8>::deserialize(deserializer)?;
        let mut palette = Self::default();
        palette.colors.extend(overrides);
        Ok(palette)
    }
}

fn default_rgb(color: StickerColor) -> Rgb8 {
    match color {
        StickerColor::Red => Rgb8(255, 50, 50),
        StickerColor::Yellow => Rgb8(255, 200, 0),
        StickerColor::Green => Rgb8(0, 255, 100),
        StickerColor::Blue => Rgb8(33, 150, 243),
        StickerColor::Cyan => Rgb8(0, 255, 255),
        StickerColor::Gray => Rgb8(128, 128, 128),
        StickerColor::Black => Rgb8(0, 0, 0),
    }
}
