use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::{
    error::{StampError, StampResult},
    math::px_extent,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Closed set of sticker shapes.
pub enum StickerKind {
    /// Block arrow pointing right before rotation.
    #[serde(alias = "arrow-3d")]
    Arrow,
    /// Outlined ellipse.
    Circle,
    /// Ellipse with a translucent fill.
    CircleFilled,
    /// Target marker; currently drawn like [`StickerKind::Circle`].
    Crosshair,
}

impl StickerKind {
    /// File stem used to look the sticker up in the asset store.
    pub fn asset_stem(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Circle => "circle",
            Self::CircleFilled => "circle-filled",
            Self::Crosshair => "crosshair",
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Named sticker colors; resolved to RGB through a [`Palette`](crate::Palette).
pub enum StickerColor {
    /// Default sticker color.
    #[default]
    Red,
    /// Yellow.
    Yellow,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Cyan.
    Cyan,
    /// Gray.
    Gray,
    /// Black.
    Black,
}

impl StickerColor {
    /// Every named color, in palette order.
    pub const ALL: [Self; 7] = [
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Cyan,
        Self::Gray,
        Self::Black,
    ];
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One sticker placed on the photo.
///
/// `x`, `y`, `width` and `height` describe the unrotated box in source pixels; its center is
/// the pivot kept fixed under rotation.
pub struct Sticker {
    /// Client-side identifier.
    pub id: String,
    /// Shape to draw.
    #[serde(rename = "type")]
    pub kind: StickerKind,
    /// Left edge of the unrotated box.
    pub x: f64,
    /// Top edge of the unrotated box.
    pub y: f64,
    /// Width of the unrotated box.
    pub width: f64,
    /// Height of the unrotated box.
    pub height: f64,
    /// Clockwise rotation in degrees.
    pub rotation: f64,
    /// Sticker color; `null` or missing means red.
    #[serde(default, deserialize_with = "color_or_default")]
    pub color: StickerColor,
}

impl Sticker {
    /// Visual center of the unrotated box, measured on the pixel buffer size.
    pub fn center(&self) -> Point {
        let (w, h) = self.pixel_size();
        Point::new(self.x + f64::from(w) / 2.0, self.y + f64::from(h) / 2.0)
    }

    /// Size of the sticker's own raster buffer.
    pub fn pixel_size(&self) -> (u32, u32) {
        (px_extent(self.width), px_extent(self.height))
    }

    /// Whether the descriptor describes something that can be drawn.
    pub fn is_drawable(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

fn color_or_default<'de, D>(deserializer: D) -> Result<StickerColor, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StickerColor>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which badge directory a packaging badge is read from.
pub enum PackagingOrigin {
    /// Badges shipped with the service.
    Builtin,
    /// Badges uploaded per user.
    Custom,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Packaging badge shown inside the middle information band.
pub struct PackagingRef {
    /// Display name printed after the badge.
    pub name: String,
    /// Badge file name, relative to the origin's badge directory.
    pub badge_source: String,
    /// Badge directory selector.
    pub origin: PackagingOrigin,
}

impl PackagingRef {
    /// Reference a built-in badge.
    pub fn builtin(name: impl Into<String>, badge_source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            badge_source: badge_source.into(),
            origin: PackagingOrigin::Builtin,
        }
    }

    /// Reference a user-supplied badge.
    pub fn custom(name: impl Into<String>, badge_source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            badge_source: badge_source.into(),
            origin: PackagingOrigin::Custom,
        }
    }

    /// Parse the client packaging id form `builtin:<file>`.
    ///
    /// Blank ids mean "no packaging". A blank `name` falls back to the capitalized file stem.
    /// Ids without the `builtin:` prefix name stored custom packagings, which only the
    /// persistence layer can resolve, so they yield `None` here.
    pub fn from_client_id(id: &str, name: Option<&str>) -> Option<Self> {
        let file = id.trim().strip_prefix("builtin:")?.trim();
        if file.is_empty() {
            return None;
        }
        let display = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => capitalize(file_stem(file)),
        };
        Some(Self::builtin(display, file))
    }
}

fn file_stem(file: &str) -> &str {
    let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
    match base.rfind('.') {
        Some(0) | None => base,
        Some(dot) => &base[..dot],
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Everything burned into one photo.
pub struct AnnotationSet {
    /// Free-form comment appended to the project band.
    #[serde(default)]
    pub comment: Option<String>,
    /// Stickers in paint order. Malformed entries are dropped while parsing.
    #[serde(default, deserialize_with = "lenient_stickers")]
    pub stickers: Vec<Sticker>,
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Project display name, first text of the project band.
    #[serde(default)]
    pub project_label: String,
    /// Capture time as an ISO-8601 string.
    #[serde(default)]
    pub captured_at: Option<String>,
    /// Optional packaging badge.
    #[serde(default)]
    pub packaging: Option<PackagingRef>,
    /// Suppress the timestamp band.
    #[serde(default, alias = "hideDate")]
    pub hide_timestamp: bool,
}

impl AnnotationSet {
    /// Parse the camelCase JSON form.
    pub fn from_json(json: &str) -> StampResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StampError::serde(format!("invalid annotation set: {e}")))
    }

    /// Comment text, if present and non-empty.
    pub fn comment_text(&self) -> Option<&str> {
        non_empty(self.comment.as_deref())
    }

    /// Capture timestamp text, if present and non-empty.
    pub fn captured_at_text(&self) -> Option<&str> {
        non_empty(self.captured_at.as_deref())
    }

    /// Coordinates, only when both halves are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn lenient_stickers<'de, D>(deserializer: D) -> Result<Vec<Sticker>, D::Error>
where
    D: Deserializer<'de>,
{
    // Upload forms send the list as an encoded JSON string.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<serde_json::Value>),
        Encoded(String),
    }

    let values = match Option::<Repr>::deserialize(deserializer)? {
        None => return Ok(Vec::new()),
        Some(Repr::List(values)) => values,
        Some(Repr::Encoded(s)) => match serde_json::from_str::<Vec<serde_json::Value>>(&s) {
            Ok(values) => values,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable encoded sticker list");
                return Ok(Vec::new());
            }
        },
    };

    let mut out = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<Sticker>(value) {
            Ok(sticker) => out.push(sticker),
            Err(e) => tracing::debug!(index = idx, error = %e, "dropping malformed sticker"),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/annotation/model.rs"]
mod tests;
