/// Opaque sRGB color, serialized as `[r, g, b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    /// Pure white.
    pub const WHITE: Self = Self(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self(0, 0, 0);

    /// Attach an alpha channel.
    pub fn with_alpha(self, a: u8) -> Rgba8 {
        Rgba8 {
            r: self.0,
            g: self.1,
            b: self.2,
            a,
        }
    }
}

/// Straight (non-premultiplied) RGBA8, the form drawing colors are specified in.
///
/// Also serves as the text layout brush, hence `Default`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Construct from straight channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}
