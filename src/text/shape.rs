use std::borrow::Cow;

use kurbo::{Affine, Point};

use crate::{
    foundation::{
        core::Rgba8,
        error::{StampError, StampResult},
    },
    render::surface::{affine_to_cpu, color_to_cpu, rect_to_cpu},
    text::{
        builtin,
        fonts::{BandFont, OutlineFont},
    },
};

/// Parley contexts bound to one registered outline font.
struct OutlineEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl OutlineEngine {
    fn new(outline: &OutlineFont) -> StampResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(outline.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StampError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StampError::validation("registered font family has no name"))?
            .to_string();
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(outline.bytes.as_ref().clone()),
            outline.index,
        );
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
        })
    }

    fn layout(&mut self, text: &str, size_px: f32) -> parley::Layout<Rgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(Rgba8::new(
            255, 255, 255, 255,
        )));
        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// Single-line text shaper for one compositing call.
///
/// Holds mutable layout caches, so each call builds its own.
pub(crate) struct TextShaper {
    engine: Option<OutlineEngine>,
}

impl TextShaper {
    /// Prepare shaping with `font`. An outline font that fails to register degrades to the
    /// builtin bitmap font.
    pub(crate) fn new(font: &BandFont) -> Self {
        let engine = match font {
            BandFont::Builtin => None,
            BandFont::Outline(outline) => match OutlineEngine::new(outline) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    tracing::warn!(error = %e, "outline font unusable, using builtin bitmap font");
                    None
                }
            },
        };
        Self { engine }
    }

    #[cfg(test)]
    pub(crate) fn is_builtin(&self) -> bool {
        self.engine.is_none()
    }

    /// Shape one line of text at `size_px`.
    pub(crate) fn shape(&mut self, text: &str, size_px: f64) -> ShapedText {
        match self.engine.as_mut() {
            Some(engine) => {
                let layout = engine.layout(text, size_px as f32);
                ShapedText::Outline {
                    layout,
                    font: engine.font.clone(),
                }
            }
            None => ShapedText::Bitmap {
                text: text.to_string(),
                scale: builtin::scale_for(size_px),
            },
        }
    }
}

/// Shaped line ready to measure and draw.
pub(crate) enum ShapedText {
    Outline {
        layout: parley::Layout<Rgba8>,
        font: vello_cpu::peniko::FontData,
    },
    Bitmap {
        text: String,
        scale: u32,
    },
}

impl ShapedText {
    /// Ink-box size `(width, height)` in pixels.
    pub(crate) fn size(&self) -> (f64, f64) {
        match self {
            Self::Outline { layout, .. } => {
                (f64::from(layout.full_width()), f64::from(layout.height()))
            }
            Self::Bitmap { text, scale } => builtin::measure(text, *scale),
        }
    }

    /// Draw with the top-left of the text box at `origin`.
    pub(crate) fn draw(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        origin: Point,
        color: Rgba8,
    ) {
        ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
        ctx.set_paint(color_to_cpu(color));
        match self {
            Self::Outline { layout, font } => {
                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(font)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }
            }
            Self::Bitmap { text, scale } => {
                for r in builtin::glyph_rects(text, *scale) {
                    ctx.fill_rect(&rect_to_cpu(r));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shape.rs"]
mod tests;
