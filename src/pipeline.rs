use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    annotation::model::{AnnotationSet, Sticker},
    assets::{decode::decode_photo, store::AssetStore},
    config::{CompositorConfig, StickerSource},
    encode::jpeg::encode_jpeg,
    foundation::{
        error::{StampError, StampResult},
        math::premultiply_rgba8_in_place,
    },
    layout::band::{Alignment, OverlayTarget, Segment, layout_band, merge_text},
    render::{
        composite::{flatten_to_rgb, over_in_place},
        placement::Placement,
        sticker::{render_asset_sticker, render_vector_sticker},
        surface::pixmap_from_premul_bytes,
    },
    text::{
        fonts::{BandFont, resolve_band_font},
        shape::TextShaper,
    },
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR: &str = " - ";
/// Largest sticker box side that is rasterized; bigger stickers are skipped.
const MAX_STICKER_SIDE: u32 = 16_384;

/// Which information row a band carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandKind {
    /// Capture time, bottom band.
    Timestamp,
    /// Project label, packaging and comment, middle band.
    Project,
    /// Coordinates, top band.
    Geolocation,
}

/// What one drawn band contains and where it landed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandReport {
    /// Row kind.
    pub kind: BandKind,
    /// Text content; a drawn badge shows up as `[badge]`.
    pub label: String,
    /// Content alignment.
    pub alignment: Alignment,
    /// Top edge in pixels.
    pub top: f64,
    /// Bottom edge in pixels.
    pub bottom: f64,
    /// Left edge of the content.
    pub content_x: f64,
    /// Width of the content including inter-segment spacing.
    pub content_width: f64,
    /// Padding around the content.
    pub padding: f64,
}

/// Fully composited photo before encoding.
#[derive(Clone, Debug)]
pub struct RenderedPhoto {
    /// Width in pixels, after orientation correction.
    pub width: u32,
    /// Height in pixels, after orientation correction.
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Vec<u8>,
    /// Drawn bands, bottom to top.
    pub bands: Vec<BandReport>,
    /// Number of stickers that made it onto the photo.
    pub stickers_drawn: usize,
}

/// One unit of work for [`Compositor::composite_batch`].
#[derive(Clone, Debug)]
pub struct CompositeJob {
    /// Encoded source photo.
    pub photo: Vec<u8>,
    /// Annotations to burn in.
    pub annotations: AnnotationSet,
}

struct PlannedBand {
    kind: BandKind,
    align: Alignment,
    segments: Vec<Segment>,
}

impl PlannedBand {
    fn label(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => t.trim().to_string(),
                Segment::Image(_) => "[badge]".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Burns stickers and information bands into photos.
///
/// Construction resolves the font chain once; afterwards the compositor is immutable and can
/// be shared across threads. Every call builds its own layers and shaping contexts.
#[derive(Clone, Debug)]
pub struct Compositor {
    config: CompositorConfig,
    store: AssetStore,
    font: BandFont,
}

impl Compositor {
    /// Validate `config` and resolve the band font.
    pub fn new(config: CompositorConfig) -> StampResult<Self> {
        config.validate()?;
        let store = AssetStore::new(config.asset_root.clone());
        let font = resolve_band_font(&config.fonts, &store);
        tracing::info!(font = %font.describe(), root = %store.root().display(), "compositor ready");
        Ok(Self {
            config,
            store,
            font,
        })
    }

    /// The configuration this compositor was built with.
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Human-readable name of the resolved band font.
    pub fn font_description(&self) -> String {
        self.font.describe()
    }

    /// Composite and encode to JPEG.
    ///
    /// Only an undecodable (or oversized) photo fails the call; broken stickers and missing
    /// badges are skipped.
    #[tracing::instrument(skip_all, fields(bytes = photo.len(), stickers = annotations.stickers.len()))]
    pub fn composite(&self, photo: &[u8], annotations: &AnnotationSet) -> StampResult<Vec<u8>> {
        let rendered = self.render(photo, annotations)?;
        let rgb = flatten_to_rgb(&rendered.rgba8_premul);
        encode_jpeg(
            &rgb,
            rendered.width,
            rendered.height,
            self.config.jpeg_quality,
        )
    }

    /// Composite without encoding.
    pub fn render(&self, photo: &[u8], annotations: &AnnotationSet) -> StampResult<RenderedPhoto> {
        let rgba = decode_photo(photo)?;
        let (width, height) = rgba.dimensions();
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(StampError::validation(format!(
                "photo is {width}x{height}, sides above {} px are not supported",
                u16::MAX
            )));
        }
        let mut bytes = rgba.into_raw();
        premultiply_rgba8_in_place(&mut bytes);
        let mut base = pixmap_from_premul_bytes(&bytes, width, height)?;

        let mut stickers_drawn = 0;
        for (index, sticker) in annotations.stickers.iter().enumerate() {
            match self.draw_sticker(&mut base, sticker) {
                Ok(true) => stickers_drawn += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!(index, id = %sticker.id, error = %e, "skipping sticker"),
            }
        }

        let mut overlay = OverlayTarget::new(width, height)?;
        let mut shaper = TextShaper::new(&self.font);
        let font_size = self.config.band_scale.reference_font_size(height);
        let mut bottom = f64::from(height);
        let mut bands = Vec::new();
        for band in self.plan_bands(annotations) {
            let g = layout_band(
                &mut overlay,
                &mut shaper,
                &band.segments,
                bottom,
                band.align,
                font_size,
            )?;
            if g.boxes.is_empty() {
                continue;
            }
            tracing::debug!(
                kind = ?band.kind,
                height = g.height(),
                content_height = g.content_height,
                "band drawn"
            );
            bands.push(BandReport {
                kind: band.kind,
                label: band.label(),
                alignment: band.align,
                top: g.top,
                bottom: g.bottom,
                content_x: g.start_x,
                content_width: g.total_width,
                padding: g.padding,
            });
            bottom = g.top;
        }

        let overlay = overlay.finish();
        over_in_place(base.data_as_u8_slice_mut(), overlay.data_as_u8_slice())?;

        Ok(RenderedPhoto {
            width,
            height,
            rgba8_premul: base.data_as_u8_slice().to_vec(),
            bands,
            stickers_drawn,
        })
    }

    /// Run many jobs on a dedicated pool; results come back in input order.
    pub fn composite_batch(
        &self,
        jobs: &[CompositeJob],
        threads: Option<usize>,
    ) -> StampResult<Vec<StampResult<Vec<u8>>>> {
        let pool = build_thread_pool(threads)?;
        Ok(pool.install(|| {
            jobs.par_iter()
                .map(|job| self.composite(&job.photo, &job.annotations))
                .collect()
        }))
    }

    fn draw_sticker(&self, base: &mut vello_cpu::Pixmap, sticker: &Sticker) -> StampResult<bool> {
        if !sticker.is_drawable() {
            tracing::debug!(id = %sticker.id, "sticker has no drawable area");
            return Ok(false);
        }
        let (w, h) = sticker.pixel_size();
        if w > MAX_STICKER_SIDE || h > MAX_STICKER_SIDE {
            return Err(StampError::validation(format!(
                "sticker box {w}x{h} exceeds {MAX_STICKER_SIDE} px"
            )));
        }
        let buffer = match self.config.sticker_source {
            StickerSource::Vector => {
                let color = self.config.palette.resolve(sticker.color);
                render_vector_sticker(sticker.kind, w, h, color)?
            }
            StickerSource::Asset => match self.store.sticker_asset(sticker.kind) {
                Some(asset) => render_asset_sticker(&asset, w, h)?,
                None => return Ok(false),
            },
        };
        Placement::new(buffer, sticker.rotation, sticker.center())?.composite_onto(base)?;
        Ok(true)
    }

    /// Bands bottom to top. Rows without content are left out.
    fn plan_bands(&self, annotations: &AnnotationSet) -> Vec<PlannedBand> {
        let mut out = Vec::with_capacity(3);

        if !annotations.hide_timestamp
            && let Some(raw) = annotations.captured_at_text()
        {
            out.push(PlannedBand {
                kind: BandKind::Timestamp,
                align: Alignment::Right,
                segments: vec![Segment::text(format_timestamp(raw))],
            });
        }

        let comment = annotations.comment_text();
        let packaging = annotations.packaging.as_ref();
        if comment.is_some() || packaging.is_some() || self.config.always_show_project_band {
            let mut pieces = vec![Segment::text(annotations.project_label.clone())];
            if let Some(p) = packaging {
                pieces.push(Segment::text(SEPARATOR));
                if let Some(badge) = self.store.load_badge(p) {
                    pieces.push(Segment::Image(badge));
                }
                pieces.push(Segment::text(p.name.clone()));
            }
            if let Some(c) = comment {
                pieces.push(Segment::text(SEPARATOR));
                pieces.push(Segment::text(c));
            }
            out.push(PlannedBand {
                kind: BandKind::Project,
                align: Alignment::Left,
                segments: merge_text(pieces),
            });
        }

        if let Some((lat, lon)) = annotations.coordinates() {
            out.push(PlannedBand {
                kind: BandKind::Geolocation,
                align: Alignment::Left,
                segments: vec![Segment::text(format_coordinates(lat, lon))],
            });
        }
        out
    }
}

/// One-shot helper: build a [`Compositor`] for `config` and composite a single photo.
pub fn composite(
    photo: &[u8],
    annotations: &AnnotationSet,
    config: &CompositorConfig,
) -> StampResult<Vec<u8>> {
    Compositor::new(config.clone())?.composite(photo, annotations)
}

/// Render a capture time as `YYYY-MM-DD HH:MM:SS`, or return it unchanged if unparsable.
///
/// Zoned inputs keep the wall-clock time of their own offset.
pub fn format_timestamp(raw: &str) -> String {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.format(TIMESTAMP_FORMAT).to_string();
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return dt.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return dt.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format("%Y-%m-%d 00:00:00").to_string();
    }
    raw.to_string()
}

/// `"{lat:.5}, {lon:.5}"`.
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.5}, {longitude:.5}")
}

fn build_thread_pool(threads: Option<usize>) -> StampResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StampError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StampError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/pipeline/pipeline.rs"]
mod tests;
