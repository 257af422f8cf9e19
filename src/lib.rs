//! Photostamp burns annotations into photos.
//!
//! A [`Compositor`] takes encoded photo bytes plus an [`AnnotationSet`] and returns a JPEG with:
//!
//! - vector (or asset-backed) stickers rotated about their centers and blended onto the photo
//! - up to three full-width information bands stacked from the bottom edge: capture time,
//!   project label with optional packaging badge and comment, and coordinates
//!
//! The compositor is immutable after construction and safe to share between worker threads.
#![forbid(unsafe_code)]

mod annotation;
mod assets;
mod config;
mod encode;
mod foundation;
mod layout;
mod pipeline;
mod render;
mod text;

pub use crate::annotation::model::{
    AnnotationSet, PackagingOrigin, PackagingRef, Sticker, StickerColor, StickerKind,
};
pub use crate::assets::palette::Palette;
pub use crate::config::{
    BandScale, CompositorConfig, FontCandidate, StickerSource, default_font_candidates,
};
pub use crate::foundation::core::{Rgb8, Rgba8};
pub use crate::foundation::error::{StampError, StampResult};
pub use crate::layout::band::Alignment;
pub use crate::pipeline::{
    BandKind, BandReport, CompositeJob, Compositor, RenderedPhoto, composite, format_coordinates,
    format_timestamp,
};
