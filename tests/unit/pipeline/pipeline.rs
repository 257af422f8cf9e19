use std::io::Cursor;

use super::*;
use crate::{
    annotation::model::{PackagingRef, StickerColor, StickerKind},
    config::FontCandidate,
};

fn compositor() -> Compositor {
    let cfg = CompositorConfig {
        asset_root: std::env::temp_dir().join("photostamp_pipeline_no_assets"),
        fonts: vec![FontCandidate::Builtin],
        ..CompositorConfig::default()
    };
    Compositor::new(cfg).unwrap()
}

fn photo(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([90, 120, 150]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn sticker(kind: StickerKind, x: f64, y: f64, w: f64, h: f64) -> Sticker {
    Sticker {
        id: "s".to_string(),
        kind,
        x,
        y,
        width: w,
        height: h,
        rotation: 0.0,
        color: StickerColor::Red,
    }
}

#[test]
fn compositor_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Compositor>();
}

#[test]
fn timestamps_format_or_pass_through() {
    assert_eq!(format_timestamp("2023-11-21T08:30:00.000Z"), "2023-11-21 08:30:00");
    assert_eq!(format_timestamp("2023-11-21T08:30:00+02:00"), "2023-11-21 08:30:00");
    assert_eq!(format_timestamp("2023-11-21 08:30:00"), "2023-11-21 08:30:00");
    assert_eq!(format_timestamp("2023-11-21T08:30:59.123456"), "2023-11-21 08:30:59");
    assert_eq!(format_timestamp("2023-11-21T08:30"), "2023-11-21 08:30:00");
    assert_eq!(format_timestamp("2023-11-21"), "2023-11-21 00:00:00");
    assert_eq!(format_timestamp("yesterday-ish"), "yesterday-ish");
    assert_eq!(format_timestamp("2023-13-40T99:00:00Z"), "2023-13-40T99:00:00Z");
}

#[test]
fn coordinates_use_five_decimals() {
    assert_eq!(format_coordinates(40.7128, -74.006), "40.71280, -74.00600");
    assert_eq!(format_coordinates(0.0, 0.0), "0.00000, 0.00000");
}

#[test]
fn band_plan_follows_omission_laws() {
    let c = compositor();

    let empty = AnnotationSet {
        project_label: "Site A".to_string(),
        ..AnnotationSet::default()
    };
    assert!(c.plan_bands(&empty).is_empty());

    let only_time = AnnotationSet {
        captured_at: Some("2023-11-21T08:30:00Z".to_string()),
        ..empty.clone()
    };
    let plan = c.plan_bands(&only_time);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].kind, BandKind::Timestamp);
    assert_eq!(plan[0].align, Alignment::Right);

    let hidden = AnnotationSet {
        hide_timestamp: true,
        ..only_time.clone()
    };
    assert!(c.plan_bands(&hidden).is_empty());

    let full = AnnotationSet {
        comment: Some("Leak found".to_string()),
        latitude: Some(40.7128),
        longitude: Some(-74.006),
        ..only_time
    };
    let plan = c.plan_bands(&full);
    let kinds: Vec<_> = plan.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, [BandKind::Timestamp, BandKind::Project, BandKind::Geolocation]);
    assert_eq!(plan[1].label(), "Site A - Leak found");
    assert_eq!(plan[2].label(), "40.71280, -74.00600");
}

#[test]
fn project_band_can_be_forced() {
    let cfg = CompositorConfig {
        fonts: vec![FontCandidate::Builtin],
        always_show_project_band: true,
        ..CompositorConfig::default()
    };
    let c = Compositor::new(cfg).unwrap();
    let set = AnnotationSet {
        project_label: "Site A".to_string(),
        ..AnnotationSet::default()
    };
    let plan = c.plan_bands(&set);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].label(), "Site A");
}

#[test]
fn missing_badge_keeps_packaging_name() {
    let c = compositor();
    let set = AnnotationSet {
        project_label: "Site A".to_string(),
        packaging: Some(PackagingRef::builtin("Box", "box.png")),
        comment: Some("Dented".to_string()),
        ..AnnotationSet::default()
    };
    let plan = c.plan_bands(&set);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].label(), "Site A - Box - Dented");
    assert_eq!(plan[0].segments.len(), 1);
}

#[test]
fn broken_stickers_are_skipped_not_fatal() {
    let c = compositor();
    let mut set = AnnotationSet::default();
    set.stickers.push(sticker(StickerKind::Arrow, 5.0, 5.0, 20.0, 10.0));
    set.stickers.push(sticker(StickerKind::Circle, 5.0, 5.0, 0.0, 10.0));
    set.stickers.push(sticker(StickerKind::Circle, 0.0, 0.0, 1.0e6, 10.0));
    set.stickers.push(sticker(StickerKind::Circle, f64::NAN, 0.0, 10.0, 10.0));

    let out = c.render(&photo(64, 48), &set).unwrap();
    assert_eq!(out.stickers_drawn, 1);
    assert!(out.bands.is_empty());
}

#[test]
fn asset_mode_without_assets_skips_stickers() {
    let cfg = CompositorConfig {
        asset_root: std::env::temp_dir().join("photostamp_pipeline_no_assets"),
        fonts: vec![FontCandidate::Builtin],
        sticker_source: StickerSource::Asset,
        ..CompositorConfig::default()
    };
    let c = Compositor::new(cfg).unwrap();
    let mut set = AnnotationSet::default();
    set.stickers.push(sticker(StickerKind::Arrow, 5.0, 5.0, 20.0, 10.0));
    let out = c.render(&photo(32, 32), &set).unwrap();
    assert_eq!(out.stickers_drawn, 0);
}

#[test]
fn zero_threads_is_rejected() {
    let c = compositor();
    let err = c.composite_batch(&[], Some(0)).unwrap_err();
    assert!(matches!(err, StampError::Validation(_)));
    assert!(c.composite_batch(&[], Some(1)).unwrap().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = CompositorConfig {
        jpeg_quality: 101,
        ..CompositorConfig::default()
    };
    assert!(matches!(Compositor::new(cfg), Err(StampError::Validation(_))));
}
