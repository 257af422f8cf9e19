use std::collections::HashMap;

use serde_json::json;

use super::*;
use crate::{annotation::model::StickerColor, foundation::core::Rgb8};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn reference_font_size_per_scale() {
    assert_eq!(BandScale::Compact.reference_font_size(2000), 33.0);
    assert_eq!(BandScale::Compact.reference_font_size(600), 16.0);
    assert_eq!(BandScale::Strip.reference_font_size(2000), 66.0);
    assert_eq!(BandScale::Strip.reference_font_size(600), 32.0);
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: CompositorConfig = serde_json::from_value(json!({
        "asset_root": "/srv/assets",
        "palette": { "green": [1, 2, 3] },
        "band_scale": "strip"
    }))
    .unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("/srv/assets"));
    assert_eq!(cfg.palette.resolve(StickerColor::Green), Rgb8(1, 2, 3));
    assert_eq!(cfg.palette.resolve(StickerColor::Red), Rgb8(255, 50, 50));
    assert_eq!(cfg.band_scale, BandScale::Strip);
    assert_eq!(cfg.jpeg_quality, 95);
    assert_eq!(cfg.fonts, default_font_candidates());
}

#[test]
fn font_candidates_parse_from_json() {
    let fonts: Vec<FontCandidate> = serde_json::from_value(json!([
        { "file": "DejaVuSans.ttf" },
        { "family": "Roboto" },
        "sans_serif",
        "builtin"
    ]))
    .unwrap();
    assert_eq!(
        fonts,
        vec![
            FontCandidate::File(PathBuf::from("DejaVuSans.ttf")),
            FontCandidate::Family("Roboto".to_string()),
            FontCandidate::SansSerif,
            FontCandidate::Builtin,
        ]
    );
}

#[test]
fn quality_out_of_range_is_rejected() {
    let cfg = CompositorConfig {
        jpeg_quality: 0,
        ..CompositorConfig::default()
    };
    assert!(matches!(cfg.validate(), Err(StampError::Validation(_))));
}

#[test]
fn env_overrides_apply() {
    let cfg = CompositorConfig::default()
        .with_overrides_from(env(&[
            ("PHOTOSTAMP_ASSET_ROOT", "/tmp/a"),
            ("PHOTOSTAMP_FONT", "/tmp/f.ttf"),
            ("PHOTOSTAMP_JPEG_QUALITY", "80"),
        ]))
        .unwrap();
    assert_eq!(cfg.asset_root, PathBuf::from("/tmp/a"));
    assert_eq!(cfg.fonts[0], FontCandidate::File(PathBuf::from("/tmp/f.ttf")));
    assert_eq!(cfg.jpeg_quality, 80);

    let err = CompositorConfig::default()
        .with_overrides_from(env(&[("PHOTOSTAMP_JPEG_QUALITY", "high")]))
        .unwrap_err();
    assert!(matches!(err, StampError::Validation(_)));
}

#[test]
fn from_json_file_reports_missing_and_invalid_files() {
    let dir = std::env::temp_dir().join(format!("photostamp_config_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    assert!(matches!(
        CompositorConfig::from_json_file(&dir.join("absent.json")),
        Err(StampError::Validation(_))
    ));

    let bad = dir.join("bad.json");
    std::fs::write(&bad, b"{ not json").unwrap();
    assert!(matches!(
        CompositorConfig::from_json_file(&bad),
        Err(StampError::Serde(_))
    ));

    let good = dir.join("good.json");
    std::fs::write(&good, br#"{ "jpeg_quality": 90, "fonts": ["builtin"] }"#).unwrap();
    let cfg = CompositorConfig::from_json_file(&good).unwrap();
    assert_eq!(cfg.jpeg_quality, 90);
    assert_eq!(cfg.fonts, vec![FontCandidate::Builtin]);

    std::fs::remove_dir_all(&dir).ok();
}
