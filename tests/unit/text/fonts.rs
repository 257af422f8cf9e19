use std::path::PathBuf;

use super::*;

fn store() -> AssetStore {
    AssetStore::new(std::env::temp_dir().join("photostamp_fonts_absent_root"))
}

#[test]
fn empty_chain_resolves_to_builtin() {
    assert!(matches!(resolve_band_font(&[], &store()), BandFont::Builtin));
}

#[test]
fn unloadable_candidates_fall_through() {
    let chain = [
        FontCandidate::File(PathBuf::from("missing.ttf")),
        FontCandidate::Family("No Such Family 7f1e".to_string()),
        FontCandidate::Builtin,
        FontCandidate::SansSerif,
    ];
    let font = resolve_band_font(&chain, &store());
    assert!(matches!(font, BandFont::Builtin));
    assert_eq!(font.describe(), "builtin bitmap");
}

#[test]
fn garbage_font_bytes_are_rejected() {
    assert!(outline_from_bytes(b"not a font at all".to_vec()).is_err());
    assert!(outline_from_bytes(Vec::new()).is_err());
}

#[test]
fn file_candidate_loads_real_font_bytes() {
    let Some(sys) = system_sans_for_tests() else {
        return;
    };
    let dir = std::env::temp_dir().join(format!("photostamp_fonts_{}", std::process::id()));
    std::fs::create_dir_all(dir.join("fonts")).unwrap();
    std::fs::write(dir.join("fonts/band.ttf"), sys.bytes.as_slice()).unwrap();

    let font = resolve_band_font(
        &[FontCandidate::File(PathBuf::from("band.ttf"))],
        &AssetStore::new(&dir),
    );
    match font {
        BandFont::Outline(f) => assert!(!f.bytes.is_empty()),
        BandFont::Builtin => panic!("expected outline font"),
    }
    std::fs::remove_dir_all(&dir).ok();
}
