use std::io::Cursor;

use super::*;

struct TempRoot(PathBuf);

impl TempRoot {
    fn new(tag: &str) -> Self {
        let p = std::env::temp_dir().join(format!("photostamp_store_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&p);
        std::fs::create_dir_all(&p).unwrap();
        Self(p)
    }

    fn write(&self, rel: &str, bytes: &[u8]) {
        let p = self.0.join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, bytes).unwrap();
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([0, 128, 255, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn badge_paths_follow_origin() {
    assert_eq!(
        AssetStore::badge_rel_path(&PackagingRef::builtin("Box", "box.png")).unwrap(),
        "packages/builtin/box.png"
    );
    assert_eq!(
        AssetStore::badge_rel_path(&PackagingRef::custom("Bag", "u1/bag.png")).unwrap(),
        "packages/custom/u1/bag.png"
    );
    assert!(AssetStore::badge_rel_path(&PackagingRef::custom("X", "../etc/passwd")).is_err());
}

#[test]
fn load_badge_reads_and_degrades() {
    let root = TempRoot::new("badge");
    root.write("packages/builtin/box.png", &png(4, 2));
    root.write("packages/custom/broken.png", b"nope");
    let store = AssetStore::new(&root.0);

    let img = store.load_badge(&PackagingRef::builtin("Box", "box.png")).unwrap();
    assert_eq!((img.width, img.height), (4, 2));

    assert!(store.load_badge(&PackagingRef::builtin("Box", "missing.png")).is_none());
    assert!(store.load_badge(&PackagingRef::custom("B", "broken.png")).is_none());
}

#[test]
fn sticker_asset_prefers_png_then_svg() {
    let root = TempRoot::new("sticker");
    root.write("stickers/arrow.png", &png(8, 8));
    root.write(
        "stickers/circle.svg",
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><circle cx="2" cy="2" r="2"/></svg>"#,
    );
    let store = AssetStore::new(&root.0);

    assert!(matches!(
        store.sticker_asset(StickerKind::Arrow),
        Some(StickerAsset::Raster(_))
    ));
    assert!(matches!(
        store.sticker_asset(StickerKind::Circle),
        Some(StickerAsset::Svg(_))
    ));
    assert!(store.sticker_asset(StickerKind::Crosshair).is_none());
}

#[test]
fn font_paths_resolve_under_fonts_dir() {
    let store = AssetStore::new("/srv/assets");
    assert_eq!(
        store.font_path(Path::new("Sans.ttf")),
        PathBuf::from("/srv/assets/fonts/Sans.ttf")
    );
    assert_eq!(
        store.font_path(Path::new("/usr/share/fonts/x.ttf")),
        PathBuf::from("/usr/share/fonts/x.ttf")
    );
    assert_eq!(store.root(), Path::new("/srv/assets"));
}
