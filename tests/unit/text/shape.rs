use super::*;
use crate::text::fonts::system_sans_for_tests;

#[test]
fn builtin_shaper_measures_with_bitmap_cells() {
    let mut shaper = TextShaper::new(&BandFont::Builtin);
    assert!(shaper.is_builtin());
    let shaped = shaper.shape("Hello", 16.0);
    assert_eq!(shaped.size(), (58.0, 16.0));
    assert_eq!(shaper.shape("", 16.0).size(), (0.0, 0.0));
}

#[test]
fn outline_shaper_scales_with_font_size() {
    let Some(font) = system_sans_for_tests() else {
        return;
    };
    let mut shaper = TextShaper::new(&BandFont::Outline(font));
    assert!(!shaper.is_builtin());
    let (w_small, h_small) = shaper.shape("Site A", 20.0).size();
    let (w_big, h_big) = shaper.shape("Site A", 40.0).size();
    assert!(w_small > 0.0 && h_small > 0.0);
    assert!(w_big > w_small * 1.5);
    assert!(h_big > h_small * 1.5);
}

#[test]
fn bitmap_text_draws_white_pixels_inside_its_box() {
    let mut shaper = TextShaper::new(&BandFont::Builtin);
    let shaped = shaper.shape("X", 8.0);
    let mut ctx = vello_cpu::RenderContext::new(16, 16);
    shaped.draw(&mut ctx, Point::new(2.0, 3.0), Rgba8::new(255, 255, 255, 255));
    let mut pixmap = vello_cpu::Pixmap::new(16, 16);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let data = pixmap.data_as_u8_slice();
    let at = |x: usize, y: usize| data[(y * 16 + x) * 4 + 3];
    // 'X' column 0 has its top bit set.
    assert_eq!(at(2, 3), 255);
    assert_eq!(at(0, 0), 0);
    assert_eq!(at(12, 12), 0);
}
