use super::*;

#[test]
fn unknown_characters_render_as_question_mark() {
    assert_eq!(glyph_columns('é'), glyph_columns('?'));
    assert_eq!(glyph_columns('\n'), glyph_columns('?'));
    assert_ne!(glyph_columns('A'), glyph_columns('?'));
    assert_eq!(glyph_columns(' '), [0; 5]);
}

#[test]
fn scale_tracks_requested_size() {
    assert_eq!(scale_for(8.0), 1);
    assert_eq!(scale_for(16.0), 2);
    assert_eq!(scale_for(33.0), 4);
    assert_eq!(scale_for(3.0), 1);
    assert_eq!(scale_for(f64::NAN), 1);
}

#[test]
fn measure_counts_cells_without_trailing_gap() {
    assert_eq!(measure("", 3), (0.0, 0.0));
    assert_eq!(measure("A", 1), (5.0, 8.0));
    assert_eq!(measure("AB", 2), (22.0, 16.0));
}

#[test]
fn long_text_at_large_scale_does_not_overflow() {
    let text = "x".repeat(5_000_000);
    let (w, h) = measure(&text, 140);
    assert_eq!(w, (5_000_000.0 * 6.0 - 1.0) * 140.0);
    assert_eq!(h, 1120.0);
    assert!(w > f64::from(u32::MAX));

    let rects = glyph_rects(&"x".repeat(1000), 1_000_000);
    let last = rects.iter().map(|r| r.x1).fold(0.0, f64::max);
    assert!(last > f64::from(u32::MAX));
}

#[test]
fn rects_stay_inside_measured_box() {
    let text = "Site A - 12:30 jpq";
    let scale = 3;
    let (w, h) = measure(text, scale);
    let rects = glyph_rects(text, scale);
    assert!(!rects.is_empty());
    for r in rects {
        assert!(r.x0 >= 0.0 && r.y0 >= 0.0);
        assert!(r.x1 <= w && r.y1 <= h);
    }
}

#[test]
fn vertical_runs_are_merged() {
    // 'I': a full-height stem plus top and bottom serif dots on either side.
    let rects = glyph_rects("I", 1);
    assert_eq!(rects.len(), 5);
    assert!(rects.iter().any(|r| r.height() == 7.0));
    assert!(glyph_rects(" ", 1).is_empty());
}
