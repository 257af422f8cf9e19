use super::*;

#[test]
fn pixmap_size_limits_are_enforced() {
    assert!(pixmap_from_premul_bytes(&[0; 4], 1, 1).is_ok());
    assert!(pixmap_from_premul_bytes(&[0; 8], 1, 1).is_err());
    assert!(pixmap_from_premul_bytes(&[], 70_000, 1).is_err());
    assert!(render_layer(0, 4, |_| Ok(())).is_err());
    assert!(render_layer(4, 70_000, |_| Ok(())).is_err());
}

#[test]
fn premul_bytes_round_trip_through_pixmap() {
    let bytes = [10u8, 20, 30, 40, 255, 255, 255, 255];
    let pixmap = pixmap_from_premul_bytes(&bytes, 2, 1).unwrap();
    assert_eq!(pixmap.data_as_u8_slice(), &bytes);
}

#[test]
fn render_layer_starts_transparent_and_fills() {
    let pixmap = render_layer(8, 8, |ctx| {
        let rect = kurbo::Rect::new(2.0, 2.0, 6.0, 6.0);
        fill(ctx, &kurbo::Shape::to_path(&rect, 0.1), Rgba8::new(255, 0, 0, 255));
        Ok(())
    })
    .unwrap();
    let data = pixmap.data_as_u8_slice();
    assert_eq!(&data[0..4], &[0, 0, 0, 0]);
    let center = (4 * 8 + 4) * 4;
    assert_eq!(&data[center..center + 4], &[255, 0, 0, 255]);
}

#[test]
fn stroke_covers_outline_but_not_interior() {
    let pixmap = render_layer(20, 20, |ctx| {
        let rect = kurbo::Rect::new(4.0, 4.0, 16.0, 16.0);
        stroke(ctx, &kurbo::Shape::to_path(&rect, 0.1), 2.0, Rgba8::new(0, 0, 255, 255));
        Ok(())
    })
    .unwrap();
    let data = pixmap.data_as_u8_slice();
    let alpha = |x: usize, y: usize| data[(y * 20 + x) * 4 + 3];
    assert_eq!(alpha(10, 4), 255);
    assert_eq!(alpha(10, 10), 0);
    assert_eq!(alpha(0, 0), 0);
}

#[test]
fn layer_errors_propagate() {
    let err = render_layer(2, 2, |_| Err(StampError::render("boom"))).unwrap_err();
    assert!(matches!(err, StampError::Render(_)));
}
