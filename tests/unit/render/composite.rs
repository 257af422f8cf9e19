use super::*;

#[test]
fn over_basics() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
    assert_eq!(over(dst, [1, 2, 3, 255]), [1, 2, 3, 255]);
    // Half-transparent black darkens by half.
    assert_eq!(over([200, 200, 200, 255], [0, 0, 0, 128]), [100, 100, 100, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst[..6], &[0u8; 6]).is_err());
}

#[test]
fn over_at_clips_to_destination() {
    let mut dst = vec![0u8; 4 * 4 * 4];
    let src = vec![255u8; 3 * 3 * 4];
    let plane = Plane {
        data: &src,
        width: 3,
        height: 3,
    };
    over_at(&mut dst, 4, 4, plane, -1, 2).unwrap();

    let alpha = |x: usize, y: usize| dst[(y * 4 + x) * 4 + 3];
    assert_eq!(alpha(0, 2), 255);
    assert_eq!(alpha(1, 3), 255);
    assert_eq!(alpha(2, 2), 0);
    assert_eq!(alpha(0, 1), 0);

    // Entirely outside: no change, no error.
    let before = dst.clone();
    over_at(&mut dst, 4, 4, plane, 10, -10).unwrap();
    assert_eq!(dst, before);
}

#[test]
fn over_at_validates_lengths() {
    let mut dst = vec![0u8; 16];
    let src = [0u8; 4];
    let plane = Plane {
        data: &src,
        width: 2,
        height: 1,
    };
    assert!(over_at(&mut dst, 2, 2, plane, 0, 0).is_err());
}

#[test]
fn flatten_unpremultiplies() {
    let rgb = flatten_to_rgb(&[100, 50, 0, 255, 64, 32, 0, 128, 9, 9, 9, 0]);
    assert_eq!(rgb, vec![100, 50, 0, 128, 64, 0, 0, 0, 0]);
}
