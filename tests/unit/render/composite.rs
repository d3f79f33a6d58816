use super::*;

#[test]
fn over_transparent_src_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [200, 200, 200, 0]), dst);
}

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255]), [9, 8, 7, 255]);
}

#[test]
fn over_half_red_on_white() {
    assert_eq!(over([255, 255, 255, 255], [128, 0, 0, 128]), [255, 127, 127, 255]);
}

#[test]
fn over_onto_transparent_returns_src() {
    assert_eq!(over([0, 0, 0, 0], [100, 50, 25, 128]), [100, 50, 25, 128]);
}

#[test]
fn silhouette_keeps_coverage_only() {
    assert_eq!(silhouette([200, 1, 2, 255], [10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(silhouette([7, 7, 7, 0], [10, 20, 30, 255]), [0, 0, 0, 0]);
    assert_eq!(silhouette([64, 0, 0, 128], [10, 20, 30, 255]), [5, 10, 15, 128]);
}

#[test]
fn premul_scales_colour_by_alpha() {
    assert_eq!(premul([255, 0, 0, 255]), [255, 0, 0, 255]);
    assert_eq!(premul([200, 100, 50, 0]), [0, 0, 0, 0]);
}

#[test]
fn in_place_blends_reject_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(silhouette_over_in_place(&mut dst, &[0u8; 7], [0, 0, 0, 255]).is_err());

    over_in_place(&mut dst, &[1, 2, 3, 255, 0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![1, 2, 3, 255, 0, 0, 0, 0]);
}
