use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 200, 100, 50, 255]);
}

#[test]
fn flatten_transparent_shows_matte_and_opaque_keeps_color() {
    assert_eq!(flatten_premul_over([0, 0, 0, 0], [255, 255, 255]), [255, 255, 255]);
    assert_eq!(flatten_premul_over([10, 20, 30, 255], [255, 255, 255]), [10, 20, 30]);
}

#[test]
fn flatten_half_alpha_blends_toward_matte() {
    // 50% black over white lands near mid grey.
    let [r, g, b] = flatten_premul_over([0, 0, 0, 128], [255, 255, 255]);
    assert_eq!(r, g);
    assert_eq!(g, b);
    assert!((126..=128).contains(&r));
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_half_alpha() {
    let mut px = vec![200, 100, 50, 255, 100, 50, 25, 128, 9, 9, 9, 0];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[200, 100, 50, 255]);
    assert_eq!(px[7], 128);
    assert!(px[4].abs_diff(200) <= 1);
    assert!(px[5].abs_diff(100) <= 1);
    assert_eq!(&px[8..], &[9, 9, 9, 0]);
}
