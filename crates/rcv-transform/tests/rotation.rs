//! Round-trip and composition properties of the geometric transforms.

use rcv_core::{ImageBuffer, ImageFormat};
use rcv_transform::{rotate, rotate_degrees, transpose, RotateAngle};

/// Deterministic non-repeating fill for a freshly allocated buffer.
fn fill(buf: &mut ImageBuffer) {
    for (i, b) in buf.bytes_mut().unwrap().iter_mut().enumerate() {
        *b = (i * 131 % 251) as u8;
    }
}

fn patterned(width: i32, height: i32, format: ImageFormat) -> ImageBuffer {
    let mut buf = ImageBuffer::new(width, height, format);
    assert!(!buf.is_empty(), "{format:?}");
    fill(&mut buf);
    buf
}

const FORMATS: [ImageFormat; 8] = [
    ImageFormat::GrayU8,
    ImageFormat::GrayF64,
    ImageFormat::PkgBgrU8,
    ImageFormat::PkgRgbaF32,
    ImageFormat::PlaRgbU8,
    ImageFormat::PkgRgb565U8,
    ImageFormat::Nv12,
    ImageFormat::I420,
];

#[test]
fn transpose_twice_restores_bytes() {
    for format in FORMATS {
        let src = patterned(12, 8, format);
        let mut once = ImageBuffer::default();
        transpose(&src, &mut once).unwrap();
        assert_eq!((once.width(), once.height()), (8, 12), "{format:?}");

        let mut twice = ImageBuffer::default();
        transpose(&once, &mut twice).unwrap();
        assert_eq!((twice.width(), twice.height()), (12, 8), "{format:?}");
        assert_eq!(src.bytes(), twice.bytes(), "{format:?}");
    }
}

#[test]
fn rotate_90_then_270_restores_bytes() {
    for format in FORMATS {
        let src = patterned(10, 6, format);
        let mut quarter = ImageBuffer::default();
        rotate(&src, &mut quarter, RotateAngle::Clockwise90).unwrap();
        assert_eq!((quarter.width(), quarter.height()), (6, 10), "{format:?}");

        let mut back = ImageBuffer::default();
        rotate(&quarter, &mut back, RotateAngle::Clockwise270).unwrap();
        assert_eq!(src.bytes(), back.bytes(), "{format:?}");
    }
}

#[test]
fn rotate_270_then_90_restores_bytes() {
    for format in FORMATS {
        let src = patterned(6, 10, format);
        let mut quarter = ImageBuffer::default();
        rotate(&src, &mut quarter, RotateAngle::Clockwise270).unwrap();
        let mut back = ImageBuffer::default();
        rotate(&quarter, &mut back, RotateAngle::Clockwise90).unwrap();
        assert_eq!(src.bytes(), back.bytes(), "{format:?}");
    }
}

#[test]
fn rotate_180_twice_restores_bytes() {
    for format in FORMATS {
        let src = patterned(8, 8, format);
        let mut half = ImageBuffer::default();
        rotate(&src, &mut half, RotateAngle::Clockwise180).unwrap();
        let mut back = ImageBuffer::default();
        rotate(&half, &mut back, RotateAngle::Clockwise180).unwrap();
        assert_eq!(src.bytes(), back.bytes(), "{format:?}");
    }
}

#[test]
fn rotate_90_equals_transpose_plus_row_mirror_gray() {
    // For a single-plane single-byte format the composition can be checked
    // directly: cw90(src)[y][x] == src[h-1-x][y].
    let src = ImageBuffer::from_vec(
        3,
        2,
        ImageFormat::GrayU8,
        vec![b'a', b'b', b'c', b'd', b'e', b'f'],
    )
    .unwrap();
    let mut dst = ImageBuffer::default();
    rotate(&src, &mut dst, RotateAngle::Clockwise90).unwrap();
    assert_eq!(dst.bytes().unwrap(), b"daebfc");

    let mut dst = ImageBuffer::default();
    rotate(&src, &mut dst, RotateAngle::Clockwise270).unwrap();
    assert_eq!(dst.bytes().unwrap(), b"cfbead");

    let mut dst = ImageBuffer::default();
    rotate(&src, &mut dst, RotateAngle::Clockwise180).unwrap();
    assert_eq!(dst.bytes().unwrap(), b"fedcba");
}

#[test]
fn rotate_90_keeps_packed_pixels_intact() {
    // 2x2 packed BGR, one distinct color per pixel.
    let src = ImageBuffer::from_vec(
        2,
        2,
        ImageFormat::PkgBgrU8,
        vec![
            10, 11, 12, /* top-left */ 20, 21, 22, /* top-right */
            30, 31, 32, /* bottom-left */ 40, 41, 42, /* bottom-right */
        ],
    )
    .unwrap();
    let mut dst = ImageBuffer::default();
    rotate(&src, &mut dst, RotateAngle::Clockwise90).unwrap();
    // Clockwise: bottom-left moves to top-left, top-left to top-right.
    assert_eq!(
        dst.bytes().unwrap(),
        &[30, 31, 32, 10, 11, 12, 40, 41, 42, 20, 21, 22][..]
    );
}

#[test]
fn rotate_90_nv12_keeps_uv_pairs() {
    // 4x2 NV12: 8 luma bytes then 2 UV pairs.
    let src = ImageBuffer::from_vec(
        4,
        2,
        ImageFormat::Nv12,
        vec![
            0, 1, 2, 3, //
            4, 5, 6, 7, //
            100, 101, 110, 111, // (U0,V0) (U1,V1)
        ],
    )
    .unwrap();
    let mut dst = ImageBuffer::default();
    rotate(&src, &mut dst, RotateAngle::Clockwise90).unwrap();
    assert_eq!((dst.width(), dst.height()), (2, 4));
    let bytes = dst.bytes().unwrap();
    // Luma rotated as a 4x2 -> 2x4 plane.
    assert_eq!(&bytes[..8], &[4, 0, 5, 1, 6, 2, 7, 3]);
    // Chroma plane is 2x1 pairs -> 1x2 pairs; each UV pair stays adjacent.
    assert_eq!(&bytes[8..], &[100, 101, 110, 111]);
}

#[test]
fn transpose_into_supplied_destination() {
    let src = patterned(6, 4, ImageFormat::PkgRgbU8);
    let mut dst = ImageBuffer::new(4, 6, ImageFormat::PkgRgbU8);
    transpose(&src, &mut dst).unwrap();

    // Spot-check the corner pixels against pixel_address.
    for (sx, sy) in [(0, 0), (5, 0), (0, 3), (5, 3)] {
        for c in 0..3 {
            let s = src.pixel_address(sx, sy, c).unwrap();
            let d = dst.pixel_address(sy, sx, c).unwrap();
            unsafe { assert_eq!(*s, *d) };
        }
    }
}

#[test]
fn rotate_degrees_round_trip_and_rejection() {
    let src = patterned(8, 6, ImageFormat::GrayU8);
    let mut quarter = ImageBuffer::default();
    rotate_degrees(&src, &mut quarter, 90).unwrap();
    let mut back = ImageBuffer::default();
    rotate_degrees(&quarter, &mut back, 270).unwrap();
    assert_eq!(src.bytes(), back.bytes());

    let mut dst = ImageBuffer::default();
    assert!(rotate_degrees(&src, &mut dst, 45).is_err());
    assert!(dst.is_empty());
}
