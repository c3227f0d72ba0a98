//! Plane decomposition and the element-wise transform kernels.
//!
//! Every supported format decomposes into a short list of [`Plane`]s:
//! one plane for packed layouts, one per channel for planar layouts, and
//! luma plus half-resolution chroma plane(s) for the YUV family. NV12/NV21
//! chroma transforms as a half-size image of 2-byte UV pairs, which keeps
//! the pairs intact under transposition and rotation; I420 chroma is two
//! independent half-size single-byte planes.
//!
//! Transposition has two kernels with identical output bytes: a cache-tiled
//! one used on the wide targets (x86_64, aarch64) and a plain element-wise
//! one used everywhere else. Rotation only has the generic kernel; its
//! accelerated path is deliberately not wired in (see `rotation`).

use crate::rotation::RotateAngle;
use rcv_core::{format_info, ImageBuffer, PixelLayout};

/// Tile edge for the blocked transpose, in elements.
const TILE: usize = 16;

/// One contiguous rectangular plane of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plane {
    /// Byte offset of the plane within the buffer.
    pub offset: usize,
    /// Plane width in elements.
    pub width: usize,
    /// Plane height in rows.
    pub height: usize,
    /// Element size in bytes (a full pixel, channel sample, or UV pair).
    pub elem: usize,
    /// Byte stride between plane rows.
    pub stride: usize,
}

/// Decomposes `buf` into its planes, in storage order.
pub(crate) fn planes(buf: &ImageBuffer) -> Vec<Plane> {
    let info = format_info(buf.format());
    let width = buf.width() as usize;
    let height = buf.height() as usize;
    let stride = buf.stride() as usize;

    match info.layout {
        PixelLayout::Packed => vec![Plane {
            offset: 0,
            width,
            height,
            elem: info.pixel_offset as usize,
            stride,
        }],
        PixelLayout::Planar => {
            let plane_size = stride * height;
            (0..info.channels as usize)
                .map(|c| Plane {
                    offset: c * plane_size,
                    width,
                    height,
                    elem: info.type_byte_size as usize,
                    stride,
                })
                .collect()
        }
        PixelLayout::YuvSemiPlanar => vec![
            Plane {
                offset: 0,
                width,
                height,
                elem: 1,
                stride,
            },
            // Interleaved UV pairs, half resolution on both axes.
            Plane {
                offset: height * stride,
                width: width / 2,
                height: height / 2,
                elem: 2,
                stride,
            },
        ],
        PixelLayout::YuvPlanar => {
            let luma = height * stride;
            let chroma_stride = stride / 2;
            let chroma = (height / 2) * chroma_stride;
            vec![
                Plane {
                    offset: 0,
                    width,
                    height,
                    elem: 1,
                    stride,
                },
                Plane {
                    offset: luma,
                    width: width / 2,
                    height: height / 2,
                    elem: 1,
                    stride: chroma_stride,
                },
                Plane {
                    offset: luma + chroma,
                    width: width / 2,
                    height: height / 2,
                    elem: 1,
                    stride: chroma_stride,
                },
            ]
        }
    }
}

/// Element-wise transpose of one plane.
pub(crate) fn transpose_scalar(src: &[u8], dst: &mut [u8], sp: &Plane, dp: &Plane) {
    let elem = sp.elem;
    for y in 0..sp.height {
        let srow = sp.offset + y * sp.stride;
        let dcol = dp.offset + y * elem;
        for x in 0..sp.width {
            let si = srow + x * elem;
            let di = dcol + x * dp.stride;
            dst[di..di + elem].copy_from_slice(&src[si..si + elem]);
        }
    }
}

/// Cache-tiled transpose of one plane.
///
/// Walks TILE x TILE blocks so both source rows and destination rows stay
/// hot. Byte-identical to [`transpose_scalar`].
pub(crate) fn transpose_blocked(src: &[u8], dst: &mut [u8], sp: &Plane, dp: &Plane) {
    let elem = sp.elem;
    for by in (0..sp.height).step_by(TILE) {
        let by_end = (by + TILE).min(sp.height);
        for bx in (0..sp.width).step_by(TILE) {
            let bx_end = (bx + TILE).min(sp.width);
            for y in by..by_end {
                let srow = sp.offset + y * sp.stride;
                let dcol = dp.offset + y * elem;
                for x in bx..bx_end {
                    let si = srow + x * elem;
                    let di = dcol + x * dp.stride;
                    dst[di..di + elem].copy_from_slice(&src[si..si + elem]);
                }
            }
        }
    }
}

/// Transposes one plane, dispatching on the build target.
pub(crate) fn transpose_plane(src: &[u8], dst: &mut [u8], sp: &Plane, dp: &Plane) {
    if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
        transpose_blocked(src, dst, sp, dp);
    } else {
        transpose_scalar(src, dst, sp, dp);
    }
}

/// Generic rotation of one plane.
///
/// 180 degrees is the composition of a horizontal and a vertical mirror;
/// 90/270 are a transpose plus one mirror. Writing the composed destination
/// index directly keeps the output byte-identical to that composition.
pub(crate) fn rotate_plane(src: &[u8], dst: &mut [u8], sp: &Plane, dp: &Plane, angle: RotateAngle) {
    let elem = sp.elem;
    let (w, h) = (sp.width, sp.height);
    for y in 0..h {
        let srow = sp.offset + y * sp.stride;
        for x in 0..w {
            let (dx, dy) = match angle {
                RotateAngle::Clockwise90 => (h - 1 - y, x),
                RotateAngle::Clockwise180 => (w - 1 - x, h - 1 - y),
                RotateAngle::Clockwise270 => (y, w - 1 - x),
            };
            let si = srow + x * elem;
            let di = dp.offset + dy * dp.stride + dx * elem;
            dst[di..di + elem].copy_from_slice(&src[si..si + elem]);
        }
    }
}
