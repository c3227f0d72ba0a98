//! Layout calculation: from format metadata and dimensions to byte layout.
//!
//! The calculator is a pure function: given a [`FormatInfo`] and positive
//! dimensions it produces the row stride, the inter-channel byte offset, and
//! the total allocation size. It never fails; invalid formats cannot reach
//! it because the registry enumeration is closed.
//!
//! # Alignment policy
//!
//! Row alignment is a configuration option, not a hardcoded rule:
//! [`LayoutPolicy`] carries the row alignment (a power of two) and defaults
//! to 1, i.e. tightly packed rows. The owning buffer constructors and the
//! interop bridge both use the default policy, so allocation size and pixel
//! addressing always agree.
//!
//! # YUV sizing
//!
//! The luma plane is `stride * height`; chroma planes are appended after its
//! full extent. NV12/NV21 append one interleaved plane of
//! `stride * ceil(height / 2)` bytes; I420 appends two planes of
//! `ceil(stride / 2) * ceil(height / 2)` bytes each. For even dimensions this
//! is the classic `stride * height * 3 / 2`; odd dimensions round the chroma
//! extent up so the addressing formulas in `ImageBuffer::pixel_address` can
//! never escape the allocation.

use crate::format::{FormatInfo, PixelLayout};

/// Sentinel channel offset marking a YUV layout, where channel addressing
/// follows plane arithmetic instead of a fixed per-channel byte stride.
pub const YUV_CHANNEL_OFFSET: i64 = -1;

/// Row alignment configuration for the layout calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPolicy {
    /// Row alignment in bytes; must be a power of two. 1 means tight rows.
    pub row_align: usize,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self { row_align: 1 }
    }
}

impl LayoutPolicy {
    /// Tightly packed rows (the default).
    pub const TIGHT: LayoutPolicy = LayoutPolicy { row_align: 1 };

    /// Rows padded to a multiple of `align` bytes.
    ///
    /// Returns `None` unless `align` is a power of two.
    pub fn aligned(align: usize) -> Option<Self> {
        if align.is_power_of_two() {
            Some(Self { row_align: align })
        } else {
            None
        }
    }

    #[inline]
    fn round_up(self, n: usize) -> usize {
        (n + self.row_align - 1) & !(self.row_align - 1)
    }
}

/// Derived byte layout of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Byte stride between channels of one pixel. For planar layouts this is
    /// the size of one full plane; for YUV layouts it is
    /// [`YUV_CHANNEL_OFFSET`].
    pub channel_offset: i64,
    /// Bytes per row of plane 0.
    pub stride: i32,
    /// Total allocation size in bytes.
    pub total_byte_size: u64,
}

impl Layout {
    /// Computes the layout for `info` at `width` x `height` under `policy`.
    ///
    /// Pure and total for positive dimensions.
    pub fn compute(info: &FormatInfo, width: i32, height: i32, policy: LayoutPolicy) -> Layout {
        let row = match info.layout {
            PixelLayout::Packed => width as usize * info.pixel_offset as usize,
            PixelLayout::Planar => width as usize * info.type_byte_size as usize,
            PixelLayout::YuvSemiPlanar | PixelLayout::YuvPlanar => width as usize,
        };
        let stride = policy.round_up(row) as i32;
        Self::with_stride(info, width, height, stride)
    }

    /// Computes the layout for a caller-supplied row stride.
    ///
    /// Used when wrapping external memory whose pitch is already fixed.
    /// `stride` must be at least the tight row size for `width`.
    pub fn with_stride(info: &FormatInfo, width: i32, height: i32, stride: i32) -> Layout {
        debug_assert!(
            stride as usize
                >= match info.layout {
                    PixelLayout::Packed => width as usize * info.pixel_offset as usize,
                    PixelLayout::Planar => width as usize * info.type_byte_size as usize,
                    _ => width as usize,
                },
            "stride below tight row size"
        );
        let h = height as u64;
        let s = stride as u64;
        match info.layout {
            PixelLayout::Packed => Layout {
                channel_offset: (info.pixel_offset / info.channels) as i64,
                stride,
                total_byte_size: s * h,
            },
            PixelLayout::Planar => Layout {
                // One full plane per channel.
                channel_offset: (s * h) as i64,
                stride,
                total_byte_size: s * h * info.channels as u64,
            },
            PixelLayout::YuvSemiPlanar => Layout {
                channel_offset: YUV_CHANNEL_OFFSET,
                stride,
                total_byte_size: s * h + s * h.div_ceil(2),
            },
            PixelLayout::YuvPlanar => Layout {
                channel_offset: YUV_CHANNEL_OFFSET,
                stride,
                total_byte_size: s * h + 2 * s.div_ceil(2) * h.div_ceil(2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{format_info, ALL_FORMATS, ImageFormat};

    #[test]
    fn test_total_size_positive_and_deterministic() {
        for format in ALL_FORMATS {
            let info = format_info(format);
            let a = Layout::compute(&info, 17, 11, LayoutPolicy::default());
            let b = Layout::compute(&info, 17, 11, LayoutPolicy::default());
            assert!(a.total_byte_size > 0, "{format:?}");
            assert_eq!(a, b, "{format:?}");
        }
    }

    #[test]
    fn test_total_size_monotonic_in_extent() {
        for format in ALL_FORMATS {
            let info = format_info(format);
            let base = Layout::compute(&info, 16, 16, LayoutPolicy::default());
            let wider = Layout::compute(&info, 18, 16, LayoutPolicy::default());
            let taller = Layout::compute(&info, 16, 18, LayoutPolicy::default());
            assert!(wider.total_byte_size > base.total_byte_size, "{format:?}");
            assert!(taller.total_byte_size > base.total_byte_size, "{format:?}");
        }
    }

    #[test]
    fn test_packed_stride_lower_bound() {
        for format in ALL_FORMATS {
            let info = format_info(format);
            if info.layout != PixelLayout::Packed {
                continue;
            }
            let layout = Layout::compute(&info, 33, 7, LayoutPolicy::default());
            assert!(
                layout.stride >= 33 * info.pixel_offset,
                "{format:?}: stride {} below tight row",
                layout.stride
            );
        }
    }

    #[test]
    fn test_packed_channel_offset() {
        let info = format_info(ImageFormat::PkgBgrF32);
        let layout = Layout::compute(&info, 8, 8, LayoutPolicy::default());
        assert_eq!(layout.channel_offset, 4);
        assert_eq!(layout.stride, 8 * 12);
        assert_eq!(layout.total_byte_size, 8 * 12 * 8);

        // 565: three channels share one 16-bit word.
        let info = format_info(ImageFormat::PkgRgb565U8);
        let layout = Layout::compute(&info, 8, 8, LayoutPolicy::default());
        assert_eq!(layout.channel_offset, 0);
        assert_eq!(layout.stride, 16);
    }

    #[test]
    fn test_planar_channel_offset_is_plane_size() {
        let info = format_info(ImageFormat::PlaRgbF32);
        let layout = Layout::compute(&info, 10, 5, LayoutPolicy::default());
        assert_eq!(layout.stride, 40);
        assert_eq!(layout.channel_offset, 40 * 5);
        assert_eq!(layout.total_byte_size, 40 * 5 * 3);
    }

    #[test]
    fn test_yuv_420_sizes() {
        let nv12 = format_info(ImageFormat::Nv12);
        let layout = Layout::compute(&nv12, 8, 6, LayoutPolicy::default());
        assert_eq!(layout.stride, 8);
        assert_eq!(layout.channel_offset, YUV_CHANNEL_OFFSET);
        assert_eq!(layout.total_byte_size, 8 * 6 * 3 / 2);

        let i420 = format_info(ImageFormat::I420);
        let layout = Layout::compute(&i420, 8, 6, LayoutPolicy::default());
        assert_eq!(layout.total_byte_size, 8 * 6 * 3 / 2);
    }

    #[test]
    fn test_row_alignment_pads_stride() {
        let info = format_info(ImageFormat::PkgBgrU8);
        let policy = LayoutPolicy::aligned(32).unwrap();
        let layout = Layout::compute(&info, 10, 4, policy);
        assert_eq!(layout.stride, 32);
        assert_eq!(layout.total_byte_size, 32 * 4);
    }

    #[test]
    fn test_row_alignment_rejects_non_power_of_two() {
        assert!(LayoutPolicy::aligned(12).is_none());
        assert!(LayoutPolicy::aligned(0).is_none());
        assert_eq!(LayoutPolicy::aligned(1), Some(LayoutPolicy::TIGHT));
    }

    #[test]
    fn test_with_stride_override() {
        let info = format_info(ImageFormat::GrayU8);
        let layout = Layout::with_stride(&info, 10, 4, 16);
        assert_eq!(layout.stride, 16);
        assert_eq!(layout.total_byte_size, 64);
    }
}
