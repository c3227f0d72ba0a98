//! Pixel format identifiers and their layout metadata.
//!
//! This module is the format registry: a closed enumeration of every pixel
//! format the buffer core understands, plus the immutable per-format layout
//! metadata that drives all addressing arithmetic.
//!
//! # Types
//!
//! - [`ImageFormat`] - closed format enumeration with stable discriminants
//! - [`PixelLayout`] - packed / planar / YUV layout family
//! - [`FormatInfo`] - channel count, per-channel byte size, pixel span
//!
//! # Usage
//!
//! ```rust
//! use rcv_core::format::{ImageFormat, PixelLayout, format_info};
//!
//! let info = format_info(ImageFormat::PkgBgrU8);
//! assert_eq!(info.channels, 3);
//! assert_eq!(info.pixel_offset, 3);
//! assert_eq!(info.layout, PixelLayout::Packed);
//! ```
//!
//! The lookup is a `match` over the closed enum: O(1), read-only, and safe
//! for concurrent access with no locking.

/// Pixel format of an image buffer.
///
/// Discriminants are stable and shared with the interop boundary codes in
/// `rcv-interop`; do not reorder existing variants.
///
/// Naming: `Pla` = planar (one contiguous region per channel), `Pkg` =
/// packed (channels interleaved per pixel). `Bgr565`/`Rgb565` pack three
/// channels into two bytes. NV12/NV21 are 4:2:0 semi-planar YUV with
/// interleaved chroma; I420 is 4:2:0 with two separate chroma planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum ImageFormat {
    /// 8-bit unsigned single channel.
    GrayU8 = 0,
    /// 16-bit unsigned single channel.
    GrayU16 = 1,
    /// 32-bit signed single channel.
    GrayS32 = 2,
    /// 32-bit float single channel.
    GrayF32 = 3,
    /// 64-bit float single channel.
    GrayF64 = 4,
    /// Planar 8-bit BGR.
    PlaBgrU8 = 5,
    /// Planar 8-bit RGB.
    PlaRgbU8 = 6,
    /// Packed 8-bit BGR.
    PkgBgrU8 = 7,
    /// Packed 8-bit RGB.
    PkgRgbU8 = 8,
    /// Planar 8-bit BGRA.
    PlaBgraU8 = 9,
    /// Planar 8-bit RGBA.
    PlaRgbaU8 = 10,
    /// Packed 8-bit BGRA.
    PkgBgraU8 = 11,
    /// Packed 8-bit RGBA.
    PkgRgbaU8 = 12,
    /// Planar float BGR.
    PlaBgrF32 = 13,
    /// Planar float RGB.
    PlaRgbF32 = 14,
    /// Packed float BGR.
    PkgBgrF32 = 15,
    /// Packed float RGB.
    PkgRgbF32 = 16,
    /// Planar float BGRA.
    PlaBgraF32 = 17,
    /// Planar float RGBA.
    PlaRgbaF32 = 18,
    /// Packed float BGRA.
    PkgBgraF32 = 19,
    /// Packed float RGBA.
    PkgRgbaF32 = 20,
    /// Packed double BGR.
    PkgBgrF64 = 21,
    /// Packed double RGB.
    PkgRgbF64 = 22,
    /// Packed double BGRA.
    PkgBgraF64 = 23,
    /// Packed double RGBA.
    PkgRgbaF64 = 24,
    /// Packed 16-bit 5-6-5 BGR.
    PkgBgr565U8 = 25,
    /// Packed 16-bit 5-6-5 RGB.
    PkgRgb565U8 = 26,
    /// 4:2:0 semi-planar YUV, chroma order UV.
    Nv12 = 27,
    /// 4:2:0 semi-planar YUV, chroma order VU.
    Nv21 = 28,
    /// 4:2:0 planar YUV (Y, then U plane, then V plane).
    I420 = 29,
}

impl ImageFormat {
    /// Returns `true` for the chroma-subsampled YUV family.
    #[inline]
    pub fn is_yuv(self) -> bool {
        matches!(self, Self::Nv12 | Self::Nv21 | Self::I420)
    }
}

/// Storage layout family of a pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Channels of one pixel stored contiguously, interleaved per pixel.
    Packed,
    /// Each channel stored in its own full-resolution plane.
    Planar,
    /// Luma plane followed by one interleaved half-resolution chroma plane.
    YuvSemiPlanar,
    /// Luma plane followed by two separate half-resolution chroma planes.
    YuvPlanar,
}

impl PixelLayout {
    /// Returns `true` for the subsampled YUV layouts, where channel
    /// addressing follows plane-specific arithmetic instead of
    /// `pixel_offset * x + channel_offset * c`.
    #[inline]
    pub fn is_yuv(self) -> bool {
        matches!(self, Self::YuvSemiPlanar | Self::YuvPlanar)
    }
}

/// Per-format layout metadata.
///
/// `pixel_offset` is the byte span of one full pixel in the plane-0 sense:
/// `channels * type_byte_size` for packed RGB layouts, `type_byte_size` for
/// planar layouts, 1 for YUV luma, and 2 for the 565 packs (three channels
/// share two bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Number of channels (>= 1).
    pub channels: i32,
    /// Bytes per channel sample.
    pub type_byte_size: i32,
    /// Bytes spanned by one pixel within a row of plane 0.
    pub pixel_offset: i32,
    /// Storage layout family.
    pub layout: PixelLayout,
}

/// Returns the layout metadata for `format`.
///
/// Total over the closed [`ImageFormat`] enumeration; the table is immutable
/// and evaluated at compile time.
pub const fn format_info(format: ImageFormat) -> FormatInfo {
    use ImageFormat::*;
    use PixelLayout::*;

    const fn info(channels: i32, type_byte_size: i32, pixel_offset: i32, layout: PixelLayout) -> FormatInfo {
        FormatInfo {
            channels,
            type_byte_size,
            pixel_offset,
            layout,
        }
    }

    match format {
        GrayU8 => info(1, 1, 1, Packed),
        GrayU16 => info(1, 2, 2, Packed),
        GrayS32 => info(1, 4, 4, Packed),
        GrayF32 => info(1, 4, 4, Packed),
        GrayF64 => info(1, 8, 8, Packed),
        PlaBgrU8 | PlaRgbU8 => info(3, 1, 1, Planar),
        PkgBgrU8 | PkgRgbU8 => info(3, 1, 3, Packed),
        PlaBgraU8 | PlaRgbaU8 => info(4, 1, 1, Planar),
        PkgBgraU8 | PkgRgbaU8 => info(4, 1, 4, Packed),
        PlaBgrF32 | PlaRgbF32 => info(3, 4, 4, Planar),
        PkgBgrF32 | PkgRgbF32 => info(3, 4, 12, Packed),
        PlaBgraF32 | PlaRgbaF32 => info(4, 4, 4, Planar),
        PkgBgraF32 | PkgRgbaF32 => info(4, 4, 16, Packed),
        PkgBgrF64 | PkgRgbF64 => info(3, 8, 24, Packed),
        PkgBgraF64 | PkgRgbaF64 => info(4, 8, 32, Packed),
        // Three channels share one 16-bit word.
        PkgBgr565U8 | PkgRgb565U8 => info(3, 2, 2, Packed),
        Nv12 | Nv21 => info(3, 1, 1, YuvSemiPlanar),
        I420 => info(3, 1, 1, YuvPlanar),
    }
}

/// All supported formats, in discriminant order.
///
/// Handy for exhaustive property tests and for enumerating the boundary
/// mapping.
pub const ALL_FORMATS: [ImageFormat; 30] = {
    use ImageFormat::*;
    [
        GrayU8, GrayU16, GrayS32, GrayF32, GrayF64, PlaBgrU8, PlaRgbU8, PkgBgrU8, PkgRgbU8,
        PlaBgraU8, PlaRgbaU8, PkgBgraU8, PkgRgbaU8, PlaBgrF32, PlaRgbF32, PkgBgrF32, PkgRgbF32,
        PlaBgraF32, PlaRgbaF32, PkgBgraF32, PkgRgbaF32, PkgBgrF64, PkgRgbF64, PkgBgraF64,
        PkgRgbaF64, PkgBgr565U8, PkgRgb565U8, Nv12, Nv21, I420,
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_total_and_sane() {
        for format in ALL_FORMATS {
            let info = format_info(format);
            assert!(info.channels >= 1, "{format:?}");
            assert!(info.type_byte_size >= 1, "{format:?}");
            assert!(info.pixel_offset >= 1, "{format:?}");
            assert_eq!(format.is_yuv(), info.layout.is_yuv(), "{format:?}");
        }
    }

    #[test]
    fn test_packed_pixel_offset_covers_channels() {
        // For byte-addressable packed formats one pixel spans all channels.
        let info = format_info(ImageFormat::PkgRgbaF32);
        assert_eq!(info.pixel_offset, info.channels * info.type_byte_size);
    }

    #[test]
    fn test_565_shares_two_bytes() {
        let info = format_info(ImageFormat::PkgRgb565U8);
        assert_eq!(info.channels, 3);
        assert_eq!(info.pixel_offset, 2);
    }

    #[test]
    fn test_discriminants_stable() {
        assert_eq!(ImageFormat::GrayU8 as i32, 0);
        assert_eq!(ImageFormat::PkgRgb565U8 as i32, 26);
        assert_eq!(ImageFormat::I420 as i32, 29);
    }
}
