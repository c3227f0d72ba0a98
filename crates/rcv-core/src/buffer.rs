//! The image buffer: pixel memory plus its layout.
//!
//! [`ImageBuffer`] is the principal entity of this crate. It either owns its
//! backing memory (through a boxed [`PlatformMemory`] whose lifetime governs
//! the block) or merely references caller-supplied memory as a view. Shape
//! and format are fixed at construction; only pixel contents mutate.
//!
//! # Failure convention
//!
//! Allocating constructors never panic and never return `Result`: on any
//! failure they log a diagnostic and yield a buffer for which
//! [`is_empty`](ImageBuffer::is_empty) is `true`. Callers are expected to
//! check emptiness after every allocating construction, the same way they
//! check the `Option` returned by [`pixel_address`](ImageBuffer::pixel_address).
//!
//! # Addressing
//!
//! Packed formats address as `y * stride + x * pixel_offset +
//! c * channel_offset`. The subsampled YUV formats use plane arithmetic that
//! is part of the interchange contract of this format family and is
//! reproduced here exactly; see [`ImageBuffer::pixel_address`].

use crate::alloc::{self, PlatformMemory, PlatformType};
use crate::error::{Error, Result};
use crate::format::{format_info, ImageFormat};
use crate::layout::{Layout, LayoutPolicy};
use tracing::error;

enum DataRef {
    None,
    Owned {
        // Kept alive for the block; the cached pointer stays valid because
        // the block itself never moves when the box does.
        _mem: Box<dyn PlatformMemory>,
        ptr: *mut u8,
    },
    Borrowed {
        ptr: *mut u8,
    },
}

impl DataRef {
    #[inline]
    fn ptr(&self) -> *mut u8 {
        match self {
            DataRef::None => std::ptr::null_mut(),
            DataRef::Owned { ptr, .. } | DataRef::Borrowed { ptr } => *ptr,
        }
    }
}

/// Image buffer with fixed shape, format, and platform.
///
/// Not `Send`/`Sync`: a buffer has a single logical owner and concurrent use
/// requires external synchronization.
pub struct ImageBuffer {
    width: i32,
    height: i32,
    stride: i32,
    format: ImageFormat,
    platform: PlatformType,
    channels: i32,
    type_byte_size: i32,
    pixel_offset: i32,
    channel_offset: i64,
    total_byte_size: u64,
    data: DataRef,
}

impl ImageBuffer {
    /// Builds the descriptor part (no data) for the given shape.
    fn describe(
        width: i32,
        height: i32,
        format: ImageFormat,
        platform: PlatformType,
        stride: Option<i32>,
    ) -> ImageBuffer {
        let info = format_info(format);
        // The layout calculator is only defined for positive extents; a
        // degenerate shape gets a zero layout and stays empty.
        let layout = if width > 0 && height > 0 {
            match stride {
                Some(s) => Layout::with_stride(&info, width, height, s),
                None => Layout::compute(&info, width, height, LayoutPolicy::default()),
            }
        } else {
            Layout {
                channel_offset: 0,
                stride: stride.unwrap_or(0).max(0),
                total_byte_size: 0,
            }
        };
        ImageBuffer {
            width,
            height,
            stride: layout.stride,
            format,
            platform,
            channels: info.channels,
            type_byte_size: info.type_byte_size,
            pixel_offset: info.pixel_offset,
            channel_offset: layout.channel_offset,
            total_byte_size: layout.total_byte_size,
            data: DataRef::None,
        }
    }

    fn owning(
        width: i32,
        height: i32,
        format: ImageFormat,
        platform: PlatformType,
        stride: Option<i32>,
    ) -> ImageBuffer {
        let mut buf = Self::describe(width, height, format, platform, stride);
        if width <= 0 || height <= 0 {
            error!(width, height, "refusing to allocate non-positive extent");
            return buf;
        }
        match alloc::allocate(platform, buf.total_byte_size) {
            Some(mut mem) => {
                let ptr = mem.as_mut_ptr();
                buf.data = DataRef::Owned { _mem: mem, ptr };
            }
            None => {
                error!(
                    width,
                    height,
                    format = ?format,
                    platform = platform.name(),
                    "failed to allocate image buffer"
                );
            }
        }
        buf
    }

    /// Creates an owning buffer on the CPU.
    ///
    /// On allocation failure the returned buffer is empty; check
    /// [`is_empty`](Self::is_empty).
    ///
    /// # Example
    ///
    /// ```rust
    /// use rcv_core::{ImageBuffer, ImageFormat};
    ///
    /// let buf = ImageBuffer::new(64, 48, ImageFormat::PkgBgrU8);
    /// assert!(!buf.is_empty());
    /// assert_eq!(buf.stride(), 64 * 3);
    /// ```
    pub fn new(width: i32, height: i32, format: ImageFormat) -> ImageBuffer {
        Self::owning(width, height, format, PlatformType::Cpu, None)
    }

    /// Creates an owning buffer on the given execution target.
    ///
    /// Unwired platforms fail allocation cleanly and yield an empty buffer.
    pub fn with_platform(
        width: i32,
        height: i32,
        format: ImageFormat,
        platform: PlatformType,
    ) -> ImageBuffer {
        Self::owning(width, height, format, platform, None)
    }

    /// Creates an owning CPU buffer that adopts `data` as its contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the extent is non-positive or
    /// `data.len()` differs from the computed total byte size.
    pub fn from_vec(
        width: i32,
        height: i32,
        format: ImageFormat,
        data: Vec<u8>,
    ) -> Result<ImageBuffer> {
        if width <= 0 || height <= 0 {
            error!(width, height, "non-positive extent");
            return Err(Error::invalid_argument(format!(
                "non-positive extent {width}x{height}"
            )));
        }
        let mut buf = Self::describe(width, height, format, PlatformType::Cpu, None);
        if data.len() as u64 != buf.total_byte_size {
            error!(
                got = data.len(),
                expected = buf.total_byte_size,
                "byte length does not match layout"
            );
            return Err(Error::invalid_argument(format!(
                "expected {} bytes, got {}",
                buf.total_byte_size,
                data.len()
            )));
        }
        let mut mem = alloc::adopt_vec(data);
        let ptr = mem.as_mut_ptr();
        buf.data = DataRef::Owned { _mem: mem, ptr };
        Ok(buf)
    }

    /// Wraps caller-owned memory as a non-owning view.
    ///
    /// No allocation takes place and the view never frees `data`. A stride
    /// of 0 or less derives the tight stride for `format` at `width`.
    ///
    /// # Safety
    ///
    /// `data` must be valid for reads and writes of the buffer's total byte
    /// size (see [`total_byte_size`](Self::total_byte_size)) for the view's
    /// whole lifetime, and nothing else may free it meanwhile. A null `data`
    /// is permitted and produces an empty view.
    pub unsafe fn from_raw(
        width: i32,
        height: i32,
        format: ImageFormat,
        data: *mut u8,
        stride: i32,
    ) -> ImageBuffer {
        let stride = if stride > 0 { Some(stride) } else { None };
        let mut buf = Self::describe(width, height, format, PlatformType::Cpu, stride);
        buf.data = DataRef::Borrowed { ptr: data };
        buf
    }

    /// Returns the buffer width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Returns the buffer height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Returns the byte stride of one plane-0 row.
    #[inline]
    pub fn stride(&self) -> i32 {
        self.stride
    }

    /// Returns the pixel format.
    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the execution target this buffer was allocated for.
    #[inline]
    pub fn platform(&self) -> PlatformType {
        self.platform
    }

    /// Returns the bytes per channel sample.
    #[inline]
    pub fn type_byte_size(&self) -> i32 {
        self.type_byte_size
    }

    /// Returns the total byte size of the backing memory.
    #[inline]
    pub fn total_byte_size(&self) -> u64 {
        self.total_byte_size
    }

    /// Returns the raw data pointer (null when empty).
    #[inline]
    pub fn data(&self) -> *mut u8 {
        self.data.ptr()
    }

    /// Returns `true` if the buffer has no data or zero extent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.ptr().is_null() || self.width <= 0 || self.height <= 0
    }

    /// Returns the whole backing memory as a byte slice, or `None` if empty.
    #[inline]
    pub fn bytes(&self) -> Option<&[u8]> {
        if self.is_empty() {
            return None;
        }
        // Pointer and length were fixed at construction.
        Some(unsafe { std::slice::from_raw_parts(self.data.ptr(), self.total_byte_size as usize) })
    }

    /// Returns the whole backing memory as a mutable byte slice, or `None`
    /// if empty.
    #[inline]
    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        if self.is_empty() {
            return None;
        }
        Some(unsafe {
            std::slice::from_raw_parts_mut(self.data.ptr(), self.total_byte_size as usize)
        })
    }

    /// Resolves the address of channel `c` of the pixel at (`x`, `y`).
    ///
    /// Out-of-range coordinates log a diagnostic and return `None`; this is
    /// non-fatal.
    ///
    /// Packed formats resolve as `data + y*stride + x*pixel_offset +
    /// c*channel_offset`. YUV formats follow the plane-packing convention of
    /// this format family:
    ///
    /// - luma (c = 0): `data + y*stride + x`
    /// - NV12/NV21 chroma, interleaved byte-adjacent in one half-height
    ///   plane at `data + height*stride`: `(y>>1)*stride + ((x>>1)<<1)` for
    ///   c = 1 and `(y>>1)*stride + (x|1)` for c = 2
    /// - I420 chroma, two planes after the luma extent:
    ///   c = 1 at `data + height*stride + ((y*stride)>>2) + (x>>1)`,
    ///   c = 2 at `data + height*stride + (height>>1)*(stride>>1) +
    ///   (y>>1)*(stride>>1) + (x>>1)`
    pub fn pixel_address(&self, x: i32, y: i32, c: i32) -> Option<*mut u8> {
        self.try_pixel_address(x, y, c).ok()
    }

    /// Like [`pixel_address`](Self::pixel_address), but reports which check
    /// failed instead of collapsing the failure into `None`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] for coordinates outside the extent,
    /// [`Error::EmptyBuffer`] for a buffer with no data.
    pub fn try_pixel_address(&self, x: i32, y: i32, c: i32) -> Result<*mut u8> {
        if x < 0 || y < 0 || c < 0 || x >= self.width || y >= self.height || c >= self.channels {
            error!(x, y, c, "pixel coordinate out of range");
            return Err(Error::out_of_bounds(
                x,
                y,
                c,
                self.width,
                self.height,
                self.channels,
            ));
        }

        let data = self.data.ptr();
        if data.is_null() {
            error!("pixel address on empty buffer");
            return Err(Error::EmptyBuffer);
        }

        let stride = self.stride as i64;
        let (x, y, c) = (x as i64, y as i64, c as i64);
        let height = self.height as i64;

        let offset = if self.channel_offset >= 0 {
            y * stride + x * self.pixel_offset as i64 + c * self.channel_offset
        } else {
            match (c, self.format) {
                (0, _) => y * stride + x,
                (1, ImageFormat::Nv12 | ImageFormat::Nv21) => {
                    height * stride + (y >> 1) * stride + ((x >> 1) << 1)
                }
                (2, ImageFormat::Nv12 | ImageFormat::Nv21) => {
                    height * stride + (y >> 1) * stride + (x | 1)
                }
                (1, ImageFormat::I420) => height * stride + ((y * stride) >> 2) + (x >> 1),
                (2, ImageFormat::I420) => {
                    height * stride
                        + (height >> 1) * (stride >> 1)
                        + (y >> 1) * (stride >> 1)
                        + (x >> 1)
                }
                _ => unreachable!("channel bounds already checked"),
            }
        };

        Ok(data.wrapping_add(offset as usize))
    }
}

impl Default for ImageBuffer {
    /// An empty 0x0 GRAY_U8 CPU buffer.
    fn default() -> Self {
        Self::describe(0, 0, ImageFormat::GrayU8, PlatformType::Cpu, None)
    }
}

impl Clone for ImageBuffer {
    /// Deep copy into a freshly owning buffer of identical shape, format,
    /// and platform. Never shares backing memory with the source.
    ///
    /// Cloning an empty buffer yields an empty buffer; if allocation fails
    /// the clone is empty as well (and the failure is logged).
    fn clone(&self) -> Self {
        if self.is_empty() {
            return Self::describe(
                self.width,
                self.height,
                self.format,
                self.platform,
                Some(self.stride),
            );
        }
        let mut copy = Self::owning(
            self.width,
            self.height,
            self.format,
            self.platform,
            Some(self.stride),
        );
        if let (Some(src), Some(dst)) = (self.bytes(), copy.bytes_mut()) {
            dst.copy_from_slice(src);
        }
        copy
    }
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("platform", &self.platform.name())
            .field("total_byte_size", &self.total_byte_size)
            .field("empty", &self.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_owning_buffer() {
        let buf = ImageBuffer::new(8, 4, ImageFormat::PkgRgbU8);
        assert!(!buf.is_empty());
        assert_eq!(buf.width(), 8);
        assert_eq!(buf.height(), 4);
        assert_eq!(buf.channels(), 3);
        assert_eq!(buf.stride(), 24);
        assert_eq!(buf.total_byte_size(), 96);
        assert!(buf.bytes().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_default_is_empty() {
        let buf = ImageBuffer::default();
        assert!(buf.is_empty());
        assert!(buf.data().is_null());
        assert!(buf.bytes().is_none());
    }

    #[test]
    fn test_unwired_platform_yields_empty() {
        let buf = ImageBuffer::with_platform(8, 8, ImageFormat::GrayU8, PlatformType::Cuda);
        assert!(buf.is_empty());
        assert_eq!(buf.width(), 8);
    }

    #[test]
    fn test_non_positive_extent_yields_empty() {
        assert!(ImageBuffer::new(0, 4, ImageFormat::GrayU8).is_empty());
        assert!(ImageBuffer::new(4, -1, ImageFormat::GrayU8).is_empty());
        assert!(ImageBuffer::new(-3, -7, ImageFormat::Nv12).is_empty());

        let buf = ImageBuffer::new(4, -1, ImageFormat::GrayU8);
        assert_eq!(buf.total_byte_size(), 0);
        assert!(buf.bytes().is_none());
    }

    #[test]
    fn test_view_with_non_positive_extent_is_empty() {
        let mut backing = [0u8; 16];
        let view = unsafe {
            ImageBuffer::from_raw(-4, 4, ImageFormat::GrayU8, backing.as_mut_ptr(), 0)
        };
        assert!(view.is_empty());
        assert_eq!(view.total_byte_size(), 0);
    }

    #[test]
    fn test_from_vec_exact_length() {
        let buf = ImageBuffer::from_vec(4, 2, ImageFormat::GrayU16, vec![1u8; 16]).unwrap();
        assert!(!buf.is_empty());
        assert_eq!(buf.bytes().unwrap(), &[1u8; 16][..]);

        let err = ImageBuffer::from_vec(4, 2, ImageFormat::GrayU16, vec![0u8; 15]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_clone_is_deep() {
        let src = ImageBuffer::from_vec(4, 4, ImageFormat::GrayU8, (0u8..16).collect()).unwrap();
        let mut copy = src.clone();
        assert_eq!(src.bytes(), copy.bytes());
        assert_ne!(src.data(), copy.data());

        copy.bytes_mut().unwrap()[0] = 0xFF;
        assert_eq!(src.bytes().unwrap()[0], 0);
    }

    #[test]
    fn test_view_does_not_own() {
        let mut backing = vec![7u8; 6 * 4];
        {
            let view =
                unsafe { ImageBuffer::from_raw(6, 4, ImageFormat::GrayU8, backing.as_mut_ptr(), 0) };
            assert!(!view.is_empty());
            assert_eq!(view.stride(), 6);
            assert_eq!(view.total_byte_size(), 24);
        }
        // Still alive and untouched after the view dropped.
        assert!(backing.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_pixel_address_bounds() {
        let buf = ImageBuffer::new(4, 4, ImageFormat::PkgBgrU8);
        assert!(buf.pixel_address(-1, 0, 0).is_none());
        assert!(buf.pixel_address(0, -1, 0).is_none());
        assert!(buf.pixel_address(0, 0, -1).is_none());
        assert!(buf.pixel_address(4, 0, 0).is_none());
        assert!(buf.pixel_address(0, 4, 0).is_none());
        assert!(buf.pixel_address(0, 0, 3).is_none());
        assert!(buf.pixel_address(3, 3, 2).is_some());
    }

    #[test]
    fn test_try_pixel_address_reports_failure_kind() {
        let buf = ImageBuffer::new(4, 4, ImageFormat::PkgBgrU8);
        let err = buf.try_pixel_address(4, 0, 0).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { x: 4, width: 4, .. }));
        assert!(err.is_invalid_input());

        let empty = ImageBuffer::default();
        assert!(matches!(
            empty.try_pixel_address(0, 0, 0),
            Err(Error::OutOfBounds { .. })
        ));

        // In range for the descriptor, but no data behind it.
        let hollow = ImageBuffer::with_platform(4, 4, ImageFormat::GrayU8, PlatformType::Cuda);
        assert!(matches!(
            hollow.try_pixel_address(1, 1, 0),
            Err(Error::EmptyBuffer)
        ));
    }

    #[test]
    fn test_pixel_address_packed_formula() {
        let buf = ImageBuffer::new(5, 5, ImageFormat::PkgBgrF32);
        let base = buf.data();
        for (x, y, c) in [(0, 0, 0), (1, 0, 2), (4, 3, 1)] {
            let want = base.wrapping_add((y * buf.stride() as usize) + x * 12 + c * 4);
            assert_eq!(buf.pixel_address(x as i32, y as i32, c as i32), Some(want));
        }
    }

    #[test]
    fn test_pixel_address_planar() {
        let buf = ImageBuffer::new(4, 2, ImageFormat::PlaRgbU8);
        let base = buf.data();
        let plane = (buf.stride() * buf.height()) as usize;
        assert_eq!(buf.pixel_address(1, 1, 0), Some(base.wrapping_add(5)));
        assert_eq!(buf.pixel_address(1, 1, 2), Some(base.wrapping_add(2 * plane + 5)));
    }

    #[test]
    fn test_pixel_address_nv12() {
        let buf = ImageBuffer::new(4, 4, ImageFormat::Nv12);
        let base = buf.data();
        let stride = buf.stride() as usize;
        assert_eq!(buf.pixel_address(3, 2, 0), Some(base.wrapping_add(2 * stride + 3)));
        // Chroma plane starts after the luma extent; U/V interleave within it.
        let chroma = 4 * stride;
        assert_eq!(buf.pixel_address(0, 0, 1), Some(base.wrapping_add(chroma)));
        assert_eq!(buf.pixel_address(0, 0, 2), Some(base.wrapping_add(chroma + 1)));
        assert_eq!(buf.pixel_address(2, 2, 1), Some(base.wrapping_add(chroma + stride + 2)));
        assert_eq!(buf.pixel_address(3, 3, 2), Some(base.wrapping_add(chroma + stride + 3)));
    }

    #[test]
    fn test_pixel_address_i420_plane_bases() {
        let buf = ImageBuffer::new(4, 4, ImageFormat::I420);
        let base = buf.data();
        let stride = buf.stride() as usize;
        let u_plane = 4 * stride;
        assert_eq!(buf.pixel_address(0, 0, 1), Some(base.wrapping_add(u_plane)));
        let v_plane = u_plane + 2 * (stride >> 1);
        assert_eq!(buf.pixel_address(0, 0, 2), Some(base.wrapping_add(v_plane)));
        assert_eq!(
            buf.pixel_address(2, 2, 1),
            Some(base.wrapping_add(u_plane + ((2 * stride) >> 2) + 1))
        );
    }

    #[test]
    fn test_yuv_addresses_stay_in_allocation() {
        for format in [ImageFormat::Nv12, ImageFormat::Nv21, ImageFormat::I420] {
            let buf = ImageBuffer::new(6, 6, format);
            let base = buf.data() as usize;
            let end = base + buf.total_byte_size() as usize;
            for y in 0..6 {
                for x in 0..6 {
                    for c in 0..3 {
                        let addr = buf.pixel_address(x, y, c).unwrap() as usize;
                        assert!(addr >= base && addr < end, "{format:?} ({x},{y},{c})");
                    }
                }
            }
        }
    }
}
