//! # rcv-interop
//!
//! ABI-stable image buffer records for crossing module and language
//! boundaries.
//!
//! [`CImageBuffer`] is a flat, `#[repr(C)]` mirror of
//! [`rcv_core::ImageBuffer`]: a separately heap-allocated record with an
//! explicit create/release lifecycle instead of language-managed ownership.
//! Consumers on the far side of a boundary rely on its exact field order and
//! widths, so the struct layout is part of the contract.
//!
//! # Lifecycle
//!
//! Every record comes from [`create`] (or [`from_image`]) and must be handed
//! to [`release`] exactly once. `release` frees the pixel memory first, then
//! the record itself. Internal callers should prefer the scoped
//! [`InteropGuard`], which releases deterministically on every exit path.
//!
//! # Format codes
//!
//! Boundary format identifiers ([`CImageFormat`]) are a closed `#[repr(i32)]`
//! enumeration mapped totally and injectively onto [`ImageFormat`]. Raw codes
//! arriving from outside are looked up with [`CImageFormat::from_code`];
//! anything unmapped is an [`Error::UnsupportedFormat`].
//!
//! # Example
//!
//! ```rust
//! use rcv_interop::{CImageFormat, InteropGuard};
//!
//! let guard = InteropGuard::create(16, 8, CImageFormat::PkgBgrU8).unwrap();
//! assert_eq!(guard.record().stride, 48);
//! // released when the guard drops
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::alloc::{alloc_zeroed, dealloc, Layout as AllocLayout};
use std::ffi::{c_int, c_void};

use rcv_core::{format_info, Error, ImageBuffer, ImageFormat, Layout, LayoutPolicy, Result};
use tracing::error;

mod guard;

pub use guard::InteropGuard;

/// Boundary-side pixel format identifier.
///
/// Codes are stable and identical to the discriminants of
/// [`rcv_core::ImageFormat`]; the two identifier spaces are kept separate so
/// that raw integers from across the boundary are validated before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
#[allow(missing_docs)] // mirror of ImageFormat; see that enum for per-variant docs
pub enum CImageFormat {
    GrayU8 = 0,
    GrayU16 = 1,
    GrayS32 = 2,
    GrayF32 = 3,
    GrayF64 = 4,
    PlaBgrU8 = 5,
    PlaRgbU8 = 6,
    PkgBgrU8 = 7,
    PkgRgbU8 = 8,
    PlaBgraU8 = 9,
    PlaRgbaU8 = 10,
    PkgBgraU8 = 11,
    PkgRgbaU8 = 12,
    PlaBgrF32 = 13,
    PlaRgbF32 = 14,
    PkgBgrF32 = 15,
    PkgRgbF32 = 16,
    PlaBgraF32 = 17,
    PlaRgbaF32 = 18,
    PkgBgraF32 = 19,
    PkgRgbaF32 = 20,
    PkgBgrF64 = 21,
    PkgRgbF64 = 22,
    PkgBgraF64 = 23,
    PkgRgbaF64 = 24,
    PkgBgr565U8 = 25,
    PkgRgb565U8 = 26,
    Nv12 = 27,
    Nv21 = 28,
    I420 = 29,
}

impl CImageFormat {
    /// Validates a raw boundary code.
    ///
    /// Returns `None` for any integer outside the supported identifier set.
    pub fn from_code(code: i32) -> Option<CImageFormat> {
        use CImageFormat::*;
        Some(match code {
            0 => GrayU8,
            1 => GrayU16,
            2 => GrayS32,
            3 => GrayF32,
            4 => GrayF64,
            5 => PlaBgrU8,
            6 => PlaRgbU8,
            7 => PkgBgrU8,
            8 => PkgRgbU8,
            9 => PlaBgraU8,
            10 => PlaRgbaU8,
            11 => PkgBgraU8,
            12 => PkgRgbaU8,
            13 => PlaBgrF32,
            14 => PlaRgbF32,
            15 => PkgBgrF32,
            16 => PkgRgbF32,
            17 => PlaBgraF32,
            18 => PlaRgbaF32,
            19 => PkgBgraF32,
            20 => PkgRgbaF32,
            21 => PkgBgrF64,
            22 => PkgRgbF64,
            23 => PkgBgraF64,
            24 => PkgRgbaF64,
            25 => PkgBgr565U8,
            26 => PkgRgb565U8,
            27 => Nv12,
            28 => Nv21,
            29 => I420,
            _ => return None,
        })
    }

    /// The raw code carried in a [`CImageBuffer`].
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ImageFormat> for CImageFormat {
    fn from(value: ImageFormat) -> CImageFormat {
        // Total: every internal format has a boundary code.
        CImageFormat::from_code(value as i32).expect("boundary code for internal format")
    }
}

impl From<CImageFormat> for ImageFormat {
    fn from(value: CImageFormat) -> ImageFormat {
        use CImageFormat as C;
        use ImageFormat as F;
        match value {
            C::GrayU8 => F::GrayU8,
            C::GrayU16 => F::GrayU16,
            C::GrayS32 => F::GrayS32,
            C::GrayF32 => F::GrayF32,
            C::GrayF64 => F::GrayF64,
            C::PlaBgrU8 => F::PlaBgrU8,
            C::PlaRgbU8 => F::PlaRgbU8,
            C::PkgBgrU8 => F::PkgBgrU8,
            C::PkgRgbU8 => F::PkgRgbU8,
            C::PlaBgraU8 => F::PlaBgraU8,
            C::PlaRgbaU8 => F::PlaRgbaU8,
            C::PkgBgraU8 => F::PkgBgraU8,
            C::PkgRgbaU8 => F::PkgRgbaU8,
            C::PlaBgrF32 => F::PlaBgrF32,
            C::PlaRgbF32 => F::PlaRgbF32,
            C::PkgBgrF32 => F::PkgBgrF32,
            C::PkgRgbF32 => F::PkgRgbF32,
            C::PlaBgraF32 => F::PlaBgraF32,
            C::PlaRgbaF32 => F::PlaRgbaF32,
            C::PkgBgraF32 => F::PkgBgraF32,
            C::PkgRgbaF32 => F::PkgRgbaF32,
            C::PkgBgrF64 => F::PkgBgrF64,
            C::PkgRgbF64 => F::PkgRgbF64,
            C::PkgBgraF64 => F::PkgBgraF64,
            C::PkgRgbaF64 => F::PkgRgbaF64,
            C::PkgBgr565U8 => F::PkgBgr565U8,
            C::PkgRgb565U8 => F::PkgRgb565U8,
            C::Nv12 => F::Nv12,
            C::Nv21 => F::Nv21,
            C::I420 => F::I420,
        }
    }
}

/// Flat boundary mirror of an image buffer.
///
/// Binary compatibility contract: consumers relying on in-memory layout must
/// preserve this field order and these widths. `format` carries a raw
/// [`CImageFormat`] code so that unvalidated values can be represented.
#[repr(C)]
#[derive(Debug)]
pub struct CImageBuffer {
    /// Width in pixels.
    pub width: c_int,
    /// Height in pixels.
    pub height: c_int,
    /// Bytes per plane-0 row.
    pub stride: c_int,
    /// Channels per pixel.
    pub channels: c_int,
    /// Bytes per channel sample.
    pub type_byte_size: c_int,
    /// Total byte size of `data`.
    pub total_byte_size: u64,
    /// Raw boundary format code; see [`CImageFormat`].
    pub format: c_int,
    /// Pixel memory, owned by the record until [`release`].
    pub data: *mut c_void,
}

#[inline]
fn byte_layout(size: u64) -> Option<AllocLayout> {
    AllocLayout::from_size_align(size as usize, 1).ok()
}

/// Allocates a new boundary record and its backing pixel memory.
///
/// Returns null when the extent is non-positive or either allocation fails.
/// A non-null result must be handed to [`release`] exactly once.
pub fn create(width: i32, height: i32, format: CImageFormat) -> *mut CImageBuffer {
    create_record(width, height, format, None)
}

/// Record allocation shared by [`create`] (tight rows) and [`from_image`]
/// (rows at the source's pitch).
fn create_record(
    width: i32,
    height: i32,
    format: CImageFormat,
    stride: Option<i32>,
) -> *mut CImageBuffer {
    if width <= 0 || height <= 0 {
        error!(width, height, "refusing to create record with non-positive extent");
        return std::ptr::null_mut();
    }

    let internal: ImageFormat = format.into();
    let info = format_info(internal);
    let layout = match stride {
        Some(s) => Layout::with_stride(&info, width, height, s),
        None => Layout::compute(&info, width, height, LayoutPolicy::default()),
    };

    let Some(mem_layout) = byte_layout(layout.total_byte_size) else {
        error!(size = layout.total_byte_size, "record byte size overflows");
        return std::ptr::null_mut();
    };
    // Zeroed, so a fresh record never leaks heap contents across a boundary.
    let data = unsafe { alloc_zeroed(mem_layout) };
    if data.is_null() {
        error!(size = layout.total_byte_size, "failed to allocate record memory");
        return std::ptr::null_mut();
    }

    Box::into_raw(Box::new(CImageBuffer {
        width,
        height,
        stride: layout.stride,
        channels: info.channels,
        type_byte_size: info.type_byte_size,
        total_byte_size: layout.total_byte_size,
        format: format.code(),
        data: data as *mut c_void,
    }))
}

/// Releases a record created by [`create`] or [`from_image`].
///
/// Frees the pixel memory (if any), then the record itself. A null input
/// reports [`Error::NullRecord`] and performs no memory operations.
///
/// # Safety
///
/// `record` must be null or a pointer previously returned by [`create`] /
/// [`from_image`] that has not been released yet. After this call returns
/// `Ok`, the record is gone and the pointer must not be used again.
pub unsafe fn release(record: *mut CImageBuffer) -> Result<()> {
    if record.is_null() {
        error!("release of null record");
        return Err(Error::NullRecord);
    }

    unsafe {
        if !(*record).data.is_null() {
            if let Some(mem_layout) = byte_layout((*record).total_byte_size) {
                dealloc((*record).data as *mut u8, mem_layout);
            }
            (*record).data = std::ptr::null_mut();
        }
        drop(Box::from_raw(record));
    }
    Ok(())
}

/// Defensive validity check for externally supplied records.
///
/// A record is valid iff `data` is non-null and width, height, stride, and
/// total byte size are all strictly positive. Null records are invalid.
///
/// # Safety
///
/// `record` must be null or point to a readable `CImageBuffer`.
pub unsafe fn validate(record: *const CImageBuffer) -> bool {
    if record.is_null() {
        return false;
    }
    let rec = unsafe { &*record };
    !rec.data.is_null()
        && rec.width > 0
        && rec.height > 0
        && rec.stride > 0
        && rec.total_byte_size > 0
}

/// Builds a non-owning internal view over a boundary record's memory.
///
/// No pixel data is copied; the view aliases the record and is only valid
/// while the record stays alive and unreleased.
///
/// # Errors
///
/// [`Error::NullRecord`] for a null record, [`Error::UnsupportedFormat`] for
/// a format code with no internal counterpart.
///
/// # Safety
///
/// `record` must be null or point to a `CImageBuffer` whose `data` and
/// `total_byte_size` describe memory valid for the view's lifetime.
pub unsafe fn to_image(record: *const CImageBuffer) -> Result<ImageBuffer> {
    if record.is_null() {
        error!("conversion from null record");
        return Err(Error::NullRecord);
    }
    let rec = unsafe { &*record };

    let Some(format) = CImageFormat::from_code(rec.format) else {
        error!(code = rec.format, "record format has no internal counterpart");
        return Err(Error::UnsupportedFormat { code: rec.format });
    };

    Ok(unsafe {
        ImageBuffer::from_raw(
            rec.width,
            rec.height,
            format.into(),
            rec.data as *mut u8,
            rec.stride,
        )
    })
}

/// Exports an internal buffer as a freshly allocated boundary record.
///
/// The record is sized at the source's actual row stride (padded or
/// caller-supplied pitches included) and the full byte range is deep-copied,
/// so the record and the source share nothing afterwards and every row lands
/// at the same offset it had in the source.
///
/// # Errors
///
/// [`Error::EmptyBuffer`] for an empty source, [`Error::AllocationFailed`]
/// when the record cannot be allocated.
pub fn from_image(src: &ImageBuffer) -> Result<*mut CImageBuffer> {
    let Some(src_bytes) = src.bytes() else {
        error!("export of empty buffer");
        return Err(Error::EmptyBuffer);
    };

    let record = create_record(
        src.width(),
        src.height(),
        src.format().into(),
        Some(src.stride()),
    );
    if record.is_null() {
        return Err(Error::allocation_failed(
            src.total_byte_size(),
            "boundary record allocation failed",
        ));
    }

    unsafe {
        // Identical stride means identical layout, so the byte sizes agree.
        debug_assert_eq!((*record).total_byte_size as usize, src_bytes.len());
        std::ptr::copy_nonoverlapping(src_bytes.as_ptr(), (*record).data as *mut u8, src_bytes.len());
    }
    Ok(record)
}
