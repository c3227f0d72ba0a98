//! Error types for image buffer operations.
//!
//! This module provides the unified error enum shared by the buffer core,
//! the interop bridge, and the geometric transform kernels.
//!
//! # Overview
//!
//! Every detected invalid condition in this workspace maps onto one of a
//! small set of categories:
//!
//! - **Invalid input**: [`OutOfBounds`](Error::OutOfBounds),
//!   [`ShapeMismatch`](Error::ShapeMismatch),
//!   [`FormatMismatch`](Error::FormatMismatch),
//!   [`InvalidArgument`](Error::InvalidArgument)
//! - **Unsupported format**: [`UnsupportedFormat`](Error::UnsupportedFormat)
//! - **Allocation failure**: [`AllocationFailed`](Error::AllocationFailed)
//! - **Empty buffer**: [`EmptyBuffer`](Error::EmptyBuffer)
//! - **Null interop record**: [`NullRecord`](Error::NullRecord)
//!
//! None of these ever escalate to a panic in library code; they are returned
//! to the caller and logged at the point of detection.
//!
//! # Dependencies
//!
//! - [`thiserror`] - derive macro for `std::error::Error` / `Display`
//!
//! # Used By
//!
//! - `rcv-core` - buffer construction and pixel addressing
//! - `rcv-interop` - boundary record lifecycle
//! - `rcv-transform` - destination validation and dispatch

use crate::format::ImageFormat;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in buffer, bridge, and transform operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates or channel index outside the buffer extent.
    #[error(
        "pixel ({x}, {y}, {c}) out of range for {width}x{height} buffer with {channels} channels"
    )]
    OutOfBounds {
        /// X coordinate that was accessed.
        x: i32,
        /// Y coordinate that was accessed.
        y: i32,
        /// Channel index that was accessed.
        c: i32,
        /// Buffer width.
        width: i32,
        /// Buffer height.
        height: i32,
        /// Buffer channel count.
        channels: i32,
    },

    /// Destination buffer dimensions do not match the expected shape.
    #[error("destination shape {got_w}x{got_h} does not match expected {want_w}x{want_h}")]
    ShapeMismatch {
        /// Expected width.
        want_w: i32,
        /// Expected height.
        want_h: i32,
        /// Actual width.
        got_w: i32,
        /// Actual height.
        got_h: i32,
    },

    /// Source and destination pixel formats differ where they must agree.
    #[error("format mismatch: expected {expected:?}, got {got:?}")]
    FormatMismatch {
        /// Expected format.
        expected: ImageFormat,
        /// Actual format.
        got: ImageFormat,
    },

    /// A parameter value outside its supported domain (rotation angle,
    /// odd YUV dimensions, non-positive extent).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A boundary format code with no internal counterpart.
    #[error("unsupported format code {code}")]
    UnsupportedFormat {
        /// The raw identifier received at the boundary.
        code: i32,
    },

    /// The platform allocator could not produce backing memory.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested.
        requested: u64,
        /// Failure reason.
        reason: String,
    },

    /// Operation attempted on a buffer with no data or zero extent.
    #[error("operation on an empty image buffer")]
    EmptyBuffer,

    /// A null interop record was passed where a live record is required.
    #[error("null interop record")]
    NullRecord,
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: i32, y: i32, c: i32, width: i32, height: i32, channels: i32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            c,
            width,
            height,
            channels,
        }
    }

    /// Creates an [`Error::ShapeMismatch`] error from (width, height) pairs.
    #[inline]
    pub fn shape_mismatch(want: (i32, i32), got: (i32, i32)) -> Self {
        Self::ShapeMismatch {
            want_w: want.0,
            want_h: want.1,
            got_w: got.0,
            got_h: got.1,
        }
    }

    /// Creates an [`Error::FormatMismatch`] error.
    #[inline]
    pub fn format_mismatch(expected: ImageFormat, got: ImageFormat) -> Self {
        Self::FormatMismatch { expected, got }
    }

    /// Creates an [`Error::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: u64, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is an input-validation error.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::OutOfBounds { .. }
                | Self::ShapeMismatch { .. }
                | Self::FormatMismatch { .. }
                | Self::InvalidArgument(_)
        )
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}
