//! # rcv-core
//!
//! Image buffer and pixel-format layout core for the rcv toolkit.
//!
//! This crate owns the description of how raster image data of many pixel
//! formats (grayscale, packed/planar RGB(A), floating-point color,
//! subsampled YUV) is laid out in memory, and how buffers are allocated for
//! different execution targets:
//!
//! - [`ImageFormat`] / [`format_info`] - the closed format registry
//! - [`Layout`] / [`LayoutPolicy`] - the pure layout calculator
//! - [`PlatformType`] / [`PlatformMemory`] - pluggable platform allocation
//! - [`ImageBuffer`] - the buffer entity, owning or view
//! - [`Error`] / [`Result`] - the shared error taxonomy
//!
//! ## Crate Structure
//!
//! `rcv-core` is the foundation of the workspace and has no internal
//! dependencies. The other crates build on it:
//!
//! ```text
//! rcv-core (this crate)
//!    ^
//!    |
//!    +-- rcv-interop (ABI-stable boundary records)
//!    +-- rcv-transform (transpose / rotation kernels)
//! ```
//!
//! ## Failure model
//!
//! Nothing here panics on bad input. Allocating constructors yield an empty
//! buffer on failure, addressing returns `None` out of range, and every
//! detected invalid condition emits a `tracing` diagnostic alongside its
//! failure value.
//!
//! ## Feature Flags
//!
//! - `serde` - serialization for [`ImageFormat`] and [`PlatformType`]

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod alloc;
pub mod buffer;
pub mod error;
pub mod format;
pub mod layout;

// Re-exports for convenience
pub use alloc::{allocate, PlatformMemory, PlatformType};
pub use buffer::ImageBuffer;
pub use error::{Error, Result};
pub use format::{format_info, FormatInfo, ImageFormat, PixelLayout, ALL_FORMATS};
pub use layout::{Layout, LayoutPolicy, YUV_CHANNEL_OFFSET};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use rcv_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::alloc::{PlatformMemory, PlatformType};
    pub use crate::buffer::ImageBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::format::{format_info, FormatInfo, ImageFormat, PixelLayout};
    pub use crate::layout::{Layout, LayoutPolicy};
}
