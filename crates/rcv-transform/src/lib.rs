//! # rcv-transform
//!
//! Geometric transforms over [`rcv_core::ImageBuffer`]: transpose and
//! 90/180/270-degree clockwise rotation.
//!
//! Each call is a stateless, synchronous, one-shot transform: validate the
//! source, allocate or validate the destination, run the per-plane kernel to
//! completion on the calling thread. All supported formats transform, the
//! chroma-subsampled ones plane by plane, so a rotated NV12 buffer is still
//! a well-formed NV12 buffer.
//!
//! # Example
//!
//! ```rust
//! use rcv_core::{ImageBuffer, ImageFormat};
//! use rcv_transform::{rotate, transpose, RotateAngle};
//!
//! let src = ImageBuffer::new(64, 48, ImageFormat::PkgBgrU8);
//! let mut rotated = ImageBuffer::default();
//! rotate(&src, &mut rotated, RotateAngle::Clockwise90).unwrap();
//! assert_eq!((rotated.width(), rotated.height()), (48, 64));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod kernel;
pub mod rotation;

pub use rotation::{rotate, rotate_degrees, transpose, RotateAngle};
