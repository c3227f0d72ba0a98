//! Transpose and clockwise rotation over image buffers.
//!
//! Both entry points validate before doing any work: an empty source is a
//! hard error, an empty destination is allocated with the angle-appropriate
//! shape on the source's platform, and a caller-supplied destination must
//! match that shape and the source format exactly.
//!
//! Transposition dispatches to the cache-tiled kernel on the wide build
//! targets and the element-wise kernel elsewhere; the two are byte-identical
//! performance variants. Rotation always takes the generic kernel — its
//! accelerated path is intentionally not wired in.

use crate::kernel;
use rcv_core::{Error, ImageBuffer, Result};
use tracing::error;

/// Clockwise rotation angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateAngle {
    /// Rotate 90 degrees clockwise (output shape is transposed).
    Clockwise90,
    /// Rotate 180 degrees (output shape matches the source).
    Clockwise180,
    /// Rotate 270 degrees clockwise (output shape is transposed).
    Clockwise270,
}

impl RotateAngle {
    /// Parses a degree count; only 90, 180, and 270 are valid.
    ///
    /// # Errors
    ///
    /// Any other value is [`Error::InvalidArgument`].
    pub fn from_degrees(degrees: i32) -> Result<RotateAngle> {
        match degrees {
            90 => Ok(RotateAngle::Clockwise90),
            180 => Ok(RotateAngle::Clockwise180),
            270 => Ok(RotateAngle::Clockwise270),
            other => {
                error!(degrees = other, "unsupported rotation angle");
                Err(Error::invalid_argument(format!(
                    "rotation angle {other} not in {{90, 180, 270}}"
                )))
            }
        }
    }

    /// The clockwise degree count.
    pub fn degrees(self) -> i32 {
        match self {
            RotateAngle::Clockwise90 => 90,
            RotateAngle::Clockwise180 => 180,
            RotateAngle::Clockwise270 => 270,
        }
    }

    /// Destination (width, height) for a source of the given shape.
    fn dst_shape(self, src_w: i32, src_h: i32) -> (i32, i32) {
        match self {
            RotateAngle::Clockwise90 | RotateAngle::Clockwise270 => (src_h, src_w),
            RotateAngle::Clockwise180 => (src_w, src_h),
        }
    }
}

/// Checks the source, then allocates or validates the destination.
fn prepare_dst(src: &ImageBuffer, dst: &mut ImageBuffer, want: (i32, i32)) -> Result<()> {
    if src.format().is_yuv() && (src.width() % 2 != 0 || src.height() % 2 != 0) {
        error!(
            width = src.width(),
            height = src.height(),
            "subsampled source needs even dimensions"
        );
        return Err(Error::invalid_argument(format!(
            "YUV transform needs even dimensions, got {}x{}",
            src.width(),
            src.height()
        )));
    }

    if dst.is_empty() {
        *dst = ImageBuffer::with_platform(want.0, want.1, src.format(), src.platform());
        if dst.is_empty() {
            return Err(Error::allocation_failed(
                dst.total_byte_size(),
                "destination allocation failed",
            ));
        }
        return Ok(());
    }

    if dst.width() != want.0 || dst.height() != want.1 {
        error!(
            want_w = want.0,
            want_h = want.1,
            got_w = dst.width(),
            got_h = dst.height(),
            "illegal destination shape"
        );
        return Err(Error::shape_mismatch(want, (dst.width(), dst.height())));
    }
    if dst.format() != src.format() {
        error!(src = ?src.format(), dst = ?dst.format(), "destination format differs");
        return Err(Error::format_mismatch(src.format(), dst.format()));
    }
    Ok(())
}

fn run_planes(
    src: &ImageBuffer,
    dst: &mut ImageBuffer,
    op: impl Fn(&[u8], &mut [u8], &kernel::Plane, &kernel::Plane),
) -> Result<()> {
    let src_planes = kernel::planes(src);
    let dst_planes = kernel::planes(dst);
    let src_bytes = src.bytes().ok_or(Error::EmptyBuffer)?;
    let dst_bytes = dst.bytes_mut().ok_or(Error::EmptyBuffer)?;
    for (sp, dp) in src_planes.iter().zip(&dst_planes) {
        op(src_bytes, dst_bytes, sp, dp);
    }
    Ok(())
}

/// Transposes `src` into `dst` (rows become columns).
///
/// An empty `dst` is allocated as height x width of the source format on the
/// source platform; a non-empty `dst` must already have exactly that shape
/// and format.
///
/// # Errors
///
/// [`Error::EmptyBuffer`] for an empty source; [`Error::ShapeMismatch`] /
/// [`Error::FormatMismatch`] for an unusable destination;
/// [`Error::InvalidArgument`] for YUV sources with odd dimensions;
/// [`Error::AllocationFailed`] when the destination cannot be allocated.
///
/// # Example
///
/// ```rust
/// use rcv_core::{ImageBuffer, ImageFormat};
/// use rcv_transform::transpose;
///
/// let src = ImageBuffer::from_vec(2, 3, ImageFormat::GrayU8, vec![1, 2, 3, 4, 5, 6]).unwrap();
/// let mut dst = ImageBuffer::default();
/// transpose(&src, &mut dst).unwrap();
/// assert_eq!(dst.bytes().unwrap(), &[1, 3, 5, 2, 4, 6]);
/// ```
pub fn transpose(src: &ImageBuffer, dst: &mut ImageBuffer) -> Result<()> {
    if src.is_empty() {
        error!("transpose source is empty");
        return Err(Error::EmptyBuffer);
    }
    prepare_dst(src, dst, (src.height(), src.width()))?;
    run_planes(src, dst, kernel::transpose_plane)
}

/// Rotates `src` clockwise by `angle` into `dst`.
///
/// Destination handling matches [`transpose`]: an empty `dst` is allocated
/// with the angle-appropriate shape, a non-empty one is validated against
/// it.
///
/// # Errors
///
/// As for [`transpose`].
pub fn rotate(src: &ImageBuffer, dst: &mut ImageBuffer, angle: RotateAngle) -> Result<()> {
    if src.is_empty() {
        error!("rotate source is empty");
        return Err(Error::EmptyBuffer);
    }
    prepare_dst(src, dst, angle.dst_shape(src.width(), src.height()))?;
    run_planes(src, dst, |s, d, sp, dp| kernel::rotate_plane(s, d, sp, dp, angle))
}

/// Rotates by a raw clockwise degree count.
///
/// Rejects anything outside {90, 180, 270} as invalid input before touching
/// `dst`.
pub fn rotate_degrees(src: &ImageBuffer, dst: &mut ImageBuffer, degrees: i32) -> Result<()> {
    rotate(src, dst, RotateAngle::from_degrees(degrees)?)
}
