//! Scoped ownership of boundary records.
//!
//! The record lifecycle is manual by design (the boundary cannot carry
//! language-managed ownership), but internal callers should not have to
//! pair every `create` with a `release` by hand. [`InteropGuard`] wraps a
//! live record and releases it exactly once, on drop or on an explicit
//! [`release`](InteropGuard::release) call, whichever comes first.

use crate::{create, release, CImageBuffer, CImageFormat};
use rcv_core::{Error, Result};

/// Owns a boundary record for a scope.
///
/// # Example
///
/// ```rust
/// use rcv_interop::{CImageFormat, InteropGuard};
///
/// let guard = InteropGuard::create(8, 8, CImageFormat::GrayU8).unwrap();
/// assert!(guard.record().total_byte_size > 0);
/// // record released here
/// ```
pub struct InteropGuard {
    record: *mut CImageBuffer,
}

impl InteropGuard {
    /// Creates a record and takes ownership of it.
    ///
    /// Returns `None` when [`create`] fails.
    pub fn create(width: i32, height: i32, format: CImageFormat) -> Option<InteropGuard> {
        let record = create(width, height, format);
        if record.is_null() {
            return None;
        }
        Some(InteropGuard { record })
    }

    /// Takes ownership of an existing live record.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `record` must be null or an unreleased pointer from
    /// [`create`](crate::create) / [`from_image`](crate::from_image), and no
    /// one else may release it afterwards.
    pub unsafe fn from_raw(record: *mut CImageBuffer) -> Option<InteropGuard> {
        if record.is_null() {
            return None;
        }
        Some(InteropGuard { record })
    }

    /// The owned record pointer (non-null until released).
    #[inline]
    pub fn as_ptr(&self) -> *mut CImageBuffer {
        self.record
    }

    /// Borrows the owned record.
    ///
    /// # Panics
    ///
    /// Panics if called after an explicit [`release`](Self::release); the
    /// guard holds a live record at all other times.
    #[inline]
    pub fn record(&self) -> &CImageBuffer {
        assert!(!self.record.is_null(), "record already released");
        unsafe { &*self.record }
    }

    /// Releases the record now instead of at end of scope.
    ///
    /// The guard's pointer is nulled, so a second call (or the drop) is a
    /// no-op failure rather than a double free.
    pub fn release(&mut self) -> Result<()> {
        if self.record.is_null() {
            return Err(Error::NullRecord);
        }
        let record = std::mem::replace(&mut self.record, std::ptr::null_mut());
        unsafe { release(record) }
    }

    /// Escapes the guard, handing the raw record back to the caller.
    ///
    /// The caller becomes responsible for the matching
    /// [`release`](crate::release).
    pub fn into_raw(mut self) -> *mut CImageBuffer {
        std::mem::replace(&mut self.record, std::ptr::null_mut())
    }
}

impl Drop for InteropGuard {
    fn drop(&mut self) {
        if !self.record.is_null() {
            let _ = unsafe { release(self.record) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_once() {
        let mut guard = InteropGuard::create(4, 4, CImageFormat::GrayU8).unwrap();
        assert!(!guard.as_ptr().is_null());
        assert!(guard.release().is_ok());
        assert!(guard.as_ptr().is_null());
        // Second explicit release fails without touching memory.
        assert!(matches!(guard.release(), Err(Error::NullRecord)));
    }

    #[test]
    fn test_guard_create_fails_on_bad_extent() {
        assert!(InteropGuard::create(0, 4, CImageFormat::GrayU8).is_none());
    }

    #[test]
    fn test_into_raw_escapes() {
        let guard = InteropGuard::create(4, 4, CImageFormat::GrayU8).unwrap();
        let raw = guard.into_raw();
        assert!(!raw.is_null());
        unsafe { release(raw) }.unwrap();
    }
}
