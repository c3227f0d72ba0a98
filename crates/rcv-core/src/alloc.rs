//! Platform-pluggable memory allocation for image buffers.
//!
//! An owning [`ImageBuffer`](crate::ImageBuffer) does not allocate or free
//! memory itself; it holds a boxed [`PlatformMemory`] object whose lifetime
//! governs the backing block. Each execution target may use a different
//! backing primitive (plain heap, pinned memory, device memory) behind the
//! same two capabilities: hand out a data pointer, release on drop.
//!
//! Only the CPU backend is wired in. Accelerator targets are enumerated so
//! callers can request them, and fail allocation cleanly (with a logged
//! diagnostic) rather than silently falling back to the heap.

use tracing::error;

/// Execution target an image buffer is allocated for.
///
/// Open enumeration: new targets may be added without breaking callers, and
/// values without a wired backend fail allocation cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PlatformType {
    /// Host CPU heap memory.
    #[default]
    Cpu,
    /// wgpu device memory (not wired in).
    Wgpu,
    /// NVIDIA CUDA device memory (not wired in).
    Cuda,
}

impl PlatformType {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Wgpu => "wgpu",
            Self::Cuda => "cuda",
        }
    }
}

/// Backing memory for one owning image buffer.
///
/// A `PlatformMemory` object is the single logical owner of its block: the
/// block is released when the object drops, and nothing else frees it.
pub trait PlatformMemory {
    /// Pointer to the start of the block.
    ///
    /// The pointer stays valid for as long as this object is alive; moving
    /// the box does not move the block.
    fn as_mut_ptr(&mut self) -> *mut u8;

    /// Size of the block in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the block has zero size.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The platform this block lives on.
    fn platform(&self) -> PlatformType;
}

/// Zero-initialized CPU heap block.
struct CpuMemory {
    buf: Vec<u8>,
}

impl CpuMemory {
    /// Allocates `size` zeroed bytes, or `None` if the reservation fails.
    fn new(size: usize) -> Option<CpuMemory> {
        let mut buf = Vec::new();
        if buf.try_reserve_exact(size).is_err() {
            return None;
        }
        buf.resize(size, 0);
        Some(CpuMemory { buf })
    }
}

impl PlatformMemory for CpuMemory {
    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.buf.as_mut_ptr()
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn platform(&self) -> PlatformType {
        PlatformType::Cpu
    }
}

/// Wraps an existing byte vector as CPU backing memory.
pub(crate) fn adopt_vec(buf: Vec<u8>) -> Box<dyn PlatformMemory> {
    Box::new(CpuMemory { buf })
}

/// Allocates `size` bytes of backing memory on `platform`.
///
/// Returns `None` on failure: zero size, an unwired platform, or an
/// exhausted backend. The caller translates `None` into the empty-buffer
/// state; allocation failure is never fatal here.
pub fn allocate(platform: PlatformType, size: u64) -> Option<Box<dyn PlatformMemory>> {
    if size == 0 || size > isize::MAX as u64 {
        error!(size, "invalid allocation size");
        return None;
    }

    match platform {
        PlatformType::Cpu => match CpuMemory::new(size as usize) {
            Some(mem) => Some(Box::new(mem)),
            None => {
                error!(size, "cpu allocation failed");
                None
            }
        },
        other => {
            error!(platform = other.name(), "no allocator wired for platform");
            None
        }
    }
}
