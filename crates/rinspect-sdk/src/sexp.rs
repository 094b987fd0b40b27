//! Sexp: opaque 64-bit handle to a value in the foreign heap
//!
//! The handle carries no type information of its own; the tag lives in the
//! foreign record and is read through [`SexpAccess`](crate::SexpAccess).
//! What the 64 bits mean is decided by the backend that produced the handle:
//!
//! ```text
//! libR backend:       the SEXP address, zero-extended
//! in-process heap:    generation (upper 32 bits) | slot index (lower 32 bits)
//! ```
//!
//! Handles from different sessions must never be mixed.

/// Opaque, copyable handle to one foreign-heap value.
///
/// A `Sexp` is not owned by the host's memory manager. The foreign collector
/// may reclaim the referent at any safepoint unless the handle is rooted
/// (see `rinspect_engine::root::Protected`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Sexp(u64);

const SLOT_MASK: u64 = 0x0000_0000_FFFF_FFFF;
const GENERATION_SHIFT: u64 = 32;

impl Sexp {
    /// Create from raw bits (backend-specific encoding)
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get raw bits (backend-specific encoding)
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Pack an arena slot and its generation into a handle
    #[inline]
    pub const fn from_slot(slot: u32, generation: u32) -> Self {
        Self(((generation as u64) << GENERATION_SHIFT) | slot as u64)
    }

    /// Arena slot of a slot-encoded handle
    #[inline]
    pub const fn slot(self) -> u32 {
        (self.0 & SLOT_MASK) as u32
    }

    /// Generation of a slot-encoded handle
    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0 >> GENERATION_SHIFT) as u32
    }

    /// Wrap a raw foreign pointer
    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize as u64)
    }

    /// Reinterpret the handle as a raw foreign pointer
    ///
    /// Only meaningful for handles produced by a pointer-encoded backend.
    #[inline]
    pub fn as_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }
}

impl std::fmt::Debug for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sexp({:#x})", self.0)
    }
}
