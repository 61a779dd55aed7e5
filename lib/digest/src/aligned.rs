//! Aligned, zero-on-release heap storage for contexts.
//!
//! [`AlignedBox`] owns exactly one value placed at an address aligned to at
//! least [`CONTEXT_ALIGN`] bytes. Releasing it drops the value, overwrites
//! the whole allocation with zeros and only then hands the memory back to
//! the global allocator.

use core::alloc::Layout;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};

use alloc::alloc::{alloc, dealloc};

use crate::error::{Error, Result};
use crate::wipe::secure_zero;

/// Minimum alignment of heap-allocated contexts.
pub const CONTEXT_ALIGN: usize = 16;

/// Single-owner heap allocation with a minimum alignment of [`CONTEXT_ALIGN`].
pub struct AlignedBox<T> {
    ptr: NonNull<T>,
    layout: Layout,
}

// SAFETY: AlignedBox uniquely owns its T, exactly like Box<T>.
unsafe impl<T: Send> Send for AlignedBox<T> {}
unsafe impl<T: Sync> Sync for AlignedBox<T> {}

impl<T> AlignedBox<T> {
    /// Moves `value` into a fresh aligned allocation.
    ///
    /// Returns `OutOfMemory` if the allocator fails; `value` is dropped in
    /// that case and nothing is left reachable.
    pub fn new(value: T) -> Result<Self> {
        let layout = Self::layout()?;

        // SAFETY: layout has non-zero size (checked in `layout`).
        let raw = unsafe { alloc(layout) } as *mut T;
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => {
                log::debug!("aligned alloc of {} bytes failed", layout.size());
                return Err(Error::OutOfMemory);
            }
        };

        // SAFETY: ptr is valid for writes of one T and properly aligned.
        unsafe { ptr.as_ptr().write(value) };

        log::debug!(
            "allocated {} bytes aligned to {} at {:p}",
            layout.size(),
            layout.align(),
            ptr.as_ptr()
        );
        Ok(Self { ptr, layout })
    }

    fn layout() -> Result<Layout> {
        let size = core::mem::size_of::<T>();
        if size == 0 {
            return Err(Error::InvalidArguments);
        }
        let align = core::mem::align_of::<T>().max(CONTEXT_ALIGN);
        Layout::from_size_align(size, align).map_err(|_| Error::InvalidArguments)
    }

    /// Drops, wipes and frees the allocation.
    pub fn cleanup(self) {
        drop(self);
    }

    /// Address of the owned value.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Drops the value and zeroes every byte of the allocation.
    ///
    /// # Safety
    /// The value must not be accessed afterwards; only `release` may follow.
    unsafe fn destroy_in_place(&mut self) {
        ptr::drop_in_place(self.ptr.as_ptr());
        let bytes = core::slice::from_raw_parts_mut(self.ptr.as_ptr() as *mut u8, self.layout.size());
        secure_zero(bytes);
    }

    /// # Safety
    /// Must be called exactly once, after `destroy_in_place`.
    unsafe fn release(&mut self) {
        dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
    }
}

impl<T> Deref for AlignedBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: ptr holds an initialized T for as long as self lives.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for AlignedBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: unique ownership.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for AlignedBox<T> {
    fn drop(&mut self) {
        log::debug!("releasing {} bytes at {:p}", self.layout.size(), self.ptr.as_ptr());
        // SAFETY: the value is live until here and never touched again.
        unsafe {
            self.destroy_in_place();
            self.release();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AlignedBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
