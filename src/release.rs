//! Scoped release of resources allocated by the OS.

use std::fmt;
use std::ptr::NonNull;

/// Resource allocated by the OS that must be returned using a specific
/// function, e.g. `freeaddrinfo(3)`.
///
/// # Safety
///
/// `release` must be the matching deallocation function for pointers handed
/// out by the OS for `Self`.
pub(crate) unsafe trait Release {
    /// Release the resource pointed to by `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid and not used after this call.
    unsafe fn release(ptr: *mut Self);
}

/// Owned pointer to a resource allocated by the OS, released exactly once when
/// dropped.
pub(crate) struct OsOwned<T: Release> {
    ptr: NonNull<T>,
}

impl<T: Release> OsOwned<T> {
    /// Take ownership of `ptr`, returns `None` if `ptr` is null.
    ///
    /// # Safety
    ///
    /// `ptr` must be allocated by the OS in a way matching [`Release`] and
    /// may not be released by anything else.
    pub(crate) unsafe fn from_raw(ptr: *mut T) -> Option<OsOwned<T>> {
        NonNull::new(ptr).map(|ptr| OsOwned { ptr })
    }

    pub(crate) const fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

impl<T: Release> Drop for OsOwned<T> {
    fn drop(&mut self) {
        // SAFETY: we own the pointer.
        unsafe { T::release(self.ptr.as_ptr()) }
    }
}

impl<T: Release> fmt::Debug for OsOwned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OsOwned").field(&self.ptr).finish()
    }
}
