//! Unix implementation, using BSD sockets.

use std::io::{IoSlice, IoSliceMut};
use std::mem;
use std::os::fd::RawFd;

use crate::{Error, Result};

/// Helper macro to execute a system call that returns `-1` on error.
macro_rules! syscall {
    ($fn: ident ( $($arg: expr),* $(,)? ) ) => {{
        let res = unsafe { libc::$fn($( $arg, )*) };
        if res == -1 {
            Err($crate::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
}

/// Same as [`syscall!`], but retries the system call if it's interrupted by a
/// signal.
macro_rules! syscall_retry {
    ($fn: ident ( $($arg: expr),* $(,)? ) ) => {{
        loop {
            match syscall!($fn($( $arg ),*)) {
                Err(err) if err == $crate::Error::INTERRUPTED => {
                    log::trace!("retrying {}(2) after signal interruption", stringify!($fn));
                }
                res => break res,
            }
        }
    }};
}

pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod net;
pub(crate) mod resolve;

pub(crate) use libc::{sockaddr, sockaddr_in, sockaddr_in6, sockaddr_storage, socklen_t};
pub(crate) use libc as native;
pub(crate) use libc::{AF_INET, AF_INET6, AF_UNIX};

pub(crate) type RawSocket = RawFd;

/// Wrapper around `libc::msghdr` used by the `sendmsg(2)` and `recvmsg(2)`
/// system calls.
#[repr(transparent)]
pub(crate) struct MsgHeader(libc::msghdr);

impl MsgHeader {
    pub(crate) fn empty() -> MsgHeader {
        // SAFETY: zeroed `msghdr` is valid.
        MsgHeader(unsafe { mem::zeroed() })
    }

    /// Initialise the header for sending.
    ///
    /// # Safety
    ///
    /// `address`, `iovecs` and `control` must outlive the header.
    pub(crate) unsafe fn init_send(
        &mut self,
        address: (*const sockaddr, socklen_t),
        iovecs: &[IoSlice<'_>],
        control: &[u8],
    ) -> Result<()> {
        self.0.msg_name = address.0.cast_mut().cast();
        self.0.msg_namelen = address.1;
        // SAFETY: `IoSlice` is ABI compatible with `iovec`, the OS won't
        // write to the buffers.
        self.0.msg_iov = iovecs.as_ptr().cast_mut().cast();
        self.0.msg_iovlen = iovecs.len().try_into().map_err(|_| Error::INVALID_ARGUMENT)?;
        if !control.is_empty() {
            self.0.msg_control = control.as_ptr().cast_mut().cast();
            self.0.msg_controllen = control.len().try_into().map_err(|_| Error::INVALID_ARGUMENT)?;
        }
        Ok(())
    }

    /// Initialise the header for receiving.
    ///
    /// # Safety
    ///
    /// `address`, `iovecs` and `control` must outlive the header.
    pub(crate) unsafe fn init_recv(
        &mut self,
        address: (*mut sockaddr, socklen_t),
        iovecs: &mut [IoSliceMut<'_>],
        control: &mut [u8],
    ) -> Result<()> {
        self.0.msg_name = address.0.cast();
        self.0.msg_namelen = address.1;
        // SAFETY: `IoSliceMut` is ABI compatible with `iovec`.
        self.0.msg_iov = iovecs.as_mut_ptr().cast();
        self.0.msg_iovlen = iovecs.len().try_into().map_err(|_| Error::INVALID_ARGUMENT)?;
        if !control.is_empty() {
            self.0.msg_control = control.as_mut_ptr().cast();
            self.0.msg_controllen = control.len().try_into().map_err(|_| Error::INVALID_ARGUMENT)?;
        }
        Ok(())
    }

    pub(crate) const fn as_ptr(&self) -> *const libc::msghdr {
        &self.0
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut libc::msghdr {
        &mut self.0
    }

    /// Length of the address written by the kernel.
    pub(crate) const fn address_len(&self) -> socklen_t {
        self.0.msg_namelen
    }

    /// Length of the control message written by the kernel.
    pub(crate) fn control_len(&self) -> usize {
        // Never larger than the control buffer passed in `init_recv`.
        usize::try_from(self.0.msg_controllen).unwrap_or(usize::MAX)
    }

    /// Flags set by the kernel.
    pub(crate) const fn flags(&self) -> libc::c_int {
        self.0.msg_flags
    }
}
