//! Owned socket handle.
//!
//! See [`Socket`].

use std::fmt;
use std::mem::forget as leak;

use crate::net::{Domain, Type};
use crate::{sys, Config, Result};

/// Raw, native, socket handle.
///
/// A file descriptor on Unix and a `SOCKET` on Windows.
#[cfg(unix)]
pub type RawSocket = std::os::fd::RawFd;

/// Raw, native, socket handle.
///
/// A file descriptor on Unix and a `SOCKET` on Windows.
#[cfg(windows)]
pub type RawSocket = std::os::windows::io::RawSocket;

/// An open socket.
///
/// `Socket` owns the OS socket, it's closed once [`Socket::close`] is called
/// or when the `Socket` is dropped. Closing the socket in the `Drop`
/// implementation can't report errors, they're logged (at warn level)
/// instead. Use [`Socket::close`] to handle them.
///
/// A `Socket` can be created using:
///  * [`socket`] or [`Socket::config`] to open a new socket.
///  * [`Socket::accept`] to accept an incoming connection.
///  * From any valid native socket using `FromRawFd` (Unix) or
///    `FromRawSocket` (Windows).
///
/// All operations are defined in the [`net`] module.
///
/// [`socket`]: crate::net::socket
/// [`net`]: crate::net
pub struct Socket {
    raw: sys::RawSocket,
}

impl Socket {
    /// Create a new `Socket` from a raw socket.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `raw` is valid and that it's no longer used
    /// by anything other than the returned `Socket`.
    pub(crate) const unsafe fn from_raw(raw: sys::RawSocket) -> Socket {
        Socket { raw }
    }

    /// Returns the raw socket of this `Socket`.
    pub(crate) const fn raw(&self) -> sys::RawSocket {
        self.raw
    }

    /// Create a new [`Config`] to open a socket.
    ///
    /// [`socket`] can be used to open a socket with the default
    /// configuration.
    ///
    /// [`socket`]: crate::net::socket
    pub const fn config(domain: Domain, r#type: Type) -> Config {
        Config::new(domain, r#type)
    }

    /// Close the socket.
    ///
    /// Unlike dropping the `Socket` this returns the error of closing the
    /// socket, if any. The OS resource is released even if an error is
    /// returned.
    #[doc = crate::man_link!(close(2))]
    #[doc(alias = "closesocket")]
    pub fn close(self) -> Result<()> {
        let raw = self.raw;
        leak(self);
        sys::net::close(raw)
    }

    /// Set the socket in non-blocking mode, or back to blocking mode.
    ///
    /// In non-blocking mode operations that would block return
    /// [`Error::WOULD_BLOCK`] instead.
    ///
    /// [`Error::WOULD_BLOCK`]: crate::Error::WOULD_BLOCK
    #[doc(alias = "O_NONBLOCK")]
    #[doc(alias = "FIONBIO")]
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        sys::net::set_nonblocking(self.raw, nonblocking)
    }

    /// Creates a new independently owned `Socket` that shares the same
    /// underlying OS socket as this `Socket`.
    #[doc(alias = "dup")]
    #[doc(alias = "F_DUPFD_CLOEXEC")]
    #[doc(alias = "WSADuplicateSocketW")]
    pub fn try_clone(&self) -> Result<Socket> {
        let raw = sys::net::try_clone(self.raw)?;
        // SAFETY: the OS ensures that `raw` is valid and we're the only owner.
        Ok(unsafe { Socket::from_raw(raw) })
    }

    fn into_raw(self) -> sys::RawSocket {
        let raw = self.raw;
        leak(self);
        raw
    }
}

impl fmt::Debug for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Socket").field("raw", &self.raw).finish()
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if let Err(err) = sys::net::close(self.raw) {
            log::warn!(socket = self.raw; "error closing sockops::Socket: {err}");
        }
    }
}

#[cfg(unix)]
mod unix {
    use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};

    use super::Socket;

    impl AsFd for Socket {
        fn as_fd(&self) -> BorrowedFd<'_> {
            // SAFETY: we're ensured that `raw` is valid.
            unsafe { BorrowedFd::borrow_raw(self.raw) }
        }
    }

    impl AsRawFd for Socket {
        fn as_raw_fd(&self) -> RawFd {
            self.raw
        }
    }

    impl FromRawFd for Socket {
        unsafe fn from_raw_fd(fd: RawFd) -> Socket {
            Socket::from_raw(fd)
        }
    }

    impl IntoRawFd for Socket {
        fn into_raw_fd(self) -> RawFd {
            self.into_raw()
        }
    }

    impl From<OwnedFd> for Socket {
        fn from(fd: OwnedFd) -> Socket {
            // SAFETY: `OwnedFd` ensures that `fd` is valid and we take
            // ownership of it.
            unsafe { Socket::from_raw(fd.into_raw_fd()) }
        }
    }

    impl From<Socket> for OwnedFd {
        fn from(socket: Socket) -> OwnedFd {
            // SAFETY: `Socket` ensures that `raw` is valid and we give up
            // ownership of it.
            unsafe { OwnedFd::from_raw_fd(socket.into_raw()) }
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::os::windows::io::{
        AsRawSocket, AsSocket, BorrowedSocket, FromRawSocket, IntoRawSocket, OwnedSocket,
        RawSocket,
    };

    use super::Socket;

    impl AsSocket for Socket {
        fn as_socket(&self) -> BorrowedSocket<'_> {
            // SAFETY: we're ensured that `raw` is valid.
            unsafe { BorrowedSocket::borrow_raw(self.raw as RawSocket) }
        }
    }

    impl AsRawSocket for Socket {
        fn as_raw_socket(&self) -> RawSocket {
            self.raw as RawSocket
        }
    }

    impl FromRawSocket for Socket {
        unsafe fn from_raw_socket(socket: RawSocket) -> Socket {
            Socket::from_raw(socket as _)
        }
    }

    impl IntoRawSocket for Socket {
        fn into_raw_socket(self) -> RawSocket {
            self.into_raw() as RawSocket
        }
    }

    impl From<OwnedSocket> for Socket {
        fn from(socket: OwnedSocket) -> Socket {
            // SAFETY: `OwnedSocket` ensures that `socket` is valid and we
            // take ownership of it.
            unsafe { Socket::from_raw(socket.into_raw_socket() as _) }
        }
    }

    impl From<Socket> for OwnedSocket {
        fn from(socket: Socket) -> OwnedSocket {
            // SAFETY: `Socket` ensures that `raw` is valid and we give up
            // ownership of it.
            unsafe { OwnedSocket::from_raw_socket(socket.into_raw() as RawSocket) }
        }
    }
}
