//! The sockops crate provides portable, synchronous socket operations.
//!
//! All operations are thin wrappers around the native socket API of the
//! platform: BSD sockets on Unix-like systems and Winsock on Windows. Every
//! operation is a direct system call, there is no event loop, no internal
//! thread pool and no (DNS) caching. This makes the crate a substrate on which
//! an asynchronous engine can be built: set a socket to non-blocking mode
//! using [`Socket::set_nonblocking`], wait for readiness using your favourite
//! poller and call the operations in this crate.
//!
//! # Errors
//!
//! All fallible operations return an [`Error`], which is a `(code, category)`
//! pair. Errors in the [system category] use the error number of the OS
//! (`errno` or `WSAGetLastError`) unmodified. Name resolution uses separate
//! categories on Unix, see [`error`] for more information. [`Error`] can be
//! converted into an [`io::Error`] when needed.
//!
//! [system category]: Category::System
//! [`io::Error`]: std::io::Error
//!
//! # Signals
//!
//! Operations that can be interrupted by a signal (`EINTR`) are retried, the
//! caller will never see [`Error::INTERRUPTED`] from operations in this crate.
//!
//! # Examples
//!
//! Resolving, connecting and sending a request.
//!
//! ```no_run
//! use sockops::net::{resolve, Hints, Type};
//! use sockops::Socket;
//!
//! # fn main() -> Result<(), sockops::Error> {
//! let hints = Hints::new().with_type(Type::STREAM);
//! let candidates = resolve(Some("example.com"), Some("80"), &hints)?;
//! let candidate = candidates.iter().next().ok_or(sockops::Error::NOT_FOUND)?;
//!
//! let socket = Socket::config(candidate.domain(), candidate.r#type())
//!     .with_protocol(candidate.protocol())
//!     .open()?;
//! socket.connect(candidate.address().clone())?;
//! socket.send_all(b"GET / HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n")?;
//!
//! let mut buf = vec![0; 4096];
//! let n = socket.recv(&mut buf, None)?;
//! println!("got {n} bytes");
//! socket.close()?;
//! # Ok(())
//! # }
//! ```

#![warn(
    anonymous_parameters,
    bare_trait_objects,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    variant_size_differences
)]

#[cfg(not(any(unix, windows)))]
compile_error!("sockops only supports Unix-like systems and Windows");

#[cfg(unix)]
mod unix;

#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;

#[cfg(windows)]
use windows as sys;

mod config;
pub mod error;
pub mod net;
mod release;
mod socket;

#[doc(no_inline)]
pub use config::Config;
#[doc(no_inline)]
pub use error::{Category, Error, ErrorClass};
#[doc(no_inline)]
pub use net::{Endpoint, Shutdown};
#[doc(no_inline)]
pub use socket::{RawSocket, Socket};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Link to online manual.
#[rustfmt::skip]
macro_rules! man_link {
    ($syscall: tt ( $section: tt ) ) => {
        concat!(
            "\n\nAdditional documentation can be found in the ",
            "[`", stringify!($syscall), "(", stringify!($section), ")`]",
            "(https://man7.org/linux/man-pages/man", stringify!($section), "/", stringify!($syscall), ".", stringify!($section), ".html)",
            " manual.\n"
        )
    };
}

use man_link;

/// Create a new newtype around a native constant with the named values.
///
/// With `impl BitOr` the type can be combined as flags.
macro_rules! new_flag {
    (impl BitOr for $type_name: ident) => {
        impl std::ops::BitOr for $type_name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                $type_name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $type_name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl $type_name {
            /// Returns true if all flags in `other` are set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }
    };
    (
        $(
        $(#[$type_meta:meta])*
        $type_vis: vis struct $type_name: ident ( $type_repr: ty ) $(impl $bit_or: ident)? {
            $(
            $(#[$value_meta:meta])*
            $value_name: ident = $value: expr,
            )*
        }
        )+
    ) => {
        $(
        $(#[$type_meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        $type_vis struct $type_name(pub(crate) $type_repr);

        impl $type_name {
            $(
            $(#[$value_meta])*
            #[allow(trivial_numeric_casts, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
            pub const $value_name: $type_name = $type_name($value as $type_repr);
            )*

            /// Create a value from a raw, native, value.
            pub const fn from_raw(value: $type_repr) -> $type_name {
                $type_name(value)
            }

            /// Returns the raw, native, value.
            pub const fn as_raw(self) -> $type_repr {
                self.0
            }
        }

        impl std::fmt::Debug for $type_name {
            #[allow(unused_doc_comments)]
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                $(
                $(#[$value_meta])*
                if *self == $type_name::$value_name {
                    return f.write_str(stringify!($value_name));
                }
                )*
                write!(f, "{}({})", stringify!($type_name), self.0)
            }
        }

        $(
        new_flag!(impl $bit_or for $type_name);
        )?
        )+
    };
}

pub(crate) use new_flag;
