//! Error values.
//!
//! An [`Error`] is a `(code, category)` pair. The [`Category`] determines in
//! which error space the code lives:
//!
//!  * [`Category::System`]: error numbers of the OS, `errno` on Unix and
//!    `WSAGetLastError`/`GetLastError` on Windows. The codes are never
//!    modified, so they can be compared to the platform's documentation.
//!  * `Category::Netdb`: resolver errors (`HOST_NOT_FOUND`, `TRY_AGAIN`,
//!    etc.). Unix only.
//!  * `Category::Addrinfo`: `getaddrinfo(3)` errors (`EAI_*`). Unix only.
//!  * [`Category::Misc`]: errors produced by this crate itself.
//!
//! On Windows Winsock reports resolver failures in the same error space as
//! all other errors, so there [`Category::netdb`] and [`Category::addrinfo`]
//! both return [`Category::System`]. Code that wants to check the category of
//! resolver errors portably should use those functions, or
//! [`Error::class`], rather than naming the variants.

use std::hash::{Hash, Hasher};
use std::{fmt, io};

use crate::sys;

/// The error space an [`Error`] code belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Category {
    /// Native OS errors.
    System,
    /// Resolver (`netdb.h`) errors.
    #[cfg(not(windows))]
    Netdb,
    /// `getaddrinfo(3)` errors.
    #[cfg(not(windows))]
    Addrinfo,
    /// Errors produced by this crate.
    Misc,
}

impl Category {
    /// Category for native OS errors.
    pub const fn system() -> Category {
        Category::System
    }

    /// Category for resolver errors.
    ///
    /// Same as [`Category::system`] on Windows.
    pub const fn netdb() -> Category {
        sys::error::NETDB_CATEGORY
    }

    /// Category for `getaddrinfo(3)` errors.
    ///
    /// Same as [`Category::system`] on Windows.
    pub const fn addrinfo() -> Category {
        sys::error::ADDRINFO_CATEGORY
    }

    /// Category for errors produced by this crate.
    pub const fn misc() -> Category {
        Category::Misc
    }

    /// Name of the category.
    pub const fn name(self) -> &'static str {
        match self {
            Category::System => "system",
            #[cfg(not(windows))]
            Category::Netdb => "netdb",
            #[cfg(not(windows))]
            Category::Addrinfo => "addrinfo",
            Category::Misc => "misc",
        }
    }

    /// Returns the description of `code` in this category.
    pub fn message(self, code: i32) -> String {
        match self {
            Category::System => sys::error::system_message(code),
            #[cfg(not(windows))]
            Category::Netdb => netdb_message(code).to_owned(),
            #[cfg(not(windows))]
            Category::Addrinfo => match code {
                sys::error::SERVICE_NOT_FOUND => "Service not found".to_owned(),
                sys::error::SOCKET_TYPE_NOT_SUPPORTED => "Socket type not supported".to_owned(),
                code => sys::error::addrinfo_message(code),
            },
            Category::Misc => misc_message(code).to_owned(),
        }
    }
}

#[cfg(not(windows))]
const fn netdb_message(code: i32) -> &'static str {
    match code {
        sys::error::HOST_NOT_FOUND => "Host not found (authoritative)",
        sys::error::HOST_NOT_FOUND_TRY_AGAIN => "Host not found (non-authoritative), try again later",
        sys::error::NO_DATA => "The query is valid, but it does not have associated data",
        sys::error::NO_RECOVERY => "A non-recoverable error occurred during database lookup",
        _ => "Unknown resolver error",
    }
}

const fn misc_message(code: i32) -> &'static str {
    match code {
        ALREADY_OPEN => "Already open",
        EOF => "End of file",
        NOT_FOUND => "Element not found",
        FD_SET_FAILURE => "The descriptor does not fit into the select call's fd_set",
        OTHER => "Other error",
        _ => "Unknown error",
    }
}

const ALREADY_OPEN: i32 = 1;
const EOF: i32 = 2;
const NOT_FOUND: i32 = 3;
const FD_SET_FAILURE: i32 = 4;
const OTHER: i32 = 5;

/// Error value returned by all operations.
///
/// # Equality
///
/// Two errors are equal if both their code and category are equal. The only
/// exception is the "no error" value (code `0`), which is equal to any other
/// "no error" value regardless of the category.
#[derive(Copy, Clone)]
pub struct Error {
    code: i32,
    category: Category,
}

macro_rules! errors {
    (
        $(
        $(#[$meta:meta])*
        $name: ident = $constructor: ident ( $code: expr ),
        )*
    ) => {
        /// Named errors.
        ///
        /// The numeric value of each error depends on the platform.
        impl Error {
            $(
            $(#[$meta])*
            pub const $name: Error = Error::$constructor($code);
            )*
        }
    };
}

errors! {
    /// Permission denied.
    ACCESS_DENIED = system(sys::error::ACCESS_DENIED),
    /// Address family not supported by protocol.
    ADDRESS_FAMILY_NOT_SUPPORTED = system(sys::error::ADDRESS_FAMILY_NOT_SUPPORTED),
    /// Address already in use.
    ADDRESS_IN_USE = system(sys::error::ADDRESS_IN_USE),
    /// Transport endpoint is already connected.
    ALREADY_CONNECTED = system(sys::error::ALREADY_CONNECTED),
    /// Operation already in progress.
    ALREADY_STARTED = system(sys::error::ALREADY_STARTED),
    /// Broken pipe.
    BROKEN_PIPE = system(sys::error::BROKEN_PIPE),
    /// A connection has been aborted.
    CONNECTION_ABORTED = system(sys::error::CONNECTION_ABORTED),
    /// Connection refused.
    CONNECTION_REFUSED = system(sys::error::CONNECTION_REFUSED),
    /// Connection reset by peer.
    CONNECTION_RESET = system(sys::error::CONNECTION_RESET),
    /// Bad file descriptor.
    BAD_DESCRIPTOR = system(sys::error::BAD_DESCRIPTOR),
    /// Bad address.
    FAULT = system(sys::error::FAULT),
    /// No route to host.
    HOST_UNREACHABLE = system(sys::error::HOST_UNREACHABLE),
    /// Operation now in progress.
    IN_PROGRESS = system(sys::error::IN_PROGRESS),
    /// Interrupted system call.
    INTERRUPTED = system(sys::error::INTERRUPTED),
    /// Invalid argument.
    INVALID_ARGUMENT = system(sys::error::INVALID_ARGUMENT),
    /// Message too long.
    MESSAGE_SIZE = system(sys::error::MESSAGE_SIZE),
    /// The name was too long.
    NAME_TOO_LONG = system(sys::error::NAME_TOO_LONG),
    /// Network is down.
    NETWORK_DOWN = system(sys::error::NETWORK_DOWN),
    /// Network dropped connection on reset.
    NETWORK_RESET = system(sys::error::NETWORK_RESET),
    /// Network is unreachable.
    NETWORK_UNREACHABLE = system(sys::error::NETWORK_UNREACHABLE),
    /// Too many open files.
    NO_DESCRIPTORS = system(sys::error::NO_DESCRIPTORS),
    /// No buffer space available.
    NO_BUFFER_SPACE = system(sys::error::NO_BUFFER_SPACE),
    /// Cannot allocate memory.
    NO_MEMORY = system(sys::error::NO_MEMORY),
    /// Operation not permitted.
    NO_PERMISSION = system(sys::error::NO_PERMISSION),
    /// Protocol not available.
    NO_PROTOCOL_OPTION = system(sys::error::NO_PROTOCOL_OPTION),
    /// No such device.
    NO_SUCH_DEVICE = system(sys::error::NO_SUCH_DEVICE),
    /// Transport endpoint is not connected.
    NOT_CONNECTED = system(sys::error::NOT_CONNECTED),
    /// Socket operation on non-socket.
    NOT_SOCKET = system(sys::error::NOT_SOCKET),
    /// Operation cancelled.
    OPERATION_ABORTED = system(sys::error::OPERATION_ABORTED),
    /// Operation not supported.
    OPERATION_NOT_SUPPORTED = system(sys::error::OPERATION_NOT_SUPPORTED),
    /// Cannot send after transport endpoint shutdown.
    SHUT_DOWN = system(sys::error::SHUT_DOWN),
    /// Connection timed out.
    TIMED_OUT = system(sys::error::TIMED_OUT),
    /// Resource temporarily unavailable.
    TRY_AGAIN = system(sys::error::TRY_AGAIN),
    /// The socket is marked non-blocking and the requested operation would
    /// block.
    ///
    /// On most Unix-like systems this is the same error as
    /// [`Error::TRY_AGAIN`].
    WOULD_BLOCK = system(sys::error::WOULD_BLOCK),

    /// Host not found (authoritative).
    HOST_NOT_FOUND = netdb(sys::error::HOST_NOT_FOUND),
    /// Host not found (non-authoritative), a transient failure.
    HOST_NOT_FOUND_TRY_AGAIN = netdb(sys::error::HOST_NOT_FOUND_TRY_AGAIN),
    /// The query is valid but does not have associated address data.
    NO_DATA = netdb(sys::error::NO_DATA),
    /// A non-recoverable error occurred.
    NO_RECOVERY = netdb(sys::error::NO_RECOVERY),

    /// The service is not supported for the given socket type.
    SERVICE_NOT_FOUND = addrinfo(sys::error::SERVICE_NOT_FOUND),
    /// The socket type is not supported.
    SOCKET_TYPE_NOT_SUPPORTED = addrinfo(sys::error::SOCKET_TYPE_NOT_SUPPORTED),

    /// Already open.
    ALREADY_OPEN = misc(ALREADY_OPEN),
    /// End of file or stream.
    EOF = misc(EOF),
    /// Element not found.
    NOT_FOUND = misc(NOT_FOUND),
    /// The descriptor cannot fit into the `select(2)` system call's `fd_set`.
    FD_SET_FAILURE = misc(FD_SET_FAILURE),
    /// Error without a more specific code, e.g. converted from an
    /// [`io::Error`] of an unrelated kind.
    OTHER = misc(OTHER),
}

impl Error {
    /// Create a new error.
    pub const fn new(code: i32, category: Category) -> Error {
        Error { code, category }
    }

    /// Create an error in the [system category](Category::system).
    pub const fn system(code: i32) -> Error {
        Error::new(code, Category::system())
    }

    /// Create an error in the [netdb category](Category::netdb).
    pub const fn netdb(code: i32) -> Error {
        Error::new(code, Category::netdb())
    }

    /// Create an error in the [addrinfo category](Category::addrinfo).
    pub const fn addrinfo(code: i32) -> Error {
        Error::new(code, Category::addrinfo())
    }

    /// Create an error in the [misc category](Category::misc).
    pub const fn misc(code: i32) -> Error {
        Error::new(code, Category::misc())
    }

    /// Returns the last error of the OS for the calling thread.
    ///
    /// Uses `errno` on Unix and `WSAGetLastError` on Windows.
    pub fn last_os_error() -> Error {
        Error::system(sys::error::last_error())
    }

    /// Returns the numeric code.
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Returns the category.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Returns true if this represent "no error".
    pub const fn is_none(&self) -> bool {
        self.code == 0
    }

    /// Returns the description of the error.
    pub fn message(&self) -> String {
        self.category.message(self.code)
    }

    /// Returns the class of the error.
    pub fn class(&self) -> ErrorClass {
        if self.is_none() {
            ErrorClass::None
        } else if *self == Error::INTERRUPTED {
            ErrorClass::Interrupted
        } else if *self == Error::WOULD_BLOCK || *self == Error::TRY_AGAIN {
            ErrorClass::WouldBlock
        } else if self.is_resolver() {
            ErrorClass::Resolver
        } else if RESOURCE.contains(self) {
            ErrorClass::Resource
        } else if PEER.contains(self) {
            ErrorClass::Peer
        } else if TERMINATION.contains(self) {
            ErrorClass::Termination
        } else if USAGE.contains(self) {
            ErrorClass::Usage
        } else {
            ErrorClass::Other
        }
    }

    /// Returns true if retrying the operation later could succeed.
    ///
    /// This is true for [`Error::INTERRUPTED`], [`Error::WOULD_BLOCK`],
    /// [`Error::TRY_AGAIN`] and [`Error::HOST_NOT_FOUND_TRY_AGAIN`].
    pub fn is_transient(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Interrupted | ErrorClass::WouldBlock
        ) || *self == Error::HOST_NOT_FOUND_TRY_AGAIN
    }

    fn is_resolver(&self) -> bool {
        match self.category {
            #[cfg(not(windows))]
            Category::Netdb | Category::Addrinfo => true,
            _ => RESOLVER.contains(self),
        }
    }

    /// Returns the [`io::ErrorKind`] that matches this error best.
    pub fn kind(&self) -> io::ErrorKind {
        if *self == Error::HOST_NOT_FOUND
            || *self == Error::NO_DATA
            || *self == Error::SERVICE_NOT_FOUND
            || *self == Error::NOT_FOUND
        {
            io::ErrorKind::NotFound
        } else if *self == Error::SOCKET_TYPE_NOT_SUPPORTED {
            io::ErrorKind::Unsupported
        } else if *self == Error::EOF {
            io::ErrorKind::UnexpectedEof
        } else if *self == Error::ALREADY_OPEN {
            io::ErrorKind::AlreadyExists
        } else if *self == Error::FD_SET_FAILURE {
            io::ErrorKind::InvalidInput
        } else {
            match self.category {
                Category::System => io::Error::from_raw_os_error(self.code).kind(),
                _ => io::ErrorKind::Other,
            }
        }
    }
}

// NOTE: `Error::class` depends on the ordering of the checks, these lists are
// not disjoint on all platforms.
const RESOURCE: [Error; 3] = [Error::NO_DESCRIPTORS, Error::NO_BUFFER_SPACE, Error::NO_MEMORY];
const PEER: [Error; 8] = [
    Error::CONNECTION_REFUSED,
    Error::CONNECTION_RESET,
    Error::CONNECTION_ABORTED,
    Error::HOST_UNREACHABLE,
    Error::NETWORK_UNREACHABLE,
    Error::NETWORK_DOWN,
    Error::NETWORK_RESET,
    Error::TIMED_OUT,
];
const TERMINATION: [Error; 3] = [Error::EOF, Error::SHUT_DOWN, Error::BROKEN_PIPE];
const USAGE: [Error; 12] = [
    Error::INVALID_ARGUMENT,
    Error::ADDRESS_FAMILY_NOT_SUPPORTED,
    Error::ADDRESS_IN_USE,
    Error::ALREADY_CONNECTED,
    Error::ALREADY_STARTED,
    Error::IN_PROGRESS,
    Error::NOT_CONNECTED,
    Error::NOT_SOCKET,
    Error::BAD_DESCRIPTOR,
    Error::NO_PROTOCOL_OPTION,
    Error::OPERATION_NOT_SUPPORTED,
    Error::MESSAGE_SIZE,
];
const RESOLVER: [Error; 6] = [
    Error::HOST_NOT_FOUND,
    Error::HOST_NOT_FOUND_TRY_AGAIN,
    Error::NO_DATA,
    Error::NO_RECOVERY,
    Error::SERVICE_NOT_FOUND,
    Error::SOCKET_TYPE_NOT_SUPPORTED,
];

/// Coarse classification of an [`Error`].
///
/// See [`Error::class`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum ErrorClass {
    /// Not an error.
    None,
    /// Interrupted by a signal. Never returned by the operations in this
    /// crate.
    Interrupted,
    /// Non-blocking socket isn't ready for the operation.
    WouldBlock,
    /// Out of descriptors, buffer space or memory.
    Resource,
    /// Error caused by the peer or the network between us and the peer, e.g.
    /// connection refused or reset.
    Peer,
    /// Invalid use of the API, e.g. an invalid argument or an operation on a
    /// socket in the wrong state.
    Usage,
    /// Name resolution failure.
    Resolver,
    /// Orderly termination, e.g. end of stream on read or writing to a socket
    /// that is shut down.
    Termination,
    /// Any other error.
    Other,
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        (self.code == 0 && other.code == 0)
            || (self.code == other.code && self.category == other.category)
    }
}

impl Eq for Error {}

impl Hash for Error {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        if self.code != 0 {
            self.category.hash(state);
        }
    }
}

impl Default for Error {
    /// Returns the "no error" value.
    fn default() -> Error {
        Error::system(0)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("code", &self.code)
            .field("category", &self.category)
            .field("message", &self.message())
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} error {})",
            self.message(),
            self.category.name(),
            self.code
        )
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err.category {
            Category::System => io::Error::from_raw_os_error(err.code),
            _ => io::Error::new(err.kind(), err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        if let Some(code) = err.raw_os_error() {
            return Error::system(code);
        }
        if let Some(err) = err.get_ref().and_then(|err| err.downcast_ref::<Error>()) {
            return *err;
        }
        match err.kind() {
            io::ErrorKind::NotFound => Error::NOT_FOUND,
            io::ErrorKind::UnexpectedEof => Error::EOF,
            io::ErrorKind::AlreadyExists => Error::ALREADY_OPEN,
            io::ErrorKind::WouldBlock => Error::WOULD_BLOCK,
            io::ErrorKind::Interrupted => Error::INTERRUPTED,
            io::ErrorKind::PermissionDenied => Error::ACCESS_DENIED,
            io::ErrorKind::ConnectionRefused => Error::CONNECTION_REFUSED,
            io::ErrorKind::ConnectionReset => Error::CONNECTION_RESET,
            io::ErrorKind::ConnectionAborted => Error::CONNECTION_ABORTED,
            io::ErrorKind::NotConnected => Error::NOT_CONNECTED,
            io::ErrorKind::AddrInUse => Error::ADDRESS_IN_USE,
            io::ErrorKind::BrokenPipe => Error::BROKEN_PIPE,
            io::ErrorKind::TimedOut => Error::TIMED_OUT,
            io::ErrorKind::OutOfMemory => Error::NO_MEMORY,
            io::ErrorKind::Unsupported => Error::OPERATION_NOT_SUPPORTED,
            io::ErrorKind::InvalidInput => Error::INVALID_ARGUMENT,
            _ => Error::OTHER,
        }
    }
}
