use std::ffi::CStr;
use std::io;

use crate::error::Category;
use crate::Error;

pub(crate) const NETDB_CATEGORY: Category = Category::Netdb;
pub(crate) const ADDRINFO_CATEGORY: Category = Category::Addrinfo;

pub(crate) const ACCESS_DENIED: i32 = libc::EACCES;
pub(crate) const ADDRESS_FAMILY_NOT_SUPPORTED: i32 = libc::EAFNOSUPPORT;
pub(crate) const ADDRESS_IN_USE: i32 = libc::EADDRINUSE;
pub(crate) const ALREADY_CONNECTED: i32 = libc::EISCONN;
pub(crate) const ALREADY_STARTED: i32 = libc::EALREADY;
pub(crate) const BROKEN_PIPE: i32 = libc::EPIPE;
pub(crate) const CONNECTION_ABORTED: i32 = libc::ECONNABORTED;
pub(crate) const CONNECTION_REFUSED: i32 = libc::ECONNREFUSED;
pub(crate) const CONNECTION_RESET: i32 = libc::ECONNRESET;
pub(crate) const BAD_DESCRIPTOR: i32 = libc::EBADF;
pub(crate) const FAULT: i32 = libc::EFAULT;
pub(crate) const HOST_UNREACHABLE: i32 = libc::EHOSTUNREACH;
pub(crate) const IN_PROGRESS: i32 = libc::EINPROGRESS;
pub(crate) const INTERRUPTED: i32 = libc::EINTR;
pub(crate) const INVALID_ARGUMENT: i32 = libc::EINVAL;
pub(crate) const MESSAGE_SIZE: i32 = libc::EMSGSIZE;
pub(crate) const NAME_TOO_LONG: i32 = libc::ENAMETOOLONG;
pub(crate) const NETWORK_DOWN: i32 = libc::ENETDOWN;
pub(crate) const NETWORK_RESET: i32 = libc::ENETRESET;
pub(crate) const NETWORK_UNREACHABLE: i32 = libc::ENETUNREACH;
pub(crate) const NO_DESCRIPTORS: i32 = libc::EMFILE;
pub(crate) const NO_BUFFER_SPACE: i32 = libc::ENOBUFS;
pub(crate) const NO_MEMORY: i32 = libc::ENOMEM;
pub(crate) const NO_PERMISSION: i32 = libc::EPERM;
pub(crate) const NO_PROTOCOL_OPTION: i32 = libc::ENOPROTOOPT;
pub(crate) const NO_SUCH_DEVICE: i32 = libc::ENODEV;
pub(crate) const NOT_CONNECTED: i32 = libc::ENOTCONN;
pub(crate) const NOT_SOCKET: i32 = libc::ENOTSOCK;
pub(crate) const OPERATION_ABORTED: i32 = libc::ECANCELED;
pub(crate) const OPERATION_NOT_SUPPORTED: i32 = libc::EOPNOTSUPP;
pub(crate) const SHUT_DOWN: i32 = libc::ESHUTDOWN;
pub(crate) const TIMED_OUT: i32 = libc::ETIMEDOUT;
pub(crate) const TRY_AGAIN: i32 = libc::EAGAIN;
pub(crate) const WOULD_BLOCK: i32 = libc::EWOULDBLOCK;

// Values of `h_errno` from `netdb.h`, identical on all Unix-like systems.
pub(crate) const HOST_NOT_FOUND: i32 = 1;
pub(crate) const HOST_NOT_FOUND_TRY_AGAIN: i32 = 2;
pub(crate) const NO_RECOVERY: i32 = 3;
pub(crate) const NO_DATA: i32 = 4;

pub(crate) const SERVICE_NOT_FOUND: i32 = libc::EAI_SERVICE;
pub(crate) const SOCKET_TYPE_NOT_SUPPORTED: i32 = libc::EAI_SOCKTYPE;

pub(crate) fn last_error() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

pub(crate) fn system_message(code: i32) -> String {
    io::Error::from_raw_os_error(code)
        .to_string()
        .split(" (os error")
        .next()
        .unwrap_or_default()
        .to_owned()
}

pub(crate) fn addrinfo_message(code: i32) -> String {
    // SAFETY: `gai_strerror` returns a pointer to a static string.
    let msg = unsafe { CStr::from_ptr(libc::gai_strerror(code)) };
    msg.to_string_lossy().into_owned()
}

/// Translate an error returned by `getaddrinfo(3)` or `getnameinfo(3)`.
///
/// Codes that have an equivalent in the system or netdb categories are
/// mapped to it, all others are returned in the addrinfo category unmodified.
pub(crate) fn translate_addrinfo_error(code: i32) -> Error {
    match code {
        0 => Error::default(),
        libc::EAI_AGAIN => Error::HOST_NOT_FOUND_TRY_AGAIN,
        libc::EAI_BADFLAGS => Error::INVALID_ARGUMENT,
        libc::EAI_FAIL => Error::NO_RECOVERY,
        libc::EAI_FAMILY => Error::ADDRESS_FAMILY_NOT_SUPPORTED,
        libc::EAI_MEMORY => Error::NO_MEMORY,
        libc::EAI_NONAME => Error::HOST_NOT_FOUND,
        libc::EAI_SYSTEM => Error::last_os_error(),
        code => Error::addrinfo(code),
    }
}
