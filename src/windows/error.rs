use std::ptr;
use std::slice;

use windows_sys::Win32::Foundation::{
    LocalFree, ERROR_ACCESS_DENIED, ERROR_BAD_UNIT, ERROR_BROKEN_PIPE, ERROR_OPERATION_ABORTED,
    ERROR_OUTOFMEMORY, ERROR_RETRY,
};
use windows_sys::Win32::Networking::WinSock::*;
use windows_sys::Win32::System::Diagnostics::Debug::{
    FormatMessageW, FORMAT_MESSAGE_ALLOCATE_BUFFER, FORMAT_MESSAGE_FROM_SYSTEM,
    FORMAT_MESSAGE_IGNORE_INSERTS,
};

use crate::error::Category;
use crate::release::{OsOwned, Release};
use crate::Error;

// Winsock reports resolver errors as regular system errors.
pub(crate) const NETDB_CATEGORY: Category = Category::System;
pub(crate) const ADDRINFO_CATEGORY: Category = Category::System;

pub(crate) const ACCESS_DENIED: i32 = WSAEACCES;
pub(crate) const ADDRESS_FAMILY_NOT_SUPPORTED: i32 = WSAEAFNOSUPPORT;
pub(crate) const ADDRESS_IN_USE: i32 = WSAEADDRINUSE;
pub(crate) const ALREADY_CONNECTED: i32 = WSAEISCONN;
pub(crate) const ALREADY_STARTED: i32 = WSAEALREADY;
pub(crate) const BROKEN_PIPE: i32 = ERROR_BROKEN_PIPE as i32;
pub(crate) const CONNECTION_ABORTED: i32 = WSAECONNABORTED;
pub(crate) const CONNECTION_REFUSED: i32 = WSAECONNREFUSED;
pub(crate) const CONNECTION_RESET: i32 = WSAECONNRESET;
pub(crate) const BAD_DESCRIPTOR: i32 = WSAEBADF;
pub(crate) const FAULT: i32 = WSAEFAULT;
pub(crate) const HOST_UNREACHABLE: i32 = WSAEHOSTUNREACH;
pub(crate) const IN_PROGRESS: i32 = WSAEINPROGRESS;
pub(crate) const INTERRUPTED: i32 = WSAEINTR;
pub(crate) const INVALID_ARGUMENT: i32 = WSAEINVAL;
pub(crate) const MESSAGE_SIZE: i32 = WSAEMSGSIZE;
pub(crate) const NAME_TOO_LONG: i32 = WSAENAMETOOLONG;
pub(crate) const NETWORK_DOWN: i32 = WSAENETDOWN;
pub(crate) const NETWORK_RESET: i32 = WSAENETRESET;
pub(crate) const NETWORK_UNREACHABLE: i32 = WSAENETUNREACH;
pub(crate) const NO_DESCRIPTORS: i32 = WSAEMFILE;
pub(crate) const NO_BUFFER_SPACE: i32 = WSAENOBUFS;
pub(crate) const NO_MEMORY: i32 = ERROR_OUTOFMEMORY as i32;
pub(crate) const NO_PERMISSION: i32 = ERROR_ACCESS_DENIED as i32;
pub(crate) const NO_PROTOCOL_OPTION: i32 = WSAENOPROTOOPT;
pub(crate) const NO_SUCH_DEVICE: i32 = ERROR_BAD_UNIT as i32;
pub(crate) const NOT_CONNECTED: i32 = WSAENOTCONN;
pub(crate) const NOT_SOCKET: i32 = WSAENOTSOCK;
pub(crate) const OPERATION_ABORTED: i32 = ERROR_OPERATION_ABORTED as i32;
pub(crate) const OPERATION_NOT_SUPPORTED: i32 = WSAEOPNOTSUPP;
pub(crate) const SHUT_DOWN: i32 = WSAESHUTDOWN;
pub(crate) const TIMED_OUT: i32 = WSAETIMEDOUT;
pub(crate) const TRY_AGAIN: i32 = ERROR_RETRY as i32;
pub(crate) const WOULD_BLOCK: i32 = WSAEWOULDBLOCK;

pub(crate) const HOST_NOT_FOUND: i32 = WSAHOST_NOT_FOUND;
pub(crate) const HOST_NOT_FOUND_TRY_AGAIN: i32 = WSATRY_AGAIN;
pub(crate) const NO_RECOVERY: i32 = WSANO_RECOVERY;
pub(crate) const NO_DATA: i32 = WSANO_DATA;

pub(crate) const SERVICE_NOT_FOUND: i32 = WSATYPE_NOT_FOUND;
pub(crate) const SOCKET_TYPE_NOT_SUPPORTED: i32 = WSAESOCKTNOSUPPORT;

pub(crate) fn last_error() -> i32 {
    unsafe { WSAGetLastError() }
}

/// Wide string allocated by `FormatMessageW`, freed using `LocalFree`.
unsafe impl Release for u16 {
    unsafe fn release(ptr: *mut Self) {
        LocalFree(ptr as _);
    }
}

pub(crate) fn system_message(code: i32) -> String {
    let mut buf: *mut u16 = ptr::null_mut();
    // With `FORMAT_MESSAGE_ALLOCATE_BUFFER` the buffer argument is a pointer
    // to the pointer to allocate.
    let length = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_ALLOCATE_BUFFER | FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            ptr::null(),
            code as u32,
            0,
            ptr::from_mut(&mut buf).cast(),
            0,
            ptr::null(),
        )
    };
    // SAFETY: on success `FormatMessageW` allocated `buf` for us.
    let Some(buf) = (unsafe { OsOwned::from_raw(buf) }) else {
        return format!("unknown error {code}");
    };
    if length == 0 {
        return format!("unknown error {code}");
    }
    // SAFETY: `FormatMessageW` wrote `length` characters.
    let msg = unsafe { slice::from_raw_parts(buf.as_ptr().cast_const(), length as usize) };
    String::from_utf16_lossy(msg).trim_end().to_owned()
}

/// Translate an error returned by `getaddrinfo` or `getnameinfo`.
///
/// Winsock returns the same codes as `WSAGetLastError`, so these are all
/// system errors.
pub(crate) fn translate_addrinfo_error(code: i32) -> Error {
    match code {
        0 => Error::default(),
        code => Error::system(code),
    }
}
