//! Windows implementation, using Winsock.

use std::mem::zeroed;
use std::sync::Once;

use windows_sys::Win32::Networking::WinSock::{WSAStartup, WSADATA};

/// Helper macro to execute a Winsock function that returns `$err` (defaults
/// to `SOCKET_ERROR`) on error.
macro_rules! syscall {
    ($fn: ident ( $($arg: expr),* $(,)? ), $err: expr) => {{
        let res = unsafe { windows_sys::Win32::Networking::WinSock::$fn($( $arg, )*) };
        if res == $err {
            Err($crate::Error::last_os_error())
        } else {
            Ok(res)
        }
    }};
    ($fn: ident ( $($arg: expr),* $(,)? ) ) => {{
        syscall!($fn($( $arg ),*), windows_sys::Win32::Networking::WinSock::SOCKET_ERROR)
    }};
}

/// Same as [`syscall!`], but retries the call if it's interrupted.
macro_rules! syscall_retry {
    ($fn: ident ( $($arg: expr),* $(,)? ) $(, $err: expr)? ) => {{
        loop {
            match syscall!($fn($( $arg ),*) $(, $err)?) {
                Err(err) if err == $crate::Error::INTERRUPTED => {
                    log::trace!("retrying {} after interruption", stringify!($fn));
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

pub(crate) use windows_sys::Win32::Networking::WinSock as native;
pub(crate) use windows_sys::Win32::Networking::WinSock::{
    AF_INET, AF_INET6, SOCKADDR as sockaddr, SOCKADDR_IN as sockaddr_in,
    SOCKADDR_IN6 as sockaddr_in6, SOCKADDR_STORAGE as sockaddr_storage,
};

#[allow(non_camel_case_types)]
pub(crate) type socklen_t = i32;

pub(crate) type RawSocket = windows_sys::Win32::Networking::WinSock::SOCKET;

/// Initialise Winsock, once per process.
///
/// Errors are not returned, all following calls return
/// `WSANOTINITIALISED` instead.
pub(crate) fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // SAFETY: all zeroes is valid for `WSADATA`.
        let mut data: WSADATA = unsafe { zeroed() };
        // Version 2.2.
        let res = unsafe { WSAStartup(0x202, &mut data) };
        if res != 0 {
            log::warn!(code = res; "failed to initialise Winsock");
        } else {
            log::debug!(version = data.wVersion; "initialised Winsock");
        }
    });
}
