//! Winsock socket calls.

use std::ffi::c_void;
use std::io::{IoSlice, IoSliceMut};
use std::mem::zeroed;
use std::net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddrV4, SocketAddrV6};
use std::ptr;

use windows_sys::Win32::Networking::WinSock::{
    self as native, INVALID_SOCKET, WSABUF, WSAPROTOCOL_INFOW, WSA_FLAG_NO_HANDLE_INHERIT,
    WSA_FLAG_OVERLAPPED,
};
use windows_sys::Win32::System::Threading::GetCurrentProcessId;

use crate::net::AddressStorage;
use crate::windows::{init, sockaddr_in, sockaddr_in6, RawSocket};
use crate::{Config, Error, Result};

/// Winsock never raises signals, nothing to add.
pub(crate) const DEFAULT_SEND_FLAGS: i32 = 0;

/// Largest buffer passed to a single call, Winsock uses `i32` lengths.
const MAX_BUF_LEN: usize = i32::MAX as usize;

pub(crate) fn socket(config: &Config) -> Result<RawSocket> {
    init();
    let mut flags = WSA_FLAG_OVERLAPPED;
    if !config.sys.inherit {
        flags |= WSA_FLAG_NO_HANDLE_INHERIT;
    }
    let raw = syscall!(
        WSASocketW(
            config.domain.0,
            config.r#type.0,
            config.protocol.0,
            ptr::null(),
            0,
            flags,
        ),
        INVALID_SOCKET
    )?;
    if config.nonblocking {
        if let Err(err) = set_nonblocking(raw, true) {
            log::warn!(socket = raw; "failed to set up new socket: {err}");
            if let Err(err) = close(raw) {
                log::warn!(socket = raw; "error closing socket after failed setup: {err}");
            }
            return Err(err);
        }
    }
    Ok(raw)
}

pub(crate) fn close(socket: RawSocket) -> Result<()> {
    syscall!(closesocket(socket)).map(|_| ())
}

pub(crate) fn set_nonblocking(socket: RawSocket, nonblocking: bool) -> Result<()> {
    let mut nonblocking = u32::from(nonblocking);
    syscall!(ioctlsocket(socket, native::FIONBIO, &mut nonblocking)).map(|_| ())
}

pub(crate) fn try_clone(socket: RawSocket) -> Result<RawSocket> {
    // SAFETY: all zeroes is a valid `WSAPROTOCOL_INFOW`.
    let mut info: WSAPROTOCOL_INFOW = unsafe { zeroed() };
    let pid = unsafe { GetCurrentProcessId() };
    syscall!(WSADuplicateSocketW(socket, pid, &mut info))?;
    syscall!(
        WSASocketW(
            info.iAddressFamily,
            info.iSocketType,
            info.iProtocol,
            &info,
            0,
            WSA_FLAG_OVERLAPPED | WSA_FLAG_NO_HANDLE_INHERIT,
        ),
        INVALID_SOCKET
    )
}

pub(crate) fn bind(socket: RawSocket, address: &AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_ptr();
    syscall!(bind(socket, ptr, length)).map(|_| ())
}

pub(crate) fn listen(socket: RawSocket, backlog: i32) -> Result<()> {
    syscall!(listen(socket, backlog)).map(|_| ())
}

pub(crate) fn accept(socket: RawSocket, address: &mut AddressStorage) -> Result<RawSocket> {
    let (ptr, length) = address.as_mut_ptr();
    syscall_retry!(accept(socket, ptr, &mut *length), INVALID_SOCKET)
}

pub(crate) fn connect(socket: RawSocket, address: &AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_ptr();
    syscall!(connect(socket, ptr, length)).map(|_| ())
}

pub(crate) fn send(socket: RawSocket, buf: &[u8], flags: i32) -> Result<usize> {
    let length = buf.len().min(MAX_BUF_LEN) as i32;
    syscall_retry!(send(socket, buf.as_ptr(), length, flags)).map(|n| n as usize)
}

pub(crate) fn recv(socket: RawSocket, buf: &mut [u8], flags: i32) -> Result<usize> {
    let length = buf.len().min(MAX_BUF_LEN) as i32;
    match syscall_retry!(recv(socket, buf.as_mut_ptr(), length, flags)) {
        Ok(n) => Ok(n as usize),
        // Reading from a socket shut down for reading is end of file.
        Err(err) if err == Error::SHUT_DOWN => Ok(0),
        Err(err) => Err(err),
    }
}

pub(crate) fn send_to(
    socket: RawSocket,
    bufs: &[IoSlice<'_>],
    address: &AddressStorage,
    flags: i32,
) -> Result<usize> {
    let (ptr, length) = address.as_ptr();
    let mut sent = 0;
    // `IoSlice` is ABI compatible with `WSABUF`.
    syscall_retry!(WSASendTo(
        socket,
        bufs.as_ptr().cast::<WSABUF>(),
        bufs.len().min(u32::MAX as usize) as u32,
        &mut sent,
        flags as u32,
        ptr,
        length,
        ptr::null_mut(),
        None,
    ))?;
    Ok(sent as usize)
}

pub(crate) fn recv_from(
    socket: RawSocket,
    bufs: &mut [IoSliceMut<'_>],
    address: &mut AddressStorage,
    flags: i32,
) -> Result<usize> {
    let mut received = 0;
    let mut flags = flags as u32;
    let (address_ptr, address_length) = if address.is_none() {
        (ptr::null_mut(), ptr::null_mut())
    } else {
        let (ptr, length) = address.as_mut_ptr();
        (ptr, ptr::from_mut(length))
    };
    // `IoSliceMut` is ABI compatible with `WSABUF`.
    let res = syscall_retry!(WSARecvFrom(
        socket,
        bufs.as_mut_ptr().cast::<WSABUF>(),
        bufs.len().min(u32::MAX as usize) as u32,
        &mut received,
        &mut flags,
        address_ptr,
        address_length,
        ptr::null_mut(),
        None,
    ));
    match res {
        Ok(_) => Ok(received as usize),
        Err(err) if err == Error::SHUT_DOWN => Ok(0),
        Err(err) => Err(err),
    }
}

pub(crate) fn shutdown(socket: RawSocket, how: Shutdown) -> Result<()> {
    let how = match how {
        Shutdown::Read => native::SD_RECEIVE,
        Shutdown::Write => native::SD_SEND,
        Shutdown::Both => native::SD_BOTH,
    };
    syscall!(shutdown(socket, how as _)).map(|_| ())
}

/// # Safety
///
/// `value` must be valid for writes of `length` bytes.
pub(crate) unsafe fn get_option(
    socket: RawSocket,
    level: i32,
    opt: i32,
    value: *mut c_void,
    length: &mut u32,
) -> Result<()> {
    let mut len = i32::try_from(*length).map_err(|_| Error::INVALID_ARGUMENT)?;
    syscall!(getsockopt(socket, level, opt, value.cast(), &mut len))?;
    *length = len as u32;
    Ok(())
}

/// # Safety
///
/// `value` must be valid for reads of `length` bytes.
pub(crate) unsafe fn set_option(
    socket: RawSocket,
    level: i32,
    opt: i32,
    value: *const c_void,
    length: u32,
) -> Result<()> {
    let length = i32::try_from(length).map_err(|_| Error::INVALID_ARGUMENT)?;
    syscall!(setsockopt(socket, level, opt, value.cast(), length)).map(|_| ())
}

pub(crate) fn local_addr(socket: RawSocket, address: &mut AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_mut_ptr();
    syscall!(getsockname(socket, ptr, length)).map(|_| ())
}

pub(crate) fn peer_addr(socket: RawSocket, address: &mut AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_mut_ptr();
    syscall!(getpeername(socket, ptr, length)).map(|_| ())
}

pub(crate) fn ipv4_to_raw(address: &SocketAddrV4) -> sockaddr_in {
    // SAFETY: all zeroes is a valid `SOCKADDR_IN`.
    let mut raw: sockaddr_in = unsafe { zeroed() };
    raw.sin_family = native::AF_INET;
    raw.sin_port = address.port().to_be();
    raw.sin_addr.S_un.S_addr = u32::from_ne_bytes(address.ip().octets());
    raw
}

pub(crate) fn ipv4_from_raw(raw: &sockaddr_in) -> SocketAddrV4 {
    // SAFETY: all variants of the union are plain integers.
    let ip = Ipv4Addr::from(unsafe { raw.sin_addr.S_un.S_addr }.to_ne_bytes());
    let port = u16::from_be(raw.sin_port);
    SocketAddrV4::new(ip, port)
}

pub(crate) fn ipv6_to_raw(address: &SocketAddrV6) -> sockaddr_in6 {
    // SAFETY: all zeroes is a valid `SOCKADDR_IN6`.
    let mut raw: sockaddr_in6 = unsafe { zeroed() };
    raw.sin6_family = native::AF_INET6;
    raw.sin6_port = address.port().to_be();
    raw.sin6_flowinfo = address.flowinfo();
    raw.sin6_addr.u.Byte = address.ip().octets();
    raw.Anonymous.sin6_scope_id = address.scope_id();
    raw
}

pub(crate) fn ipv6_from_raw(raw: &sockaddr_in6) -> SocketAddrV6 {
    // SAFETY: all variants of the unions are plain integers.
    let (ip, scope_id) = unsafe { (Ipv6Addr::from(raw.sin6_addr.u.Byte), raw.Anonymous.sin6_scope_id) };
    let port = u16::from_be(raw.sin6_port);
    SocketAddrV6::new(ip, port, raw.sin6_flowinfo, scope_id)
}
