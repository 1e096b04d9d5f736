//! Unix socket system calls.

use std::ffi::c_void;
use std::io::{IoSlice, IoSliceMut};
use std::net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddrV4, SocketAddrV6};

use crate::net::AddressStorage;
use crate::unix::{sockaddr_in, sockaddr_in6, MsgHeader, RawSocket};
use crate::{Config, Error, Result};

/// Flags always passed when sending, prevents the process being killed by
/// `SIGPIPE` when writing to a closed connection.
#[cfg(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
))]
pub(crate) const DEFAULT_SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;

#[cfg(not(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
pub(crate) const DEFAULT_SEND_FLAGS: libc::c_int = 0;

#[cfg(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
))]
pub(crate) fn socket(config: &Config) -> Result<RawSocket> {
    let mut r#type = config.r#type.0;
    if config.sys.close_on_exec {
        r#type |= libc::SOCK_CLOEXEC;
    }
    if config.nonblocking {
        r#type |= libc::SOCK_NONBLOCK;
    }
    syscall!(socket(config.domain.0, r#type, config.protocol.0))
}

#[cfg(not(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
pub(crate) fn socket(config: &Config) -> Result<RawSocket> {
    let raw = syscall!(socket(config.domain.0, config.r#type.0, config.protocol.0))?;
    match setup_socket(raw, config) {
        Ok(()) => Ok(raw),
        Err(err) => Err(close_after_failed_setup(raw, err)),
    }
}

#[cfg(not(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
fn setup_socket(fd: RawSocket, config: &Config) -> Result<()> {
    if config.sys.close_on_exec {
        syscall!(fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC))?;
    }
    if config.nonblocking {
        set_nonblocking(fd, true)?;
    }
    #[cfg(any(
        target_os = "ios",
        target_os = "macos",
        target_os = "tvos",
        target_os = "visionos",
        target_os = "watchos",
    ))]
    {
        let enable: libc::c_int = 1;
        // SAFETY: `enable` is a valid `c_int`.
        unsafe {
            set_option(
                fd,
                libc::SOL_SOCKET,
                libc::SO_NOSIGPIPE,
                std::ptr::from_ref(&enable).cast(),
                size_of::<libc::c_int>() as u32,
            )?;
        }
    }
    Ok(())
}

/// Close `fd` after setting up a new socket failed with `err`, returns `err`.
#[cfg(not(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
fn close_after_failed_setup(fd: RawSocket, err: Error) -> Error {
    log::warn!(fd = fd; "failed to set up new socket: {err}");
    if let Err(err) = close(fd) {
        log::warn!(fd = fd; "error closing socket after failed setup: {err}");
    }
    err
}

pub(crate) fn close(fd: RawSocket) -> Result<()> {
    match syscall!(close(fd)) {
        Ok(_) => Ok(()),
        // The descriptor is always released, even if interrupted, retrying
        // could close a descriptor reused by another thread.
        Err(err) if err == Error::INTERRUPTED => Ok(()),
        Err(err) => Err(err),
    }
}

pub(crate) fn set_nonblocking(fd: RawSocket, nonblocking: bool) -> Result<()> {
    let flags = syscall!(fcntl(fd, libc::F_GETFL))?;
    let new_flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };
    if new_flags != flags {
        syscall!(fcntl(fd, libc::F_SETFL, new_flags))?;
    }
    Ok(())
}

pub(crate) fn try_clone(fd: RawSocket) -> Result<RawSocket> {
    syscall!(fcntl(fd, libc::F_DUPFD_CLOEXEC, 0))
}

pub(crate) fn bind(fd: RawSocket, address: &AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_ptr();
    syscall!(bind(fd, ptr, length)).map(|_| ())
}

pub(crate) fn listen(fd: RawSocket, backlog: i32) -> Result<()> {
    syscall!(listen(fd, backlog)).map(|_| ())
}

#[cfg(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
))]
pub(crate) fn accept(fd: RawSocket, address: &mut AddressStorage) -> Result<RawSocket> {
    let (ptr, length) = address.as_mut_ptr();
    syscall_retry!(accept4(fd, ptr, &mut *length, libc::SOCK_CLOEXEC))
}

#[cfg(not(any(
    target_os = "android",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "illumos",
    target_os = "linux",
    target_os = "netbsd",
    target_os = "openbsd",
)))]
pub(crate) fn accept(fd: RawSocket, address: &mut AddressStorage) -> Result<RawSocket> {
    let (ptr, length) = address.as_mut_ptr();
    let raw = syscall_retry!(accept(fd, ptr, &mut *length))?;
    match syscall!(fcntl(raw, libc::F_SETFD, libc::FD_CLOEXEC)) {
        Ok(_) => Ok(raw),
        Err(err) => Err(close_after_failed_setup(raw, err)),
    }
}

pub(crate) fn connect(fd: RawSocket, address: &AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_ptr();
    match syscall!(connect(fd, ptr, length)) {
        Ok(_) => Ok(()),
        // The connection continues in the background after a signal, calling
        // `connect(2)` again returns `EALREADY`, so we wait for it to complete
        // instead.
        Err(err) if err == Error::INTERRUPTED => {
            log::trace!(fd = fd; "waiting for interrupted connect(2) to complete");
            wait_connected(fd)
        }
        Err(err) => Err(err),
    }
}

fn wait_connected(fd: RawSocket) -> Result<()> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        match syscall!(poll(&mut pollfd, 1, -1)) {
            Ok(_) => break,
            Err(err) if err == Error::INTERRUPTED => continue,
            Err(err) => return Err(err),
        }
    }
    let mut code: libc::c_int = 0;
    let mut length = size_of::<libc::c_int>() as u32;
    // SAFETY: `code` is a valid `c_int`.
    unsafe {
        get_option(
            fd,
            libc::SOL_SOCKET,
            libc::SO_ERROR,
            std::ptr::from_mut(&mut code).cast(),
            &mut length,
        )?;
    }
    match code {
        0 => Ok(()),
        code => Err(Error::system(code)),
    }
}

pub(crate) fn send(fd: RawSocket, buf: &[u8], flags: libc::c_int) -> Result<usize> {
    syscall_retry!(send(fd, buf.as_ptr().cast(), buf.len(), flags)).map(|n| n as usize)
}

pub(crate) fn recv(fd: RawSocket, buf: &mut [u8], flags: libc::c_int) -> Result<usize> {
    syscall_retry!(recv(fd, buf.as_mut_ptr().cast(), buf.len(), flags)).map(|n| n as usize)
}

pub(crate) fn send_to(
    fd: RawSocket,
    bufs: &[IoSlice<'_>],
    address: &AddressStorage,
    flags: libc::c_int,
) -> Result<usize> {
    send_msg(fd, bufs, address, &[], flags)
}

pub(crate) fn recv_from(
    fd: RawSocket,
    bufs: &mut [IoSliceMut<'_>],
    address: &mut AddressStorage,
    flags: libc::c_int,
) -> Result<usize> {
    recv_msg(fd, bufs, address, &mut [], flags).map(|(n, _, _)| n)
}

pub(crate) fn send_msg(
    fd: RawSocket,
    bufs: &[IoSlice<'_>],
    address: &AddressStorage,
    control: &[u8],
    flags: libc::c_int,
) -> Result<usize> {
    let mut msg = MsgHeader::empty();
    // SAFETY: `address`, `bufs` and `control` outlive `msg`.
    unsafe { msg.init_send(address.as_ptr(), bufs, control)? };
    syscall_retry!(sendmsg(fd, msg.as_ptr(), flags)).map(|n| n as usize)
}

/// Returns the number of bytes read, the length of the control message and
/// the returned flags.
pub(crate) fn recv_msg(
    fd: RawSocket,
    bufs: &mut [IoSliceMut<'_>],
    address: &mut AddressStorage,
    control: &mut [u8],
    flags: libc::c_int,
) -> Result<(usize, usize, libc::c_int)> {
    let mut msg = MsgHeader::empty();
    let (address_ptr, address_length) = if address.is_none() {
        (std::ptr::null_mut(), 0)
    } else {
        let (ptr, length) = address.as_mut_ptr();
        (ptr, *length)
    };
    // SAFETY: `address`, `bufs` and `control` outlive `msg`.
    unsafe { msg.init_recv((address_ptr, address_length), bufs, control)? };
    let n = syscall_retry!(recvmsg(fd, msg.as_mut_ptr(), flags))?;
    if !address.is_none() {
        let (_, length) = address.as_mut_ptr();
        *length = msg.address_len();
    }
    Ok((n as usize, msg.control_len(), msg.flags()))
}

pub(crate) fn shutdown(fd: RawSocket, how: Shutdown) -> Result<()> {
    let how = match how {
        Shutdown::Read => libc::SHUT_RD,
        Shutdown::Write => libc::SHUT_WR,
        Shutdown::Both => libc::SHUT_RDWR,
    };
    syscall!(shutdown(fd, how)).map(|_| ())
}

/// # Safety
///
/// `value` must be valid for writes of `length` bytes.
pub(crate) unsafe fn get_option(
    fd: RawSocket,
    level: libc::c_int,
    opt: libc::c_int,
    value: *mut c_void,
    length: &mut u32,
) -> Result<()> {
    syscall!(getsockopt(fd, level, opt, value, length)).map(|_| ())
}

/// # Safety
///
/// `value` must be valid for reads of `length` bytes.
pub(crate) unsafe fn set_option(
    fd: RawSocket,
    level: libc::c_int,
    opt: libc::c_int,
    value: *const c_void,
    length: u32,
) -> Result<()> {
    syscall!(setsockopt(fd, level, opt, value, length)).map(|_| ())
}

pub(crate) fn local_addr(fd: RawSocket, address: &mut AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_mut_ptr();
    syscall!(getsockname(fd, ptr, length)).map(|_| ())
}

pub(crate) fn peer_addr(fd: RawSocket, address: &mut AddressStorage) -> Result<()> {
    let (ptr, length) = address.as_mut_ptr();
    syscall!(getpeername(fd, ptr, length)).map(|_| ())
}

pub(crate) fn ipv4_to_raw(address: &SocketAddrV4) -> sockaddr_in {
    // SAFETY: all zeroes is a valid `sockaddr_in`, this also zeroes fields
    // not present on all platforms, e.g. `sin_len`.
    let mut raw: sockaddr_in = unsafe { std::mem::zeroed() };
    raw.sin_family = libc::AF_INET as libc::sa_family_t;
    raw.sin_port = address.port().to_be();
    raw.sin_addr = libc::in_addr {
        s_addr: u32::from_ne_bytes(address.ip().octets()),
    };
    raw
}

pub(crate) fn ipv4_from_raw(raw: &sockaddr_in) -> SocketAddrV4 {
    let ip = Ipv4Addr::from(raw.sin_addr.s_addr.to_ne_bytes());
    let port = u16::from_be(raw.sin_port);
    SocketAddrV4::new(ip, port)
}

pub(crate) fn ipv6_to_raw(address: &SocketAddrV6) -> sockaddr_in6 {
    // SAFETY: all zeroes is a valid `sockaddr_in6`.
    let mut raw: sockaddr_in6 = unsafe { std::mem::zeroed() };
    raw.sin6_family = libc::AF_INET6 as libc::sa_family_t;
    raw.sin6_port = address.port().to_be();
    raw.sin6_flowinfo = address.flowinfo();
    raw.sin6_addr = libc::in6_addr {
        s6_addr: address.ip().octets(),
    };
    raw.sin6_scope_id = address.scope_id();
    raw
}

pub(crate) fn ipv6_from_raw(raw: &sockaddr_in6) -> SocketAddrV6 {
    let ip = Ipv6Addr::from(raw.sin6_addr.s6_addr);
    let port = u16::from_be(raw.sin6_port);
    SocketAddrV6::new(ip, port, raw.sin6_flowinfo, raw.sin6_scope_id)
}
