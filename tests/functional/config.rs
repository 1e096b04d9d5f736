use sockops::net::{Domain, Protocol, Type};
use sockops::{Config, Error, Socket};

use crate::util::{expect_error, init, is_send, is_sync};

#[test]
fn config_is_send_and_sync() {
    is_send::<Config>();
    is_sync::<Config>();
}

#[test]
fn config_protocol() {
    init();
    let socket = Socket::config(Domain::IPV4, Type::DGRAM)
        .with_protocol(Protocol::UDP)
        .open()
        .unwrap();
    let ty = socket.socket_option::<sockops::net::option::Type>().unwrap();
    assert_eq!(ty, Type::DGRAM);
}

#[test]
fn config_nonblocking() {
    init();
    let socket = Socket::config(Domain::IPV4, Type::DGRAM)
        .with_nonblocking(true)
        .open()
        .unwrap();
    let mut buf = [0; 8];
    expect_error(socket.recv(&mut buf, None), Error::WOULD_BLOCK);
}

#[test]
#[cfg(unix)]
fn config_close_on_exec() {
    use std::os::fd::AsRawFd;

    init();
    let socket = Socket::config(Domain::IPV4, Type::STREAM).open().unwrap();
    let flags = unsafe { libc::fcntl(socket.as_raw_fd(), libc::F_GETFD) };
    assert!(flags & libc::FD_CLOEXEC != 0);

    let socket = Socket::config(Domain::IPV4, Type::STREAM)
        .with_close_on_exec(false)
        .open()
        .unwrap();
    let flags = unsafe { libc::fcntl(socket.as_raw_fd(), libc::F_GETFD) };
    assert!(flags & libc::FD_CLOEXEC == 0);
}

#[test]
#[cfg(unix)]
fn config_nonblocking_flag() {
    use std::os::fd::AsRawFd;

    init();
    let socket = Socket::config(Domain::IPV4, Type::STREAM)
        .with_nonblocking(true)
        .open()
        .unwrap();
    let flags = unsafe { libc::fcntl(socket.as_raw_fd(), libc::F_GETFL) };
    assert!(flags & libc::O_NONBLOCK != 0);

    socket.set_nonblocking(false).unwrap();
    let flags = unsafe { libc::fcntl(socket.as_raw_fd(), libc::F_GETFL) };
    assert!(flags & libc::O_NONBLOCK == 0);
}
