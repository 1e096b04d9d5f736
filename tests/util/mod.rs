//! Test utilities.

#![allow(dead_code, unused_imports, unused_macros)] // Not all tests use all code here.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Once;

use sockops::net::{socket, Domain, Protocol, Type};
use sockops::{Error, Socket};

/// Initialise logging.
pub(crate) fn init() {
    static START: Once = Once::new();
    START.call_once(|| {
        std_logger::Config::logfmt().with_call_location(true).init();
    });
}

pub(crate) fn is_sync<T: Sync>() {}
pub(crate) fn is_send<T: Send>() {}

/// Expect `result` to contain `expected` error.
#[track_caller]
pub(crate) fn expect_error<T: fmt::Debug>(result: Result<T, Error>, expected: Error) {
    match result {
        Ok(value) => panic!("unexpected ok result, value: {value:?}"),
        Err(err) if err == expected => {}
        Err(err) => panic!("unexpected error result, error: {err:?}, expected: {expected:?}"),
    }
}

/// Expect `result` to contain any of the `expected` errors.
#[track_caller]
pub(crate) fn expect_error_in<T: fmt::Debug>(result: Result<T, Error>, expected: &[Error]) {
    match result {
        Ok(value) => panic!("unexpected ok result, value: {value:?}"),
        Err(err) if expected.contains(&err) => {}
        Err(err) => panic!("unexpected error result, error: {err:?}, expected: {expected:?}"),
    }
}

/// IPv4 localhost with port 0, letting the OS pick a port.
pub(crate) const fn any_local_ipv4() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)
}

/// Create an IPv4, TCP socket.
pub(crate) fn tcp_ipv4_socket() -> Socket {
    init();
    socket(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).expect("failed to create socket")
}

/// Create an IPv4, UDP socket.
pub(crate) fn udp_ipv4_socket() -> Socket {
    init();
    socket(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP)).expect("failed to create socket")
}

/// Bind `socket` to a local IPv4 address with a random port and start
/// listening on it. Returns the bound address.
pub(crate) fn bind_and_listen_ipv4(socket: &Socket) -> SocketAddrV4 {
    let address = bind_ipv4(socket);
    socket.listen(128).expect("failed to listen on socket");
    address
}

/// Bind `socket` to a local IPv4 address with a random port. Returns the
/// bound address.
pub(crate) fn bind_ipv4(socket: &Socket) -> SocketAddrV4 {
    socket
        .bind(any_local_ipv4())
        .expect("failed to bind socket");
    socket
        .local_addr()
        .expect("failed to get socket address")
}

/// Returns a connected TCP pair: (client, server side of the connection).
pub(crate) fn connected_pair() -> (Socket, Socket) {
    let listener = tcp_ipv4_socket();
    let address = bind_and_listen_ipv4(&listener);

    let client = tcp_ipv4_socket();
    client.connect(address).expect("failed to connect");
    let (server, peer): (Socket, SocketAddrV4) = listener.accept().expect("failed to accept");
    assert_eq!(peer, client.local_addr::<SocketAddrV4>().unwrap());
    (client, server)
}
