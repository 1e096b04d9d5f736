use sockops::net::{option, IPv4Opt, Level, SocketOpt, TcpOpt, Type};
use sockops::Error;

use crate::util::{bind_and_listen_ipv4, connected_pair, tcp_ipv4_socket, udp_ipv4_socket};

#[test]
fn socket_option_error() {
    let socket = tcp_ipv4_socket();
    let got = socket.socket_option::<option::Error>().unwrap();
    assert!(got.is_none());
    assert_eq!(socket.take_error().unwrap(), None);
}

#[test]
fn socket_option_type() {
    let socket = tcp_ipv4_socket();
    assert_eq!(socket.socket_option::<option::Type>().unwrap(), Type::STREAM);
    let socket = udp_ipv4_socket();
    assert_eq!(socket.socket_option::<option::Type>().unwrap(), Type::DGRAM);
}

#[test]
#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "linux",
    target_os = "netbsd"
))]
fn socket_option_accept() {
    let socket = tcp_ipv4_socket();
    assert!(!socket.socket_option::<option::Accept>().unwrap());
    bind_and_listen_ipv4(&socket);
    assert!(socket.socket_option::<option::Accept>().unwrap());
}

#[test]
#[cfg(any(target_os = "android", target_os = "linux"))]
fn socket_option_domain_and_protocol() {
    use sockops::net::{Domain, Protocol};

    let socket = tcp_ipv4_socket();
    assert_eq!(socket.socket_option::<option::Domain>().unwrap(), Domain::IPV4);
    assert_eq!(socket.socket_option::<option::Protocol>().unwrap(), Protocol::TCP);
}

#[test]
fn socket_option_reuse_address() {
    test_get_set_socket_option::<option::ReuseAddress>(false, true, true);
}

#[test]
fn socket_option_keep_alive() {
    test_get_set_socket_option::<option::KeepAlive>(false, true, true);
}

#[test]
fn socket_option_no_delay() {
    test_get_set_socket_option::<option::NoDelay>(false, true, true);
}

#[test]
fn socket_option_linger() {
    test_get_set_socket_option::<option::Linger>(None, Some(10), Some(10));
}

#[test]
fn socket_option_ttl() {
    let socket = tcp_ipv4_socket();
    socket.set_socket_option::<option::TimeToLive>(42).unwrap();
    assert_eq!(socket.socket_option::<option::TimeToLive>().unwrap(), 42);
}

#[test]
#[cfg(unix)]
fn socket_option_reuse_port() {
    test_get_set_socket_option::<option::ReusePort>(false, true, true);
}

#[test]
#[cfg(any(target_os = "android", target_os = "linux"))]
fn socket_option_incoming_cpu() {
    let socket = tcp_ipv4_socket();
    socket.set_socket_option::<option::IncomingCpu>(0).unwrap();
}

#[test]
fn socket_option_buffers() {
    let socket = udp_ipv4_socket();
    socket.set_socket_option::<option::ReceiveBuffer>(64 * 1024).unwrap();
    socket.set_socket_option::<option::SendBuffer>(64 * 1024).unwrap();
    // The OS is allowed to round (e.g. Linux doubles the value).
    assert!(socket.socket_option::<option::ReceiveBuffer>().unwrap() >= 64 * 1024);
    assert!(socket.socket_option::<option::SendBuffer>().unwrap() >= 64 * 1024);
}

#[test]
fn socket_option_broadcast() {
    let socket = udp_ipv4_socket();
    test_get_set_on::<option::Broadcast>(&socket, false, true, true);
}

#[test]
fn socket_option_raw() {
    let (client, _server) = connected_pair();
    let enable = 1i32.to_ne_bytes();
    client
        .set_socket_option_raw(Level::TCP, TcpOpt::NO_DELAY.into_opt(), &enable)
        .unwrap();
    let mut value = [0; 4];
    let n = client
        .socket_option_raw(Level::TCP, TcpOpt::NO_DELAY.into_opt(), &mut value)
        .unwrap();
    assert!(n >= 1);
    assert_ne!(value[..n], [0; 4][..n]);
    assert!(client.socket_option::<option::NoDelay>().unwrap());
}

#[test]
fn socket_option_raw_ttl() {
    let socket = udp_ipv4_socket();
    let ttl = 33i32.to_ne_bytes();
    socket
        .set_socket_option_raw(Level::IPV4, IPv4Opt::TTL.into_opt(), &ttl)
        .unwrap();
    assert_eq!(socket.socket_option::<option::TimeToLive>().unwrap(), 33);
}

#[test]
fn socket_option_unknown() {
    let socket = tcp_ipv4_socket();
    let mut value = [0; 4];
    let res = socket.socket_option_raw(Level::SOCKET, SocketOpt::from_raw(-1).into_opt(), &mut value);
    match res {
        Err(err) => assert!(
            err == Error::NO_PROTOCOL_OPTION || err == Error::INVALID_ARGUMENT,
            "{err:?}"
        ),
        Ok(n) => panic!("unexpected ok result, read {n} bytes"),
    }
}

fn test_get_set_socket_option<T>(expected_initial: T::Output, set: T::Value, expected: T::Output)
where
    T: option::Get + option::Set,
    T::Output: Eq + std::fmt::Debug,
{
    let socket = tcp_ipv4_socket();
    test_get_set_on::<T>(&socket, expected_initial, set, expected);
}

fn test_get_set_on<T>(
    socket: &sockops::Socket,
    expected_initial: T::Output,
    set: T::Value,
    expected: T::Output,
) where
    T: option::Get + option::Set,
    T::Output: Eq + std::fmt::Debug,
{
    let got = socket
        .socket_option::<T>()
        .expect("failed to get initial socket option");
    assert_eq!(got, expected_initial);

    socket
        .set_socket_option::<T>(set)
        .expect("failed to set socket option");

    let got = socket
        .socket_option::<T>()
        .expect("failed to get set socket option");
    assert_eq!(got, expected);
}
