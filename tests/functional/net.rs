use std::io::{IoSlice, IoSliceMut};
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::thread;

use sockops::net::{socket, Domain, Endpoint, NoAddress, RecvFlag, Type};
use sockops::{Error, Socket};

use crate::util::{
    any_local_ipv4, bind_and_listen_ipv4, bind_ipv4, connected_pair, expect_error,
    expect_error_in, init, is_send, is_sync, tcp_ipv4_socket, udp_ipv4_socket,
};

const DATA1: &[u8] = b"Hello, World!";
const DATA2: &[u8] = b"Hello, Mars!";

#[test]
fn socket_is_send_and_sync() {
    is_send::<Socket>();
    is_sync::<Socket>();
}

#[test]
fn bind_to_port_zero_assigns_port() {
    let socket = tcp_ipv4_socket();
    let address = bind_ipv4(&socket);
    assert_eq!(*address.ip(), Ipv4Addr::LOCALHOST);
    assert_ne!(address.port(), 0);

    let endpoint: Endpoint = socket.local_addr().unwrap();
    assert_eq!(endpoint, Endpoint::V4(address));
    assert_eq!(endpoint.domain(), Domain::IPV4);
    assert_eq!(endpoint.port(), Some(address.port()));
}

#[test]
fn bind_address_in_use() {
    let socket1 = tcp_ipv4_socket();
    let address = bind_and_listen_ipv4(&socket1);

    let socket2 = tcp_ipv4_socket();
    expect_error(socket2.bind(address), Error::ADDRESS_IN_USE);

    // The failed bind leaves the socket unbound.
    let address2 = bind_and_listen_ipv4(&socket2);
    assert_ne!(address2, address);
    let client = tcp_ipv4_socket();
    client.connect(address2).unwrap();
    let (_, peer): (Socket, SocketAddrV4) = socket2.accept().unwrap();
    assert_eq!(peer, client.local_addr::<SocketAddrV4>().unwrap());
}

#[test]
fn ping_pong() {
    let listener = tcp_ipv4_socket();
    let address = bind_and_listen_ipv4(&listener);

    let handle = thread::spawn(move || {
        let (client, _): (Socket, NoAddress) = listener.accept().unwrap();
        let mut buf = [0; DATA1.len()];
        client.recv_exact(&mut buf).unwrap();
        assert_eq!(buf, DATA1);
        client.send_all(DATA2).unwrap();
    });

    let socket = tcp_ipv4_socket();
    socket.connect(address).unwrap();
    let peer: SocketAddrV4 = socket.peer_addr().unwrap();
    assert_eq!(peer, address);

    socket.send_all(DATA1).unwrap();
    let mut buf = [0; DATA2.len()];
    socket.recv_exact(&mut buf).unwrap();
    assert_eq!(buf, DATA2);

    handle.join().unwrap();
    socket.close().unwrap();
}

#[test]
fn recv_after_peer_shutdown() {
    let (client, server) = connected_pair();
    client.send_all(DATA1).unwrap();
    client.shutdown(Shutdown::Write).unwrap();

    let mut buf = vec![0; 64];
    let mut received = Vec::new();
    loop {
        match server.recv(&mut buf, None).unwrap() {
            0 => break,
            n => received.extend_from_slice(&buf[..n]),
        }
    }
    assert_eq!(received, DATA1);
    // End of file is sticky.
    assert_eq!(server.recv(&mut buf, None).unwrap(), 0);
}

#[test]
fn recv_exact_eof() {
    let (client, server) = connected_pair();
    client.send_all(DATA1).unwrap();
    drop(client);

    let mut buf = [0; DATA1.len() + 10];
    expect_error(server.recv_exact(&mut buf), Error::EOF);
}

#[test]
fn recv_peek() {
    let (client, server) = connected_pair();
    client.send_all(DATA1).unwrap();

    let mut peeked = [0; DATA1.len()];
    let n = server.recv(&mut peeked, Some(RecvFlag::PEEK)).unwrap();
    assert!(n > 0 && n <= DATA1.len());

    // Peeking doesn't remove the data from the queue.
    let mut buf = [0; DATA1.len()];
    server.recv_exact(&mut buf).unwrap();
    assert_eq!(buf, DATA1);
    assert_eq!(peeked[..n], DATA1[..n]);
}

#[test]
fn vectored_io() {
    let (client, server) = connected_pair();
    let bufs = [IoSlice::new(DATA1), IoSlice::new(DATA2)];
    let n = client.send_vectored(&bufs, None).unwrap();
    assert_eq!(n, DATA1.len() + DATA2.len());
    client.shutdown(Shutdown::Write).unwrap();

    let mut buf1 = [0; DATA1.len()];
    let mut buf2 = [0; DATA2.len()];
    server.recv_exact(&mut buf1).unwrap();
    server.recv_exact(&mut buf2).unwrap();
    assert_eq!(buf1, DATA1);
    assert_eq!(buf2, DATA2);

    let mut buf = [0; 8];
    let n = server
        .recv_vectored(&mut [IoSliceMut::new(&mut buf)], None)
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn nonblocking_accept_would_block() {
    let listener = Socket::config(Domain::IPV4, Type::STREAM)
        .with_nonblocking(true)
        .open()
        .unwrap();
    bind_and_listen_ipv4(&listener);
    expect_error(listener.accept::<NoAddress>(), Error::WOULD_BLOCK);
}

#[test]
fn nonblocking_recv_would_block() {
    let (_client, server) = connected_pair();
    server.set_nonblocking(true).unwrap();
    let mut buf = [0; 8];
    expect_error(server.recv(&mut buf, None), Error::WOULD_BLOCK);
    server.set_nonblocking(false).unwrap();
}

#[test]
fn connect_refused() {
    // Bind, but don't listen.
    let unused = tcp_ipv4_socket();
    let address = bind_ipv4(&unused);

    let socket = tcp_ipv4_socket();
    expect_error(socket.connect(address), Error::CONNECTION_REFUSED);
}

#[test]
fn recv_not_connected() {
    let socket = tcp_ipv4_socket();
    let mut buf = [0; 8];
    expect_error(socket.recv(&mut buf, None), Error::NOT_CONNECTED);
    expect_error(socket.peer_addr::<SocketAddr>(), Error::NOT_CONNECTED);
}

#[test]
fn send_to_recv_from() {
    let socket1 = udp_ipv4_socket();
    let address1 = bind_ipv4(&socket1);
    let socket2 = udp_ipv4_socket();
    let address2 = bind_ipv4(&socket2);

    let n = socket2.send_to(DATA1, address1, None).unwrap();
    assert_eq!(n, DATA1.len());

    let mut buf = [0; 64];
    let (n, from): (usize, Option<SocketAddrV4>) = socket1.recv_from(&mut buf, None).unwrap();
    assert_eq!(&buf[..n], DATA1);
    assert_eq!(from, Some(address2));

    let n = socket1
        .send_to_vectored(&[IoSlice::new(DATA2)], Endpoint::V4(address2), None)
        .unwrap();
    assert_eq!(n, DATA2.len());
    let (n, from): (usize, Option<Endpoint>) = socket2.recv_from(&mut buf, None).unwrap();
    assert_eq!(&buf[..n], DATA2);
    assert_eq!(from, Some(Endpoint::V4(address1)));
}

#[test]
fn datagram_connect() {
    let socket1 = udp_ipv4_socket();
    let address1 = bind_ipv4(&socket1);
    let socket2 = udp_ipv4_socket();
    socket2.connect(address1).unwrap();

    socket2.send_all(DATA1).unwrap();
    let mut buf = [0; 64];
    let (n, _): (usize, Option<NoAddress>) = socket1.recv_from(&mut buf, None).unwrap();
    assert_eq!(&buf[..n], DATA1);
}

#[test]
fn recv_from_keeps_data_without_address() {
    let (client, server) = connected_pair();
    client.send_all(DATA1).unwrap();

    // Most OSes don't report the address of the sender on connected stream
    // sockets.
    let mut buf = [0; DATA1.len()];
    let (n, from) = server.recv_from::<SocketAddrV4>(&mut buf, None).unwrap();
    if let Some(from) = from {
        assert_eq!(from, client.local_addr::<SocketAddrV4>().unwrap());
    }
    assert_eq!(&buf[..n], &DATA1[..n]);
    server.recv_exact(&mut buf[n..]).unwrap();
    assert_eq!(buf, DATA1);
}

#[test]
fn recv_from_keeps_data_with_other_address_family() {
    let socket1 = udp_ipv4_socket();
    let address1 = bind_ipv4(&socket1);
    let socket2 = udp_ipv4_socket();
    socket2.send_to(DATA1, address1, None).unwrap();

    let mut buf = [0; 64];
    let (n, from) = socket1.recv_from::<SocketAddrV6>(&mut buf, None).unwrap();
    assert_eq!(from, None);
    assert_eq!(&buf[..n], DATA1);
}

#[test]
fn accept_other_address_family_keeps_connection() {
    let listener = Socket::config(Domain::IPV4, Type::STREAM)
        .with_nonblocking(true)
        .open()
        .unwrap();
    let address = bind_and_listen_ipv4(&listener);
    let client = tcp_ipv4_socket();
    client.connect(address).unwrap();

    expect_error(
        listener.accept::<SocketAddrV6>(),
        Error::ADDRESS_FAMILY_NOT_SUPPORTED,
    );

    // The pending connection is still there.
    let (server, peer): (Socket, SocketAddrV4) = listener.accept().unwrap();
    assert_eq!(peer, client.local_addr::<SocketAddrV4>().unwrap());
    server.set_nonblocking(false).unwrap();
    client.send_all(DATA1).unwrap();
    let mut buf = [0; DATA1.len()];
    server.recv_exact(&mut buf).unwrap();
    assert_eq!(buf, DATA1);
}

#[test]
fn try_clone() {
    let (client, server) = connected_pair();
    let clone = client.try_clone().unwrap();
    drop(client);

    clone.send_all(DATA1).unwrap();
    let mut buf = [0; DATA1.len()];
    server.recv_exact(&mut buf).unwrap();
    assert_eq!(buf, DATA1);
}

#[test]
fn close_reports_success() {
    let socket = udp_ipv4_socket();
    socket.close().unwrap();
}

#[test]
fn socket_default_protocol() {
    init();
    let socket = socket(Domain::IPV4, Type::STREAM, None).unwrap();
    socket.bind(any_local_ipv4()).unwrap();
}

#[test]
fn socket_unsupported_domain() {
    init();
    let domain = Domain::from_raw(-1);
    expect_error_in(
        socket(domain, Type::STREAM, None),
        &[Error::ADDRESS_FAMILY_NOT_SUPPORTED, Error::INVALID_ARGUMENT],
    );
}

#[test]
#[cfg(unix)]
fn local_stream_socket() {
    use sockops::net::LocalAddr;

    init();
    let dir = std::env::temp_dir();
    let path = dir.join(format!("sockops_local_{}.sock", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let address = LocalAddr::from_pathname(&path).unwrap();

    let listener = socket(Domain::UNIX, Type::STREAM, None).unwrap();
    listener.bind(address.clone()).unwrap();
    listener.listen(8).unwrap();
    let local: LocalAddr = listener.local_addr().unwrap();
    assert_eq!(local.as_pathname(), Some(path.as_path()));

    let client = socket(Domain::UNIX, Type::STREAM, None).unwrap();
    client.connect(address).unwrap();
    let (server, peer): (Socket, LocalAddr) = listener.accept().unwrap();
    assert!(peer.is_unnamed());

    client.send_all(DATA1).unwrap();
    let mut buf = [0; DATA1.len()];
    server.recv_exact(&mut buf).unwrap();
    assert_eq!(buf, DATA1);

    std::fs::remove_file(&path).unwrap();
}

#[test]
#[cfg(unix)]
fn send_msg_recv_msg() {
    let socket1 = udp_ipv4_socket();
    let address1 = bind_ipv4(&socket1);
    let socket2 = udp_ipv4_socket();
    let address2 = bind_ipv4(&socket2);

    let bufs = [IoSlice::new(DATA1), IoSlice::new(DATA2)];
    let n = socket2.send_msg(&bufs, address1, &[], None).unwrap();
    assert_eq!(n, DATA1.len() + DATA2.len());

    let mut buf = [0; 64];
    let msg = socket1
        .recv_msg::<SocketAddrV4>(&mut [IoSliceMut::new(&mut buf)], &mut [], None)
        .unwrap();
    assert_eq!(msg.bytes, DATA1.len() + DATA2.len());
    assert_eq!(msg.address, Some(address2));
    assert_eq!(msg.control_len, 0);
    assert!(!msg.flags.contains(RecvFlag::TRUNCATE));
    assert_eq!(&buf[..DATA1.len()], DATA1);
}

#[test]
#[cfg(unix)]
fn recv_msg_truncated() {
    let socket1 = udp_ipv4_socket();
    let address1 = bind_ipv4(&socket1);
    let socket2 = udp_ipv4_socket();
    socket2.send_to(DATA1, address1, None).unwrap();

    let mut buf = [0; 4];
    let msg = socket1
        .recv_msg::<NoAddress>(&mut [IoSliceMut::new(&mut buf)], &mut [], None)
        .unwrap();
    assert_eq!(msg.bytes, buf.len());
    assert!(msg.flags.contains(RecvFlag::TRUNCATE));
}

#[test]
#[cfg(unix)]
fn send_after_peer_closed_is_error_not_signal() {
    let (client, server) = connected_pair();
    drop(server);

    // The first send might succeed, after the reset the following sends must
    // fail without killing the process with `SIGPIPE`.
    let mut last = Ok(());
    for _ in 0..100 {
        last = client.send_all(&[0; 1024]);
        if last.is_err() {
            break;
        }
        thread::sleep(std::time::Duration::from_millis(1));
    }
    expect_error_in(last, &[Error::BROKEN_PIPE, Error::CONNECTION_RESET]);
}

#[test]
#[cfg(unix)]
fn owned_fd_conversion() {
    use std::os::fd::{AsRawFd, OwnedFd};

    let socket = tcp_ipv4_socket();
    let raw = socket.as_raw_fd();
    let fd = OwnedFd::from(socket);
    assert_eq!(fd.as_raw_fd(), raw);
    let socket = Socket::from(fd);
    assert_eq!(socket.as_raw_fd(), raw);
}
