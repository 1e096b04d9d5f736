use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddrV4, SocketAddrV6};

use sockops::net::{
    binary_to_text, endpoint_to_text, resolve, reverse_resolve, text_to_binary, text_to_endpoint,
    Candidate, Domain, Endpoint, Hints, NameFlag, NoAddress, Resolution, ResolveFlag, Type,
};
use sockops::{Category, Error, ErrorClass};

use crate::util::{expect_error, init, is_send, is_sync};

#[test]
fn resolution_is_send_and_sync() {
    is_send::<Resolution>();
    is_sync::<Resolution>();
    is_send::<Candidate>();
    is_sync::<Candidate>();
}

#[test]
fn text_to_binary_ipv4() {
    let ip = text_to_binary(Domain::IPV4, "255.123.8.1").unwrap();
    assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(255, 123, 8, 1)));
    match ip {
        IpAddr::V4(ip) => assert_eq!(u32::from(ip), 0xFF7B0801),
        IpAddr::V6(..) => unreachable!(),
    }
    assert_eq!(binary_to_text(ip).unwrap(), "255.123.8.1");
}

#[test]
fn text_to_binary_ipv6() {
    let ip = text_to_binary(Domain::IPV6, "2001:0db8:85a3::8a2e:0370:7334").unwrap();
    let expected: [u8; 16] = [
        0x20, 0x01, 0x0d, 0xb8, 0x85, 0xa3, 0x00, 0x00, 0x00, 0x00, 0x8a, 0x2e, 0x03, 0x70, 0x73,
        0x34,
    ];
    assert_eq!(ip, IpAddr::V6(Ipv6Addr::from(expected)));
    // Text form is canonical, i.e. without leading zeros.
    assert_eq!(binary_to_text(ip).unwrap(), "2001:db8:85a3::8a2e:370:7334");
}

#[test]
fn text_to_binary_invalid() {
    init();
    expect_error(text_to_binary(Domain::IPV4, "256.0.0.1"), Error::INVALID_ARGUMENT);
    expect_error(text_to_binary(Domain::IPV4, "localhost"), Error::INVALID_ARGUMENT);
    expect_error(text_to_binary(Domain::IPV4, "::1"), Error::INVALID_ARGUMENT);
    expect_error(text_to_binary(Domain::IPV6, "127.0.0.1"), Error::INVALID_ARGUMENT);
    expect_error(text_to_binary(Domain::IPV4, "127.0.0.1\0"), Error::INVALID_ARGUMENT);
    expect_error(
        text_to_binary(Domain::UNSPECIFIED, "127.0.0.1"),
        Error::ADDRESS_FAMILY_NOT_SUPPORTED,
    );
}

#[test]
fn text_to_endpoint_ipv4() {
    let endpoint = text_to_endpoint("127.0.0.1", 8080).unwrap();
    assert_eq!(
        endpoint,
        Endpoint::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080))
    );
    assert_eq!(endpoint_to_text(&endpoint).unwrap(), "127.0.0.1");
}

#[test]
fn text_to_endpoint_numeric_scope() {
    let endpoint = text_to_endpoint("fe80::1%3", 80).unwrap();
    let expected = SocketAddrV6::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1), 80, 0, 3);
    assert_eq!(endpoint, Endpoint::V6(expected));
    let text = endpoint_to_text(&endpoint).unwrap();
    assert!(text.starts_with("fe80::1%"), "{text}");
}

#[test]
fn text_to_endpoint_scope_ignored_for_global_address() {
    let endpoint = text_to_endpoint("2001:db8::1%3", 80).unwrap();
    match endpoint {
        Endpoint::V6(address) => assert_eq!(address.scope_id(), 0),
        _ => panic!("unexpected endpoint: {endpoint:?}"),
    }
    assert_eq!(endpoint_to_text(&endpoint).unwrap(), "2001:db8::1");
}

#[test]
fn text_to_endpoint_unknown_interface() {
    expect_error(
        text_to_endpoint("fe80::1%not_an_interface0", 80),
        Error::NOT_FOUND,
    );
}

#[test]
#[cfg(target_os = "linux")]
fn text_to_endpoint_interface_name() {
    // The loopback interface is always index 1 on Linux.
    let endpoint = text_to_endpoint("fe80::1%lo", 80).unwrap();
    match &endpoint {
        Endpoint::V6(address) => assert_eq!(address.scope_id(), 1),
        _ => panic!("unexpected endpoint: {endpoint:?}"),
    }
    assert_eq!(endpoint_to_text(&endpoint).unwrap(), "fe80::1%lo");
}

#[test]
fn resolve_numeric_host() {
    init();
    let hints = Hints::new()
        .with_domain(Domain::IPV4)
        .with_type(Type::STREAM)
        .with_flags(ResolveFlag::NUMERIC_HOST | ResolveFlag::NUMERIC_SERVICE);
    let resolution = resolve(Some("127.0.0.1"), Some("8080"), &hints).unwrap();
    assert_eq!(resolution.len(), 1);
    let candidate = resolution.iter().next().unwrap();
    assert_eq!(
        candidate.address(),
        &Endpoint::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080))
    );
    assert_eq!(candidate.domain(), Domain::IPV4);
    assert_eq!(candidate.r#type(), Type::STREAM);
}

#[test]
fn resolve_numeric_host_rejects_names() {
    init();
    let hints = Hints::new().with_flags(ResolveFlag::NUMERIC_HOST);
    let err = resolve(Some("localhost"), None, &hints).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Resolver, "{err:?}");
}

#[test]
fn resolve_localhost() {
    init();
    let hints = Hints::new().with_type(Type::STREAM);
    let first = resolve(Some("localhost"), Some("80"), &hints).unwrap();
    assert!(!first.is_empty());
    for candidate in &first {
        let ip = candidate.address().ip().unwrap();
        assert!(ip.is_loopback(), "{ip}");
        assert_eq!(candidate.address().port(), Some(80));
    }

    // Same query, same order.
    let second = resolve(Some("localhost"), Some("80"), &hints).unwrap();
    let first: Vec<Endpoint> = first.into_iter().map(|c| c.address().clone()).collect();
    let second: Vec<Endpoint> = second.into_vec().into_iter().map(|c| c.address().clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn resolve_passive_without_host() {
    init();
    let hints = Hints::new()
        .with_domain(Domain::IPV4)
        .with_type(Type::DGRAM)
        .with_flags(ResolveFlag::PASSIVE);
    let resolution = resolve(None, Some("0"), &hints).unwrap();
    let candidate = resolution.iter().next().unwrap();
    assert_eq!(candidate.address().ip(), Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
}

#[test]
fn resolve_canonical_name() {
    init();
    let hints = Hints::new()
        .with_domain(Domain::IPV4)
        .with_flags(ResolveFlag::CANONICAL_NAME | ResolveFlag::NUMERIC_HOST);
    let resolution = resolve(Some("127.0.0.1"), None, &hints).unwrap();
    let candidate = resolution.iter().next().unwrap();
    assert_eq!(candidate.canonical_name(), Some("127.0.0.1"));
}

#[test]
fn resolve_nonexistent_host() {
    init();
    let hints = Hints::new().with_domain(Domain::IPV4);
    let err = resolve(Some("nonexistent.invalid"), None, &hints).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Resolver, "{err:?}");
    assert!(
        err.category() == Category::netdb() || err.category() == Category::addrinfo(),
        "{err:?}"
    );
}

#[test]
fn resolve_unknown_service() {
    init();
    let hints = Hints::new().with_type(Type::STREAM);
    let err = resolve(Some("127.0.0.1"), Some("not-a-service-name"), &hints).unwrap_err();
    assert!(
        err == Error::SERVICE_NOT_FOUND || err == Error::HOST_NOT_FOUND,
        "{err:?}"
    );
}

#[test]
fn resolve_nul_byte() {
    init();
    expect_error(
        resolve(Some("local\0host"), None, &Hints::new()),
        Error::INVALID_ARGUMENT,
    );
}

#[test]
fn reverse_resolve_numeric() {
    init();
    let address = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080);
    let flags = NameFlag::NUMERIC_HOST | NameFlag::NUMERIC_SERVICE;
    let (host, service) = reverse_resolve(address, Some(flags)).unwrap();
    assert_eq!(host, "127.0.0.1");
    assert_eq!(service, "8080");
}

#[test]
fn reverse_resolve_no_address() {
    expect_error(reverse_resolve(NoAddress, None), Error::INVALID_ARGUMENT);
}
