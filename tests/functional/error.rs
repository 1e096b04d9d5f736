use std::collections::HashSet;
use std::io;

use sockops::{Category, Error, ErrorClass};

use crate::util::{is_send, is_sync};

#[test]
fn error_is_send_and_sync() {
    is_send::<Error>();
    is_sync::<Error>();
}

#[test]
fn no_error() {
    let err = Error::default();
    assert!(err.is_none());
    assert_eq!(err.code(), 0);
    assert_eq!(err.class(), ErrorClass::None);
    // "No error" is equal regardless of the category.
    assert_eq!(err, Error::new(0, Category::misc()));
    assert_eq!(Error::netdb(0), Error::addrinfo(0));
}

#[test]
fn equality_requires_code_and_category() {
    let code = Error::INVALID_ARGUMENT.code();
    assert_eq!(Error::system(code), Error::INVALID_ARGUMENT);
    assert_ne!(Error::misc(code), Error::INVALID_ARGUMENT);
    assert_ne!(Error::EOF, Error::NOT_FOUND);
    assert_eq!(Error::EOF, Error::new(Error::EOF.code(), Category::Misc));
}

#[test]
fn hash_matches_equality() {
    let mut set = HashSet::new();
    set.insert(Error::system(0));
    set.insert(Error::misc(0));
    set.insert(Error::EOF);
    set.insert(Error::EOF);
    set.insert(Error::CONNECTION_RESET);
    assert_eq!(set.len(), 3);
}

#[test]
fn categories() {
    assert_eq!(Category::system(), Category::System);
    assert_eq!(Category::misc(), Category::Misc);
    assert_eq!(Error::CONNECTION_REFUSED.category(), Category::system());
    assert_eq!(Error::EOF.category(), Category::misc());
    assert_eq!(Error::HOST_NOT_FOUND.category(), Category::netdb());
    assert_eq!(Error::SERVICE_NOT_FOUND.category(), Category::addrinfo());
    assert_eq!(Category::system().name(), "system");
    assert_eq!(Category::misc().name(), "misc");
}

#[test]
#[cfg(unix)]
fn unix_resolver_categories() {
    assert_eq!(Category::netdb(), Category::Netdb);
    assert_eq!(Category::addrinfo(), Category::Addrinfo);
    assert_eq!(Category::netdb().name(), "netdb");
    assert_eq!(Category::addrinfo().name(), "addrinfo");
    assert_eq!(Error::HOST_NOT_FOUND.code(), 1);
    assert_eq!(Error::HOST_NOT_FOUND_TRY_AGAIN.code(), 2);
    assert_eq!(Error::NO_RECOVERY.code(), 3);
    assert_eq!(Error::NO_DATA.code(), 4);
}

#[test]
#[cfg(unix)]
fn system_codes_are_errno() {
    assert_eq!(Error::CONNECTION_REFUSED.code(), libc::ECONNREFUSED);
    assert_eq!(Error::WOULD_BLOCK.code(), libc::EWOULDBLOCK);
    assert_eq!(Error::INTERRUPTED.code(), libc::EINTR);
    assert_eq!(Error::BROKEN_PIPE.code(), libc::EPIPE);
    assert_eq!(Error::SERVICE_NOT_FOUND.code(), libc::EAI_SERVICE);
}

#[test]
fn messages() {
    assert_eq!(Error::EOF.message(), "End of file");
    assert_eq!(Error::ALREADY_OPEN.message(), "Already open");
    assert_eq!(Error::NOT_FOUND.message(), "Element not found");
    assert_eq!(Error::misc(1000).message(), "Unknown error");
    assert!(!Error::CONNECTION_REFUSED.message().is_empty());
    assert!(!Error::HOST_NOT_FOUND.message().is_empty());
}

#[test]
#[cfg(unix)]
fn unix_resolver_messages() {
    assert_eq!(
        Error::HOST_NOT_FOUND.message(),
        "Host not found (authoritative)"
    );
    assert_eq!(Error::netdb(1000).message(), "Unknown resolver error");
    assert_eq!(Error::SERVICE_NOT_FOUND.message(), "Service not found");
    assert_eq!(
        Error::SOCKET_TYPE_NOT_SUPPORTED.message(),
        "Socket type not supported"
    );
    assert!(!Error::addrinfo(libc::EAI_BADFLAGS).message().is_empty());
}

#[test]
fn display() {
    let msg = Error::EOF.to_string();
    assert!(msg.starts_with("End of file"), "{msg}");
    assert!(msg.ends_with(&format!("(misc error {})", Error::EOF.code())), "{msg}");

    let msg = Error::CONNECTION_RESET.to_string();
    assert!(msg.contains("system error"), "{msg}");
}

#[test]
fn class() {
    let tests = [
        (Error::INTERRUPTED, ErrorClass::Interrupted),
        (Error::WOULD_BLOCK, ErrorClass::WouldBlock),
        (Error::TRY_AGAIN, ErrorClass::WouldBlock),
        (Error::NO_DESCRIPTORS, ErrorClass::Resource),
        (Error::NO_MEMORY, ErrorClass::Resource),
        (Error::CONNECTION_REFUSED, ErrorClass::Peer),
        (Error::CONNECTION_RESET, ErrorClass::Peer),
        (Error::TIMED_OUT, ErrorClass::Peer),
        (Error::INVALID_ARGUMENT, ErrorClass::Usage),
        (Error::NOT_CONNECTED, ErrorClass::Usage),
        (Error::HOST_NOT_FOUND, ErrorClass::Resolver),
        (Error::SERVICE_NOT_FOUND, ErrorClass::Resolver),
        (Error::EOF, ErrorClass::Termination),
        (Error::BROKEN_PIPE, ErrorClass::Termination),
        (Error::NOT_FOUND, ErrorClass::Other),
    ];
    for (err, expected) in tests {
        assert_eq!(err.class(), expected, "{err:?}");
    }
}

#[test]
fn is_transient() {
    assert!(Error::WOULD_BLOCK.is_transient());
    assert!(Error::INTERRUPTED.is_transient());
    assert!(Error::HOST_NOT_FOUND_TRY_AGAIN.is_transient());
    assert!(!Error::HOST_NOT_FOUND.is_transient());
    assert!(!Error::CONNECTION_REFUSED.is_transient());
    assert!(!Error::EOF.is_transient());
}

#[test]
fn kind() {
    assert_eq!(Error::CONNECTION_REFUSED.kind(), io::ErrorKind::ConnectionRefused);
    assert_eq!(Error::WOULD_BLOCK.kind(), io::ErrorKind::WouldBlock);
    assert_eq!(Error::EOF.kind(), io::ErrorKind::UnexpectedEof);
    assert_eq!(Error::NOT_FOUND.kind(), io::ErrorKind::NotFound);
    assert_eq!(Error::HOST_NOT_FOUND.kind(), io::ErrorKind::NotFound);
    assert_eq!(Error::ALREADY_OPEN.kind(), io::ErrorKind::AlreadyExists);
}

#[test]
fn into_io_error() {
    let err: io::Error = Error::CONNECTION_RESET.into();
    assert_eq!(err.raw_os_error(), Some(Error::CONNECTION_RESET.code()));
    assert_eq!(Error::from(err), Error::CONNECTION_RESET);

    let err: io::Error = Error::EOF.into();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert_eq!(err.raw_os_error(), None);
    assert_eq!(Error::from(err), Error::EOF);

    let err: io::Error = Error::HOST_NOT_FOUND.into();
    assert_eq!(Error::from(err), Error::HOST_NOT_FOUND);
}

#[test]
fn from_io_error_kind() {
    let err = io::Error::new(io::ErrorKind::WouldBlock, "would block");
    assert_eq!(Error::from(err), Error::WOULD_BLOCK);
    let err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
    assert_eq!(Error::from(err), Error::EOF);
    let err = io::Error::new(io::ErrorKind::InvalidInput, "invalid input");
    assert_eq!(Error::from(err), Error::INVALID_ARGUMENT);
}

#[test]
fn from_io_error_unrelated_kind() {
    for kind in [io::ErrorKind::Other, io::ErrorKind::InvalidData, io::ErrorKind::WriteZero] {
        let err = Error::from(io::Error::new(kind, "unrelated"));
        assert_eq!(err, Error::OTHER, "{kind:?}");
        assert_eq!(err.category(), Category::misc());
        assert_eq!(err.class(), ErrorClass::Other);
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
    assert_eq!(Error::OTHER.message(), "Other error");
}
