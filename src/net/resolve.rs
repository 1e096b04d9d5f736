//! Name resolution.
//!
//! Forward resolution using [`resolve`] (`getaddrinfo(3)`), reverse
//! resolution using [`reverse_resolve`] (`getnameinfo(3)`) and the conversion
//! of address literals using [`text_to_binary`] and [`binary_to_text`]
//! (`inet_pton(3)` and `inet_ntop(3)`).
//!
//! Nothing is cached, every call asks the OS's resolver.

use std::ffi::CString;
use std::net::{IpAddr, Ipv6Addr, SocketAddrV4, SocketAddrV6};
use std::{slice, vec};

use crate::net::{Domain, Endpoint, Protocol, SocketAddress, Type};
use crate::sys::native;
use crate::{man_link, new_flag, sys, Error, Result};

new_flag!(
    /// Flags for [`Hints`].
    pub struct ResolveFlag(i32) impl BitOr {
        /// Returned addresses are intended to be bound, i.e. used in a call
        /// to [`Socket::bind`]. Without a host the wildcard address is
        /// returned.
        ///
        /// [`Socket::bind`]: crate::Socket::bind
        PASSIVE = native::AI_PASSIVE,
        /// Request the canonical name of the host, see
        /// [`Candidate::canonical_name`].
        CANONICAL_NAME = native::AI_CANONNAME,
        /// The host must be a numeric address, no resolution is performed.
        NUMERIC_HOST = native::AI_NUMERICHOST,
        /// The service must be a numeric port, no service lookup is
        /// performed.
        NUMERIC_SERVICE = native::AI_NUMERICSERV,
        /// Return IPv4-mapped IPv6 addresses if no IPv6 addresses are found
        /// when [`Domain::IPV6`] is used.
        V4_MAPPED = native::AI_V4MAPPED,
        /// Combined with [`ResolveFlag::V4_MAPPED`], return both IPv6 and
        /// IPv4-mapped addresses.
        ALL = native::AI_ALL,
        /// Only return IPv4 (IPv6) addresses if the system has an IPv4 (IPv6)
        /// address configured.
        ADDRESS_CONFIGURED = native::AI_ADDRCONFIG,
    }

    /// Flags for [`reverse_resolve`].
    pub struct NameFlag(i32) impl BitOr {
        /// Return the numeric form of the host.
        NUMERIC_HOST = native::NI_NUMERICHOST,
        /// Return the numeric form of the service (port).
        NUMERIC_SERVICE = native::NI_NUMERICSERV,
        /// Return an error if the host's name can't be determined.
        NAME_REQUIRED = native::NI_NAMEREQD,
        /// Lookup the service as datagram service, e.g. UDP instead of TCP.
        DATAGRAM = native::NI_DGRAM,
        /// Return only the host name part of the fully qualified domain name
        /// for local hosts.
        NO_FQDN = native::NI_NOFQDN,
    }
);

/// Hints for [`resolve`].
///
/// By default all domains, types and protocols are allowed and no flags are
/// set.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct Hints {
    pub(crate) domain: Domain,
    pub(crate) r#type: Option<Type>,
    pub(crate) protocol: Option<Protocol>,
    pub(crate) flags: ResolveFlag,
}

impl Hints {
    /// Create new default hints.
    pub const fn new() -> Hints {
        Hints {
            domain: Domain::UNSPECIFIED,
            r#type: None,
            protocol: None,
            flags: ResolveFlag(0),
        }
    }

    /// Only return addresses of `domain`.
    pub const fn with_domain(mut self, domain: Domain) -> Hints {
        self.domain = domain;
        self
    }

    /// Only return addresses usable with sockets of type `type`.
    pub const fn with_type(mut self, r#type: Type) -> Hints {
        self.r#type = Some(r#type);
        self
    }

    /// Only return addresses usable with `protocol`.
    pub const fn with_protocol(mut self, protocol: Protocol) -> Hints {
        self.protocol = Some(protocol);
        self
    }

    /// Set `flags`, overwriting previously set flags.
    pub const fn with_flags(mut self, flags: ResolveFlag) -> Hints {
        self.flags = flags;
        self
    }
}

impl Default for Hints {
    fn default() -> Hints {
        Hints::new()
    }
}

/// Resolve `host` and `service` into candidate endpoints.
///
/// Either `host` or `service` may be `None`, not both. The candidates are
/// returned in the order of the OS's resolver, they are not sorted, filtered
/// or deduplicated.
///
/// # Errors
///
/// Resolver failures are returned in the [netdb] and [addrinfo] categories,
/// e.g. [`Error::HOST_NOT_FOUND`] or [`Error::HOST_NOT_FOUND_TRY_AGAIN`] (a
/// transient failure). Names containing a NUL byte return
/// [`Error::INVALID_ARGUMENT`].
///
/// [netdb]: crate::Category::netdb
/// [addrinfo]: crate::Category::addrinfo
#[doc = man_link!(getaddrinfo(3))]
#[doc(alias = "getaddrinfo")]
pub fn resolve(host: Option<&str>, service: Option<&str>, hints: &Hints) -> Result<Resolution> {
    let host = host.map(c_string).transpose()?;
    let service = service.map(c_string).transpose()?;
    let candidates = sys::resolve::getaddrinfo(host.as_deref(), service.as_deref(), hints)?;
    Ok(Resolution { candidates })
}

/// Resolve `address` into a host and service name.
///
/// `flags` can be used to request the numeric form, see [`NameFlag`].
#[doc = man_link!(getnameinfo(3))]
#[doc(alias = "getnameinfo")]
pub fn reverse_resolve<A: SocketAddress>(
    address: A,
    flags: Option<NameFlag>,
) -> Result<(String, String)> {
    let storage = address.to_storage();
    if storage.is_none() {
        return Err(Error::INVALID_ARGUMENT);
    }
    sys::resolve::getnameinfo(&storage, flags.map_or(0, |flags| flags.0))
}

/// Convert the textual representation of an address in `domain` into its
/// binary form.
///
/// This never performs name resolution. Invalid text returns
/// [`Error::INVALID_ARGUMENT`], a `domain` other than [`Domain::IPV4`] or
/// [`Domain::IPV6`] returns [`Error::ADDRESS_FAMILY_NOT_SUPPORTED`].
///
/// Use [`text_to_endpoint`] for IPv6 addresses with a scope id.
#[doc = man_link!(inet_pton(3))]
#[doc(alias = "inet_pton")]
pub fn text_to_binary(domain: Domain, text: &str) -> Result<IpAddr> {
    let text = c_string(text)?;
    sys::resolve::text_to_ip(domain, &text)
}

/// Convert the binary representation of `address` into text.
#[doc = man_link!(inet_ntop(3))]
#[doc(alias = "inet_ntop")]
pub fn binary_to_text(address: IpAddr) -> Result<String> {
    sys::resolve::ip_to_text(address)
}

/// Convert the textual representation of an IP address into an
/// [`Endpoint`] using `port`.
///
/// IPv6 addresses may carry a `%scope` suffix, the scope is either a numeric
/// scope id or (on Unix) the name of an interface. The scope id is only set
/// for link-local addresses, it's ignored for all others. An unknown
/// interface returns [`Error::NOT_FOUND`].
pub fn text_to_endpoint(text: &str, port: u16) -> Result<Endpoint> {
    if !text.contains(':') {
        return match text_to_binary(Domain::IPV4, text)? {
            IpAddr::V4(ip) => Ok(Endpoint::V4(SocketAddrV4::new(ip, port))),
            IpAddr::V6(..) => Err(Error::INVALID_ARGUMENT),
        };
    }

    let (address, scope) = match text.split_once('%') {
        Some((address, scope)) => (address, Some(scope)),
        None => (text, None),
    };
    let ip = match text_to_binary(Domain::IPV6, address)? {
        IpAddr::V6(ip) => ip,
        IpAddr::V4(..) => return Err(Error::INVALID_ARGUMENT),
    };
    let scope_id = match scope {
        Some(scope) if is_link_local(&ip) => scope_id(scope)?,
        _ => 0,
    };
    Ok(Endpoint::V6(SocketAddrV6::new(ip, port, 0, scope_id)))
}

/// Convert the IP address of `endpoint` into text.
///
/// For link-local IPv6 addresses the scope id is appended as `%scope`, using
/// the name of the interface if known (Unix only).
pub fn endpoint_to_text(endpoint: &Endpoint) -> Result<String> {
    match endpoint {
        Endpoint::V4(address) => binary_to_text(IpAddr::V4(*address.ip())),
        Endpoint::V6(address) => {
            let mut text = binary_to_text(IpAddr::V6(*address.ip()))?;
            if is_link_local(address.ip()) && address.scope_id() != 0 {
                text.push('%');
                match sys::resolve::interface_name(address.scope_id()) {
                    Some(name) => text.push_str(&name),
                    None => text.push_str(&address.scope_id().to_string()),
                }
            }
            Ok(text)
        }
        #[cfg(unix)]
        Endpoint::Local(..) => Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED),
    }
}

/// Unicast or multicast link-local address.
const fn is_link_local(ip: &Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    (first & 0xffc0) == 0xfe80 || (first & 0xff0f) == 0xff02
}

fn scope_id(scope: &str) -> Result<u32> {
    if let Ok(id) = scope.parse() {
        return Ok(id);
    }
    sys::resolve::interface_index(&c_string(scope)?)
}

fn c_string(value: &str) -> Result<CString> {
    CString::new(value).map_err(|_| Error::INVALID_ARGUMENT)
}

/// Result of [`resolve`].
///
/// Owns all the candidates, nothing is shared with the OS.
#[derive(Clone, Debug)]
pub struct Resolution {
    candidates: Vec<Candidate>,
}

impl Resolution {
    /// Returns an iterator over the candidates, in the order returned by the
    /// resolver.
    pub fn iter(&self) -> slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the candidates.
    pub fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }
}

impl IntoIterator for Resolution {
    type Item = Candidate;
    type IntoIter = vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a Resolution {
    type Item = &'a Candidate;
    type IntoIter = slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Single candidate of a [`Resolution`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    address: Endpoint,
    r#type: Type,
    protocol: Protocol,
    canonical_name: Option<String>,
}

impl Candidate {
    pub(crate) const fn new(
        address: Endpoint,
        r#type: Type,
        protocol: Protocol,
        canonical_name: Option<String>,
    ) -> Candidate {
        Candidate {
            address,
            r#type,
            protocol,
            canonical_name,
        }
    }

    /// Address of the candidate.
    pub const fn address(&self) -> &Endpoint {
        &self.address
    }

    /// Domain of the candidate's address.
    pub const fn domain(&self) -> Domain {
        self.address.domain()
    }

    /// Socket type to use with the address.
    pub const fn r#type(&self) -> Type {
        self.r#type
    }

    /// Protocol to use with the address.
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Canonical name of the host, only set for the first candidate if
    /// [`ResolveFlag::CANONICAL_NAME`] is used.
    pub fn canonical_name(&self) -> Option<&str> {
        self.canonical_name.as_deref()
    }
}
