//! Endpoint addresses.

use std::mem::{size_of, zeroed};
use std::net::{IpAddr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::{fmt, ptr};

use crate::net::Domain;
use crate::{sys, Error, Result};

#[cfg(unix)]
pub use local::LocalAddr;

/// Endpoint address.
///
/// Either an IPv4, IPv6 or (on Unix) a local, `AF_UNIX`, address.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(variant_size_differences)] // `LocalAddr` is as large as `sockaddr_un`.
pub enum Endpoint {
    /// IPv4 address and port.
    V4(SocketAddrV4),
    /// IPv6 address, port, flow info and scope id.
    V6(SocketAddrV6),
    /// Local address, see [`LocalAddr`].
    #[cfg(unix)]
    Local(LocalAddr),
}

impl Endpoint {
    /// Returns the domain (address family) of the address.
    pub const fn domain(&self) -> Domain {
        match self {
            Endpoint::V4(..) => Domain::IPV4,
            Endpoint::V6(..) => Domain::IPV6,
            #[cfg(unix)]
            Endpoint::Local(..) => Domain::UNIX,
        }
    }

    /// Returns the IP address, if any.
    pub const fn ip(&self) -> Option<IpAddr> {
        match self {
            Endpoint::V4(addr) => Some(IpAddr::V4(*addr.ip())),
            Endpoint::V6(addr) => Some(IpAddr::V6(*addr.ip())),
            #[cfg(unix)]
            Endpoint::Local(..) => None,
        }
    }

    /// Returns the port, if any.
    pub const fn port(&self) -> Option<u16> {
        match self {
            Endpoint::V4(addr) => Some(addr.port()),
            Endpoint::V6(addr) => Some(addr.port()),
            #[cfg(unix)]
            Endpoint::Local(..) => None,
        }
    }

    /// Returns the address as [`SocketAddr`], if it's an IP address.
    pub const fn as_socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Endpoint::V4(addr) => Some(SocketAddr::V4(*addr)),
            Endpoint::V6(addr) => Some(SocketAddr::V6(*addr)),
            #[cfg(unix)]
            Endpoint::Local(..) => None,
        }
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Endpoint {
        match addr {
            SocketAddr::V4(addr) => Endpoint::V4(addr),
            SocketAddr::V6(addr) => Endpoint::V6(addr),
        }
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Endpoint {
        Endpoint::V4(addr)
    }
}

impl From<SocketAddrV6> for Endpoint {
    fn from(addr: SocketAddrV6) -> Endpoint {
        Endpoint::V6(addr)
    }
}

#[cfg(unix)]
impl From<LocalAddr> for Endpoint {
    fn from(addr: LocalAddr) -> Endpoint {
        Endpoint::Local(addr)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::V4(addr) => addr.fmt(f),
            Endpoint::V6(addr) => addr.fmt(f),
            #[cfg(unix)]
            Endpoint::Local(addr) => addr.fmt(f),
        }
    }
}

/// Socket address.
///
/// Implemented for [`SocketAddr`], [`SocketAddrV4`], [`SocketAddrV6`],
/// [`Endpoint`], [`LocalAddr`] (Unix) and [`NoAddress`].
#[allow(private_bounds)] // That's the point of the private module.
pub trait SocketAddress: private::SocketAddress + Sized {}

pub(crate) mod private {
    use super::AddressStorage;
    use crate::Result;

    pub(crate) trait SocketAddress: Sized {
        /// True if the address is ignored, see [`NoAddress`].
        ///
        /// [`NoAddress`]: super::NoAddress
        const IGNORED: bool = false;

        /// Write the address into `storage`.
        fn to_storage(&self) -> AddressStorage;

        /// Read the address from `storage`, filled in by the OS.
        fn from_storage(storage: &AddressStorage) -> Result<Self>;

        /// Returns true if an address of `family` can be read as `Self`.
        fn supports_family(family: i32) -> bool;
    }
}

/// Native storage for any socket address.
pub(crate) struct AddressStorage {
    storage: sys::sockaddr_storage,
    length: sys::socklen_t,
}

impl AddressStorage {
    /// Storage for the OS to write an address into.
    pub(crate) fn uninit() -> AddressStorage {
        AddressStorage {
            // SAFETY: all zeroes is a valid `sockaddr_storage`.
            storage: unsafe { zeroed() },
            length: size_of::<sys::sockaddr_storage>() as sys::socklen_t,
        }
    }

    /// Storage without an address.
    pub(crate) fn none() -> AddressStorage {
        AddressStorage {
            // SAFETY: all zeroes is a valid `sockaddr_storage`.
            storage: unsafe { zeroed() },
            length: 0,
        }
    }

    /// Copy `address` into new storage.
    pub(crate) fn from_raw<T>(address: &T) -> AddressStorage {
        debug_assert!(size_of::<T>() <= size_of::<sys::sockaddr_storage>());
        let mut storage = AddressStorage::none();
        // SAFETY: `sockaddr_storage` is large enough to hold any address.
        unsafe {
            ptr::copy_nonoverlapping(
                ptr::from_ref(address).cast::<u8>(),
                ptr::from_mut(&mut storage.storage).cast::<u8>(),
                size_of::<T>(),
            );
        }
        storage.length = size_of::<T>() as sys::socklen_t;
        storage
    }

    /// Copy the address pointed to by `ptr`, of `length` bytes.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `length` bytes.
    pub(crate) unsafe fn from_ptr(ptr: *const sys::sockaddr, length: usize) -> Result<AddressStorage> {
        if ptr.is_null() || length > size_of::<sys::sockaddr_storage>() {
            return Err(Error::INVALID_ARGUMENT);
        }
        let mut storage = AddressStorage::none();
        ptr::copy_nonoverlapping(
            ptr.cast::<u8>(),
            ptr::from_mut(&mut storage.storage).cast::<u8>(),
            length,
        );
        storage.length = length as sys::socklen_t;
        Ok(storage)
    }

    /// Returns true if no address is stored.
    pub(crate) const fn is_none(&self) -> bool {
        self.length == 0
    }

    pub(crate) fn as_ptr(&self) -> (*const sys::sockaddr, sys::socklen_t) {
        if self.is_none() {
            (ptr::null(), 0)
        } else {
            (ptr::from_ref(&self.storage).cast(), self.length)
        }
    }

    pub(crate) fn as_mut_ptr(&mut self) -> (*mut sys::sockaddr, &mut sys::socklen_t) {
        (ptr::from_mut(&mut self.storage).cast(), &mut self.length)
    }

    /// Address family of the stored address.
    #[allow(clippy::unnecessary_cast)]
    pub(crate) const fn family(&self) -> i32 {
        self.storage.ss_family as i32
    }

    pub(crate) const fn len(&self) -> usize {
        self.length as usize
    }

    /// Read the stored address as `T`.
    ///
    /// Returns an error if not enough bytes are stored.
    pub(crate) fn read<T: Copy>(&self) -> Result<T> {
        if self.len() < size_of::<T>() {
            return Err(Error::INVALID_ARGUMENT);
        }
        // SAFETY: checked the length above and `T` is a plain native address
        // type, for which all bytes are valid.
        Ok(unsafe { ptr::from_ref(&self.storage).cast::<T>().read_unaligned() })
    }

    /// Returns the raw bytes of the stored address.
    #[cfg(unix)]
    pub(crate) fn as_bytes(&self) -> &[u8] {
        let length = self.len().min(size_of::<sys::sockaddr_storage>());
        // SAFETY: `storage` is `length` bytes long at least.
        unsafe { std::slice::from_raw_parts(ptr::from_ref(&self.storage).cast(), length) }
    }
}

impl fmt::Debug for AddressStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressStorage")
            .field("family", &self.family())
            .field("length", &self.len())
            .finish()
    }
}

impl SocketAddress for SocketAddrV4 {}

impl private::SocketAddress for SocketAddrV4 {
    fn to_storage(&self) -> AddressStorage {
        AddressStorage::from_raw(&sys::net::ipv4_to_raw(self))
    }

    fn from_storage(storage: &AddressStorage) -> Result<Self> {
        if storage.family() != i32::from(sys::AF_INET) {
            return Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED);
        }
        Ok(sys::net::ipv4_from_raw(&storage.read()?))
    }

    fn supports_family(family: i32) -> bool {
        family == i32::from(sys::AF_INET)
    }
}

impl SocketAddress for SocketAddrV6 {}

impl private::SocketAddress for SocketAddrV6 {
    fn to_storage(&self) -> AddressStorage {
        AddressStorage::from_raw(&sys::net::ipv6_to_raw(self))
    }

    fn from_storage(storage: &AddressStorage) -> Result<Self> {
        if storage.family() != i32::from(sys::AF_INET6) {
            return Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED);
        }
        Ok(sys::net::ipv6_from_raw(&storage.read()?))
    }

    fn supports_family(family: i32) -> bool {
        family == i32::from(sys::AF_INET6)
    }
}

impl SocketAddress for SocketAddr {}

impl private::SocketAddress for SocketAddr {
    fn to_storage(&self) -> AddressStorage {
        match self {
            SocketAddr::V4(addr) => addr.to_storage(),
            SocketAddr::V6(addr) => addr.to_storage(),
        }
    }

    fn from_storage(storage: &AddressStorage) -> Result<Self> {
        match storage.family() {
            f if f == i32::from(sys::AF_INET) => SocketAddrV4::from_storage(storage).map(Into::into),
            f if f == i32::from(sys::AF_INET6) => SocketAddrV6::from_storage(storage).map(Into::into),
            _ => Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED),
        }
    }
    fn supports_family(family: i32) -> bool {
        SocketAddrV4::supports_family(family) || SocketAddrV6::supports_family(family)
    }
}

impl SocketAddress for Endpoint {}

impl private::SocketAddress for Endpoint {
    fn to_storage(&self) -> AddressStorage {
        match self {
            Endpoint::V4(addr) => addr.to_storage(),
            Endpoint::V6(addr) => addr.to_storage(),
            #[cfg(unix)]
            Endpoint::Local(addr) => addr.to_storage(),
        }
    }

    fn from_storage(storage: &AddressStorage) -> Result<Self> {
        match storage.family() {
            f if f == i32::from(sys::AF_INET) => SocketAddrV4::from_storage(storage).map(Endpoint::V4),
            f if f == i32::from(sys::AF_INET6) => SocketAddrV6::from_storage(storage).map(Endpoint::V6),
            #[cfg(unix)]
            f if f == sys::AF_UNIX => LocalAddr::from_storage(storage).map(Endpoint::Local),
            _ => Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED),
        }
    }
    fn supports_family(family: i32) -> bool {
        #[cfg(unix)]
        if family == sys::AF_UNIX {
            return true;
        }
        SocketAddr::supports_family(family)
    }
}

/// When [`accept`]ing connections or receiving data the address of the peer
/// is not always needed, `NoAddress` can be used to ignore it.
///
/// When used as address to send to or connect to it's passed as a null
/// address, which the OS rejects for most operations.
///
/// [`accept`]: crate::Socket::accept
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NoAddress;

impl SocketAddress for NoAddress {}

impl private::SocketAddress for NoAddress {
    const IGNORED: bool = true;

    fn to_storage(&self) -> AddressStorage {
        AddressStorage::none()
    }

    fn from_storage(_: &AddressStorage) -> Result<Self> {
        Ok(NoAddress)
    }

    fn supports_family(_: i32) -> bool {
        true
    }
}

#[cfg(unix)]
mod local {
    use std::ffi::OsStr;
    use std::mem::{offset_of, size_of, zeroed};
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;
    use std::{fmt, slice};

    use super::{private, AddressStorage, SocketAddress};
    use crate::{Error, Result};

    /// Local (`AF_UNIX`) socket address.
    ///
    /// Either a path on the filesystem, an abstract name (Linux and Android
    /// only) or unnamed.
    #[derive(Clone)]
    pub struct LocalAddr {
        inner: libc::sockaddr_un,
        length: libc::socklen_t,
    }

    const PATH_OFFSET: usize = offset_of!(libc::sockaddr_un, sun_path);

    impl LocalAddr {
        fn empty() -> LocalAddr {
            // SAFETY: all zeroes is a valid `sockaddr_un`.
            let mut inner: libc::sockaddr_un = unsafe { zeroed() };
            inner.sun_family = libc::AF_UNIX as libc::sa_family_t;
            LocalAddr {
                inner,
                length: PATH_OFFSET as libc::socklen_t,
            }
        }

        /// Create an address for the filesystem `path`.
        ///
        /// Returns [`Error::NAME_TOO_LONG`] if the path doesn't fit into the
        /// native address and [`Error::INVALID_ARGUMENT`] if it contains a
        /// NUL byte.
        pub fn from_pathname<P: AsRef<Path>>(path: P) -> Result<LocalAddr> {
            let bytes = path.as_ref().as_os_str().as_bytes();
            if bytes.contains(&0) {
                return Err(Error::INVALID_ARGUMENT);
            }
            LocalAddr::with_name(&[bytes, &[0]])
        }

        /// Create an address in the abstract namespace.
        #[cfg(any(target_os = "android", target_os = "linux"))]
        pub fn from_abstract_name(name: &[u8]) -> Result<LocalAddr> {
            LocalAddr::with_name(&[&[0], name])
        }

        /// Create an unnamed address.
        pub fn unnamed() -> LocalAddr {
            LocalAddr::empty()
        }

        fn with_name(parts: &[&[u8]]) -> Result<LocalAddr> {
            let mut addr = LocalAddr::empty();
            let total: usize = parts.iter().map(|part| part.len()).sum();
            if total > addr.inner.sun_path.len() {
                return Err(Error::NAME_TOO_LONG);
            }
            let mut dst = addr.inner.sun_path.iter_mut();
            for byte in parts.iter().flat_map(|part| part.iter()) {
                if let Some(dst) = dst.next() {
                    *dst = *byte as libc::c_char;
                }
            }
            addr.length = (PATH_OFFSET + total) as libc::socklen_t;
            Ok(addr)
        }

        /// Bytes of `sun_path` that are in use.
        fn path_bytes(&self) -> &[u8] {
            let length = (self.length as usize)
                .saturating_sub(PATH_OFFSET)
                .min(self.inner.sun_path.len());
            // SAFETY: `c_char` and `u8` have the same layout.
            unsafe { slice::from_raw_parts(self.inner.sun_path.as_ptr().cast(), length) }
        }

        /// Returns true if the address is unnamed.
        pub fn is_unnamed(&self) -> bool {
            self.path_bytes().is_empty()
        }

        /// Returns the path of the address, if it's a pathname address.
        pub fn as_pathname(&self) -> Option<&Path> {
            match self.path_bytes() {
                [] | [0, ..] => None,
                bytes => {
                    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                    Some(Path::new(OsStr::from_bytes(&bytes[..end])))
                }
            }
        }

        /// Returns the name of the address, if it's in the abstract
        /// namespace.
        #[cfg(any(target_os = "android", target_os = "linux"))]
        pub fn as_abstract_name(&self) -> Option<&[u8]> {
            match self.path_bytes() {
                [0, name @ ..] => Some(name),
                _ => None,
            }
        }
    }

    impl PartialEq for LocalAddr {
        fn eq(&self, other: &LocalAddr) -> bool {
            self.path_bytes() == other.path_bytes()
        }
    }

    impl Eq for LocalAddr {}

    impl fmt::Debug for LocalAddr {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "LocalAddr({self})")
        }
    }

    impl fmt::Display for LocalAddr {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if let Some(path) = self.as_pathname() {
                write!(f, "{}", path.display())
            } else if self.is_unnamed() {
                f.write_str("(unnamed)")
            } else {
                let name = self.path_bytes().get(1..).unwrap_or_default();
                write!(f, "@{}", String::from_utf8_lossy(name))
            }
        }
    }

    impl SocketAddress for LocalAddr {}

    impl private::SocketAddress for LocalAddr {
        fn to_storage(&self) -> AddressStorage {
            let mut storage = AddressStorage::from_raw(&self.inner);
            let (_, length) = storage.as_mut_ptr();
            *length = self.length;
            storage
        }

        fn from_storage(storage: &AddressStorage) -> Result<Self> {
            if storage.family() != libc::AF_UNIX {
                return Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED);
            }
            let mut addr = LocalAddr::empty();
            let bytes = storage.as_bytes();
            let length = bytes.len().min(size_of::<libc::sockaddr_un>());
            let path = bytes.get(PATH_OFFSET..length).unwrap_or_default();
            for (dst, src) in addr.inner.sun_path.iter_mut().zip(path) {
                *dst = *src as libc::c_char;
            }
            addr.length = (PATH_OFFSET + path.len()) as libc::socklen_t;
            Ok(addr)
        }

        fn supports_family(family: i32) -> bool {
            family == libc::AF_UNIX
        }
    }
}
