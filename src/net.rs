//! Networking.
//!
//! To open a socket ([`Socket`]) use [`socket`] or [`Socket::config`]. All
//! operations on a socket are defined as methods on [`Socket`] in this
//! module. Name resolution is provided by [`resolve`] and friends.

use std::ffi::c_void;
use std::io::{IoSlice, IoSliceMut};
use std::mem::{take, MaybeUninit};

use crate::sys::native;
use crate::{man_link, new_flag, sys, Error, Result, Socket};

pub(crate) mod address;
pub mod option;
mod resolve;

pub use address::{Endpoint, NoAddress, SocketAddress};
#[cfg(unix)]
pub use address::LocalAddr;
pub(crate) use address::AddressStorage;
#[doc(no_inline)]
pub use option::{Get as GetSocketOption, Set as SetSocketOption};
pub use resolve::{
    binary_to_text, endpoint_to_text, resolve, reverse_resolve, text_to_binary, text_to_endpoint,
    Candidate, Hints, NameFlag, Resolution, ResolveFlag,
};
#[doc(no_inline)]
pub use std::net::Shutdown;

/// Open a new socket with the default configuration.
///
/// Use [`Socket::config`] for more options. If `protocol` is `None` the OS
/// picks the protocol based on `domain` and `type`.
#[doc = man_link!(socket(2))]
pub fn socket(domain: Domain, r#type: Type, protocol: Option<Protocol>) -> Result<Socket> {
    Socket::config(domain, r#type)
        .with_protocol(protocol.unwrap_or(Protocol::DEFAULT))
        .open()
}

/// Socket related system calls.
impl Socket {
    /// Assign a local address to the socket.
    #[doc = man_link!(bind(2))]
    pub fn bind<A: SocketAddress>(&self, address: A) -> Result<()> {
        let storage = address.to_storage();
        sys::net::bind(self.raw(), &storage)
    }

    /// Mark the socket as a passive socket, i.e. allow it to accept incoming
    /// connections using [`Socket::accept`].
    #[doc = man_link!(listen(2))]
    pub fn listen(&self, backlog: i32) -> Result<()> {
        sys::net::listen(self.raw(), backlog)
    }

    /// Accept a new connection, returning the connected socket and the
    /// address of the peer.
    ///
    /// Use [`NoAddress`] if the address of the peer is not needed.
    ///
    /// The listening socket is not modified. On a non-blocking socket this
    /// returns [`Error::WOULD_BLOCK`] if no connection is pending.
    ///
    /// Returns [`Error::ADDRESS_FAMILY_NOT_SUPPORTED`], without accepting a
    /// connection, if the address of the listening socket can't be read as
    /// `A`.
    #[doc = man_link!(accept(2))]
    #[doc(alias = "accept4")]
    pub fn accept<A: SocketAddress>(&self) -> Result<(Socket, A)> {
        // The peer's address is of the same family as the listener's.
        if !A::IGNORED {
            let mut storage = AddressStorage::uninit();
            sys::net::local_addr(self.raw(), &mut storage)?;
            if !A::supports_family(storage.family()) {
                return Err(Error::ADDRESS_FAMILY_NOT_SUPPORTED);
            }
        }

        let mut storage = AddressStorage::uninit();
        let raw = sys::net::accept(self.raw(), &mut storage)?;
        // SAFETY: the OS ensures that `raw` is valid and we're the only
        // owner.
        let socket = unsafe { Socket::from_raw(raw) };
        let address = A::from_storage(&storage)?;
        Ok((socket, address))
    }

    /// Initiate a connection on this socket to the specified address.
    ///
    /// Failures, such as [`Error::CONNECTION_REFUSED`], are returned and never
    /// retried. On a non-blocking socket this returns
    /// [`Error::IN_PROGRESS`] (or [`Error::WOULD_BLOCK`] on Windows) if the
    /// connection can't be completed immediately.
    #[doc = man_link!(connect(2))]
    pub fn connect<A: SocketAddress>(&self, address: A) -> Result<()> {
        let storage = address.to_storage();
        sys::net::connect(self.raw(), &storage)
    }

    /// Send the bytes in `buf` to the peer.
    ///
    /// Returns the number of bytes written, which might be less than the
    /// length of `buf`. Use [`Socket::send_all`] to send all bytes.
    #[doc = man_link!(send(2))]
    pub fn send(&self, buf: &[u8], flags: Option<SendFlag>) -> Result<usize> {
        sys::net::send(self.raw(), buf, send_flags(flags))
    }

    /// Send the bytes in `bufs` to the peer.
    ///
    /// Same as [`Socket::send`], but using multiple buffers.
    #[doc(alias = "sendmsg")]
    #[doc(alias = "WSASend")]
    pub fn send_vectored(&self, bufs: &[IoSlice<'_>], flags: Option<SendFlag>) -> Result<usize> {
        sys::net::send_to(self.raw(), bufs, &AddressStorage::none(), send_flags(flags))
    }

    /// Send all bytes in `buf` to the peer.
    ///
    /// Calls [`Socket::send`] until all bytes are written. If it returns an
    /// error an unknown number of bytes have been written.
    pub fn send_all(&self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.send(buf, None)? {
                0 => return Err(Error::BROKEN_PIPE),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }

    /// Send the bytes in `buf` to `address`.
    #[doc = man_link!(sendto(2))]
    pub fn send_to<A: SocketAddress>(
        &self,
        buf: &[u8],
        address: A,
        flags: Option<SendFlag>,
    ) -> Result<usize> {
        self.send_to_vectored(&[IoSlice::new(buf)], address, flags)
    }

    /// Send the bytes in `bufs` to `address`.
    #[doc = man_link!(sendmsg(2))]
    #[doc(alias = "WSASendTo")]
    pub fn send_to_vectored<A: SocketAddress>(
        &self,
        bufs: &[IoSlice<'_>],
        address: A,
        flags: Option<SendFlag>,
    ) -> Result<usize> {
        let storage = address.to_storage();
        sys::net::send_to(self.raw(), bufs, &storage, send_flags(flags))
    }

    /// Send the bytes in `bufs` to `address`, including the ancillary data in
    /// `control`.
    ///
    /// Use [`NoAddress`] on connected sockets.
    #[cfg(unix)]
    #[doc = man_link!(sendmsg(2))]
    pub fn send_msg<A: SocketAddress>(
        &self,
        bufs: &[IoSlice<'_>],
        address: A,
        control: &[u8],
        flags: Option<SendFlag>,
    ) -> Result<usize> {
        let storage = address.to_storage();
        sys::net::send_msg(self.raw(), bufs, &storage, control, send_flags(flags))
    }

    /// Receive bytes from the peer into `buf`.
    ///
    /// Returns the number of bytes read. On a stream socket `Ok(0)` means
    /// the peer has performed an orderly shutdown (end of file), this is
    /// never returned as an error. On a non-blocking socket this returns
    /// [`Error::WOULD_BLOCK`] if no data is available.
    #[doc = man_link!(recv(2))]
    pub fn recv(&self, buf: &mut [u8], flags: Option<RecvFlag>) -> Result<usize> {
        sys::net::recv(self.raw(), buf, recv_flags(flags))
    }

    /// Receive bytes from the peer into `bufs`.
    ///
    /// Same as [`Socket::recv`], but using multiple buffers.
    #[doc(alias = "recvmsg")]
    #[doc(alias = "WSARecv")]
    pub fn recv_vectored(
        &self,
        bufs: &mut [IoSliceMut<'_>],
        flags: Option<RecvFlag>,
    ) -> Result<usize> {
        let mut storage = AddressStorage::none();
        sys::net::recv_from(self.raw(), bufs, &mut storage, recv_flags(flags))
    }

    /// Receive bytes until `buf` is filled.
    ///
    /// Returns [`Error::EOF`] if the peer performs an orderly shutdown before
    /// `buf` is filled, in which case an unknown number of bytes have been
    /// read.
    pub fn recv_exact(&self, mut buf: &mut [u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.recv(buf, None)? {
                0 => return Err(Error::EOF),
                n => buf = &mut take(&mut buf)[n..],
            }
        }
        Ok(())
    }

    /// Receive bytes into `buf`, returning the number of bytes read and the
    /// address of the sender.
    ///
    /// The address is `None` if the OS didn't return one, e.g. on connected
    /// stream sockets, or if it can't be read as `A`. The bytes are received
    /// either way.
    #[doc = man_link!(recvfrom(2))]
    pub fn recv_from<A: SocketAddress>(
        &self,
        buf: &mut [u8],
        flags: Option<RecvFlag>,
    ) -> Result<(usize, Option<A>)> {
        self.recv_from_vectored(&mut [IoSliceMut::new(buf)], flags)
    }

    /// Receive bytes into `bufs`, returning the number of bytes read and the
    /// address of the sender.
    ///
    /// See [`Socket::recv_from`] for when the address is `None`.
    #[doc = man_link!(recvmsg(2))]
    #[doc(alias = "WSARecvFrom")]
    pub fn recv_from_vectored<A: SocketAddress>(
        &self,
        bufs: &mut [IoSliceMut<'_>],
        flags: Option<RecvFlag>,
    ) -> Result<(usize, Option<A>)> {
        let mut storage = AddressStorage::uninit();
        let n = sys::net::recv_from(self.raw(), bufs, &mut storage, recv_flags(flags))?;
        Ok((n, A::from_storage(&storage).ok()))
    }

    /// Receive bytes into `bufs` and ancillary data into `control`.
    #[cfg(unix)]
    #[doc = man_link!(recvmsg(2))]
    pub fn recv_msg<A: SocketAddress>(
        &self,
        bufs: &mut [IoSliceMut<'_>],
        control: &mut [u8],
        flags: Option<RecvFlag>,
    ) -> Result<RecvMsg<A>> {
        let mut storage = AddressStorage::uninit();
        let (bytes, control_len, flags) =
            sys::net::recv_msg(self.raw(), bufs, &mut storage, control, recv_flags(flags))?;
        let address = A::from_storage(&storage).ok();
        Ok(RecvMsg {
            bytes,
            address,
            control_len,
            flags: RecvFlag(flags),
        })
    }

    /// Shut down the read, write, or both halves of this connection.
    #[doc = man_link!(shutdown(2))]
    pub fn shutdown(&self, how: Shutdown) -> Result<()> {
        sys::net::shutdown(self.raw(), how)
    }

    /// Returns the local address of the socket.
    #[doc = man_link!(getsockname(2))]
    pub fn local_addr<A: SocketAddress>(&self) -> Result<A> {
        let mut storage = AddressStorage::uninit();
        sys::net::local_addr(self.raw(), &mut storage)?;
        A::from_storage(&storage)
    }

    /// Returns the address of the peer the socket is connected to.
    #[doc = man_link!(getpeername(2))]
    pub fn peer_addr<A: SocketAddress>(&self) -> Result<A> {
        let mut storage = AddressStorage::uninit();
        sys::net::peer_addr(self.raw(), &mut storage)?;
        A::from_storage(&storage)
    }

    /// Get socket option.
    ///
    /// See the [`option`] module for the available options.
    #[doc = man_link!(getsockopt(2))]
    pub fn socket_option<T: option::Get>(&self) -> Result<T::Output> {
        let mut storage = MaybeUninit::<T::Storage>::zeroed();
        // SAFETY: the OS only writes initialised bytes.
        let (ptr, mut length) = unsafe { T::as_mut_ptr(&mut storage) };
        // SAFETY: `ptr` and `length` describe `storage`.
        unsafe {
            sys::net::get_option(self.raw(), T::LEVEL.0, T::OPT.0, ptr, &mut length)?;
        }
        // SAFETY: the OS initialised `length` bytes, the rest is zeroed.
        Ok(unsafe { T::init(storage, length) })
    }

    /// Set socket option.
    ///
    /// See the [`option`] module for the available options.
    #[doc = man_link!(setsockopt(2))]
    pub fn set_socket_option<T: option::Set>(&self, value: T::Value) -> Result<()> {
        let storage = T::as_storage(value);
        let ptr = std::ptr::from_ref(&storage).cast::<c_void>();
        let length = size_of::<T::Storage>() as u32;
        // SAFETY: `ptr` and `length` describe `storage`.
        unsafe { sys::net::set_option(self.raw(), T::LEVEL.0, T::OPT.0, ptr, length) }
    }

    /// Get the raw value of a socket option, not interpreting the value.
    ///
    /// Returns the number of bytes written to `value`.
    pub fn socket_option_raw(&self, level: Level, opt: Opt, value: &mut [u8]) -> Result<usize> {
        let mut length = u32::try_from(value.len()).map_err(|_| Error::INVALID_ARGUMENT)?;
        let ptr = value.as_mut_ptr().cast::<c_void>();
        // SAFETY: `ptr` and `length` describe `value`.
        unsafe { sys::net::get_option(self.raw(), level.0, opt.0, ptr, &mut length)? };
        Ok(length as usize)
    }

    /// Set the raw value of a socket option, not interpreting the value.
    pub fn set_socket_option_raw(&self, level: Level, opt: Opt, value: &[u8]) -> Result<()> {
        let length = u32::try_from(value.len()).map_err(|_| Error::INVALID_ARGUMENT)?;
        let ptr = value.as_ptr().cast::<c_void>();
        // SAFETY: `ptr` and `length` describe `value`.
        unsafe { sys::net::set_option(self.raw(), level.0, opt.0, ptr, length) }
    }

    /// Get and clear the pending socket error.
    ///
    /// Shorthand for the [`option::Error`] option.
    #[doc(alias = "SO_ERROR")]
    pub fn take_error(&self) -> Result<Option<Error>> {
        self.socket_option::<option::Error>()
    }
}

fn send_flags(flags: Option<SendFlag>) -> i32 {
    let flags = flags.map_or(0, |flags| flags.0);
    flags | sys::net::DEFAULT_SEND_FLAGS
}

fn recv_flags(flags: Option<RecvFlag>) -> i32 {
    flags.map_or(0, |flags| flags.0)
}

/// Message received using [`Socket::recv_msg`].
#[cfg(unix)]
#[derive(Debug)]
pub struct RecvMsg<A> {
    /// Number of bytes received.
    pub bytes: usize,
    /// Address of the sender, see [`Socket::recv_from`] for when it's
    /// `None`.
    pub address: Option<A>,
    /// Number of bytes written into the control buffer.
    pub control_len: usize,
    /// Flags returned by the OS, e.g. [`RecvFlag::TRUNCATE`].
    pub flags: RecvFlag,
}

new_flag!(
    /// Communication domain of a socket.
    pub struct Domain(i32) {
        /// Unspecified, any domain.
        UNSPECIFIED = native::AF_UNSPEC,
        /// Domain for IPv4 communication.
        IPV4 = native::AF_INET,
        /// Domain for IPv6 communication.
        IPV6 = native::AF_INET6,
        /// Domain for Unix socket communication.
        #[cfg(unix)]
        UNIX = native::AF_UNIX,
    }

    /// Communication semantics of a socket.
    pub struct Type(i32) {
        /// Provides sequenced, reliable, two-way, connection-based byte
        /// streams.
        STREAM = native::SOCK_STREAM,
        /// Supports datagrams (connectionless, unreliable messages of a fixed
        /// maximum length).
        DGRAM = native::SOCK_DGRAM,
        /// Provides raw network protocol access.
        RAW = native::SOCK_RAW,
        /// Provides a sequenced, reliable, two-way connection-based data
        /// transmission path for datagrams of fixed maximum length.
        SEQPACKET = native::SOCK_SEQPACKET,
    }

    /// Protocol used by a socket.
    pub struct Protocol(i32) {
        /// Let the OS pick the protocol.
        DEFAULT = 0,
        /// Internet Control Message Protocol IPv4.
        ICMPV4 = native::IPPROTO_ICMP,
        /// Internet Control Message Protocol IPv6.
        ICMPV6 = native::IPPROTO_ICMPV6,
        /// Transmission Control Protocol.
        TCP = native::IPPROTO_TCP,
        /// User Datagram Protocol.
        UDP = native::IPPROTO_UDP,
    }

    /// Socket option level.
    pub struct Level(i32) {
        /// Socket level, options in [`SocketOpt`].
        SOCKET = native::SOL_SOCKET,
        /// IPv4 level, options in [`IPv4Opt`].
        IPV4 = native::IPPROTO_IP,
        /// IPv6 level, options in [`IPv6Opt`].
        IPV6 = native::IPPROTO_IPV6,
        /// TCP level, options in [`TcpOpt`].
        TCP = native::IPPROTO_TCP,
        /// UDP level.
        UDP = native::IPPROTO_UDP,
    }

    /// Socket option, at any level.
    ///
    /// See [`SocketOpt`], [`IPv4Opt`], [`IPv6Opt`] and [`TcpOpt`] for the
    /// named options.
    pub struct Opt(i32) {}

    /// Socket level option.
    pub struct SocketOpt(i32) {
        /// Get and clear the pending socket error.
        ERROR = native::SO_ERROR,
        /// Enable sending of keep-alive messages.
        KEEP_ALIVE = native::SO_KEEPALIVE,
        /// Linger on close if data is present.
        LINGER = native::SO_LINGER,
        /// Allow reuse of local addresses.
        REUSE_ADDR = native::SO_REUSEADDR,
        /// Allow multiple sockets to be bound to an identical socket address.
        #[cfg(unix)]
        REUSE_PORT = native::SO_REUSEPORT,
        /// Permit sending of broadcast messages.
        BROADCAST = native::SO_BROADCAST,
        /// Maximum socket receive buffer in bytes.
        RECV_BUF = native::SO_RCVBUF,
        /// Maximum socket send buffer in bytes.
        SEND_BUF = native::SO_SNDBUF,
        /// Socket type, see [`Type`].
        TYPE = native::SO_TYPE,
        /// Socket domain, see [`Domain`].
        #[cfg(any(target_os = "android", target_os = "freebsd", target_os = "linux", target_os = "netbsd"))]
        DOMAIN = native::SO_DOMAIN,
        /// Socket protocol, see [`Protocol`].
        #[cfg(any(target_os = "android", target_os = "freebsd", target_os = "linux", target_os = "netbsd"))]
        PROTOCOL = native::SO_PROTOCOL,
        /// Whether or not the socket is listening.
        #[cfg(any(target_os = "android", target_os = "freebsd", target_os = "linux", target_os = "netbsd"))]
        ACCEPT_CONN = native::SO_ACCEPTCONN,
        /// CPU affinity of the socket.
        #[cfg(any(target_os = "android", target_os = "linux"))]
        INCOMING_CPU = native::SO_INCOMING_CPU,
    }

    /// IPv4 level option.
    pub struct IPv4Opt(i32) {
        /// Time-to-live of outgoing packets.
        TTL = native::IP_TTL,
    }

    /// IPv6 level option.
    pub struct IPv6Opt(i32) {
        /// Restrict the socket to IPv6 communication only.
        V6_ONLY = native::IPV6_V6ONLY,
    }

    /// TCP level option.
    pub struct TcpOpt(i32) {
        /// Disable the Nagle algorithm.
        NO_DELAY = native::TCP_NODELAY,
    }

    /// Flags for [`Socket::send`] and related functions.
    pub struct SendFlag(i32) impl BitOr {
        /// Send out-of-band data.
        OUT_OF_BAND = native::MSG_OOB,
        /// Don't use a gateway to send out the packet.
        DONT_ROUTE = native::MSG_DONTROUTE,
        /// Enable non-blocking operation for this call only.
        #[cfg(unix)]
        DONT_WAIT = native::MSG_DONTWAIT,
        /// Terminates a record.
        #[cfg(unix)]
        END_OF_RECORD = native::MSG_EOR,
    }

    /// Flags for [`Socket::recv`] and related functions.
    pub struct RecvFlag(i32) impl BitOr {
        /// Return data from the beginning of the receive queue without
        /// removing it.
        PEEK = native::MSG_PEEK,
        /// Receive out-of-band data.
        OUT_OF_BAND = native::MSG_OOB,
        /// Block until the full request is satisfied.
        WAIT_ALL = native::MSG_WAITALL,
        /// Enable non-blocking operation for this call only.
        #[cfg(unix)]
        DONT_WAIT = native::MSG_DONTWAIT,
        /// Return the real length of the packet or datagram, even when it was
        /// longer than the passed buffer. Also set by the OS when the data
        /// was truncated.
        #[cfg(unix)]
        TRUNCATE = native::MSG_TRUNC,
        /// Set by the OS when the control data was truncated.
        #[cfg(unix)]
        CONTROL_TRUNCATE = native::MSG_CTRUNC,
    }
);

impl SocketOpt {
    /// Convert into a generic [`Opt`].
    pub const fn into_opt(self) -> Opt {
        Opt(self.0)
    }
}

impl IPv4Opt {
    /// Convert into a generic [`Opt`].
    pub const fn into_opt(self) -> Opt {
        Opt(self.0)
    }
}

impl IPv6Opt {
    /// Convert into a generic [`Opt`].
    pub const fn into_opt(self) -> Opt {
        Opt(self.0)
    }
}

impl TcpOpt {
    /// Convert into a generic [`Opt`].
    pub const fn into_opt(self) -> Opt {
        Opt(self.0)
    }
}
