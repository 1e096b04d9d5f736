//! Socket options.
//!
//! See [`Socket::socket_option`] and [`Socket::set_socket_option`].
//!
//! [`Socket::socket_option`]: crate::Socket::socket_option
//! [`Socket::set_socket_option`]: crate::Socket::set_socket_option

use std::ffi::{c_int, c_void};
use std::mem::MaybeUninit;

use crate::net::{self, IPv4Opt, IPv6Opt, Level, Opt, SocketOpt, TcpOpt};

/// Trait that defines how get the value of a socket option.
///
/// See [`Socket::socket_option`].
///
/// [`Socket::socket_option`]: crate::Socket::socket_option
pub trait Get {
    /// Returned output.
    type Output: Sized;
    /// Type passed to the OS in the `getsockopt(2)` call.
    type Storage: Sized;

    /// Level to use, see [`Level`].
    const LEVEL: Level;
    /// Option to retrieve, see [`Opt`].
    const OPT: Opt;

    /// Returns a mutable raw pointer and length to `storage`.
    ///
    /// Default implementation casts a the pointer to `storage` and returns the
    /// size of `Storage` as length.
    ///
    /// # Safety
    ///
    /// Only initialised bytes may be written to the pointer returned.
    unsafe fn as_mut_ptr(storage: &mut MaybeUninit<Self::Storage>) -> (*mut c_void, u32) {
        (storage.as_mut_ptr().cast(), size_of::<Self::Storage>() as u32)
    }

    /// Initialise the value from `storage`, to which at least `length` bytes
    /// have been written (by the OS). The remaining bytes are zeroed.
    ///
    /// # Safety
    ///
    /// Caller must ensure that at least `length` bytes have been written to
    /// `storage` and that the remaining bytes are zeroed.
    unsafe fn init(storage: MaybeUninit<Self::Storage>, length: u32) -> Self::Output;
}

/// Trait that defines how set the value of a socket option.
///
/// See [`Socket::set_socket_option`].
///
/// [`Socket::set_socket_option`]: crate::Socket::set_socket_option
pub trait Set {
    /// Value to set.
    type Value: Sized;
    /// Type passed to the OS in the `setsockopt(2)` call.
    type Storage: Sized;

    /// Level to use, see [`Level`].
    const LEVEL: Level;
    /// Option to retrieve, see [`Opt`].
    const OPT: Opt;

    /// Returns the value as storage for the OS to read.
    fn as_storage(value: Self::Value) -> Self::Storage;
}

new_option! {
    /// Get and clear the pending socket error.
    #[doc(alias = "SO_ERROR")]
    pub Error {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::ERROR;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> Option<crate::Error> {
            let code = unsafe { storage.assume_init() };
            if code == 0 {
                None
            } else {
                Some(crate::Error::system(code))
            }
        }
    }

    /// Enable sending of keep-alive messages on connection-oriented
    /// sockets.
    #[doc(alias = "SO_KEEPALIVE")]
    pub KeepAlive {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::KEEP_ALIVE;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }

    /// Linger option, the number of seconds to linger on close or `None` if
    /// disabled.
    #[doc(alias = "SO_LINGER")]
    pub Linger {
        type Storage = LingerStorage;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::LINGER;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> Option<u32> {
            let linger = unsafe { storage.assume_init() };
            if linger.l_onoff != 0 {
                Some(linger.l_linger as u32)
            } else {
                None
            }
        }

        fn as_storage(value: Option<u32>) -> Self::Storage {
            linger(value)
        }
    }

    /// Allow reuse of local addresses.
    #[doc(alias = "SO_REUSEADDR")]
    pub ReuseAddress {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::REUSE_ADDR;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }

    /// Permit sending of broadcast messages.
    #[doc(alias = "SO_BROADCAST")]
    pub Broadcast {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::BROADCAST;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }

    /// Size of the receive buffer in bytes.
    ///
    /// Note that some OSs, e.g. Linux, double the value when setting it.
    #[doc(alias = "SO_RCVBUF")]
    pub ReceiveBuffer {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::RECV_BUF;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> u32 {
            unsafe { storage.assume_init().max(0) as u32 }
        }

        fn as_storage(value: u32) -> Self::Storage {
            value.min(c_int::MAX as u32) as c_int
        }
    }

    /// Size of the send buffer in bytes.
    #[doc(alias = "SO_SNDBUF")]
    pub SendBuffer {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::SEND_BUF;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> u32 {
            unsafe { storage.assume_init().max(0) as u32 }
        }

        fn as_storage(value: u32) -> Self::Storage {
            value.min(c_int::MAX as u32) as c_int
        }
    }

    /// Type.
    #[doc(alias = "SO_TYPE")]
    pub Type {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::TYPE;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> net::Type {
            unsafe { net::Type(storage.assume_init()) }
        }
    }

    /// Disable the Nagle algorithm, sending small segments as soon as
    /// possible.
    #[doc(alias = "TCP_NODELAY")]
    pub NoDelay {
        type Storage = c_int;
        const LEVEL = Level::TCP;
        const OPT = TcpOpt::NO_DELAY;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }

    /// Restrict an IPv6 socket to IPv6 communication only.
    #[doc(alias = "IPV6_V6ONLY")]
    pub Ipv6Only {
        type Storage = c_int;
        const LEVEL = Level::IPV6;
        const OPT = IPv6Opt::V6_ONLY;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }

    /// Time-to-live of outgoing IPv4 packets.
    #[doc(alias = "IP_TTL")]
    pub TimeToLive {
        type Storage = c_int;
        const LEVEL = Level::IPV4;
        const OPT = IPv4Opt::TTL;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> u32 {
            unsafe { storage.assume_init().max(0) as u32 }
        }

        fn as_storage(value: u32) -> Self::Storage {
            value.min(c_int::MAX as u32) as c_int
        }
    }
}

#[cfg(unix)]
new_option! {
    /// Allow multiple sockets to be bound to an identical socket address.
    #[doc(alias = "SO_REUSEPORT")]
    pub ReusePort {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::REUSE_PORT;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }

        fn as_storage(value: bool) -> Self::Storage {
            value.into()
        }
    }
}

#[cfg(any(
    target_os = "android",
    target_os = "freebsd",
    target_os = "linux",
    target_os = "netbsd"
))]
new_option! {
    /// Domain.
    #[doc(alias = "SO_DOMAIN")]
    pub Domain {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::DOMAIN;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> net::Domain {
            unsafe { net::Domain(storage.assume_init()) }
        }
    }

    /// Retrieves the socket protocol.
    #[doc(alias = "SO_PROTOCOL")]
    pub Protocol {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::PROTOCOL;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> net::Protocol {
            unsafe { net::Protocol(storage.assume_init()) }
        }
    }

    /// Returns a value indicating whether or not this socket has been
    /// marked to accept connections with `listen(2)`.
    #[doc(alias = "SO_ACCEPTCONN")]
    pub Accept {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::ACCEPT_CONN;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> bool {
            unsafe { storage.assume_init() != 0 }
        }
    }
}

#[cfg(any(target_os = "android", target_os = "linux"))]
new_option! {
    /// CPU affinity.
    #[doc(alias = "SO_INCOMING_CPU")]
    pub IncomingCpu {
        type Storage = c_int;
        const LEVEL = Level::SOCKET;
        const OPT = SocketOpt::INCOMING_CPU;

        unsafe fn init(storage: MaybeUninit<Self::Storage>, _length: u32) -> Option<u32> {
            let value = unsafe { storage.assume_init() };
            if value.is_negative() { None } else { Some(value as u32) }
        }

        fn as_storage(value: u32) -> Self::Storage {
            value.min(c_int::MAX as u32) as c_int
        }
    }
}

#[cfg(unix)]
type LingerStorage = libc::linger;

#[cfg(windows)]
type LingerStorage = windows_sys::Win32::Networking::WinSock::LINGER;

#[allow(clippy::cast_possible_truncation)]
fn linger(value: Option<u32>) -> LingerStorage {
    LingerStorage {
        l_onoff: value.is_some().into(),
        l_linger: value.unwrap_or(0).min(u32::from(u16::MAX)) as _,
    }
}

macro_rules! new_option {
    (
        $(
        $(#[$type_meta:meta])*
        $type_vis: vis $type_name: ident {
            type Storage = $storage: ty;
            const LEVEL = $level: expr;
            const OPT = $opt: expr;

            // option::Get implementation.
            $(
            unsafe fn init($init_storage: ident: MaybeUninit<Self::Storage>, $init_length: ident: u32) -> $output: ty $init: block
            )?

            // option::Set implementation.
            $(
            fn as_storage($as_storage_value: ident: $value: ty) -> Self::Storage $as_storage: block
            )?
        }
        )*
    ) => {
        $(
        $(#[$type_meta])*
        #[allow(missing_debug_implementations)]
        $type_vis enum $type_name {}

        $(
        impl Get for $type_name {
            type Output = $output;
            type Storage = $storage;

            const LEVEL: Level = $level;
            const OPT: Opt = $opt.into_opt();

            unsafe fn init($init_storage: MaybeUninit<Self::Storage>, $init_length: u32) -> Self::Output {
                $init
            }
        }
        )?

        $(
        impl Set for $type_name {
            type Value = $value;
            type Storage = $storage;

            const LEVEL: Level = $level;
            const OPT: Opt = $opt.into_opt();

            fn as_storage($as_storage_value: Self::Value) -> Self::Storage {
                $as_storage
            }
        }
        )?
        )*
    };
}

use new_option;
