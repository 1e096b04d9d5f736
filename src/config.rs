//! [`Config`]uration module.

use crate::net::{Domain, Protocol, Type};
use crate::{man_link, sys, Result, Socket};

/// Configuration of a [`Socket`].
///
/// Created by calling [`Socket::config`].
#[derive(Debug, Clone)]
#[must_use = "no socket is opened until `sockops::Config::open` is called"]
pub struct Config {
    pub(crate) domain: Domain,
    pub(crate) r#type: Type,
    pub(crate) protocol: Protocol,
    pub(crate) nonblocking: bool,
    /// Implementation specific configuration.
    pub(crate) sys: sys::config::Config,
}

impl Config {
    pub(crate) const fn new(domain: Domain, r#type: Type) -> Config {
        Config {
            domain,
            r#type,
            protocol: Protocol::DEFAULT,
            nonblocking: false,
            sys: sys::config::Config::new(),
        }
    }

    /// Set the protocol of the socket.
    ///
    /// Defaults to [`Protocol::DEFAULT`], which lets the OS pick the protocol
    /// based on the domain and type.
    pub const fn with_protocol(mut self, protocol: Protocol) -> Config {
        self.protocol = protocol;
        self
    }

    /// Open the socket in non-blocking mode.
    ///
    /// Defaults to false. See [`Socket::set_nonblocking`].
    pub const fn with_nonblocking(mut self, nonblocking: bool) -> Config {
        self.nonblocking = nonblocking;
        self
    }

    /// Open a new [`Socket`].
    #[doc = man_link!(socket(2))]
    #[doc(alias = "socket")]
    #[doc(alias = "WSASocketW")]
    pub fn open(self) -> Result<Socket> {
        let raw = sys::net::socket(&self)?;
        // SAFETY: the OS ensures that `raw` is valid and we're the only owner.
        Ok(unsafe { Socket::from_raw(raw) })
    }
}
