//! Unix configuration.

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) close_on_exec: bool,
}

impl Config {
    pub(crate) const fn new() -> Config {
        Config {
            close_on_exec: true,
        }
    }
}

impl crate::Config {
    /// Set the close-on-exec flag on the socket, ensuring it's not leaked
    /// into child processes.
    ///
    /// Defaults to true.
    #[doc(alias = "SOCK_CLOEXEC")]
    #[doc(alias = "FD_CLOEXEC")]
    pub const fn with_close_on_exec(mut self, close_on_exec: bool) -> Self {
        self.sys.close_on_exec = close_on_exec;
        self
    }
}
