//! Windows configuration.

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) inherit: bool,
}

impl Config {
    pub(crate) const fn new() -> Config {
        Config { inherit: false }
    }
}

impl crate::Config {
    /// Allow the socket to be inherited by child processes.
    ///
    /// Defaults to false.
    #[doc(alias = "WSA_FLAG_NO_HANDLE_INHERIT")]
    pub const fn with_inherit(mut self, inherit: bool) -> Self {
        self.sys.inherit = inherit;
        self
    }
}
