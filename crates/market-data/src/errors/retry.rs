/// What the registry does after a provider fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Stop the chain and surface the error.
    Never,

    /// The provider is throttled or slow. Move on without retrying it.
    WithBackoff,

    /// The provider cannot serve this request; another one may.
    NextProvider,
}

impl RetryClass {
    pub fn allows_failover(self) -> bool {
        !matches!(self, Self::Never)
    }
}
