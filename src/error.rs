use thiserror::Error;

/// Failures resolving the interface that seeds a scan. All of them abort before probing starts.
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// No interface called `name` carries an address; an interface with none is indistinguishable.
    #[error("no addresses found for interface `{name}`")]
    NotFound { name: String },

    #[error("interface `{name}` has no IPv4 address")]
    NoIpv4 { name: String },

    #[error("failed to enumerate network interfaces")]
    Enumerate(#[from] std::io::Error),
}
