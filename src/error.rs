use thiserror::Error;

/// Fatal errors. Per-candidate lookup failures are not errors, see [`crate::resolve::ProbeError`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid domain '{input}': {reason}")]
    InvalidDomain { input: String, reason: &'static str },

    #[error("unknown attack kind '{0}' (expected one of: {list} or all)", list = crate::attack::AttackKind::labels().join(", "))]
    UnknownAttackKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("resolver error: {0}")]
    Resolver(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
