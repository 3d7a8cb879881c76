/// Errors from parsing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid version label {label:?}: expected vMAJOR.MINOR.PATCH")]
    InvalidVersion { label: String },

    #[error("patch component of {version} is exhausted; release a new minor or major version")]
    VersionExhausted { version: crate::Version },
}
