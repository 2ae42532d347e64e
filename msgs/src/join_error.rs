use thiserror::Error;

/// Why a `join` was refused. The display text is the wire reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum JoinError {
    #[error("not found")]
    #[serde(rename = "not found")]
    NotFound,
    #[error("full")]
    #[serde(rename = "full")]
    Full,
    #[error("already started")]
    #[serde(rename = "already started")]
    AlreadyStarted,
}
