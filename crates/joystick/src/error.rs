use thiserror::Error;

use crate::config::ConfigError;

const EIO: i32 = 5;
const EBUSY: i32 = 16;
const EINVAL: i32 = 22;

/// Error type for context setup and transport operations.
#[derive(Debug, Error)]
pub enum Error {
    /// `assign_seat` may be called once per context.
    #[error("seat already assigned: {0}")]
    SeatAlreadyAssigned(String),
    /// The resource-access callback refused to open a device node.
    #[error("failed to open {path}: errno {errno}")]
    Open { path: String, errno: i32 },
    /// The transport failed to start or bind the seat.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Negative errno equivalent of the error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::SeatAlreadyAssigned(_) => -EBUSY,
            Error::Open { errno, .. } => -errno.abs(),
            Error::Transport(_) => -EIO,
            Error::Config(_) => -EINVAL,
        }
    }
}

/// Convenient result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
