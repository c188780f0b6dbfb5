use std::io::Error as IoError;

use thiserror::Error;
use toxprobe::StartupError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Startup failed: {0}")]
    Startup(#[from] StartupError),
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}
