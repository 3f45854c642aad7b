use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuakeError {
    #[error("Failed to open serial port {port}: {reason}")]
    PortOpen { port: String, reason: String },

    #[error("Failed to enumerate serial ports: {0}")]
    PortEnumeration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, QuakeError>;
