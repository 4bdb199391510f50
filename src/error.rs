use std::{error::Error, fmt, io};

use machine_learning::MlErr;

/// The result type used across the GAN crate.
pub type Result<T> = std::result::Result<T, GanErr>;

/// All errors that can occur while setting up or training the GAN.
#[derive(Debug)]
pub enum GanErr {
    /// A neural network primitive failed, usually because of mismatched shapes.
    Ml(MlErr),
    /// Invalid configuration, caught before training starts.
    InvalidConfig(String),
    /// The configuration could not be parsed.
    Json(serde_json::Error),
    Io(io::Error),
}

impl fmt::Display for GanErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ml(e) => write!(f, "model error: {e}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Json(e) => write!(f, "invalid json: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl Error for GanErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Ml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<MlErr> for GanErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<serde_json::Error> for GanErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<io::Error> for GanErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
