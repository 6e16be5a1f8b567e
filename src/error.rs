//! Error types and handling for the `samenmeten` crate

use thiserror::Error;

/// Main error type for the `samenmeten` crate
#[derive(Error, Debug)]
pub enum SamenMetenError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Transport failures (connection refused, timeout, TLS, ...)
    #[error("Network error: {message}")]
    Network { message: String },

    /// The API answered with a non-success status code
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// A response body could not be decoded into the expected payload
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Writing records to a sink failed
    #[error("Output error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SamenMetenError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn status<S: Into<String>>(status: u16, url: S) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SamenMetenError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file.")
            }
            SamenMetenError::Network { .. } => {
                "Unable to reach the sensor API. Please check your internet connection."
                    .to_string()
            }
            SamenMetenError::Status { status, .. } => {
                format!("The sensor API rejected the request (HTTP {status}).")
            }
            SamenMetenError::Decode { .. } => {
                "The sensor API returned data in an unexpected shape.".to_string()
            }
            SamenMetenError::Io { .. } => "Writing output failed.".to_string(),
        }
    }
}
