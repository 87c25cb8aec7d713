// src/error.rs
//! Error type shared by the fallible seams (config, network, documents).
//!
//! The engine itself never fails: a missing table or an unknown column name is
//! an abstention, not an error. Only I/O-adjacent code returns `Result`.

/// Errors raised by the host layer and peripheral features.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a document, config file or socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server answered with a non-success status line.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code, 0 if the status line could not be parsed.
        status: u16,
        /// Status line or short body excerpt.
        message: String,
    },

    /// A base URL or form action could not be parsed/resolved.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A JSON body did not have the expected shape.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Something we deliberately do not speak (e.g. `https://` on the raw socket client).
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A config file line could not be understood.
    #[error("Config line {line}: {message}")]
    Config {
        line: usize,
        message: String,
    },
}

impl Error {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    pub fn config(line: usize, message: impl Into<String>) -> Self {
        Self::Config { line, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
