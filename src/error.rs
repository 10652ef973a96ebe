//! Error types for the harvester.
//!
//! `HarvesterError` doubles as the diagnostic record stored in a harvest
//! session's error log: protocol-level conditions are collected rather than
//! propagated, so callers inspect the returned report instead of catching
//! errors (see [`crate::harvester`]).

use thiserror::Error;

use crate::protocol::OaiErrorCode;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// A required configuration field is empty.
    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),

    /// Endpoint URL could not be parsed.
    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },

    /// Invalid OAI-PMH datestamp.
    #[error("Invalid datestamp: '{0}'. Expected YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ")]
    InvalidDatestamp(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code.
    #[error("Unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// The repository reported an OAI-PMH protocol error.
    #[error("OAI-PMH error {code} for {query}: {message}")]
    Protocol {
        code: OaiErrorCode,
        message: String,
        /// The query URL that provoked the error, kept for diagnosis.
        query: String,
    },

    /// Retry budget for badResumptionToken exhausted.
    #[error("Retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
