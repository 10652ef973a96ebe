//! OAI-PMH response-page interpretation.
//!
//! Readers over a parsed `ListRecords` response document, plus the protocol
//! error-code taxonomy that drives the controller's state transitions:
//! `noRecordsMatch` is informational, `badResumptionToken` is recoverable,
//! everything else (including codes this client does not recognize) is
//! fatal for the session.

use std::fmt;

use roxmltree::{Document, Node};

use crate::xml::{descendants_named, get_text};

/// OAI-PMH protocol error codes (the `code` attribute of `<error>`).
///
/// Codes are compared by value; unrecognized codes are carried verbatim in
/// [`OaiErrorCode::Other`] rather than dropped, so the error log preserves
/// what the repository actually said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OaiErrorCode {
    BadArgument,
    BadResumptionToken,
    BadVerb,
    CannotDisseminateFormat,
    IdDoesNotExist,
    NoRecordsMatch,
    NoMetadataFormats,
    NoSetHierarchy,
    /// Any code not defined by the protocol revision this client knows.
    Other(String),
}

impl OaiErrorCode {
    /// Parse the wire form of an error code.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "badArgument" => Self::BadArgument,
            "badResumptionToken" => Self::BadResumptionToken,
            "badVerb" => Self::BadVerb,
            "cannotDisseminateFormat" => Self::CannotDisseminateFormat,
            "idDoesNotExist" => Self::IdDoesNotExist,
            "noRecordsMatch" => Self::NoRecordsMatch,
            "noMetadataFormats" => Self::NoMetadataFormats,
            "noSetHierarchy" => Self::NoSetHierarchy,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire form of this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BadArgument => "badArgument",
            Self::BadResumptionToken => "badResumptionToken",
            Self::BadVerb => "badVerb",
            Self::CannotDisseminateFormat => "cannotDisseminateFormat",
            Self::IdDoesNotExist => "idDoesNotExist",
            Self::NoRecordsMatch => "noRecordsMatch",
            Self::NoMetadataFormats => "noMetadataFormats",
            Self::NoSetHierarchy => "noSetHierarchy",
            Self::Other(code) => code,
        }
    }

    /// How the harvest controller must react to this code.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::NoRecordsMatch => Severity::Informational,
            Self::BadResumptionToken => Severity::Recoverable,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for OaiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a protocol error code, ordered by how badly it ends
/// the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The request window legitimately matched nothing; end successfully.
    Informational,
    /// Worth reissuing the original request, within the retry budget.
    Recoverable,
    /// Terminates the session immediately.
    Fatal,
}

/// One `<error>` element from a response page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    pub code: OaiErrorCode,
    /// Human-readable message, logged verbatim.
    pub message: String,
}

/// Collect all `<error>` elements from a response page.
///
/// Elements without a `code` attribute are not valid OAI-PMH errors but are
/// still reported, as [`OaiErrorCode::Other`] with an empty code.
pub fn protocol_errors(doc: &Document<'_>) -> Vec<ProtocolError> {
    descendants_named(doc, "error")
        .map(|n| ProtocolError {
            code: OaiErrorCode::parse(n.attribute("code").unwrap_or_default()),
            message: get_text(n),
        })
        .collect()
}

/// Collect all `<metadata>` elements from a response page.
pub fn metadata_fragments<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    descendants_named(doc, "metadata").collect()
}

/// Read the resumption token from a response page.
///
/// Returns `None` when the element is absent or empty; both signal the
/// final page. A non-empty token is opaque and returned untouched.
pub fn resumption_token(doc: &Document<'_>) -> Option<String> {
    descendants_named(doc, "resumptionToken")
        .next()
        .map(get_text)
        .filter(|t| !t.is_empty())
}
