//! Harvest configuration: the immutable per-repository request data and
//! the query URLs built from it.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::error::{HarvesterError, Result};
use crate::metadata::OaiMetadataHandler;

/// The only OAI-PMH verb this harvester speaks.
pub const LIST_RECORDS_VERB: &str = "ListRecords";

/// OAI-PMH datestamp, day granularity.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// OAI-PMH datestamp, seconds granularity (always UTC).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SECONDS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex"));

/// Validate an OAI-PMH request-window datestamp.
///
/// Accepts the two granularities the protocol defines: `YYYY-MM-DD` and
/// `YYYY-MM-DDThh:mm:ssZ`. The string must also denote a real calendar
/// date.
///
/// # Examples
/// ```
/// use oai_harvester::config::validate_datestamp;
///
/// assert!(validate_datestamp("2024-01-31").is_ok());
/// assert!(validate_datestamp("2024-01-31T23:59:59Z").is_ok());
/// assert!(validate_datestamp("31-01-2024").is_err());
/// ```
pub fn validate_datestamp(datestamp: &str) -> Result<()> {
    if DAY_PATTERN.is_match(datestamp) {
        chrono::NaiveDate::parse_from_str(datestamp, "%Y-%m-%d")
            .map_err(|_| HarvesterError::InvalidDatestamp(datestamp.to_string()))?;
        return Ok(());
    }
    if SECONDS_PATTERN.is_match(datestamp) {
        chrono::NaiveDateTime::parse_from_str(datestamp, "%Y-%m-%dT%H:%M:%SZ")
            .map_err(|_| HarvesterError::InvalidDatestamp(datestamp.to_string()))?;
        return Ok(());
    }
    Err(HarvesterError::InvalidDatestamp(datestamp.to_string()))
}

/// Immutable request data addressing one repository and record subset.
///
/// Constructed once per archival unit and shared read-only across all
/// pages of a harvest session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiRequestData {
    endpoint_url: String,
    metadata_namespace_uri: String,
    url_tag_name: String,
    set_spec: String,
    metadata_prefix: String,
}

impl OaiRequestData {
    /// Build request data from explicit fields.
    ///
    /// Fails fast when `endpoint_url`, `metadata_namespace_uri`, or
    /// `url_tag_name` is empty, or when the endpoint is not an absolute
    /// URL. `set_spec` may be empty (harvest the whole repository).
    pub fn new(
        endpoint_url: impl Into<String>,
        metadata_namespace_uri: impl Into<String>,
        url_tag_name: impl Into<String>,
        set_spec: impl Into<String>,
        metadata_prefix: impl Into<String>,
    ) -> Result<Self> {
        let data = Self {
            endpoint_url: endpoint_url.into(),
            metadata_namespace_uri: metadata_namespace_uri.into(),
            url_tag_name: url_tag_name.into(),
            set_spec: set_spec.into(),
            metadata_prefix: metadata_prefix.into(),
        };

        if data.endpoint_url.is_empty() {
            return Err(HarvesterError::MissingField("endpoint_url"));
        }
        if data.metadata_namespace_uri.is_empty() {
            return Err(HarvesterError::MissingField("metadata_namespace_uri"));
        }
        if data.url_tag_name.is_empty() {
            return Err(HarvesterError::MissingField("url_tag_name"));
        }
        if let Err(e) = Url::parse(&data.endpoint_url) {
            return Err(HarvesterError::InvalidEndpoint {
                url: data.endpoint_url,
                message: e.to_string(),
            });
        }

        Ok(data)
    }

    /// Build request data taking namespace, tag, and prefix from a
    /// metadata strategy, so the caller does not repeat them.
    ///
    /// Fails if the strategy reports an empty prefix, namespace, or tag.
    pub fn from_handler(
        endpoint_url: impl Into<String>,
        set_spec: impl Into<String>,
        handler: &dyn OaiMetadataHandler,
    ) -> Result<Self> {
        if handler.metadata_prefix().is_empty() {
            return Err(HarvesterError::MissingField("metadata_prefix"));
        }
        Self::new(
            endpoint_url,
            handler.metadata_namespace_uri(),
            handler.url_tag_name(),
            set_spec,
            handler.metadata_prefix(),
        )
    }

    /// Repository endpoint URL.
    #[must_use]
    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Namespace URI of the URL-bearing metadata element.
    #[must_use]
    pub fn metadata_namespace_uri(&self) -> &str {
        &self.metadata_namespace_uri
    }

    /// Local name of the URL-bearing metadata element.
    #[must_use]
    pub fn url_tag_name(&self) -> &str {
        &self.url_tag_name
    }

    /// Set specifier scoping the harvest, possibly empty.
    #[must_use]
    pub fn set_spec(&self) -> &str {
        &self.set_spec
    }

    /// metadataPrefix request argument.
    #[must_use]
    pub fn metadata_prefix(&self) -> &str {
        &self.metadata_prefix
    }

    /// Build the first-page query URL for a request window.
    ///
    /// The `set` parameter is only sent when `set_spec` is non-empty; an
    /// empty `set=` would itself be a badArgument against compliant
    /// repositories.
    pub fn list_records_url(&self, from: &str, until: &str) -> Result<Url> {
        let mut params = vec![
            ("verb", LIST_RECORDS_VERB),
            ("from", from),
            ("until", until),
            ("metadataPrefix", self.metadata_prefix.as_str()),
        ];
        if !self.set_spec.is_empty() {
            params.push(("set", self.set_spec.as_str()));
        }
        self.build_url(&params)
    }

    /// Build a continuation-page query URL.
    ///
    /// Per the protocol a non-empty resumption token alone addresses the
    /// next page: from/until/set/prefix must not be resent. The token is
    /// opaque and percent-encoded as-is.
    pub fn resumption_url(&self, token: &str) -> Result<Url> {
        self.build_url(&[("verb", LIST_RECORDS_VERB), ("resumptionToken", token)])
    }

    fn build_url(&self, params: &[(&str, &str)]) -> Result<Url> {
        Url::parse_with_params(&self.endpoint_url, params).map_err(|e| {
            HarvesterError::InvalidEndpoint {
                url: self.endpoint_url.clone(),
                message: e.to_string(),
            }
        })
    }
}
