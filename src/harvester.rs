//! Harvest controller: the `ListRecords` state machine.
//!
//! One call to [`harvest`] drives a whole session: issue the first-page
//! request, classify protocol errors, extract URLs through the injected
//! metadata strategy, follow resumption tokens until exhausted, and retry
//! the original request a bounded number of times on `badResumptionToken`.
//!
//! Nothing escapes this module as an `Err` under normal operation. Every
//! failure is collected into the session's error log and the caller reads
//! the terminal state plus whatever URLs were legitimately gathered before
//! things went wrong.

use std::collections::BTreeSet;

use reqwest::blocking::Client;
use reqwest::Url;
use roxmltree::Document;

use crate::config::{validate_datestamp, OaiRequestData};
use crate::error::HarvesterError;
use crate::metadata::OaiMetadataHandler;
use crate::protocol::{metadata_fragments, protocol_errors, resumption_token, Severity};

/// Terminal state of a harvest session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    /// All pages consumed, or the window legitimately matched nothing.
    Done,
    /// A fatal condition stopped the session; the URL set may be partial.
    Failed,
}

/// Everything a session exposes to its caller.
#[derive(Debug)]
pub struct HarvestReport {
    /// De-duplicated content URLs discovered across all pages.
    pub urls: BTreeSet<String>,
    /// Diagnostic log, most recent first. May be non-empty even on
    /// `Done`: `noRecordsMatch` and per-fragment extraction misses are
    /// recorded but non-fatal.
    pub errors: Vec<HarvesterError>,
    /// How the session ended.
    pub state: HarvestState,
}

impl HarvestReport {
    /// Whether the session consumed its window successfully.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == HarvestState::Done
    }
}

/// Mutable per-session state, owned by the single thread driving the loop
/// and never reused across two request windows.
struct HarvestSession<'a> {
    /// Request-window bounds, fixed for the whole session.
    from: &'a str,
    until: &'a str,
    /// Token for the next page; `None` means address by window instead.
    resumption_token: Option<String>,
    /// badResumptionToken restarts consumed so far.
    retries: u32,
    /// Grow-only accumulated URL set.
    urls: BTreeSet<String>,
    /// Insertion-ordered log, reversed into the report on finish.
    errors: Vec<HarvesterError>,
}

impl<'a> HarvestSession<'a> {
    fn new(from: &'a str, until: &'a str) -> Self {
        Self {
            from,
            until,
            resumption_token: None,
            retries: 0,
            urls: BTreeSet::new(),
            errors: Vec::new(),
        }
    }

    fn record(&mut self, error: HarvesterError) {
        self.errors.push(error);
    }

    fn finish(mut self, state: HarvestState) -> HarvestReport {
        self.errors.reverse();
        HarvestReport {
            urls: self.urls,
            errors: self.errors,
            state,
        }
    }
}

/// Harvest one request window from a repository.
///
/// Issues strictly sequential blocking requests: page n+1 is never fetched
/// before page n is fully classified, extracted, and token-inspected. The
/// protocol places no bound on the number of pages; a caller needing a
/// hard deadline must impose it externally.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `request` - Immutable repository/subset addressing data
/// * `handler` - Metadata strategy for the repository's format
/// * `from`, `until` - Request-window bounds, both required
/// * `max_retries` - badResumptionToken restart budget; a server that
///   always fails this way receives exactly `max_retries + 1` requests
pub fn harvest(
    client: &Client,
    request: &OaiRequestData,
    handler: &dyn OaiMetadataHandler,
    from: &str,
    until: &str,
    max_retries: u32,
) -> HarvestReport {
    let mut session = HarvestSession::new(from, until);

    for bound in [from, until] {
        if let Err(e) = validate_datestamp(bound) {
            session.record(e);
            return session.finish(HarvestState::Failed);
        }
    }

    let state = run_session(client, request, handler, max_retries, &mut session);
    session.finish(state)
}

/// Drive the request loop until a terminal state is reached.
fn run_session(
    client: &Client,
    request: &OaiRequestData,
    handler: &dyn OaiMetadataHandler,
    max_retries: u32,
    session: &mut HarvestSession<'_>,
) -> HarvestState {
    loop {
        let url = match next_url(request, session) {
            Ok(url) => url,
            Err(e) => {
                session.record(e);
                return HarvestState::Failed;
            }
        };

        tracing::debug!(url = %url, "Requesting page");
        let body = match crate::http::fetch_page(client, &url) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Page request failed");
                session.record(e);
                return HarvestState::Failed;
            }
        };

        let doc = match Document::parse(&body) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Response is not well-formed XML");
                session.record(e.into());
                return HarvestState::Failed;
            }
        };

        match classify_page(&doc, &url, session) {
            None => {}
            Some(Severity::Informational) => return HarvestState::Done,
            Some(Severity::Fatal) => return HarvestState::Failed,
            Some(Severity::Recoverable) => {
                if session.retries >= max_retries {
                    tracing::error!(
                        attempts = max_retries + 1,
                        "badResumptionToken persisted, giving up"
                    );
                    session.record(HarvesterError::RetriesExhausted {
                        attempts: max_retries + 1,
                    });
                    return HarvestState::Failed;
                }
                // Restart from the original window request; the token the
                // repository rejected is worthless now.
                session.retries += 1;
                session.resumption_token = None;
                tracing::debug!(
                    retry = session.retries,
                    max_retries,
                    "Reissuing original request after badResumptionToken"
                );
                continue;
            }
        }

        let page_urls = handler.extract_urls(&metadata_fragments(&doc));
        tracing::debug!(found = page_urls.len(), "Extracted URLs from page");
        session.urls.extend(page_urls);

        match resumption_token(&doc) {
            Some(token) => session.resumption_token = Some(token),
            None => return HarvestState::Done,
        }
    }
}

/// Address the next page: by resumption token when one is pending,
/// otherwise by the original request window.
fn next_url(request: &OaiRequestData, session: &HarvestSession<'_>) -> crate::error::Result<Url> {
    match &session.resumption_token {
        Some(token) => request.resumption_url(token),
        None => request.list_records_url(session.from, session.until),
    }
}

/// Inspect a page's `<error>` elements.
///
/// Every error is logged and recorded. Returns `None` for a clean page;
/// otherwise the highest severity present, which decides the transition.
fn classify_page(
    doc: &Document<'_>,
    query: &Url,
    session: &mut HarvestSession,
) -> Option<Severity> {
    let errors = protocol_errors(doc);
    let worst = errors.iter().map(|e| e.code.severity()).max()?;

    for error in errors {
        match error.code.severity() {
            Severity::Informational => {
                tracing::warn!(
                    code = %error.code,
                    message = %error.message,
                    "Window matched no records"
                );
            }
            Severity::Recoverable => {
                tracing::warn!(
                    code = %error.code,
                    message = %error.message,
                    "Recoverable protocol error"
                );
            }
            Severity::Fatal => {
                tracing::error!(
                    code = %error.code,
                    message = %error.message,
                    query = %query,
                    "Fatal protocol error"
                );
            }
        }
        session.record(HarvesterError::Protocol {
            code: error.code,
            message: error.message,
            query: query.to_string(),
        });
    }

    Some(worst)
}
