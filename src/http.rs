//! HTTP client wrapper for talking to OAI-PMH repositories.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("oai-harvester/", env!("CARGO_PKG_VERSION"));

/// HTTP timeout in seconds.
///
/// Repositories assembling a large page behind a resumption token can be
/// slow to answer.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetch one response page as text.
///
/// Performs a single GET. Transport failures and non-success statuses are
/// returned as errors without retrying here; the only retry the harvest
/// loop performs is the bounded badResumptionToken restart.
pub fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    let response = client.get(url.clone()).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(HarvesterError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text()?)
}
