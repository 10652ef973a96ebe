//! OAI-PMH Harvester - discover content URLs from metadata repositories.
//!
//! This crate walks an OAI-PMH repository's `ListRecords` verb to collect
//! the set of content URLs a downstream crawler must fetch: paginated
//! retrieval via opaque resumption tokens, bounded retry on
//! `badResumptionToken`, a taxonomy of fatal vs. recoverable vs.
//! informational protocol errors, and a pluggable strategy for
//! repository-specific metadata formats.
//!
//! # Example
//!
//! ```no_run
//! use oai_harvester::config::OaiRequestData;
//! use oai_harvester::harvester::harvest;
//! use oai_harvester::http::create_client;
//! use oai_harvester::metadata::MetadataFormat;
//!
//! let format = MetadataFormat::dublin_core();
//! let request = OaiRequestData::from_handler("https://x.org/oai", "journal:2024", &format)
//!     .expect("valid request data");
//! let client = create_client().expect("client");
//!
//! let report = harvest(&client, &request, &format, "2024-01-01", "2024-12-31", 3);
//! for url in &report.urls {
//!     println!("{url}");
//! }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Immutable request data, datestamp validation, query URLs
//! - [`metadata`]: Metadata strategy trait and format variants
//! - [`protocol`]: Error-code taxonomy and response-page readers
//! - [`harvester`]: The pagination/retry state machine
//! - [`http`]: Blocking HTTP client
//! - [`error`]: Error types and Result alias
//! - [`xml`]: XML lookup utilities
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod harvester;
pub mod http;
pub mod metadata;
pub mod protocol;
pub mod xml;

// Re-export main entry points
pub use config::OaiRequestData;
pub use error::{HarvesterError, Result};
pub use harvester::{harvest, HarvestReport, HarvestState};
pub use metadata::{MetadataFormat, OaiMetadataHandler};
pub use protocol::OaiErrorCode;
