//! Command-line interface for the harvester.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{validate_datestamp, OaiRequestData};
use crate::error::Result;
use crate::harvester::{harvest, HarvestReport};
use crate::http::create_client;
use crate::metadata::{MetadataFormat, DC_NAMESPACE_URI, DC_PREFIX, DC_URL_TAG};

/// OAI-PMH Harvester - discover content URLs from metadata repositories.
#[derive(Parser)]
#[command(name = "oai-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest content URLs from one repository request window.
    Harvest {
        /// Repository endpoint URL (e.g., https://x.org/oai)
        endpoint: String,

        /// Window start datestamp (YYYY-MM-DD or YYYY-MM-DDThh:mm:ssZ)
        #[arg(long)]
        from: String,

        /// Window end datestamp (same granularity as --from)
        #[arg(long)]
        until: String,

        /// Set specifier scoping the harvest (default: whole repository)
        #[arg(long, default_value = "")]
        set: String,

        /// metadataPrefix to request (default: Dublin Core)
        #[arg(long, default_value = DC_PREFIX)]
        metadata_prefix: String,

        /// Namespace URI of the URL-bearing element
        #[arg(long, default_value = DC_NAMESPACE_URI)]
        namespace: String,

        /// Local name of the URL-bearing element
        #[arg(long, default_value = DC_URL_TAG)]
        tag: String,

        /// badResumptionToken restart budget
        #[arg(long, default_value_t = 3)]
        max_retries: u32,

        /// Write URLs to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a JSON report instead of a plain URL list
        #[arg(long)]
        json: bool,
    },
}

/// JSON shape of a finished harvest.
#[derive(Serialize)]
struct JsonReport<'a> {
    state: &'a str,
    urls: Vec<&'a str>,
    errors: Vec<String>,
}

impl<'a> JsonReport<'a> {
    fn from_report(report: &'a HarvestReport) -> Self {
        Self {
            state: if report.is_done() { "done" } else { "failed" },
            urls: report.urls.iter().map(String::as_str).collect(),
            errors: report.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Run the CLI. Returns `Err` only for usage-level problems; a failed
/// harvest is reported through the exit code by [`run`]'s caller.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            endpoint,
            from,
            until,
            set,
            metadata_prefix,
            namespace,
            tag,
            max_retries,
            output,
            json,
        } => {
            // Validate inputs before making HTTP requests
            validate_datestamp(&from)?;
            validate_datestamp(&until)?;
            let format = MetadataFormat::new(metadata_prefix, namespace, tag);
            let request = OaiRequestData::from_handler(endpoint.as_str(), set, &format)?;

            harvest_command(
                &request,
                &format,
                &from,
                &until,
                max_retries,
                output.as_deref(),
                json,
            )
        }
    }
}

/// Execute the harvest command. Returns whether the session ended Done.
fn harvest_command(
    request: &OaiRequestData,
    format: &MetadataFormat,
    from: &str,
    until: &str,
    max_retries: u32,
    output: Option<&std::path::Path>,
    json: bool,
) -> Result<bool> {
    let client = create_client()?;

    eprintln!(
        "{} {} [{} .. {}]",
        style("Harvesting").bold(),
        style(request.endpoint_url()).cyan(),
        style(from).green(),
        style(until).green()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Walking ListRecords pages...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = harvest(&client, request, format, from, until, max_retries);

    pb.finish_and_clear();

    let rendered = if json {
        #[allow(clippy::expect_used)] // Report serialization cannot fail
        let mut text = serde_json::to_string_pretty(&JsonReport::from_report(&report))
            .expect("report serializes");
        text.push('\n');
        text
    } else {
        let mut text = String::new();
        for url in &report.urls {
            text.push_str(url);
            text.push('\n');
        }
        text
    };

    match output {
        Some(path) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(rendered.as_bytes())?;
            eprintln!(
                "{} {}",
                style("Saved to:").green().bold(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }

    eprintln!(
        "  URLs: {}  Errors: {}  State: {}",
        style(report.urls.len()).green(),
        if report.errors.is_empty() {
            style(report.errors.len()).green()
        } else {
            style(report.errors.len()).yellow().bold()
        },
        if report.is_done() {
            style("done").green()
        } else {
            style("failed").red().bold()
        }
    );
    for error in &report.errors {
        eprintln!("  {} {}", style("!").yellow(), error);
    }

    Ok(report.is_done())
}
