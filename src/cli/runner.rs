//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchMode};
use crate::config::AppConfig;
use crate::engine::{FetchOutcome, PageConsumer};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::Page;
use crate::reassembly::ClientReassembler;
use crate::service::{FetchOverrides, FetchService};
use async_trait::async_trait;
use std::io::Write;

/// Writes each page to stdout as one JSON array per line
struct StdoutConsumer;

#[async_trait]
impl PageConsumer for StdoutConsumer {
    async fn consume(&mut self, page: Page) -> Result<()> {
        let line = serde_json::to_string(&page.records)?;
        let mut out = std::io::stdout().lock();
        match writeln!(out, "{line}").and_then(|()| out.flush()) {
            Ok(()) => Ok(()),
            // Reader hung up (e.g. `| head`)
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(Error::TransportClosed),
            Err(e) => Err(e.into()),
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let mut config = self.load_config()?;

        match &self.cli.command {
            Commands::Serve { host, port } => {
                if let Some(host) = host {
                    config.server.host.clone_from(host);
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                crate::cli::serve(config).await
            }
            Commands::Fetch {
                mode,
                page_size,
                all_dates,
                max_pages,
            } => {
                let overrides = FetchOverrides {
                    page_size: *page_size,
                    limit_to_recent: all_dates.then_some(false),
                    max_pages: *max_pages,
                };
                self.fetch(&config, *mode, &overrides).await
            }
            Commands::Load { url } => self.load(&config, url).await,
        }
    }

    /// Load the config file, or fall back to defaults
    fn load_config(&self) -> Result<AppConfig> {
        match &self.cli.config {
            Some(path) => AppConfig::load(path),
            None => Ok(AppConfig::default()),
        }
    }

    async fn fetch(
        &self,
        config: &AppConfig,
        mode: FetchMode,
        overrides: &FetchOverrides,
    ) -> Result<()> {
        let service = FetchService::from_config(config)?;

        let outcome = match mode {
            FetchMode::All => service.fetch_all(overrides).await,
            FetchMode::One => service.fetch_one_page(overrides).await,
            FetchMode::Stream => {
                service
                    .fetch_streaming(overrides, &mut StdoutConsumer)
                    .await
            }
        };

        if let Some(report) = outcome.report() {
            if self.cli.verbose {
                eprintln!("{}", serde_json::to_string(report)?);
            }
        }

        match outcome {
            FetchOutcome::Collected { records, .. } => {
                println!("{}", serde_json::to_string(&records)?);
                Ok(())
            }
            FetchOutcome::Streamed(_) => Ok(()),
            FetchOutcome::Failed(failure) => {
                println!("{}", serde_json::to_string(&failure)?);
                Err(Error::Other(failure.details))
            }
        }
    }

    async fn load(&self, config: &AppConfig, url: &str) -> Result<()> {
        let client = HttpClient::with_config(config.upstream.http_config())?;

        let mut reassembler = ClientReassembler::new();
        reassembler.start();
        let count = reassembler.fetch(client.inner(), url).await.len();

        let summary = serde_json::json!({
            "url": url,
            "records": count,
            "state": reassembler.state(),
            "reads": reassembler.progress().reads,
            "bytes": reassembler.progress().bytes,
            "error": reassembler.last_error(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
