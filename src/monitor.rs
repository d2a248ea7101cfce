use crate::config::Config;
use crate::emitter::Emitter;
use crate::rpc::{ChainClient, redact_url};
use crate::scanner::{scan_range, summary_line};
use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// What a single polling iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The tip height could not be read; the cursor did not move.
    HeightUnavailable,
    /// The chain has not advanced past the cursor.
    Idle { height: u64 },
    Scanned { from: u64, to: u64, matches: usize },
}

/// Polls the chain tip and scans every block above the last processed one.
pub struct Monitor<'a, C, E> {
    client: C,
    emitter: E,
    config: &'a Config,
    last_processed_block: u64,
}

impl<'a, C: ChainClient, E: Emitter> Monitor<'a, C, E> {
    /// Emits the startup banner and takes the current tip as the starting
    /// cursor. Blocks at or below it are never scanned.
    pub async fn start(client: C, mut emitter: E, config: &'a Config) -> Result<Self> {
        let scope = if config.watch_list.tracks_incoming() {
            "my transactions, incoming included"
        } else {
            "only my transactions"
        };
        emitter.emit(&format!("🚀 Transaction monitor started ({})", scope));
        emitter.emit(&format!(
            "🔎 Track only mine: {}",
            if config.track_only_mine { "yes" } else { "no" }
        ));
        emitter.emit(&format!(
            "🌐 Endpoint: {}",
            config
                .json_rpc_urls
                .iter()
                .map(|url| redact_url(url))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        for address in config.watch_list.addresses() {
            emitter.emit(&format!("📡 Watching address: {}", address));
        }
        match config.log_file() {
            Some(path) => emitter.emit(&format!("💾 Log file: {}", path.display())),
            None => emitter.emit("💾 File logging disabled"),
        }

        let last_processed_block = match client.latest_height().await {
            Ok(height) => height,
            Err(e) => {
                emitter.emit(&format!("❌ Failed to fetch latest block number: {}", e));
                return Err(e.context("Failed to read the initial block height"));
            }
        };

        info!("Starting from block {}", last_processed_block);

        Ok(Monitor {
            client,
            emitter,
            config,
            last_processed_block,
        })
    }

    pub fn last_processed_block(&self) -> u64 {
        self.last_processed_block
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    /// Runs one iteration: read the tip, scan the new range, advance the
    /// cursor. Does not sleep.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let latest_block = match self.client.latest_height().await {
            Ok(height) => height,
            Err(e) => {
                self.emitter
                    .emit(&format!("⚠️  Failed to fetch latest block number: {}", e));
                return PollOutcome::HeightUnavailable;
            }
        };

        if latest_block <= self.last_processed_block {
            return PollOutcome::Idle {
                height: latest_block,
            };
        }

        let heights = self.last_processed_block + 1..=latest_block;
        let matches = scan_range(
            &self.client,
            heights.clone(),
            &self.config.watch_list,
            &self.config.currency_symbol,
            &mut self.emitter,
        )
        .await;

        self.emitter.emit(&summary_line(&heights, matches));
        self.last_processed_block = latest_block;

        PollOutcome::Scanned {
            from: *heights.start(),
            to: latest_block,
            matches,
        }
    }

    /// How long to wait before the next iteration.
    pub fn delay_after(&self, outcome: &PollOutcome) -> Duration {
        match outcome {
            PollOutcome::HeightUnavailable => self.config.backoff_interval,
            PollOutcome::Idle { .. } | PollOutcome::Scanned { .. } => self.config.poll_interval,
        }
    }

    /// Polls forever.
    pub async fn run(&mut self) {
        loop {
            let outcome = self.poll_once().await;
            sleep(self.delay_after(&outcome)).await;
        }
    }
}
