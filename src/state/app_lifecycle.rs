//! Application lifecycle management.
//!
//! - `new()` - Creates the app against the configured explorer
//! - `run()` - Main event loop
//! - Background block feed and report fetches

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::{mpsc, watch};

use crate::client::{DcrdataClient, ReportSource, fetch_best_block, fetch_block_range};
use crate::controller::LoadStep;
use crate::domain::ViewError;
use crate::live::{BlockBus, BlockFeed};
use crate::tui::Tui;
use crate::ui;

use super::{App, AppConfig, AppMessage, StartupOptions};

// ============================================================================
// Lifecycle Methods
// ============================================================================

impl App {
    /// Creates an app fetching from the configured explorer.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig, startup: StartupOptions) -> Result<Self> {
        let client = DcrdataClient::new(&config.base_url).map_err(ViewError::into_report)?;
        Ok(Self::with_system_clock(config, startup, Arc::new(client)))
    }

    /// Runs the main application loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal operations fail.
    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        self.start_background_tasks();
        self.request_report();

        let tick_rate = Duration::from_millis(100);
        let mut last_tick = Instant::now();

        while !self.exit {
            self.process_messages();
            self.process_blocks();

            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::from_secs(0));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key)
                        if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
                    {
                        self.handle_key_event(key);
                    }
                    Event::Resize(_, _) => {
                        terminal.draw(|frame| ui::render(self, frame))?;
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= tick_rate {
                self.blocks.tick();
                terminal.draw(|frame| ui::render(self, frame))?;
                last_tick = Instant::now();
            }
        }

        // Stops the block feed; fails only if the feed already exited.
        let _ = self.shutdown_tx.send(true);
        Ok(())
    }

    // ========================================================================
    // Background Tasks
    // ========================================================================

    /// Seed the block table and start the best-block feed.
    pub(crate) fn start_background_tasks(&self) {
        let source = Arc::clone(&self.source);
        let bus = self.bus.clone();
        let rows = self.config.table_rows;
        let poll_interval = self.config.poll_interval();
        let message_tx = self.message_tx.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            Self::block_feed_task(source, bus, rows, poll_interval, message_tx, shutdown_rx)
                .await;
        });
    }

    async fn block_feed_task(
        source: Arc<dyn ReportSource>,
        bus: BlockBus,
        rows: usize,
        poll_interval: Duration,
        message_tx: mpsc::UnboundedSender<AppMessage>,
        shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut feed = BlockFeed::new(Arc::clone(&source), bus, poll_interval);

        // Channel sends below: receiver may be dropped during shutdown.
        match fetch_best_block(source.as_ref()).await {
            Ok(Some(tip)) => {
                let first = tip.height.saturating_sub(rows.saturating_sub(1) as u64);
                match fetch_block_range(source.as_ref(), first, tip.height).await {
                    Ok(blocks) => {
                        let _ = message_tx.send(AppMessage::BlocksSeeded(blocks));
                    }
                    Err(e) => {
                        let _ = message_tx.send(AppMessage::NetworkError(format!(
                            "Failed to load blocks: {e}"
                        )));
                    }
                }
                feed = feed.starting_after(tip.height);
            }
            Ok(None) => tracing::warn!("Explorer returned no best block"),
            Err(e) => {
                let _ = message_tx.send(AppMessage::NetworkError(format!(
                    "Failed to reach explorer: {e}"
                )));
            }
        }

        feed.run(shutdown_rx).await;
    }

    /// Load the report the finance settings name, fetching in the background
    /// on a cache miss.
    pub(crate) fn request_report(&mut self) {
        match self.finance.begin_load() {
            LoadStep::Done(outcome) => {
                tracing::debug!("Report load finished without fetch: {outcome:?}");
                self.report_loading = false;
            }
            LoadStep::Fetch(pending) => {
                self.report_loading = true;
                let source = Arc::clone(&self.source);
                let message_tx = self.message_tx.clone();
                tokio::spawn(async move {
                    let result = source.request_json(&pending.url).await;
                    // Receiver may be dropped during shutdown.
                    let _ = message_tx.send(AppMessage::ReportFetched { pending, result });
                });
            }
        }
    }
}
