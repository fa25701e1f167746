//! Message processing for the dcrlens application.
//!
//! Background tasks report through [`AppMessage`]; block arrivals come
//! through the block bus subscription.

use crate::controller::LoadOutcome;

use super::{App, AppMessage};

impl App {
    /// Handle every message queued by background tasks.
    pub(crate) fn process_messages(&mut self) {
        while let Ok(message) = self.message_rx.try_recv() {
            self.handle_message(message);
        }
    }

    /// Apply every block published since the last call.
    pub(crate) fn process_blocks(&mut self) {
        while let Some(block) = self.subscription.try_recv() {
            self.blocks.process_block(&block);
        }
    }

    pub(crate) fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::BlocksSeeded(blocks) => {
                tracing::info!("Seeded block table with {} blocks", blocks.len());
                self.blocks.seed(&blocks);
            }
            AppMessage::ReportFetched { pending, result } => {
                match self.finance.finish_load(pending, result) {
                    Ok(LoadOutcome::Discarded { ticket, latest }) => {
                        tracing::debug!("Dropped report {ticket}, waiting for {latest}");
                    }
                    Ok(outcome) => {
                        tracing::debug!("Report load finished: {outcome:?}");
                        self.report_loading = false;
                    }
                    Err(e) => {
                        self.report_loading = false;
                        self.show_message(format!("Failed to load report: {e}"));
                    }
                }
            }
            AppMessage::NetworkError(error) => {
                tracing::warn!("{error}");
                if self.message.is_none() {
                    self.show_message(error);
                }
            }
        }
    }
}
