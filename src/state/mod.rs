//! Application state for the dcrlens terminal front-end.
//!
//! The [`App`] owns one controller per screen and the channels its
//! background tasks report through:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                         App                          │
//! ├──────────────────────┬───────────────────────────────┤
//! │ BlockListController  │ FinanceDetailController       │
//! │  - block table       │  - settings / location        │
//! │  - vsdisp setting    │  - report cache / sequencer   │
//! ├──────────────────────┴───────────────────────────────┤
//! │ mpsc AppMessage   BlockBus subscription   shutdown   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dcrlens::state::{App, AppConfig, StartupOptions};
//!
//! let mut app = App::new(AppConfig::load(), StartupOptions::default())?;
//! app.run(&mut terminal).await?;
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::cache::{Clock, SystemClock};
use crate::client::ReportSource;
use crate::commands::InputContext;
use crate::constants::{BLOCKS_PATH, FINANCE_DETAIL_PATH};
use crate::controller::{BlockListController, FinanceDetailController, PendingLoad};
use crate::domain::{BlockPayload, ViewError};
use crate::live::{BlockBus, BlockSubscription};
use crate::query::MemoryLocation;

// ============================================================================
// Module Declarations
// ============================================================================

mod app_commands;
mod app_lifecycle;
mod app_messages;

pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AppConfig;

// ============================================================================
// App Message Types
// ============================================================================

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AppMessage {
    /// The initial block range arrived.
    BlocksSeeded(Vec<BlockPayload>),
    /// A report fetch finished.
    ReportFetched {
        /// The load the fetch belongs to.
        pending: PendingLoad,
        /// The fetched document.
        result: Result<Option<Value>, ViewError>,
    },
    /// A background fetch failed.
    NetworkError(String),
}

// ============================================================================
// Screens and Startup Options
// ============================================================================

/// The screen on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// Live block list.
    #[default]
    Blocks,
    /// Finance report detail.
    Report,
}

impl Screen {
    /// The other screen.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Blocks => Self::Report,
            Self::Report => Self::Blocks,
        }
    }
}

/// Options passed when starting the application.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Screen shown first.
    pub screen: Screen,
    /// Query string of the block list, e.g. `vsdisp=true`.
    pub blocks_query: String,
    /// Query string of the finance report, e.g. `type=year&time=2021`.
    pub report_query: String,
}

// ============================================================================
// Main App State
// ============================================================================

/// The application state container.
pub struct App {
    /// Screen on display.
    pub screen: Screen,

    /// Live block list.
    pub blocks: BlockListController,

    /// Finance report detail.
    pub finance: FinanceDetailController,

    /// Message shown in a popup until dismissed.
    pub message: Option<String>,

    /// A report fetch is in flight.
    pub report_loading: bool,

    /// Whether the application should exit.
    pub exit: bool,

    pub(crate) config: AppConfig,

    // Channel sends use `let _ = tx.send(...)`: receivers may be dropped
    // during shutdown.
    pub(crate) message_tx: mpsc::UnboundedSender<AppMessage>,
    pub(crate) message_rx: mpsc::UnboundedReceiver<AppMessage>,
    pub(crate) shutdown_tx: watch::Sender<bool>,

    pub(crate) source: Arc<dyn ReportSource>,
    pub(crate) bus: BlockBus,
    pub(crate) subscription: BlockSubscription,
}

impl App {
    /// Create an app fetching through `source`.
    #[must_use]
    pub fn with_source(
        config: AppConfig,
        startup: StartupOptions,
        source: Arc<dyn ReportSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        let mut blocks = BlockListController::with_clock(
            Box::new(MemoryLocation::new(BLOCKS_PATH, &startup.blocks_query)),
            Arc::clone(&clock),
        );
        blocks.init();

        let mut finance = FinanceDetailController::new(
            Arc::clone(&source),
            Box::new(MemoryLocation::new(FINANCE_DETAIL_PATH, &startup.report_query)),
            config.finance_options(clock),
        );
        // Missing parameters only leave the report empty.
        let _ = finance.init();

        let bus = BlockBus::default();
        let subscription = bus.subscribe();

        Self {
            screen: startup.screen,
            blocks,
            finance,
            message: None,
            report_loading: false,
            exit: false,
            config,
            message_tx,
            message_rx,
            shutdown_tx,
            source,
            bus,
            subscription,
        }
    }

    /// Create an app on the wall clock.
    #[must_use]
    pub fn with_system_clock(
        config: AppConfig,
        startup: StartupOptions,
        source: Arc<dyn ReportSource>,
    ) -> Self {
        Self::with_source(config, startup, source, Arc::new(SystemClock))
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Which keybindings apply now.
    #[must_use]
    pub fn input_context(&self) -> InputContext {
        if self.message.is_some() {
            return InputContext::MessagePopup;
        }
        match self.screen {
            Screen::Blocks => InputContext::Blocks,
            Screen::Report => InputContext::Report,
        }
    }

    /// Show `message` in a popup.
    pub fn show_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("blocks", &self.blocks)
            .field("finance", &self.finance)
            .field("message", &self.message)
            .field("exit", &self.exit)
            .finish_non_exhaustive()
    }
}
