//! View controllers.
//!
//! Each controller owns its settings, location and caches; nothing is shared
//! through module-level state.
//!
//! # Module Organization
//!
//! - [`blocklist`] - Live block list
//! - [`finance`] - Finance report detail

pub mod blocklist;
pub mod finance;

pub use blocklist::BlockListController;
pub use finance::{FinanceDetailController, FinanceOptions, LoadOutcome, LoadStep, PendingLoad};
