//! Domain types for the dcrlens explorer views.
//!
//! # Module Organization
//!
//! - [`error`] - Error type shared by the client and controllers
//! - [`block`] - Block payloads delivered by block-arrival events
//! - [`report`] - Finance report payloads, report types and time buckets
//! - [`aggregate`] - Totals and breakdowns derived from a report

// ============================================================================
// Module Declarations
// ============================================================================

pub mod aggregate;
pub mod block;
pub mod error;
pub mod report;

// ============================================================================
// Re-exports
// ============================================================================

pub use block::{BlockPayload, BlockTime, Subsidy, TxSummary, VoteSummary};
pub use error::ViewError;
pub use report::{
    MonthData, ReportPayload, ReportType, SummaryRecord, TimeBucket, TreasurySummary,
    parse_report_date,
};
