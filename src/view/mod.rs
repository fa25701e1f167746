//! Declarative view descriptions built from controller state.
//!
//! Views are plain data: the terminal front-end renders them and tests
//! assert on them directly.
//!
//! # Module Organization
//!
//! - [`format`] - Humanized amounts, sizes, ages and dates
//! - [`blocks`] - Block list view
//! - [`finance`] - Finance detail report view

pub mod blocks;
pub mod finance;
pub mod format;

pub use blocks::{BlockListView, ColumnHeader, RowView};
pub use finance::{
    CardLine, DomainSpendLine, DomainSpendView, FinanceView, PeriodRow, PeriodTable, ProposalLinks,
    ProposalRow, ProposalTable, ReportView, SortColumn, SpendSummary, SummaryRow, SummaryTable,
    TreasuryLine, TreasuryView,
};
