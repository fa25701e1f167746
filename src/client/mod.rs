//! Clients for the dcrdata explorer API.
//!
//! The controllers fetch through the [`ReportSource`] trait; [`DcrdataClient`]
//! implements it over HTTP and [`StaticSource`] over a fixed response map.
//!
//! # Example
//!
//! ```ignore
//! use dcrlens::client::{DcrdataClient, ReportSource};
//!
//! let client = DcrdataClient::new("https://dcrdata.decred.org")?;
//! let report = client
//!     .request_json("/api/finance-report/detail?type=year&time=2021")
//!     .await?;
//! ```

pub mod dcrdata;
pub mod http;
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use dcrdata::{DcrdataClient, block_from_api, fetch_best_block, fetch_block_range};
pub use http::{HttpClient, HttpConfig};
pub use source::{ReportSource, StaticSource};
