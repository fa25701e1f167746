//! Application constants for dcrlens.
//!
//! Endpoints, numeric units, visual block limits and UI dimensions used
//! throughout the crate.

// ============================================================================
// Endpoints
// ============================================================================

/// Explorer used when neither the config file nor the CLI names one.
pub const DEFAULT_BASE_URL: &str = "https://dcrdata.decred.org";

/// Proposal discussion site linked from proposal reports.
pub const DEFAULT_POLITEIA_URL: &str = "https://proposals.decred.org";

/// Finance report detail API.
pub const FINANCE_DETAIL_ENDPOINT: &str = "/api/finance-report/detail";

/// Best (tip) block API, polled by the block feed.
pub const BEST_BLOCK_ENDPOINT: &str = "/api/block/best";

/// Block range API, `/api/block/range/{first}/{last}`.
pub const BLOCK_RANGE_ENDPOINT: &str = "/api/block/range";

/// Page path of the block list view.
pub const BLOCKS_PATH: &str = "/blocks";

/// Page path of the finance detail view.
pub const FINANCE_DETAIL_PATH: &str = "/finance-report/detail";

/// Page path of the top-level finance report.
pub const FINANCE_REPORT_PATH: &str = "/finance-report";

// ============================================================================
// Numeric Constants
// ============================================================================

/// Number of atoms per DCR.
///
/// Payload amounts for subsidies and treasury flows are in atoms.
pub const ATOMS_PER_DCR: f64 = 100_000_000.0;

/// Default lifetime of a cached report response.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Default number of rows in the live block table.
pub const DEFAULT_TABLE_ROWS: usize = 20;

/// Default interval between best-block polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Request timeout of the HTTP client.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// First year with treasury report data.
pub const FIRST_REPORT_YEAR: i32 = 2016;

/// First month of [`FIRST_REPORT_YEAR`] with treasury report data.
pub const FIRST_REPORT_MONTH: u32 = 2;

// ============================================================================
// Visual Blocks
// ============================================================================

/// Vote slots drawn per block; a block has at most five votes.
pub const VOTE_SLOTS: usize = 5;

/// Ticket and revocation slots drawn per block.
pub const TICKET_SLOTS: usize = 20;

/// Above this many tickets or transactions the list is truncated.
pub const OVERFLOW_THRESHOLD: usize = 50;

/// Entries kept when a list is truncated.
pub const OVERFLOW_SHOWN: usize = 30;

/// Reward paint width per vote, in percent.
pub const PAINT_PER_VOTE: u32 = 20;

// ============================================================================
// UI Dimension Constants
// ============================================================================

/// Height of the application header area (in rows).
pub const HEADER_HEIGHT: u16 = 3;

/// Height of the footer with key hints (in rows).
pub const FOOTER_HEIGHT: u16 = 1;

// ============================================================================
// Tests
// ============================================================================
