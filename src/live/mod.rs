//! Live block list: the bounded block table, visual blocks and the block bus.
//!
//! # Module Organization
//!
//! - [`table`] - Contiguous descending table patched on block arrival
//! - [`visual`] - Visual block description
//! - [`bus`] - Block-arrival pub/sub and the best-block poller

pub mod bus;
pub mod table;
pub mod visual;

pub use bus::{BlockBus, BlockFeed, BlockSubscription};
pub use table::{BlockTable, Cell, CellContent, ColumnKind, TableRow, TableUpdate};
pub use visual::{Rewards, RewardsBand, Slot, SlotKind, TooltipData, VisualBlock, tooltip_text};
