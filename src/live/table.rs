//! Bounded table of recent blocks, patched in place on block arrival.
//!
//! Rows are a contiguous run of heights in descending order. The first row
//! is the tip; its column layout is the template for every new row.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::BlockPayload;
use crate::view::format;

use super::visual::VisualBlock;

// ============================================================================
// Columns
// ============================================================================

/// Count columns hidden while visual blocks are shown.
const COUNT_COLUMNS: [&str; 4] = ["tx", "votes", "tickets", "revocations"];

/// Type tag of a table column, which decides how its cell is filled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Time since the block, refreshed as time passes.
    Age,
    /// Block height, linked to the block page.
    Height,
    /// Block size in bytes.
    Size,
    /// Total value sent.
    Value,
    /// Block timestamp.
    Time,
    /// Visual block.
    VisualBlock,
    /// Any other payload field, shown raw.
    Other(String),
}

impl ColumnKind {
    /// Column kind for a type tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "age" => Self::Age,
            "height" => Self::Height,
            "size" => Self::Size,
            "value" => Self::Value,
            "time" => Self::Time,
            "vssimulation" => Self::VisualBlock,
            other => Self::Other(other.to_string()),
        }
    }

    /// The type tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Age => "age",
            Self::Height => "height",
            Self::Size => "size",
            Self::Value => "value",
            Self::Time => "time",
            Self::VisualBlock => "vssimulation",
            Self::Other(tag) => tag,
        }
    }

    /// Column header.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Age => "Age".to_string(),
            Self::Height => "Height".to_string(),
            Self::Size => "Size".to_string(),
            Self::Value => "Value".to_string(),
            Self::Time => "Time (UTC)".to_string(),
            Self::VisualBlock => "Visual Blocks".to_string(),
            Self::Other(tag) if tag == "tx" => "Txns".to_string(),
            Self::Other(tag) if tag == "revocations" => "Revokes".to_string(),
            Self::Other(tag) => format::capitalize(tag),
        }
    }

    /// Returns `true` for the tx, vote, ticket and revocation count columns.
    #[must_use]
    pub fn is_count_column(&self) -> bool {
        matches!(self, Self::Other(tag) if COUNT_COLUMNS.contains(&tag.as_str()))
    }

    /// Whether the column is shown for the given visual-blocks setting.
    #[must_use]
    pub fn is_visible(&self, visual_blocks: bool) -> bool {
        match self {
            Self::VisualBlock => visual_blocks,
            kind if kind.is_count_column() => !visual_blocks,
            _ => true,
        }
    }

    /// The default block list layout.
    #[must_use]
    pub fn default_layout() -> Vec<Self> {
        [
            "height",
            "tx",
            "votes",
            "tickets",
            "revocations",
            "vssimulation",
            "size",
            "value",
            "age",
            "time",
        ]
        .into_iter()
        .map(Self::from_tag)
        .collect()
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Cells and Rows
// ============================================================================

/// What a cell displays.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    /// Plain text.
    Text(String),
    /// A link.
    Link {
        /// Target path.
        href: String,
        /// Link text.
        text: String,
        /// Style class copied from the row.
        class: String,
    },
    /// A visual block.
    Visual(Box<VisualBlock>),
}

/// One cell of a table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Column the cell belongs to.
    pub kind: ColumnKind,
    /// Displayed content.
    pub content: CellContent,
    /// Unix time the age is measured from, for age cells.
    pub age_stamp: Option<i64>,
}

impl Cell {
    /// A plain text cell.
    #[must_use]
    pub fn text(kind: ColumnKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            content: CellContent::Text(text.into()),
            age_stamp: None,
        }
    }

    /// Fill a cell of the given kind from a block payload.
    #[must_use]
    pub fn build(kind: &ColumnKind, block: &BlockPayload, link_class: &str, now: DateTime<Utc>) -> Self {
        let mut age_stamp = None;
        let content = match kind {
            ColumnKind::Age => {
                age_stamp = Some(block.unix_stamp);
                CellContent::Text(format::time_since(block.unix_stamp, now))
            }
            ColumnKind::Height => CellContent::Link {
                href: format!("/block/{}", block.height),
                text: block.height.to_string(),
                class: link_class.to_string(),
            },
            ColumnKind::Size => CellContent::Text(format::bytes(block.size)),
            ColumnKind::Value => CellContent::Text(format::three_sig_figs(block.total_sent)),
            ColumnKind::Time => CellContent::Text(format::block_date(&block.time)),
            ColumnKind::VisualBlock => {
                CellContent::Visual(Box::new(VisualBlock::from_payload(block)))
            }
            ColumnKind::Other(tag) => CellContent::Text(block.raw_field(tag)),
        };
        Self {
            kind: kind.clone(),
            content,
            age_stamp,
        }
    }

    /// The cell as display text; visual blocks have none.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match &self.content {
            CellContent::Text(text) | CellContent::Link { text, .. } => text,
            CellContent::Visual(_) => "",
        }
    }

    /// Recompute an age cell against `now`. Other cells are unchanged.
    pub fn refresh_age(&mut self, now: DateTime<Utc>) {
        if let Some(stamp) = self.age_stamp {
            self.content = CellContent::Text(format::time_since(stamp, now));
        }
    }
}

/// A block row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Block height.
    pub height: u64,
    /// Style class applied to the height link.
    pub link_class: String,
    /// Cells, in column order.
    pub cells: Vec<Cell>,
}

impl TableRow {
    /// Build a row for `block` with the given column layout.
    #[must_use]
    pub fn build(
        block: &BlockPayload,
        columns: &[ColumnKind],
        link_class: &str,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            height: block.height,
            link_class: link_class.to_string(),
            cells: columns
                .iter()
                .map(|kind| Cell::build(kind, block, link_class, now))
                .collect(),
        }
    }

    /// The row's column layout.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnKind> {
        self.cells.iter().map(|c| c.kind.clone()).collect()
    }

    /// The cell of a column, if the row has it.
    #[must_use]
    pub fn cell(&self, kind: &ColumnKind) -> Option<&Cell> {
        self.cells.iter().find(|c| &c.kind == kind)
    }
}

// ============================================================================
// Block Table
// ============================================================================

/// Outcome of applying a block to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableUpdate {
    /// The table was empty or the block does not extend the tip.
    Ignored,
    /// The block has the tip's height and replaced the tip row.
    ReplacedTip,
    /// The block extends the tip; the oldest row was evicted.
    Advanced {
        /// Height of the evicted row.
        evicted: u64,
    },
}

/// Bounded, contiguous, descending-by-height block table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockTable {
    rows: VecDeque<TableRow>,
}

impl BlockTable {
    /// Create a table from rows already in descending height order.
    #[must_use]
    pub fn from_rows(rows: Vec<TableRow>) -> Self {
        Self { rows: rows.into() }
    }

    /// Build a table from block payloads, highest first.
    #[must_use]
    pub fn seed(
        blocks: &[BlockPayload],
        columns: &[ColumnKind],
        link_class: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let mut rows: Vec<TableRow> = blocks
            .iter()
            .map(|b| TableRow::build(b, columns, link_class, now))
            .collect();
        rows.sort_by(|a, b| b.height.cmp(&a.height));
        rows.dedup_by_key(|r| r.height);
        Self::from_rows(rows)
    }

    /// Apply a block-arrival event.
    ///
    /// A block at the tip height replaces the tip; a block one above the tip
    /// evicts the oldest row and becomes the new tip. Anything else, and any
    /// block arriving at an empty table, is ignored. The new row copies the
    /// tip's column layout and link class.
    pub fn apply(&mut self, block: &BlockPayload, now: DateTime<Utc>) -> TableUpdate {
        let Some(tip) = self.rows.front() else {
            return TableUpdate::Ignored;
        };
        let columns = tip.columns();
        let link_class = tip.link_class.clone();
        let tip_height = tip.height;

        let update = if block.height == tip_height {
            self.rows.pop_front();
            TableUpdate::ReplacedTip
        } else if Some(block.height) == tip_height.checked_add(1) {
            let evicted = self.rows.pop_back().map_or(tip_height, |row| row.height);
            TableUpdate::Advanced { evicted }
        } else {
            tracing::debug!(
                "Ignoring block {} for table with tip {tip_height}",
                block.height
            );
            return TableUpdate::Ignored;
        };

        self.rows
            .push_front(TableRow::build(block, &columns, &link_class, now));
        update
    }

    /// Height of the first row.
    #[must_use]
    pub fn tip_height(&self) -> Option<u64> {
        self.rows.front().map(|r| r.height)
    }

    /// Column layout of the first row.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnKind> {
        self.rows.front().map(TableRow::columns).unwrap_or_default()
    }

    /// Rows, tip first.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter()
    }

    /// Row heights, tip first.
    #[must_use]
    pub fn heights(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.height).collect()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Recompute every age cell against `now`.
    pub fn refresh_ages(&mut self, now: DateTime<Utc>) {
        for cell in self.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
            cell.refresh_age(now);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
