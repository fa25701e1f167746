//! Block list view.

use crate::live::{BlockTable, Cell, ColumnKind};
use crate::query::BlockListSettings;

/// A visible column header.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeader {
    /// Column kind.
    pub kind: ColumnKind,
    /// Header text.
    pub title: String,
}

/// A table row restricted to the visible columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    /// Block height.
    pub height: u64,
    /// Visible cells, in column order.
    pub cells: Vec<Cell>,
}

/// Everything the block list renders.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockListView {
    /// Whether visual blocks are shown.
    pub visual_blocks: bool,
    /// Visible column headers.
    pub columns: Vec<ColumnHeader>,
    /// Rows, tip first.
    pub rows: Vec<RowView>,
    /// Whether the visual block legend is shown.
    pub show_description: bool,
    /// Pagination links, carrying the visual-blocks flag.
    pub nav_links: Vec<String>,
}

impl BlockListView {
    /// Build the view of a table under the given settings.
    #[must_use]
    pub fn build(table: &BlockTable, settings: &BlockListSettings, nav_links: &[String]) -> Self {
        let visual_blocks = settings.visual_blocks;
        let layout = if table.is_empty() {
            ColumnKind::default_layout()
        } else {
            table.columns()
        };
        let columns = layout
            .into_iter()
            .filter(|kind| kind.is_visible(visual_blocks))
            .map(|kind| ColumnHeader {
                title: kind.title(),
                kind,
            })
            .collect();
        let rows = table
            .rows()
            .map(|row| RowView {
                height: row.height,
                cells: row
                    .cells
                    .iter()
                    .filter(|c| c.kind.is_visible(visual_blocks))
                    .cloned()
                    .collect(),
            })
            .collect();
        Self {
            visual_blocks,
            columns,
            rows,
            show_description: visual_blocks,
            nav_links: nav_links.to_vec(),
        }
    }

    /// Header titles, in order.
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockPayload;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn table() -> BlockTable {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let blocks: Vec<BlockPayload> = (1..=3)
            .map(|h| BlockPayload::from_value(json!({"height": h, "tx": 4, "votes": 5})))
            .collect();
        BlockTable::seed(&blocks, &ColumnKind::default_layout(), "fs18", now)
    }

    #[test]
    fn test_count_columns_without_visual_blocks() {
        let view = BlockListView::build(&table(), &BlockListSettings::default(), &[]);
        assert_eq!(
            view.titles(),
            vec!["Height", "Txns", "Votes", "Tickets", "Revokes", "Size", "Value", "Age", "Time (UTC)"]
        );
        assert!(!view.show_description);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0].height, 3);
        assert_eq!(view.rows[0].cells[1].display_text(), "4");
    }

    #[test]
    fn test_visual_blocks_replace_count_columns() {
        let settings = BlockListSettings { visual_blocks: true };
        let view = BlockListView::build(&table(), &settings, &["/blocks?offset=10".to_string()]);
        assert_eq!(
            view.titles(),
            vec!["Height", "Visual Blocks", "Size", "Value", "Age", "Time (UTC)"]
        );
        assert!(view.show_description);
        assert!(view.rows.iter().all(|r| r.cells.len() == 6));
        assert_eq!(view.nav_links, vec!["/blocks?offset=10"]);
    }

    #[test]
    fn test_empty_table_uses_default_layout() {
        let view = BlockListView::build(&BlockTable::default(), &BlockListSettings::default(), &[]);
        assert!(view.rows.is_empty());
        assert_eq!(view.columns.len(), 9);
    }
}
