//! Live block table.
//!
//! With visual blocks on, the count columns give way to one compact band per
//! block: votes, then tickets and revocations, then regular transactions.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell as TableCell, Paragraph, Row, Table},
};

use crate::live::{Cell, CellContent, ColumnKind, Slot, SlotKind, VisualBlock};
use crate::theme::{
    ERROR_COLOR, LINK_STYLE, MUTED_COLOR, SUCCESS_COLOR, TABLE_HEADER_STYLE, WARNING_COLOR,
};
use crate::view::BlockListView;

use super::helpers::create_border_block;

const DESCRIPTION: &str =
    "Visual blocks: ● vote (red: disapproved)  ■ ticket  ▪ revocation  ▮ transaction";

/// Render the block list.
pub fn render(frame: &mut Frame, area: Rect, view: &BlockListView) {
    let block = create_border_block("Latest Blocks", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let description_height = u16::from(view.show_description);
    let nav_height = u16::from(!view.nav_links.is_empty());
    let [description_area, table_area, nav_area] = Layout::vertical([
        Constraint::Length(description_height),
        Constraint::Min(1),
        Constraint::Length(nav_height),
    ])
    .areas(inner);

    if view.show_description {
        let description = Paragraph::new(DESCRIPTION).style(Style::default().fg(MUTED_COLOR));
        frame.render_widget(description, description_area);
    }

    if view.rows.is_empty() {
        let waiting = Paragraph::new("Waiting for blocks...")
            .style(Style::default().fg(MUTED_COLOR));
        frame.render_widget(waiting, table_area);
    } else {
        frame.render_widget(build_table(view), table_area);
    }

    if !view.nav_links.is_empty() {
        let links = Paragraph::new(view.nav_links.join("  ")).style(LINK_STYLE);
        frame.render_widget(links, nav_area);
    }
}

fn build_table(view: &BlockListView) -> Table<'static> {
    let header = Row::new(
        view.columns
            .iter()
            .map(|c| TableCell::from(c.title.clone())),
    )
    .style(TABLE_HEADER_STYLE);

    let rows = view
        .rows
        .iter()
        .map(|row| Row::new(row.cells.iter().map(table_cell)));

    let widths: Vec<Constraint> = view.columns.iter().map(|c| column_width(&c.kind)).collect();

    Table::new(rows, widths).header(header).column_spacing(2)
}

fn column_width(kind: &ColumnKind) -> Constraint {
    match kind {
        ColumnKind::Height => Constraint::Length(8),
        ColumnKind::VisualBlock => Constraint::Min(30),
        ColumnKind::Time => Constraint::Length(19),
        ColumnKind::Age => Constraint::Length(8),
        _ => Constraint::Length(8),
    }
}

fn table_cell(cell: &Cell) -> TableCell<'static> {
    match &cell.content {
        CellContent::Text(text) => TableCell::from(text.clone()),
        CellContent::Link { text, .. } => TableCell::from(Span::styled(text.clone(), LINK_STYLE)),
        CellContent::Visual(visual) => TableCell::from(visual_line(visual)),
    }
}

/// One-line rendition of a visual block.
#[must_use]
pub fn visual_line(visual: &VisualBlock) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = visual.votes.iter().map(slot_span).collect();
    spans.push(Span::raw(" "));
    spans.extend(visual.tickets.iter().map(slot_span));
    spans.push(Span::raw(" "));
    if visual.transactions.is_empty() {
        spans.push(Span::styled("-", Style::default().fg(MUTED_COLOR)));
    } else {
        spans.extend(visual.transactions.iter().map(slot_span));
    }
    Line::from(spans)
}

fn slot_span(slot: &Slot) -> Span<'static> {
    match slot {
        Slot::Filled {
            kind, vote_valid, ..
        } => match kind {
            SlotKind::Vote => {
                let color = if *vote_valid == Some(false) {
                    ERROR_COLOR
                } else {
                    SUCCESS_COLOR
                };
                Span::styled("●", Style::default().fg(color))
            }
            SlotKind::Ticket => Span::styled("■", Style::default().fg(WARNING_COLOR)),
            SlotKind::Revocation => Span::styled("▪", Style::default().fg(ERROR_COLOR)),
            SlotKind::Transaction => Span::styled("▮", LINK_STYLE),
        },
        Slot::Empty(SlotKind::Vote) => Span::styled("○", Style::default().fg(MUTED_COLOR)),
        Slot::Empty(_) => Span::styled("□", Style::default().fg(MUTED_COLOR)),
        Slot::Overflow { hidden, .. } => {
            Span::styled(format!("+{hidden}"), Style::default().fg(MUTED_COLOR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BlockPayload;
    use crate::live::BlockTable;
    use crate::query::BlockListSettings;
    use crate::ui::test_support::buffer_text;
    use chrono::{TimeZone, Utc};
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    fn view(visual_blocks: bool) -> BlockListView {
        let now = Utc.timestamp_opt(1_700_000_030, 0).unwrap();
        let blocks: Vec<BlockPayload> = (100..=102)
            .map(|h| {
                BlockPayload::from_value(json!({
                    "height": h,
                    "unixStamp": 1_700_000_000,
                    "size": 2048,
                    "tx": 3,
                    "votes": 5,
                }))
            })
            .collect();
        let table = BlockTable::seed(&blocks, &ColumnKind::default_layout(), "fs18", now);
        BlockListView::build(&table, &BlockListSettings { visual_blocks }, &[])
    }

    fn draw(view: &BlockListView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 12)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), view))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_count_columns_render() {
        let text = draw(&view(false));
        assert!(text.contains("Height"));
        assert!(text.contains("Txns"));
        assert!(text.contains("102"));
        assert!(text.contains("30s"));
        assert!(!text.contains("Visual blocks:"));
    }

    #[test]
    fn test_visual_blocks_render_description() {
        let text = draw(&view(true));
        assert!(text.contains("Visual blocks:"));
        assert!(text.contains("Visual Blocks"));
        assert!(!text.contains("Txns"));
    }

    #[test]
    fn test_empty_table_waits() {
        let empty = BlockListView::build(&BlockTable::default(), &BlockListSettings::default(), &[]);
        assert!(draw(&empty).contains("Waiting for blocks..."));
    }

    #[test]
    fn test_visual_line_marks_missing_transactions() {
        let visual = VisualBlock::from_payload(&BlockPayload::from_value(json!({"height": 1})));
        let line = visual_line(&visual);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.ends_with('-'));
        assert!(text.starts_with('○'));
    }
}
