//! Finance report detail.
//!
//! The report view's sections are stacked top to bottom in a fixed order;
//! absent sections take no space.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
};

use crate::sort::SortField;
use crate::theme::{
    ACTIVE_SORT_STYLE, LINK_STYLE, MUTED_COLOR, PENDING_STYLE, TABLE_HEADER_STYLE, TOTAL_STYLE,
    WARNING_COLOR,
};
use crate::view::{
    DomainSpendView, FinanceView, PeriodTable, ProposalTable, ReportView, SortColumn,
    SpendSummary, SummaryRow, SummaryTable, TreasuryView,
};

use super::helpers::create_border_block;

/// Render the finance view.
pub fn render(frame: &mut Frame, area: Rect, view: &FinanceView, loading: bool) {
    match view {
        FinanceView::NoData { reason } => {
            let block = create_border_block("Finance Report", true);
            let text = Paragraph::new(vec![
                Line::from("No data to show."),
                Line::styled(reason.clone(), Style::default().fg(MUTED_COLOR)),
            ])
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(text, area);
        }
        FinanceView::Report(report) => render_report(frame, area, report, loading),
    }
}

// ============================================================================
// Report Layout
// ============================================================================

/// A section ready to be drawn, with the height it wants.
struct Section<'a> {
    height: u16,
    draw: Box<dyn Fn(&mut Frame, Rect) + 'a>,
}

impl<'a> Section<'a> {
    fn new(height: usize, draw: impl Fn(&mut Frame, Rect) + 'a) -> Self {
        Self {
            height: u16::try_from(height).unwrap_or(u16::MAX),
            draw: Box::new(draw),
        }
    }
}

fn render_report(frame: &mut Frame, area: Rect, report: &ReportView, loading: bool) {
    let block = create_border_block(&report.title, true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut sections = vec![Section::new(2, |f, a| {
        f.render_widget(Paragraph::new(breadcrumb_lines(report, loading)), a);
    })];

    if !report.summary_card.is_empty() {
        let extra = if report.proposal_links.is_some() { 2 } else { 0 };
        sections.push(Section::new(report.summary_card.len() + extra + 2, |f, a| {
            f.render_widget(summary_card(report), a);
        }));
    }
    if let Some(table) = &report.summary_table {
        sections.push(Section::new(table.rows.len() + 4, move |f, a| {
            f.render_widget(summary_table(table), a);
        }));
    }
    if let Some(table) = &report.proposal_table {
        sections.push(Section::new(table.rows.len() + 4, move |f, a| {
            f.render_widget(proposal_table(table), a);
        }));
    }
    if let Some(summary) = &report.spend_summary {
        sections.push(Section::new(6, move |f, a| {
            f.render_widget(spend_summary(summary), a);
        }));
    }
    if let Some(spend) = &report.domain_spend {
        sections.push(Section::new(spend.rows.len() + 4, move |f, a| {
            f.render_widget(domain_spend(spend), a);
        }));
    }
    if let Some(treasury) = &report.treasury {
        sections.push(Section::new(treasury.rows.len() + 3, move |f, a| {
            f.render_widget(treasury_table(treasury), a);
        }));
    }
    for table in [&report.monthly, &report.yearly].into_iter().flatten() {
        sections.push(Section::new(table.rows.len() + 3, move |f, a| {
            f.render_widget(period_table(table), a);
        }));
    }

    let constraints = sections
        .iter()
        .map(|s| Constraint::Length(s.height))
        .chain(std::iter::once(Constraint::Min(0)));
    let areas = Layout::vertical(constraints).split(inner);
    for (section, area) in sections.iter().zip(areas.iter()) {
        (section.draw)(frame, *area);
    }
}

fn breadcrumb_lines(report: &ReportView, loading: bool) -> Vec<Line<'static>> {
    let mut crumbs = vec![
        Span::styled("Finance Report", LINK_STYLE),
        Span::raw(" › "),
    ];
    if let Some((label, _)) = &report.year_breadcrumb {
        crumbs.push(Span::styled(label.clone(), LINK_STYLE));
        crumbs.push(Span::raw(" › "));
    }
    crumbs.push(Span::styled(report.current.clone(), TOTAL_STYLE));
    if loading {
        crumbs.push(Span::styled("  Loading...", Style::default().fg(WARNING_COLOR)));
    }

    let nav = &report.navigation;
    let prev = match (&nav.prev_key, nav.has_prev) {
        (Some(key), true) => Span::styled(format!("◀ {key}"), LINK_STYLE),
        (None, true) => Span::styled("◀ Previous", LINK_STYLE),
        _ => Span::styled("◀", Style::default().fg(MUTED_COLOR)),
    };
    let next = match (&nav.next_key, nav.has_next) {
        (Some(key), true) => Span::styled(format!("{key} ▶"), LINK_STYLE),
        (None, true) => Span::styled("Next ▶", LINK_STYLE),
        _ => Span::styled("▶", Style::default().fg(MUTED_COLOR)),
    };

    vec![Line::from(crumbs), Line::from(vec![prev, Span::raw("   "), next])]
}

// ============================================================================
// Sections
// ============================================================================

fn summary_card(report: &ReportView) -> Paragraph<'static> {
    let mut lines: Vec<Line<'static>> = report
        .summary_card
        .iter()
        .map(|line| {
            let value_style = if line.href.is_some() {
                LINK_STYLE
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{}: ", line.label), Style::default().fg(MUTED_COLOR)),
                Span::styled(line.value.clone(), value_style),
            ])
        })
        .collect();
    if let Some(links) = &report.proposal_links {
        lines.push(Line::from(vec![
            Span::styled("Vote: ", Style::default().fg(MUTED_COLOR)),
            Span::styled(links.vote.clone(), LINK_STYLE),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Discussion: ", Style::default().fg(MUTED_COLOR)),
            Span::styled(links.discussion.clone(), LINK_STYLE),
        ]));
    }
    Paragraph::new(lines).block(create_border_block("Summary", false))
}

fn sort_header(columns: &[SortColumn]) -> Row<'static> {
    Row::new(columns.iter().map(|c| {
        if c.active {
            let arrow = if c.descending { "▼" } else { "▲" };
            Cell::from(format!("{} {arrow}", c.title)).style(ACTIVE_SORT_STYLE)
        } else {
            Cell::from(c.title.clone())
        }
    }))
    .style(TABLE_HEADER_STYLE)
}

fn summary_value(row: &SummaryRow, field: SortField) -> Cell<'static> {
    let link = |text: &str| Cell::from(Span::styled(text.to_string(), LINK_STYLE));
    match field {
        SortField::ProposalName => link(&row.name),
        SortField::Domain => link(&row.domain),
        SortField::Author => link(&row.author),
        SortField::StartDate => Cell::from(row.start.clone()),
        SortField::EndDate => Cell::from(row.end.clone()),
        SortField::Budget => Cell::from(row.budget.clone()),
        SortField::Days => Cell::from(row.days.clone()),
        SortField::Average => Cell::from(row.monthly_average.clone()),
        SortField::Spent => Cell::from(row.spent.clone()),
        SortField::Remaining => Cell::from(row.remaining.clone()),
    }
}

fn summary_table(table: &SummaryTable) -> Table<'static> {
    let fields: Vec<SortField> = table.columns.iter().map(|c| c.field).collect();
    let mut rows: Vec<Row<'static>> = table
        .rows
        .iter()
        .map(|row| {
            let r = Row::new(fields.iter().map(|f| summary_value(row, *f)));
            if row.active { r.style(PENDING_STYLE) } else { r }
        })
        .collect();
    rows.push(
        Row::new(fields.iter().map(|f| match f {
            SortField::ProposalName => Cell::from("Total"),
            SortField::Budget => Cell::from(table.total_budget.clone()),
            SortField::Spent => Cell::from(table.total_spent.clone()),
            SortField::Remaining => Cell::from(table.total_remaining.clone()),
            _ => Cell::from(""),
        }))
        .style(TOTAL_STYLE),
    );
    let widths: Vec<Constraint> = fields
        .iter()
        .map(|f| match f {
            SortField::ProposalName => Constraint::Min(20),
            SortField::Days => Constraint::Length(6),
            _ => Constraint::Length(12),
        })
        .collect();
    Table::new(rows, widths)
        .header(sort_header(&table.columns))
        .block(create_border_block(&table.title, false))
}

fn proposal_table(table: &ProposalTable) -> Table<'static> {
    let mut rows: Vec<Row<'static>> = table
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(Span::styled(row.name.clone(), LINK_STYLE)),
                Cell::from(Span::styled(row.domain.clone(), LINK_STYLE)),
                Cell::from(row.spent.clone()),
            ])
        })
        .collect();
    rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(""),
            Cell::from(table.total.clone()),
        ])
        .style(TOTAL_STYLE),
    );
    Table::new(
        rows,
        [Constraint::Min(20), Constraint::Length(14), Constraint::Length(18)],
    )
    .header(sort_header(&table.columns))
    .block(create_border_block("Proposals", false))
}

fn spend_summary(summary: &SpendSummary) -> Paragraph<'static> {
    let line = |label: &str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(MUTED_COLOR)),
            Span::raw(value.to_string()),
        ])
    };
    let mut lines = vec![line("Proposal Expenditure (Est)", &summary.expenditure)];
    if let Some(value) = &summary.proposal_spent {
        lines.push(line("Proposals Spent", value));
    }
    if let Some(value) = &summary.treasury_spent {
        lines.push(line("Treasury Spent", value));
    }
    if let Some(value) = &summary.delta {
        lines.push(line("Delta", value));
    }
    Paragraph::new(lines).block(create_border_block("Spending", false))
}

fn domain_spend(spend: &DomainSpendView) -> Table<'static> {
    let mut rows: Vec<Row<'static>> = spend
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(Span::styled(row.domain.clone(), LINK_STYLE)),
                Cell::from(row.dcr.clone()),
                Cell::from(row.usd.clone()),
            ])
        })
        .collect();
    rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(spend.total_dcr.clone()),
            Cell::from(spend.total_usd.clone()),
        ])
        .style(TOTAL_STYLE),
    );
    Table::new(
        rows,
        [Constraint::Min(14), Constraint::Length(16), Constraint::Length(16)],
    )
    .header(Row::new(["Domain", "Spent (DCR)", "Spent (USD)"]).style(TABLE_HEADER_STYLE))
    .block(create_border_block("Domain Spending", false))
}

fn treasury_table(treasury: &TreasuryView) -> Table<'static> {
    let rows = treasury.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.label.clone()),
            Cell::from(row.dcr.clone()),
            Cell::from(row.usd.clone()),
        ])
    });
    Table::new(
        rows,
        [Constraint::Min(24), Constraint::Length(20), Constraint::Length(16)],
    )
    .header(Row::new(["", "DCR", "USD"]).style(TABLE_HEADER_STYLE))
    .block(create_border_block("Treasury", false))
}

fn period_table(table: &PeriodTable) -> Table<'static> {
    let mut header = vec![table.period.clone(), "Spent (USD)".into(), "Spent (DCR)".into()];
    if table.show_actual {
        header.push("Actual (USD)".into());
        header.push("Actual (DCR)".into());
    }
    let rows = table.rows.iter().map(|row| {
        let mut cells = vec![
            Cell::from(Span::styled(row.label.clone(), LINK_STYLE)),
            Cell::from(row.usd.clone()),
            Cell::from(row.dcr.clone()),
        ];
        if let (Some(usd), Some(dcr)) = (&row.actual_usd, &row.actual_dcr) {
            cells.push(Cell::from(usd.clone()));
            cells.push(Cell::from(dcr.clone()));
        }
        let r = Row::new(cells);
        if row.is_future { r.style(PENDING_STYLE) } else { r }
    });
    let widths = vec![Constraint::Length(14); header.len()];
    let title = format!("{}ly Spending", table.period);
    Table::new(rows, widths)
        .header(Row::new(header).style(TABLE_HEADER_STYLE))
        .block(create_border_block(&title, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportPayload;
    use crate::pagination::Position;
    use crate::query::FinanceSettings;
    use crate::ui::test_support::buffer_text;
    use chrono::{TimeZone, Utc};
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    fn draw(view: &FinanceView, loading: bool) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 60)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), view, loading))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn build(query: &str, payload: serde_json::Value, navigation: Position) -> FinanceView {
        let settings = FinanceSettings::from_query(query);
        let report = ReportPayload::from_value(payload).unwrap();
        let view = ReportView::build(
            &settings,
            Some(&report),
            navigation,
            "https://proposals.example",
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();
        FinanceView::Report(Box::new(view))
    }

    #[test]
    fn test_no_data_shows_reason() {
        let text = draw(
            &FinanceView::NoData {
                reason: "missing report type".to_string(),
            },
            false,
        );
        assert!(text.contains("No data to show."));
        assert!(text.contains("missing report type"));
    }

    #[test]
    fn test_domain_report_sections() {
        let view = build(
            "type=domain&name=marketing&stype=budget",
            json!({
                "proposalInfos": [
                    {"name": "Ads", "token": "t1", "domain": "marketing", "author": "amy",
                     "budget": 100.0, "totalSpent": 40.0, "totalRemaining": 60.0,
                     "start": "2021-01-01", "end": "2021-12-31"},
                ],
                "domainList": ["development", "marketing", "research"],
            }),
            Position {
                has_prev: true,
                has_next: true,
                prev_key: Some("development".to_string()),
                next_key: Some("research".to_string()),
            },
        );
        let text = draw(&view, true);
        assert!(text.contains("Loading..."));
        assert!(text.contains("◀ development"));
        assert!(text.contains("research ▶"));
        assert!(text.contains("Ads"));
        assert!(text.contains("Budget ▼"));
        assert!(text.contains("Total"));
    }

    #[test]
    fn test_disabled_navigation_has_no_keys() {
        let FinanceView::Report(report) =
            build("type=year&time=2021", json!({}), Position::disabled())
        else {
            panic!("expected a report view");
        };
        let lines = breadcrumb_lines(&report, false);
        let nav: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(nav, "◀   ▶");
    }
}
