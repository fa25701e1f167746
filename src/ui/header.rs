//! Header rendering: logo, screen tabs and the location of the active
//! screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{App, Screen};
use crate::theme::{MUTED_COLOR, PRIMARY_COLOR};

use super::helpers::create_border_block;

/// Render the application header.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let header_block = create_border_block("", false);
    let inner = header_block.inner(area);
    frame.render_widget(header_block, area);

    if inner.height == 0 {
        return;
    }

    let [logo_area, tabs_area, location_area] = Layout::horizontal([
        Constraint::Length(11),
        Constraint::Length(22),
        Constraint::Min(0),
    ])
    .areas(inner);

    frame.render_widget(Paragraph::new(create_logo()), logo_area);
    frame.render_widget(Paragraph::new(create_tabs(app.screen)), tabs_area);

    let href = match app.screen {
        Screen::Blocks => app.blocks.location().href(),
        Screen::Report => app.finance.location().href(),
    };
    // Trailing cell keeps the href off the border.
    let location = Paragraph::new(format!("{href} "))
        .style(Style::default().fg(MUTED_COLOR))
        .alignment(Alignment::Right);
    frame.render_widget(location, location_area);
}

fn create_logo() -> Line<'static> {
    Line::from(vec![
        " [".into(),
        "dcr".cyan().bold(),
        "lens".blue().bold(),
        "]".into(),
    ])
}

fn create_tabs(active: Screen) -> Line<'static> {
    let tab = |label: &'static str, screen: Screen| {
        if screen == active {
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(PRIMARY_COLOR)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
        } else {
            Span::styled(format!(" {label} "), Style::default().fg(MUTED_COLOR))
        }
    };
    Line::from(vec![
        tab("Blocks", Screen::Blocks),
        " ".into(),
        tab("Report", Screen::Report),
    ])
}

// ============================================================================
// Tests
// ============================================================================
