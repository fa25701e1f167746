//! UI rendering for the dcrlens TUI.
//!
//! Screens render the plain view descriptions built by the controllers; no
//! widget reads controller state directly.
//!
//! # Module Structure
//!
//! - `header` - Logo, screen tabs and the current location
//! - `footer` - Key hints
//! - `blocks` - Live block table
//! - `report` - Finance report detail
//! - `popup` - Message popup
//! - `helpers` - Shared block and placement helpers

pub mod blocks;
pub mod footer;
pub mod header;
pub mod helpers;
pub mod popup;
pub mod report;

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::constants::{FOOTER_HEIGHT, HEADER_HEIGHT};
use crate::state::{App, Screen};

// ============================================================================
// Main Render Entry Point
// ============================================================================

/// Draw the whole application: header, the active screen, footer and any
/// popup on top.
pub fn render(app: &App, frame: &mut Frame) {
    let size = frame.area();

    let [header_area, content_area, footer_area] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(FOOTER_HEIGHT),
    ])
    .areas(size);

    header::render(frame, header_area, app);
    match app.screen {
        Screen::Blocks => blocks::render(frame, content_area, &app.blocks.view()),
        Screen::Report => {
            report::render(frame, content_area, &app.finance.view(), app.report_loading);
        }
    }
    footer::render(frame, footer_area, app);

    if let Some(message) = &app.message {
        popup::render(frame, size, message);
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use ratatui::buffer::Buffer;

    use crate::cache::ManualClock;
    use crate::client::StaticSource;
    use crate::state::{App, AppConfig, StartupOptions};

    /// The buffer's text, one line per row with trailing blanks trimmed.
    pub fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// An app with no network behind it, at 2021-06-01.
    pub fn test_app(startup: StartupOptions) -> App {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
        ));
        App::with_source(
            AppConfig::default(),
            startup,
            Arc::new(StaticSource::new()),
            clock,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{buffer_text, test_app};
    use super::*;
    use crate::state::StartupOptions;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_render_blocks_screen_with_popup() {
        let mut app = test_app(StartupOptions::default());
        app.show_message("Failed to reach explorer");

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("Latest Blocks"));
        assert!(text.contains("Failed to reach explorer"));
        assert!(text.contains("Esc:Close"));
    }

    #[test]
    fn test_render_report_screen_without_report() {
        let app = test_app(StartupOptions {
            screen: Screen::Report,
            report_query: "type=proposal".to_string(),
            ..StartupOptions::default()
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("No data"));
        assert!(!text.contains("Latest Blocks"));
    }
}
