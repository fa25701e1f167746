//! Footer bar with the key hints of the current input context.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    widgets::Paragraph,
};

use crate::commands::InputContext;
use crate::state::App;
use crate::theme::MUTED_COLOR;

/// Key hints for `context`.
#[must_use]
pub const fn hints(context: InputContext) -> &'static str {
    match context {
        InputContext::Blocks => "q:Quit  Tab:Report  v:Visual blocks",
        InputContext::Report => "q:Quit  Tab:Blocks  ←/h:Prev  →/l:Next  1-0:Sort  r:Reload",
        InputContext::MessagePopup => "Esc:Close  q:Quit",
    }
}

/// Renders the footer bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let footer = Paragraph::new(hints(app.input_context()))
        .style(Style::default().fg(MUTED_COLOR))
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StartupOptions;
    use crate::ui::test_support::{buffer_text, test_app};
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_footer_follows_context() {
        let mut app = test_app(StartupOptions::default());
        let mut terminal = Terminal::new(TestBackend::new(80, 1)).unwrap();

        terminal
            .draw(|frame| render(frame, frame.area(), &app))
            .unwrap();
        assert_eq!(
            buffer_text(terminal.backend().buffer()).trim(),
            hints(InputContext::Blocks)
        );

        app.show_message("boom");
        terminal
            .draw(|frame| render(frame, frame.area(), &app))
            .unwrap();
        assert_eq!(buffer_text(terminal.backend().buffer()).trim(), "Esc:Close  q:Quit");
    }

    #[test]
    fn test_narrow_footer_does_not_panic() {
        let app = test_app(StartupOptions::default());
        let mut terminal = Terminal::new(TestBackend::new(20, 1)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &app))
            .unwrap();
        terminal
            .draw(|frame| render(frame, Rect::new(0, 0, 20, 0), &app))
            .unwrap();
    }
}
