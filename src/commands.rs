//! Key bindings.
//!
//! Key input is mapped to an [`AppCommand`] by [`KeyMapper`], a pure
//! function of the key and the [`InputContext`]. The app executes commands.
//!
//! ```text
//! KeyEvent -> KeyMapper -> AppCommand -> App::execute_command
//! ```

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::sort::SortField;

// ============================================================================
// Input Context
// ============================================================================

/// Which keybindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    /// The live block list.
    Blocks,
    /// The finance report detail.
    Report,
    /// A message popup is shown.
    MessagePopup,
}

impl InputContext {
    /// Returns `true` if this context is a popup over a screen.
    #[must_use]
    pub const fn is_popup(&self) -> bool {
        matches!(self, Self::MessagePopup)
    }
}

// ============================================================================
// App Commands
// ============================================================================

/// Everything a key press can ask the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Exit the application.
    Quit,
    /// Switch between the block list and the report.
    SwitchScreen,
    /// Close the message popup.
    Dismiss,
    /// Toggle the visual blocks column.
    ToggleVisualBlocks,
    /// Show the previous report.
    PreviousReport,
    /// Show the next report.
    NextReport,
    /// Reload the current report.
    ReloadReport,
    /// Sort the summary table by a column.
    SortBy(SortField),
    /// Unhandled key.
    Noop,
}

impl AppCommand {
    /// Returns `true` if this command would exit the application.
    #[must_use]
    pub const fn is_exit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}

// ============================================================================
// Key Mapper
// ============================================================================

/// Maps key events to application commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMapper;

impl KeyMapper {
    /// Map a key event in `context` to a command.
    #[must_use]
    pub fn map_key(key: KeyEvent, context: &InputContext) -> AppCommand {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return AppCommand::Quit;
        }
        match context {
            InputContext::Blocks => Self::map_blocks_keys(key),
            InputContext::Report => Self::map_report_keys(key),
            InputContext::MessagePopup => Self::map_message_popup_keys(key),
        }
    }

    fn map_common_keys(key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Char('q') => AppCommand::Quit,
            KeyCode::Tab => AppCommand::SwitchScreen,
            _ => AppCommand::Noop,
        }
    }

    fn map_blocks_keys(key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Char('v') => AppCommand::ToggleVisualBlocks,
            _ => Self::map_common_keys(key),
        }
    }

    fn map_report_keys(key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => AppCommand::PreviousReport,
            KeyCode::Right | KeyCode::Char('l') => AppCommand::NextReport,
            KeyCode::Char('r') => AppCommand::ReloadReport,
            KeyCode::Char(c) => Self::sort_field_for(c)
                .map_or_else(|| Self::map_common_keys(key), AppCommand::SortBy),
            _ => Self::map_common_keys(key),
        }
    }

    fn map_message_popup_keys(key: KeyEvent) -> AppCommand {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => AppCommand::Dismiss,
            KeyCode::Char('q') => AppCommand::Quit,
            _ => AppCommand::Noop,
        }
    }

    /// Digit keys `1`..`9` then `0` pick the summary columns in order.
    fn sort_field_for(c: char) -> Option<SortField> {
        let index = match c.to_digit(10)? {
            0 => 9,
            d => d as usize - 1,
        };
        SortField::ALL.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use rstest::rstest;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[rstest]
    #[case::quit(KeyCode::Char('q'), AppCommand::Quit)]
    #[case::switch(KeyCode::Tab, AppCommand::SwitchScreen)]
    #[case::toggle(KeyCode::Char('v'), AppCommand::ToggleVisualBlocks)]
    #[case::no_prev_on_blocks(KeyCode::Left, AppCommand::Noop)]
    #[case::no_sort_on_blocks(KeyCode::Char('1'), AppCommand::Noop)]
    fn test_blocks_keys(#[case] code: KeyCode, #[case] expected: AppCommand) {
        assert_eq!(
            KeyMapper::map_key(key_event(code), &InputContext::Blocks),
            expected
        );
    }

    #[rstest]
    #[case::left(KeyCode::Left, AppCommand::PreviousReport)]
    #[case::h(KeyCode::Char('h'), AppCommand::PreviousReport)]
    #[case::right(KeyCode::Right, AppCommand::NextReport)]
    #[case::l(KeyCode::Char('l'), AppCommand::NextReport)]
    #[case::reload(KeyCode::Char('r'), AppCommand::ReloadReport)]
    #[case::first_column(KeyCode::Char('1'), AppCommand::SortBy(SortField::ProposalName))]
    #[case::tenth_column(KeyCode::Char('0'), AppCommand::SortBy(SortField::Remaining))]
    #[case::quit(KeyCode::Char('q'), AppCommand::Quit)]
    #[case::no_toggle_on_report(KeyCode::Char('v'), AppCommand::Noop)]
    fn test_report_keys(#[case] code: KeyCode, #[case] expected: AppCommand) {
        assert_eq!(
            KeyMapper::map_key(key_event(code), &InputContext::Report),
            expected
        );
    }

    #[test]
    fn test_popup_swallows_screen_keys() {
        let ctx = InputContext::MessagePopup;
        assert!(ctx.is_popup());
        assert_eq!(KeyMapper::map_key(key_event(KeyCode::Esc), &ctx), AppCommand::Dismiss);
        assert_eq!(KeyMapper::map_key(key_event(KeyCode::Tab), &ctx), AppCommand::Noop);
        assert_eq!(KeyMapper::map_key(key_event(KeyCode::Char('v')), &ctx), AppCommand::Noop);
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let key = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key_event(KeyCode::Char('c'))
        };
        for ctx in [InputContext::Blocks, InputContext::Report, InputContext::MessagePopup] {
            assert!(KeyMapper::map_key(key, &ctx).is_exit());
        }
    }
}
