//! Theme and styling constants for the dcrlens TUI.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Color Constants
// ============================================================================

/// Primary accent color - focused elements and highlights.
pub const PRIMARY_COLOR: Color = Color::Cyan;

/// Links: heights, proposals, domains and authors.
pub const LINK_COLOR: Color = Color::Blue;

/// Success indicator color.
pub const SUCCESS_COLOR: Color = Color::Green;

/// Warning indicator color.
pub const WARNING_COLOR: Color = Color::Yellow;

/// Error indicator color.
pub const ERROR_COLOR: Color = Color::Red;

/// Muted text color.
pub const MUTED_COLOR: Color = Color::Gray;

// ============================================================================
// Style Constants
// ============================================================================

/// Default border style for unfocused elements.
pub const BORDER_STYLE: Style = Style::new().fg(Color::DarkGray);

/// Border style for focused/active elements.
pub const FOCUSED_BORDER_STYLE: Style = Style::new().fg(PRIMARY_COLOR);

/// Title style for focused/active elements.
pub const FOCUSED_TITLE_STYLE: Style = Style::new().fg(PRIMARY_COLOR).add_modifier(Modifier::BOLD);

/// Table header row.
pub const TABLE_HEADER_STYLE: Style = Style::new()
    .fg(Color::White)
    .add_modifier(Modifier::BOLD);

/// Header cell of the active sort column.
pub const ACTIVE_SORT_STYLE: Style = Style::new()
    .fg(PRIMARY_COLOR)
    .add_modifier(Modifier::BOLD);

/// Link text.
pub const LINK_STYLE: Style = Style::new().fg(LINK_COLOR);

/// Totals rows.
pub const TOTAL_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

/// Rows of proposals that are still running or periods still to come.
pub const PENDING_STYLE: Style = Style::new().fg(MUTED_COLOR).add_modifier(Modifier::ITALIC);
