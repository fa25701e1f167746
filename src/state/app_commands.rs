//! Command execution for the dcrlens application.

use crossterm::event::KeyEvent;

use crate::commands::{AppCommand, KeyMapper};

use super::App;

impl App {
    /// Map `key` in the current context and execute the command.
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) {
        let command = KeyMapper::map_key(key, &self.input_context());
        self.execute_command(command);
    }

    /// Execute a command.
    pub fn execute_command(&mut self, command: AppCommand) {
        match command {
            AppCommand::Quit => self.exit = true,
            AppCommand::SwitchScreen => self.screen = self.screen.toggled(),
            AppCommand::Dismiss => self.message = None,
            AppCommand::ToggleVisualBlocks => {
                let enabled = self.blocks.toggle_visual_blocks();
                tracing::debug!("Visual blocks {}", if enabled { "on" } else { "off" });
            }
            AppCommand::PreviousReport => self.step_report(-1),
            AppCommand::NextReport => self.step_report(1),
            AppCommand::ReloadReport => self.request_report(),
            AppCommand::SortBy(field) => self.finance.sort_by(field),
            AppCommand::Noop => {}
        }
    }

    fn step_report(&mut self, delta: i32) {
        if self.finance.step_report(delta) {
            self.request_report();
        }
    }
}
