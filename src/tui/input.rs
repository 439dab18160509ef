use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::Screen;
use crate::constants::UI_SCROLL_LINES;
use crate::conversation::QuickAction;

/// Handle input processing
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Process a key event for the given view
    pub fn handle_key(&self, key: KeyEvent, screen: Screen, recording: bool) -> InputAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => InputAction::Quit,
                KeyCode::Char('r') if screen == Screen::Chat => InputAction::ToggleRecording,
                KeyCode::Char('l') if screen == Screen::Chat => InputAction::Logout,
                _ => InputAction::None,
            };
        }

        match screen {
            Screen::Login => match key.code {
                KeyCode::Enter => InputAction::Submit,
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    InputAction::SwitchField
                }
                KeyCode::Esc => InputAction::Quit,
                KeyCode::Char(c) => InputAction::Insert(c),
                KeyCode::Backspace => InputAction::Delete,
                _ => InputAction::None,
            },
            Screen::Chat if recording => match key.code {
                KeyCode::Enter => InputAction::ToggleRecording,
                KeyCode::Esc => InputAction::CancelRecording,
                _ => InputAction::None,
            },
            Screen::Chat => match key.code {
                KeyCode::Enter => InputAction::Submit,
                KeyCode::F(n @ 1..=4) => InputAction::QuickAction(QuickAction::ALL[n as usize - 1]),
                KeyCode::Up => InputAction::ScrollUp(UI_SCROLL_LINES),
                KeyCode::Down => InputAction::ScrollDown(UI_SCROLL_LINES),
                KeyCode::PageUp => InputAction::ScrollUp(10),
                KeyCode::PageDown => InputAction::ScrollDown(10),
                KeyCode::Char(c) => InputAction::Insert(c),
                KeyCode::Backspace => InputAction::Delete,
                _ => InputAction::None,
            },
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Submit,
    Insert(char),
    Delete,
    SwitchField,
    QuickAction(QuickAction),
    ToggleRecording,
    CancelRecording,
    ScrollUp(u16),
    ScrollDown(u16),
    Logout,
    Quit,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_login_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Enter), Screen::Login, false), InputAction::Submit);
        assert_eq!(handler.handle_key(key(KeyCode::Tab), Screen::Login, false), InputAction::SwitchField);
        assert_eq!(handler.handle_key(key(KeyCode::Char('m')), Screen::Login, false), InputAction::Insert('m'));
        // Chat shortcuts do nothing before signing in
        assert_eq!(handler.handle_key(ctrl('r'), Screen::Login, false), InputAction::None);
        assert_eq!(handler.handle_key(ctrl('c'), Screen::Login, false), InputAction::Quit);
    }

    #[test]
    fn test_chat_keys() {
        let handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key(KeyCode::F(1)), Screen::Chat, false),
            InputAction::QuickAction(QuickAction::Medications)
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::F(4)), Screen::Chat, false),
            InputAction::QuickAction(QuickAction::Mood)
        );
        assert_eq!(handler.handle_key(key(KeyCode::F(5)), Screen::Chat, false), InputAction::None);
        assert_eq!(handler.handle_key(ctrl('r'), Screen::Chat, false), InputAction::ToggleRecording);
        assert_eq!(handler.handle_key(ctrl('l'), Screen::Chat, false), InputAction::Logout);
        assert_eq!(handler.handle_key(key(KeyCode::PageUp), Screen::Chat, false), InputAction::ScrollUp(10));
    }

    #[test]
    fn test_recording_keys() {
        let handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Enter), Screen::Chat, true), InputAction::ToggleRecording);
        assert_eq!(handler.handle_key(key(KeyCode::Esc), Screen::Chat, true), InputAction::CancelRecording);
        // Typing is disabled while recording
        assert_eq!(handler.handle_key(key(KeyCode::Char('a')), Screen::Chat, true), InputAction::None);
    }
}
