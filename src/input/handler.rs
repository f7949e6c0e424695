use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction};

/// What a key press means to the terminal front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Game(Action),
    Quit,
    None,
}

#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        let direction = match key.code {
            KeyCode::Up | KeyCode::Char('w' | 'W') => Some(Direction::Up),
            KeyCode::Down | KeyCode::Char('s' | 'S') => Some(Direction::Down),
            KeyCode::Left | KeyCode::Char('a' | 'A') => Some(Direction::Left),
            KeyCode::Right | KeyCode::Char('d' | 'D') => Some(Direction::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            return KeyAction::Game(Action::Move(direction));
        }

        match key.code {
            KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Game(Action::Start),
            KeyCode::Char('r' | 'R') => KeyAction::Game(Action::Restart),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => KeyAction::Quit,
            _ => KeyAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(press(KeyCode::Up), KeyAction::Game(Action::Move(Direction::Up)));
        assert_eq!(
            press(KeyCode::Down),
            KeyAction::Game(Action::Move(Direction::Down))
        );
        assert_eq!(
            press(KeyCode::Left),
            KeyAction::Game(Action::Move(Direction::Left))
        );
        assert_eq!(
            press(KeyCode::Right),
            KeyAction::Game(Action::Move(Direction::Right))
        );
    }

    #[test]
    fn test_wasd_keys() {
        assert_eq!(
            press(KeyCode::Char('w')),
            KeyAction::Game(Action::Move(Direction::Up))
        );
        assert_eq!(
            press(KeyCode::Char('a')),
            KeyAction::Game(Action::Move(Direction::Left))
        );
        assert_eq!(
            press(KeyCode::Char('S')),
            KeyAction::Game(Action::Move(Direction::Down))
        );
        assert_eq!(
            press(KeyCode::Char('D')),
            KeyAction::Game(Action::Move(Direction::Right))
        );
    }

    #[test]
    fn test_start_keys() {
        assert_eq!(press(KeyCode::Char(' ')), KeyAction::Game(Action::Start));
        assert_eq!(press(KeyCode::Enter), KeyAction::Game(Action::Start));
        assert_eq!(press(KeyCode::Char('r')), KeyAction::Game(Action::Restart));
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(press(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(InputHandler::new().handle_key_event(ctrl_c), KeyAction::Quit);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(press(KeyCode::Char('x')), KeyAction::None);
        assert_eq!(press(KeyCode::Tab), KeyAction::None);
    }
}
