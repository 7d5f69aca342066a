use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum InputState {
    #[default]
    Editing,
    Submitted,
    Canceled,
}

/// Single line text input for the command line. The cursor counts chars, not bytes.
#[derive(Debug, Default)]
pub struct Inputter {
    text: String,
    cursor: usize,
    state: InputState,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub cursor: usize,
    pub state: InputState,
}

impl InputResult {
    pub fn finished(&self) -> bool {
        self.state != InputState::Editing
    }
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.state = InputState::Submitted,
            (KeyCode::Esc, _) => {
                self.text.clear();
                self.cursor = 0;
                self.state = InputState::Canceled;
            }
            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_pos();
                    self.text.remove(at);
                }
            }
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => {
                self.cursor = std::cmp::min(self.cursor + 1, self.text.chars().count())
            }
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.text.chars().count(),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_pos();
                self.text.insert(at, c);
                self.cursor += 1;
            }
            (code, modifiers) => trace!("Ignored input key {code:?} {modifiers:?}"),
        }
        self.get()
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.text.clone(),
            cursor: self.cursor,
            state: self.state,
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.state = InputState::Editing;
    }

    fn byte_pos(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}
