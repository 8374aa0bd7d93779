// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const FIELD_CHAR_LIMIT: usize = 64;

/// Terminal-independent key, translated from the backend's events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    BackTab,
}

/// Single-line editor with a character-indexed cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
    max_chars: usize,
}

impl Default for TextInput {
    fn default() -> Self {
        Self::with_limit(FIELD_CHAR_LIMIT)
    }
}

impl TextInput {
    pub fn with_limit(max_chars: usize) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            max_chars,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Replaces the contents, truncating to the limit, and parks the cursor at the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.max_chars).collect();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, ch: char) -> bool {
        if ch.is_control() || self.char_count() >= self.max_chars {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn delete_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.replace_range(..at, "");
        self.cursor = 0;
        true
    }

    pub fn delete_to_end(&mut self) -> bool {
        let at = self.byte_offset(self.cursor);
        if at >= self.value.len() {
            return false;
        }
        self.value.truncate(at);
        true
    }

    /// Applies an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(ch) => self.insert(ch),
            KeyInput::Backspace | KeyInput::Ctrl('h') => self.backspace(),
            KeyInput::Delete | KeyInput::Ctrl('d') => self.delete(),
            KeyInput::Left | KeyInput::Ctrl('b') => {
                self.move_left();
                false
            }
            KeyInput::Right | KeyInput::Ctrl('f') => {
                self.move_right();
                false
            }
            KeyInput::Home | KeyInput::Ctrl('a') => {
                self.move_home();
                false
            }
            KeyInput::End | KeyInput::Ctrl('e') => {
                self.move_end();
                false
            }
            KeyInput::Ctrl('u') => self.delete_to_start(),
            KeyInput::Ctrl('k') => self.delete_to_end(),
            _ => false,
        }
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(offset, _)| offset)
    }
}
