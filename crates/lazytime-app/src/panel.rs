// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{KeyInput, ListEntry, NoteId, Section, TextInput};

const DEFAULT_PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    /// Keystrokes edit the filter text.
    Filtering,
    /// Filter text is kept but navigation keys are live again.
    Applied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Ignored,
    CursorMoved(usize),
    FilterStarted,
    FilterChanged(String),
    FilterApplied(String),
    FilterCleared,
}

/// Navigable, filterable view over one section's notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPanel {
    section: Section,
    entries: Vec<ListEntry>,
    visible: Vec<usize>,
    cursor: usize,
    offset: usize,
    page_rows: usize,
    filter: TextInput,
    filter_state: FilterState,
}

impl ListPanel {
    pub fn new(section: Section) -> Self {
        Self {
            section,
            entries: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            offset: 0,
            page_rows: DEFAULT_PAGE_ROWS,
            filter: TextInput::default(),
            filter_state: FilterState::Unfiltered,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_rows(&self) -> usize {
        self.page_rows
    }

    pub fn filter_text(&self) -> &str {
        self.filter.value()
    }

    pub fn filter_cursor(&self) -> usize {
        self.filter.cursor()
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &ListEntry> {
        self.visible.iter().map(|index| &self.entries[*index])
    }

    pub fn selected_entry(&self) -> Option<&ListEntry> {
        self.visible
            .get(self.cursor)
            .and_then(|index| self.entries.get(*index))
    }

    /// Swaps in a fresh snapshot. The selected note stays selected when it survived the
    /// reload; otherwise cursor and scroll go back to the top.
    pub fn set_entries(&mut self, entries: Vec<ListEntry>) {
        let previous = self.selected_id();
        self.entries = entries;
        self.refilter();
        match previous.and_then(|id| self.visible_position(id)) {
            Some(position) => {
                self.cursor = position;
                self.scroll_to_cursor();
            }
            None => {
                self.cursor = 0;
                self.offset = 0;
            }
        }
    }

    /// Moves by `delta` rows, stopping at either end.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let before = self.cursor;
        if self.visible.is_empty() {
            self.cursor = 0;
        } else {
            let last = self.visible.len() as isize - 1;
            self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        }
        self.scroll_to_cursor();
        self.cursor != before
    }

    pub fn begin_filter(&mut self) {
        self.filter.clear();
        self.set_filter("");
    }

    /// Enters the filtering sub-mode with `text` and jumps to the first match.
    pub fn set_filter(&mut self, text: &str) {
        self.filter.set_value(text);
        self.filter_state = FilterState::Filtering;
        self.refilter();
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn accept_filter(&mut self) -> PanelEvent {
        if self.filter.value().trim().is_empty() {
            self.clear_filter();
            return PanelEvent::FilterCleared;
        }
        self.filter_state = FilterState::Applied;
        PanelEvent::FilterApplied(self.filter.value().to_owned())
    }

    pub fn clear_filter(&mut self) {
        let previous = self.selected_id();
        self.filter.clear();
        self.filter_state = FilterState::Unfiltered;
        self.refilter();
        self.cursor = previous
            .and_then(|id| self.visible_position(id))
            .unwrap_or(0);
        self.scroll_to_cursor();
    }

    pub fn set_page_rows(&mut self, rows: usize) {
        self.page_rows = rows.max(1);
        self.scroll_to_cursor();
    }

    pub fn handle_key(&mut self, key: KeyInput) -> PanelEvent {
        if self.is_filtering() {
            return self.handle_filter_key(key);
        }

        let page = self.page_rows as isize;
        match key {
            KeyInput::Char('j') | KeyInput::Down => self.moved(1),
            KeyInput::Char('k') | KeyInput::Up => self.moved(-1),
            KeyInput::Char('g') | KeyInput::Home => self.moved(isize::MIN / 2),
            KeyInput::Char('G') | KeyInput::End => self.moved(isize::MAX / 2),
            KeyInput::PageDown => self.moved(page),
            KeyInput::PageUp => self.moved(-page),
            KeyInput::Char('/') => {
                self.begin_filter();
                PanelEvent::FilterStarted
            }
            KeyInput::Esc if self.filter_state == FilterState::Applied => {
                self.clear_filter();
                PanelEvent::FilterCleared
            }
            _ => PanelEvent::Ignored,
        }
    }

    fn handle_filter_key(&mut self, key: KeyInput) -> PanelEvent {
        match key {
            KeyInput::Enter => self.accept_filter(),
            KeyInput::Esc => {
                self.clear_filter();
                PanelEvent::FilterCleared
            }
            KeyInput::Up | KeyInput::Ctrl('p') => self.moved(-1),
            KeyInput::Down | KeyInput::Ctrl('n') => self.moved(1),
            other => {
                if self.filter.handle_key(other) {
                    self.refilter();
                    self.cursor = 0;
                    self.offset = 0;
                    PanelEvent::FilterChanged(self.filter.value().to_owned())
                } else {
                    PanelEvent::Ignored
                }
            }
        }
    }

    fn moved(&mut self, delta: isize) -> PanelEvent {
        if self.move_cursor(delta) {
            PanelEvent::CursorMoved(self.cursor)
        } else {
            PanelEvent::Ignored
        }
    }

    fn selected_id(&self) -> Option<NoteId> {
        self.selected_entry().map(|entry| entry.id)
    }

    fn visible_position(&self, id: NoteId) -> Option<usize> {
        self.visible
            .iter()
            .position(|index| self.entries[*index].id == id)
    }

    fn refilter(&mut self) {
        let needle = self.filter.value().to_lowercase();
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| title_matches(&entry.title, &needle))
            .map(|(index, _)| index)
            .collect();
        if self.cursor >= self.visible.len() {
            self.cursor = self.visible.len().saturating_sub(1);
        }
    }

    fn scroll_to_cursor(&mut self) {
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.page_rows {
            self.offset = self.cursor + 1 - self.page_rows;
        }
        let max_offset = self.visible.len().saturating_sub(self.page_rows);
        self.offset = self.offset.min(max_offset);
    }
}

fn title_matches(title: &str, lowered_needle: &str) -> bool {
    lowered_needle.is_empty() || title.to_lowercase().contains(lowered_needle)
}
