// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{KeyInput, ListEntry, NoteDraft, NoteId, NoteStore, Section, StoreError, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Section,
}

impl FormField {
    pub const ALL: [Self; 3] = [Self::Title, Self::Description, Self::Section];

    pub const fn index(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Description => 1,
            Self::Section => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Section => "Section",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::Section => "A, B, or C",
        }
    }

    pub fn is_last(self) -> bool {
        self.index() + 1 == Self::ALL.len()
    }

    fn step(self, delta: isize) -> Self {
        let last = Self::ALL.len() as isize - 1;
        let next = (self.index() as isize + delta).clamp(0, last) as usize;
        Self::ALL[next]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub id: NoteId,
    pub previous_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Edit(EditTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Advanced(FormField),
    /// A field was blank; nothing was written.
    Incomplete,
    InvalidSection(String),
    Committed(NoteId),
    Rejected(StoreError),
}

/// Field values and focus of the add/edit overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    inputs: [TextInput; 3],
    active: FormField,
    kind: FormKind,
    error: Option<String>,
}

impl FormState {
    pub fn open_create() -> Self {
        Self {
            inputs: Default::default(),
            active: FormField::Title,
            kind: FormKind::Create,
            error: None,
        }
    }

    pub fn open_edit(entry: &ListEntry, section: Section) -> Self {
        let mut form = Self {
            inputs: Default::default(),
            active: FormField::Title,
            kind: FormKind::Edit(EditTarget {
                id: entry.id,
                previous_title: entry.title.clone(),
            }),
            error: None,
        };
        form.input_mut(FormField::Title).set_value(&entry.title);
        form.input_mut(FormField::Description)
            .set_value(&entry.description);
        form.input_mut(FormField::Section)
            .set_value(section.as_str());
        form
    }

    pub fn kind(&self) -> &FormKind {
        &self.kind
    }

    pub fn active(&self) -> FormField {
        self.active
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input(&self, field: FormField) -> &TextInput {
        &self.inputs[field.index()]
    }

    pub fn value(&self, field: FormField) -> &str {
        self.input(field).value()
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Create => "Add note",
            FormKind::Edit(_) => "Update note",
        }
    }

    /// Moves to the next field. Never commits.
    pub fn advance(&mut self) -> bool {
        if self.active.is_last() {
            return false;
        }
        self.active = self.active.step(1);
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.active == FormField::Title {
            return false;
        }
        self.active = self.active.step(-1);
        true
    }

    /// Confirm key. Advances until the last field, then validates and writes.
    pub fn submit_or_advance<S: NoteStore + ?Sized>(&mut self, store: &mut S) -> FormOutcome {
        if self.advance() {
            return FormOutcome::Advanced(self.active);
        }

        let draft = match self.draft() {
            Ok(draft) => draft,
            Err(outcome) => return outcome,
        };

        let result = match &self.kind {
            FormKind::Create => store.create(&draft),
            FormKind::Edit(target) => store.update(target.id, &draft).map(|()| target.id),
        };
        match result {
            Ok(id) => {
                self.reset();
                FormOutcome::Committed(id)
            }
            Err(error) => {
                self.error = Some(error.to_string());
                FormOutcome::Rejected(error)
            }
        }
    }

    /// Field editing and tab movement. Returns true when a value changed.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Tab | KeyInput::Down => {
                self.advance();
                false
            }
            KeyInput::BackTab | KeyInput::Up => {
                self.retreat();
                false
            }
            other => {
                let changed = self.input_mut(self.active).handle_key(other);
                if changed {
                    self.error = None;
                }
                changed
            }
        }
    }

    pub fn reset(&mut self) {
        for input in &mut self.inputs {
            input.clear();
        }
        self.active = FormField::Title;
        self.error = None;
    }

    fn draft(&mut self) -> Result<NoteDraft, FormOutcome> {
        let title = self.value(FormField::Title);
        let body = self.value(FormField::Description);
        if FormField::ALL
            .iter()
            .any(|field| self.value(*field).is_empty())
        {
            return Err(FormOutcome::Incomplete);
        }
        let section_raw = self.value(FormField::Section).trim();

        let Some(section) = Section::parse(section_raw) else {
            let message = format!("unknown section {section_raw:?} -- use A, B, or C");
            let outcome = FormOutcome::InvalidSection(section_raw.to_owned());
            self.error = Some(message);
            return Err(outcome);
        };
        Ok(NoteDraft::new(title, body, section))
    }

    fn input_mut(&mut self, field: FormField) -> &mut TextInput {
        &mut self.inputs[field.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::{FormField, FormKind, FormOutcome, FormState};
    use crate::{KeyInput, ListEntry, NoteDraft, NoteId, NoteStore, Section, StoreError};

    #[derive(Debug, Default)]
    struct RecordingStore {
        created: Vec<NoteDraft>,
        updated: Vec<(NoteId, NoteDraft)>,
        reject_with: Option<StoreError>,
    }

    impl NoteStore for RecordingStore {
        fn fetch_by_section(&mut self, _section: Section) -> Vec<ListEntry> {
            Vec::new()
        }

        fn create(&mut self, draft: &NoteDraft) -> Result<NoteId, StoreError> {
            if let Some(error) = self.reject_with.clone() {
                return Err(error);
            }
            self.created.push(draft.clone());
            Ok(NoteId::new(self.created.len() as i64))
        }

        fn update(&mut self, id: NoteId, draft: &NoteDraft) -> Result<(), StoreError> {
            if let Some(error) = self.reject_with.clone() {
                return Err(error);
            }
            self.updated.push((id, draft.clone()));
            Ok(())
        }

        fn delete(&mut self, _id: NoteId) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn type_text(form: &mut FormState, text: &str) {
        for ch in text.chars() {
            form.handle_key(KeyInput::Char(ch));
        }
    }

    fn filled_create_form(title: &str, body: &str, section: &str) -> FormState {
        let mut form = FormState::open_create();
        type_text(&mut form, title);
        form.advance();
        type_text(&mut form, body);
        form.advance();
        type_text(&mut form, section);
        form
    }

    #[test]
    fn confirm_advances_before_the_last_field() {
        let mut store = RecordingStore::default();
        let mut form = FormState::open_create();
        type_text(&mut form, "Read");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Advanced(FormField::Description)
        );
        type_text(&mut form, "Book");
        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Advanced(FormField::Section)
        );
        assert!(store.created.is_empty());
    }

    #[test]
    fn tab_never_commits_and_backtab_does_not_wrap() {
        let mut store = RecordingStore::default();
        let mut form = FormState::open_create();
        form.handle_key(KeyInput::BackTab);
        assert_eq!(form.active(), FormField::Title);

        form.handle_key(KeyInput::Tab);
        form.handle_key(KeyInput::Tab);
        form.handle_key(KeyInput::Tab);
        assert_eq!(form.active(), FormField::Section);
        assert!(store.created.is_empty());

        let outcome = form.submit_or_advance(&mut store);
        assert_eq!(outcome, FormOutcome::Incomplete);
    }

    #[test]
    fn blank_field_aborts_silently_and_keeps_form() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form("Read", "", "A");

        assert_eq!(form.submit_or_advance(&mut store), FormOutcome::Incomplete);
        assert!(store.created.is_empty());
        assert_eq!(form.value(FormField::Title), "Read");
        assert_eq!(form.active(), FormField::Section);
        assert!(form.error().is_none());
    }

    #[test]
    fn whitespace_only_title_commits_as_typed() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form(" ", "Book", "A");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Committed(NoteId::new(1))
        );
        assert_eq!(
            store.created,
            vec![NoteDraft::new(" ", "Book", Section::DoNow)]
        );
    }

    #[test]
    fn title_and_body_keep_surrounding_spaces() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form(" Read ", "  Book", " b ");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Committed(NoteId::new(1))
        );
        assert_eq!(
            store.created,
            vec![NoteDraft::new(" Read ", "  Book", Section::Schedule)]
        );
    }

    #[test]
    fn whitespace_only_section_is_an_unknown_section() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form("Read", "Book", " ");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::InvalidSection(String::new())
        );
        assert!(store.created.is_empty());
    }

    #[test]
    fn unknown_section_is_reported_inside_the_form() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form("Read", "Book", "Z");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::InvalidSection("Z".to_owned())
        );
        assert!(store.created.is_empty());
        assert!(form.error().is_some_and(|error| error.contains("use A, B, or C")));

        form.handle_key(KeyInput::Backspace);
        assert!(form.error().is_none());
    }

    #[test]
    fn commit_creates_and_resets_fields() {
        let mut store = RecordingStore::default();
        let mut form = filled_create_form("Read", "Book", "a");

        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Committed(NoteId::new(1))
        );
        assert_eq!(
            store.created,
            vec![NoteDraft::new("Read", "Book", Section::DoNow)]
        );
        assert_eq!(form.active(), FormField::Title);
        assert!(form.value(FormField::Title).is_empty());
    }

    #[test]
    fn edit_form_prefills_and_updates_by_id() {
        let mut store = RecordingStore::default();
        let entry = ListEntry {
            id: NoteId::new(9),
            title: "Read".to_owned(),
            description: "Book".to_owned(),
        };
        let mut form = FormState::open_edit(&entry, Section::Delegate);
        assert_eq!(form.value(FormField::Section), "C");
        assert!(matches!(form.kind(), FormKind::Edit(target) if target.previous_title == "Read"));

        type_text(&mut form, "ing");
        form.advance();
        form.advance();
        assert_eq!(
            form.submit_or_advance(&mut store),
            FormOutcome::Committed(NoteId::new(9))
        );
        assert_eq!(
            store.updated,
            vec![(
                NoteId::new(9),
                NoteDraft::new("Reading", "Book", Section::Delegate)
            )]
        );
    }

    #[test]
    fn store_rejection_keeps_values_and_shows_error() {
        let mut store = RecordingStore {
            reject_with: Some(StoreError::DuplicateTitle("Read".to_owned())),
            ..RecordingStore::default()
        };
        let mut form = filled_create_form("Read", "Book", "B");

        let outcome = form.submit_or_advance(&mut store);
        assert!(matches!(outcome, FormOutcome::Rejected(StoreError::DuplicateTitle(_))));
        assert_eq!(form.value(FormField::Title), "Read");
        assert!(form.error().is_some_and(|error| error.contains("already exists")));
    }
}
