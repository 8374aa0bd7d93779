// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use log::{debug, info, warn};

use crate::{
    FormField, FormKind, FormOutcome, FormState, KeyInput, ListPanel, NoteId, NoteStore,
    PanelEvent, Section,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Form(FormState),
}

impl AppMode {
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Nav => ModeKind::Nav,
            Self::Form(_) => ModeKind::Form,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Nav,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub focus: Section,
    pub status_line: Option<String>,
    panels: [ListPanel; 3],
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            focus: Section::DoNow,
            status_line: None,
            panels: Section::ALL.map(ListPanel::new),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    FocusNext,
    FocusPrev,
    OpenCreateForm,
    OpenEditForm,
    DeleteSelected,
    Quit,
    SubmitOrAdvance,
    CancelForm,
    Reload,
    ClearStatus,
}

impl AppCommand {
    /// Single-key shortcuts frozen while any panel is filtering.
    pub const fn is_shortcut(self) -> bool {
        matches!(
            self,
            Self::FocusNext
                | Self::FocusPrev
                | Self::OpenCreateForm
                | Self::OpenEditForm
                | Self::DeleteSelected
                | Self::Quit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    FocusChanged(Section),
    ModeChanged(ModeKind),
    FormFieldChanged(FormField),
    FormEdited,
    NoteSaved(NoteId),
    NoteDeleted(NoteId),
    PanelsReloaded,
    Panel(Section, PanelEvent),
    StatusUpdated(String),
    StatusCleared,
    QuitRequested,
}

impl AppState {
    pub fn panel(&self, section: Section) -> &ListPanel {
        &self.panels[section.index()]
    }

    pub fn panel_mut(&mut self, section: Section) -> &mut ListPanel {
        &mut self.panels[section.index()]
    }

    pub fn focused_panel(&self) -> &ListPanel {
        self.panel(self.focus)
    }

    pub fn form(&self) -> Option<&FormState> {
        match &self.mode {
            AppMode::Form(form) => Some(form),
            AppMode::Nav => None,
        }
    }

    pub fn any_filtering(&self) -> bool {
        self.panels.iter().any(ListPanel::is_filtering)
    }

    pub fn command_for_key(&self, key: KeyInput) -> Option<AppCommand> {
        match &self.mode {
            AppMode::Nav => {
                if self.any_filtering() {
                    return None;
                }
                match key {
                    KeyInput::Char('l') => Some(AppCommand::FocusNext),
                    KeyInput::Char('h') => Some(AppCommand::FocusPrev),
                    KeyInput::Char('a') => Some(AppCommand::OpenCreateForm),
                    KeyInput::Char('u') => Some(AppCommand::OpenEditForm),
                    KeyInput::Char('d') => Some(AppCommand::DeleteSelected),
                    KeyInput::Char('q') | KeyInput::Ctrl('c') => Some(AppCommand::Quit),
                    _ => None,
                }
            }
            AppMode::Form(_) => match key {
                KeyInput::Enter => Some(AppCommand::SubmitOrAdvance),
                KeyInput::Esc => Some(AppCommand::CancelForm),
                _ => None,
            },
        }
    }

    /// Routes one key: shortcut commands first, then the focused panel or the open form.
    pub fn handle_key<S: NoteStore + ?Sized>(
        &mut self,
        store: &mut S,
        key: KeyInput,
    ) -> Vec<AppEvent> {
        let mut events = Vec::new();
        if self.status_line.is_some() {
            events.extend(self.dispatch(store, AppCommand::ClearStatus));
        }

        if let Some(command) = self.command_for_key(key) {
            events.extend(self.dispatch(store, command));
            return events;
        }

        match &mut self.mode {
            AppMode::Nav => {
                let focus = self.focus;
                let event = self.panels[focus.index()].handle_key(key);
                if event != PanelEvent::Ignored {
                    events.push(AppEvent::Panel(focus, event));
                }
            }
            AppMode::Form(form) => {
                let field = form.active();
                if form.handle_key(key) {
                    events.push(AppEvent::FormEdited);
                } else if form.active() != field {
                    events.push(AppEvent::FormFieldChanged(form.active()));
                }
            }
        }
        events
    }

    pub fn dispatch<S: NoteStore + ?Sized>(
        &mut self,
        store: &mut S,
        command: AppCommand,
    ) -> Vec<AppEvent> {
        if command.is_shortcut() && (self.mode != AppMode::Nav || self.any_filtering()) {
            debug!(
                "event=command_suppressed module=state status=ignored command={command:?} mode={:?}",
                self.mode.kind()
            );
            return Vec::new();
        }

        match command {
            AppCommand::FocusNext => self.move_focus(self.focus.next()),
            AppCommand::FocusPrev => self.move_focus(self.focus.prev()),
            AppCommand::OpenCreateForm => self.open_form(FormState::open_create()),
            AppCommand::OpenEditForm => {
                let focus = self.focus;
                let form = self
                    .focused_panel()
                    .selected_entry()
                    .map(|entry| FormState::open_edit(entry, focus));
                match form {
                    Some(form) => self.open_form(form),
                    None => Vec::new(),
                }
            }
            AppCommand::DeleteSelected => self.delete_selected(store),
            AppCommand::Quit => vec![AppEvent::QuitRequested],
            AppCommand::SubmitOrAdvance => self.submit_or_advance(store),
            AppCommand::CancelForm => {
                if self.mode == AppMode::Nav {
                    return Vec::new();
                }
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(ModeKind::Nav)]
            }
            AppCommand::Reload => {
                self.reload_panels(store);
                vec![AppEvent::PanelsReloaded]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    /// Re-fetches every section. Runs after each mutation.
    pub fn reload_panels<S: NoteStore + ?Sized>(&mut self, store: &mut S) {
        for section in Section::ALL {
            let entries = store.fetch_by_section(section);
            self.panels[section.index()].set_entries(entries);
        }
        debug!(
            "event=panels_reloaded module=state status=ok sizes={:?}",
            self.panels
                .iter()
                .map(|panel| panel.entries().len())
                .collect::<Vec<_>>()
        );
    }

    pub fn resize_panels(&mut self, rows: usize) {
        for panel in &mut self.panels {
            panel.set_page_rows(rows);
        }
    }

    fn move_focus(&mut self, section: Section) -> Vec<AppEvent> {
        self.focus = section;
        vec![AppEvent::FocusChanged(section)]
    }

    fn open_form(&mut self, form: FormState) -> Vec<AppEvent> {
        self.mode = AppMode::Form(form);
        vec![AppEvent::ModeChanged(ModeKind::Form)]
    }

    fn delete_selected<S: NoteStore + ?Sized>(&mut self, store: &mut S) -> Vec<AppEvent> {
        let Some(entry) = self.focused_panel().selected_entry().cloned() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        match store.delete(entry.id) {
            Ok(()) => {
                info!(
                    "event=note_deleted module=state status=ok id={} section={}",
                    entry.id,
                    self.focus.as_str()
                );
                events.push(AppEvent::NoteDeleted(entry.id));
                events.push(self.set_status(format!("deleted {:?}", entry.title)));
            }
            Err(error) => {
                warn!(
                    "event=note_deleted module=state status=failed id={} error={error}",
                    entry.id
                );
                events.push(self.set_status(format!("delete failed: {error}")));
            }
        }
        self.reload_panels(store);
        events.push(AppEvent::PanelsReloaded);
        events
    }

    fn submit_or_advance<S: NoteStore + ?Sized>(&mut self, store: &mut S) -> Vec<AppEvent> {
        let AppMode::Form(form) = &mut self.mode else {
            return Vec::new();
        };
        let editing = matches!(form.kind(), FormKind::Edit(_));

        match form.submit_or_advance(store) {
            FormOutcome::Advanced(field) => vec![AppEvent::FormFieldChanged(field)],
            FormOutcome::Incomplete => Vec::new(),
            FormOutcome::InvalidSection(value) => {
                debug!("event=form_rejected module=state status=invalid_section value={value:?}");
                vec![self.set_status(format!("unknown section {value:?} -- use A, B, or C"))]
            }
            FormOutcome::Committed(id) => {
                let action = if editing { "updated" } else { "created" };
                info!("event=note_{action} module=state status=ok id={id}");
                self.mode = AppMode::Nav;
                self.reload_panels(store);
                vec![
                    AppEvent::NoteSaved(id),
                    AppEvent::ModeChanged(ModeKind::Nav),
                    AppEvent::PanelsReloaded,
                    self.set_status(format!("note {action}")),
                ]
            }
            FormOutcome::Rejected(error) => {
                warn!("event=note_saved module=state status=rejected error={error}");
                vec![self.set_status(error.to_string())]
            }
        }
    }

    fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState, ModeKind};
    use crate::{
        FormField, KeyInput, ListEntry, NoteDraft, NoteId, NoteRef, NoteStore, PanelEvent,
        Section, StoreError, StoreResult,
    };
    use std::collections::BTreeMap;

    #[derive(Debug, Default)]
    struct MapStore {
        next_id: i64,
        notes: BTreeMap<NoteId, NoteDraft>,
        deletes: usize,
    }

    impl MapStore {
        fn with(notes: &[(&str, &str, Section)]) -> Self {
            let mut store = Self::default();
            for (title, body, section) in notes {
                let _ = store.create(&NoteDraft::new(*title, *body, *section));
            }
            store
        }

        fn titles(&self) -> Vec<String> {
            self.notes.values().map(|note| note.title.clone()).collect()
        }
    }

    impl NoteStore for MapStore {
        fn fetch_by_section(&mut self, section: Section) -> Vec<ListEntry> {
            self.notes
                .iter()
                .filter(|(_, note)| note.section == section)
                .map(|(id, note)| ListEntry {
                    id: *id,
                    title: note.title.clone(),
                    description: note.body.clone(),
                })
                .collect()
        }

        fn create(&mut self, draft: &NoteDraft) -> StoreResult<NoteId> {
            if self.notes.values().any(|note| note.title == draft.title) {
                return Err(StoreError::DuplicateTitle(draft.title.clone()));
            }
            self.next_id += 1;
            let id = NoteId::new(self.next_id);
            self.notes.insert(id, draft.clone());
            Ok(id)
        }

        fn update(&mut self, id: NoteId, draft: &NoteDraft) -> StoreResult<()> {
            if self
                .notes
                .iter()
                .any(|(other, note)| *other != id && note.title == draft.title)
            {
                return Err(StoreError::DuplicateTitle(draft.title.clone()));
            }
            match self.notes.get_mut(&id) {
                Some(note) => {
                    *note = draft.clone();
                    Ok(())
                }
                None => Err(StoreError::NotFound(NoteRef::Id(id))),
            }
        }

        fn delete(&mut self, id: NoteId) -> StoreResult<()> {
            self.deletes += 1;
            self.notes.remove(&id);
            Ok(())
        }
    }

    fn press(state: &mut AppState, store: &mut MapStore, keys: &[KeyInput]) -> Vec<AppEvent> {
        keys.iter()
            .flat_map(|key| state.handle_key(store, *key))
            .collect()
    }

    fn type_text(state: &mut AppState, store: &mut MapStore, text: &str) {
        for ch in text.chars() {
            state.handle_key(store, KeyInput::Char(ch));
        }
    }

    fn loaded(store: &mut MapStore) -> AppState {
        let mut state = AppState::default();
        state.reload_panels(store);
        state
    }

    fn panel_titles(state: &AppState, section: Section) -> Vec<String> {
        state
            .panel(section)
            .visible_entries()
            .map(|entry| entry.title.clone())
            .collect()
    }

    #[test]
    fn starts_in_nav_focused_on_do_now() {
        let state = AppState::default();
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.focus, Section::DoNow);
    }

    #[test]
    fn focus_keys_cycle_three_ways() {
        let mut store = MapStore::default();
        let mut state = loaded(&mut store);

        let events = press(&mut state, &mut store, &[KeyInput::Char('l')]);
        assert_eq!(events, vec![AppEvent::FocusChanged(Section::Schedule)]);
        press(&mut state, &mut store, &[KeyInput::Char('l')]);
        assert_eq!(state.focus, Section::Delegate);
        press(&mut state, &mut store, &[KeyInput::Char('l')]);
        assert_eq!(state.focus, Section::DoNow);

        press(&mut state, &mut store, &[KeyInput::Char('h')]);
        assert_eq!(state.focus, Section::Delegate);
    }

    #[test]
    fn add_flow_commits_from_last_field_and_reloads() {
        let mut store = MapStore::default();
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('a')]);
        assert!(matches!(state.mode, AppMode::Form(_)));
        type_text(&mut state, &mut store, "Read");
        press(&mut state, &mut store, &[KeyInput::Enter]);
        type_text(&mut state, &mut store, "Book");
        press(&mut state, &mut store, &[KeyInput::Enter]);
        type_text(&mut state, &mut store, "A");
        let events = press(&mut state, &mut store, &[KeyInput::Enter]);

        assert_eq!(state.mode, AppMode::Nav);
        assert!(events.contains(&AppEvent::NoteSaved(NoteId::new(1))));
        assert!(events.contains(&AppEvent::PanelsReloaded));
        assert_eq!(panel_titles(&state, Section::DoNow), vec!["Read"]);
        assert_eq!(
            state.panel(Section::DoNow).selected_entry().map(|entry| entry.description.as_str()),
            Some("Book")
        );
    }

    #[test]
    fn blank_field_keeps_form_open_without_writes() {
        let mut store = MapStore::default();
        let mut state = loaded(&mut store);

        press(
            &mut state,
            &mut store,
            &[KeyInput::Char('a'), KeyInput::Enter, KeyInput::Enter],
        );
        let events = press(&mut state, &mut store, &[KeyInput::Enter]);
        assert!(events.is_empty());
        assert!(matches!(state.mode, AppMode::Form(_)));
        assert!(store.notes.is_empty());
        assert!(state.status_line.is_none());
    }

    #[test]
    fn cancel_discards_edits() {
        let mut store = MapStore::default();
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('a')]);
        type_text(&mut state, &mut store, "Draft");
        let events = press(&mut state, &mut store, &[KeyInput::Esc]);
        assert_eq!(events, vec![AppEvent::ModeChanged(ModeKind::Nav)]);
        assert!(store.notes.is_empty());

        press(&mut state, &mut store, &[KeyInput::Char('a')]);
        assert_eq!(
            state.form().map(|form| form.value(FormField::Title)),
            Some("")
        );
    }

    #[test]
    fn update_edits_selected_note_by_id() {
        let mut store = MapStore::with(&[("Read", "Book", Section::DoNow)]);
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('u')]);
        let form = state.form().map(|form| {
            (
                form.value(FormField::Title).to_owned(),
                form.value(FormField::Section).to_owned(),
            )
        });
        assert_eq!(form, Some(("Read".to_owned(), "A".to_owned())));

        type_text(&mut state, &mut store, "ing");
        press(&mut state, &mut store, &[KeyInput::Enter]);
        press(&mut state, &mut store, &[KeyInput::Ctrl('u')]);
        type_text(&mut state, &mut store, "Book v2");
        press(&mut state, &mut store, &[KeyInput::Enter, KeyInput::Enter]);

        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(store.titles(), vec!["Reading"]);
        assert_eq!(panel_titles(&state, Section::DoNow), vec!["Reading"]);
        assert_eq!(
            state.panel(Section::DoNow).selected_entry().map(|entry| entry.description.as_str()),
            Some("Book v2")
        );
    }

    #[test]
    fn update_can_move_a_note_to_another_section() {
        let mut store = MapStore::with(&[("Read", "Book", Section::DoNow)]);
        let mut state = loaded(&mut store);

        press(
            &mut state,
            &mut store,
            &[KeyInput::Char('u'), KeyInput::Enter, KeyInput::Enter],
        );
        press(
            &mut state,
            &mut store,
            &[KeyInput::Backspace, KeyInput::Char('c'), KeyInput::Enter],
        );

        assert!(panel_titles(&state, Section::DoNow).is_empty());
        assert_eq!(panel_titles(&state, Section::Delegate), vec!["Read"]);
    }

    #[test]
    fn update_and_delete_need_a_selection() {
        let mut store = MapStore::default();
        let mut state = loaded(&mut store);

        assert!(press(&mut state, &mut store, &[KeyInput::Char('u')]).is_empty());
        assert_eq!(state.mode, AppMode::Nav);
        assert!(press(&mut state, &mut store, &[KeyInput::Char('d')]).is_empty());
        assert_eq!(store.deletes, 0);
    }

    #[test]
    fn delete_removes_focused_selection_and_reloads() {
        let mut store = MapStore::with(&[
            ("Linux", "kernel", Section::DoNow),
            ("Neovim", "editor", Section::Schedule),
        ]);
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('l')]);
        let events = press(&mut state, &mut store, &[KeyInput::Char('d')]);

        assert!(events.contains(&AppEvent::NoteDeleted(NoteId::new(2))));
        assert!(events.contains(&AppEvent::PanelsReloaded));
        assert_eq!(store.titles(), vec!["Linux"]);
        assert!(panel_titles(&state, Section::Schedule).is_empty());
        assert_eq!(panel_titles(&state, Section::DoNow), vec!["Linux"]);
    }

    #[test]
    fn duplicate_title_keeps_form_populated() {
        let mut store = MapStore::with(&[("X", "first", Section::DoNow)]);
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('a')]);
        type_text(&mut state, &mut store, "X");
        press(&mut state, &mut store, &[KeyInput::Enter]);
        type_text(&mut state, &mut store, "second");
        press(&mut state, &mut store, &[KeyInput::Enter]);
        type_text(&mut state, &mut store, "B");
        press(&mut state, &mut store, &[KeyInput::Enter]);

        assert_eq!(store.notes.len(), 1);
        assert_eq!(
            state.form().map(|form| form.value(FormField::Title)),
            Some("X")
        );
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("already exists"))
        );
    }

    #[test]
    fn filtering_in_any_panel_freezes_shortcuts() {
        let mut store = MapStore::with(&[("Git", "vcs", Section::DoNow)]);
        let mut state = loaded(&mut store);
        state.panel_mut(Section::Schedule).set_filter("");

        let keys = [
            KeyInput::Char('a'),
            KeyInput::Char('u'),
            KeyInput::Char('d'),
            KeyInput::Char('l'),
            KeyInput::Char('h'),
            KeyInput::Char('q'),
            KeyInput::Ctrl('c'),
        ];
        let events = press(&mut state, &mut store, &keys);

        assert!(!events.contains(&AppEvent::QuitRequested));
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(state.focus, Section::DoNow);
        assert_eq!(store.deletes, 0);
        assert_eq!(store.titles(), vec!["Git"]);

        for command in [
            AppCommand::OpenCreateForm,
            AppCommand::DeleteSelected,
            AppCommand::FocusNext,
            AppCommand::Quit,
        ] {
            assert!(state.dispatch(&mut store, command).is_empty());
        }
    }

    #[test]
    fn focused_panel_filter_captures_shortcut_letters() {
        let mut store = MapStore::with(&[
            ("Docker", "containers", Section::DoNow),
            ("Git", "vcs", Section::DoNow),
        ]);
        let mut state = loaded(&mut store);

        let events = press(&mut state, &mut store, &[KeyInput::Char('/')]);
        assert_eq!(
            events,
            vec![AppEvent::Panel(Section::DoNow, PanelEvent::FilterStarted)]
        );
        press(&mut state, &mut store, &[KeyInput::Char('d')]);
        assert_eq!(state.focused_panel().filter_text(), "d");
        assert_eq!(panel_titles(&state, Section::DoNow), vec!["Docker"]);
        assert_eq!(store.deletes, 0);

        press(&mut state, &mut store, &[KeyInput::Enter]);
        let events = press(&mut state, &mut store, &[KeyInput::Char('q')]);
        assert_eq!(events, vec![AppEvent::QuitRequested]);
    }

    #[test]
    fn status_clears_on_next_key() {
        let mut store = MapStore::with(&[("Read", "Book", Section::DoNow)]);
        let mut state = loaded(&mut store);

        press(&mut state, &mut store, &[KeyInput::Char('d')]);
        assert!(state.status_line.is_some());
        let events = press(&mut state, &mut store, &[KeyInput::Char('j')]);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
        assert!(state.status_line.is_none());
    }
}
