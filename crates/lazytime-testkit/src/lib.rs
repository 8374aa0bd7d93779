// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use lazytime_app::{
    ListEntry, Note, NoteDraft, NoteId, NoteRef, NoteStore, Section, StoreError, StoreResult,
};
use std::collections::BTreeMap;
use std::path::PathBuf;

const SAMPLE_NOTES: [(&str, &str, Section); 9] = [
    ("Linux", "Linux is a family of open-source Unix-like OS", Section::DoNow),
    ("Go", "Go is a statically typed, compiled language", Section::DoNow),
    ("Rust", "Rust is a multi-paradigm, general-purpose language", Section::DoNow),
    ("Neovim", "Neovim is a refactor of Vim", Section::Schedule),
    ("Emacs", "Emacs is an extensible, customizable text editor", Section::Schedule),
    ("VS Code", "VS Code is a source-code editor", Section::Schedule),
    ("Git", "Git is a distributed version-control system", Section::Delegate),
    ("Docker", "Docker is a set of platform as a service products", Section::Delegate),
    ("Kubernetes", "Kubernetes is a container orchestration system", Section::Delegate),
];

const VERBS: [&str; 10] = [
    "Read", "Write", "Call", "Fix", "Plan", "Review", "Ship", "Book", "Email", "Clean",
];
const OBJECTS: [&str; 8] = [
    "report", "garage", "dentist", "budget", "slides", "invoice", "garden", "backlog",
];
const DETAILS: [&str; 8] = [
    "before lunch",
    "this week",
    "ask for help",
    "low effort",
    "needs a call",
    "after standup",
    "by Friday",
    "when blocked",
];

/// Canonical demo notes, three per section.
pub fn sample_notes() -> Vec<NoteDraft> {
    SAMPLE_NOTES
        .iter()
        .map(|(title, body, section)| NoteDraft::new(*title, *body, *section))
        .collect()
}

pub fn seed_store<S: NoteStore + ?Sized>(store: &mut S, drafts: &[NoteDraft]) -> Result<Vec<NoteId>> {
    drafts
        .iter()
        .map(|draft| {
            store
                .create(draft)
                .with_context(|| format!("seed note {:?}", draft.title))
        })
        .collect()
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("lists.db");
    Ok((dir, db_path))
}

/// In-process `NoteStore` with the same uniqueness rules as the SQLite store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    notes: BTreeMap<NoteId, Note>,
    next_id: i64,
    fail_fetch: bool,
    fetch_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(drafts: &[NoteDraft]) -> Result<Self> {
        let mut store = Self::new();
        seed_store(&mut store, drafts)?;
        Ok(store)
    }

    /// Makes every fetch behave like a failed query.
    pub fn set_fail_fetch(&mut self, fail: bool) {
        self.fail_fetch = fail;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes_in(&self, section: Section) -> Vec<Note> {
        self.notes
            .values()
            .filter(|note| note.section == section)
            .cloned()
            .collect()
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Note> {
        self.notes.values().find(|note| note.title == title)
    }

    fn title_taken(&self, title: &str, except: Option<NoteId>) -> bool {
        self.notes
            .values()
            .any(|note| note.title == title && Some(note.id) != except)
    }
}

impl NoteStore for MemoryStore {
    fn fetch_by_section(&mut self, section: Section) -> Vec<ListEntry> {
        self.fetch_count += 1;
        if self.fail_fetch {
            return Vec::new();
        }
        self.notes_in(section).iter().map(Note::to_entry).collect()
    }

    fn create(&mut self, draft: &NoteDraft) -> StoreResult<NoteId> {
        if self.title_taken(&draft.title, None) {
            return Err(StoreError::DuplicateTitle(draft.title.clone()));
        }
        self.next_id += 1;
        let id = NoteId::new(self.next_id);
        self.notes.insert(
            id,
            Note {
                id,
                title: draft.title.clone(),
                body: draft.body.clone(),
                section: draft.section,
            },
        );
        Ok(id)
    }

    fn update(&mut self, id: NoteId, draft: &NoteDraft) -> StoreResult<()> {
        if !self.notes.contains_key(&id) {
            return Err(StoreError::NotFound(NoteRef::Id(id)));
        }
        if self.title_taken(&draft.title, Some(id)) {
            return Err(StoreError::DuplicateTitle(draft.title.clone()));
        }
        if let Some(note) = self.notes.get_mut(&id) {
            note.title = draft.title.clone();
            note.body = draft.body.clone();
            note.section = draft.section;
        }
        Ok(())
    }

    fn delete(&mut self, id: NoteId) -> StoreResult<()> {
        self.notes.remove(&id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteOp {
    Create(NoteDraft),
    Update(NoteId, NoteDraft),
    Delete(NoteId),
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for notes and mutation sequences. Titles come from a small pool so
/// duplicates show up regularly.
#[derive(Debug, Clone)]
pub struct NoteFaker {
    rng: DeterministicRng,
}

impl NoteFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn title(&mut self) -> String {
        let verb = self.pick(&VERBS);
        let object = self.pick(&OBJECTS);
        format!("{verb} {object}")
    }

    pub fn body(&mut self) -> String {
        self.pick(&DETAILS).to_owned()
    }

    pub fn section(&mut self) -> Section {
        self.pick(&Section::ALL)
    }

    pub fn draft(&mut self) -> NoteDraft {
        NoteDraft {
            title: self.title(),
            body: self.body(),
            section: self.section(),
        }
    }

    /// Picks a mutation. Ids outside `existing` are produced now and then to cover
    /// missing-row paths.
    pub fn operation(&mut self, existing: &[NoteId]) -> NoteOp {
        let target = if existing.is_empty() || self.int_n(8) == 0 {
            NoteId::new(10_000 + self.int_n(100) as i64)
        } else {
            existing[self.int_n(existing.len())]
        };

        match self.int_n(5) {
            0 | 1 => NoteOp::Create(self.draft()),
            2 | 3 => NoteOp::Update(target, self.draft()),
            _ => NoteOp::Delete(target),
        }
    }

    fn pick<T: Copy>(&mut self, values: &[T]) -> T {
        values[self.rng.int_n(values.len())]
    }
}
