// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ListEntry, NoteDraft, NoteId, Section};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteRef {
    Id(NoteId),
    Title(String),
}

impl std::fmt::Display for NoteRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "note {id}"),
            Self::Title(title) => write!(f, "note {title:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    DuplicateTitle(String),
    NotFound(NoteRef),
    Storage(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTitle(title) => {
                write!(f, "title {title:?} already exists -- pick another title")
            }
            Self::NotFound(target) => write!(f, "{target} no longer exists"),
            Self::Storage(message) => write!(f, "storage error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence contract consumed by the state machine.
pub trait NoteStore {
    /// Notes in one section, oldest first. Failures are logged and yield an empty list.
    fn fetch_by_section(&mut self, section: Section) -> Vec<ListEntry>;

    fn create(&mut self, draft: &NoteDraft) -> StoreResult<NoteId>;

    /// Replaces title, body and section of the note with `id`.
    fn update(&mut self, id: NoteId, draft: &NoteDraft) -> StoreResult<()>;

    /// Succeeds even when nothing matches.
    fn delete(&mut self, id: NoteId) -> StoreResult<()>;
}
