// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::NoteId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    DoNow,
    Schedule,
    Delegate,
}

impl Section {
    /// Storage order, which is also the focus cycle: A, B, C.
    pub const ALL: [Self; 3] = [Self::DoNow, Self::Schedule, Self::Delegate];

    /// Left-to-right on screen. B sits rightmost and C in the center.
    pub const COLUMN_ORDER: [Self; 3] = [Self::DoNow, Self::Delegate, Self::Schedule];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DoNow => "A",
            Self::Schedule => "B",
            Self::Delegate => "C",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::DoNow => "Do Now",
            Self::Schedule => "Schedule",
            Self::Delegate => "Delegate",
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::DoNow => 0,
            Self::Schedule => 1,
            Self::Delegate => 2,
        }
    }

    pub fn column(self) -> usize {
        Self::COLUMN_ORDER
            .iter()
            .position(|section| *section == self)
            .unwrap_or(0)
    }

    /// Accepts the storage letter or the display label, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|section| {
            trimmed.eq_ignore_ascii_case(section.as_str())
                || trimmed.eq_ignore_ascii_case(section.label())
        })
    }

    pub fn next(self) -> Self {
        self.rotate(1)
    }

    pub fn prev(self) -> Self {
        self.rotate(-1)
    }

    fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len) as usize;
        Self::ALL[next]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub section: Section,
}

impl Note {
    pub fn to_entry(&self) -> ListEntry {
        ListEntry {
            id: self.id,
            title: self.title.clone(),
            description: self.body.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
    pub section: Section,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, section: Section) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            section,
        }
    }
}

/// Row shown in a list panel. Rebuilt on every reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: NoteId,
    pub title: String,
    pub description: String,
}
