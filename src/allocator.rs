//! Per-type identifier counters.
//!
//! Each entity type counts up from its own base so identifiers never collide
//! across types. Loading observes every stored id, and allocation always
//! returns one more than the largest value seen or handed out.

use std::fmt;

use crate::error::RuleViolation;

/// The entity types that receive identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Person,
    Section,
    Room,
    Schedule,
    Makeup,
    Building,
    Course,
}

impl IdKind {
    pub const ALL: [Self; 7] = [
        Self::Person,
        Self::Section,
        Self::Room,
        Self::Schedule,
        Self::Makeup,
        Self::Building,
        Self::Course,
    ];

    /// Seed value; the first allocated id is `base() + 1`.
    #[must_use]
    pub const fn base(self) -> u64 {
        match self {
            Self::Person => 1000,
            Self::Section => 2000,
            Self::Room => 3000,
            Self::Schedule => 4000,
            Self::Makeup => 5000,
            Self::Building => 6000,
            Self::Course => 7000,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Person => 0,
            Self::Section => 1,
            Self::Room => 2,
            Self::Schedule => 3,
            Self::Makeup => 4,
            Self::Building => 5,
            Self::Course => 6,
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Person => "person",
            Self::Section => "section",
            Self::Room => "room",
            Self::Schedule => "schedule",
            Self::Makeup => "makeup",
            Self::Building => "building",
            Self::Course => "course",
        })
    }
}

/// Monotonic identifier source owned by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    counters: [u64; 7],
}

impl IdAllocator {
    /// Creates an allocator with every counter at its base.
    #[must_use]
    pub fn new() -> Self {
        let mut counters = [0; 7];
        for kind in IdKind::ALL {
            counters[kind.slot()] = kind.base();
        }
        Self { counters }
    }

    /// Raises the counter for `kind` to at least `id`.
    pub fn observe(&mut self, kind: IdKind, id: u64) {
        let counter = &mut self.counters[kind.slot()];
        *counter = (*counter).max(id);
    }

    /// Returns a fresh identifier strictly greater than any seen before.
    ///
    /// Fails once the counter has reached `u64::MAX`; the counter is left
    /// where it was.
    pub fn allocate(&mut self, kind: IdKind) -> Result<u64, RuleViolation> {
        let counter = &mut self.counters[kind.slot()];
        *counter = counter
            .checked_add(1)
            .ok_or(RuleViolation::IdSpaceExhausted { kind })?;
        Ok(*counter)
    }

    /// Largest identifier observed or allocated for `kind` (or its base).
    #[must_use]
    pub fn current(&self, kind: IdKind) -> u64 {
        self.counters[kind.slot()]
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
