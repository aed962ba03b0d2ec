//! In-memory mirror of a collection.

use super::codec::Record;
use super::collection::Collection;
use super::StorageError;

/// The loaded rows of one collection plus the file that backs them.
///
/// Mutations land in memory first and are then persisted. If persisting
/// fails the in-memory rows still hold the change; the caller gets the error.
#[derive(Debug)]
pub(crate) struct Table<T> {
    rows: Vec<T>,
    store: Collection<T>,
}

impl<T: Record> Table<T> {
    /// Loads every durable row from `store`.
    pub(crate) fn load(store: Collection<T>) -> Result<Self, StorageError> {
        let rows = store.load_all()?;
        Ok(Self { rows, store })
    }

    pub(crate) fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Pushes a new row and appends it to the backing file.
    pub(crate) fn insert(&mut self, row: T) -> Result<(), StorageError> {
        self.rows.push(row);
        let last = &self.rows[self.rows.len() - 1];
        self.store.append_one(last)
    }

    pub(crate) fn find_mut(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.rows.iter_mut().find(|row| pred(row))
    }

    /// Rewrites the backing file from the in-memory rows.
    pub(crate) fn persist(&self) -> Result<(), StorageError> {
        self.store.rewrite_all(&self.rows)
    }
}
