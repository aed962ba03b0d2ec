//! Durable storage for labdesk collections.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Repository                   │
//! ├──────────────────────────────────────────────┤
//! │  Table<Person>  Table<Room>  Table<...>      │  in-memory rows
//! │        │             │            │          │
//! │  Collection<T>: load_all / append_one /      │  one file per type
//! │                 rewrite_all                  │
//! │        │                                     │
//! │  codec: u64 LE words, length-prefixed text   │
//! │                                              │
//! │  DirLock (.lock holding the owner's pid)     │
//! └──────────────────────────────────────────────┘
//! ```

mod codec;
mod collection;
mod file_lock;
mod records;
pub(crate) mod table;

use std::path::PathBuf;

use thiserror::Error;

pub use codec::{decode_all, DecodeError, Record, RecordReader, RecordWriter, WORD};
pub use collection::Collection;
pub use file_lock::{DirLock, LOCK_FILE};

/// Backing file for people.
pub const PERSONS_FILE: &str = "persons.dat";
/// Backing file for buildings.
pub const BUILDINGS_FILE: &str = "buildings.dat";
/// Backing file for rooms.
pub const ROOMS_FILE: &str = "rooms.dat";
/// Backing file for lab sections.
pub const LABS_FILE: &str = "labs.dat";
/// Backing file for schedule entries.
pub const SCHEDULES_FILE: &str = "schedules.dat";
/// Backing file for makeup requests.
pub const MAKEUP_FILE: &str = "makeup_requests.dat";

/// Errors raised while reading or writing backing files.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A backing file could not be read, opened, written or renamed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data directory could not be created or locked.
    #[error("cannot lock data directory {}: {source}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process already has the data directory open.
    #[error(
        "data directory {} is in use by {}",
        .path.display(),
        .holder.map_or_else(|| "another process".to_string(), |pid| format!("process {pid}"))
    )]
    Busy { path: PathBuf, holder: Option<u32> },
}
