//! One backing file per entity type.
//!
//! # File Format
//! ```text
//! [RECORD 1][RECORD 2]...[RECORD N]
//! ```
//! No header, no count, no checksum. Readers stop at end-of-file or at the
//! first record that does not decode, discarding the rest.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use super::codec::{decode_all, Record, RecordWriter};
use super::StorageError;

/// Durable, ordered collection of records of one type.
#[derive(Debug)]
pub struct Collection<T> {
    path: PathBuf,
    sync_on_write: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    /// Binds a collection to its backing file. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>, sync_on_write: bool) -> Self {
        Self {
            path: path.into(),
            sync_on_write,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every complete record in file order.
    ///
    /// A missing file is an empty collection. A partial or corrupt tail is
    /// dropped with a warning, not reported as an error.
    pub fn load_all(&self) -> Result<Vec<T>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        let (records, consumed) = decode_all::<T>(&bytes);
        if consumed < bytes.len() {
            warn!(
                path = %self.path.display(),
                kept = records.len(),
                dropped_bytes = bytes.len() - consumed,
                "discarding malformed tail of collection file"
            );
        }
        Ok(records)
    }

    /// Appends exactly one record and flushes it.
    pub fn append_one(&self, record: &T) -> Result<(), StorageError> {
        let result = self.write_appended(record);

        match result {
            Ok(()) => {
                debug!(path = %self.path.display(), "appended record");
                Ok(())
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "could not open collection for append");
                Err(self.io_err(e))
            }
        }
    }

    /// Replaces the file contents with `records`, in order.
    ///
    /// Records are variable-length, so any update to an existing record goes
    /// through a full rewrite. The new contents are written to a sibling
    /// temporary file and renamed over the original.
    pub fn rewrite_all(&self, records: &[T]) -> Result<(), StorageError> {
        let temp_path = self.temp_path();

        let result = self.write_replacement(&temp_path, records);

        match result {
            Ok(()) => {
                debug!(path = %self.path.display(), records = records.len(), "rewrote collection");
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                error!(path = %self.path.display(), error = %e, "could not rewrite collection");
                Err(self.io_err(e))
            }
        }
    }

    fn write_appended(&self, record: &T) -> std::io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&record.to_bytes())?;
        writer.flush()?;
        if self.sync_on_write {
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    fn write_replacement(&self, temp_path: &Path, records: &[T]) -> std::io::Result<()> {
        let mut out = RecordWriter::new();
        for record in records {
            record.encode(&mut out);
        }

        let mut writer = BufWriter::new(File::create(temp_path)?);
        writer.write_all(&out.into_inner())?;
        writer.flush()?;
        if self.sync_on_write {
            writer.get_ref().sync_all()?;
        }
        drop(writer);

        fs::rename(temp_path, &self.path)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{BuildingId, RoomId};
    use crate::venue::Room;
    use tempfile::tempdir;

    fn room(id: u64, name: &str) -> Room {
        Room {
            id: RoomId::new(id),
            name: name.to_string(),
            building_id: BuildingId::new(6001),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let rooms: Collection<Room> = Collection::new(dir.path().join("rooms.dat"), false);
        assert!(rooms.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let dir = tempdir().unwrap();
        let rooms = Collection::new(dir.path().join("rooms.dat"), false);

        rooms.append_one(&room(3001, "G-101")).unwrap();
        assert_eq!(rooms.load_all().unwrap(), vec![room(3001, "G-101")]);

        rooms.append_one(&room(3002, "G-102")).unwrap();
        assert_eq!(
            rooms.load_all().unwrap(),
            vec![room(3001, "G-101"), room(3002, "G-102")]
        );
    }

    #[test]
    fn test_rewrite_replaces_contents() {
        let dir = tempdir().unwrap();
        let rooms = Collection::new(dir.path().join("rooms.dat"), true);
        rooms.append_one(&room(3001, "old")).unwrap();

        let replacement = vec![room(3001, "renamed"), room(3002, "B-2")];
        rooms.rewrite_all(&replacement).unwrap();
        assert_eq!(rooms.load_all().unwrap(), replacement);
        assert!(!rooms.temp_path().exists());

        rooms.rewrite_all(&[]).unwrap();
        assert!(rooms.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_partial_tail_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rooms.dat");
        let rooms = Collection::new(&path, false);
        rooms.append_one(&room(3001, "G-101")).unwrap();
        rooms.append_one(&room(3002, "G-102")).unwrap();

        let len = fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 4).unwrap();

        assert_eq!(rooms.load_all().unwrap(), vec![room(3001, "G-101")]);
    }

    #[test]
    fn test_append_fails_when_directory_missing() {
        let dir = tempdir().unwrap();
        let rooms = Collection::new(dir.path().join("missing").join("rooms.dat"), false);
        let err = rooms.append_one(&room(3001, "G-101")).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert!(err.to_string().contains("rooms.dat"));
    }
}
