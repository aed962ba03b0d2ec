//! Single-writer guard for a data directory.
//!
//! Collections are rewritten wholesale, so two processes sharing a data
//! directory would lose each other's updates. [`DirLock::acquire`] creates the
//! directory, takes a non-blocking exclusive lock on `<dir>/.lock` and writes
//! the holder's pid into it. A second opener is turned away with
//! [`StorageError::Busy`] naming that pid when it can be read back.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, warn};

use super::StorageError;

/// Name of the lock file inside the data directory.
pub const LOCK_FILE: &str = ".lock";

/// Held for as long as a repository has the directory open.
#[derive(Debug)]
pub struct DirLock {
    file: File,
    dir: PathBuf,
}

impl DirLock {
    /// Creates `dir` if needed and claims it for this process.
    pub fn acquire(dir: &Path) -> Result<Self, StorageError> {
        let locked = |source| StorageError::Locked {
            path: dir.to_path_buf(),
            source,
        };
        fs::create_dir_all(dir).map_err(locked)?;

        let lock_path = dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(locked)?;

        if !try_exclusive(&file).map_err(locked)? {
            let holder = read_holder(&lock_path);
            warn!(dir = %dir.display(), ?holder, "data directory already in use");
            return Err(StorageError::Busy {
                path: dir.to_path_buf(),
                holder,
            });
        }

        record_holder(&mut file).map_err(locked)?;
        debug!(dir = %dir.display(), pid = process::id(), "claimed data directory");
        Ok(Self {
            file,
            dir: dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        // The OS lock goes with the handle; only the stale pid needs clearing.
        let _ = self.file.set_len(0);
    }
}

fn record_holder(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{}", process::id())?;
    file.flush()
}

/// Pid written by the current holder. Windows refuses reads of the locked
/// range, so there it is usually `None`.
fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// `Ok(false)` when another handle already holds the lock.
#[cfg(unix)]
fn try_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor stays owned by `file` for the whole call.
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(windows)]
fn try_exclusive(file: &File) -> io::Result<bool> {
    use std::os::windows::io::AsRawHandle;
    use windows_sys::Win32::Foundation::{ERROR_LOCK_VIOLATION, HANDLE};
    use windows_sys::Win32::Storage::FileSystem::{
        LockFileEx, LOCKFILE_EXCLUSIVE_LOCK, LOCKFILE_FAIL_IMMEDIATELY,
    };
    use windows_sys::Win32::System::IO::OVERLAPPED;

    let handle = file.as_raw_handle() as HANDLE;
    // SAFETY: `overlapped` outlives the synchronous call and the handle is
    // owned by `file`.
    let claimed = unsafe {
        let mut overlapped = std::mem::zeroed::<OVERLAPPED>();
        LockFileEx(
            handle,
            LOCKFILE_EXCLUSIVE_LOCK | LOCKFILE_FAIL_IMMEDIATELY,
            0,
            1,
            0,
            &mut overlapped,
        )
    };
    if claimed != 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(ERROR_LOCK_VIOLATION as i32) {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(any(unix, windows)))]
fn try_exclusive(_file: &File) -> io::Result<bool> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "directory locking is not supported on this platform",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_acquire_creates_directory_and_records_pid() {
        let root = tempdir().unwrap();
        let dir = root.path().join("nested").join("data");

        let lock = DirLock::acquire(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(lock.dir(), dir.as_path());
        assert_eq!(read_holder(&lock.path()), Some(process::id()));
    }

    #[test]
    fn test_release_clears_pid_and_allows_reacquire() {
        let dir = tempdir().unwrap();
        drop(DirLock::acquire(dir.path()).unwrap());

        assert_eq!(fs::read_to_string(dir.path().join(LOCK_FILE)).unwrap(), "");
        DirLock::acquire(dir.path()).unwrap();
    }

    #[test]
    fn test_second_claim_is_busy() {
        let dir = tempdir().unwrap();
        let _held = DirLock::acquire(dir.path()).unwrap();

        match DirLock::acquire(dir.path()).unwrap_err() {
            StorageError::Busy { path, holder } => {
                assert_eq!(path, dir.path());
                if cfg!(unix) {
                    assert_eq!(holder, Some(process::id()));
                }
            }
            other => panic!("expected a busy directory, got {other:?}"),
        }
    }
}
