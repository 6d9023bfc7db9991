//! Append-only JSON Lines implementation of `AuditStore`.
//!
//! One record per line, in append order.  Opening a store replays the file
//! to recover the chain tail, so a restarted process keeps extending the same
//! chain.  Each append is synced before it is acknowledged.
//!
//! Several handles may share one file, in one process or many.  Every
//! compare-and-append runs under an exclusive advisory lock on the file and
//! first catches up on lines other handles wrote, so the predecessor it
//! checks against is the file's last record, not this handle's last write.
//!
//! A write that never completed leaves a final line without its newline.
//! That fragment was never acknowledged, so it is not part of the chain: it
//! is ignored by readers and cut off by the next handle that takes the
//! exclusive lock.

use std::{
    fs::{File, OpenOptions},
    io::{BufRead, BufReader, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use fs2::FileExt;
use tracing::{debug, info, warn};

use trailguard_contracts::{
    error::{AuditError, AuditResult},
    record::{AuditRecord, PendingRecord, RecordId},
};
use trailguard_core::traits::AuditStore;

/// What this handle knows about the file, valid up to `offset`.
#[derive(Clone, Default)]
struct ChainView {
    tail: Option<AuditRecord>,
    len: usize,
    /// Lines consumed so far, blank ones included.
    lines: usize,
    /// Byte offset just past the last complete line.
    offset: u64,
}

struct JsonlState {
    file: File,
    view: ChainView,
}

/// A durable audit store backed by a JSON Lines file.
pub struct JsonlAuditStore {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlAuditStore {
    /// Open (or create) the store at `path`, creating parent directories as
    /// needed.
    ///
    /// A torn final line is truncated.  Fails with
    /// `AuditError::Serialization` if a complete line cannot be parsed as a
    /// record.
    pub fn open(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AuditError::Storage {
                reason: format!("failed to create '{}': {}", parent.display(), e),
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .map_err(|e| AuditError::Storage {
                reason: format!("failed to open '{}': {}", path.display(), e),
            })?;

        let mut view = ChainView::default();
        {
            let _lock = FileLock::exclusive(&file, &path)?;
            let end = refresh(&file, &path, &mut view)?;
            cut_torn_tail(&file, &path, &view, end)?;
        }

        info!(
            path = %path.display(),
            records = view.len,
            tail_hash = view.tail.as_ref().map(|r| r.hash.as_str()).unwrap_or("<empty>"),
            "audit store opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(JsonlState { file, view }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> AuditResult<MutexGuard<'_, JsonlState>> {
        self.state.lock().map_err(|e| AuditError::Storage {
            reason: format!("audit store lock poisoned: {}", e),
        })
    }

    /// Catch up with the file under a shared lock and return the view.
    fn current(&self) -> AuditResult<ChainView> {
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let _lock = FileLock::shared(&state.file, &self.path)?;
        refresh(&state.file, &self.path, &mut state.view)?;
        Ok(state.view.clone())
    }
}

/// Read every record in `path`, skipping blank lines and ignoring a torn
/// final line.
pub fn read_records(path: &Path) -> AuditResult<Vec<AuditRecord>> {
    let file = File::open(path).map_err(|e| AuditError::Storage {
        reason: format!("failed to open '{}': {}", path.display(), e),
    })?;
    let _lock = FileLock::shared(&file, path)?;
    replay(&file, path, &mut ChainView::default())
}

/// Advisory lock on the store file, released on drop.
struct FileLock<'a> {
    file: &'a File,
}

// Calls go through the trait path so they never resolve to the inherent
// `File` locking methods of newer toolchains.
impl<'a> FileLock<'a> {
    fn exclusive(file: &'a File, path: &Path) -> AuditResult<Self> {
        FileExt::lock_exclusive(file).map_err(|e| AuditError::Storage {
            reason: format!("failed to lock '{}': {}", path.display(), e),
        })?;
        Ok(Self { file })
    }

    fn shared(file: &'a File, path: &Path) -> AuditResult<Self> {
        FileExt::lock_shared(file).map_err(|e| AuditError::Storage {
            reason: format!("failed to lock '{}': {}", path.display(), e),
        })?;
        Ok(Self { file })
    }
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        let _ = FileExt::unlock(self.file);
    }
}

/// Parse the complete lines of `file` from `view.offset` on and advance
/// `view` past them.  Returns the records found; `view.tail` and `view.len`
/// are left to the caller.
///
/// `view` is untouched when a line fails to parse.
fn replay(file: &File, path: &Path, view: &mut ChainView) -> AuditResult<Vec<AuditRecord>> {
    let read_err = |e: std::io::Error| AuditError::Storage {
        reason: format!("failed to read '{}': {}", path.display(), e),
    };

    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(view.offset)).map_err(read_err)?;

    let mut offset = view.offset;
    let mut lines = view.lines;
    let mut records = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).map_err(read_err)?;
        if n == 0 || buf.last() != Some(&b'\n') {
            break;
        }
        offset += n as u64;
        lines += 1;
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record: AuditRecord =
            serde_json::from_slice(&buf).map_err(|e| AuditError::Serialization {
                reason: format!("{} line {}: {}", path.display(), lines, e),
            })?;
        records.push(record);
    }

    view.offset = offset;
    view.lines = lines;
    Ok(records)
}

/// Bring `view` up to date with lines written through other handles.
/// Returns the current file length, which exceeds `view.offset` only when a
/// torn line follows the last complete one.
fn refresh(file: &File, path: &Path, view: &mut ChainView) -> AuditResult<u64> {
    let end = file
        .metadata()
        .map_err(|e| AuditError::Storage {
            reason: format!("failed to stat '{}': {}", path.display(), e),
        })?
        .len();

    if end < view.offset {
        warn!(
            path = %path.display(),
            known = view.offset,
            found = end,
            "audit store shrank; replaying from the start"
        );
        *view = ChainView::default();
    }

    if end > view.offset {
        let mut fresh = replay(file, path, view)?;
        view.len += fresh.len();
        if let Some(last) = fresh.pop() {
            view.tail = Some(last);
        }
    }
    Ok(end)
}

/// Truncate a torn final line.  The caller holds the exclusive lock.
fn cut_torn_tail(file: &File, path: &Path, view: &ChainView, end: u64) -> AuditResult<()> {
    if end <= view.offset {
        return Ok(());
    }
    warn!(
        path = %path.display(),
        line = view.lines + 1,
        bytes = end - view.offset,
        "discarding torn record at end of audit store"
    );
    file.set_len(view.offset)
        .and_then(|()| file.sync_data())
        .map_err(|e| AuditError::Storage {
            reason: format!("failed to truncate '{}': {}", path.display(), e),
        })
}

impl AuditStore for JsonlAuditStore {
    fn tail(&self) -> AuditResult<Option<AuditRecord>> {
        Ok(self.current()?.tail)
    }

    fn append(&self, record: PendingRecord) -> AuditResult<AuditRecord> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let _lock = FileLock::exclusive(&state.file, &self.path)?;
        let end = refresh(&state.file, &self.path, &mut state.view)?;
        cut_torn_tail(&state.file, &self.path, &state.view, end)?;

        let tail_hash = state.view.tail.as_ref().map(|r| r.hash.as_str());
        if tail_hash != record.prev_hash.as_deref() {
            return Err(AuditError::conflict(record.prev_hash.as_deref(), tail_hash));
        }

        let stored = record.into_record(RecordId::new());
        let mut line = serde_json::to_string(&stored).map_err(|e| AuditError::Serialization {
            reason: format!("failed to encode record: {}", e),
        })?;
        line.push('\n');

        let write = |mut file: &File| -> std::io::Result<()> {
            file.write_all(line.as_bytes())?;
            file.sync_data()
        };
        if let Err(e) = write(&state.file) {
            // Best effort; a leftover fragment is cut by the next append.
            let _ = state.file.set_len(state.view.offset);
            return Err(AuditError::Storage {
                reason: format!("failed to append to '{}': {}", self.path.display(), e),
            });
        }

        debug!(id = %stored.id, action = %stored.action, "record written");

        state.view.offset += line.len() as u64;
        state.view.lines += 1;
        state.view.len += 1;
        state.view.tail = Some(stored.clone());
        Ok(stored)
    }

    fn snapshot(&self) -> AuditResult<Vec<AuditRecord>> {
        let guard = self.lock()?;
        let _lock = FileLock::shared(&guard.file, &self.path)?;
        replay(&guard.file, &self.path, &mut ChainView::default())
    }

    fn len(&self) -> AuditResult<usize> {
        Ok(self.current()?.len)
    }
}
