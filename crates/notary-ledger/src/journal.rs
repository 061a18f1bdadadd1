use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One committed ledger write.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized JournalEntry)]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub transaction_id: String,
    pub block_number: u64,
    pub document_id: String,
    /// The record exactly as `ReadDocument` returns it.
    pub record: Vec<u8>,
}

/// Errors produced by the journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("journal writer lock poisoned")]
    Poisoned,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct JournalWriter {
    file: File,
    offset: u64,
}

/// Append-only journal of committed writes.
///
/// Entries that fail the CRC check are skipped on recovery, and a torn tail
/// (from a crash mid-append) ends recovery at the last complete entry.
/// [`replay`](Self::replay) also cuts the torn tail off so that new entries
/// follow the last complete one.
pub struct LedgerJournal {
    path: PathBuf,
    writer: Mutex<JournalWriter>,
    sync_on_commit: bool,
}

impl LedgerJournal {
    /// Open (or create) the journal file at `path`.
    pub fn open(path: &Path, sync_on_commit: bool) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(JournalWriter { file, offset }),
            sync_on_commit,
        })
    }

    /// Append an entry. Returns the byte offset it was written at.
    ///
    /// A failed append is rolled back, so the journal never keeps a partial
    /// frame written by this process.
    pub fn append(&self, entry: &JournalEntry) -> Result<u64, JournalError> {
        let payload =
            bincode::serialize(entry).map_err(|e| JournalError::Serialization(e.to_string()))?;
        let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut w = self.writer.lock().map_err(|_| JournalError::Poisoned)?;
        let entry_offset = w.offset;

        if let Err(e) = Self::write_frame(&mut w.file, &frame, self.sync_on_commit) {
            if let Err(rollback) = w.file.set_len(entry_offset) {
                warn!(offset = entry_offset, error = %rollback, "journal rollback failed");
            }
            return Err(e.into());
        }
        w.offset += frame.len() as u64;

        debug!(offset = entry_offset, len = payload.len(), tx = %entry.transaction_id, "journal append");
        Ok(entry_offset)
    }

    fn write_frame(file: &mut File, frame: &[u8], sync: bool) -> io::Result<()> {
        file.write_all(frame)?;
        file.flush()?;
        if sync {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Read every valid entry, front to back.
    pub fn recover(&self) -> Result<Vec<JournalEntry>, JournalError> {
        self.scan().map(|(entries, _)| entries)
    }

    /// Recover every valid entry and truncate anything after the last
    /// complete frame. Call before the first append.
    pub fn replay(&self) -> Result<Vec<JournalEntry>, JournalError> {
        let (entries, valid_end) = self.scan()?;
        let mut w = self.writer.lock().map_err(|_| JournalError::Poisoned)?;
        if valid_end < w.file.metadata()?.len() {
            warn!(
                path = %self.path.display(),
                valid_end,
                discarded = w.offset.saturating_sub(valid_end),
                "truncating torn journal tail"
            );
            w.file.set_len(valid_end)?;
            w.file.sync_all()?;
        }
        w.offset = valid_end;
        Ok(entries)
    }

    /// Entries plus the offset just past the last complete frame.
    fn scan(&self) -> Result<(Vec<JournalEntry>, u64), JournalError> {
        let mut file = BufReader::new(File::open(&self.path)?);
        let file_len = file.get_ref().metadata()?.len();
        let mut entries = Vec::new();
        let mut offset: u64 = 0;

        while offset + HEADER_SIZE as u64 <= file_len {
            let mut header = [0u8; HEADER_SIZE];
            match file.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
                warn!(offset, length, file_len, "invalid journal entry length; stopping recovery");
                break;
            }

            let mut payload = vec![0u8; length as usize];
            match file.read_exact(&mut payload) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    warn!(offset, "truncated journal entry; stopping recovery");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
            offset += HEADER_SIZE as u64 + length as u64;

            let actual_crc = crc32fast::hash(&payload);
            if actual_crc != expected_crc {
                warn!(offset, expected = expected_crc, actual = actual_crc, "CRC mismatch; skipping entry");
                continue;
            }

            match bincode::deserialize::<JournalEntry>(&payload) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(offset, error = %e, "undecodable journal entry; skipping"),
            }
        }

        debug!(recovered = entries.len(), valid_end = offset, "journal recovery complete");
        Ok((entries, offset))
    }

    /// Current end-of-journal offset.
    pub fn offset(&self) -> u64 {
        self.writer.lock().map(|w| w.offset).unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LedgerJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerJournal")
            .field("path", &self.path)
            .field("sync_on_commit", &self.sync_on_commit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    fn entry(n: u64) -> JournalEntry {
        JournalEntry {
            transaction_id: format!("{n:064x}"),
            block_number: n,
            document_id: format!("doc-{n}"),
            record: format!("{{\"ID\":\"doc-{n}\"}}").into_bytes(),
        }
    }

    #[test]
    fn append_and_recover() {
        let dir = tempfile::tempdir().unwrap();
        let journal = LedgerJournal::open(&dir.path().join("ledger.journal"), false).unwrap();
        journal.append(&entry(1)).unwrap();
        journal.append(&entry(2)).unwrap();

        let recovered = journal.recover().unwrap();
        assert_eq!(recovered, vec![entry(1), entry(2)]);
    }

    #[test]
    fn reopen_continues_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let first = LedgerJournal::open(&path, true).unwrap();
        first.append(&entry(1)).unwrap();
        let end = first.offset();
        drop(first);

        let second = LedgerJournal::open(&path, true).unwrap();
        assert_eq!(second.offset(), end);
        assert_eq!(second.append(&entry(2)).unwrap(), end);
        assert_eq!(second.recover().unwrap().len(), 2);
    }

    #[test]
    fn corrupt_entry_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let journal = LedgerJournal::open(&path, false).unwrap();
        journal.append(&entry(1)).unwrap();
        journal.append(&entry(2)).unwrap();
        drop(journal);

        {
            let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xFF;
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            file.write_all(&buf).unwrap();
        }

        let journal = LedgerJournal::open(&path, false).unwrap();
        assert_eq!(journal.recover().unwrap(), vec![entry(2)]);
    }

    #[test]
    fn torn_tail_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let journal = LedgerJournal::open(&path, false).unwrap();
        journal.append(&entry(1)).unwrap();
        journal.append(&entry(2)).unwrap();
        let total = journal.offset();
        drop(journal);

        OpenOptions::new().write(true).open(&path).unwrap().set_len(total - 3).unwrap();

        let journal = LedgerJournal::open(&path, false).unwrap();
        assert_eq!(journal.recover().unwrap(), vec![entry(1)]);
    }

    /// Writes a header promising 200 payload bytes followed by only 10.
    fn tear(path: &Path) {
        let mut file = OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(&200u32.to_le_bytes()).unwrap();
        file.write_all(&0u32.to_le_bytes()).unwrap();
        file.write_all(&[0xab; 10]).unwrap();
    }

    #[test]
    fn appends_after_a_torn_tail_are_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let journal = LedgerJournal::open(&path, true).unwrap();
        journal.append(&entry(1)).unwrap();
        let clean_end = journal.offset();
        drop(journal);
        tear(&path);

        let journal = LedgerJournal::open(&path, true).unwrap();
        assert_eq!(journal.replay().unwrap(), vec![entry(1)]);
        assert_eq!(journal.offset(), clean_end);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), clean_end);
        assert_eq!(journal.append(&entry(2)).unwrap(), clean_end);
        drop(journal);

        let journal = LedgerJournal::open(&path, true).unwrap();
        assert_eq!(journal.replay().unwrap(), vec![entry(1), entry(2)]);
    }

    #[test]
    fn replay_of_a_clean_journal_keeps_every_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.journal");
        let journal = LedgerJournal::open(&path, false).unwrap();
        journal.append(&entry(1)).unwrap();
        journal.append(&entry(2)).unwrap();
        let end = journal.offset();
        drop(journal);

        let journal = LedgerJournal::open(&path, false).unwrap();
        assert_eq!(journal.replay().unwrap().len(), 2);
        assert_eq!(journal.offset(), end);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), end);
    }

    #[test]
    fn empty_journal_recovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let journal = LedgerJournal::open(&dir.path().join("nested/ledger.journal"), false).unwrap();
        assert!(journal.recover().unwrap().is_empty());
        assert_eq!(journal.offset(), 0);
    }
}
