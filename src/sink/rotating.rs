//! Rotating file writer with size-based rollover and age/count retention.
//!
//! The writer appends to a single log file. When a write would push the file
//! past `max_size_mb`, the file is renamed to a timestamped backup and a fresh
//! file is started. After each rollover, backups are pruned by count and age and
//! optionally gzip-compressed.
//!
//! # Backup Naming
//!
//! `<stem>-<YYYY-MM-DDTHH-MM-SS.mmm><ext>` in UTC, with `.gz` appended once
//! compressed. For `logs/run.log`:
//!
//! ```text
//! logs/run.log
//! logs/run-2024-05-01T10-15-42.117.log
//! logs/run-2024-04-30T22-01-09.004.log.gz
//! ```
//!
//! A rollover that lands on a name already taken appends a sequence number,
//! e.g. `logs/run-2024-05-01T10-15-42.117-1.log`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{NaiveDateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use super::{poisoned, WriteSink};

const MEGABYTE: u64 = 1024 * 1024;

/// Rollover size used when a policy asks for `0` MiB.
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;

const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

const COMPRESS_SUFFIX: &str = ".gz";

/// Rollover and retention settings for a rotating log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Active log file.
    pub path: PathBuf,
    /// Size in MiB at which the file is rolled over. `0` means
    /// [`DEFAULT_MAX_SIZE_MB`].
    pub max_size_mb: u64,
    /// Backups to keep; `0` keeps all of them.
    pub max_backups: usize,
    /// Days to keep backups; `0` keeps them forever.
    pub max_age_days: u32,
    /// Gzip rotated-out backups.
    pub compress: bool,
}

impl RotationPolicy {
    /// Rollover size in bytes, with `0` MiB read as [`DEFAULT_MAX_SIZE_MB`].
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        let mb = if self.max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            self.max_size_mb
        };
        mb.saturating_mul(MEGABYTE)
    }
}

struct ActiveFile {
    file: File,
    size: u64,
}

struct Backup {
    path: PathBuf,
    taken_at: NaiveDateTime,
    // Disambiguates rollovers within the same millisecond.
    seq: u32,
    compressed: bool,
}

/// Thread-safe rotating file writer.
///
/// The file is opened lazily on the first write. Uses an internal `Mutex`, so a
/// single writer may be shared across threads.
///
/// # Example
///
/// ```
/// use rhino_logger::sink::{RotatingFileWriter, RotationPolicy, WriteSink};
///
/// let dir = tempfile::tempdir()?;
/// let writer = RotatingFileWriter::new(RotationPolicy {
///     path: dir.path().join("run.log"),
///     max_size_mb: 10,
///     max_backups: 5,
///     max_age_days: 7,
///     compress: false,
/// });
/// writer.write_record(b"{\"message\":\"hi\"}\n")?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RotatingFileWriter {
    policy: RotationPolicy,
    max_bytes: u64,
    active: Mutex<Option<ActiveFile>>,
}

impl RotatingFileWriter {
    #[must_use]
    pub fn new(policy: RotationPolicy) -> Self {
        let max_bytes = policy.max_bytes();
        Self::with_max_bytes(policy, max_bytes)
    }

    fn with_max_bytes(policy: RotationPolicy, max_bytes: u64) -> Self {
        Self {
            policy,
            max_bytes,
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Rolls the file over immediately, regardless of its size.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup rename or the new file creation fails.
    pub fn rotate(&self) -> io::Result<()> {
        let mut active = self.active.lock().map_err(|_| poisoned("rotating file"))?;
        *active = None;
        *active = Some(self.roll_over()?);
        Ok(())
    }

    fn write_locked(&self, active: &mut Option<ActiveFile>, record: &[u8]) -> io::Result<()> {
        let len = u64::try_from(record.len()).unwrap_or(u64::MAX);
        if len > self.max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write length {len} exceeds maximum file size {}",
                    self.max_bytes
                ),
            ));
        }

        if active.is_none() {
            *active = Some(self.open_existing()?);
        }

        if active
            .as_ref()
            .is_some_and(|current| current.size.saturating_add(len) > self.max_bytes)
        {
            *active = None;
            *active = Some(self.roll_over()?);
        }

        let current = active
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "No file available"))?;

        current.file.write_all(record)?;
        current.size = current.size.saturating_add(len);
        Ok(())
    }

    fn open_existing(&self) -> io::Result<ActiveFile> {
        if let Some(dir) = self.directory() {
            fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.policy.path)?;
        let size = file.metadata()?.len();
        Ok(ActiveFile { file, size })
    }

    /// Renames the active file to a backup, starts a new one and applies
    /// retention.
    fn roll_over(&self) -> io::Result<ActiveFile> {
        if self.policy.path.exists() {
            let backup_path = self.free_backup_path(&Utc::now().naive_utc());
            fs::rename(&self.policy.path, &backup_path)?;
            tracing::debug!(
                path = %self.policy.path.display(),
                backup = %backup_path.display(),
                "rotated log file"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.policy.path)?;

        if let Err(e) = self.cleanup_old_backups() {
            tracing::warn!(
                path = %self.policy.path.display(),
                error = %e,
                "failed to clean up log backups"
            );
        }

        Ok(ActiveFile { file, size: 0 })
    }

    fn directory(&self) -> Option<&Path> {
        self.policy
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Splits the active file name into `(stem, extension-with-dot)`.
    fn name_parts(&self) -> (String, String) {
        let stem = self
            .policy
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        let ext = self
            .policy
            .path
            .extension()
            .and_then(|s| s.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        (stem, ext)
    }

    fn backup_path(&self, taken_at: &NaiveDateTime, seq: u32) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let stamp = taken_at.format(BACKUP_TIME_FORMAT);
        let name = if seq == 0 {
            format!("{stem}-{stamp}{ext}")
        } else {
            format!("{stem}-{stamp}-{seq}{ext}")
        };
        self.directory()
            .map_or_else(|| PathBuf::from(&name), |dir| dir.join(&name))
    }

    /// First backup name for `taken_at` that is taken neither plain nor
    /// compressed.
    fn free_backup_path(&self, taken_at: &NaiveDateTime) -> PathBuf {
        let mut seq = 0;
        loop {
            let path = self.backup_path(taken_at, seq);
            let mut compressed = path.as_os_str().to_owned();
            compressed.push(COMPRESS_SUFFIX);
            if !path.exists() && !Path::new(&compressed).exists() {
                return path;
            }
            seq += 1;
        }
    }

    /// Lists backups of the active file, newest first.
    fn backups(&self) -> io::Result<Vec<Backup>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{stem}-");
        let compressed_ext = format!("{ext}{COMPRESS_SUFFIX}");
        let dir = self.directory().unwrap_or_else(|| Path::new("."));

        let mut backups: Vec<Backup> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let (stamp, compressed) = match rest.strip_suffix(&compressed_ext) {
                    Some(stamp) => (stamp, true),
                    None => (rest.strip_suffix(&ext)?, false),
                };
                let (taken_at, seq) = parse_stamp(stamp)?;
                Some(Backup {
                    path: entry.path(),
                    taken_at,
                    seq,
                    compressed,
                })
            })
            .collect();

        backups.sort_by(|a, b| (b.taken_at, b.seq).cmp(&(a.taken_at, a.seq)));
        Ok(backups)
    }

    /// Removes backups beyond the count and age limits, then compresses the
    /// survivors if requested.
    ///
    /// Individual removal and compression failures are logged and skipped.
    fn cleanup_old_backups(&self) -> io::Result<()> {
        let mut backups = self.backups()?;
        let mut expired = Vec::new();

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            expired.extend(backups.split_off(self.policy.max_backups));
        }

        if self.policy.max_age_days > 0 {
            let cutoff = Utc::now().naive_utc()
                - chrono::Duration::days(i64::from(self.policy.max_age_days));
            let (kept, old): (Vec<Backup>, Vec<Backup>) =
                backups.into_iter().partition(|b| b.taken_at >= cutoff);
            backups = kept;
            expired.extend(old);
        }

        for backup in &expired {
            if let Err(e) = fs::remove_file(&backup.path) {
                tracing::debug!(backup = %backup.path.display(), error = %e, "failed to remove backup");
            }
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                if let Err(e) = compress_file(&backup.path) {
                    tracing::warn!(backup = %backup.path.display(), error = %e, "failed to compress backup");
                }
            }
        }

        Ok(())
    }
}

/// Parses `<stamp>` or `<stamp>-<seq>` from a backup file name.
fn parse_stamp(stamp: &str) -> Option<(NaiveDateTime, u32)> {
    if let Ok(taken_at) = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT) {
        return Some((taken_at, 0));
    }
    let (stamp, seq) = stamp.rsplit_once('-')?;
    let seq = seq.parse().ok()?;
    let taken_at = NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()?;
    Some((taken_at, seq))
}

/// Gzips `src` to `<src>.gz` and removes `src`.
fn compress_file(src: &Path) -> io::Result<()> {
    let mut dst_name = src.as_os_str().to_owned();
    dst_name.push(COMPRESS_SUFFIX);
    let dst = PathBuf::from(dst_name);

    let mut input = File::open(src)?;
    let mut encoder = GzEncoder::new(File::create(&dst)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(src)
}

impl WriteSink for RotatingFileWriter {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut active = self.active.lock().map_err(|_| poisoned("rotating file"))?;
        self.write_locked(&mut active, record)
    }

    fn sync(&self) -> io::Result<()> {
        let active = self.active.lock().map_err(|_| poisoned("rotating file"))?;
        match active.as_ref() {
            Some(current) => current.file.sync_all(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn policy(dir: &Path) -> RotationPolicy {
        RotationPolicy {
            path: dir.join("run.log"),
            max_size_mb: 1,
            max_backups: 0,
            max_age_days: 0,
            compress: false,
        }
    }

    fn plant_backup(writer: &RotatingFileWriter, age: chrono::Duration) -> PathBuf {
        let path = writer.backup_path(&(Utc::now().naive_utc() - age), 0);
        fs::write(&path, b"old\n").unwrap();
        path
    }

    #[test]
    fn rolls_over_when_limit_would_be_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::with_max_bytes(policy(dir.path()), 32);

        writer.write_record(b"first record padded to 20\n").unwrap();
        writer.write_record(b"second record\n").unwrap();
        writer.sync().unwrap();

        let active = fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert_eq!(active, "second record\n");

        let backups = writer.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            fs::read_to_string(&backups[0].path).unwrap(),
            "first record padded to 20\n"
        );
    }

    #[test]
    fn counts_existing_content_toward_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.log"), "x".repeat(30)).unwrap();
        let writer = RotatingFileWriter::with_max_bytes(policy(dir.path()), 32);

        writer.write_record(b"0123456789\n").unwrap();

        assert_eq!(writer.backups().unwrap().len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("run.log")).unwrap(),
            "0123456789\n"
        );
    }

    #[test]
    fn rejects_records_larger_than_the_limit() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::with_max_bytes(policy(dir.path()), 8);

        let err = writer.write_record(b"way too long for eight\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn keeps_only_the_newest_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = policy(dir.path());
        p.max_backups = 2;
        let writer = RotatingFileWriter::new(p);

        let newest_old = plant_backup(&writer, chrono::Duration::hours(1));
        let older = plant_backup(&writer, chrono::Duration::hours(2));
        let oldest = plant_backup(&writer, chrono::Duration::hours(3));

        writer.write_record(b"live\n").unwrap();
        writer.rotate().unwrap();

        assert!(newest_old.exists());
        assert!(!older.exists());
        assert!(!oldest.exists());
        assert_eq!(writer.backups().unwrap().len(), 2);
    }

    #[test]
    fn removes_backups_past_max_age() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = policy(dir.path());
        p.max_age_days = 1;
        let writer = RotatingFileWriter::new(p);

        let stale = plant_backup(&writer, chrono::Duration::days(3));
        let fresh = plant_backup(&writer, chrono::Duration::hours(2));

        writer.rotate().unwrap();

        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn compresses_rotated_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = policy(dir.path());
        p.compress = true;
        let writer = RotatingFileWriter::new(p);

        writer.write_record(b"{\"message\":\"to archive\"}\n").unwrap();
        writer.rotate().unwrap();

        let backups = writer.backups().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].compressed);

        let mut text = String::new();
        GzDecoder::new(File::open(&backups[0].path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "{\"message\":\"to archive\"}\n");
    }

    #[test]
    fn unrelated_files_are_not_backups() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::new(policy(dir.path()));
        fs::write(dir.path().join("run-notes.log"), b"").unwrap();
        fs::write(dir.path().join("other.log"), b"").unwrap();

        assert!(writer.backups().unwrap().is_empty());
    }

    #[test]
    fn creates_missing_directories_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = RotatingFileWriter::new(policy(&nested));

        writer.write_record(b"hello\n").unwrap();
        assert!(nested.join("run.log").is_file());
    }

    #[test]
    fn same_millisecond_rollovers_keep_every_backup() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::with_max_bytes(policy(dir.path()), 8);

        for i in 0..20 {
            writer.write_record(format!("rec-{i:02}\n").as_bytes()).unwrap();
        }

        let backups = writer.backups().unwrap();
        assert_eq!(backups.len(), 19);

        let mut lines: Vec<String> = backups
            .iter()
            .map(|b| fs::read_to_string(&b.path).unwrap())
            .chain(std::iter::once(
                fs::read_to_string(dir.path().join("run.log")).unwrap(),
            ))
            .collect();
        lines.sort();
        let expected: Vec<String> = (0..20).map(|i| format!("rec-{i:02}\n")).collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn sequence_suffix_orders_after_plain_stamp() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RotatingFileWriter::new(policy(dir.path()));
        let taken_at = Utc::now().naive_utc();

        fs::write(writer.backup_path(&taken_at, 0), b"a\n").unwrap();
        fs::write(writer.backup_path(&taken_at, 1), b"b\n").unwrap();
        assert_eq!(
            writer.free_backup_path(&taken_at),
            writer.backup_path(&taken_at, 2)
        );

        let backups = writer.backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].seq, 1);
        assert_eq!(backups[1].seq, 0);
    }

    #[test]
    fn zero_size_uses_default_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = policy(dir.path());
        p.max_size_mb = 0;
        assert_eq!(p.max_bytes(), DEFAULT_MAX_SIZE_MB * MEGABYTE);

        let writer = RotatingFileWriter::new(p);
        writer.write_record(b"{\"message\":\"kept\"}\n").unwrap();
        writer.write_record(b"{\"message\":\"also kept\"}\n").unwrap();

        assert!(writer.backups().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("run.log")).unwrap().lines().count(),
            2
        );
    }
}
