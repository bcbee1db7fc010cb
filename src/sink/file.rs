use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{poisoned, WriteSink};

/// Plain append-only file sink.
///
/// The file is opened (and created if absent) at construction. No rotation is
/// performed; the file grows without bound.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    /// Opens `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or created. Missing
    /// parent directories are not created here.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WriteSink for FileSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut file = self.file.lock().map_err(|_| poisoned("file"))?;
        file.write_all(record)
    }

    fn sync(&self) -> io::Result<()> {
        let file = self.file.lock().map_err(|_| poisoned("file"))?;
        file.sync_all()
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
