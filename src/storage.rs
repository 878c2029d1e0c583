//! Where the decryption table artifact lives.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Storage for a single opaque artifact.
pub trait TableStorage {
    /// Whether an artifact is present. Its content is not inspected.
    fn exists(&self) -> Result<bool>;

    /// Reader over the stored artifact.
    fn open(&self) -> Result<Box<dyn Read + '_>>;

    /// Persist `bytes`, replacing any previous artifact.
    fn store(&self, bytes: &[u8]) -> Result<()>;

    /// Output some information on the storage instance.
    fn info(&self) -> String;
}

/// Artifact kept in a single file on the local file system.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}

impl TableStorage for FileStorage {
    fn exists(&self) -> Result<bool> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }

    fn store(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Written aside and renamed so a crash never leaves a truncated artifact behind.
        let staging = self.staging_path();
        let mut writer = BufWriter::new(File::create(&staging)?);
        writer.write_all(bytes)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn info(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// In-memory storage that counts writes.
#[derive(Debug, Default)]
pub struct RamStorage {
    data: RefCell<Option<Vec<u8>>>,
    writes: Cell<usize>,
}

impl RamStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `bytes`.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: RefCell::new(Some(bytes)),
            writes: Cell::new(0),
        }
    }

    /// Copy of the stored artifact.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.data.borrow().clone()
    }

    /// Number of successful `store` calls.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl TableStorage for RamStorage {
    fn exists(&self) -> Result<bool> {
        Ok(self.data.borrow().is_some())
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        let bytes = self
            .data
            .borrow()
            .clone()
            .ok_or_else(|| std::io::Error::new(ErrorKind::NotFound, "no artifact stored"))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn store(&self, bytes: &[u8]) -> Result<()> {
        *self.data.borrow_mut() = Some(bytes.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn info(&self) -> String {
        "RamStorage".to_string()
    }
}
