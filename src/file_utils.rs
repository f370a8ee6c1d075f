use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes through a temp file in the target directory, then rename it
    /// into place. Readers never see a partial file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        Self::ensure_dir(dir)?;

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temp file for {:?}", path))?;
        temp.as_file()
            .sync_all()
            .with_context(|| format!("Failed to flush temp file for {:?}", path))?;
        temp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to persist {:?}", path))?;

        Ok(())
    }
}

/// Exclusive output directory owned by one narration request.
///
/// Named `output_<YYYYmmdd_HHMMSS>_<id8>` under the configured base directory.
#[derive(Debug)]
pub struct OutputScope {
    dir: PathBuf,
}

impl OutputScope {
    /// Create a fresh scope directory under `base`
    pub fn create<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref();
        FileManager::ensure_dir(base)?;

        let id = Uuid::new_v4().simple().to_string();
        let name = format!("output_{}_{}", Local::now().format("%Y%m%d_%H%M%S"), &id[..8]);
        let dir = base.join(name);

        // create_dir fails if the directory exists, which keeps scopes exclusive
        fs::create_dir(&dir).with_context(|| format!("Failed to create output scope {:?}", dir))?;
        debug!("Created output scope {:?}", dir);

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a file inside the scope
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Atomically write `file_name` inside the scope
    pub fn write(&self, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.path(file_name);
        FileManager::write_atomic(&path, content)?;
        Ok(path)
    }

    /// Remove the scope directory and everything in it
    pub fn discard(self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            warn!("Failed to remove output scope {:?}: {}", self.dir, e);
        } else {
            debug!("Removed output scope {:?}", self.dir);
        }
    }
}
