//! Crash-safe TOML files.
//!
//! Writes go to a hidden sibling temp file, are fsynced and then renamed
//! over the target. Read-modify-write cycles hold an `fs2` advisory lock on
//! a sibling `.lock` file so two client processes cannot interleave.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use flexi_core::error::{FlexiError, Result};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};

pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and decodes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: the file exists and decoded
    /// - `Ok(None)`: the file is missing or blank
    /// - `Err`: the file could not be read or is not valid TOML for `T`
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(toml::from_str(&text)?))
    }

    /// Replaces the file contents with `data`.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let encoded = toml::to_string_pretty(data)?;

        let staged_path = self.staged_path()?;
        let mut staged = File::create(&staged_path)?;
        staged.write_all(encoded.as_bytes())?;
        staged.sync_all()?;
        drop(staged);

        fs::rename(&staged_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write.
    ///
    /// `f` sees the current contents (or `default_value` when there are
    /// none); its result is written back only when it returns `Ok`.
    pub fn update<F, R>(&self, default_value: T, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut current = self.load()?.unwrap_or(default_value);
        let outcome = f(&mut current)?;
        self.save(&current)?;

        Ok(outcome)
    }

    fn staged_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| FlexiError::io(format!("{} has no parent directory", self.path.display())))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| FlexiError::io(format!("{} has no file name", self.path.display())))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive advisory lock, released when dropped.
///
/// The `.lock` file itself is left in place: unlinking it while another
/// process waits on it would let a third process lock a fresh inode.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        FileExt::lock_exclusive(&file)
            .map_err(|e| FlexiError::io(format!("Failed to lock {}: {}", lock_path.display(), e)))?;

        Ok(FileLock { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    #[test]
    fn test_load_missing_and_blank_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("missing.toml");
        let file = AtomicTomlFile::<Counter>::new(file_path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&file_path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_accumulates_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("counter.toml");
        let file = AtomicTomlFile::<Counter>::new(file_path.clone());

        for _ in 0..3 {
            file.update(Counter::default(), |c| {
                c.count += 5;
                Ok(())
            })
            .unwrap();
        }

        assert_eq!(file.load().unwrap().map(|c| c.count), Some(15));
        assert!(!temp_dir.path().join(".counter.toml.tmp").exists());
    }

    #[test]
    fn test_failed_update_keeps_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("counter.toml"));
        file.save(&Counter {
            name: "kept".into(),
            count: 1,
        })
        .unwrap();

        let result: Result<()> = file.update(Counter::default(), |c| {
            c.count = 99;
            Err(FlexiError::internal("abort"))
        });

        assert!(result.is_err());
        assert_eq!(file.load().unwrap().map(|c| c.count), Some(1));
    }

    #[test]
    fn test_corrupt_file_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("bad.toml");
        fs::write(&file_path, "count = [").unwrap();

        let err = AtomicTomlFile::<Counter>::new(file_path).load().unwrap_err();
        assert!(err.is_serialization());
    }
}
