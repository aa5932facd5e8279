//! Atomic file operations for JSON and TOML records.
//!
//! Every write goes to a temporary sibling file which is fsynced and then
//! renamed over the target, so readers only ever see the old record or the
//! complete new one.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// On-disk encoding of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Pretty-printed JSON, 4-space indent, UTF-8 written verbatim.
    Json,
    /// Pretty-printed TOML.
    Toml,
}

impl FileFormat {
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Json => "JSON",
            FileFormat::Toml => "TOML",
        }
    }
}

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// The record exists but could not be decoded.
    ParseError { format: FileFormat, message: String },
    /// The value could not be encoded.
    SerializeError { format: FileFormat, message: String },
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::ParseError { format, message } => {
                write!(f, "{} parse error: {}", format.name(), message)
            }
            AtomicFileError::SerializeError { format, message } => {
                write!(f, "{} serialization error: {}", format.name(), message)
            }
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

/// A handle to a single record file.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Durability**: Explicit fsync before rename
/// - **Isolation**: `update` holds an exclusive lock file for read-modify-write
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new handle.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the record file
    /// * `format` - The encoding used for reads and writes
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads and decodes the record.
    ///
    /// Only a missing file counts as "nothing stored". An empty or truncated
    /// file is handed to the decoder like any other content and fails there
    /// unless the format accepts it (an empty TOML document is a valid empty
    /// table). Bytes that are not UTF-8 are a parse error, not an I/O one.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and decoded
    /// - `Ok(None)`: File doesn't exist
    /// - `Err`: Failed to read or decode the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let data = match self.format {
            FileFormat::Json => {
                serde_json::from_slice(&bytes).map_err(|e| self.parse_error(e.to_string()))?
            }
            FileFormat::Toml => {
                let content =
                    std::str::from_utf8(&bytes).map_err(|e| self.parse_error(e.to_string()))?;
                toml::from_str(content).map_err(|e| self.parse_error(e.to_string()))?
            }
        };
        Ok(Some(data))
    }

    /// Saves data to the file atomically.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully saved
    /// - `Err`: Failed to serialize or write the file
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = self.encode(data)?;

        // Write to temporary file in the same directory
        let tmp_path = self.get_temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(&bytes)?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        // Atomic rename
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Performs a locked read-modify-write.
    ///
    /// The update function receives the current record (or `default_value`
    /// when the file doesn't exist). If it returns `Ok(())`, the result is
    /// written back atomically.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<(), AtomicFileError>
    where
        F: FnOnce(&mut T) -> Result<(), AtomicFileError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)?;

        Ok(())
    }

    /// Deletes the record.
    ///
    /// Returns `false` if there was nothing to delete.
    pub fn remove(&self) -> Result<bool, AtomicFileError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn encode(&self, data: &T) -> Result<Vec<u8>, AtomicFileError> {
        match self.format {
            FileFormat::Json => {
                let mut buf = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
                let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
                data.serialize(&mut serializer)
                    .map_err(|e| self.serialize_error(e.to_string()))?;
                buf.push(b'\n');
                Ok(buf)
            }
            FileFormat::Toml => toml::to_string_pretty(data)
                .map(String::into_bytes)
                .map_err(|e| self.serialize_error(e.to_string())),
        }
    }

    fn parse_error(&self, message: String) -> AtomicFileError {
        AtomicFileError::ParseError {
            format: self.format,
            message,
        }
    }

    fn serialize_error(&self, message: String) -> AtomicFileError {
        AtomicFileError::SerializeError {
            format: self.format,
            message,
        }
    }

    /// Gets a temporary file path for atomic writes.
    fn get_temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Acquires an exclusive lock next to `path`.
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        use fs2::FileExt;

        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|e| AtomicFileError::LockError(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestRecord {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load_toml() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<TestRecord>::toml(temp_dir.path().join("test.toml"));

        let record = TestRecord {
            name: "test".to_string(),
            count: 42,
        };
        file.save(&record).unwrap();

        assert_eq!(file.load().unwrap().unwrap(), record);
    }

    #[test]
    fn test_json_keeps_non_ascii_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("db.json");
        let file = AtomicFile::<BTreeMap<String, Vec<String>>>::json(path.clone());

        let mut data = BTreeMap::new();
        data.insert("nasılsın".to_string(), vec!["iyiyim, teşekkürler".to_string()]);
        file.save(&data).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("nasılsın"));
        assert!(raw.contains("teşekkürler"));
        assert!(!raw.contains("\\u"));
        assert!(raw.contains("\n    \"nasılsın\""));
        assert_eq!(file.load().unwrap().unwrap(), data);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<TestRecord>::json(temp_dir.path().join("missing.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_truncated_json_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{\"name\": \"te").unwrap();

        let file = AtomicFile::<TestRecord>::json(path);
        assert!(matches!(
            file.load(),
            Err(AtomicFileError::ParseError {
                format: FileFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_json_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        fs::write(&path, "   \n").unwrap();

        let file = AtomicFile::<TestRecord>::json(path);
        assert!(matches!(file.load(), Err(AtomicFileError::ParseError { .. })));
    }

    #[test]
    fn test_non_utf8_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let json_path = temp_dir.path().join("latin.json");
        fs::write(&json_path, b"{\"name\": \"s\xfdn\", \"count\": 1}").unwrap();
        let toml_path = temp_dir.path().join("latin.toml");
        fs::write(&toml_path, b"name = \"s\xfdn\"\ncount = 1\n").unwrap();

        assert!(matches!(
            AtomicFile::<TestRecord>::json(json_path).load(),
            Err(AtomicFileError::ParseError {
                format: FileFormat::Json,
                ..
            })
        ));
        assert!(matches!(
            AtomicFile::<TestRecord>::toml(toml_path).load(),
            Err(AtomicFileError::ParseError {
                format: FileFormat::Toml,
                ..
            })
        ));
    }

    #[test]
    fn test_update_does_not_overwrite_unparsable_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("numbers.json");
        fs::write(&path, "[1, 2").unwrap();

        let file = AtomicFile::<Vec<u32>>::json(path.clone());
        let result = file.update(Vec::new(), |numbers| {
            numbers.push(3);
            Ok(())
        });

        assert!(matches!(result, Err(AtomicFileError::ParseError { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2");
        assert!(!temp_dir.path().join("numbers.lock").exists());
    }

    #[test]
    fn test_update() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Vec<u32>>::json(temp_dir.path().join("numbers.json"));

        file.update(Vec::new(), |numbers| {
            numbers.push(1);
            Ok(())
        })
        .unwrap();
        file.update(Vec::new(), |numbers| {
            numbers.push(2);
            Ok(())
        })
        .unwrap();

        assert_eq!(file.load().unwrap().unwrap(), vec![1, 2]);
        // lock file is cleaned up
        assert!(!temp_dir.path().join("numbers.lock").exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.toml");
        let file = AtomicFile::<TestRecord>::toml(file_path.clone());

        file.save(&TestRecord {
            name: "test".to_string(),
            count: 1,
        })
        .unwrap();

        assert!(!temp_dir.path().join(".test.toml.tmp").exists());
        assert!(file_path.exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a").join("b").join("rec.json");
        let file = AtomicFile::<Vec<u32>>::json(file_path.clone());

        file.save(&vec![7]).unwrap();
        assert!(file_path.exists());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Vec<u32>>::json(temp_dir.path().join("gone.json"));
        file.save(&vec![1]).unwrap();

        assert!(file.remove().unwrap());
        assert!(!file.remove().unwrap());
        assert!(!file.exists());
    }
}
