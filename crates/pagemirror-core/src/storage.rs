//! Disk side of an asset download.
//!
//! The body is streamed into `<final>.part` and renamed to the final name only
//! once the transfer succeeded, so a failed download never leaves a truncated
//! file under the final name.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `logo.png` → `logo.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one asset file.
pub struct AssetFileWriter {
    writer: BufWriter<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl AssetFileWriter {
    /// Create the parent directory if needed and open `<final_path>.part` for writing.
    /// Truncates a leftover temp file from an earlier run.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Flush, close, and rename the temp file onto the final path (replacing any existing file).
    pub fn finalize(self) -> io::Result<PathBuf> {
        let Self {
            writer,
            temp_path,
            final_path,
        } = self;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        drop(file);
        fs::rename(&temp_path, &final_path)?;
        Ok(final_path)
    }

    /// Drop the partial download.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.writer);
        if let Err(e) = fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::debug!("could not remove {}: {}", temp_path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("logo.png"));
        assert_eq!(p.to_string_lossy(), "logo.png.part");
        let p2 = temp_path(Path::new("/tmp/css/site.css"));
        assert_eq!(p2.to_string_lossy(), "/tmp/css/site.css.part");
    }

    #[test]
    fn create_write_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("images").join("a.png");

        let mut w = AssetFileWriter::create(&final_path).unwrap();
        w.write_chunk(b"hello ").unwrap();
        w.write_chunk(b"world").unwrap();
        assert!(temp_path(&final_path).exists());
        assert!(!final_path.exists());

        let written = w.finalize().unwrap();
        assert_eq!(written, final_path);
        assert!(!temp_path(&final_path).exists());
        assert_eq!(fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn finalize_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("dup.css");
        fs::write(&final_path, b"old").unwrap();

        let mut w = AssetFileWriter::create(&final_path).unwrap();
        w.write_chunk(b"new").unwrap();
        w.finalize().unwrap();
        assert_eq!(fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn discard_removes_temp() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("js").join("app.js");
        let mut w = AssetFileWriter::create(&final_path).unwrap();
        w.write_chunk(b"partial").unwrap();
        w.discard();
        assert!(!temp_path(&final_path).exists());
        assert!(!final_path.exists());
    }
}
