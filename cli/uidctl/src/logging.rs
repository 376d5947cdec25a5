//! Logging initialization.
//!
//! Events go to two places: a JSON log file that rotates by size, and a
//! compact stderr stream whose level follows `-v`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file writer that rotates at a maximum size.
///
/// On rotation `app.log` becomes `app.log.1`, `app.log.1` becomes
/// `app.log.2`, and so on; the oldest backup is dropped. With zero backups
/// the file is truncated instead.
struct RotatingFileWriter {
    path: PathBuf,
    file: File,
    bytes_written: u64,
    max_bytes: u64,
    backups: usize,
}

impl RotatingFileWriter {
    fn open(path: &Path, max_bytes: u64, backups: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let bytes_written = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            bytes_written,
            max_bytes,
            backups,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups > 0 {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.bytes_written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.bytes_written > 0 && self.bytes_written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }

        self.file.write_all(buf)?;
        self.bytes_written += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Thread-safe writer handle.
#[derive(Clone)]
struct SharedWriter(Arc<Mutex<RotatingFileWriter>>);

impl SharedWriter {
    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, RotatingFileWriter>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Flushes the log file when dropped.
pub struct LogGuard {
    writer: Option<SharedWriter>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}

/// Where and how much to log.
pub struct LogSettings<'a> {
    /// Log file, or `None` to log to stderr only.
    pub file: Option<&'a Path>,
    pub max_bytes: u64,
    pub backups: usize,
    /// Number of `-v` flags.
    pub verbosity: u8,
}

fn stderr_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Initialize logging. Call once, at startup; keep the guard alive until
/// shutdown.
pub fn init(settings: &LogSettings<'_>) -> anyhow::Result<LogGuard> {
    let writer = settings
        .file
        .map(|path| RotatingFileWriter::open(path, settings.max_bytes, settings.backups))
        .transpose()?
        .map(|w| SharedWriter(Arc::new(Mutex::new(w))));

    let file_layer = writer.clone().map(|writer| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(filter)
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_filter(stderr_level(settings.verbosity));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(LogGuard { writer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rotating_writer_rotates_at_max_size() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = RotatingFileWriter::open(&path, 100, 2).unwrap();
        writer.write_all(&[b'a'; 60]).unwrap();
        writer.write_all(&[b'b'; 60]).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![b'b'; 60]);
        assert_eq!(fs::read(dir.path().join("test.log.1")).unwrap(), vec![b'a'; 60]);
    }

    #[test]
    fn test_rotating_writer_drops_oldest_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = RotatingFileWriter::open(&path, 10, 2).unwrap();
        for byte in [b'a', b'b', b'c', b'd'] {
            writer.write_all(&[byte; 8]).unwrap();
        }
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![b'd'; 8]);
        assert_eq!(fs::read(dir.path().join("test.log.1")).unwrap(), vec![b'c'; 8]);
        assert_eq!(fs::read(dir.path().join("test.log.2")).unwrap(), vec![b'b'; 8]);
        assert!(!dir.path().join("test.log.3").exists());
    }

    #[test]
    fn test_rotating_writer_without_backups_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = RotatingFileWriter::open(&path, 10, 0).unwrap();
        writer.write_all(&[b'a'; 8]).unwrap();
        writer.write_all(&[b'b'; 8]).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![b'b'; 8]);
        assert!(!dir.path().join("test.log.1").exists());
    }

    #[test]
    fn test_rotating_writer_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");
        fs::write(&path, [b'x'; 95]).unwrap();

        let mut writer = RotatingFileWriter::open(&path, 100, 1).unwrap();
        writer.write_all(&[b'y'; 10]).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap(), vec![b'y'; 10]);
        assert_eq!(fs::read(dir.path().join("test.log.1")).unwrap().len(), 95);
    }

    #[test]
    fn test_oversized_write_goes_to_fresh_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.log");

        let mut writer = RotatingFileWriter::open(&path, 10, 1).unwrap();
        writer.write_all(&[b'z'; 25]).unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read(&path).unwrap().len(), 25);
    }

    #[test]
    fn test_stderr_level() {
        assert_eq!(stderr_level(0), LevelFilter::WARN);
        assert_eq!(stderr_level(1), LevelFilter::INFO);
        assert_eq!(stderr_level(5), LevelFilter::DEBUG);
    }
}
