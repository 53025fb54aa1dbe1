use std::error::Error;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_NAME: &str = "screen_monitor.log";
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
pub const LOG_BACKUPS: usize = 3;

/// Installs the console sink on stderr and, when `log_dir` is set, a
/// size-capped file sink at `<log_dir>/screen_monitor.log`.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_dir: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(false).with_writer(io::stderr);
    let file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let log = RotatingFile::open(dir.join(LOG_FILE_NAME), MAX_LOG_BYTES, LOG_BACKUPS)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(log)),
            )
        }
        None => None,
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}

/// Append-mode log file that rolls over before it would exceed `max_bytes`.
///
/// On rollover `name` becomes `name.1`, `name.1` becomes `name.2` and so on;
/// the oldest of `backups` files is overwritten.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: Option<File>,
    len: u64,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file: Some(file),
            len,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn roll_over(&mut self) -> io::Result<()> {
        // Closed first: renaming an open file fails on some platforms.
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        if self.backups == 0 {
            fs::remove_file(&self.path)?;
        } else {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }
        self.file = Some(open_append(&self.path)?);
        self.len = 0;
        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            self.file = Some(open_append(&self.path)?);
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file unavailable"))
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.len > 0 && self.len + buf.len() as u64 > self.max_bytes {
            self.roll_over()?;
        }
        let written = self.file()?.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::RotatingFile;
    use std::fs;
    use std::io::Write;

    #[test]
    fn rolls_over_and_keeps_bounded_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen_monitor.log");
        let mut log = RotatingFile::open(&path, 10, 2).unwrap();

        for line in ["first 01\n", "second 2\n", "third 03\n", "fourth 4\n"] {
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fourth 4\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("screen_monitor.log.1")).unwrap(),
            "third 03\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("screen_monitor.log.2")).unwrap(),
            "second 2\n"
        );
        assert!(!dir.path().join("screen_monitor.log.3").exists());
    }

    #[test]
    fn reopening_continues_from_existing_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen_monitor.log");
        fs::write(&path, "12345678").unwrap();

        let mut log = RotatingFile::open(&path, 10, 1).unwrap();
        log.write_all(b"abc\n").unwrap();
        log.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "abc\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("screen_monitor.log.1")).unwrap(),
            "12345678"
        );
    }

    #[test]
    fn oversized_single_write_is_kept_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen_monitor.log");
        let mut log = RotatingFile::open(&path, 4, 1).unwrap();
        log.write_all(b"longer than the limit\n").unwrap();
        log.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "longer than the limit\n");
    }
}
