use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing_subscriber::{
    fmt::{writer::BoxMakeWriter, MakeWriter},
    EnvFilter,
};

use crate::error::{Error, Result};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "PLAINQR_LOG";

const DEFAULT_FILTER: &str = "warn,plainqr=info";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `plainqr.log` under the platform state directory, falling back to the
/// local data directory where there is no state directory (macOS, Windows).
pub fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .ok_or(Error::NoBaseDir("state"))?;
    Ok(dir.join("plainqr").join("plainqr.log"))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

// Log file handle, or stderr when the handle could not be cloned
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

// Writer that hands out clones of one append-mode file handle
struct FileMakeWriter(fs::File);

impl FileMakeWriter {
    fn writer(&self) -> FileOrStderr {
        self.0.try_clone().map(FileOrStderr::File).unwrap_or(FileOrStderr::Stderr)
    }
}

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer()
    }
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::OpenOptions::new().create(true).append(true).open(path)?)
}

/// Installs the global `tracing` subscriber.
pub fn init(target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    match &target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::File(path) => {
            let writer = BoxMakeWriter::new(FileMakeWriter(open_log_file(path)?));
            builder.with_writer(writer).with_ansi(false).init()
        }
    }

    if let LogTarget::File(path) = &target {
        tracing::debug!("plainqr logging to {}", path.display());
    }
    Ok(())
}
