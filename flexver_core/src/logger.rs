/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging for FlexVer
    sessions: fetch attempts, dispatched actions, renders.

  Security / Safety Notes:
    Only action tags and endpoints are logged; payload bodies
    from the daemon are never written.

  Dependencies:
    chrono for UTC stamps, sha2 for the session digest.

  Operational Scope:
    Used by the composition root and the store to emit RFC-3339
    UTC stamped entries and produce session hash digests.

  Revision History:
    2025-11-12 COD  Carried logging module into FlexVer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{FlexverError, Result};

/// Structured log level for FlexVer events.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Warnings and errors always reach stderr.
    fn always_echoed(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

/// Session logger that emits append-only `stamp [LEVEL] [CODE] message` lines.
pub struct Logger {
    sink: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger that writes to stderr and optionally to a file.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_append(file_path)?))),
            None => None,
        };
        Ok(Self {
            sink,
            path,
            verbose,
        })
    }

    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let line = format_entry(&stamp, level, code, message.as_ref());

        if self.verbose || level.always_echoed() {
            eprintln!("{line}");
        }

        let Some(sink) = &self.sink else {
            return;
        };
        let Ok(mut writer) = sink.lock() else {
            return;
        };
        let written = writeln!(writer, "{line}").and_then(|_| writer.flush());
        if let Err(err) = written {
            eprintln!(
                "{}",
                format_entry(&stamp, LogLevel::Error, "LOGGER", &format!("Log write failed: {err}"))
            );
        }
    }

    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a `sha256sum`-compatible digest of the log next to it (`<log>.hash`).
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let data = std::fs::read(path).map_err(|err| {
            fs_error(format!("Failed to read log for hashing {}", path.display()), err)
        })?;
        let digest = Sha256::digest(&data);
        let hash_path = digest_path(path);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        std::fs::write(&hash_path, format!("{digest:x}  {name}\n")).map_err(|err| {
            fs_error(format!("Failed to write hash file {}", hash_path.display()), err)
        })
    }
}

fn format_entry(stamp: &str, level: LogLevel, code: &str, message: &str) -> String {
    format!("{stamp} [{}] [{code}] {message}", level.label())
}

fn digest_path(log: &Path) -> PathBuf {
    let mut name = log.as_os_str().to_os_string();
    name.push(".hash");
    PathBuf::from(name)
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            fs_error(format!("Failed to create log directory {}", parent.display()), err)
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| fs_error(format!("Failed to open log file {}", path.display()), err))
}

fn fs_error(context: String, err: std::io::Error) -> FlexverError {
    FlexverError::Filesystem(format!("{context}: {err}"))
}
