/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise FlexVer error types to provide consistent
    diagnostics and exit semantics for the binary surface.

  Security / Safety Notes:
    Error contexts expose endpoints and paths only; response
    bodies are never echoed back to the operator.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used by configuration, fetch, and comparator modules. The
    reducer and view never produce errors.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for FlexVer operations.
pub type Result<T> = std::result::Result<T, FlexverError>;

/// Enumerates high-level error domains surfaced by FlexVer.
#[derive(Debug, Error)]
pub enum FlexverError {
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Version `{input}` is not a semantic version: {reason}")]
    Version { input: String, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl FlexverError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            FlexverError::Config(_) => 20,
            FlexverError::Network(_) => 30,
            FlexverError::Serialization(_) => 31,
            FlexverError::Filesystem(_) => 40,
            FlexverError::Io(_) => 41,
            FlexverError::Version { .. } => 60,
        }
    }
}
