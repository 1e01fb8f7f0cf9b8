/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::version_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structure describing the version snapshot of a
    FlexGet daemon: control-plane API, running application,
    and newest known release.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for the JSON state shape.

  Operational Scope:
    Owned by the version store, read by the version view and
    emitted verbatim by `flexver --json`.

  Revision History:
    2025-11-12 COD  Introduced shared VersionInfo snapshot.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures for machine-readable output
============================================================*/

use serde::{Deserialize, Serialize};

/// Immutable snapshot of daemon version metadata.
///
/// Empty strings mean "unknown". Snapshots are replaced wholesale by the
/// store; fields are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub api: String,
    pub flexget: String,
    pub latest: String,
}

impl VersionInfo {
    pub fn new(
        api: impl Into<String>,
        flexget: impl Into<String>,
        latest: impl Into<String>,
    ) -> Self {
        Self {
            api: api.into(),
            flexget: flexget.into(),
            latest: latest.into(),
        }
    }

    /// Newest known release, if one is recorded.
    pub fn latest(&self) -> Option<&str> {
        if self.latest.is_empty() {
            None
        } else {
            Some(self.latest.as_str())
        }
    }
}
