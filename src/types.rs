//! Core types and events

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier of one of the concurrently running polling loops (0-based)
pub type LoopId = usize;

/// Coarse classification of an error that abandons a pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Unexpected API response (invalid JSON, missing `url`, unusable URL)
    Api,
    /// Connection failure, timeout or non-2xx status
    Network,
    /// Local filesystem failure (permissions, disk full)
    Filesystem,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Api => "api",
            FailureKind::Network => "network",
            FailureKind::Filesystem => "filesystem",
        };
        f.write_str(s)
    }
}

/// Event emitted by the runner
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An image was written to disk
    Downloaded {
        /// Loop that performed the download
        loop_id: LoopId,
        /// Category the tag belongs to
        category: String,
        /// Tag identifier as configured (prefix not stripped)
        tag: String,
        /// Destination file
        path: PathBuf,
        /// Number of bytes written
        bytes: u64,
    },
}
