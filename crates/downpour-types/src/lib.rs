//! Shared types for Downpour
//!
//! This crate contains the data structures shared between the core library
//! and anything embedding it: the immutable [`Download`] record, the opaque
//! engine handle and resume token, and the event payloads broadcast by the
//! manager.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

// ============================================================================
// Opaque engine state
// ============================================================================

/// Opaque reference to an in-flight transfer-engine operation.
///
/// Handles are minted by engine implementations and mean nothing outside the
/// engine that issued them. A handle stays attached to its [`Download`] even
/// after the underlying operation has been suspended; callers must not hand
/// it back to the engine once a pause has been requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferHandle(u64);

impl TransferHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque blob allowing a suspended transfer to continue without restarting
/// from byte zero. Produced by the engine on pause, consumed on resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeToken(Vec<u8>);

impl ResumeToken {
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ResumeToken {
    fn from(data: &[u8]) -> Self {
        Self(data.to_vec())
    }
}

// ============================================================================
// Download record
// ============================================================================

/// One logical download attempt at a point in time.
///
/// `Download` is an immutable value: state changes go through the `with_*`
/// methods, each returning a new record. The registry replaces whole entries,
/// so concurrent readers never observe a half-applied transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Download {
    /// Remote resource this download fetches.
    pub source: Url,
    /// Local path the finished file is moved to.
    pub destination: PathBuf,
    /// True while a transfer is in flight.
    pub active: bool,
    /// Engine operation reference; present once a transfer was started.
    #[serde(skip)]
    pub handle: Option<TransferHandle>,
    /// Resume data from the last pause, when the engine produced any.
    #[serde(skip)]
    pub resume_token: Option<ResumeToken>,
    pub bytes_transferred: u64,
    /// Expected total size; 0 means the size is not yet known.
    pub bytes_total: u64,
}

impl Download {
    /// An idle record with no transfer attached.
    pub fn new(source: Url, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            active: false,
            handle: None,
            resume_token: None,
            bytes_transferred: 0,
            bytes_total: 0,
        }
    }

    /// A freshly started download: active, zero progress, no resume data.
    pub fn begun(source: Url, destination: PathBuf, handle: TransferHandle) -> Self {
        Self {
            source,
            destination,
            active: true,
            handle: Some(handle),
            resume_token: None,
            bytes_transferred: 0,
            bytes_total: 0,
        }
    }

    /// Copy with updated byte counts. Values are taken as delivered by the
    /// engine; nothing enforces that they grow monotonically.
    pub fn with_progress(&self, transferred: u64, total: u64) -> Self {
        Self {
            bytes_transferred: transferred,
            bytes_total: total,
            ..self.clone()
        }
    }

    /// Copy in the paused state. The stale handle is kept as-is; the token is
    /// whatever the engine managed to produce, possibly nothing.
    pub fn with_paused(&self, resume_token: Option<ResumeToken>) -> Self {
        Self {
            active: false,
            resume_token,
            ..self.clone()
        }
    }

    /// Copy made active again under a freshly issued handle.
    pub fn with_resumed(&self, handle: TransferHandle) -> Self {
        Self {
            active: true,
            handle: Some(handle),
            ..self.clone()
        }
    }

    /// Fraction of the transfer completed, 0.0 when the size is unknown.
    pub fn progress_fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            0.0
        } else {
            self.bytes_transferred as f64 / self.bytes_total as f64
        }
    }
}

// ============================================================================
// Event types
// ============================================================================

/// Events broadcast by the manager after each registry mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum DownloadEvent {
    Started {
        download: Download,
    },
    Progress {
        source: Url,
        bytes_transferred: u64,
        bytes_total: u64,
    },
    Paused {
        source: Url,
        resumable: bool,
    },
    Resumed {
        source: Url,
    },
    Completed {
        source: Url,
        destination: PathBuf,
    },
    Cancelled {
        source: Url,
    },
}
