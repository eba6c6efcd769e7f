//! Downpour Core - download registry and state machine
//!
//! This crate tracks concurrent, resumable downloads by source URL. The
//! [`DownloadManager`] owns the registry and drives an external
//! [`TransferEngine`] (the thing that actually moves bytes) and a
//! [`FileStore`] (the thing that finalizes files on disk). Engine callbacks
//! may arrive from any background context; the registry stays consistent
//! behind a single lock.

mod engine;
mod error;
mod manager;
mod store;

pub use engine::*;
pub use error::*;
pub use manager::*;
pub use store::*;

pub use downpour_types::{Download, DownloadEvent, ResumeToken, TransferHandle};
