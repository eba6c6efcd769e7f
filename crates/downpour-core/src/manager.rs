//! Download manager - the registry of active downloads
//!
//! Owns the map from source URL to current [`Download`] record, issues
//! transfer-engine operations, and applies the engine's asynchronous
//! progress/completion callbacks by atomically replacing records. One mutex
//! guards the whole map; critical sections are short and never span a
//! collaborator call.

use crate::engine::{TransferEngine, TransferEvents};
use crate::store::FileStore;
use downpour_types::{Download, DownloadEvent, ResumeToken};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};
use url::Url;

/// Registry of active downloads, keyed by the string form of the source URL.
///
/// At most one entry exists per source; an entry exists iff the download is
/// tracked (active or paused). Public operations are fire-and-issue and never
/// block on engine work. Engine callbacks arrive through the
/// [`TransferEvents`] impl, from the engine's own background context.
pub struct DownloadManager {
    downloads: Arc<Mutex<HashMap<String, Download>>>,
    engine: Arc<dyn TransferEngine>,
    store: Arc<dyn FileStore>,
    event_tx: broadcast::Sender<DownloadEvent>,
}

impl DownloadManager {
    pub fn new(engine: Arc<dyn TransferEngine>, store: Arc<dyn FileStore>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            downloads: Arc::new(Mutex::new(HashMap::new())),
            engine,
            store,
            event_tx,
        }
    }

    /// Subscribe to registry events.
    pub fn subscribe(&self) -> broadcast::Receiver<DownloadEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: DownloadEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Snapshot of all tracked downloads. No ordering guarantee.
    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().values().cloned().collect()
    }

    /// Current state of the download for `source`, if tracked.
    pub fn get(&self, source: &Url) -> Option<Download> {
        self.downloads.lock().get(source.as_str()).cloned()
    }

    /// Begin a transfer for `source` and track it as active with zero
    /// progress. A prior entry for the same source is cancelled and replaced,
    /// so its engine operation is never left orphaned.
    pub fn start(&self, source: Url, destination: PathBuf) {
        let previous = self.downloads.lock().remove(source.as_str());
        if let Some(prev) = previous {
            warn!(source = %source, "restarting tracked download, aborting prior transfer");
            if let Some(handle) = &prev.handle {
                self.engine.abort(handle);
            }
        }

        info!(source = %source, destination = %destination.display(), "starting download");
        let handle = self.engine.begin(&source);
        let download = Download::begun(source.clone(), destination, handle);
        let displaced = self
            .downloads
            .lock()
            .insert(source.as_str().to_owned(), download.clone());
        // A start racing on the same source may have inserted between the two
        // critical sections; the displaced transfer is aborted, not orphaned.
        if let Some(displaced) = displaced {
            if let Some(handle) = &displaced.handle {
                self.engine.abort(handle);
            }
        }
        self.emit(DownloadEvent::Started { download });
    }

    /// Ask the engine to suspend the transfer for `source`, producing resume
    /// data if it can. No-op unless the entry exists and is active.
    ///
    /// The registry flips to paused only when the engine's completion handler
    /// fires; until then readers still see the active entry.
    pub fn pause(&self, source: &Url) {
        let handle = {
            let downloads = self.downloads.lock();
            match downloads.get(source.as_str()) {
                Some(d) if d.active => d.handle.clone(),
                _ => return,
            }
        };
        let Some(handle) = handle else { return };

        info!(source = %source, "pausing download");
        let downloads = Arc::clone(&self.downloads);
        let event_tx = self.event_tx.clone();
        let key = source.as_str().to_owned();
        let source = source.clone();
        self.engine.abort_producing_resume_data(
            &handle,
            Box::new(move |token: Option<ResumeToken>| {
                let paused = {
                    let mut downloads = downloads.lock();
                    match downloads.get(&key) {
                        Some(current) => {
                            let paused = current.with_paused(token);
                            let resumable = paused.resume_token.is_some();
                            downloads.insert(key.clone(), paused);
                            Some(resumable)
                        }
                        // Cancelled or replaced in the meantime; drop the update.
                        None => None,
                    }
                };
                if let Some(resumable) = paused {
                    let _ = event_tx.send(DownloadEvent::Paused { source, resumable });
                }
            }),
        );
    }

    /// Restart the transfer for `source`: from its resume token when one is
    /// stored, otherwise fresh from the original URL. No-op if untracked.
    pub fn resume(&self, source: &Url) {
        let Some(current) = self.get(source) else {
            return;
        };

        let handle = match &current.resume_token {
            Some(token) => {
                info!(source = %source, "resuming download from resume data");
                self.engine.begin_from_resume_token(token)
            }
            None => {
                info!(source = %source, "no resume data, restarting download from scratch");
                self.engine.begin(source)
            }
        };

        // Cancelled while the engine call was in flight: the entry must not
        // be resurrected, and the fresh handle comes back out to be aborted.
        let unused_handle = {
            let mut downloads = self.downloads.lock();
            match downloads.get(source.as_str()) {
                Some(current) => {
                    let updated = current.with_resumed(handle);
                    downloads.insert(source.as_str().to_owned(), updated);
                    None
                }
                None => Some(handle),
            }
        };
        match unused_handle {
            None => self.emit(DownloadEvent::Resumed {
                source: source.clone(),
            }),
            Some(handle) => self.engine.abort(&handle),
        }
    }

    /// Abort the transfer for `source` and drop it from the registry
    /// immediately. No resume data is produced and no files are touched.
    /// No-op if untracked.
    pub fn cancel(&self, source: &Url) {
        let Some(download) = self.downloads.lock().remove(source.as_str()) else {
            return;
        };
        info!(source = %source, "cancelling download");
        if let Some(handle) = &download.handle {
            self.engine.abort(handle);
        }
        self.emit(DownloadEvent::Cancelled {
            source: source.clone(),
        });
    }

    /// Move the finished transfer into place. File-system failures here are
    /// swallowed: the download counts as finished either way, and the caller
    /// has no error channel for it. The warn logs are the only trace.
    fn finalize(&self, download: &Download, temp_path: &Path) {
        let destination = &download.destination;
        if let Err(e) = self.store.delete_if_exists(destination) {
            if !e.is_not_found() {
                warn!(destination = %destination.display(), error = %e, "could not clear destination");
            }
        }
        if let Err(e) = self.store.move_or_copy(temp_path, destination) {
            warn!(
                temp = %temp_path.display(),
                destination = %destination.display(),
                error = %e,
                "could not move finished download into place"
            );
        }
    }
}

impl TransferEvents for DownloadManager {
    fn on_progress(&self, source: &Url, bytes_transferred: u64, bytes_total: u64) {
        let applied = {
            let mut downloads = self.downloads.lock();
            match downloads.get(source.as_str()) {
                Some(current) => {
                    let updated = current.with_progress(bytes_transferred, bytes_total);
                    downloads.insert(source.as_str().to_owned(), updated);
                    true
                }
                // Already cancelled or completed; discard.
                None => false,
            }
        };
        if applied {
            self.emit(DownloadEvent::Progress {
                source: source.clone(),
                bytes_transferred,
                bytes_total,
            });
        }
    }

    fn on_finished(&self, source: &Url, temp_path: &Path) {
        let Some(download) = self.get(source) else {
            return;
        };

        info!(source = %source, "download finished, finalizing");
        self.finalize(&download, temp_path);

        // The entry goes away whether or not finalization succeeded.
        self.downloads.lock().remove(source.as_str());
        self.emit(DownloadEvent::Completed {
            source: source.clone(),
            destination: download.destination,
        });
    }
}
