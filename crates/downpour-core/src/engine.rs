//! Transfer-engine seam
//!
//! The actual byte transfer lives behind [`TransferEngine`]; the core only
//! issues operations and reacts to the events the engine delivers back
//! through [`TransferEvents`]. Engines drive those events from their own
//! background context, concurrently with caller-initiated operations.

use downpour_types::{ResumeToken, TransferHandle};
use std::path::Path;
use url::Url;

/// Completion handler for a pause request. Invoked by the engine, on its own
/// context, once the operation has been suspended; carries whatever resume
/// data the engine could produce.
pub type PauseCallback = Box<dyn FnOnce(Option<ResumeToken>) + Send + 'static>;

/// External service performing the network transfer.
///
/// All methods are fire-and-issue: they register the request with the engine
/// and return without blocking on network activity.
pub trait TransferEngine: Send + Sync {
    /// Begin a fresh transfer and return its handle.
    fn begin(&self, source: &Url) -> TransferHandle;

    /// Continue an earlier transfer from its resume data.
    fn begin_from_resume_token(&self, token: &ResumeToken) -> TransferHandle;

    /// Suspend the operation, producing resume data if possible. The handle
    /// must not be used again after this call.
    fn abort_producing_resume_data(&self, handle: &TransferHandle, on_suspended: PauseCallback);

    /// Abort the operation outright; no resume data is produced.
    fn abort(&self, handle: &TransferHandle);
}

/// Events an engine delivers while transfers run. Implemented by the
/// manager; engines call these from their background context.
pub trait TransferEvents: Send + Sync {
    /// Byte counts observed for `source`. `bytes_total` is 0 while the size
    /// is unknown.
    fn on_progress(&self, source: &Url, bytes_transferred: u64, bytes_total: u64);

    /// The transfer for `source` finished; its bytes sit at `temp_path`
    /// awaiting finalization.
    fn on_finished(&self, source: &Url, temp_path: &Path);
}
