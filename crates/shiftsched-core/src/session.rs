//! Run session ownership.
//!
//! A `Session` owns one run's cancellation flag for its lifetime. The
//! progress channel is supplied by the caller at [`Session::run`] rather
//! than owned here, so dropping the receiver's thread (e.g. the CLI's
//! NDJSON writer finishing) can never outlive the session that feeds it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::error::ShiftSchedResult;
use crate::progress::ProgressEvent;
use crate::solve::SolveConfig;
use crate::validate::ValidatedInput;

/// One run's handle: cancel it, or drive it to completion.
pub struct Session {
    cancel: Arc<AtomicBool>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cooperative cancellation. The search driver checks this
    /// between resolve iterations; it does not interrupt a solve already
    /// in progress.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// A clone of this session's cancellation flag, for handing to a
    /// Ctrl-C handler or another thread without sharing the `Session` itself.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run the search driver to completion on the calling thread, streaming
    /// progress events through `progress_tx`.
    pub fn run(
        &self,
        input: &ValidatedInput,
        progress_tx: Sender<ProgressEvent>,
    ) -> ShiftSchedResult<crate::aggregate::Schedule> {
        let config = SolveConfig {
            cancel: Arc::clone(&self.cancel),
            progress: Some(progress_tx),
        };
        crate::solve::solve(input, &config)
    }
}
