use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
///
/// `write_lock` serializes every store mutation (generation, task
/// lifecycle, roster/account/template edits). The store is rewritten
/// whole-file, so one writer at a time is the contract that keeps the
/// (persona, time block, date) dedup invariant safe under
/// double-submission.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}
