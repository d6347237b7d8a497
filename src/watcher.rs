//! Input file watcher for `patch --watch`
//!
//! Watches the directories containing the inputs and reports which input was
//! modified, debounced per file. Writes to the patched siblings are ignored.

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::time::{Duration, Instant};

/// Debounce window in milliseconds
const DEBOUNCE_MS: u128 = 200;

/// Watches a fixed set of input files
pub struct InputWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<PathBuf>,
    /// Canonical path -> path as given on the command line
    inputs: HashMap<PathBuf, PathBuf>,
    last_event: HashMap<PathBuf, Instant>,
}

impl InputWatcher {
    /// Create a watcher for `paths`
    pub fn new(paths: &[PathBuf]) -> notify::Result<Self> {
        let mut inputs = HashMap::new();
        for path in paths {
            let canonical = path.canonicalize().map_err(notify::Error::io)?;
            inputs.insert(canonical, path.clone());
        }

        let (tx, rx) = channel();
        let watched: HashSet<PathBuf> = inputs.keys().cloned().collect();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
            if let Ok(event) = res {
                if event.kind.is_modify() || event.kind.is_create() {
                    for path in &event.paths {
                        if watched.contains(path) {
                            let _ = tx.send(path.clone());
                        }
                    }
                }
            }
        })?;

        let dirs: HashSet<&Path> = inputs.keys().filter_map(|p| p.parent()).collect();
        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            log::info!("Watching {:?} for changes", dir);
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            inputs,
            last_event: HashMap::new(),
        })
    }

    /// Wait up to `timeout` for a modified input
    pub fn wait(&mut self, timeout: Duration) -> Option<PathBuf> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(path) => {
                    if let Some(input) = self.accept(path, Instant::now()) {
                        return Some(input);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    /// Map an event path back to its input, dropping events inside the debounce window
    fn accept(&mut self, path: PathBuf, now: Instant) -> Option<PathBuf> {
        let input = self.inputs.get(&path)?.clone();
        if let Some(last) = self.last_event.get(&path) {
            if now.duration_since(*last).as_millis() < DEBOUNCE_MS {
                return None; // Skip this event, too soon after last one
            }
        }
        self.last_event.insert(path, now);
        Some(input)
    }
}
