//! Fixed-window request limiter
//!
//! One counter file per (group, client) at `<dir>/<group>/<client>.json`
//! holding `{"window_start": <unix secs>, "count": <n>}`. Each check holds an
//! exclusive lock on that file while it reads, decides and rewrites, so counts
//! are exact per key across processes.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cache::key::sanitize_key;
use crate::clock::SharedClock;
use crate::config::{RateLimitSettings, StorageFailureMode};

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub retry_after: u64,
}

/// Persisted window state
#[derive(Debug, Default, Serialize, Deserialize)]
struct WindowState {
    #[serde(default)]
    window_start: i64,
    #[serde(default)]
    count: u32,
}

/// Filesystem-backed fixed-window limiter.
///
/// When the counter file cannot be opened, locked or written the limiter
/// applies `on_storage_error`, which defaults to failing open.
pub struct WindowLimiter {
    dir: PathBuf,
    window_seconds: i64,
    max_requests: u32,
    on_storage_error: StorageFailureMode,
    clock: SharedClock,
}

impl WindowLimiter {
    pub fn new(
        dir: impl Into<PathBuf>,
        window_seconds: u64,
        max_requests: u32,
        clock: SharedClock,
    ) -> Self {
        Self {
            dir: dir.into(),
            window_seconds: i64::try_from(window_seconds).unwrap_or(i64::MAX),
            max_requests,
            on_storage_error: StorageFailureMode::FailOpen,
            clock,
        }
    }

    pub fn from_settings(
        dir: impl Into<PathBuf>,
        settings: &RateLimitSettings,
        clock: SharedClock,
    ) -> Self {
        Self::new(dir, settings.window_seconds, settings.max_requests, clock)
            .on_storage_error(settings.on_storage_error)
    }

    pub fn on_storage_error(mut self, mode: StorageFailureMode) -> Self {
        self.on_storage_error = mode;
        self
    }

    /// Count one request for `client_id` in `group` and decide admission.
    ///
    /// Blocks while another process holds the same counter file.
    pub fn allow(&self, group: &str, client_id: &str) -> RateDecision {
        match self.try_allow(group, client_id) {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!(
                    "Rate limiter storage unavailable for {}/{} ({:?}): {}",
                    group,
                    client_id,
                    self.on_storage_error,
                    e
                );
                self.storage_failure_decision()
            }
        }
    }

    fn storage_failure_decision(&self) -> RateDecision {
        match self.on_storage_error {
            StorageFailureMode::FailOpen => RateDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests.saturating_sub(1),
                retry_after: 0,
            },
            StorageFailureMode::FailClosed => RateDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                retry_after: self.window_seconds.max(1) as u64,
            },
        }
    }

    fn counter_path(&self, group: &str, client_id: &str) -> PathBuf {
        self.dir
            .join(sanitize_key(group))
            .join(format!("{}.json", sanitize_key(client_id)))
    }

    fn try_allow(&self, group: &str, client_id: &str) -> io::Result<RateDecision> {
        let path = self.counter_path(group, client_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        file.lock()?;
        let result = self.decide_locked(&mut file);
        if let Err(e) = file.unlock() {
            log::debug!("Failed to unlock {}: {}", path.display(), e);
        }
        result
    }

    fn decide_locked(&self, file: &mut File) -> io::Result<RateDecision> {
        let mut raw = String::new();
        file.read_to_string(&mut raw)?;
        let mut state: WindowState = serde_json::from_str(&raw).unwrap_or_default();

        let now = self.clock.now();
        // A clock behind the window start counts as the window start
        let mut elapsed = now.saturating_sub(state.window_start).max(0);
        if elapsed >= self.window_seconds {
            state = WindowState {
                window_start: now,
                count: 0,
            };
            elapsed = 0;
        }

        let remaining_window = self.window_seconds.saturating_sub(elapsed);
        let decision = if state.count >= self.max_requests {
            RateDecision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                retry_after: remaining_window.max(1) as u64,
            }
        } else {
            state.count += 1;
            RateDecision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests.saturating_sub(state.count),
                retry_after: remaining_window.max(0) as u64,
            }
        };

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        serde_json::to_writer(&mut *file, &state)?;
        file.flush()?;

        Ok(decision)
    }
}
