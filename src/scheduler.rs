//! At-most-once-per-window task runner
//!
//! Each task name owns a status file `sched_<name>.json` and a lock file
//! next to it. The lock is taken without blocking: a caller that finds the
//! task already running gets `false` immediately instead of queueing.

use std::fmt::Display;
use std::fs::{File, OpenOptions, TryLockError};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::cache::key::sanitize_key;
use crate::clock::SharedClock;

/// Recorded state of one scheduled task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
    #[serde(default)]
    pub last_run: i64,
    #[serde(default)]
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ok: Option<i64>,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// Filesystem-backed scheduler
pub struct Scheduler {
    dir: PathBuf,
    clock: SharedClock,
}

impl Scheduler {
    pub fn new(dir: impl Into<PathBuf>, clock: SharedClock) -> Self {
        Self {
            dir: dir.into(),
            clock,
        }
    }

    fn status_path(&self, task: &str) -> PathBuf {
        let safe = sanitize_key(task);
        let safe = if safe.is_empty() { "task".to_string() } else { safe };
        self.dir.join(format!("sched_{}.json", safe))
    }

    /// Last recorded state of `task`, if it ever ran
    pub fn state(&self, task: &str) -> Option<ScheduleState> {
        let raw = std::fs::read(self.status_path(task)).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    /// Run `task` unless it ran less than `window_seconds` ago or is running
    /// elsewhere.
    ///
    /// Returns `true` when the task was executed, whatever its outcome. A
    /// task failure is recorded in the status file and never returned.
    pub async fn try_run<F, Fut, E>(&self, name: &str, window_seconds: u64, task: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: Display,
    {
        let status_path = self.status_path(name);
        let Some(lock) = self.try_lock(&status_path) else {
            return false;
        };

        let now = self.clock.now();
        let mut state = self.state(name).unwrap_or_default();
        let window = i64::try_from(window_seconds).unwrap_or(i64::MAX);
        if state.last_run > 0 && now.saturating_sub(state.last_run) < window {
            log::debug!("Task '{}' ran {}s ago, skipping", name, now - state.last_run);
            release(&lock);
            return false;
        }

        // Recorded before running so a crash mid-task still waits out the window
        state.last_run = now;
        state.running = true;
        self.write_state(&status_path, &state);
        let mut run = RunGuard {
            scheduler: self,
            path: status_path,
            state,
            lock,
        };

        match task().await {
            Ok(()) => {
                run.state.last_ok = Some(now);
                run.state.last_error = None;
            }
            Err(e) => {
                log::warn!("Scheduled task '{}' failed: {}", name, e);
                run.state.last_error = Some(e.to_string());
            }
        }
        true
    }

    fn try_lock(&self, status_path: &Path) -> Option<File> {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            log::warn!("Scheduler directory {} unavailable: {}", self.dir.display(), e);
            return None;
        }

        let mut lock_path = status_path.as_os_str().to_owned();
        lock_path.push(".lock");

        let file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Cannot open scheduler lock {:?}: {}", lock_path, e);
                return None;
            }
        };

        match file.try_lock() {
            Ok(()) => Some(file),
            Err(TryLockError::WouldBlock) => {
                log::debug!("Scheduler lock {:?} held elsewhere", lock_path);
                None
            }
            Err(TryLockError::Error(e)) => {
                log::warn!("Cannot lock {:?}: {}", lock_path, e);
                None
            }
        }
    }

    fn write_state(&self, path: &Path, state: &ScheduleState) {
        let result = (|| -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&self.dir)?;
            serde_json::to_writer(&mut tmp, state)?;
            tmp.flush()?;
            tmp.persist(path).map_err(|e| e.error)?;
            Ok(())
        })();
        if let Err(e) = result {
            log::warn!("Failed to record scheduler state {}: {}", path.display(), e);
        }
    }
}

/// An in-flight run. Dropping it clears `running` and releases the lock,
/// including when the task panics or the caller drops the future.
struct RunGuard<'a> {
    scheduler: &'a Scheduler,
    path: PathBuf,
    state: ScheduleState,
    lock: File,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.running = false;
        self.scheduler.write_state(&self.path, &self.state);
        release(&self.lock);
    }
}

fn release(lock: &File) {
    if let Err(e) = lock.unlock() {
        log::debug!("Failed to release scheduler lock: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn scheduler(dir: &TempDir) -> (Scheduler, ManualClock) {
        let clock = ManualClock::at(50_000);
        (Scheduler::new(dir.path(), Arc::new(clock.clone())), clock)
    }

    async fn ok_task(counter: &AtomicUsize) -> Result<(), String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    #[tokio::test]
    async fn test_runs_once_per_window() {
        let dir = TempDir::new().unwrap();
        let (scheduler, clock) = scheduler(&dir);
        let runs = AtomicUsize::new(0);

        assert!(scheduler.try_run("refresh", 60, || ok_task(&runs)).await);
        clock.advance(59);
        assert!(!scheduler.try_run("refresh", 60, || ok_task(&runs)).await);
        clock.advance(1);
        assert!(scheduler.try_run("refresh", 60, || ok_task(&runs)).await);

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_records_success() {
        let dir = TempDir::new().unwrap();
        let (scheduler, _clock) = scheduler(&dir);
        let runs = AtomicUsize::new(0);

        scheduler.try_run("refresh", 60, || ok_task(&runs)).await;

        let state = scheduler.state("refresh").unwrap();
        assert_eq!(state.last_run, 50_000);
        assert_eq!(state.last_ok, Some(50_000));
        assert!(!state.running);
        assert!(state.last_error.is_none());
        assert!(dir.path().join("sched_refresh.json").exists());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_and_swallowed() {
        let dir = TempDir::new().unwrap();
        let (scheduler, clock) = scheduler(&dir);

        let ran = scheduler
            .try_run("refresh", 60, || async { Err::<(), _>("remote down") })
            .await;
        assert!(ran);

        let state = scheduler.state("refresh").unwrap();
        assert_eq!(state.last_error.as_deref(), Some("remote down"));
        assert!(state.last_ok.is_none());
        assert!(!state.running);

        // A failed attempt still occupies the window
        clock.advance(30);
        let runs = AtomicUsize::new(0);
        assert!(!scheduler.try_run("refresh", 60, || ok_task(&runs)).await);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let dir = TempDir::new().unwrap();
        let (scheduler, clock) = scheduler(&dir);

        scheduler
            .try_run("t", 10, || async { Err::<(), _>("boom") })
            .await;
        clock.advance(10);
        let runs = AtomicUsize::new(0);
        scheduler.try_run("t", 10, || ok_task(&runs)).await;

        let state = scheduler.state("t").unwrap();
        assert!(state.last_error.is_none());
        assert_eq!(state.last_ok, Some(50_010));
    }

    #[tokio::test]
    async fn test_single_flight() {
        let dir = TempDir::new().unwrap();
        let (scheduler, _clock) = scheduler(&dir);

        let slow = || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<(), String>(())
        };

        let (a, b) = tokio::join!(
            scheduler.try_run("refresh", 0, slow),
            scheduler.try_run("refresh", 0, slow),
        );

        assert!(a ^ b, "exactly one call should run, got {} and {}", a, b);
    }

    #[tokio::test]
    async fn test_lock_released_after_run() {
        let dir = TempDir::new().unwrap();
        let (scheduler, _clock) = scheduler(&dir);
        let runs = AtomicUsize::new(0);

        assert!(scheduler.try_run("t", 0, || ok_task(&runs)).await);
        assert!(scheduler.try_run("t", 0, || ok_task(&runs)).await);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_task_names_are_sanitized() {
        let dir = TempDir::new().unwrap();
        let (scheduler, _clock) = scheduler(&dir);
        let runs = AtomicUsize::new(0);

        scheduler.try_run("refresh tagged/all", 60, || ok_task(&runs)).await;
        assert!(dir.path().join("sched_refresh_tagged_all.json").exists());
    }

    #[tokio::test]
    async fn test_cancelled_run_clears_running() {
        let dir = TempDir::new().unwrap();
        let (scheduler, clock) = scheduler(&dir);

        let hung = || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<(), String>(())
        };
        let outcome =
            tokio::time::timeout(Duration::from_millis(50), scheduler.try_run("t", 60, hung)).await;
        assert!(outcome.is_err());

        let state = scheduler.state("t").unwrap();
        assert!(!state.running);
        assert_eq!(state.last_run, 50_000);
        assert!(state.last_ok.is_none());

        // Lock was released with the dropped run
        clock.advance(60);
        let runs = AtomicUsize::new(0);
        assert!(scheduler.try_run("t", 60, || ok_task(&runs)).await);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_clears_running() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let handle = tokio::spawn(async move {
            let scheduler = Scheduler::new(path, Arc::new(ManualClock::at(50_000)));
            scheduler
                .try_run("t", 60, || async {
                    if true {
                        panic!("task blew up");
                    }
                    Ok::<(), String>(())
                })
                .await
        });
        assert!(handle.await.unwrap_err().is_panic());

        let (scheduler, _clock) = scheduler(&dir);
        let state = scheduler.state("t").unwrap();
        assert!(!state.running);
        assert_eq!(state.last_run, 50_000);
    }

    #[tokio::test]
    async fn test_unavailable_directory_skips() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();
        let scheduler = Scheduler::new(&blocker, Arc::new(ManualClock::at(1)));
        let runs = AtomicUsize::new(0);

        assert!(!scheduler.try_run("t", 60, || ok_task(&runs)).await);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
