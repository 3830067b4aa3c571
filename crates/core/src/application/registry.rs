// Execution Registry - per-hook running flag, start time and output buffer

use crate::application::error::TriggerError;
use crate::application::tail_buffer::TailBuffer;
use crate::domain::{ExecutionSnapshot, HookId};
use crate::port::TimeProvider;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

/// Mutable state of one hook, guarded by its own lock
pub struct ExecutionState {
    inner: Mutex<StateInner>,
}

struct StateInner {
    running: bool,
    last_started: Option<DateTime<Utc>>,
    output: TailBuffer,
}

impl ExecutionState {
    fn new(tail_lines: usize) -> Self {
        Self {
            inner: Mutex::new(StateInner {
                running: false,
                last_started: None,
                output: TailBuffer::new(tail_lines),
            }),
        }
    }

    // A panic while holding the lock cannot leave the fields half-updated
    // (every mutation is a single assignment or push), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        let inner = self.lock();
        ExecutionSnapshot {
            running: inner.running,
            last_started: inner.last_started,
            lines: inner.output.to_vec(),
        }
    }

    /// Append one output line, evicting the oldest beyond capacity
    pub fn push_line(&self, line: String) {
        self.lock().output.push(line);
    }

    fn try_mark_running(&self, now: DateTime<Utc>) -> bool {
        let mut inner = self.lock();
        if inner.running {
            return false;
        }
        inner.running = true;
        inner.last_started = Some(now);
        true
    }

    fn mark_finished(&self) {
        self.lock().running = false;
    }
}

/// Proof that a run was started; releases the running flag when dropped
///
/// Dropping happens on every exit path of the run task, including unwinding,
/// so the flag cannot stay set after the run is over.
#[must_use = "dropping the guard immediately marks the hook as finished"]
pub struct RunGuard {
    hook_id: HookId,
    state: Arc<ExecutionState>,
}

impl RunGuard {
    pub fn hook_id(&self) -> &str {
        &self.hook_id
    }

    /// Mark the run as finished
    pub fn finish(self) {
        drop(self);
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.mark_finished();
        debug!(hook_id = %self.hook_id, "Run finished, hook released");
    }
}

/// Registry of execution states keyed by hook id
pub struct ExecutionRegistry {
    states: RwLock<HashMap<HookId, Arc<ExecutionState>>>,
    tail_lines: usize,
    time_provider: Arc<dyn TimeProvider>,
}

impl ExecutionRegistry {
    /// Create an empty registry
    ///
    /// # Arguments
    /// * `tail_lines` - Capacity of every hook's output buffer
    /// * `time_provider` - Clock used for `last_started`
    pub fn new(tail_lines: usize, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            tail_lines,
            time_provider,
        }
    }

    /// State for `hook_id` if it was ever referenced
    pub fn get(&self, hook_id: &str) -> Option<Arc<ExecutionState>> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hook_id)
            .cloned()
    }

    /// State for `hook_id`, created empty and idle on first access
    pub fn get_or_create(&self, hook_id: &str) -> Arc<ExecutionState> {
        if let Some(state) = self.get(hook_id) {
            return state;
        }

        // Re-checked under the write lock: another caller may have created it
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(states.entry(hook_id.to_string()).or_insert_with(|| {
            debug!(hook_id = %hook_id, tail_lines = self.tail_lines, "Creating execution state");
            Arc::new(ExecutionState::new(self.tail_lines))
        }))
    }

    /// Atomically claim the hook for a new run
    ///
    /// # Errors
    /// - TriggerError::Busy if a run is already in progress (nothing changes)
    pub fn try_start(&self, hook_id: &str) -> Result<RunGuard, TriggerError> {
        let state = self.get_or_create(hook_id);
        if !state.try_mark_running(self.time_provider.now()) {
            return Err(TriggerError::Busy(hook_id.to_string()));
        }

        Ok(RunGuard {
            hook_id: hook_id.to_string(),
            state,
        })
    }

    /// Release a hook claimed by `try_start`
    pub fn finish(&self, guard: RunGuard) {
        guard.finish();
    }

    /// Number of hooks with state
    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::time_provider::mocks::SteppingTimeProvider;
    use crate::port::SystemTimeProvider;

    fn registry(tail_lines: usize) -> ExecutionRegistry {
        ExecutionRegistry::new(tail_lines, Arc::new(SystemTimeProvider))
    }

    #[test]
    fn test_get_or_create_returns_same_state() {
        let registry = registry(10);

        let a = registry.get_or_create("hook");
        let b = registry.get_or_create("hook");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_fresh_state_is_idle_and_empty() {
        let registry = registry(10);
        let snapshot = registry.get_or_create("hook").snapshot();

        assert!(!snapshot.running);
        assert!(snapshot.last_started.is_none());
        assert!(snapshot.lines.is_empty());
    }

    #[test]
    fn test_get_unknown_hook_is_none() {
        let registry = registry(10);
        assert!(registry.get("missing").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_second_try_start_is_busy() {
        let registry = registry(10);

        let guard = registry.try_start("hook").unwrap();
        let second = registry.try_start("hook");

        assert_eq!(second.err(), Some(TriggerError::Busy("hook".to_string())));
        assert!(registry.get("hook").unwrap().is_running());

        registry.finish(guard);
        assert!(!registry.get("hook").unwrap().is_running());
        assert!(registry.try_start("hook").is_ok());
    }

    #[test]
    fn test_busy_leaves_last_started_untouched() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let registry = ExecutionRegistry::new(
            10,
            Arc::new(SteppingTimeProvider::starting_at(start)),
        );

        let _guard = registry.try_start("hook").unwrap();
        let first = registry.get("hook").unwrap().snapshot().last_started;
        let _ = registry.try_start("hook");
        let after = registry.get("hook").unwrap().snapshot().last_started;

        assert_eq!(first, Some(start));
        assert_eq!(first, after);
    }

    #[test]
    fn test_distinct_hooks_run_independently() {
        let registry = registry(10);

        let _a = registry.try_start("a").unwrap();
        let _b = registry.try_start("b").unwrap();

        assert!(registry.get("a").unwrap().is_running());
        assert!(registry.get("b").unwrap().is_running());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let registry = Arc::new(registry(10));
        let reg = Arc::clone(&registry);

        let result = std::thread::spawn(move || {
            let _guard = reg.try_start("hook").unwrap();
            panic!("run blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!registry.get("hook").unwrap().is_running());
    }

    #[test]
    fn test_concurrent_try_start_admits_exactly_one() {
        let registry = Arc::new(registry(10));
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    // Keep the guard alive so losers see the flag set
                    registry.try_start("hook").ok().map(std::mem::forget).is_some()
                })
            })
            .collect();

        let started = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|started| *started)
            .count();

        assert_eq!(started, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_output_buffer_uses_configured_capacity() {
        let registry = registry(2);
        let state = registry.get_or_create("hook");
        for line in ["one", "two", "three"] {
            state.push_line(line.to_string());
        }

        assert_eq!(state.snapshot().lines, vec!["two", "three"]);
    }
}
