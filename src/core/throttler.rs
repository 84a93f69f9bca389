use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

/// Leaky-bucket gate that coalesces update requests.
///
/// `call` schedules the wrapped action to run once the lock window elapses;
/// further calls inside the window collapse into that single execution.
/// `force_call` bypasses the window. The action never overlaps itself: a
/// trigger arriving while it executes sets a re-run flag that fires once the
/// in-flight execution completes.
pub struct UpdateThrottler {
    inner: Arc<Inner>,
}

struct Inner {
    lock_window: Duration,
    action: Box<dyn Fn() + Send + Sync>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    pending: bool,
    running: bool,
    rerun: bool,
    /// Bumped whenever a schedule is superseded so a stale timer thread
    /// wakes up to nothing.
    generation: u64,
}

impl UpdateThrottler {
    pub fn new(lock_window: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                lock_window,
                action: Box::new(action),
                state: Mutex::new(State::default()),
            }),
        }
    }

    #[must_use]
    pub fn lock_window(&self) -> Duration {
        self.inner.lock_window
    }

    /// Requests an execution after the lock window. Collapses with any
    /// already-pending request.
    pub fn call(&self) {
        let mut state = lock_state(&self.inner);
        if state.running {
            state.rerun = true;
            return;
        }
        if state.pending {
            return;
        }
        state.pending = true;
        state.generation = state.generation.wrapping_add(1);
        let generation = state.generation;
        drop(state);

        let inner = Arc::clone(&self.inner);
        thread::spawn(move || {
            thread::sleep(inner.lock_window);
            Inner::execute_if_current(&inner, generation);
        });
    }

    /// Executes immediately on the calling thread, superseding any queued
    /// window. Defers behind an in-flight execution instead of overlapping it.
    pub fn force_call(&self) {
        let mut state = lock_state(&self.inner);
        if state.running {
            state.rerun = true;
            return;
        }
        state.pending = false;
        state.generation = state.generation.wrapping_add(1);
        state.running = true;
        drop(state);

        Inner::run_to_completion(&self.inner);
    }

    /// Whether a delayed execution is currently scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock_state(&self.inner).pending
    }
}

impl Inner {
    fn execute_if_current(inner: &Arc<Inner>, generation: u64) {
        {
            let mut state = lock_state(inner);
            if !state.pending || state.generation != generation {
                return;
            }
            state.pending = false;
            state.running = true;
        }
        Self::run_to_completion(inner);
    }

    /// Runs the action, then re-runs it while triggers arrived mid-execution.
    /// Entered with `running` already set.
    fn run_to_completion(inner: &Arc<Inner>) {
        loop {
            (inner.action)();
            let mut state = lock_state(inner);
            if state.rerun {
                state.rerun = false;
                continue;
            }
            state.running = false;
            return;
        }
    }
}

fn lock_state(inner: &Inner) -> std::sync::MutexGuard<'_, State> {
    inner.state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for UpdateThrottler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock_state(&self.inner);
        f.debug_struct("UpdateThrottler")
            .field("lock_window", &self.inner.lock_window)
            .field("pending", &state.pending)
            .field("running", &state.running)
            .finish()
    }
}
