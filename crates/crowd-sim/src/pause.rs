//! Pause gate between ticks.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

/// Cloneable handle that pauses and resumes a running [`Sim`](crate::Sim).
///
/// The tick controller checks the gate before each tick, so a pause takes
/// effect at the next tick boundary and never interrupts a tick.
#[derive(Clone, Debug, Default)]
pub struct PauseControl {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl PauseControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pause(&self) {
        self.set(true);
    }

    pub fn resume(&self) {
        self.set(false);
    }

    pub fn is_paused(&self) -> bool {
        let (lock, _) = &*self.state;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the calling thread until the gate is open.
    pub fn wait_while_paused(&self) {
        let (lock, signal) = &*self.state;
        let paused = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _open = signal
            .wait_while(paused, |paused| *paused)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn set(&self, paused: bool) {
        let (lock, signal) = &*self.state;
        let mut state = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != paused {
            *state = paused;
            signal.notify_all();
        }
    }
}
