//! Primitives the sink needs from its host runtime.
//!
//! A [`Platform`] bundles the write lock, the cross-context signal and the task services.
//! [`StdPlatform`] implements them on top of `std` threads.

use crate::{config::Config, error::Error};
use core::time::Duration;
#[cfg(feature = "std")]
use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    thread,
};

pub(crate) mod atomic {
    #[cfg(not(feature = "portable-atomic"))]
    pub use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    #[cfg(feature = "portable-atomic")]
    pub use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
}

/// Counting signal that can be given from both task and interrupt context.
///
/// Every [`give`](Signal::give) allows exactly one [`take`](Signal::take) to return.
pub trait Signal: Send + Sync {
    /// Signal with no pending gives.
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self;

    fn give(&self);
    /// Interrupt-safe variant of [`give`](Signal::give).
    ///
    /// Returns `true` if a task with higher priority than the interrupted one was woken.
    fn give_from_isr(&self) -> bool;

    /// Blocks until the signal is given.
    fn take(&self);
    fn try_take(&self) -> bool;
}

/// Blocking mutual exclusion, released when the guard is dropped.
pub trait Lock: Send + Sync {
    type Guard<'a>
    where
        Self: 'a;

    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self;

    fn lock(&self) -> Self::Guard<'_>;
}

/// Host runtime.
pub trait Platform: 'static {
    type Signal: Signal;
    type Lock: Lock;

    /// Creates the task running `body` with the name, stack size and priority from `config`.
    fn spawn<F: FnOnce() + Send + 'static>(config: &Config, body: F) -> Result<(), Error>;

    /// Gives up the processor for a short while.
    ///
    /// Used between checks of a busy slot, so it must let lower-priority tasks run (one tick delay).
    fn relax();
    fn sleep(duration: Duration);

    /// Requests a context switch on interrupt return if `woken` is `true`.
    fn yield_from_isr(woken: bool);
}

#[cfg(feature = "std")]
struct SignalState {
    count: usize,
    waiters: usize,
}

#[cfg(feature = "std")]
pub struct StdSignal {
    state: Mutex<SignalState>,
    condvar: Condvar,
}

#[cfg(feature = "std")]
impl StdSignal {
    fn state(&self) -> MutexGuard<'_, SignalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gives the signal returning whether a thread was parked in [`take`](Signal::take).
    fn give_woken(&self) -> bool {
        let mut state = self.state();
        state.count += 1;
        let woken = state.waiters > 0;
        drop(state);
        self.condvar.notify_one();
        woken
    }
}

#[cfg(feature = "std")]
impl Signal for StdSignal {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self {
        state: Mutex::new(SignalState { count: 0, waiters: 0 }),
        condvar: Condvar::new(),
    };

    fn give(&self) {
        self.give_woken();
    }
    fn give_from_isr(&self) -> bool {
        self.give_woken()
    }

    fn take(&self) {
        let mut state = self.state();
        state.waiters += 1;
        while state.count == 0 {
            state = self.condvar.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.waiters -= 1;
        state.count -= 1;
    }
    fn try_take(&self) -> bool {
        let mut state = self.state();
        if state.count > 0 {
            state.count -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdSignal {
    fn default() -> Self {
        Self::INIT
    }
}

/// Poison-tolerant mutex: a producer panicking inside [`Sink::write`](crate::Sink::write) leaves the store consistent.
#[cfg(feature = "std")]
pub struct StdLock(Mutex<()>);

#[cfg(feature = "std")]
impl Lock for StdLock {
    type Guard<'a> = MutexGuard<'a, ()>;

    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self(Mutex::new(()));

    fn lock(&self) -> Self::Guard<'_> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(feature = "std")]
pub struct StdPlatform;

/// Stack size floor for the drain thread, `Config` defaults are sized for microcontrollers.
#[cfg(feature = "std")]
pub const STD_MIN_STACK_SIZE: usize = 64 * 1024;

#[cfg(feature = "std")]
impl Platform for StdPlatform {
    type Signal = StdSignal;
    type Lock = StdLock;

    fn spawn<F: FnOnce() + Send + 'static>(config: &Config, body: F) -> Result<(), Error> {
        // Threads have no priority here, it is only reported.
        debug!(name = config.name(), priority = config.priority(), "spawning drain thread");
        thread::Builder::new()
            .name(config.name().into())
            .stack_size(config.stack_size().max(STD_MIN_STACK_SIZE))
            .spawn(body)
            .map(drop)
            .map_err(|_err| {
                error!(error = %_err, name = config.name(), "failed to spawn drain thread");
                Error::Spawn
            })
    }

    fn relax() {
        thread::yield_now();
    }
    fn sleep(duration: Duration) {
        thread::sleep(duration);
    }

    fn yield_from_isr(woken: bool) {
        if woken {
            thread::yield_now();
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn give_from_isr_without_waiter() {
        let signal = StdSignal::INIT;
        assert!(!signal.give_from_isr());
        assert!(signal.try_take());
        assert!(!signal.try_take());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn give_from_isr_wakes_waiter() {
        let signal = Arc::new(StdSignal::INIT);
        let waiter = thread::spawn({
            let signal = signal.clone();
            move || signal.take()
        });
        while signal.state().waiters == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(signal.give_from_isr());
        waiter.join().unwrap();
        assert_eq!(signal.state().waiters, 0);
        assert!(!signal.try_take());
    }
}
