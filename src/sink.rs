#[cfg(feature = "alloc")]
use crate::Arc;
use crate::{
    config::{Config, Wake},
    consume::Consume,
    drain::Drainer,
    error::Error,
    store::RingStore,
    sync::{
        atomic::{AtomicBool, Ordering},
        Lock, Platform, Signal,
    },
    DEFAULT_CAPACITY,
};
use core::{ffi::CStr, fmt, num::NonZeroUsize, ops::Deref};
use crossbeam_utils::Backoff;
#[cfg(feature = "std")]
use std::io;

/// Execution context [`Sink::consume_complete`] is called from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CallFrom {
    /// Interrupt handler.
    Isr,
    /// Ordinary task or thread.
    Task,
}

/// Byte sink with a single drain task.
///
/// Producers [`write`](Self::write) bytes, the drain task (see [`Drainer`]) hands them to the [`Consume`] routine.
/// Each slot of the store stays reserved until the routine reports completion, so at most `N` bytes are in flight.
///
/// *`N` must be greater than zero.*
#[cfg_attr(
    feature = "std",
    doc = r##"
```
use tsink::{CallFrom, Config, StdSink};

static SINK: StdSink<16> = StdSink::new(Config::new(2));

StdSink::start(&SINK, |run: &[u8]| {
    assert!(!run.is_empty());
    SINK.consume_complete(CallFrom::Task);
})
.unwrap();

SINK.write(b"0123456789abcdef0123");
```
"##
)]
pub struct Sink<P: Platform, const N: usize = DEFAULT_CAPACITY> {
    pub(crate) store: RingStore<N>,
    pub(crate) write_lock: P::Lock,
    pub(crate) wake: P::Signal,
    pub(crate) done: P::Signal,
    pub(crate) drain_held: AtomicBool,
    pub(crate) config: Config,
}

impl<P: Platform, const N: usize> Sink<P, N> {
    /// Creates a sink with empty store.
    ///
    /// The drain task is not running until [`start`](Self::start) is called.
    pub const fn new(config: Config) -> Self {
        Self {
            store: RingStore::new(),
            write_lock: <P::Lock as Lock>::INIT,
            wake: <P::Signal as Signal>::INIT,
            done: <P::Signal as Signal>::INIT,
            drain_held: AtomicBool::new(false),
            config,
        }
    }

    /// Starts the drain task feeding `consumer`.
    ///
    /// `this` is any shared handle to the sink living long enough, e.g. `&'static Sink` or `Arc<Sink>`.
    ///
    /// Returns an error if the sink is already drained or the platform failed to create the task.
    /// There is no degraded mode, the caller is expected to abort start-up.
    pub fn start<R, C>(this: R, consumer: C) -> Result<(), Error>
    where
        R: Deref<Target = Self> + Send + 'static,
        C: Consume + Send + 'static,
    {
        let config = this.config;
        let drainer = Drainer::new(this, consumer)?;
        P::spawn(&config, move || drainer.run())?;
        info!(
            name = config.name(),
            priority = config.priority(),
            stack_size = config.stack_size(),
            capacity = N,
            "drain task started"
        );
        Ok(())
    }

    /// Allocates a sink and starts its drain task.
    ///
    /// `make_consumer` receives a handle to the new sink, so that the consumer can signal completion.
    #[cfg(feature = "alloc")]
    pub fn init<C, F>(config: Config, make_consumer: F) -> Result<Arc<Self>, Error>
    where
        C: Consume + Send + 'static,
        F: FnOnce(Arc<Self>) -> C,
    {
        let sink = Arc::new(Self::new(config));
        let consumer = make_consumer(sink.clone());
        Self::start(sink.clone(), consumer)?;
        Ok(sink)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }
    #[inline]
    pub fn store(&self) -> &RingStore<N> {
        &self.store
    }

    /// Capacity of the store.
    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.store.capacity()
    }
    /// Number of bytes written but not yet consumed.
    ///
    /// *The value may become irrelevant at any time because of concurrent writers or the drain task.*
    #[inline]
    pub fn occupied_len(&self) -> usize {
        self.store.occupied_len()
    }
    #[inline]
    pub fn vacant_len(&self) -> usize {
        N - self.occupied_len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied_len() == 0
    }
    #[inline]
    pub fn is_full(&self) -> bool {
        self.vacant_len() == 0
    }

    /// Writes all `bytes` into the sink.
    ///
    /// Concurrent writers are serialized, so the bytes of one call reach the consumer as one contiguous sequence.
    /// Returns as soon as the last byte is stored. Every stored byte is delivered exactly once, in write order.
    ///
    /// Must not be called from an interrupt handler.
    ///
    /// *Blocks while the store is full. If the consumer never completes, this call never returns: that is the
    /// backpressure of the sink, not an error.*
    pub fn write(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        {
            let _guard = self.write_lock.lock();
            let mut cursor = self.store.write_cursor();
            for &byte in bytes {
                self.wait_vacant(cursor);
                unsafe { self.store.push(cursor, byte) };
                cursor = self.store.advance(cursor);
            }
        }
        self.wake_drain();
    }

    /// Writes the bytes of `s` preceding the nul terminator.
    pub fn write_cstr(&self, s: &CStr) {
        self.write(s.to_bytes());
    }

    pub fn write_str(&self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Waits until the slot of `cursor` is handed back by the drain task.
    fn wait_vacant(&self, cursor: usize) {
        let slot = cursor % N;
        if !self.store.is_filled(slot) {
            return;
        }
        trace!(slot, "slot busy, waiting for the drain task");
        // Bytes written so far by this call are not announced yet.
        self.wake_drain();
        let backoff = Backoff::new();
        while self.store.is_filled(slot) {
            if backoff.is_completed() {
                P::relax();
            } else {
                backoff.snooze();
            }
        }
    }

    fn wake_drain(&self) {
        if let Wake::Signal = self.config.wake() {
            self.wake.give();
        }
    }

    /// Reports that the consumer finished with the run it was last given.
    ///
    /// Must be called exactly once per [`Consume::consume`] call, either inside it or afterwards.
    /// From an interrupt handler pass [`CallFrom::Isr`]: the interrupt-safe signal is used and a context switch is
    /// requested if the drain task should preempt the interrupted one.
    pub fn consume_complete(&self, from: CallFrom) {
        trace!(?from, "consume complete");
        match from {
            CallFrom::Isr => {
                let woken = self.done.give_from_isr();
                P::yield_from_isr(woken);
            }
            CallFrom::Task => self.done.give(),
        }
    }

    /// Whether the drain loop is taken by a [`Drainer`].
    #[inline]
    pub fn drain_is_held(&self) -> bool {
        self.drain_held.load(Ordering::Relaxed)
    }
    /// Sets the drain hold flag returning its previous value.
    #[inline]
    pub(crate) fn hold_drain(&self, flag: bool) -> bool {
        self.drain_held.swap(flag, Ordering::AcqRel)
    }
}

impl<P: Platform, const N: usize> fmt::Write for &Sink<P, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Sink::write_str(*self, s);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<P: Platform, const N: usize> io::Write for &Sink<P, N> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Sink::write(*self, buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
