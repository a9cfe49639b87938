//! Consumer side of the sink.

use crate::{
    config::Wake,
    consume::Consume,
    error::Error,
    sink::Sink,
    store::runs,
    sync::{Platform, Signal},
};
use core::ops::{Deref, Range};

/// Operations of a sink used by its drain loop.
pub trait Drain {
    /// Whether there are written bytes the drain loop has not taken care of yet.
    fn has_pending(&self) -> bool;
    /// Blocks until producers may have written something.
    fn wait_wake(&self);
    /// Hands pending runs to `consumer`, waiting for completion of each.
    ///
    /// Returns the number of consumed bytes.
    ///
    /// # Safety
    ///
    /// Must only be called by the holder of the drain loop (see [`hold`](Drain::hold)).
    unsafe fn drain_with<C: Consume>(&self, consumer: &mut C) -> usize;

    /// Sets the drain hold flag returning its previous value.
    ///
    /// # Safety
    ///
    /// The flag must only be reset by its holder.
    unsafe fn hold(&self, flag: bool) -> bool;
}

impl<P: Platform, const N: usize> Sink<P, N> {
    /// Passes `run` to `consumer`, waits for completion and hands the run back.
    ///
    /// `next` is the cursor following the run. It is published before the slots are cleared, so a producer reusing
    /// them never sees more than `N` occupied bytes.
    fn consume_and_wait<C: Consume>(&self, consumer: &mut C, run: Range<usize>, next: usize) {
        // Slots of the run are filled and only we can clear them.
        consumer.consume(unsafe { self.store.slice(run.clone()) });
        self.done.take();
        self.store.set_read_cursor(next);
        self.store.clear(run);
    }
}

impl<P: Platform, const N: usize> Drain for Sink<P, N> {
    fn has_pending(&self) -> bool {
        self.store.read_cursor() != self.store.write_cursor()
    }

    fn wait_wake(&self) {
        match self.config.wake() {
            Wake::Signal => self.wake.take(),
            Wake::Poll(period) => P::sleep(period),
        }
    }

    unsafe fn drain_with<C: Consume>(&self, consumer: &mut C) -> usize {
        let end = self.store.write_cursor();
        let start = self.store.read_cursor();
        if start == end {
            return 0;
        }

        let (head, tail) = runs(self.store.capacity(), start, end);
        let count = head.len() + tail.len();
        trace!(?head, ?tail, "draining");
        if tail.is_empty() {
            self.consume_and_wait(consumer, head, end);
        } else {
            let middle = (start + head.len()) % self.store.modulus();
            self.consume_and_wait(consumer, head, middle);
            self.consume_and_wait(consumer, tail, end);
        }
        count
    }

    unsafe fn hold(&self, flag: bool) -> bool {
        self.hold_drain(flag)
    }
}

/// The drain loop of a sink.
///
/// Owns the [`Consume`] routine and a shared handle to the sink (`&Sink`, `&'static Sink`, `Arc<Sink>`).
/// Only one drainer per sink can exist at a time.
///
/// Usually it is moved into the drain task by [`Sink::start`], but it can be driven manually by a host running its
/// own loop.
pub struct Drainer<R: Deref, C>
where
    R::Target: Drain,
{
    sink: R,
    consumer: C,
}

impl<R: Deref, C: Consume> Drainer<R, C>
where
    R::Target: Drain,
{
    /// Takes the drain loop of `sink`.
    ///
    /// Fails with [`Error::DrainerTaken`] if another drainer of this sink exists.
    pub fn new(sink: R, consumer: C) -> Result<Self, Error> {
        if unsafe { sink.hold(true) } {
            debug!("drain loop is already taken");
            return Err(Error::DrainerTaken);
        }
        Ok(Self { sink, consumer })
    }

    pub fn sink(&self) -> &R::Target {
        &self.sink
    }
    pub fn consumer(&self) -> &C {
        &self.consumer
    }
    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    /// Blocks until there is something to drain.
    pub fn wait(&self) {
        while !self.sink.has_pending() {
            self.sink.wait_wake();
        }
    }

    /// Drains what is written at the moment of the call without waiting for new bytes.
    ///
    /// Pending bytes are split into at most two runs when they wrap around the end of the store.
    /// Each run is passed to the consumer and the call blocks until the consumer reports completion.
    ///
    /// Returns the number of consumed bytes.
    pub fn try_cycle(&mut self) -> usize {
        unsafe { self.sink.drain_with(&mut self.consumer) }
    }

    /// Waits for written bytes and drains them.
    pub fn cycle(&mut self) -> usize {
        self.wait();
        self.try_cycle()
    }

    /// Drains the sink forever.
    pub fn run(mut self) -> ! {
        loop {
            self.cycle();
        }
    }
}

impl<R: Deref, C> Drop for Drainer<R, C>
where
    R::Target: Drain,
{
    fn drop(&mut self) {
        unsafe { self.sink.hold(false) };
    }
}
