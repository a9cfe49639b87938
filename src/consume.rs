/// User routine receiving the bytes drained from the sink.
///
/// It is called from the drain task with one contiguous run at a time, in write order.
/// It must not block. It must eventually call [`Sink::consume_complete`](crate::Sink::consume_complete) exactly once per
/// run, either before returning or later, possibly from an interrupt handler. Until then the drain task waits and the
/// bytes of `run` are left untouched, so the routine may keep `run.as_ptr()` for a transfer that finishes later.
///
/// *A routine that never completes stalls the sink for good, and producers block once the store is full.*
pub trait Consume {
    fn consume(&mut self, run: &[u8]);
}

impl<F: FnMut(&[u8])> Consume for F {
    #[inline]
    fn consume(&mut self, run: &[u8]) {
        self(run)
    }
}
