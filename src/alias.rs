#[cfg(feature = "std")]
use crate::{sink::Sink, sync::StdPlatform};

#[cfg(all(feature = "alloc", not(feature = "portable-atomic")))]
pub use alloc::sync::Arc;
#[cfg(all(feature = "alloc", feature = "portable-atomic"))]
pub use portable_atomic_util::Arc;

/// Store capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Sink drained by a `std` thread.
#[cfg(feature = "std")]
pub type StdSink<const N: usize = DEFAULT_CAPACITY> = Sink<StdPlatform, N>;
