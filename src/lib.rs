//! Fixed-capacity byte sink drained by a single background task.
//!
//! Producers [`write`](Sink::write) bytes into a shared ring store and return as soon as the bytes are placed.
//! A dedicated drain task hands contiguous runs of written bytes to a user [`Consume`] routine and waits
//! until that routine reports completion through [`Sink::consume_complete`], possibly from an interrupt handler.
//! Only then are the slots handed back to producers.
//!
//! The host runtime (task creation, write lock, signaling, delays) is abstracted by the [`sync::Platform`] trait.
//! With the `std` feature [`StdSink`] runs on top of [`std::thread`].
#![cfg_attr(
    feature = "std",
    doc = r##"
```
use std::sync::{Arc, Mutex};
use tsink::{CallFrom, Config, StdSink};

let received = Arc::new(Mutex::new(Vec::new()));
let sink = StdSink::<64>::init(Config::default(), {
    let received = received.clone();
    move |sink| {
        move |run: &[u8]| {
            received.lock().unwrap().extend_from_slice(run);
            sink.consume_complete(CallFrom::Task);
        }
    }
})
.unwrap();

sink.write_str("Hello, sink!");
while !sink.is_empty() {
    std::thread::yield_now();
}
assert_eq!(received.lock().unwrap().as_slice(), b"Hello, sink!");
```
"##
)]
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

mod alias;
pub mod config;
pub mod consume;
pub mod drain;
pub mod error;
pub mod sink;
pub mod store;
pub mod sync;

pub use alias::*;
pub use config::{Config, Wake};
pub use consume::Consume;
pub use drain::Drainer;
pub use error::Error;
pub use sink::{CallFrom, Sink};

#[cfg(test)]
mod tests;
