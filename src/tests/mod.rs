use crate::{Arc, CallFrom, Config, StdSink};
use std::{
    sync::Mutex,
    thread,
    time::{Duration, Instant},
    vec::Vec,
};

mod completion;

const TIMEOUT: Duration = Duration::from_secs(10);

type Runs = Arc<Mutex<Vec<Vec<u8>>>>;

/// Consumer recording every run and completing it right away.
fn recorder<const N: usize>(sink: Arc<StdSink<N>>) -> (Runs, impl FnMut(&[u8]) + Send + 'static) {
    let runs = Runs::default();
    let consumer = {
        let runs = runs.clone();
        move |run: &[u8]| {
            runs.lock().unwrap().push(run.to_vec());
            sink.consume_complete(CallFrom::Task);
        }
    };
    (runs, consumer)
}

fn concat(runs: &Runs) -> Vec<u8> {
    runs.lock().unwrap().concat()
}

fn wait_until<F: FnMut() -> bool>(mut f: F) {
    let start = Instant::now();
    while !f() {
        assert!(start.elapsed() < TIMEOUT, "timed out");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Starts a sink drained by a [`recorder`].
fn start_recording<const N: usize>(config: Config) -> (Arc<StdSink<N>>, Runs) {
    let mut runs = None;
    let sink = StdSink::<N>::init(config, |sink| {
        let (r, consumer) = recorder(sink);
        runs = Some(r);
        consumer
    })
    .unwrap();
    (sink, runs.unwrap())
}
