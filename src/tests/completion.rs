use super::wait_until;
use crate::{Arc, CallFrom, Config, Drainer, StdSink};
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::{
    sync::{mpsc, Mutex},
    thread,
    time::Duration,
    vec::Vec,
};

#[test]
#[cfg_attr(miri, ignore)]
fn capacity_bound() {
    let sink = StdSink::<4>::new(Config::default());
    let runs = Mutex::new(Vec::<Vec<u8>>::new());
    let mut drainer = Drainer::new(&sink, |run: &[u8]| {
        runs.lock().unwrap().push(run.to_vec());
        sink.consume_complete(CallFrom::Task);
    })
    .unwrap();

    sink.write(b"abcd");
    assert!(sink.is_full());

    let written = AtomicBool::new(false);
    thread::scope(|s| {
        let pjh = s.spawn(|| {
            sink.write(b"ef");
            written.store(true, Ordering::SeqCst);
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!written.load(Ordering::SeqCst));
        assert_eq!(sink.occupied_len(), 4);

        assert_eq!(drainer.try_cycle(), 4);
        pjh.join().unwrap();
    });
    assert!(written.load(Ordering::SeqCst));

    assert_eq!(drainer.try_cycle(), 2);
    assert_eq!(runs.lock().unwrap().concat(), b"abcdef");
}

#[test]
#[cfg_attr(miri, ignore)]
fn gating() {
    let sink = StdSink::<4>::new(Config::default());
    let consumed = AtomicUsize::new(0);
    let mut drainer = Drainer::new(&sink, |run: &[u8]| {
        consumed.fetch_add(run.len(), Ordering::SeqCst);
    })
    .unwrap();

    sink.write(b"abcd");
    thread::scope(|s| {
        let cjh = s.spawn(|| drainer.try_cycle());

        wait_until(|| consumed.load(Ordering::SeqCst) == 4);
        // The consumer returned but did not complete yet.
        thread::sleep(Duration::from_millis(20));
        assert!((0..4).all(|slot| sink.store().is_filled(slot)));
        assert_eq!(sink.occupied_len(), 4);
        assert!(!cjh.is_finished());

        sink.consume_complete(CallFrom::Task);
        assert_eq!(cjh.join().unwrap(), 4);
    });

    assert!((0..4).all(|slot| !sink.store().is_filled(slot)));
    assert!(sink.is_empty());
}

#[test]
#[cfg_attr(miri, ignore)]
fn gating_wrapped() {
    let sink = StdSink::<4>::new(Config::default());
    let consumed = Mutex::new(Vec::<Vec<u8>>::new());
    let mut drainer = Drainer::new(&sink, |run: &[u8]| {
        consumed.lock().unwrap().push(run.to_vec());
    })
    .unwrap();

    sink.write(b"xyz");
    sink.consume_complete(CallFrom::Task);
    assert_eq!(drainer.try_cycle(), 3);
    sink.write(b"abc");

    thread::scope(|s| {
        let cjh = s.spawn(|| drainer.try_cycle());

        wait_until(|| consumed.lock().unwrap().len() == 2);
        // Second run is not handed out before the first one completes.
        thread::sleep(Duration::from_millis(20));
        assert_eq!(consumed.lock().unwrap().len(), 2);
        assert!(sink.store().is_filled(3));
        assert!(sink.store().is_filled(0));

        sink.consume_complete(CallFrom::Task);
        wait_until(|| consumed.lock().unwrap().len() == 3);
        assert!(!sink.store().is_filled(3));
        assert!(sink.store().is_filled(0) && sink.store().is_filled(1));

        sink.consume_complete(CallFrom::Isr);
        assert_eq!(cjh.join().unwrap(), 3);
    });

    drop(drainer);
    assert_eq!(consumed.into_inner().unwrap(), [b"xyz".to_vec(), b"a".to_vec(), b"bc".to_vec()]);
    assert!(sink.is_empty());
}

/// Consumer handing runs to a transmitter thread which completes from "interrupt" context.
#[test]
#[cfg_attr(miri, ignore)]
fn deferred_from_isr() {
    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    let sink = StdSink::<16>::init(Config::default(), move |_| {
        move |run: &[u8]| {
            tx.send(run.to_vec()).unwrap();
        }
    })
    .unwrap();

    let wire = Arc::new(Mutex::new(Vec::new()));
    thread::spawn({
        let sink = sink.clone();
        let wire = wire.clone();
        move || {
            for run in rx {
                thread::sleep(Duration::from_millis(1));
                wire.lock().unwrap().extend_from_slice(&run);
                sink.consume_complete(CallFrom::Isr);
            }
        }
    });

    let msg = (0..200u8).collect::<Vec<_>>();
    for chunk in msg.chunks(7) {
        sink.write(chunk);
    }
    wait_until(|| sink.is_empty());
    assert_eq!(*wire.lock().unwrap(), msg);
}
