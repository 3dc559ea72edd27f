//! Integration tests for signals used from several threads and with logging on.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use trellis_core::{ErasedSignal, Signal, SignalError};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trellis=trace")
        .with_test_writer()
        .try_init();
}

#[test]
fn test_emit_from_multiple_threads() {
    init_logging();
    let signal = Arc::new(Signal::<usize>::new());
    let total = Arc::new(Mutex::new(0usize));

    let total_clone = total.clone();
    signal.connect(move |&n| *total_clone.lock() += n);

    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let signal = signal.clone();
            thread::spawn(move || signal.emit(n))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*total.lock(), 10);
}

struct EditBoxSignals {
    pressed: Signal<()>,
    text_changed: Signal<String>,
}

impl EditBoxSignals {
    fn signal(&self, name: &str) -> Result<&dyn ErasedSignal, SignalError> {
        match name {
            "Pressed" => Ok(&self.pressed),
            "TextChanged" => Ok(&self.text_changed),
            other => Err(SignalError::UnknownSignal {
                name: other.to_string(),
                type_name: "EditBox".to_string(),
            }),
        }
    }
}

#[test]
fn test_string_keyed_lookup() {
    init_logging();
    let signals = EditBoxSignals {
        pressed: Signal::new(),
        text_changed: Signal::new(),
    };

    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = log.clone();
    let id = signals
        .signal("TextChanged")
        .unwrap()
        .connect_unit(Box::new(move || log_clone.lock().push("changed")));

    signals.text_changed.emit("abc".into());
    signals.pressed.emit(());
    assert_eq!(*log.lock(), vec!["changed"]);

    let err = signals.signal("Clicked").err().unwrap();
    assert_eq!(err.to_string(), "unknown signal 'Clicked' on EditBox");
    assert!(signals.signal("TextChanged").unwrap().disconnect(id));
    assert_eq!(signals.text_changed.connection_count(), 0);
}
