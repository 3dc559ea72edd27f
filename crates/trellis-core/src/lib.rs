//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces shared by the widget layer:
//!
//! - **Signal/Slot System**: typed, ordered, re-entrancy safe notifications
//! - **Errors**: signal lookup errors surfaced through the string-keyed API
//! - **Logging**: tracing targets, tree dumps and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use trellis_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let seen_clone = seen.clone();
//! let conn_id = value_changed.connect(move |&value| seen_clone.lock().push(value));
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! value_changed.emit(43);
//!
//! assert_eq!(*seen.lock(), vec![42]);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{SignalError, SignalResult};
pub use logging::{DebugTree, PerfSpan, TreeDebug, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionId, ErasedSignal, Signal};

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionId: Send, Sync, Copy);
