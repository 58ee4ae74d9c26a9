//! Core systems for Hello Lattice.
//!
//! This crate provides the UI-independent pieces behind the Hello Lattice
//! greeting window:
//!
//! - **Signal/Slot System**: Synchronous fan-out notification
//! - **Property System**: Change-detected fields on a notifying host
//! - **Display Model**: A comparable, cloneable value object
//! - **Conversion**: Validated strategies that render models as text
//! - **Lookup Service**: Asynchronous text retrieval plus shared converters
//! - **Errors**: A closed startup taxonomy with formatted messages
//! - **Async Runtime**: Tokio-backed tasks with cooperative cancellation
//!
//! # Signal/Slot Example
//!
//! ```
//! use hello_core::Signal;
//!
//! let greeted = Signal::<String>::new();
//!
//! let conn_id = greeted.connect(|name| {
//!     println!("Hello, {}!", name);
//! });
//!
//! greeted.emit("World".to_string());
//! greeted.disconnect(conn_id);
//! ```
//!
//! # Model Example
//!
//! ```
//! use hello_core::{Culture, DisplayModel, HasDisplayName, NotifyPropertyChanged};
//! use std::cmp::Ordering;
//!
//! let model = DisplayModel::new("apple");
//! model.on_property_changed(DisplayModel::DISPLAY_NAME, |name| {
//!     println!("{name} changed");
//! });
//!
//! assert!(model.set_display_name("Apple"));
//! assert!(!model.set_display_name("Apple"));
//!
//! let culture = Culture::with_locale("en-US");
//! let banana = DisplayModel::new("banana");
//! assert_eq!(model.compare_in(&banana, &culture), Ordering::Less);
//! assert_eq!(model.display_name(), "Apple");
//! ```

pub mod async_runtime;
pub mod convert;
pub mod culture;
mod error;
pub mod logging;
pub mod model;
pub mod property;
pub mod retrieval;
pub mod service;
pub mod signal;

pub use async_runtime::{
    AsyncRuntime, AsyncRuntimeConfig, AsyncRuntimeError, AsyncTaskHandle, CancellationToken,
    RuntimeType, spawn_cancellable_on,
};
pub use convert::{
    ModelToStringConverter, StringToStringConverter, Value, ValueConverter, ValueKind,
};
pub use culture::Culture;
pub use error::{Error, ErrorCode, OTHER_FAILURE_EXIT_CODE, Result, StartupError, format_message};
pub use logging::PerfSpan;
pub use model::{DisplayModel, HasDisplayName};
pub use property::{
    NotifyPropertyChanged, Property, PropertyChangedSignal, PropertyName, set_property,
    set_property_with,
};
pub use retrieval::{Cancelled, PROPERTY_NAME_TIMEOUT, PropertyNameRetrieval};
pub use service::{GreetingService, LookupService, TextCatalog, TextId};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
