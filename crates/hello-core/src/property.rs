//! Property system for Hello Lattice.
//!
//! This module provides change-detected backing fields and the host
//! capability that broadcasts "property changed" notifications.
//!
//! # Property Types
//!
//! - **Property<T>**: A backing field with interior mutability
//! - **NotifyPropertyChanged**: The host capability. A host owns one
//!   [`PropertyChangedSignal`] and every notifiable property on it reports
//!   through that signal by name.
//! - **set_property / set_property_with**: Assign a field on a host, notifying
//!   listeners only when the value actually changed
//!
//! # Example
//!
//! ```
//! use hello_core::property::{
//!     set_property, NotifyPropertyChanged, Property, PropertyChangedSignal,
//! };
//!
//! struct Counter {
//!     value: Property<i32>,
//!     changed: PropertyChangedSignal,
//! }
//!
//! impl NotifyPropertyChanged for Counter {
//!     fn property_changed(&self) -> &PropertyChangedSignal {
//!         &self.changed
//!     }
//! }
//!
//! let counter = Counter { value: Property::new(0), changed: PropertyChangedSignal::new() };
//! counter.on_property_changed("value", |name| println!("{name} changed"));
//!
//! assert!(set_property(&counter, &counter.value, 1, "value"));
//! assert!(!set_property(&counter, &counter.value, 1, "value"));
//! ```
//!
//! # Concurrency
//!
//! Assignment reads the current value, runs the pre-action, writes, and then
//! notifies, without holding a lock across those steps. Concurrent
//! assignments to the same property of the same host must be serialized by
//! the caller.

use std::collections::hash_map::DefaultHasher;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::{ConnectionId, Signal};

/// The name a property reports in its change notification.
pub type PropertyName = &'static str;

/// The signal a host raises when one of its properties changes.
pub type PropertyChangedSignal = Signal<PropertyName>;

/// A backing field with interior mutability.
///
/// # Thread Safety
///
/// `Property<T>` uses `RwLock` and is `Send + Sync` when `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection or notification.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .finish()
    }
}

fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Whether assigning `new` over `old` is a change.
///
/// A change is a differing hash or, with equal hashes, unequal values.
/// Nullable fields are modelled as `Option<T>`: `None` over `None` is not a
/// change, `None` against `Some` always is.
pub fn has_changed<T: PartialEq + Hash + ?Sized>(old: &T, new: &T) -> bool {
    hash_of(old) != hash_of(new) || old != new
}

/// The host capability: anything that raises "property changed" notifications.
///
/// Implementors only supply the signal; registration and raising are
/// provided on top of it.
pub trait NotifyPropertyChanged {
    /// The host's change signal.
    fn property_changed(&self) -> &PropertyChangedSignal;

    /// Raise the change notification for `name`.
    fn notify(&self, name: PropertyName) {
        self.property_changed().emit(name);
    }

    /// Register a listener for changes of the property called `name`.
    ///
    /// Registering the same listener twice invokes it twice per change.
    fn on_property_changed<F>(&self, name: PropertyName, listener: F) -> ConnectionId
    where
        F: Fn(PropertyName) + Send + Sync + 'static,
    {
        self.property_changed().connect(move |&changed| {
            if changed == name {
                listener(changed);
            }
        })
    }

    /// Register a listener for changes of any property on this host.
    fn connect_property_changed<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(PropertyName) + Send + Sync + 'static,
    {
        self.property_changed()
            .connect(move |&changed| listener(changed))
    }

    /// Remove a listener registered with either `on_property_changed` or
    /// `connect_property_changed`.
    fn remove_property_listener(&self, id: ConnectionId) -> bool {
        self.property_changed().disconnect(id)
    }
}

/// Assign `value` to `field` on `host`, notifying only on an actual change.
///
/// Returns `true` if the value changed.
pub fn set_property<H, T>(host: &H, field: &Property<T>, value: T, name: PropertyName) -> bool
where
    H: NotifyPropertyChanged + ?Sized,
    T: Clone + PartialEq + Hash,
{
    match set_property_with(
        host,
        field,
        value,
        name,
        |_| Ok::<(), Infallible>(()),
        |_| {},
    ) {
        Ok(changed) => changed,
        Err(never) => match never {},
    }
}

/// Assign `value` to `field` on `host` with pre- and post-actions.
///
/// When the value is unchanged nothing runs and `Ok(false)` is returned.
/// Otherwise, in order:
///
/// 1. `pre(&value)` runs; an error propagates and the field is left as is
/// 2. the field is assigned
/// 3. every listener is invoked synchronously with `name`
/// 4. `post(&value)` runs
pub fn set_property_with<H, T, E, Pre, Post>(
    host: &H,
    field: &Property<T>,
    value: T,
    name: PropertyName,
    pre: Pre,
    post: Post,
) -> Result<bool, E>
where
    H: NotifyPropertyChanged + ?Sized,
    T: Clone + PartialEq + Hash,
    Pre: FnOnce(&T) -> Result<(), E>,
    Post: FnOnce(&T),
{
    if !field.with(|current| has_changed(current, &value)) {
        tracing::trace!(target: targets::PROPERTY, property = name, "unchanged, not notifying");
        return Ok(false);
    }

    pre(&value)?;
    field.set_silent(value.clone());
    tracing::debug!(target: targets::PROPERTY, property = name, "property changed");
    host.notify(name);
    post(&value);
    Ok(true)
}
