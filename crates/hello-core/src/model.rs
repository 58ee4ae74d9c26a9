//! The display model value object.
//!
//! [`DisplayModel`] wraps a single display name. Equality and hashing are
//! by that name (ordinal); ordering is by that name under a [`Culture`].
//! The model is also a property host, so a name replacement notifies
//! listeners of `"display_name"`.

use std::any::Any;
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::culture::Culture;
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::property::{
    NotifyPropertyChanged, Property, PropertyChangedSignal, PropertyName, set_property,
};

/// Anything that exposes a read-only display name.
///
/// This is the capability the model-to-string converter renders.
pub trait HasDisplayName {
    /// The display name.
    fn display_name(&self) -> String;
}

/// A comparable, cloneable value object wrapping a display name.
pub struct DisplayModel {
    display_name: Property<String>,
    changed: PropertyChangedSignal,
}

impl DisplayModel {
    /// The property name reported when the display name changes.
    pub const DISPLAY_NAME: PropertyName = "display_name";

    /// Create a model with the given display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Property::new(display_name.into()),
            changed: PropertyChangedSignal::new(),
        }
    }

    /// Create a model from a possibly absent name.
    ///
    /// Fails with [`Error::NullArgument`] when `display_name` is `None`.
    pub fn try_new(display_name: Option<String>) -> Result<Self> {
        let display_name = Self::require(display_name)?;
        Ok(Self::new(display_name))
    }

    fn require(display_name: Option<String>) -> Result<String> {
        display_name.ok_or_else(|| Error::null_argument(Self::DISPLAY_NAME, "Cannot set to null"))
    }

    /// Replace the display name.
    ///
    /// Listeners are notified only if the new name differs from the current
    /// one. Returns whether it did.
    pub fn set_display_name(&self, display_name: impl Into<String>) -> bool {
        let changed = set_property(
            self,
            &self.display_name,
            display_name.into(),
            Self::DISPLAY_NAME,
        );
        if changed {
            tracing::debug!(target: targets::MODEL, display_name = %self, "display name replaced");
        }
        changed
    }

    /// Replace the display name from a possibly absent value.
    ///
    /// Fails with [`Error::NullArgument`] when `display_name` is `None`; the
    /// current name is then left untouched.
    pub fn try_set_display_name(&self, display_name: Option<String>) -> Result<bool> {
        let display_name = Self::require(display_name)?;
        Ok(self.set_display_name(display_name))
    }

    /// Compare by display name under `culture`.
    pub fn compare_in(&self, other: &Self, culture: &Culture) -> Ordering {
        if std::ptr::eq(self, other) {
            return Ordering::Equal;
        }
        self.display_name
            .with(|left| other.display_name.with(|right| culture.compare(left, right)))
    }

    /// Compare with a possibly absent model. Any model sorts after `None`.
    pub fn compare_option(&self, other: Option<&Self>) -> Ordering {
        match other {
            Some(other) => self.cmp(other),
            None => Ordering::Greater,
        }
    }

    /// Compare with a value of unknown kind.
    ///
    /// Fails with [`Error::InvalidArgument`] if `other` is not a
    /// `DisplayModel`. Any model sorts after `None`.
    pub fn compare_any(&self, other: Option<&dyn Any>) -> Result<Ordering> {
        let Some(other) = other else {
            return Ok(Ordering::Greater);
        };
        match other.downcast_ref::<Self>() {
            Some(other) => Ok(self.cmp(other)),
            None => Err(Error::invalid_argument(
                "Object must be of type DisplayModel",
            )),
        }
    }
}

impl HasDisplayName for DisplayModel {
    fn display_name(&self) -> String {
        self.display_name.get()
    }
}

impl NotifyPropertyChanged for DisplayModel {
    fn property_changed(&self) -> &PropertyChangedSignal {
        &self.changed
    }
}

/// A clone has the same display name and no listeners.
impl Clone for DisplayModel {
    fn clone(&self) -> Self {
        Self::new(self.display_name.get())
    }
}

impl PartialEq for DisplayModel {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.display_name
            .with(|left| other.display_name.with(|right| left == right))
    }
}

impl Eq for DisplayModel {}

/// Hashes the display name, consistent with `PartialEq`.
///
/// [`set_display_name`](DisplayModel::set_display_name) works through a
/// shared reference, so a model can change while it is a key in a
/// `HashSet` or `HashMap`. Its hash then no longer matches its bucket and
/// the collection stops finding it. Do not rename a model that is in use as
/// a key.
impl Hash for DisplayModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.display_name.with(|name| name.hash(state));
    }
}

/// Ordered under [`Culture::current`].
impl Ord for DisplayModel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_in(other, Culture::current())
    }
}

impl PartialOrd for DisplayModel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_name.with(|name| f.write_str(name))
    }
}

impl fmt::Debug for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayModel")
            .field("display_name", &self.display_name.get())
            .field("listeners", &self.changed.connection_count())
            .finish()
    }
}

impl From<&str> for DisplayModel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DisplayModel {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl FromStr for DisplayModel {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<DisplayModel> for String {
    fn from(value: DisplayModel) -> Self {
        value.display_name.get()
    }
}

impl From<&DisplayModel> for String {
    fn from(value: &DisplayModel) -> Self {
        value.display_name.get()
    }
}

static_assertions::assert_impl_all!(DisplayModel: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn names() -> Vec<DisplayModel> {
        ["Hello, World!", "apple", "Banana", "cherry", "", "Zebra", "éclair"]
            .into_iter()
            .map(DisplayModel::from)
            .collect()
    }

    #[test]
    fn test_try_new_rejects_none() {
        let err = DisplayModel::try_new(None).unwrap_err();
        assert!(matches!(err, Error::NullArgument { parameter: "display_name", .. }));
    }

    #[test]
    fn test_try_new_accepts_empty_name() {
        let model = DisplayModel::try_new(Some(String::new())).unwrap();
        assert_eq!(model.display_name(), "");
    }

    #[test]
    fn test_to_string_is_verbatim() {
        let model = DisplayModel::new("Hello, World!");
        assert_eq!(model.to_string(), "Hello, World!");
        assert_eq!(String::from(&model), "Hello, World!");
        assert_eq!(String::from(model), "Hello, World!");
    }

    #[test]
    fn test_from_str() {
        let model: DisplayModel = "abc".parse().unwrap();
        assert_eq!(model, DisplayModel::new("abc"));
    }

    #[test]
    #[allow(clippy::mutable_key_type)]
    fn test_equality_and_hash_by_name() {
        let a = DisplayModel::new("x");
        let b = DisplayModel::new("x");
        let c = DisplayModel::new("X");

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = DisplayModel::new("first");
        let (count, _) = listen(&original);
        let copy = original.clone();

        assert_eq!(copy, original);
        assert!(!std::ptr::eq(&copy, &original));

        copy.set_display_name("second");
        assert_eq!(original.display_name(), "first");
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
    }

    fn listen(model: &DisplayModel) -> (Arc<AtomicUsize>, crate::signal::ConnectionId) {
        let count = Arc::new(AtomicUsize::new(0));
        let clone = count.clone();
        let id = model.on_property_changed(DisplayModel::DISPLAY_NAME, move |_| {
            clone.fetch_add(1, AtomicOrdering::SeqCst);
        });
        (count, id)
    }

    #[test]
    fn test_set_same_name_does_not_notify() {
        let model = DisplayModel::new("same");
        let (count, _) = listen(&model);

        assert!(!model.set_display_name("same"));
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_set_new_name_notifies_once() {
        let model = DisplayModel::new("old");
        let (count, _) = listen(&model);

        assert!(model.set_display_name("new"));
        assert_eq!(model.display_name(), "new");
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_try_set_none_keeps_name() {
        let model = DisplayModel::new("kept");
        let (count, _) = listen(&model);

        assert!(model.try_set_display_name(None).is_err());
        assert_eq!(model.display_name(), "kept");
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_ordering_is_antisymmetric() {
        let culture = Culture::with_locale("en-US");
        for a in names() {
            for b in names() {
                assert_eq!(
                    a.compare_in(&b, &culture),
                    b.compare_in(&a, &culture).reverse(),
                    "{a:?} vs {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_ordering_is_transitive() {
        let culture = Culture::with_locale("en-US");
        let all = names();
        for a in &all {
            for b in &all {
                for c in &all {
                    if a.compare_in(b, &culture) == Ordering::Less
                        && b.compare_in(c, &culture) == Ordering::Less
                    {
                        assert_eq!(a.compare_in(c, &culture), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn test_ordering_agrees_with_equality() {
        for a in names() {
            for b in names() {
                assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
            }
        }
    }

    #[test]
    fn test_culture_aware_ordering() {
        let culture = Culture::with_locale("en-US");
        let apple = DisplayModel::new("apple");
        let banana = DisplayModel::new("Banana");

        assert_eq!(apple.compare_in(&banana, &culture), Ordering::Less);
        assert_eq!(
            apple.compare_in(&banana, &Culture::invariant()),
            Ordering::Greater
        );
    }

    #[test]
    fn test_none_sorts_first() {
        let model = DisplayModel::new("");
        assert_eq!(model.compare_option(None), Ordering::Greater);
        assert_eq!(model.compare_any(None).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_compare_any() {
        let a = DisplayModel::new("a");
        let b = DisplayModel::new("b");

        assert_eq!(a.compare_any(Some(&b)).unwrap(), Ordering::Less);
        assert_eq!(a.compare_any(Some(&a)).unwrap(), Ordering::Equal);

        let err = a.compare_any(Some(&"a".to_string())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_sorting() {
        let culture = Culture::with_locale("en-US");
        let mut models = vec![
            DisplayModel::new("cherry"),
            DisplayModel::new("Banana"),
            DisplayModel::new("apple"),
        ];
        models.sort_by(|a, b| a.compare_in(b, &culture));

        let sorted: Vec<String> = models.iter().map(String::from).collect();
        assert_eq!(sorted, vec!["apple", "Banana", "cherry"]);
    }
}
