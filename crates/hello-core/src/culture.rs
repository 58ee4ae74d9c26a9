//! Pluggable text-comparison culture.
//!
//! A [`Culture`] decides how display names are ordered. Locale cultures use
//! ICU4X collation; the invariant culture compares ordinally (by bytes).
//! Either way ties are broken ordinally, so the resulting order is total and
//! agrees with plain string equality.

use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, OnceLock};

use icu::collator::options::CollatorOptions;
use icu::collator::{Collator, CollatorBorrowed};
use icu::locale::Locale;

use crate::error::{Error, Result};
use crate::logging::targets;

const FALLBACK_LOCALE: &str = "en-US";

static CURRENT: OnceLock<Culture> = OnceLock::new();

/// A text-comparison culture.
#[derive(Clone)]
pub struct Culture {
    name: String,
    collator: Option<Arc<CollatorBorrowed<'static>>>,
}

impl Culture {
    /// The culture of the running process.
    ///
    /// Whatever [`set_current`](Self::set_current) installed, otherwise
    /// detected once from the system locale. It is the culture behind
    /// `DisplayModel`'s `Ord`.
    pub fn current() -> &'static Culture {
        CURRENT.get_or_init(|| {
            let locale = sys_locale::get_locale().unwrap_or_else(|| FALLBACK_LOCALE.to_string());
            Culture::with_locale(&locale)
        })
    }

    /// Install `culture` as the process culture.
    ///
    /// Must happen before the first call to [`current`](Self::current).
    /// Fails with [`Error::UnsupportedOperation`] once a culture is in
    /// place, leaving that culture unchanged.
    pub fn set_current(culture: Culture) -> Result<()> {
        let name = culture.to_string();
        CURRENT.set(culture).map_err(|_| {
            Error::unsupported(format!(
                "Cannot switch the current culture to {name}: {} is already in use",
                Self::current()
            ))
        })?;
        tracing::debug!(target: targets::CULTURE, culture = %name, "current culture set");
        Ok(())
    }

    /// A culture for a BCP 47 locale identifier such as `"de-DE"`.
    ///
    /// Unparseable identifiers, and locales without collation data, fall back
    /// to `en-US`.
    pub fn with_locale(identifier: &str) -> Self {
        let locale: Locale = match identifier.parse() {
            Ok(locale) => locale,
            Err(_) => {
                tracing::warn!(
                    target: targets::CULTURE,
                    identifier,
                    fallback = FALLBACK_LOCALE,
                    "invalid locale identifier"
                );
                return Self::fallback();
            }
        };

        match Collator::try_new(locale.clone().into(), CollatorOptions::default()) {
            Ok(collator) => Self {
                name: locale.to_string(),
                collator: Some(Arc::new(collator)),
            },
            Err(err) => {
                tracing::warn!(
                    target: targets::CULTURE,
                    identifier,
                    error = %err,
                    fallback = FALLBACK_LOCALE,
                    "no collation data for locale"
                );
                Self::fallback()
            }
        }
    }

    /// The invariant culture: ordinal comparison, no collation.
    pub fn invariant() -> Self {
        Self {
            name: String::new(),
            collator: None,
        }
    }

    fn fallback() -> Self {
        let locale: Locale = icu::locale::locale!("en-US");
        match Collator::try_new(locale.clone().into(), CollatorOptions::default()) {
            Ok(collator) => Self {
                name: locale.to_string(),
                collator: Some(Arc::new(collator)),
            },
            Err(_) => Self::invariant(),
        }
    }

    /// The locale identifier, or `""` for the invariant culture.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the invariant (ordinal) culture.
    pub fn is_invariant(&self) -> bool {
        self.collator.is_none()
    }

    /// Compare two strings under this culture.
    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        let collated = match &self.collator {
            Some(collator) => collator.compare(left, right),
            None => Ordering::Equal,
        };
        collated.then_with(|| left.cmp(right))
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::current().clone()
    }
}

impl fmt::Debug for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Culture")
            .field("name", &self.name)
            .field("invariant", &self.is_invariant())
            .finish()
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invariant() {
            f.write_str("invariant")
        } else {
            f.write_str(&self.name)
        }
    }
}
