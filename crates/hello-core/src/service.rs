//! The lookup service.
//!
//! A [`LookupService`] hands out display text by identifier and the
//! conversion strategies a view needs to render a model. Every operation is
//! asynchronous so a slower catalog can be swapped in without changing
//! callers.
//!
//! ```
//! use hello_core::service::{GreetingService, LookupService, TextId};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let service = GreetingService::new();
//! assert_eq!(service.text(TextId::Greeting).await.unwrap(), "Hello, World!");
//! # });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::convert::{ModelToStringConverter, StringToStringConverter, ValueConverter};
use crate::error::{Error, Result};
use crate::logging::targets;

/// Identifies a piece of display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextId {
    /// The greeting shown at startup.
    Greeting,
}

impl TextId {
    /// The catalog key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
        }
    }
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable mapping from [`TextId`] to display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCatalog {
    entries: HashMap<TextId, String>,
}

impl TextCatalog {
    /// A catalog with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn with_text(mut self, id: TextId, text: impl Into<String>) -> Self {
        self.entries.insert(id, text.into());
        self
    }

    /// Look up `id`.
    pub fn get(&self, id: TextId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TextCatalog {
    fn default() -> Self {
        Self::empty().with_text(TextId::Greeting, "Hello, World!")
    }
}

/// Asynchronous text lookup plus the converters used to render models.
pub trait LookupService: Send + Sync {
    /// Fetch the text for `id`.
    ///
    /// Fails with [`Error::KeyNotFound`] if the catalog has no entry.
    fn text(&self, id: TextId) -> impl Future<Output = Result<String>> + Send;

    /// The scalar coercion strategy.
    fn string_converter(&self) -> impl Future<Output = Arc<dyn ValueConverter>> + Send;

    /// The model rendering strategy.
    fn model_converter(&self) -> impl Future<Output = Arc<dyn ValueConverter>> + Send;
}

/// The default [`LookupService`], backed by an in-memory catalog.
///
/// Built once by the composition root and shared from there. Every call
/// returns the same converter instances.
#[derive(Debug, Clone)]
pub struct GreetingService {
    catalog: Arc<TextCatalog>,
    string_converter: Arc<dyn ValueConverter>,
    model_converter: Arc<dyn ValueConverter>,
}

impl GreetingService {
    /// A service over the default catalog.
    pub fn new() -> Self {
        Self::with_catalog(TextCatalog::default())
    }

    /// A service over `catalog`.
    pub fn with_catalog(catalog: TextCatalog) -> Self {
        tracing::debug!(
            target: targets::SERVICE,
            entries = catalog.len(),
            "greeting service created"
        );
        Self {
            catalog: Arc::new(catalog),
            string_converter: Arc::new(StringToStringConverter),
            model_converter: Arc::new(ModelToStringConverter),
        }
    }

    fn lookup(&self, id: TextId) -> Result<String> {
        match self.catalog.get(id) {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::warn!(target: targets::SERVICE, key = id.key(), "text not in catalog");
                Err(Error::KeyNotFound {
                    key: id.key().to_string(),
                })
            }
        }
    }
}

impl Default for GreetingService {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupService for GreetingService {
    fn text(&self, id: TextId) -> impl Future<Output = Result<String>> + Send {
        let result = self.lookup(id);
        async move { result }
    }

    fn string_converter(&self) -> impl Future<Output = Arc<dyn ValueConverter>> + Send {
        let converter = Arc::clone(&self.string_converter);
        async move { converter }
    }

    fn model_converter(&self) -> impl Future<Output = Arc<dyn ValueConverter>> + Send {
        let converter = Arc::clone(&self.model_converter);
        async move { converter }
    }
}

static_assertions::assert_impl_all!(GreetingService: Send, Sync);
