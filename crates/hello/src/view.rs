//! The console display consumer.
//!
//! [`ConsoleView`] stands in for the greeting window. It exposes one
//! notifying property, `display_text`, and writes each new value to its
//! output as a line.

use std::fmt;
use std::io::{self, Write};

use hello_core::{
    Error, NotifyPropertyChanged, Property, PropertyChangedSignal, PropertyName, Result,
    set_property_with,
};
use parking_lot::Mutex;

use crate::targets;

/// A display surface that renders its text to a writer.
pub struct ConsoleView {
    class_name: String,
    display_text: Property<Option<String>>,
    changed: PropertyChangedSignal,
    output: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleView {
    /// The bindable text property.
    pub const DISPLAY_TEXT: PropertyName = "display_text";

    /// A view rendering to `output`.
    pub fn new(output: impl Write + Send + 'static) -> Self {
        Self {
            class_name: std::any::type_name::<Self>().to_string(),
            display_text: Property::new(None),
            changed: PropertyChangedSignal::new(),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// A view rendering to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Override the class name the view reports.
    #[cfg(test)]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// The fully qualified name of the view's class.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The current text, or `None` before anything was displayed.
    pub fn display_text(&self) -> Option<String> {
        self.display_text.get()
    }

    /// Replace the displayed text and render it.
    ///
    /// `None` is rejected with [`Error::NullArgument`]; an empty string
    /// displays an empty window. Nothing is rendered if the text is
    /// unchanged.
    pub fn set_display_text(&self, text: Option<String>) -> Result<bool> {
        let changed = set_property_with(
            self,
            &self.display_text,
            text,
            Self::DISPLAY_TEXT,
            |text| match text {
                Some(_) => Ok(()),
                None => Err(Error::null_argument(
                    Self::DISPLAY_TEXT,
                    "Please use an empty string to display an empty window",
                )),
            },
            |_| {},
        )?;

        if changed && let Some(text) = self.display_text.get() {
            self.render(&text)?;
        }
        Ok(changed)
    }

    /// Assign the property called `name`.
    ///
    /// Fails with [`Error::InvalidArgument`] if the view has no such
    /// property.
    pub fn set_property_by_name(&self, name: &str, value: Option<String>) -> Result<bool> {
        if name != Self::DISPLAY_TEXT {
            return Err(Error::invalid_argument(format!(
                "{} has no property named {name}",
                self.class_name
            )));
        }
        self.set_display_text(value)
    }

    fn render(&self, text: &str) -> Result<()> {
        let mut output = self.output.lock();
        writeln!(output, "{text}")?;
        output.flush()?;
        tracing::debug!(target: targets::VIEW, %text, "rendered");
        Ok(())
    }
}

impl NotifyPropertyChanged for ConsoleView {
    fn property_changed(&self) -> &PropertyChangedSignal {
        &self.changed
    }
}

impl fmt::Display for ConsoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_text
            .with(|text| f.write_str(text.as_deref().unwrap_or_default()))
    }
}

impl fmt::Debug for ConsoleView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleView")
            .field("class_name", &self.class_name)
            .field("display_text", &self.display_text.get())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(ConsoleView: Send, Sync);

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A cloneable in-memory writer.
    #[derive(Clone, Default)]
    pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_class_name_is_qualified() {
        let view = ConsoleView::new(io::sink());
        assert_eq!(view.class_name(), "hello::view::ConsoleView");
    }

    #[test]
    fn test_renders_each_change() {
        let buffer = SharedBuffer::default();
        let view = ConsoleView::new(buffer.clone());

        assert!(view.set_display_text(Some("Hello, World!".to_string())).unwrap());
        assert!(!view.set_display_text(Some("Hello, World!".to_string())).unwrap());
        assert!(view.set_display_text(Some(String::new())).unwrap());

        assert_eq!(buffer.contents(), "Hello, World!\n\n");
        assert_eq!(view.to_string(), "");
    }

    #[test]
    fn test_none_is_rejected() {
        let buffer = SharedBuffer::default();
        let view = ConsoleView::new(buffer.clone());
        view.set_display_text(Some("kept".to_string())).unwrap();

        let err = view.set_display_text(None).unwrap_err();
        assert!(matches!(err, Error::NullArgument { parameter: "display_text", .. }));
        assert_eq!(view.display_text().as_deref(), Some("kept"));
        assert_eq!(buffer.contents(), "kept\n");
    }

    #[test]
    fn test_notifies_display_text() {
        let view = ConsoleView::new(io::sink());
        let count = Arc::new(AtomicUsize::new(0));
        let clone = count.clone();
        view.on_property_changed(ConsoleView::DISPLAY_TEXT, move |_| {
            clone.fetch_add(1, Ordering::SeqCst);
        });

        view.set_display_text(Some("a".to_string())).unwrap();
        view.set_display_text(Some("a".to_string())).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_property_name() {
        let view = ConsoleView::new(io::sink());
        let err = view
            .set_property_by_name("title", Some("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(view.display_text(), None);
    }
}
