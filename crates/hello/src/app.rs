//! The application host and its startup workflow.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hello_core::{
    CancellationToken, Cancelled, ConnectionGuard, Culture, DisplayModel, Error, ErrorCode,
    LookupService, NotifyPropertyChanged, PROPERTY_NAME_TIMEOUT, Property, PropertyChangedSignal,
    PropertyName, PropertyNameRetrieval, Result, StartupError, TextId, Value, ValueConverter,
    ValueKind, set_property_with,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::targets;
use crate::view::ConsoleView;

/// The name under which the view's bound property is retrieved.
const DISPLAY_PROPERTY_NAME: &str = "display_property_name";

/// Owns the greeting model and binds it to a view.
pub struct HelloApp<S> {
    service: S,
    culture: Culture,
    retrieval_timeout: Duration,
    model: Property<Option<DisplayModel>>,
    changed: Arc<PropertyChangedSignal>,
    binding: Mutex<Option<ConnectionGuard<PropertyName>>>,
}

impl<S: LookupService + 'static> HelloApp<S> {
    /// The model property.
    pub const MODEL: PropertyName = "model";

    /// An app using `service` for text and converters, formatting under
    /// `culture`.
    pub fn new(service: S, culture: Culture) -> Self {
        Self {
            service,
            culture,
            retrieval_timeout: PROPERTY_NAME_TIMEOUT,
            model: Property::new(None),
            changed: Arc::new(PropertyChangedSignal::new()),
            binding: Mutex::new(None),
        }
    }

    /// Override how long startup waits for the view's property name.
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    /// The current model, if one was set.
    pub fn model(&self) -> Option<DisplayModel> {
        self.model.get()
    }

    /// Replace the model.
    ///
    /// A replacement with `None` fails with [`Error::NullArgument`] and
    /// leaves the current model in place.
    pub fn set_model(&self, model: Option<DisplayModel>) -> Result<bool> {
        set_property_with(
            self,
            &self.model,
            model,
            Self::MODEL,
            |model| match model {
                Some(_) => Ok(()),
                None => Err(Error::null_argument(Self::MODEL, "Cannot set to null")),
            },
            |model| {
                if let Some(model) = model {
                    tracing::info!(target: targets::APP, %model, "model replaced");
                }
            },
        )
    }

    /// Run startup against `view`, spawning background work through
    /// `handle`.
    ///
    /// 1. the view must report a non-blank class name
    /// 2. the view's display property name is resolved in the background
    /// 3. the greeting text becomes the model
    /// 4. the model is bound to the view's display property
    ///
    /// Starting again replaces the earlier binding.
    pub async fn start(
        self: &Arc<Self>,
        handle: &Handle,
        view: &Arc<ConsoleView>,
        token: &CancellationToken,
    ) -> Result<()> {
        self.start_with(handle, view, token, |token| async move {
            if token.is_cancelled() {
                return Err(Cancelled);
            }
            Ok(ConsoleView::DISPLAY_TEXT.to_string())
        })
        .await
    }

    async fn start_with<F, Fut>(
        self: &Arc<Self>,
        handle: &Handle,
        view: &Arc<ConsoleView>,
        token: &CancellationToken,
        resolve: F,
    ) -> Result<()>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = std::result::Result<String, Cancelled>> + Send + 'static,
    {
        if view.class_name().trim().is_empty() {
            return Err(StartupError::new(None, ErrorCode::NoWindowClass, &[]).into());
        }
        tracing::debug!(target: targets::APP, class_name = view.class_name(), "view created");

        let property = PropertyNameRetrieval::new(DISPLAY_PROPERTY_NAME, ConsoleView::DISPLAY_TEXT)
            .with_timeout(self.retrieval_timeout)
            .run(handle, token, resolve)
            .await?;

        let greeting = self.service.text(TextId::Greeting).await?;
        self.set_model(Some(DisplayModel::new(greeting)))?;

        self.bind(view, property).await
    }

    /// Push the model into `view` now and on every later model change.
    async fn bind(self: &Arc<Self>, view: &Arc<ConsoleView>, property: String) -> Result<()> {
        let model_converter = self.service.model_converter().await;
        let string_converter = self.service.string_converter().await;

        self.push(view, &property, &*model_converter, &*string_converter)?;

        let app = Arc::downgrade(self);
        let view = Arc::downgrade(view);
        let guard = self.changed.connect_scoped(move |&changed| {
            if changed != Self::MODEL {
                return;
            }
            let (Some(app), Some(view)) = (app.upgrade(), view.upgrade()) else {
                return;
            };
            if let Err(err) = app.push(&view, &property, &*model_converter, &*string_converter) {
                tracing::error!(target: targets::APP, error = %err, "binding update failed");
            }
        });
        *self.binding.lock() = Some(guard);
        Ok(())
    }

    fn push(
        &self,
        view: &ConsoleView,
        property: &str,
        model_converter: &dyn ValueConverter,
        string_converter: &dyn ValueConverter,
    ) -> Result<()> {
        let Some(text) = self.render(model_converter, string_converter)? else {
            return Ok(());
        };
        view.set_property_by_name(property, Some(text))?;
        Ok(())
    }

    /// Render the model through the model converter and then the string
    /// converter.
    fn render(
        &self,
        model_converter: &dyn ValueConverter,
        string_converter: &dyn ValueConverter,
    ) -> Result<Option<String>> {
        let Some(model) = self.model() else {
            return Ok(None);
        };
        let text =
            model_converter.convert(&Value::Model(model), ValueKind::Text, None, &self.culture)?;
        match string_converter.convert(&text, ValueKind::Text, None, &self.culture)? {
            Value::Text(text) => Ok(Some(text)),
            other => Err(Error::invalid_argument(format!(
                "Cannot convert {other} to {}",
                ValueKind::Text
            ))),
        }
    }
}

impl<S> NotifyPropertyChanged for HelloApp<S> {
    fn property_changed(&self) -> &PropertyChangedSignal {
        &self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::SharedBuffer;
    use hello_core::{GreetingService, TextCatalog};

    fn app() -> Arc<HelloApp<GreetingService>> {
        Arc::new(HelloApp::new(GreetingService::new(), Culture::invariant()))
    }

    fn view() -> (Arc<ConsoleView>, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Arc::new(ConsoleView::new(buffer.clone())), buffer)
    }

    fn handle() -> Handle {
        Handle::current()
    }

    async fn start(app: &Arc<HelloApp<GreetingService>>, view: &Arc<ConsoleView>) -> Result<()> {
        app.start(&handle(), view, &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_start_displays_greeting() {
        let app = app();
        let (view, output) = view();

        start(&app, &view).await.unwrap();

        assert_eq!(app.model(), Some(DisplayModel::new("Hello, World!")));
        assert_eq!(view.display_text().as_deref(), Some("Hello, World!"));
        assert_eq!(output.contents(), "Hello, World!\n");
    }

    #[tokio::test]
    async fn test_model_changes_follow_binding() {
        let app = app();
        let (view, output) = view();
        start(&app, &view).await.unwrap();

        assert!(app.set_model(Some(DisplayModel::new("Hello again"))).unwrap());
        assert!(!app.set_model(Some(DisplayModel::new("Hello again"))).unwrap());

        assert_eq!(view.to_string(), "Hello again");
        assert_eq!(output.contents(), "Hello, World!\nHello again\n");
    }

    #[tokio::test]
    async fn test_restart_replaces_binding() {
        let app = app();
        let (view, output) = view();
        start(&app, &view).await.unwrap();
        start(&app, &view).await.unwrap();

        assert_eq!(app.property_changed().connection_count(), 1);

        app.set_model(Some(DisplayModel::new("Hello again"))).unwrap();
        assert_eq!(output.contents(), "Hello, World!\nHello again\n");
    }

    #[tokio::test]
    async fn test_binding_ends_with_the_app() {
        let app = app();
        let (view, _) = view();
        start(&app, &view).await.unwrap();
        let changed = Arc::clone(&app.changed);
        assert_eq!(changed.connection_count(), 1);

        drop(app);
        assert_eq!(changed.connection_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_property_name_times_out() {
        let app = Arc::new(
            HelloApp::new(GreetingService::new(), Culture::invariant())
                .with_retrieval_timeout(Duration::from_secs(2)),
        );
        let (view, output) = view();

        let err = app
            .start_with(&handle(), &view, &CancellationToken::new(), |_| {
                std::future::pending::<std::result::Result<String, Cancelled>>()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { timeout, .. } if timeout == Duration::from_secs(2)));
        assert_eq!(err.startup_code(), None);
        assert_eq!(err.exit_code(), hello_core::OTHER_FAILURE_EXIT_CODE);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(app.model(), None);
        assert_eq!(output.contents(), "");
    }

    #[tokio::test]
    async fn test_blank_class_name() {
        let app = app();
        let view = Arc::new(ConsoleView::new(std::io::sink()).with_class_name("  "));

        let err = start(&app, &view).await.unwrap_err();

        assert_eq!(err.startup_code(), Some(ErrorCode::NoWindowClass));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(app.model(), None);
    }

    #[tokio::test]
    async fn test_cancelled_startup() {
        let app = app();
        let (view, output) = view();
        let token = CancellationToken::new();
        token.cancel();

        let err = app.start(&handle(), &view, &token).await.unwrap_err();

        assert_eq!(err.startup_code(), Some(ErrorCode::PropertyNameRetrievalCancelled));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "The retrieval of display_property_name which should be \"display_text\" was cancelled"
        );
        assert_eq!(output.contents(), "");
    }

    #[tokio::test]
    async fn test_missing_greeting_is_not_success() {
        let app = Arc::new(HelloApp::new(
            GreetingService::with_catalog(TextCatalog::empty()),
            Culture::invariant(),
        ));
        let (view, _) = view();

        let err = start(&app, &view).await.unwrap_err();

        assert!(matches!(err, Error::KeyNotFound { .. }));
        assert_eq!(err.exit_code(), hello_core::OTHER_FAILURE_EXIT_CODE);
    }

    #[test]
    fn test_model_cannot_be_cleared() {
        let app = app();
        app.set_model(Some(DisplayModel::new("kept"))).unwrap();

        let err = app.set_model(None).unwrap_err();

        assert!(matches!(err, Error::NullArgument { parameter: "model", .. }));
        assert_eq!(app.model(), Some(DisplayModel::new("kept")));
    }
}
