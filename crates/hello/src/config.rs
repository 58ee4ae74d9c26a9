//! Command-line configuration.

use std::time::Duration;

use clap::Parser;
use hello_core::{AsyncRuntimeConfig, Culture, PROPERTY_NAME_TIMEOUT, Result};

/// Program to display a 'Hello, World!' message.
#[derive(Parser, Debug, Clone)]
#[command(name = "hello")]
#[command(version, about, long_about = None)]
pub struct HelloConfig {
    /// BCP 47 locale used to order display names (defaults to the system locale)
    #[arg(long, value_name = "LOCALE")]
    pub locale: Option<String>,

    /// Seconds to wait for the display property name
    #[arg(long, value_name = "SECONDS", default_value_t = PROPERTY_NAME_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Run background work on a single thread
    #[arg(long)]
    pub single_threaded: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_level: String,
}

impl HelloConfig {
    /// Make the configured locale the process culture and return the
    /// culture in effect.
    ///
    /// Without `--locale` the system culture stays in place.
    pub fn install_culture(&self) -> Result<Culture> {
        if let Some(locale) = &self.locale {
            Culture::set_current(Culture::with_locale(locale))?;
        }
        Ok(Culture::current().clone())
    }

    /// The property name retrieval deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The async runtime configuration.
    pub fn runtime_config(&self) -> AsyncRuntimeConfig {
        if self.single_threaded {
            AsyncRuntimeConfig::single_threaded()
        } else {
            AsyncRuntimeConfig::multi_threaded()
        }
        .with_thread_name("hello-worker")
    }
}
