//! Program to display a 'Hello, World!' message.
//!
//! The binary is the composition root: it parses the command line,
//! installs logging, builds the lookup service and the view, and runs the
//! startup workflow. The exit status is the startup error code, `0` on
//! success and `3` for failures outside the taxonomy.

mod app;
mod config;
mod view;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hello_core::{AsyncRuntime, CancellationToken, ErrorCode, GreetingService, PerfSpan, Result};
use tracing_subscriber::EnvFilter;

use crate::app::HelloApp;
use crate::config::HelloConfig;
use crate::view::ConsoleView;

/// Log targets for the binary.
pub(crate) mod targets {
    /// Process lifecycle.
    pub const MAIN: &str = "hello";
    /// Startup workflow and binding.
    pub const APP: &str = "hello::app";
    /// Console rendering.
    pub const VIEW: &str = "hello::view";
}

fn main() -> ExitCode {
    let config = HelloConfig::parse();
    init_tracing(&config);

    match run(&config) {
        Ok(()) => {
            tracing::debug!(target: targets::MAIN, "finished");
            ExitCode::from(ErrorCode::Success.exit_code())
        }
        Err(err) => {
            let code = err.exit_code();
            tracing::error!(
                target: targets::MAIN,
                error = %err,
                exit_code = code,
                "the program encountered an unhandled error"
            );
            eprintln!("{err}");
            ExitCode::from(code)
        }
    }
}

fn init_tracing(config: &HelloConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &HelloConfig) -> Result<()> {
    let runtime = AsyncRuntime::new(config.runtime_config())?;
    tracing::debug!(
        target: targets::MAIN,
        runtime_type = ?runtime.runtime_type(),
        "runtime ready"
    );

    let culture = config.install_culture()?;
    tracing::info!(target: targets::MAIN, %culture, "starting");

    let app = Arc::new(
        HelloApp::new(GreetingService::new(), culture).with_retrieval_timeout(config.timeout()),
    );
    let view = Arc::new(ConsoleView::stdout());
    let token = CancellationToken::new();

    let result = {
        let _span = PerfSpan::new("startup");
        runtime.block_on(app.start(runtime.handle(), &view, &token))
    };
    runtime.shutdown();

    if result.is_ok() {
        tracing::debug!(
            target: targets::MAIN,
            model = ?app.model().map(String::from),
            displayed = ?view.display_text(),
            "startup complete"
        );
    }
    result
}
