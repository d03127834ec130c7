//! Tracing subscriber initialisation.
//!
//! Only the embedding host calls [`init_logging`]; `xtumlgen-core` only
//! *emits* spans and events and never touches subscribers.
//!
//! # Verbosity mapping
//!
//! | Settings         | Filter level |
//! |------------------|--------------|
//! | `verbose = 0`    | WARN         |
//! | `verbose = 1`    | INFO         |
//! | `verbose = 2`    | DEBUG        |
//! | `verbose >= 3`   | TRACE        |
//! | `quiet = true`   | ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How chatty the orchestrator's own diagnostics are.
///
/// Independent of the `quiet` option, which only governs toolchain output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub verbose: u8,
    pub quiet: bool,
    pub no_color: bool,
}

/// Initialise the global tracing subscriber.
///
/// Fails if a subscriber is already installed in this process.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let level = derive_level(settings);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "xtumlgen_core={level},xtumlgen_adapters={level}"
        ))
    });

    let use_ansi = !settings.no_color && std::io::stderr().is_terminal();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// Translate the verbosity counter and quiet flag to a level string.
fn derive_level(settings: &LogSettings) -> &'static str {
    if settings.quiet {
        return "error";
    }
    match settings.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
