// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::ffi::OsString;

use anyhow::{Context, Result};
use tracing::subscriber::set_global_default;
use tracing_log::LogTracer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::app::AppConfig;

/// Installs the global tracing subscriber for the binary.
///
/// Attempts complete on backend worker threads, so thread ids are always part of the output.
#[derive(Debug)]
pub struct Logging {
    verbosity: u8,
    rust_log: Option<OsString>,
    color: bool,
    debug: bool,
}

impl Logging {
    pub fn new(verbosity: u8, rust_log: Option<OsString>, color: bool, debug: bool) -> Logging {
        Logging {
            verbosity,
            rust_log,
            color,
            debug,
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn filter(&self) -> EnvFilter {
        match self.rust_log {
            // RUST_LOG overrides the verbosity flags
            Some(_) => EnvFilter::from_default_env(),
            None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), self.log_level())),
        }
    }

    pub fn start(self) -> Result<()> {
        // Subscribe to all log crate log messages and transform them to a tracing events
        LogTracer::init().context("failed to bridge log records")?;

        let fmt = fmt::layer()
            .with_ansi(self.color)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_target(self.debug);
        let fmt = if self.debug {
            fmt.with_span_events(FmtSpan::FULL)
        } else {
            fmt.with_span_events(FmtSpan::NONE)
        };

        let registry = tracing_subscriber::registry().with(self.filter()).with(fmt);
        set_global_default(registry).context("failed to install tracing subscriber")?;

        Ok(())
    }
}

impl From<&AppConfig> for Logging {
    fn from(config: &AppConfig) -> Self {
        Logging::new(
            config.verbosity,
            std::env::var_os("RUST_LOG"),
            config.color,
            config.debug,
        )
    }
}
