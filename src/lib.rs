// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! mresolve resolves a host name against any number of nameservers at once and hands back exactly
//! one aggregated [`Resolution`] with one [`ResolvedAddress`] per nameserver.
//!
//! # Example
//! ```no_run
//! # async fn run() -> mresolve::Result<()> {
//! use mresolve::{BackendOpts, Client};
//!
//! let client = Client::hickory(BackendOpts::default())?;
//! let resolution = client.resolve("example.com", &["8.8.8.8", "9.9.9.9"]).await?;
//! println!("{}", resolution);
//! # Ok(())
//! # }
//! ```

pub mod attempt;
pub mod backend;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod nameserver;
pub mod resolution;
pub mod system_config;
mod utils;

#[cfg(feature = "app-cli")]
pub mod app;

pub use attempt::{Attempt, Completion};
pub use backend::{Backend, BackendOpts, HickoryBackend, Query, Refused};
pub use client::{Client, PendingResolution};
pub use coordinator::{Coordinator, Report};
pub use error::Error;
pub use nameserver::NameServer;
pub use resolution::{Resolution, ResolvedAddress, ResultCode};

pub type Result<T> = std::result::Result<T, Error>;
