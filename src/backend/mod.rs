// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Name resolution primitives the client builds on.
//!
//! A [`Backend`] accepts one query together with the [`Completion`] of its attempt and must
//! eventually consume that completion exactly once, inline on the calling thread or later on any
//! thread it likes. If it cannot even start the query, it hands the completion back in [`Refused`].

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

pub use hickory::HickoryBackend;

use crate::attempt::Completion;
use crate::nameserver::NameServer;
use crate::{system_config, Error, Result};

pub mod hickory;

pub trait Backend: Debug + Send + Sync {
    fn dispatch(&self, query: Query, completion: Completion) -> std::result::Result<(), Refused>;
}

/// Single A lookup of `host`, optionally against a specific nameserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    host: String,
    server: Option<NameServer>,
}

impl Query {
    pub fn new<S: Into<String>>(host: S, server: Option<NameServer>) -> Query {
        Query {
            host: host.into(),
            server,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// `None` asks the backend to use its default nameserver.
    pub fn server(&self) -> Option<&NameServer> {
        self.server.as_ref()
    }
}

/// Returned by a backend that could not start a query; no completion will happen on its side.
#[derive(Debug)]
pub struct Refused {
    pub completion: Completion,
    pub error: Error,
}

impl Refused {
    pub fn new(completion: Completion, error: Error) -> Refused {
        Refused { completion, error }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOpts {
    /// Time to wait for one nameserver to answer
    pub timeout: Duration,
    /// Number of tries against the same nameserver; there is never a fallback to other nameservers
    pub attempts: usize,
    pub ndots: usize,
}

impl BackendOpts {
    /// Creates `BackendOpts` from local system configuration.
    ///
    /// Unix: Parses `/etc/resolv.conf`.
    pub fn from_system_config() -> Result<BackendOpts> {
        let opts = system_config::load_from_system_config()?;
        Ok(opts)
    }

    pub fn from_system_config_path<P: AsRef<Path>>(path: P) -> Result<BackendOpts> {
        let opts = system_config::load_from_system_config_path(path)?;
        Ok(opts)
    }
}

impl Default for BackendOpts {
    fn default() -> Self {
        BackendOpts {
            timeout: Duration::from_secs(5),
            attempts: 1,
            ndots: 1,
        }
    }
}

#[doc(hidden)]
impl From<resolv_conf::Config> for BackendOpts {
    fn from(config: resolv_conf::Config) -> Self {
        BackendOpts {
            timeout: Duration::from_secs(config.timeout as u64),
            attempts: config.attempts as usize,
            ndots: config.ndots as usize,
        }
    }
}

#[doc(hidden)]
impl From<BackendOpts> for hickory_resolver::config::ResolverOpts {
    fn from(opts: BackendOpts) -> Self {
        let mut resolver_opts = hickory_resolver::config::ResolverOpts::default();
        resolver_opts.timeout = opts.timeout;
        resolver_opts.attempts = opts.attempts;
        resolver_opts.ndots = opts.ndots;

        resolver_opts
    }
}
