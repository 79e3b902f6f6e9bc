// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Instant;

use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig};
use hickory_resolver::lookup::Ipv4Lookup;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::attempt::Completion;
use crate::backend::{Backend, BackendOpts, Query, Refused};
use crate::nameserver::NameServer;
use crate::{Error, Result};

/// Resolves A records with hickory-resolver on a tokio runtime.
///
/// One resolver per nameserver is built on first use and kept for later queries. IPv4 literals are
/// answered inline without any network traffic.
pub struct HickoryBackend {
    runtime: Handle,
    opts: BackendOpts,
    resolvers: Mutex<HashMap<Option<NameServer>, TokioResolver>>,
}

impl HickoryBackend {
    pub fn new(runtime: Handle, opts: BackendOpts) -> HickoryBackend {
        HickoryBackend {
            runtime,
            opts,
            resolvers: Mutex::new(HashMap::new()),
        }
    }

    /// Uses the tokio runtime of the calling context.
    pub fn from_current(opts: BackendOpts) -> Result<HickoryBackend> {
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        Ok(HickoryBackend::new(runtime, opts))
    }

    pub fn opts(&self) -> &BackendOpts {
        &self.opts
    }

    fn resolver(&self, server: Option<&NameServer>) -> Result<TokioResolver> {
        let mut resolvers = self.resolvers.lock().map_err(|_| Error::InternalError {
            msg: "resolver cache lock poisoned",
        })?;
        let key = server.cloned();
        if let Some(resolver) = resolvers.get(&key) {
            return Ok(resolver.clone());
        }

        let resolver = match server {
            Some(server) => {
                let name_servers = NameServerConfigGroup::from_ips_clear(&[*server.ip_addr()], server.port(), true);
                let config = ResolverConfig::from_parts(None, Vec::new(), name_servers);
                TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
                    .with_options(self.opts.clone().into())
                    .build()
            }
            None => TokioResolver::builder_tokio()?
                .with_options(self.opts.clone().into())
                .build(),
        };
        debug!(
            "Created resolver for {}.",
            server.map(ToString::to_string).unwrap_or_else(|| "system nameservers".to_string())
        );
        resolvers.insert(key, resolver.clone());

        Ok(resolver)
    }
}

impl fmt::Debug for HickoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.resolvers.lock().map(|x| x.len()).unwrap_or_default();
        f.debug_struct("HickoryBackend")
            .field("opts", &self.opts)
            .field("cached_resolvers", &cached)
            .finish()
    }
}

impl Backend for HickoryBackend {
    fn dispatch(&self, query: Query, completion: Completion) -> std::result::Result<(), Refused> {
        if let Ok(ip) = Ipv4Addr::from_str(query.host()) {
            trace!("Answering IPv4 literal '{}' inline.", query.host());
            completion.resolved(IpAddr::V4(ip));
            return Ok(());
        }

        let resolver = match self.resolver(query.server()) {
            Ok(resolver) => resolver,
            Err(error) => return Err(Refused::new(completion, error)),
        };

        self.runtime.spawn(async move {
            let start_time = Instant::now();
            trace!("Sending query for '{}' to {:?}.", query.host(), query.server());
            let result = resolver
                .ipv4_lookup(query.host())
                .await
                .map_err(Error::from)
                .and_then(|lookup| first_address(query.host(), &lookup));
            debug!(
                "Lookup returned for '{}' from {:?} after {} ms: {}",
                query.host(),
                query.server(),
                start_time.elapsed().as_millis(),
                if result.is_err() { "error" } else { "ok" },
            );
            completion.finish(result)
        });

        Ok(())
    }
}

fn first_address(host: &str, lookup: &Ipv4Lookup) -> Result<IpAddr> {
    lookup
        .iter()
        .next()
        .map(|a| IpAddr::V4(a.0))
        .ok_or_else(|| Error::NoRecords { name: host.to_string() })
}
