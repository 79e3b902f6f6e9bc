// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{debug, info};

use crate::app::output::{self, HostResult};
use crate::app::{AppConfig, ExitStatus};
use crate::nameserver::predefined;
use crate::{BackendOpts, Client};

pub async fn run(config: &AppConfig) -> Result<ExitStatus> {
    if config.list_predefined {
        list_predefined_nameservers(&mut io::stdout().lock())?;
        return Ok(ExitStatus::Ok);
    }

    let opts = backend_opts(config)?;
    debug!("Using backend options {:?}.", opts);
    let client = Client::hickory(opts).context("failed to create client")?;

    let servers = nameservers(config);
    info!(
        "Resolving {} hosts with {} nameservers each.",
        config.hosts.len(),
        servers.len().max(1)
    );

    let start_time = Instant::now();
    let waits = config.hosts.iter().map(|host| {
        let mut pending = client.resolve(host, &servers);
        let wait = config.wait;
        async move { HostResult::new(host.as_str(), pending.wait_timeout(wait).await) }
    });
    let results = join_all(waits).await;
    info!("Finished after {} ms.", start_time.elapsed().as_millis());

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::output(&mut handle, config.output, &results).context("failed to print results to stdout")?;

    if results.iter().all(HostResult::has_success) {
        Ok(ExitStatus::Ok)
    } else {
        Ok(ExitStatus::Failed)
    }
}

fn backend_opts(config: &AppConfig) -> Result<BackendOpts> {
    let mut opts = if config.use_system_resolv_opt {
        BackendOpts::from_system_config_path(&config.resolv_conf_path).context("failed to load system resolver options")?
    } else {
        BackendOpts::default()
    };
    if let Some(timeout) = config.timeout {
        opts.timeout = timeout;
    }

    Ok(opts)
}

fn nameservers(config: &AppConfig) -> Vec<String> {
    let mut servers = config.nameservers.clone();
    if config.predefined {
        servers.extend(predefined::name_servers().into_iter().map(|(_, ns)| ns.to_string()));
    }

    servers
}

fn list_predefined_nameservers<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(writer, "List of predefined servers:")?;
    for (name, ns) in predefined::name_servers() {
        writeln!(writer, "* {} ({})", ns, name)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::convert::TryFrom;

    use crate::app::cli_parser::create_parser;

    fn config(args: &[&str]) -> AppConfig {
        let args = create_parser().try_get_matches_from(args).unwrap();
        AppConfig::try_from(&args).unwrap()
    }

    #[test]
    fn predefined_are_appended() {
        let config = config(&["mresolve", "-s", "192.0.2.53", "-p", "example.com"]);

        let servers = nameservers(&config);

        assert_that(&servers).has_length(1 + predefined::name_servers().len());
        assert_that(&servers[0].as_str()).is_equal_to("192.0.2.53");
        assert_that(&servers[1].as_str()).is_equal_to("1.1.1.1:53");
    }

    #[test]
    fn timeout_overrides_defaults() {
        let config = config(&["mresolve", "--no-system-resolv-opt", "--timeout", "1s", "example.com"]);

        let opts = backend_opts(&config).unwrap();

        assert_that(&opts.timeout).is_equal_to(std::time::Duration::from_secs(1));
        assert_that(&opts.attempts).is_equal_to(1);
    }

    #[test]
    fn lists_predefined() {
        let mut buf = Vec::new();

        list_predefined_nameservers(&mut buf).unwrap();

        let str = String::from_utf8(buf).unwrap();
        assert_that(&str.contains("* 8.8.8.8:53 (Google)")).is_true();
    }

    #[tokio::test]
    async fn ip_literals_resolve_without_network() {
        let config = config(&["mresolve", "--no-system-resolv-opt", "-s", "192.0.2.53", "192.0.2.1"]);

        let status = run(&config).await.unwrap();

        assert_that(&status).is_equal_to(ExitStatus::Ok);
    }
}
