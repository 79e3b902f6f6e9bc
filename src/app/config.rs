// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::app::output::OutputType;

#[derive(Debug)]
pub struct AppConfig {
    pub hosts: Vec<String>,
    pub nameservers: Vec<String>,
    pub predefined: bool,
    pub list_predefined: bool,
    pub use_system_resolv_opt: bool,
    pub resolv_conf_path: String,
    pub timeout: Option<Duration>,
    pub wait: Duration,
    pub output: OutputType,
    pub verbosity: u8,
    pub color: bool,
    pub debug: bool,
}

impl TryFrom<&ArgMatches> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ArgMatches) -> std::result::Result<Self, Self::Error> {
        let config = AppConfig {
            hosts: strings(args, "hosts"),
            nameservers: strings(args, "nameservers"),
            predefined: args.get_flag("predefined"),
            list_predefined: args.get_flag("list-predefined"),
            use_system_resolv_opt: !args.get_flag("no-system-resolv-opt"),
            resolv_conf_path: args
                .get_one::<String>("resolv-conf")
                .cloned()
                .context("no resolv.conf path given")?,
            timeout: args
                .get_one::<String>("timeout")
                .map(|x| parse_duration(x).context("failed to parse timeout"))
                .transpose()?,
            wait: args
                .get_one::<String>("wait")
                .map(|x| parse_duration(x).context("failed to parse wait duration"))
                .context("no wait duration given")??,
            output: args
                .get_one::<String>("output")
                .map(|x| OutputType::try_from(x.as_str()).context("failed to parse output type"))
                .context("no output type given")??,
            verbosity: args.get_count("v"),
            color: !args.get_flag("no-color"),
            debug: args.get_flag("debug"),
        };

        Ok(config)
    }
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn parse_duration(str: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(str)?;
    Ok(duration)
}
