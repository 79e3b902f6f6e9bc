// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use clap::{Arg, ArgAction, Command};

pub static SUPPORTED_OUTPUT_FORMATS: &[&str] = &["json", "summary"];

pub fn create_parser() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("hosts")
                .value_name("HOST")
                .num_args(1..)
                .required_unless_present("list-predefined")
                .help("Host names to resolve"),
        )
        .arg(
            Arg::new("nameservers")
                .short('s')
                .long("nameserver")
                .value_name("IP ADDR")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .help("Adds nameserver for lookups")
                .long_help(
                    "Adds nameserver for lookups. A nameserver is given by IP address and optional port, e.g., 8.8.8.8, \
9.9.9.9:53, or [2620:fe::fe]:53. Every host is sent to every nameserver exactly once. If no nameserver is given, \
the system nameservers are used.",
                ),
        )
        .arg(
            Arg::new("predefined")
                .short('p')
                .long("predefined")
                .action(ArgAction::SetTrue)
                .help("Adds predefined nameservers for lookups"),
        )
        .arg(
            Arg::new("list-predefined")
                .long("list-predefined")
                .action(ArgAction::SetTrue)
                .conflicts_with("hosts")
                .help("Lists all predefined nameservers"),
        )
        .arg(
            Arg::new("no-system-resolv-opt")
                .long("no-system-resolv-opt")
                .action(ArgAction::SetTrue)
                .help("Ignores options set in /etc/resolv.conf"),
        )
        .arg(
            Arg::new("resolv-conf")
                .long("resolv-conf")
                .value_name("FILE")
                .default_value("/etc/resolv.conf")
                .help("Uses alternative resolv.conf file"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("DURATION")
                .help("Sets timeout for responses of each nameserver, e.g., 2s or 500ms"),
        )
        .arg(
            Arg::new("wait")
                .long("wait")
                .value_name("DURATION")
                .default_value("10s")
                .help("Sets how long to wait for all nameservers to report per host"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .value_parser(SUPPORTED_OUTPUT_FORMATS.to_vec())
                .default_value("summary")
                .help("Sets the output format"),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .action(ArgAction::SetTrue)
                .help("Disables colorful logging output"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Uses debug formatting for logging, which is much more verbose"),
        )
        .arg(
            Arg::new("v")
                .short('v')
                .action(ArgAction::Count)
                .help("Sets the level of verbosity"),
        )
}
