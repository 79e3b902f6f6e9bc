// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::process;

use tracing::{debug, error};

use mresolve::app::cli_parser::create_parser;
use mresolve::app::logging::Logging;
use mresolve::app::run::run;
use mresolve::app::{AppConfig, ExitStatus};

#[tokio::main]
async fn main() {
    let args = match create_parser().try_get_matches() {
        Ok(args) => args,
        Err(err) => {
            let status = if err.use_stderr() {
                ExitStatus::CliParsingFailed
            } else {
                ExitStatus::Ok
            };
            let _ = err.print();
            process::exit(status as i32);
        }
    };

    let config = match AppConfig::try_from(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to parse configuration: {:#}", err);
            process::exit(ExitStatus::ConfigParsingFailed as i32);
        }
    };

    if let Err(err) = Logging::from(&config).start() {
        eprintln!("Failed to set up logging: {:#}", err);
        process::exit(ExitStatus::UnrecoverableError as i32);
    }
    debug!("Parsed args and set up logging.");

    let status = match run(&config).await {
        Ok(status) => status,
        Err(err) => {
            error!("Failed to run: {:#}", err);
            eprintln!("Error: {:#}", err);
            ExitStatus::UnrecoverableError
        }
    };
    debug!("Exiting with status {:?}.", status);

    process::exit(status as i32);
}
