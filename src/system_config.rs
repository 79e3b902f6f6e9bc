// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use resolv_conf::Config;

use crate::{Error, Result};

static RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

pub fn load_from_system_config<T: From<Config>>() -> Result<T> {
    load_from_system_config_path(RESOLV_CONF_PATH)
}

pub fn load_from_system_config_path<P: AsRef<Path>, T: From<Config>>(path: P) -> Result<T> {
    let mut buf = Vec::with_capacity(4096);
    let mut f = File::open(path)?;
    f.read_to_end(&mut buf)?;
    let cfg = parse(&buf)?;

    Ok(cfg.into())
}

pub(crate) fn parse(buf: &[u8]) -> Result<Config> {
    Config::parse(buf).map_err(|e| Error::ParserError {
        what: "resolv.conf".to_string(),
        to: "resolv_conf::Config",
        why: e.to_string(),
    })
}
