// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use serde::Serialize;

use crate::Error;

pub mod predefined;

pub const DEFAULT_PORT: u16 = 53;

/// A nameserver reachable via UDP.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize)]
pub struct NameServer {
    ip_addr: IpAddr,
    port: u16,
}

impl NameServer {
    pub fn new<T: Into<SocketAddr>>(socket_addr: T) -> Self {
        let socket_addr = socket_addr.into();
        NameServer {
            ip_addr: socket_addr.ip(),
            port: socket_addr.port(),
        }
    }

    pub fn ip_addr(&self) -> &IpAddr {
        &self.ip_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip_addr, self.port)
    }
}

impl From<IpAddr> for NameServer {
    fn from(ip_addr: IpAddr) -> Self {
        NameServer::new((ip_addr, DEFAULT_PORT))
    }
}

/// Parses `8.8.8.8`, `8.8.8.8:5353`, `2001:db8::1`, and `[2001:db8::1]:5353`.
impl FromStr for NameServer {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ip_addr) = IpAddr::from_str(s) {
            return Ok(ip_addr.into());
        }
        if let Ok(socket_addr) = SocketAddr::from_str(s) {
            return Ok(NameServer::new(socket_addr));
        }
        // Bracketed IPv6 without port
        if let Some(ip_addr) = s
            .strip_prefix('[')
            .and_then(|x| x.strip_suffix(']'))
            .and_then(|x| IpAddr::from_str(x).ok())
        {
            return Ok(ip_addr.into());
        }

        Err(Error::ParserError {
            what: s.to_string(),
            to: "NameServer",
            why: "neither an IP address nor an IP address with port".to_string(),
        })
    }
}

impl fmt::Display for NameServer {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}:{}", format_ip_addr(&self.ip_addr), self.port)
    }
}

fn format_ip_addr(ip_addr: &IpAddr) -> String {
    match ip_addr {
        IpAddr::V4(ip) => ip.to_string(),
        IpAddr::V6(ip) => format!("[{}]", ip),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn parse_ipv4() {
        let ns = NameServer::from_str("8.8.8.8");

        assert_that(&ns)
            .is_ok()
            .is_equal_to(NameServer::new((Ipv4Addr::new(8, 8, 8, 8), 53)));
    }

    #[test]
    fn parse_ipv4_with_port() {
        let ns = NameServer::from_str("9.9.9.9:5353");

        assert_that(&ns)
            .is_ok()
            .is_equal_to(NameServer::new((Ipv4Addr::new(9, 9, 9, 9), 5353)));
    }

    #[test]
    fn parse_ipv6() {
        let expected = NameServer::new((Ipv6Addr::from_str("2606:4700::6810:f8f9").unwrap(), 53));

        assert_that(&NameServer::from_str("2606:4700::6810:f8f9"))
            .is_ok()
            .is_equal_to(&expected);
        assert_that(&NameServer::from_str("[2606:4700::6810:f8f9]"))
            .is_ok()
            .is_equal_to(&expected);
    }

    #[test]
    fn parse_ipv6_with_port() {
        let ns = NameServer::from_str("[2606:4700::6810:f8f9]:5353");

        assert_that(&ns)
            .is_ok()
            .map(|x| &x.port)
            .is_equal_to(5353);
    }

    #[test]
    fn parse_name_fails() {
        let ns = NameServer::from_str("dns.google");

        assert_that(&ns).is_err();
    }

    #[test]
    fn display_ipv6() {
        let ns = NameServer::new((Ipv6Addr::from_str("2606:4700::6810:f8f9").unwrap(), 53));
        let expected = "[2606:4700::6810:f8f9]:53";

        let display = ns.to_string();

        asserting("display equals parsable string")
            .that(&display.as_str())
            .is_equal_to(expected);
        assert_that(&NameServer::from_str(&display)).is_ok().is_equal_to(&ns);
    }
}
