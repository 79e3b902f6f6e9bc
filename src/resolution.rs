// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::net::IpAddr;
use std::slice::Iter;

use serde::Serialize;

/// Outcome of the resolution on one nameserver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    EmptyHost,
    NotResolved,
    InternalError,
}

impl ResultCode {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let str = match self {
            ResultCode::Success => "SUCCESS",
            ResultCode::EmptyHost => "EMPTY_HOST",
            ResultCode::NotResolved => "NOT_RESOLVED",
            ResultCode::InternalError => "INTERNAL_ERROR",
        };
        fmt.write_str(str)
    }
}

/// Result for one slot of a [`Resolution`].
///
/// An address is present if and only if the code is [`ResultCode::Success`]; the constructors
/// are the only way to build one, so the pairing cannot be broken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAddress {
    address: Option<IpAddr>,
    code: ResultCode,
}

impl ResolvedAddress {
    pub fn resolved(address: IpAddr) -> Self {
        ResolvedAddress {
            address: Some(address),
            code: ResultCode::Success,
        }
    }

    /// A failed slot. `Success` is not a failure and is turned into `InternalError`.
    pub fn failed(code: ResultCode) -> Self {
        let code = if code.is_success() {
            ResultCode::InternalError
        } else {
            code
        };
        ResolvedAddress { address: None, code }
    }

    pub fn address(&self) -> Option<&IpAddr> {
        self.address.as_ref()
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match &self.address {
            Some(address) => write!(fmt, "{} {}", self.code, address),
            None => write!(fmt, "{}", self.code),
        }
    }
}

/// The finished aggregate of one resolution request.
///
/// Entries are ordered by slot, i.e., the n-th entry belongs to the n-th nameserver of the
/// request, or to the single default attempt if no nameservers were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    host: String,
    addresses: Vec<ResolvedAddress>,
}

impl Resolution {
    pub(crate) fn new(host: String, addresses: Vec<ResolvedAddress>) -> Resolution {
        Resolution { host, addresses }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn addresses(&self) -> &[ResolvedAddress] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> Iter<ResolvedAddress> {
        self.addresses.iter()
    }

    pub fn successes(&self) -> impl Iterator<Item = &ResolvedAddress> {
        self.addresses.iter().filter(|x| x.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResolvedAddress> {
        self.addresses.iter().filter(|x| !x.is_success())
    }
}

impl IntoIterator for Resolution {
    type Item = ResolvedAddress;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

/// Diagnostic rendering: a header line followed by one line per slot.
impl fmt::Display for Resolution {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "HOST {}", self.host)?;
        for address in &self.addresses {
            write!(fmt, "\n\t{}", address)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::net::Ipv4Addr;

    #[test]
    fn failed_never_carries_success() {
        let address = ResolvedAddress::failed(ResultCode::Success);

        asserting("success is not a failure code")
            .that(&address.code())
            .is_equal_to(ResultCode::InternalError);
        assert_that(&address.address()).is_none();
    }

    #[test]
    fn resolved_carries_address() {
        let ip = IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34));
        let address = ResolvedAddress::resolved(ip);

        assert_that(&address.is_success()).is_true();
        assert_that(&address.address()).is_some().is_equal_to(&ip);
    }

    #[test]
    fn display_renders_one_line_per_slot() {
        let resolution = Resolution::new(
            "example.com".to_string(),
            vec![
                ResolvedAddress::resolved(IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))),
                ResolvedAddress::failed(ResultCode::NotResolved),
            ],
        );
        let expected = "HOST example.com\n\tSUCCESS 93.184.216.34\n\tNOT_RESOLVED";

        let display = resolution.to_string();

        asserting("rendering lists every slot")
            .that(&display.as_str())
            .is_equal_to(expected);
    }

    #[test]
    fn result_code_serializes_screaming() {
        let json = serde_json::to_string(&ResultCode::NotResolved).unwrap();

        assert_that(&json.as_str()).is_equal_to("\"NOT_RESOLVED\"");
    }
}
