// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::convert::TryFrom;
use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{Error, Resolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Json,
    Summary,
}

impl TryFrom<&str> for OutputType {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "json" => Ok(OutputType::Json),
            "summary" => Ok(OutputType::Summary),
            _ => Err(Error::ParserError {
                what: value.to_string(),
                to: "OutputType",
                why: "invalid output type".to_string(),
            }),
        }
    }
}

/// Outcome of waiting for one host.
#[derive(Debug, Serialize)]
pub struct HostResult {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResult {
    pub fn new<S: Into<String>>(host: S, result: crate::Result<Resolution>) -> HostResult {
        match result {
            Ok(resolution) => HostResult {
                host: host.into(),
                resolution: Some(resolution),
                error: None,
            },
            Err(err) => HostResult {
                host: host.into(),
                resolution: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn has_success(&self) -> bool {
        self.resolution
            .as_ref()
            .map(|x| x.successes().next().is_some())
            .unwrap_or(false)
    }
}

pub fn output<W: Write>(writer: &mut W, output_type: OutputType, results: &[HostResult]) -> Result<()> {
    match output_type {
        OutputType::Json => {
            serde_json::to_writer_pretty(&mut *writer, results).context("failed to serialize results to JSON")?;
            writeln!(writer)?;
        }
        OutputType::Summary => {
            for result in results {
                match (&result.resolution, &result.error) {
                    (Some(resolution), _) => writeln!(writer, "{}", resolution)?,
                    (None, Some(error)) => writeln!(writer, "HOST {}\n\t{}", result.host, error)?,
                    (None, None) => writeln!(writer, "HOST {}", result.host)?,
                }
            }
        }
    }

    Ok(())
}
