// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! One attempt per (host, nameserver) pair.
//!
//! An [`Attempt`] is shared between the dispatcher and the backend. The dispatcher keeps one `Arc`
//! while it initiates the query and hands a second one, wrapped in a [`Completion`], to the
//! backend. Whichever side lets go last frees the attempt and with it the attempt's hold on the
//! [`Coordinator`]. A backend that completes inline simply releases both back to back.

use std::fmt::Display;
use std::net::IpAddr;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::coordinator::{Coordinator, Report};
use crate::nameserver::NameServer;
use crate::resolution::ResultCode;

#[derive(Debug)]
pub struct Attempt {
    index: usize,
    server: Option<NameServer>,
    coordinator: Arc<Coordinator>,
}

impl Attempt {
    pub fn new(index: usize, server: Option<NameServer>, coordinator: Arc<Coordinator>) -> Arc<Attempt> {
        trace!(
            "Created attempt {} for '{}' using {}.",
            index,
            coordinator.host(),
            server.as_ref().map(ToString::to_string).unwrap_or_else(|| "default nameserver".to_string())
        );
        Arc::new(Attempt {
            index,
            server,
            coordinator,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Nameserver to ask; `None` means the backend's default.
    pub fn server(&self) -> Option<&NameServer> {
        self.server.as_ref()
    }

    pub fn host(&self) -> &str {
        self.coordinator.host()
    }

    /// Creates the one completion for this attempt, taking a second share of ownership.
    pub fn completion(self: &Arc<Self>) -> Completion {
        Completion {
            attempt: Some(Arc::clone(self)),
        }
    }
}

impl Drop for Attempt {
    fn drop(&mut self) {
        trace!("Released attempt {} for '{}'.", self.index, self.coordinator.host());
    }
}

/// One-shot completion of an [`Attempt`].
///
/// Consuming methods take `self`, so a completion reports at most once. A completion that is
/// dropped without reporting marks its slot `NotResolved`, so the request still finishes.
#[derive(Debug)]
#[must_use = "a completion must report the outcome of its attempt"]
pub struct Completion {
    attempt: Option<Arc<Attempt>>,
}

impl Completion {
    /// Slot this completion reports into.
    pub fn index(&self) -> usize {
        self.attempt.as_ref().map(|attempt| attempt.index).unwrap_or_default()
    }

    pub fn resolved(self, address: IpAddr) -> Report {
        self.report(|coordinator, index| coordinator.report_success(index, address))
    }

    pub fn failed(self, code: ResultCode) -> Report {
        self.report(|coordinator, index| coordinator.report_failure(index, code))
    }

    /// Reports a backend outcome; any error counts as `NotResolved`.
    pub fn finish<E: Display>(self, result: std::result::Result<IpAddr, E>) -> Report {
        match result {
            Ok(address) => self.resolved(address),
            Err(err) => {
                debug!("Lookup for slot {} failed: {}", self.index(), err);
                self.failed(ResultCode::NotResolved)
            }
        }
    }

    fn report<F: FnOnce(&Coordinator, usize) -> Report>(mut self, report: F) -> Report {
        match self.attempt.take() {
            Some(attempt) => report(&attempt.coordinator, attempt.index),
            None => Report::Duplicate,
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            warn!(
                "Completion for slot {} of '{}' dropped without result.",
                attempt.index,
                attempt.coordinator.host()
            );
            attempt.coordinator.report_failure(attempt.index, ResultCode::NotResolved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::net::Ipv4Addr;
    use std::thread;
    use tokio::sync::oneshot;

    use crate::utils::tests::logging;

    fn coordinator(slots: usize) -> (Arc<Coordinator>, oneshot::Receiver<crate::Resolution>) {
        let (tx, rx) = oneshot::channel();
        (Arc::new(Coordinator::new("example.com", slots, tx)), rx)
    }

    #[test]
    fn inline_completion_frees_attempt() {
        logging::init();
        let (coordinator, mut rx) = coordinator(1);
        let attempt = Attempt::new(0, None, coordinator.clone());
        let weak = Arc::downgrade(&attempt);

        let completion = attempt.completion();
        asserting("dispatcher and completion share the attempt")
            .that(&Arc::strong_count(&attempt))
            .is_equal_to(2);
        completion.resolved(IpAddr::V4(Ipv4Addr::LOCALHOST));
        drop(attempt);

        assert_that(&weak.upgrade().is_none()).is_true();
        assert_that(&Arc::strong_count(&coordinator)).is_equal_to(1);
        assert_that(&rx.try_recv().unwrap().addresses()[0].is_success()).is_true();
    }

    #[test]
    fn completion_outlives_dispatcher() {
        logging::init();
        let (coordinator, mut rx) = coordinator(1);
        let attempt = Attempt::new(0, None, coordinator.clone());
        let weak = Arc::downgrade(&attempt);
        let completion = attempt.completion();
        drop(attempt);

        asserting("backend keeps attempt alive")
            .that(&weak.upgrade().is_some())
            .is_true();

        thread::spawn(move || completion.failed(ResultCode::NotResolved))
            .join()
            .unwrap();

        assert_that(&weak.upgrade().is_none()).is_true();
        assert_that(&rx.try_recv().unwrap().addresses()[0].code()).is_equal_to(ResultCode::NotResolved);
    }

    #[test]
    fn dropped_completion_reports_not_resolved() {
        logging::init();
        let (coordinator, mut rx) = coordinator(1);
        let attempt = Attempt::new(0, None, coordinator);

        drop(attempt.completion());

        let resolution = rx.try_recv().unwrap();
        assert_that(&resolution.addresses()[0].code()).is_equal_to(ResultCode::NotResolved);
    }

    #[test]
    fn finish_maps_errors_to_not_resolved() {
        logging::init();
        let (coordinator, mut rx) = coordinator(2);
        let attempt_0 = Attempt::new(0, None, coordinator.clone());
        let attempt_1 = Attempt::new(1, None, coordinator);

        let report_0 = attempt_0.completion().finish::<&str>(Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)));
        let report_1 = attempt_1.completion().finish::<&str>(Err("no records found"));

        assert_that(&report_0).is_equal_to(Report::Accepted);
        assert_that(&report_1).is_equal_to(Report::Completed);
        let resolution = rx.try_recv().unwrap();
        assert_that(&resolution.addresses()[1].code()).is_equal_to(ResultCode::NotResolved);
    }
}
