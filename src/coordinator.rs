// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Aggregation of the per-nameserver results of one resolution request.
//!
//! A [`Coordinator`] owns a pre-sized arena of write-once slots, one per attempt, and the sending
//! half of the caller's one-shot channel. Attempts report into their own slot from whatever thread
//! their backend completes on. Slot writes never contend because every attempt owns a distinct
//! index; the only shared decision is which report was the last one, and that is settled by an
//! atomic increment-then-compare on the completed counter, guarded by a delivered flag.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::resolution::{Resolution, ResolvedAddress, ResultCode};

/// What happened to a slot report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Slot written, more slots outstanding.
    Accepted,
    /// Slot written and it was the last one; the aggregate has been delivered.
    Completed,
    /// Slot had already been written; the report has been dropped.
    Duplicate,
    /// No such slot; the report has been dropped.
    OutOfRange,
    /// `Success` reported as a failure code; the report has been dropped.
    Invalid,
}

impl Report {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Report::Accepted | Report::Completed)
    }
}

#[derive(Debug)]
pub struct Coordinator {
    host: String,
    slots: Box<[OnceLock<ResolvedAddress>]>,
    completed: AtomicUsize,
    delivered: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<Resolution>>>,
}

impl Coordinator {
    /// Creates a coordinator with `slot_count` slots, but at least one.
    pub fn new<S: Into<String>>(host: S, slot_count: usize, sender: oneshot::Sender<Resolution>) -> Coordinator {
        let slots: Box<[OnceLock<ResolvedAddress>]> = (0..slot_count.max(1)).map(|_| OnceLock::new()).collect();

        Coordinator {
            host: host.into(),
            slots,
            completed: AtomicUsize::new(0),
            delivered: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
        }
    }

    pub fn report_success(&self, index: usize, address: IpAddr) -> Report {
        debug!("Slot {} for '{}' resolved to {}.", index, self.host, address);
        self.report(index, ResolvedAddress::resolved(address))
    }

    pub fn report_failure(&self, index: usize, code: ResultCode) -> Report {
        debug!("Slot {} for '{}' failed with {}.", index, self.host, code);
        if code.is_success() {
            warn!("Ignoring failure report with code {} for slot {} of '{}'.", code, index, self.host);
            return Report::Invalid;
        }
        self.report(index, ResolvedAddress::failed(code))
    }

    fn report(&self, index: usize, address: ResolvedAddress) -> Report {
        let slot = match self.slots.get(index) {
            Some(slot) => slot,
            None => {
                warn!(
                    "Ignoring report for slot {} of '{}'; only {} slots exist.",
                    index,
                    self.host,
                    self.slots.len()
                );
                return Report::OutOfRange;
            }
        };
        if slot.set(address).is_err() {
            warn!("Ignoring duplicate report for slot {} of '{}'.", index, self.host);
            return Report::Duplicate;
        }

        // The RMW chain on `completed` makes every earlier slot write visible to the last reporter.
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("'{}' has {}/{} slots completed.", self.host, completed, self.slots.len());
        if completed == self.slots.len() && self.deliver() {
            Report::Completed
        } else {
            Report::Accepted
        }
    }

    /// Hands the aggregate to the caller; returns `true` only for the single call that delivers.
    fn deliver(&self) -> bool {
        if self
            .delivered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let addresses = match self.snapshot() {
            Some(addresses) => addresses,
            None => {
                warn!("Delivering '{}' with unwritten slots.", self.host);
                return false;
            }
        };
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(sender) => {
                if sender.send(Resolution::new(self.host.clone(), addresses)).is_err() {
                    debug!("Caller is gone; discarding resolution of '{}'.", self.host);
                }
            }
            None => warn!("Resolution of '{}' has already been delivered.", self.host),
        }
        debug!("Finished resolution of '{}'.", self.host);

        true
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub fn is_complete(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    /// Returns all slots in order once every slot has been written, `None` before.
    pub fn snapshot(&self) -> Option<Vec<ResolvedAddress>> {
        if self.completed() < self.slots.len() {
            return None;
        }
        self.slots.iter().map(|slot| slot.get().cloned()).collect()
    }
}
