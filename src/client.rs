// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::attempt::Attempt;
use crate::backend::{Backend, BackendOpts, HickoryBackend, Query};
use crate::coordinator::Coordinator;
use crate::nameserver::NameServer;
use crate::resolution::{Resolution, ResultCode};
use crate::{Error, Result};

/// Fans out one query per nameserver and aggregates the answers.
///
/// `resolve` never blocks and never fails; every problem ends up as the result code of the
/// affected slot.
#[derive(Debug, Clone)]
pub struct Client {
    backend: Arc<dyn Backend>,
}

impl Client {
    pub fn new(backend: Arc<dyn Backend>) -> Client {
        Client { backend }
    }

    /// Creates a client backed by hickory-resolver on the current tokio runtime.
    pub fn hickory(opts: BackendOpts) -> Result<Client> {
        let backend = HickoryBackend::from_current(opts)?;
        Ok(Client::new(Arc::new(backend)))
    }

    /// Resolves `host` against every server in `servers`, or against the backend's default
    /// nameserver if `servers` is empty.
    ///
    /// A server that cannot be parsed yields `InternalError` for its slot.
    pub fn resolve<S: AsRef<str>>(&self, host: &str, servers: &[S]) -> PendingResolution {
        let servers = servers.iter().map(|x| NameServer::from_str(x.as_ref())).collect();
        self.resolve_all(host, servers)
    }

    pub fn resolve_with(&self, host: &str, servers: &[NameServer]) -> PendingResolution {
        let servers = servers.iter().cloned().map(Ok).collect();
        self.resolve_all(host, servers)
    }

    fn resolve_all(&self, host: &str, servers: Vec<Result<NameServer>>) -> PendingResolution {
        let (sender, receiver) = oneshot::channel();

        if host.is_empty() {
            debug!("Refusing to resolve empty host.");
            let coordinator = Coordinator::new(host, 1, sender);
            coordinator.report_failure(0, ResultCode::EmptyHost);
            return PendingResolution::new(receiver);
        }

        let coordinator = Arc::new(Coordinator::new(host, servers.len(), sender));
        debug!("Resolving '{}' with {} attempts.", host, coordinator.slot_count());

        if servers.is_empty() {
            self.dispatch(&coordinator, 0, None);
        }
        for (index, server) in servers.into_iter().enumerate() {
            match server {
                Ok(server) => self.dispatch(&coordinator, index, Some(server)),
                Err(err) => {
                    warn!("Cannot use nameserver for slot {} of '{}': {}", index, host, err);
                    coordinator.report_failure(index, ResultCode::InternalError);
                }
            }
        }

        PendingResolution::new(receiver)
    }

    fn dispatch(&self, coordinator: &Arc<Coordinator>, index: usize, server: Option<NameServer>) {
        let attempt = Attempt::new(index, server.clone(), Arc::clone(coordinator));
        let query = Query::new(attempt.host(), server);

        if let Err(refused) = self.backend.dispatch(query, attempt.completion()) {
            warn!(
                "Backend refused attempt {} for '{}': {}",
                index,
                attempt.host(),
                refused.error
            );
            refused.completion.failed(ResultCode::InternalError);
        }
        // Dropping `attempt` releases the dispatcher's share; the completion holds the other one.
    }
}

/// Deferred handle to the aggregate of one resolution request.
///
/// Await it, wait with a timeout, poll it with `try_take`, or block on it with `wait`. Giving up
/// on it does not cancel outstanding attempts.
#[derive(Debug)]
#[must_use = "a pending resolution does nothing unless waited on"]
pub struct PendingResolution {
    receiver: oneshot::Receiver<Resolution>,
}

impl PendingResolution {
    fn new(receiver: oneshot::Receiver<Resolution>) -> PendingResolution {
        PendingResolution { receiver }
    }

    /// Waits at most `timeout`; on `Error::Timeout` the handle may be waited on again.
    pub async fn wait_timeout(&mut self, timeout: Duration) -> Result<Resolution> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(resolution)) => Ok(resolution),
            Ok(Err(_)) => Err(Error::Abandoned),
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Takes the aggregate if it has been delivered already.
    ///
    /// Once this returned `Some`, the handle is spent.
    pub fn try_take(&mut self) -> Option<Resolution> {
        self.receiver.try_recv().ok()
    }

    /// Blocks the current thread until the aggregate arrives.
    ///
    /// Must not be called from within an async context.
    pub fn wait(self) -> Result<Resolution> {
        self.receiver.blocking_recv().map_err(|_| Error::Abandoned)
    }
}

impl Future for PendingResolution {
    type Output = Result<Resolution>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|x| x.map_err(|_| Error::Abandoned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use spectral::prelude::*;
    use std::net::{IpAddr, Ipv4Addr};

    use crate::utils::tests::logging;
    use crate::utils::tests::scripted::{Script, ScriptedBackend};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    static SERVERS: &[&str] = &["8.8.8.8", "9.9.9.9", "1.1.1.1"];

    #[tokio::test]
    async fn empty_host_never_reaches_backend() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Inline);
        let client = Client::new(backend.clone());

        let resolution = client.resolve("", SERVERS).await.unwrap();

        assert_that(&resolution.len()).is_equal_to(1);
        assert_that(&resolution.addresses()[0].code()).is_equal_to(ResultCode::EmptyHost);
        assert_that(&resolution.addresses()[0].address()).is_none();
        assert_that(&backend.dispatched()).is_equal_to(0);
    }

    #[tokio::test]
    async fn no_servers_uses_default_attempt() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Inline);
        backend.answer(None, ip(1));
        let client = Client::new(backend.clone());

        let resolution = client.resolve::<&str>("example.com", &[]).await.unwrap();

        assert_that(&resolution.len()).is_equal_to(1);
        assert_that(&resolution.addresses()[0].address()).is_some().is_equal_to(&ip(1));
        assert_that(&backend.queries()).is_equal_to(vec![Query::new("example.com", None)]);
    }

    #[tokio::test]
    async fn slots_follow_server_order_not_arrival_order() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Reversed);
        for (i, server) in SERVERS.iter().enumerate() {
            backend.answer(Some(server.parse().unwrap()), ip(i as u8 + 1));
        }
        let client = Client::new(backend.clone());

        let resolution = client.resolve("example.com", SERVERS).await.unwrap();

        let addresses: Vec<_> = resolution.iter().map(|x| x.address().cloned()).collect();
        assert_that(&addresses).is_equal_to(vec![Some(ip(1)), Some(ip(2)), Some(ip(3))]);
        assert_that(&resolution.successes().count()).is_equal_to(3);
    }

    #[tokio::test]
    async fn middle_failure_is_slot_scoped() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Held);
        backend.answer(Some(SERVERS[0].parse().unwrap()), ip(1));
        backend.answer(Some(SERVERS[2].parse().unwrap()), ip(3));
        let client = Client::new(backend.clone());

        let mut pending = client.resolve("example.com", SERVERS);
        backend.release(0);
        backend.release(2);
        asserting("not delivered after two of three")
            .that(&pending.try_take().is_none())
            .is_true();
        backend.release(1);

        let resolution = pending.await.unwrap();
        assert_that(&resolution.failures().count()).is_equal_to(1);
        assert_that(&resolution.addresses()[1].code()).is_equal_to(ResultCode::NotResolved);
        assert_that(&resolution.successes().count()).is_equal_to(2);
    }

    #[tokio::test]
    async fn unparsable_server_is_internal_error() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Inline);
        backend.answer(Some(SERVERS[0].parse().unwrap()), ip(1));
        let client = Client::new(backend.clone());

        let resolution = client.resolve("example.com", &["8.8.8.8", "dns.google"]).await.unwrap();

        assert_that(&resolution.addresses()[0].is_success()).is_true();
        assert_that(&resolution.addresses()[1].code()).is_equal_to(ResultCode::InternalError);
        assert_that(&backend.dispatched()).is_equal_to(1);
    }

    #[tokio::test]
    async fn refused_dispatch_is_internal_error() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Refuse);
        let client = Client::new(backend);

        let resolution = client.resolve("example.com", SERVERS).await.unwrap();

        assert_that(&resolution.failures().all(|x| x.code() == ResultCode::InternalError)).is_true();
        assert_that(&resolution.len()).is_equal_to(3);
    }

    #[tokio::test]
    async fn lost_completion_is_not_resolved() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Lose);
        let client = Client::new(backend);

        let resolution = client.resolve("example.com", SERVERS).await.unwrap();

        assert_that(&resolution.failures().all(|x| x.code() == ResultCode::NotResolved)).is_true();
    }

    #[tokio::test]
    async fn timeout_stops_waiting_only() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Held);
        let client = Client::new(backend.clone());

        let mut pending = client.resolve("example.com", &["8.8.8.8"]);
        let timed_out = pending.wait_timeout(Duration::from_millis(10)).await;
        assert_that(&matches!(timed_out, Err(Error::Timeout))).is_true();

        backend.release(0);
        let resolution = pending.wait_timeout(Duration::from_secs(1)).await.unwrap();
        assert_that(&resolution.addresses()[0].code()).is_equal_to(ResultCode::NotResolved);
    }

    #[test]
    fn wait_blocks_until_delivered() {
        logging::init();
        let backend = ScriptedBackend::new(Script::Threaded);
        backend.answer(Some(SERVERS[1].parse().unwrap()), ip(2));
        let client = Client::new(backend);

        let resolution = client.resolve("example.com", SERVERS).wait().unwrap();

        assert_that(&resolution.addresses()[1].address()).is_some().is_equal_to(&ip(2));
        assert_that(&resolution.failures().count()).is_equal_to(2);
    }
}
