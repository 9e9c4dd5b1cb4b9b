//! The Query Handler (C4): decides cache-lookup vs. pass-through for an
//! inbound request and assembles the client-facing reply.
//!
//! Grounded on the teacher's `resolver.rs` top-level `resolve` dispatch, cut
//! down to the spec's decision tree — no blocklist, no DNSSEC, no zone
//! authority; those subsystems have no counterpart here.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::cache::{Cache, fingerprint};
use crate::dns::{DnsMessage, DnsType, Rcode};
use crate::error::DnsCachedError;
use crate::transport::Dispatcher;

/// Resolves queries against the cache, falling back to the upstream
/// dispatcher on miss or pass-through.
pub struct Resolver {
    cache: Arc<Cache>,
    dispatcher: Arc<Dispatcher>,
    /// Coalesces concurrent misses on the same fingerprint so only one
    /// upstream query is in flight per key at a time (spec.md §4.4,
    /// "single-flight, optional but recommended"). A `broadcast` channel
    /// rather than `Notify`: a follower must subscribe synchronously, under
    /// `in_flight`'s lock, the same instant it observes a leader already in
    /// flight — `Notify::notified()` only registers the waiter on first
    /// poll, so a follower that hasn't reached its `.await` yet when the
    /// leader calls `notify_waiters()` misses the wakeup and hangs forever.
    /// `Sender::subscribe()` has no such gap (teacher's `resolver.rs`
    /// in-flight map, via `sender.subscribe()`).
    in_flight: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl Resolver {
    pub fn new(cache: Arc<Cache>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            cache,
            dispatcher,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Answers one inbound request, returning the reply to send back to the
    /// client.
    pub async fn handle(&self, request: &DnsMessage) -> Result<DnsMessage, DnsCachedError> {
        if request.questions.len() != 1 {
            debug!(count = request.questions.len(), "pass-through: question count != 1");
            return self.pass_through(request).await;
        }

        let question = &request.questions[0];
        if !matches!(question.qtype, DnsType::A | DnsType::Aaaa) {
            debug!(qtype = ?question.qtype, "pass-through: non-A/AAAA question");
            return self.pass_through(request).await;
        }

        let Some(key) = fingerprint(&question.name, question.qtype) else {
            return self.pass_through(request).await;
        };

        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(DnsMessage::reply_from(request, &cached));
        }

        self.resolve_miss(request, &key).await
    }

    async fn resolve_miss(
        &self,
        request: &DnsMessage,
        key: &str,
    ) -> Result<DnsMessage, DnsCachedError> {
        loop {
            // Subscribe (or become leader) while still holding the lock, so
            // a follower can never observe a leader in flight and then miss
            // its completion signal.
            let receiver = {
                let mut in_flight = self.in_flight.lock();
                if let Some(sender) = in_flight.get(key) {
                    Some(sender.subscribe())
                } else {
                    let (tx, _rx) = broadcast::channel(1);
                    in_flight.insert(key.to_string(), tx);
                    None
                }
            };

            match receiver {
                Some(mut rx) => {
                    let _ = rx.recv().await;
                    if let Some(cached) = self.cache.get(key) {
                        return Ok(DnsMessage::reply_from(request, &cached));
                    }
                    // The leader's query failed; race for leadership again
                    // rather than returning its stale error to a follower.
                    continue;
                }
                None => return self.lead_miss(request, key).await,
            }
        }
    }

    async fn lead_miss(
        &self,
        request: &DnsMessage,
        key: &str,
    ) -> Result<DnsMessage, DnsCachedError> {
        let result = self.dispatch_single(request).await;

        let sender = self.in_flight.lock().remove(key);
        let reply = match &result {
            Ok(upstream) if upstream.rcode().is_success() => {
                if self.cache.insert(key.to_string(), upstream.clone()) {
                    debug!(key = %key, "cached upstream answer");
                }
                Ok(DnsMessage::reply_from(request, upstream))
            }
            Ok(upstream) => {
                warn!(key = %key, rcode = ?upstream.rcode(), "upstream returned non-success rcode");
                Ok(DnsMessage::error_reply(request, upstream.rcode()))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "upstream dispatch exhausted");
                Ok(DnsMessage::error_reply(request, Rcode::ServerFailure))
            }
        };

        if let Some(sender) = sender {
            // Err means no followers ever subscribed; nothing to wake.
            let _ = sender.send(());
        }
        reply
    }

    async fn pass_through(&self, request: &DnsMessage) -> Result<DnsMessage, DnsCachedError> {
        match self.dispatch_single(request).await {
            Ok(upstream) if upstream.rcode().is_success() => Ok(DnsMessage::reply_from(request, &upstream)),
            Ok(upstream) => Ok(DnsMessage::error_reply(request, upstream.rcode())),
            Err(e) => {
                warn!(error = %e, "pass-through dispatch exhausted");
                Ok(DnsMessage::error_reply(request, Rcode::ServerFailure))
            }
        }
    }

    async fn dispatch_single(&self, request: &DnsMessage) -> Result<DnsMessage, DnsCachedError> {
        let wire = request.to_wire()?;
        let reply_wire = self.dispatcher.dispatch(&wire).await?;
        DnsMessage::parse(&reply_wire).map_err(|e| DnsCachedError::UpstreamMalformed(e.to_string()))
    }
}
