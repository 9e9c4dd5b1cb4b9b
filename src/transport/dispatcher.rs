use tracing::{debug, warn};

use crate::error::DnsCachedError;

use super::Transport;

/// Fans a query out to upstreams in a fixed order: every configured DoH
/// endpoint first, then every configured UDP endpoint, both in the order
/// given in config. Returns the first reply any endpoint produces, success
/// or not — only a transport-level I/O failure advances to the next
/// endpoint (spec.md §4.3). Deliberately not randomized: an earlier revision
/// reseeded an RNG per dispatch to shuffle this order, which made failover
/// behavior nondeterministic and hard to reason about under test.
pub struct Dispatcher {
    transports: Vec<Transport>,
}

impl Dispatcher {
    pub fn new(transports: Vec<Transport>) -> Self {
        Self { transports }
    }

    pub async fn dispatch(&self, wire: &[u8]) -> Result<Vec<u8>, DnsCachedError> {
        for transport in &self.transports {
            match transport.query(wire).await {
                Ok(reply) => {
                    debug!(upstream = transport.label(), "upstream answered");
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(upstream = transport.label(), error = %e, "upstream failed, trying next");
                }
            }
        }
        Err(DnsCachedError::UpstreamExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UdpUpstream;

    #[tokio::test]
    async fn exhausted_when_no_transports_configured() {
        let dispatcher = Dispatcher::new(Vec::new());
        let err = dispatcher.dispatch(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, DnsCachedError::UpstreamExhausted));
    }

    #[tokio::test]
    async fn unreachable_transport_is_skipped() {
        // Port 0 on loopback refuses immediately; confirms a failing
        // transport doesn't panic the dispatcher, just exhausts it.
        let addr = "127.0.0.1:1".parse().unwrap();
        let dispatcher = Dispatcher::new(vec![Transport::Udp(UdpUpstream::new(addr))]);
        let err = dispatcher.dispatch(&[1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, DnsCachedError::UpstreamExhausted));
    }
}
