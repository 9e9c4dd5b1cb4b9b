//! Upstream transports and the fan-out dispatcher (C2/C3).
//!
//! Grounded on the teacher's `protocol/udp.rs` (socket send/recv shape) and
//! `transport/doh.rs` (DoH framing, `application/dns-message`), recombined
//! into a client role the teacher doesn't have — the teacher only serves
//! DoH, it never calls out over it.

mod dispatcher;
mod doh;
mod udp;

pub use dispatcher::Dispatcher;
pub use doh::DohUpstream;
pub use udp::UdpUpstream;

use crate::error::DnsCachedError;

/// One upstream endpoint, either classic UDP or DoH. An enum rather than a
/// boxed trait object: the dispatcher only ever holds these two concrete
/// kinds, and a native `async fn` in a trait isn't dyn-compatible without
/// extra boxing ceremony the teacher's own code doesn't use either.
pub enum Transport {
    Udp(UdpUpstream),
    Doh(DohUpstream),
}

impl Transport {
    pub async fn query(&self, wire: &[u8]) -> Result<Vec<u8>, DnsCachedError> {
        match self {
            Transport::Udp(t) => t.query(wire).await,
            Transport::Doh(t) => t.query(wire).await,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Transport::Udp(t) => t.label(),
            Transport::Doh(t) => t.label(),
        }
    }
}
