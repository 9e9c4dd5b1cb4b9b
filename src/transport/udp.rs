use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

use crate::error::DnsCachedError;

const QUERY_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_REPLY: usize = 4096;

/// A classic UDP(/53) upstream. One ephemeral socket per query, grounded on
/// the teacher's `protocol/udp.rs` send/recv shape, stripped of the rate
/// limiter and permit manager the teacher needs for an inbound listener but
/// an outbound client has no use for.
pub struct UdpUpstream {
    addr: SocketAddr,
    label: String,
}

impl UdpUpstream {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            label: addr.to_string(),
        }
    }

    pub async fn query(&self, wire: &[u8]) -> Result<Vec<u8>, DnsCachedError> {
        let local: SocketAddr = if self.addr.is_ipv4() {
            "0.0.0.0:0".parse().unwrap()
        } else {
            "[::]:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(self.addr).await?;
        socket.send(wire).await?;

        let mut buf = vec![0u8; MAX_REPLY];
        let len = timeout(QUERY_TIMEOUT, socket.recv(&mut buf))
            .await
            .map_err(|_| DnsCachedError::UpstreamIo(format!("{} timed out", self.addr)))??;
        buf.truncate(len);
        trace!(upstream = %self.addr, bytes = len, "received UDP upstream reply");
        Ok(buf)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
