//! The UDP Listener (C5): binds the configured address, demultiplexes
//! datagrams, and dispatches each to the Query Handler.
//!
//! Grounded on the teacher's `graceful_shutdown.rs` broadcast-channel
//! coordination, simplified to the one producer/one consumer this resolver
//! needs rather than the teacher's registered-component list.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::dns::DnsMessage;
use crate::error::DnsCachedError;
use crate::resolver::Resolver;

const MAX_DATAGRAM: usize = 4096;

pub struct UdpListener {
    socket: Arc<UdpSocket>,
    resolver: Arc<Resolver>,
}

impl UdpListener {
    pub async fn bind(addr: SocketAddr, resolver: Arc<Resolver>) -> Result<Self, DnsCachedError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| DnsCachedError::Bind { addr, source })?;
        info!(%addr, "UDP listener bound");
        Ok(Self {
            socket: Arc::new(socket),
            resolver,
        })
    }

    /// Blocks, answering datagrams, until `shutdown` fires.
    pub async fn serve(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), DnsCachedError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    let (len, source) = result?;
                    let data = buf[..len].to_vec();
                    let socket = self.socket.clone();
                    let resolver = self.resolver.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_datagram(&resolver, &socket, &data, source).await {
                            error!(%source, error = %e, "failed to handle datagram");
                        }
                    });
                }
                _ = shutdown.recv() => {
                    info!("UDP listener shutting down");
                    return Ok(());
                }
            }
        }
    }
}

async fn handle_datagram(
    resolver: &Resolver,
    socket: &UdpSocket,
    data: &[u8],
    source: SocketAddr,
) -> Result<(), DnsCachedError> {
    let request = match DnsMessage::parse(data) {
        Ok(request) => request,
        Err(e) => {
            warn!(%source, error = %e, "dropping undecodable datagram");
            return Ok(());
        }
    };

    let reply = resolver.handle(&request).await?;
    let wire = reply.to_wire()?;
    socket.send_to(&wire, source).await?;
    Ok(())
}
