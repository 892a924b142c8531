//! # Packet Ingest Worker
//!
//! Owns the UDP listener. Each datagram is decoded, mapped, and applied:
//!
//! 1. Decode through the [`UpdateCodec`]; failures drop the packet
//! 2. Map against the last stored [`CursorDelta`](crate::control::cursor::CursorDelta)
//! 3. Store the new delta for the cursor mover
//! 4. Inject button actions in order
//!
//! Each receive is bounded by a short deadline so the loop re-checks the
//! cancellation signal even when no packets arrive. An elapsed deadline is
//! not an error. Any other socket error, and any injection error, is fatal.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::codec::UpdateCodec;
use crate::control::cursor::CursorWriter;
use crate::control::mapper::ControlMapper;
use crate::error::{ReceiverError, Result};
use crate::hid::HidInjector;
use crate::supervisor::WorkerHandle;

/// Where the listener comes from
#[derive(Debug)]
pub enum Listener {
    /// Bind on start, e.g. `0.0.0.0:8888`
    Address(String),
    /// Use an already bound socket
    Socket(UdpSocket),
}

impl Listener {
    async fn open(self) -> io::Result<UdpSocket> {
        match self {
            Listener::Address(addr) => UdpSocket::bind(addr).await,
            Listener::Socket(socket) => Ok(socket),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct IngestStats {
    packets: u64,
    dropped: u64,
}

/// Decode, map and inject stages, shared by every datagram
struct Pipeline {
    codec: Box<dyn UpdateCodec>,
    mapper: ControlMapper,
    cursor: CursorWriter,
    injector: Arc<dyn HidInjector>,
}

impl Pipeline {
    fn handle_datagram(&self, payload: &[u8]) -> Result<()> {
        let update = self.codec.decode(payload)?;
        debug!(?update, "Decoded update");

        let (delta, actions) = self.mapper.map(&update, self.cursor.latest());
        self.cursor.store(delta);

        for action in actions {
            self.injector.apply(action)?;
        }
        Ok(())
    }

    /// Bad packets are dropped; only non-transient errors escape.
    fn on_datagram(&self, stats: &mut IngestStats, payload: &[u8], peer: SocketAddr) -> Result<()> {
        debug!("Received {} bytes from {}", payload.len(), peer);
        stats.packets += 1;

        match self.handle_datagram(payload) {
            Err(e) if e.is_transient() => {
                stats.dropped += 1;
                warn!("Dropping packet from {}: {}", peer, e);
                Ok(())
            }
            other => other,
        }
    }
}

/// UDP receive → decode → map → inject loop
pub struct PacketIngest {
    listener: Listener,
    max_datagram: usize,
    receive_timeout: Duration,
    pipeline: Pipeline,
}

impl PacketIngest {
    #[must_use]
    pub fn new(
        listener: Listener,
        max_datagram: usize,
        receive_timeout: Duration,
        codec: Box<dyn UpdateCodec>,
        mapper: ControlMapper,
        cursor: CursorWriter,
        injector: Arc<dyn HidInjector>,
    ) -> Self {
        Self {
            listener,
            max_datagram: max_datagram.max(1),
            receive_timeout,
            pipeline: Pipeline {
                codec,
                mapper,
                cursor,
                injector,
            },
        }
    }

    pub async fn run(self, handle: WorkerHandle) {
        info!("Starting event listener");

        let Self {
            listener,
            max_datagram,
            receive_timeout,
            pipeline,
        } = self;

        let socket = match listener.open().await {
            Ok(socket) => socket,
            Err(e) => return handle.fail(e.into()),
        };

        match socket.local_addr() {
            Ok(addr) => info!("Listening for controller updates on {}", addr),
            Err(e) => return handle.fail(e.into()),
        }

        let mut buffer = vec![0u8; max_datagram];
        let mut stats = IngestStats::default();

        loop {
            match timeout(receive_timeout, socket.recv_from(&mut buffer)).await {
                Err(_elapsed) => trace!("Receive deadline elapsed"),
                Ok(Ok((len, peer))) => {
                    if let Err(e) = pipeline.on_datagram(&mut stats, &buffer[..len], peer) {
                        return handle.fail(e);
                    }
                }
                Ok(Err(e)) => {
                    let err = ReceiverError::from(e);
                    if !err.is_transient() {
                        return handle.fail(err);
                    }
                    trace!("Transient receive error: {}", err);
                }
            }

            if handle.is_cancelled() {
                break;
            }
        }

        info!(
            "Shutdown event listener ({} packets, {} dropped)",
            stats.packets, stats.dropped
        );
        drop(socket);
        handle.complete();
    }
}
