//! UDP receive loop.
//!
//! One spawned task owns the socket: receive, decode, hand the packet to the
//! consumer over a bounded channel, repeat. Rejected datagrams are counted and
//! dropped; nothing that arrives on the wire can end the loop.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::DEFAULT_PORT;
use crate::decoder::{PacketDecoder, TelemetryPacket};
use crate::error::DecodeError;

/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "OPENRACING_F1_UDP_PORT";

/// Largest F1 24 packet is 1460 bytes; leave headroom for padding.
pub const MAX_PACKET_BYTES: usize = 2048;

const DEFAULT_CHANNEL_CAPACITY: usize = 100;

const SOCKET_ERROR_BACKOFF_BASE: Duration = Duration::from_millis(10);
const SOCKET_ERROR_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause before retrying after `consecutive` failed receives in a row.
fn socket_error_backoff(consecutive: u32) -> Duration {
    let shift = consecutive.saturating_sub(1).min(16);
    SOCKET_ERROR_BACKOFF_BASE
        .saturating_mul(1u32 << shift)
        .min(SOCKET_ERROR_BACKOFF_MAX)
}

/// Channel end handed to the consumer.
pub type TelemetryReceiver = mpsc::Receiver<TelemetryPacket>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    pub max_packet_bytes: usize,
    pub channel_capacity: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_packet_bytes: MAX_PACKET_BYTES,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ReceiverConfig {
    /// Defaults, with the port taken from [`ENV_PORT`] when it holds a
    /// non-zero `u16`.
    pub fn from_env() -> Self {
        Self::default().with_port(env_u16(ENV_PORT, DEFAULT_PORT))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr.set_port(port);
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }
}

fn env_u16(name: &str, fallback: u16) -> u16 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

/// Datagram counters, updated by the receive task.
#[derive(Debug, Default)]
pub struct ReceiverStats {
    received: AtomicU64,
    decoded: AtomicU64,
    empty: AtomicU64,
    format_errors: AtomicU64,
    field_errors: AtomicU64,
    socket_errors: AtomicU64,
}

/// Point-in-time copy of [`ReceiverStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub received: u64,
    pub decoded: u64,
    pub empty: u64,
    pub format_errors: u64,
    pub field_errors: u64,
    pub socket_errors: u64,
}

impl StatsSnapshot {
    /// Datagrams that were dropped for any reason.
    pub fn dropped(&self) -> u64 {
        self.empty
            .saturating_add(self.format_errors)
            .saturating_add(self.field_errors)
    }
}

impl ReceiverStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decoded: self.decoded.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            format_errors: self.format_errors.load(Ordering::Relaxed),
            field_errors: self.field_errors.load(Ordering::Relaxed),
            socket_errors: self.socket_errors.load(Ordering::Relaxed),
        }
    }

    fn record_rejection(&self, err: &DecodeError) {
        let counter = match err {
            DecodeError::Empty => &self.empty,
            err if err.is_format_error() => &self.format_errors,
            _ => &self.field_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// F1 24 UDP listener.
///
/// `start` binds and spawns the receive task; `stop` aborts it, which drops
/// the socket. `stop` may be called any number of times, before or after
/// `start`.
pub struct UdpTelemetryReceiver {
    config: ReceiverConfig,
    decoder: PacketDecoder,
    stats: Arc<ReceiverStats>,
    task: Mutex<Option<JoinHandle<()>>>,
    local_addr: Mutex<Option<SocketAddr>>,
}

impl Default for UdpTelemetryReceiver {
    fn default() -> Self {
        Self::new(ReceiverConfig::from_env())
    }
}

impl UdpTelemetryReceiver {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            config,
            decoder: PacketDecoder::default(),
            stats: Arc::new(ReceiverStats::default()),
            task: Mutex::new(None),
            local_addr: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Address the socket is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Bind the socket and spawn the receive loop.
    ///
    /// # Errors
    ///
    /// Fails if the receiver is already running or the socket cannot be bound.
    pub async fn start(&self) -> Result<TelemetryReceiver> {
        if self.is_running() {
            bail!("F1 UDP receiver already running");
        }
        let socket = UdpSocket::bind(self.config.bind_addr)
            .await
            .with_context(|| format!("failed to bind F1 UDP socket on {}", self.config.bind_addr))?;
        let local_addr = socket
            .local_addr()
            .context("failed to read bound F1 UDP address")?;
        info!(addr = %local_addr, "F1 UDP receiver bound (format 2024)");

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let task = tokio::spawn(receive_loop(
            socket,
            self.decoder,
            Arc::clone(&self.stats),
            self.config.max_packet_bytes,
            tx,
        ));

        *self.local_addr.lock() = Some(local_addr);
        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        Ok(rx)
    }

    /// Stop receiving and release the socket.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!("F1 UDP receiver stopped");
        }
        *self.local_addr.lock() = None;
    }
}

impl Drop for UdpTelemetryReceiver {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn receive_loop(
    socket: UdpSocket,
    decoder: PacketDecoder,
    stats: Arc<ReceiverStats>,
    max_packet_bytes: usize,
    tx: mpsc::Sender<TelemetryPacket>,
) {
    let mut buf = vec![0u8; max_packet_bytes];
    let mut consecutive_errors = 0u32;
    loop {
        let len = match socket.recv_from(&mut buf).await {
            Ok((n, _peer)) => {
                consecutive_errors = 0;
                n
            }
            Err(err) => {
                stats.socket_errors.fetch_add(1, Ordering::Relaxed);
                consecutive_errors = consecutive_errors.saturating_add(1);
                if consecutive_errors == 1 {
                    warn!(error = %err, "F1 UDP receive error");
                } else {
                    debug!(error = %err, consecutive_errors, "F1 UDP receive error");
                }
                tokio::time::sleep(socket_error_backoff(consecutive_errors)).await;
                continue;
            }
        };
        stats.received.fetch_add(1, Ordering::Relaxed);

        let datagram = buf.get(..len).unwrap_or_default();
        match decoder.decode(datagram) {
            Ok(packet) => {
                stats.decoded.fetch_add(1, Ordering::Relaxed);
                if tx.send(packet).await.is_err() {
                    debug!("F1 UDP consumer dropped, ending receive loop");
                    break;
                }
            }
            Err(err) => {
                stats.record_rejection(&err);
                debug!(error = %err, len, "F1 UDP datagram dropped");
            }
        }
    }
}
