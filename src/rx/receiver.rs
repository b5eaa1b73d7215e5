//! Frame receiver: the socket read call and the buffer it fills.

use std::io;

use mio::{Interest, Registry, Token};

use crate::net::{Endpoint, UdpSocket};
use crate::trace::{debug, info};

/// Maximum UDP datagram size we'll receive.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// Configuration for a frame receiver.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Address to bind the UDP socket to.
    pub bind_addr: Endpoint,
    /// Capacity of the reusable receive buffer.
    pub recv_buffer_capacity: usize,
    /// Socket-level receive buffer size (`SO_RCVBUF`), if overridden.
    pub socket_recv_buffer_size: Option<usize>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: Endpoint::any(0),
            recv_buffer_capacity: MAX_DATAGRAM_SIZE,
            socket_recv_buffer_size: None,
        }
    }
}

/// Opaque handle for a readiness registration.
///
/// Returned by [`FrameReceiver::register_for_read`]; holds the token the
/// socket was registered under so readiness events can be correlated back
/// to this receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadHandle {
    token: Token,
}

impl ReadHandle {
    /// Token the socket was registered under.
    #[must_use]
    pub const fn token(&self) -> Token {
        self.token
    }
}

/// Owns the raw receive buffer and the socket read call.
///
/// The buffer is exclusively owned for the lifetime of the transport and
/// overwritten on every receive; the slice handed out by [`receive`] borrows
/// it, so at most one frame is in flight per receiver at a time.
///
/// [`receive`]: Self::receive
pub struct FrameReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl FrameReceiver {
    /// Binds a receiver according to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound or the requested
    /// socket receive buffer size cannot be applied.
    pub fn bind(config: &ReceiverConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind(config.bind_addr)?;
        if let Some(size) = config.socket_recv_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        info!(bind_addr = %config.bind_addr, "receiver bound");
        Ok(Self {
            socket,
            buf: vec![0u8; config.recv_buffer_capacity],
        })
    }

    /// Returns the local address the socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> io::Result<Endpoint> {
        self.socket.local_addr()
    }

    /// Receives one datagram if available.
    ///
    /// Non-blocking: returns `Ok(None)` when no datagram is pending, which is
    /// the normal steady-state outcome. On success the returned slice is
    /// exactly the received frame; it borrows the receive buffer and is
    /// overwritten by the next call.
    ///
    /// # Errors
    ///
    /// Returns an error on a transport-level read failure. The receiver
    /// remains usable for subsequent calls.
    pub fn receive(&mut self) -> io::Result<Option<(&[u8], Endpoint)>> {
        match self.socket.try_recv_from(&mut self.buf)? {
            Some((len, src)) => Ok(Some((&self.buf[..len], src))),
            None => Ok(None),
        }
    }

    /// Registers the socket for readability with the caller's poll registry.
    ///
    /// Invocation of the dispatch path is entirely driven by the external
    /// multiplexer's readiness notifications; no poll loop is owned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry rejects the registration.
    pub fn register_for_read(
        &mut self,
        registry: &Registry,
        token: Token,
    ) -> io::Result<ReadHandle> {
        registry.register(&mut self.socket, token, Interest::READABLE)?;
        debug!(token = ?token, "receiver registered for read");
        Ok(ReadHandle { token })
    }

    /// Cancels a previous readiness registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry rejects the deregistration.
    pub fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister(&mut self.socket)?;
        debug!("receiver deregistered");
        Ok(())
    }
}
