//! Network primitives for the receive path.
//!
//! Provides the endpoint value type handed to every per-frame callback and a
//! thin non-blocking UDP socket wrapper integrated with mio's polling
//! infrastructure.

pub mod endpoint;
pub mod socket;

pub use endpoint::Endpoint;
pub use socket::UdpSocket;
