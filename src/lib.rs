//! Receive path of a low-latency UDP messaging transport.
//!
//! This crate implements the per-datagram ingestion and demultiplexing path:
//! pull a datagram off a non-blocking socket, apply an optional loss-simulation
//! decision, record an inbound event, validate the frame header, and route the
//! frame to a data-path or setup handler based on its type tag. The whole pass
//! runs once per datagram with no per-frame allocation and no copies.
//!
//! # Components
//!
//! - [`net`]: endpoint type and the mio-backed non-blocking UDP socket.
//! - [`protocol`]: wire format, zero-copy header views, validation, encoders.
//! - [`loss`]: pluggable per-frame loss simulation for fault-injection tests.
//! - [`events`]: fire-and-forget inbound-frame event recording.
//! - [`rx`]: the frame receiver and the dispatcher orchestrating the path.
//!
//! # Example
//!
//! ```ignore
//! use mio::{Events, Poll, Token};
//! use rhea::rx::{FrameDispatcher, ReceiverConfig};
//!
//! let config = ReceiverConfig::default();
//! let mut dispatcher = FrameDispatcher::bind(&config, data_handler, setup_handler)?;
//!
//! let mut poll = Poll::new()?;
//! dispatcher.register_for_read(poll.registry(), Token(0))?;
//!
//! // The poll loop is owned by the caller; the dispatcher only runs when
//! // the socket is reported readable.
//! let mut events = Events::with_capacity(16);
//! loop {
//!     poll.poll(&mut events, None)?;
//!     for _event in events.iter() {
//!         let _frames = dispatcher.receive_frames()?;
//!     }
//! }
//! ```

pub mod events;
pub mod loss;
pub mod net;
pub mod protocol;
pub mod rx;

mod trace;

pub use trace::init_tracing;
