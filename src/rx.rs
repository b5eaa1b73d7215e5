//! Receive-side frame ingestion and dispatch.
//!
//! Responsibilities:
//! - Own the socket and the reusable receive buffer ([`FrameReceiver`]).
//! - Run the per-datagram pass: receive, loss check, record, validate,
//!   classify, route ([`FrameDispatcher`]).
//! - Register the socket with the caller's readiness multiplexer.
//!
//! The path is single-threaded and callback-driven: nothing here suspends,
//! and the external multiplexer is the sole serialization mechanism.

pub mod dispatcher;
pub mod receiver;

pub use dispatcher::{DataFrameHandler, FrameDispatcher, SetupFrameHandler, TransportError};
pub use receiver::{FrameReceiver, MAX_DATAGRAM_SIZE, ReadHandle, ReceiverConfig};
