//! Inbound-frame event recording.
//!
//! Every received datagram produces exactly one event: accepted frames are
//! recorded as [`EventKind::FrameIn`], frames discarded by loss simulation as
//! [`EventKind::FrameInDropped`]. Recording is fire-and-forget: the trait is
//! infallible so a sink can never fail the receive path, and implementations
//! must not block it.

use crate::net::Endpoint;
use crate::trace::trace;

/// Kind of inbound-frame event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Frame accepted for further processing.
    FrameIn,
    /// Frame discarded by loss simulation.
    FrameInDropped,
}

/// Sink notified of every inbound frame.
///
/// `frame` borrows the receive buffer and is valid only for the duration of
/// the call; a sink that needs the bytes later must copy them.
pub trait EventRecorder {
    /// Records one inbound-frame event.
    fn record(&mut self, kind: EventKind, frame: &[u8], src: Endpoint);
}

/// Recorder that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl EventRecorder for NullRecorder {
    fn record(&mut self, _kind: EventKind, _frame: &[u8], _src: Endpoint) {}
}

/// Recorder that forwards events to the tracing layer.
///
/// Emits one `trace!` event per frame with the kind, length, and source.
/// A no-op unless the crate is built with the `tracing` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceRecorder;

impl EventRecorder for TraceRecorder {
    fn record(&mut self, _kind: EventKind, _frame: &[u8], _src: Endpoint) {
        trace!(kind = ?_kind, len = _frame.len(), src = %_src, "frame in");
    }
}
