//! SETUP control frame header.
//!
//! # Wire Format
//!
//! SETUP establishes stream/session parameters before data flows. Fields
//! little-endian:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Common header: Frame Length, Version, Flags, Type (8)            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Term Offset (4)                                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Session ID (4)                                                   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Stream ID (4)                                                    │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Initial Term ID (4)                                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Term Length (4)                                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ MTU (2)                                                          │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use super::header::{
    self, FLAGS_OFFSET, FRAME_LENGTH_OFFSET, FrameWriter, HEADER_LENGTH, SessionId, StreamId,
    frame_type,
};

/// Byte offset of the term offset field.
pub const TERM_OFFSET_OFFSET: usize = HEADER_LENGTH;
/// Byte offset of the session id field.
pub const SESSION_ID_OFFSET: usize = HEADER_LENGTH + 4;
/// Byte offset of the stream id field.
pub const STREAM_ID_OFFSET: usize = HEADER_LENGTH + 8;
/// Byte offset of the initial term id field.
pub const INITIAL_TERM_ID_OFFSET: usize = HEADER_LENGTH + 12;
/// Byte offset of the term length field.
pub const TERM_LENGTH_OFFSET: usize = HEADER_LENGTH + 16;
/// Byte offset of the MTU field.
pub const MTU_OFFSET: usize = HEADER_LENGTH + 20;
/// Length of a SETUP frame.
pub const SETUP_HEADER_LENGTH: usize = HEADER_LENGTH + 22;

/// Zero-copy view over a SETUP frame header.
///
/// Obtained through [`wrap`](Self::wrap); borrows the receive buffer for the
/// duration of the current dispatch call.
#[derive(Debug, Clone, Copy)]
pub struct SetupHeader<'a> {
    frame: &'a [u8],
}

impl<'a> SetupHeader<'a> {
    /// Wraps a frame, or returns `None` if it is too short for the header.
    #[must_use]
    pub fn wrap(frame: &'a [u8]) -> Option<Self> {
        (frame.len() >= SETUP_HEADER_LENGTH).then_some(Self { frame })
    }

    /// Declared total frame length in bytes.
    #[must_use]
    pub fn frame_length(&self) -> u32 {
        header::read_u32(self.frame, FRAME_LENGTH_OFFSET)
    }

    /// Header flags byte.
    #[must_use]
    pub fn flags(&self) -> u8 {
        self.frame[FLAGS_OFFSET]
    }

    /// Term offset at which the stream begins.
    #[must_use]
    pub fn term_offset(&self) -> u32 {
        header::read_u32(self.frame, TERM_OFFSET_OFFSET)
    }

    /// Session being established.
    #[must_use]
    pub fn session(&self) -> SessionId {
        SessionId::new(header::read_u32(self.frame, SESSION_ID_OFFSET))
    }

    /// Stream being established.
    #[must_use]
    pub fn stream(&self) -> StreamId {
        StreamId::new(header::read_u32(self.frame, STREAM_ID_OFFSET))
    }

    /// First term id of the stream.
    #[must_use]
    pub fn initial_term_id(&self) -> u32 {
        header::read_u32(self.frame, INITIAL_TERM_ID_OFFSET)
    }

    /// Term buffer length in bytes.
    #[must_use]
    pub fn term_length(&self) -> u32 {
        header::read_u32(self.frame, TERM_LENGTH_OFFSET)
    }

    /// Sender's maximum transmission unit in bytes.
    #[must_use]
    pub fn mtu(&self) -> u16 {
        header::read_u16(self.frame, MTU_OFFSET)
    }
}

/// Field values for an outbound SETUP frame.
#[derive(Debug, Clone, Copy)]
pub struct SetupFrame {
    /// Session being established.
    pub session: SessionId,
    /// Stream being established.
    pub stream: StreamId,
    /// First term id of the stream.
    pub initial_term_id: u32,
    /// Term buffer length in bytes.
    pub term_length: u32,
    /// Term offset at which the stream begins.
    pub term_offset: u32,
    /// Sender's maximum transmission unit in bytes.
    pub mtu: u16,
}

/// Encode a SETUP frame into `buf`.
///
/// The buffer is cleared and reused (preserves capacity).
pub fn encode_setup_frame(frame: &SetupFrame, buf: &mut Vec<u8>) {
    let mut w = FrameWriter::new(buf);
    let len_pos = w.common_header(frame_type::SETUP, 0);
    w.put_u32(frame.term_offset);
    w.put_u32(frame.session.as_u32());
    w.put_u32(frame.stream.as_u32());
    w.put_u32(frame.initial_term_id);
    w.put_u32(frame.term_length);
    w.put_u16(frame.mtu);
    w.patch_frame_length(len_pos);
}
