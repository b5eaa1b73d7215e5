//! DATA and PAD frame headers.
//!
//! # Wire Format
//!
//! DATA and PAD frames share one layout; PAD occupies stream space without a
//! meaningful payload. Fields little-endian, payload follows the header:
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
//! │ Term ID (4)                                                      │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Payload ...                                                      │
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
/// Byte offset of the term id field.
pub const TERM_ID_OFFSET: usize = HEADER_LENGTH + 12;
/// Minimum length of a DATA or PAD frame.
pub const DATA_HEADER_LENGTH: usize = HEADER_LENGTH + 16;

/// Zero-copy view over a DATA or PAD frame header.
///
/// Obtained through [`wrap`](Self::wrap), which guarantees the header region
/// is present; the view borrows the receive buffer and lives only for the
/// current dispatch call.
#[derive(Debug, Clone, Copy)]
pub struct DataHeader<'a> {
    frame: &'a [u8],
}

impl<'a> DataHeader<'a> {
    /// Wraps a frame, or returns `None` if it is too short for the header.
    #[must_use]
    pub fn wrap(frame: &'a [u8]) -> Option<Self> {
        (frame.len() >= DATA_HEADER_LENGTH).then_some(Self { frame })
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

    /// Offset of this frame within its term.
    #[must_use]
    pub fn term_offset(&self) -> u32 {
        header::read_u32(self.frame, TERM_OFFSET_OFFSET)
    }

    /// Session the frame belongs to.
    #[must_use]
    pub fn session(&self) -> SessionId {
        SessionId::new(header::read_u32(self.frame, SESSION_ID_OFFSET))
    }

    /// Stream the frame belongs to.
    #[must_use]
    pub fn stream(&self) -> StreamId {
        StreamId::new(header::read_u32(self.frame, STREAM_ID_OFFSET))
    }

    /// Term the frame belongs to.
    #[must_use]
    pub fn term_id(&self) -> u32 {
        header::read_u32(self.frame, TERM_ID_OFFSET)
    }

    /// Payload bytes, bounded by the declared frame length.
    ///
    /// Empty for PAD frames and for DATA frames that carry no payload.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        let end = (self.frame_length() as usize).clamp(DATA_HEADER_LENGTH, self.frame.len());
        &self.frame[DATA_HEADER_LENGTH..end]
    }
}

/// Field values for an outbound DATA frame.
#[derive(Debug, Clone, Copy)]
pub struct DataFrame<'a> {
    /// Session the frame belongs to.
    pub session: SessionId,
    /// Stream the frame belongs to.
    pub stream: StreamId,
    /// Term the frame belongs to.
    pub term_id: u32,
    /// Offset of this frame within its term.
    pub term_offset: u32,
    /// Payload bytes.
    pub payload: &'a [u8],
}

/// Field values for an outbound PAD frame.
#[derive(Debug, Clone, Copy)]
pub struct PadFrame {
    /// Session the frame belongs to.
    pub session: SessionId,
    /// Stream the frame belongs to.
    pub stream: StreamId,
    /// Term the frame belongs to.
    pub term_id: u32,
    /// Offset of this frame within its term.
    pub term_offset: u32,
}

/// Encode a DATA frame into `buf`.
///
/// The buffer is cleared and reused (preserves capacity).
pub fn encode_data_frame(frame: &DataFrame<'_>, buf: &mut Vec<u8>) {
    let mut w = FrameWriter::new(buf);
    let len_pos = w.common_header(frame_type::DATA, 0);
    w.put_u32(frame.term_offset);
    w.put_u32(frame.session.as_u32());
    w.put_u32(frame.stream.as_u32());
    w.put_u32(frame.term_id);
    w.put_bytes(frame.payload);
    w.patch_frame_length(len_pos);
}

/// Encode a PAD frame into `buf`.
pub fn encode_pad_frame(frame: &PadFrame, buf: &mut Vec<u8>) {
    let mut w = FrameWriter::new(buf);
    let len_pos = w.common_header(frame_type::PAD, 0);
    w.put_u32(frame.term_offset);
    w.put_u32(frame.session.as_u32());
    w.put_u32(frame.stream.as_u32());
    w.put_u32(frame.term_id);
    w.patch_frame_length(len_pos);
}
