//! Common frame header: layout, type tags, and validation.
//!
//! # Wire Format
//!
//! All frames share a common 8-byte header, all fields little-endian:
//!
//! ```text
//! ┌──────────────────┬────────────┬──────────┬─────────┐
//! │ Frame Length (4) │ Version(1) │ Flags(1) │ Type(2) │
//! └──────────────────┴────────────┴──────────┴─────────┘
//! ```
//!
//! `frame_length` is the total frame length in bytes including the header.
//! Unrecognized type tags are forward-compatible: classified as
//! [`FrameType::Unknown`] and ignored by the dispatch path, never rejected.

use std::fmt;

/// Byte offset of the frame length field.
pub const FRAME_LENGTH_OFFSET: usize = 0;
/// Byte offset of the version field.
pub const VERSION_OFFSET: usize = 4;
/// Byte offset of the flags field.
pub const FLAGS_OFFSET: usize = 5;
/// Byte offset of the frame type tag.
pub const TYPE_OFFSET: usize = 6;
/// Length of the common header shared by all frames.
pub const HEADER_LENGTH: usize = 8;

/// Protocol version this receive path accepts.
pub const CURRENT_VERSION: u8 = 0;

/// Frame type tag values.
pub mod frame_type {
    /// Padding frame: occupies stream space, carries no payload.
    pub const PAD: u16 = 0x00;
    /// Data frame: application payload for a stream.
    pub const DATA: u16 = 0x01;
    /// Setup frame: stream/session parameter establishment.
    pub const SETUP: u16 = 0x05;
}

/// Discriminated frame type from the header's type tag.
///
/// A closed set of recognized kinds plus an explicit unknown fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Padding frame, handled by the data path.
    Pad,
    /// Data frame, handled by the data path.
    Data,
    /// Setup control frame.
    Setup,
    /// Unrecognized tag, ignored for forward compatibility.
    Unknown(u16),
}

impl FrameType {
    /// Classifies a raw type tag.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        match raw {
            frame_type::PAD => Self::Pad,
            frame_type::DATA => Self::Data,
            frame_type::SETUP => Self::Setup,
            other => Self::Unknown(other),
        }
    }

    /// Returns the raw tag value.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> u16 {
        match self {
            Self::Pad => frame_type::PAD,
            Self::Data => frame_type::DATA,
            Self::Setup => frame_type::SETUP,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Session identifier carried by data and setup frames.
///
/// Invariant: opaque on this side of the wire; the receive path only reads
/// and forwards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u32);

impl SessionId {
    /// Wraps a raw session id.
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    /// Raw value for wire serialization.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for SessionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Stream identifier carried by data and setup frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u32);

impl StreamId {
    /// Wraps a raw stream id.
    #[must_use]
    pub const fn new(v: u32) -> Self {
        Self(v)
    }

    /// Raw value for wire serialization.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<u32> for StreamId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut arr = [0u8; 2];
    arr.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_le_bytes(arr)
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut arr = [0u8; 4];
    arr.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(arr)
}

/// Checks that a received datagram holds a well-formed frame header.
///
/// Valid means: at least [`HEADER_LENGTH`] bytes, a supported version, and a
/// declared frame length that fits within the received bytes. Frames failing
/// this check are expected under normal network conditions (truncated or
/// corrupt datagrams) and are silently discarded by the dispatch path.
#[must_use]
pub fn is_frame_valid(frame: &[u8]) -> bool {
    if frame.len() < HEADER_LENGTH {
        return false;
    }
    if frame[VERSION_OFFSET] != CURRENT_VERSION {
        return false;
    }
    let declared = read_u32(frame, FRAME_LENGTH_OFFSET) as usize;
    declared >= HEADER_LENGTH && declared <= frame.len()
}

/// Type-discriminated view over a validated frame.
///
/// The borrowed slices inside each variant are scoped to the current dispatch
/// call; handlers cannot retain them past the call's return.
#[derive(Debug, Clone, Copy)]
pub enum HeaderView<'a> {
    /// DATA frame with its typed header view.
    Data(super::data::DataHeader<'a>),
    /// PAD frame; shares the DATA header layout.
    Pad(super::data::DataHeader<'a>),
    /// SETUP frame with its typed header view.
    Setup(super::setup::SetupHeader<'a>),
    /// Unrecognized type tag.
    Unknown(u16),
}

impl<'a> HeaderView<'a> {
    /// Classifies a frame by its type tag and wraps the typed header view.
    ///
    /// Returns `None` when the frame is shorter than the common header or the
    /// typed header region its tag requires. Callers should run
    /// [`is_frame_valid`] first; this only re-checks lengths so that an
    /// existing view is always structurally readable.
    #[must_use]
    pub fn wrap(frame: &'a [u8]) -> Option<Self> {
        if frame.len() < HEADER_LENGTH {
            return None;
        }
        match FrameType::from_raw(read_u16(frame, TYPE_OFFSET)) {
            FrameType::Data => super::data::DataHeader::wrap(frame).map(Self::Data),
            FrameType::Pad => super::data::DataHeader::wrap(frame).map(Self::Pad),
            FrameType::Setup => super::setup::SetupHeader::wrap(frame).map(Self::Setup),
            FrameType::Unknown(raw) => Some(Self::Unknown(raw)),
        }
    }
}

/// Writer for encoding frames into a reusable buffer.
///
/// The buffer is cleared on construction and reused (preserves capacity).
pub(crate) struct FrameWriter<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> FrameWriter<'a> {
    pub(crate) fn new(buf: &'a mut Vec<u8>) -> Self {
        buf.clear();
        Self { buf }
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write the common header and return the position of the frame length
    /// field for patching.
    pub(crate) fn common_header(&mut self, frame_type: u16, flags: u8) -> usize {
        let len_pos = self.buf.len();
        self.put_u32(0); // placeholder for frame length
        self.put_u8(CURRENT_VERSION);
        self.put_u8(flags);
        self.put_u16(frame_type);
        len_pos
    }

    /// Patch the frame length field after writing the body.
    pub(crate) fn patch_frame_length(&mut self, len_pos: usize) {
        let total = self.buf.len() as u32;
        self.buf[len_pos..len_pos + 4].copy_from_slice(&total.to_le_bytes());
    }
}
