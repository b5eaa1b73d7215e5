//! Wire protocol for inbound frames.
//!
//! Every frame begins with a common 8-byte header carrying the declared frame
//! length, protocol version, flags, and a frame-type tag. Type-specific
//! headers for DATA/PAD and SETUP frames extend it. The receive path never
//! copies header bytes: all access goes through borrowed flyweight views
//! scoped to the current dispatch call.
//!
//! Encoders for the same layouts live alongside the views; they are used by
//! the sending peer and by tests.

pub mod data;
pub mod header;
pub mod setup;

pub use data::{
    DATA_HEADER_LENGTH, DataFrame, DataHeader, PadFrame, encode_data_frame, encode_pad_frame,
};
pub use header::{
    CURRENT_VERSION, FrameType, HEADER_LENGTH, HeaderView, SessionId, StreamId, frame_type,
    is_frame_valid,
};
pub use setup::{SETUP_HEADER_LENGTH, SetupFrame, SetupHeader, encode_setup_frame};
