use thiserror::Error;

use crate::packet::PacketKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("packet of kind {0:?} does not carry a frame buffer")]
    NotAFrame(PacketKind),

    #[error("invalid number of planes: {0}")]
    InvalidPlanes(usize),

    #[error("encoder context is closed")]
    Closed,

    /// No packet is ready yet, push more frames.
    #[error("encoder drained")]
    Drained,

    /// The encoder was flushed and every pending packet has been pulled.
    #[error("encoder flushed")]
    Flushed,

    #[error("missing mandatory field `{0}`")]
    MissingField(&'static str),

    #[error("unknown pixel format `{0}`")]
    UnknownPixelFormat(String),

    #[error("buffer holds {actual} bytes, image needs {expected}")]
    BufferSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
