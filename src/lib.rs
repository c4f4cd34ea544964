#[macro_use]
mod builder;

pub mod encoders;
pub mod error;
pub mod ffi;
pub mod image;
pub mod options;
pub mod packet;

pub use error::{Error, Result};
pub use packet::{abi_version, EncodedPacket, PacketKind, PacketView, VpxPacket};
