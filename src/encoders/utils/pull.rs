use bytes::BufMut;
use log::{debug, warn};

use crate::encoders::PacketSource;

use super::packet::{receive_encoded_packets, ReceivedPackets};

/// Drains `source` into the encoded frame buffer. Nothing is pulled when the
/// buffer is missing, so pending packets wait for the next frame.
pub fn pull_encoded_buffer<S, B>(source: &mut S, encoded_buffer: Option<&mut B>) -> Option<ReceivedPackets>
where
    S: PacketSource + ?Sized,
    B: BufMut,
{
    let encoded_buffer = match encoded_buffer {
        Some(buffer) => buffer,
        None => {
            warn!("No encoded frame buffer in frame data, skipping pull");
            return None;
        }
    };

    let received = receive_encoded_packets(source, encoded_buffer);
    debug!("Pulled {} packets ({} bytes)", received.packets, received.bytes);

    Some(received)
}
