use bytes::BufMut;
use log::{debug, trace, warn};

use crate::{encoders::PacketSource, error::Error, packet::PacketView};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedPackets {
    pub packets: usize,
    pub bytes: usize,
    pub last_pts: Option<i64>,
    pub flushed: bool,
}

/// Drains `source`, appending the payload of every frame packet to
/// `output_buffer`. Stats, PSNR and custom packets are skipped.
pub fn receive_encoded_packets<S, B>(source: &mut S, output_buffer: &mut B) -> ReceivedPackets
where
    S: PacketSource + ?Sized,
    B: BufMut,
{
    let mut received = ReceivedPackets::default();

    loop {
        let packet = match source.receive_packet() {
            Ok(packet) => packet,
            Err(Error::Drained) => {
                debug!("Drain error, breaking the loop");
                break;
            }
            Err(Error::Flushed) => {
                debug!("Flushed error, breaking the loop");
                received.flushed = true;
                break;
            }
            Err(e) => {
                warn!("Unable to receive packet: {}", e);
                break;
            }
        };

        let info = match packet.frame_info() {
            Some(info) => info,
            None => {
                trace!("Skipping {:?} packet", packet.kind());
                continue;
            }
        };

        let data = packet.frame_buffer();
        debug!("Encoded packet: pts = {}, size = {}, flags = {:?}", info.pts, data.len(), info.flags);

        output_buffer.put_slice(data);

        received.packets += 1;
        received.bytes += data.len();
        received.last_pts = Some(info.pts);
    }

    received
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use crate::{
        error::Result,
        packet::{EncodedPacket, FrameFlags, PacketKind},
    };

    use super::*;

    struct ScriptedSource {
        packets: VecDeque<Result<EncodedPacket>>,
    }

    impl PacketSource for ScriptedSource {
        type Packet = EncodedPacket;

        fn receive_packet(&mut self) -> Result<EncodedPacket> {
            self.packets.pop_front().unwrap_or(Err(Error::Drained))
        }
    }

    #[test]
    fn frames_are_concatenated_and_others_skipped() {
        let mut source = ScriptedSource {
            packets: VecDeque::from(vec![
                Ok(EncodedPacket::frame(vec![1u8, 2], 7, FrameFlags::KEY)),
                Ok(EncodedPacket::new(PacketKind::Stats, vec![0xFFu8; 8])),
                Ok(EncodedPacket::frame(vec![3u8], 8, FrameFlags::default())),
            ]),
        };
        let mut output = Vec::new();

        let received = receive_encoded_packets(&mut source, &mut output);

        assert_eq!(output, vec![1, 2, 3]);
        assert_eq!(
            received,
            ReceivedPackets {
                packets: 2,
                bytes: 3,
                last_pts: Some(8),
                flushed: false,
            }
        );
    }

    #[test]
    fn flush_is_reported() {
        let mut source = ScriptedSource {
            packets: VecDeque::from(vec![
                Ok(EncodedPacket::frame(vec![5u8; 4], 0, FrameFlags::KEY)),
                Err(Error::Flushed),
            ]),
        };
        let mut output = Vec::new();

        let received = receive_encoded_packets(&mut source, &mut output);

        assert!(received.flushed);
        assert_eq!(received.bytes, 4);
    }

    #[test]
    fn other_errors_stop_the_drain() {
        let mut source = ScriptedSource {
            packets: VecDeque::from(vec![
                Err(Error::Closed),
                Ok(EncodedPacket::frame(vec![5u8; 4], 0, FrameFlags::KEY)),
            ]),
        };
        let mut output = Vec::new();

        let received = receive_encoded_packets(&mut source, &mut output);

        assert_eq!(received, ReceivedPackets::default());
        assert!(output.is_empty());
        assert_eq!(source.packets.len(), 1);
    }
}
