use std::{marker::PhantomData, os::raw::c_ulong, os::raw::c_void};

use bytes::Bytes;

use crate::ffi;

use super::{FrameFlags, FrameInfo, PacketKind, PacketView, VpxPacket};

/// A packet whose payload is owned, so it outlives the codec call that
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    kind: PacketKind,
    data: Bytes,
    pts: i64,
    duration: u64,
    flags: FrameFlags,
}

impl EncodedPacket {
    pub fn new(kind: PacketKind, data: impl Into<Bytes>) -> Self {
        Self {
            kind,
            data: data.into(),
            pts: 0,
            duration: 0,
            flags: FrameFlags::default(),
        }
    }

    pub fn frame(data: impl Into<Bytes>, pts: i64, flags: FrameFlags) -> Self {
        Self {
            pts,
            flags,
            ..Self::new(PacketKind::CxFrame, data)
        }
    }

    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// Lays the packet out the way libvpx hands packets over. The buffer
    /// pointers in the result borrow `self`.
    pub fn to_raw(&self) -> RawPacket<'_> {
        let mut pkt = ffi::vpx_codec_cx_pkt::zeroed();
        pkt.kind = self.kind.into();

        let fixed_buf = ffi::vpx_fixed_buf_t {
            buf: self.data.as_ptr() as *mut c_void,
            sz: self.data.len(),
        };

        match self.kind {
            PacketKind::CxFrame => {
                let mut frame = unsafe { pkt.data.frame };
                frame.buf = fixed_buf.buf;
                frame.sz = fixed_buf.sz;
                frame.pts = self.pts;
                frame.duration = self.duration as c_ulong;
                frame.flags = self.flags.bits();
                pkt.data.frame = frame;
            }
            PacketKind::Stats => pkt.data.twopass_stats = fixed_buf,
            PacketKind::FirstPassMbStats => pkt.data.firstpass_mb_stats = fixed_buf,
            PacketKind::Custom | PacketKind::Unknown(_) => pkt.data.raw = fixed_buf,
            PacketKind::Psnr => {
                if self.data.len() == std::mem::size_of::<ffi::vpx_psnr_pkt>() {
                    // SAFETY: length checked, every bit pattern is a valid record.
                    pkt.data.psnr = unsafe { std::ptr::read_unaligned(self.data.as_ptr() as *const ffi::vpx_psnr_pkt) };
                }
            }
        }

        RawPacket {
            pkt,
            _data: PhantomData,
        }
    }
}

impl PacketView for EncodedPacket {
    fn kind(&self) -> PacketKind {
        self.kind
    }

    fn frame_buffer(&self) -> &[u8] {
        if self.is_frame() {
            &self.data
        } else {
            &[]
        }
    }

    fn frame_info(&self) -> Option<FrameInfo> {
        self.is_frame().then_some(FrameInfo {
            pts: self.pts,
            duration: self.duration,
            flags: self.flags,
            partition_id: 0,
        })
    }
}

/// C-layout packet borrowing an [`EncodedPacket`]'s payload.
pub struct RawPacket<'a> {
    pkt: ffi::vpx_codec_cx_pkt_t,
    _data: PhantomData<&'a [u8]>,
}

impl<'a> RawPacket<'a> {
    /// Readers must not write through the buffer pointers.
    pub fn as_ptr(&self) -> *const ffi::vpx_codec_cx_pkt_t {
        &self.pkt
    }

    pub fn view(&self) -> VpxPacket<'_> {
        // SAFETY: the payload is borrowed from the owning packet for 'a.
        unsafe { VpxPacket::from_raw(&self.pkt) }
    }
}
