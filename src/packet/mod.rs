//! Read-only access to encoded packets.
//!
//! [`PacketView`] is what the rest of the crate reads packets through, so code
//! draining an encoder never touches the libvpx struct layout directly.

use std::{
    fmt,
    ops::BitOr,
    os::raw::c_int,
};

use crate::{
    error::{Error, Result},
    ffi,
};

mod owned;
pub mod raw;

pub use owned::*;

pub fn abi_version() -> i32 {
    raw::get_vpx_abi_version()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    CxFrame,
    Stats,
    FirstPassMbStats,
    Psnr,
    Custom,
    Unknown(i32),
}

impl From<c_int> for PacketKind {
    fn from(kind: c_int) -> Self {
        match kind {
            ffi::VPX_CODEC_CX_FRAME_PKT => Self::CxFrame,
            ffi::VPX_CODEC_STATS_PKT => Self::Stats,
            ffi::VPX_CODEC_FPMB_STATS_PKT => Self::FirstPassMbStats,
            ffi::VPX_CODEC_PSNR_PKT => Self::Psnr,
            ffi::VPX_CODEC_CUSTOM_PKT => Self::Custom,
            other => Self::Unknown(other),
        }
    }
}

impl From<PacketKind> for c_int {
    fn from(kind: PacketKind) -> Self {
        match kind {
            PacketKind::CxFrame => ffi::VPX_CODEC_CX_FRAME_PKT,
            PacketKind::Stats => ffi::VPX_CODEC_STATS_PKT,
            PacketKind::FirstPassMbStats => ffi::VPX_CODEC_FPMB_STATS_PKT,
            PacketKind::Psnr => ffi::VPX_CODEC_PSNR_PKT,
            PacketKind::Custom => ffi::VPX_CODEC_CUSTOM_PKT,
            PacketKind::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFlags(u32);

impl FrameFlags {
    pub const KEY: Self = Self(ffi::VPX_FRAME_IS_KEY);
    pub const DROPPABLE: Self = Self(ffi::VPX_FRAME_IS_DROPPABLE);
    pub const INVISIBLE: Self = Self(ffi::VPX_FRAME_IS_INVISIBLE);
    pub const FRAGMENT: Self = Self(ffi::VPX_FRAME_IS_FRAGMENT);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_key(self) -> bool {
        self.contains(Self::KEY)
    }
}

impl BitOr for FrameFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub pts: i64,
    pub duration: u64,
    pub flags: FrameFlags,
    pub partition_id: i32,
}

pub trait PacketView {
    fn abi_version(&self) -> i32 {
        abi_version()
    }

    fn kind(&self) -> PacketKind;

    /// Encoded bytes of a frame packet, empty for every other kind.
    fn frame_buffer(&self) -> &[u8];

    fn frame_size(&self) -> usize {
        self.frame_buffer().len()
    }

    /// Timing and flags of a frame packet.
    fn frame_info(&self) -> Option<FrameInfo>;

    fn is_frame(&self) -> bool {
        self.kind() == PacketKind::CxFrame
    }

    fn frame(&self) -> Result<&[u8]> {
        match self.kind() {
            PacketKind::CxFrame => Ok(self.frame_buffer()),
            kind => Err(Error::NotAFrame(kind)),
        }
    }
}

/// A packet borrowed from libvpx.
///
/// The lifetime stands for the library's validity window: the packet and its
/// buffer are reused by the next call into the encoder context that produced
/// them, so do not hold a `VpxPacket` across such a call. Use
/// [`VpxPacket::to_owned_packet`] to keep the data longer.
#[derive(Clone, Copy)]
pub struct VpxPacket<'a> {
    raw: &'a ffi::vpx_codec_cx_pkt_t,
}

impl<'a> VpxPacket<'a> {
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    /// A non-null `ptr` must point to a packet that stays untouched for `'a`,
    /// and a frame packet's `buf`/`sz` must describe readable memory.
    pub unsafe fn from_ptr(ptr: *const ffi::vpx_codec_cx_pkt_t) -> Option<Self> {
        ptr.as_ref().map(|raw| Self { raw })
    }

    /// # Safety
    /// Same contract as [`VpxPacket::from_ptr`].
    pub unsafe fn from_raw(raw: &'a ffi::vpx_codec_cx_pkt_t) -> Self {
        Self { raw }
    }

    pub fn as_ptr(&self) -> *const ffi::vpx_codec_cx_pkt_t {
        self.raw
    }

    pub fn buffer(&self) -> &'a [u8] {
        if !self.is_frame() {
            return &[];
        }

        let (buf, size) = unsafe { (raw::get_frame_buffer(self.raw), raw::get_frame_size(self.raw)) };
        if size == 0 || buf.is_null() {
            return &[];
        }

        unsafe { std::slice::from_raw_parts(buf as *const u8, size) }
    }

    /// Bytes carried by the packet, whatever its kind. PSNR packets expose
    /// their C record as raw bytes.
    pub fn payload(&self) -> &'a [u8] {
        let data = &self.raw.data;
        unsafe {
            match self.kind() {
                PacketKind::CxFrame => self.buffer(),
                PacketKind::Stats => fixed_buf_slice(data.twopass_stats),
                PacketKind::FirstPassMbStats => fixed_buf_slice(data.firstpass_mb_stats),
                PacketKind::Custom | PacketKind::Unknown(_) => fixed_buf_slice(data.raw),
                PacketKind::Psnr => std::slice::from_raw_parts(
                    &data.psnr as *const ffi::vpx_psnr_pkt as *const u8,
                    std::mem::size_of::<ffi::vpx_psnr_pkt>(),
                ),
            }
        }
    }

    pub fn to_owned_packet(&self) -> EncodedPacket {
        let data = bytes::Bytes::copy_from_slice(self.payload());
        match self.frame_info() {
            Some(info) => EncodedPacket::frame(data, info.pts, info.flags).with_duration(info.duration),
            None => EncodedPacket::new(self.kind(), data),
        }
    }
}

/// # Safety
/// A non-empty `fixed_buf` must describe readable memory living for `'a`.
unsafe fn fixed_buf_slice<'a>(fixed_buf: ffi::vpx_fixed_buf_t) -> &'a [u8] {
    if fixed_buf.sz == 0 || fixed_buf.buf.is_null() {
        return &[];
    }
    std::slice::from_raw_parts(fixed_buf.buf as *const u8, fixed_buf.sz)
}

impl PacketView for VpxPacket<'_> {
    fn kind(&self) -> PacketKind {
        unsafe { raw::get_packet_kind(self.raw) }.into()
    }

    fn frame_buffer(&self) -> &[u8] {
        self.buffer()
    }

    fn frame_info(&self) -> Option<FrameInfo> {
        if !self.is_frame() {
            return None;
        }

        let frame = unsafe { self.raw.data.frame };
        Some(FrameInfo {
            pts: frame.pts,
            duration: frame.duration as u64,
            flags: FrameFlags::from_bits(frame.flags),
            partition_id: frame.partition_id,
        })
    }
}

impl fmt::Debug for VpxPacket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpxPacket")
            .field("kind", &self.kind())
            .field("size", &self.frame_size())
            .field("frame", &self.frame_info())
            .finish()
    }
}
