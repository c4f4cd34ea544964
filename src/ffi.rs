//! C layout of the libvpx encoder packet (`vpx/vpx_encoder.h`).
//!
//! Only the types needed to read `vpx_codec_cx_pkt_t` are mirrored here, so
//! packets handed over by the library can be inspected without pulling in the
//! whole codec header set.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_uint, c_ulong, c_void};

pub const VPX_IMAGE_ABI_VERSION: c_int = 5;
pub const VPX_CODEC_ABI_VERSION: c_int = 4 + VPX_IMAGE_ABI_VERSION;
pub const VPX_EXT_RATECTRL_ABI_VERSION: c_int = 6;
pub const VPX_ENCODER_ABI_VERSION: c_int = 16 + VPX_CODEC_ABI_VERSION + VPX_EXT_RATECTRL_ABI_VERSION;

pub const VPX_SS_MAX_LAYERS: usize = 5;

pub type vpx_codec_cx_pkt_kind = c_int;
pub const VPX_CODEC_CX_FRAME_PKT: vpx_codec_cx_pkt_kind = 0;
pub const VPX_CODEC_STATS_PKT: vpx_codec_cx_pkt_kind = 1;
pub const VPX_CODEC_FPMB_STATS_PKT: vpx_codec_cx_pkt_kind = 2;
pub const VPX_CODEC_PSNR_PKT: vpx_codec_cx_pkt_kind = 3;
pub const VPX_CODEC_CUSTOM_PKT: vpx_codec_cx_pkt_kind = 256;

pub type vpx_codec_pts_t = i64;
pub type vpx_codec_frame_flags_t = u32;

pub const VPX_FRAME_IS_KEY: vpx_codec_frame_flags_t = 0x1;
pub const VPX_FRAME_IS_DROPPABLE: vpx_codec_frame_flags_t = 0x2;
pub const VPX_FRAME_IS_INVISIBLE: vpx_codec_frame_flags_t = 0x4;
pub const VPX_FRAME_IS_FRAGMENT: vpx_codec_frame_flags_t = 0x8;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct vpx_fixed_buf_t {
    pub buf: *mut c_void,
    pub sz: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct vpx_codec_cx_pkt_frame {
    pub buf: *mut c_void,
    pub sz: usize,
    pub pts: vpx_codec_pts_t,
    pub duration: c_ulong,
    pub flags: vpx_codec_frame_flags_t,
    pub partition_id: c_int,
    pub width: [c_uint; VPX_SS_MAX_LAYERS],
    pub height: [c_uint; VPX_SS_MAX_LAYERS],
    pub spatial_layer_encoded: [u8; VPX_SS_MAX_LAYERS],
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct vpx_psnr_pkt {
    pub samples: [c_uint; 4],
    pub sse: [u64; 4],
    pub psnr: [f64; 4],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union vpx_codec_cx_pkt_data {
    pub frame: vpx_codec_cx_pkt_frame,
    pub twopass_stats: vpx_fixed_buf_t,
    pub firstpass_mb_stats: vpx_fixed_buf_t,
    pub psnr: vpx_psnr_pkt,
    pub raw: vpx_fixed_buf_t,
    pub pad: [c_char; 128 - std::mem::size_of::<vpx_codec_cx_pkt_kind>()],
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct vpx_codec_cx_pkt {
    pub kind: vpx_codec_cx_pkt_kind,
    pub data: vpx_codec_cx_pkt_data,
}

pub type vpx_codec_cx_pkt_t = vpx_codec_cx_pkt;

impl vpx_codec_cx_pkt {
    pub fn zeroed() -> Self {
        // SAFETY: every field is an integer, float or raw pointer, all-zero is valid.
        unsafe { std::mem::zeroed() }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{align_of, size_of};

    use super::*;

    #[test]
    fn encoder_abi_version_composition() {
        assert_eq!(VPX_CODEC_ABI_VERSION, 9);
        assert_eq!(VPX_ENCODER_ABI_VERSION, 31);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn packet_layout_matches_c_header() {
        assert_eq!(size_of::<vpx_codec_cx_pkt_frame>(), 88);
        assert_eq!(size_of::<vpx_psnr_pkt>(), 80);
        assert_eq!(size_of::<vpx_codec_cx_pkt_data>(), 128);
        assert_eq!(align_of::<vpx_codec_cx_pkt_data>(), 8);
        assert_eq!(size_of::<vpx_codec_cx_pkt>(), 136);
    }

    #[test]
    fn zeroed_packet_is_an_empty_frame() {
        let pkt = vpx_codec_cx_pkt::zeroed();
        assert_eq!(pkt.kind, VPX_CODEC_CX_FRAME_PKT);
        let frame = unsafe { pkt.data.frame };
        assert!(frame.buf.is_null());
        assert_eq!(frame.sz, 0);
    }
}
