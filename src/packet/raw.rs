//! Plain accessors over a packet pointer handed out by libvpx.
//!
//! These perform no validation: the caller guarantees the pointer is non-null
//! and that the library has not reused the packet yet (it does so on the next
//! call into the same encoder context).

use std::os::raw::{c_char, c_int};

use crate::ffi::{self, vpx_codec_cx_pkt_t};

/// `VPX_ENCODER_ABI_VERSION` as seen at build time.
pub fn get_vpx_abi_version() -> c_int {
    ffi::VPX_ENCODER_ABI_VERSION
}

/// # Safety
/// `pkt` must point to a live packet.
pub unsafe fn get_packet_kind(pkt: *const vpx_codec_cx_pkt_t) -> c_int {
    (*pkt).kind
}

/// # Safety
/// `pkt` must point to a live packet of kind `VPX_CODEC_CX_FRAME_PKT`.
pub unsafe fn get_frame_buffer(pkt: *const vpx_codec_cx_pkt_t) -> *mut c_char {
    (*pkt).data.frame.buf as *mut c_char
}

/// # Safety
/// `pkt` must point to a live packet of kind `VPX_CODEC_CX_FRAME_PKT`.
pub unsafe fn get_frame_size(pkt: *const vpx_codec_cx_pkt_t) -> usize {
    (*pkt).data.frame.sz
}
