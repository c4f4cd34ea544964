//! Pass-through encoder: forwards raw pixels unchanged, together with the
//! metadata a client needs to paint them.

use std::{
    collections::VecDeque,
    fmt,
    time::{Duration, Instant},
};

use bytes::Bytes;
use log::debug;

use crate::{
    error::{Error, Result},
    image::{PixelFormat, RawImage, PACKED},
    options::Options,
    packet::{EncodedPacket, FrameFlags},
};

use super::PacketSource;

const FRAME_TIMES_CAPACITY: usize = 200;
const FPS_WINDOW: Duration = Duration::from_secs(10);

pub fn get_version() -> (u32, u32) {
    (0, 1)
}

pub fn get_type() -> &'static str {
    "proxy"
}

pub fn get_encodings() -> &'static [&'static str] {
    &["proxy"]
}

pub fn get_info() -> Options {
    let (major, minor) = get_version();
    Options::new().set("version", format!("{}.{}", major, minor))
}

#[derive(Debug, Clone)]
pub struct ContextParams {
    pub width: u32,
    pub height: u32,
    pub src_format: PixelFormat,
    pub encoding: String,
    pub quality: i32,
    pub speed: i32,
    pub scaling: (u32, u32),
}

#[derive(Debug, Default)]
pub struct ProxyEncoder {
    encoding: String,
    width: u32,
    height: u32,
    quality: u8,
    speed: u8,
    scaling: (u32, u32),
    src_format: Option<PixelFormat>,

    frames: u64,
    last_frame_times: VecDeque<Instant>,

    pending: VecDeque<EncodedPacket>,
    flushed: bool,
}

fn clamp_pct(pct: i32) -> u8 {
    pct.clamp(0, 100) as u8
}

impl ProxyEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_context(&mut self, params: ContextParams) {
        self.encoding = params.encoding;
        self.width = params.width;
        self.height = params.height;
        self.quality = clamp_pct(params.quality);
        self.speed = clamp_pct(params.speed);
        self.scaling = params.scaling;
        self.src_format = Some(params.src_format);
        self.frames = 0;
        self.last_frame_times.clear();
        self.pending.clear();
        self.flushed = false;
    }

    pub fn info(&self) -> Options {
        self.info_at(Instant::now())
    }

    pub fn info_at(&self, now: Instant) -> Options {
        let info = get_info();
        let src_format = match self.src_format {
            Some(src_format) => src_format,
            None => return info,
        };

        let mut info = info
            .set("frames", self.frames)
            .set("width", self.width)
            .set("height", self.height)
            .set("speed", self.speed)
            .set("quality", self.quality)
            .set("encoding", &self.encoding)
            .set("src_format", src_format);

        if self.scaling != (1, 1) {
            info.insert("scaling", format!("{}:{}", self.scaling.0, self.scaling.1));
        }

        if let Some(fps) = self.fps_at(now) {
            info.insert("fps", fps);
        }

        info
    }

    fn fps_at(&self, now: Instant) -> Option<u64> {
        let cut_off = now.checked_sub(FPS_WINDOW);
        let recent = self
            .last_frame_times
            .iter()
            .filter(|time| cut_off.map_or(true, |cut_off| **time > cut_off));

        let (count, oldest) = recent.fold((0u64, now), |(count, oldest), time| (count + 1, oldest.min(*time)));
        if count == 0 || oldest >= now {
            return None;
        }

        Some((count as f64 / (now - oldest).as_secs_f64()) as u64)
    }

    pub fn is_closed(&self) -> bool {
        self.src_format.is_none()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn src_format(&self) -> Option<PixelFormat> {
        self.src_format
    }

    pub fn clean(&mut self) {
        self.width = 0;
        self.height = 0;
        self.quality = 0;
        self.speed = 0;
        self.src_format = None;
    }

    pub fn set_encoding_speed(&mut self, pct: i32) {
        self.speed = clamp_pct(pct);
    }

    pub fn set_encoding_quality(&mut self, pct: i32) {
        self.quality = clamp_pct(pct);
    }

    /// Wraps a capture buffer in an image of the context's geometry.
    pub fn packed_image<'a>(&self, pixels: &'a [u8]) -> Result<RawImage<'a>> {
        let src_format = self.src_format.ok_or(Error::Closed)?;
        RawImage::packed(pixels, self.width, self.height, src_format)
    }

    pub fn client_options(&self, image: &RawImage, options: &Options) -> Options {
        let quality = options.get_parsed::<i32>("quality").unwrap_or(self.quality as i32);
        let speed = options.get_parsed::<i32>("speed").unwrap_or(self.speed as i32);

        let mut client_options = Options::new()
            .set("proxy", true)
            .set("frame", self.frames)
            .nest("options", options)
            .set("quality", quality)
            .set("speed", speed)
            .set("rowstride", image.rowstride)
            .set("depth", image.depth())
            .set("rgb_format", image.pixel_format);

        if self.scaling != (1, 1) {
            client_options.insert("scaling", format!("{}:{}", self.scaling.0, self.scaling.1));
        }

        client_options
    }

    pub fn compress_image(&mut self, image: &RawImage, options: &Options) -> Result<(EncodedPacket, Options)> {
        debug!("compress_image({}x{} {}, {:?})", image.width, image.height, image.pixel_format, options);

        if self.is_closed() {
            return Err(Error::Closed);
        }
        if image.planes != PACKED {
            return Err(Error::InvalidPlanes(image.planes));
        }

        let pixels = Bytes::copy_from_slice(image.pixels);
        let pts = self.frames as i64;
        self.frames += 1;
        self.record_frame_time(Instant::now());

        let client_options = self.client_options(image, options);
        debug!(
            "compress_image returning {} bytes and options={:?}",
            pixels.len(),
            client_options
        );

        Ok((EncodedPacket::frame(pixels, pts, FrameFlags::KEY), client_options))
    }

    fn record_frame_time(&mut self, time: Instant) {
        if self.last_frame_times.len() == FRAME_TIMES_CAPACITY {
            self.last_frame_times.pop_front();
        }
        self.last_frame_times.push_back(time);
    }

    /// Compresses `image` and queues the packet for [`PacketSource::receive_packet`].
    pub fn send_image(&mut self, image: &RawImage, options: &Options) -> Result<Options> {
        if self.flushed {
            return Err(Error::Flushed);
        }

        let (packet, client_options) = self.compress_image(image, options)?;
        self.pending.push_back(packet);
        Ok(client_options)
    }

    /// No more images follow; pending packets can still be received.
    pub fn send_flush(&mut self) {
        self.flushed = true;
    }
}

impl PacketSource for ProxyEncoder {
    type Packet = EncodedPacket;

    fn receive_packet(&mut self) -> Result<EncodedPacket> {
        match self.pending.pop_front() {
            Some(packet) => Ok(packet),
            None if self.flushed => Err(Error::Flushed),
            None => Err(Error::Drained),
        }
    }
}

impl fmt::Display for ProxyEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.src_format {
            None => write!(f, "proxy_encoder(uninitialized)"),
            Some(src_format) => write!(f, "proxy_encoder({} - {}x{})", src_format, self.width, self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::packet::{PacketKind, PacketView};

    use super::*;

    fn params() -> ContextParams {
        ContextParams {
            width: 4,
            height: 2,
            src_format: PixelFormat::Bgrx,
            encoding: "proxy".to_string(),
            quality: 80,
            speed: 50,
            scaling: (1, 1),
        }
    }

    fn encoder() -> ProxyEncoder {
        let mut encoder = ProxyEncoder::new();
        encoder.init_context(params());
        encoder
    }

    #[test]
    fn module_info() {
        assert_eq!(get_type(), "proxy");
        assert_eq!(get_encodings(), &["proxy"]);
        assert_eq!(get_info().get("version"), Some("0.1"));
    }

    #[test]
    fn display_and_closed_state() {
        let mut encoder = encoder();
        assert_eq!(encoder.to_string(), "proxy_encoder(BGRX - 4x2)");
        assert!(!encoder.is_closed());

        encoder.clean();
        assert!(encoder.is_closed());
        assert_eq!(encoder.to_string(), "proxy_encoder(uninitialized)");
        assert_eq!(encoder.info().len(), 1);

        let pixels = [0u8; 32];
        let image = RawImage::packed(&pixels, 4, 2, PixelFormat::Bgrx).unwrap();
        assert_eq!(encoder.compress_image(&image, &Options::new()).unwrap_err(), Error::Closed);
    }

    #[test]
    fn speed_and_quality_are_clamped() {
        let mut encoder = encoder();
        encoder.set_encoding_speed(150);
        encoder.set_encoding_quality(-3);
        assert_eq!(encoder.speed(), 100);
        assert_eq!(encoder.quality(), 0);

        encoder.set_encoding_quality(42);
        assert_eq!(encoder.quality(), 42);
    }

    #[test]
    fn init_context_clamps_quality_and_speed() {
        let mut encoder = ProxyEncoder::new();
        encoder.init_context(ContextParams {
            quality: 150,
            speed: -20,
            ..params()
        });

        assert_eq!(encoder.quality(), 100);
        assert_eq!(encoder.speed(), 0);
        assert_eq!(encoder.info().get("quality"), Some("100"));
    }

    #[test]
    fn compress_forwards_pixels_untouched() {
        let mut encoder = encoder();
        let pixels: Vec<u8> = (0..32).collect();
        let image = encoder.packed_image(&pixels).unwrap();

        let (packet, client_options) = encoder
            .compress_image(&image, &Options::new().set("quality", 10))
            .unwrap();

        assert_eq!(packet.kind(), PacketKind::CxFrame);
        assert_eq!(packet.frame_buffer(), &pixels[..]);
        assert_eq!(packet.frame_size(), 32);
        assert!(packet.frame_info().unwrap().flags.is_key());
        assert_eq!(encoder.frames(), 1);

        assert_eq!(client_options.get("proxy"), Some("true"));
        assert_eq!(client_options.get("frame"), Some("1"));
        assert_eq!(client_options.get("quality"), Some("10"));
        assert_eq!(client_options.get("speed"), Some("50"));
        assert_eq!(client_options.get("options.quality"), Some("10"));
        assert_eq!(client_options.get("rowstride"), Some("16"));
        assert_eq!(client_options.get("depth"), Some("24"));
        assert_eq!(client_options.get("rgb_format"), Some("BGRX"));
        assert!(!client_options.contains("scaling"));
    }

    #[test]
    fn planar_images_are_rejected() {
        let mut encoder = encoder();
        let pixels = [0u8; 32];
        let mut image = encoder.packed_image(&pixels).unwrap();
        image.planes = 3;

        assert_eq!(
            encoder.compress_image(&image, &Options::new()).unwrap_err(),
            Error::InvalidPlanes(3)
        );
        assert_eq!(encoder.frames(), 0);
    }

    #[test]
    fn scaling_is_reported_when_not_identity() {
        let mut encoder = ProxyEncoder::new();
        encoder.init_context(ContextParams {
            scaling: (1, 2),
            ..params()
        });

        let pixels = [0u8; 32];
        let image = encoder.packed_image(&pixels).unwrap();
        let client_options = encoder.client_options(&image, &Options::new());

        assert_eq!(client_options.get("scaling"), Some("1:2"));
        assert_eq!(encoder.info().get("scaling"), Some("1:2"));
    }

    #[test]
    fn fps_counts_frames_of_the_last_ten_seconds() {
        let mut encoder = encoder();
        let start = Instant::now();
        for _ in 0..4 {
            encoder.record_frame_time(start);
        }

        let info = encoder.info_at(start + Duration::from_secs(2));
        assert_eq!(info.get("fps"), Some("2"));

        let info = encoder.info_at(start + Duration::from_secs(11));
        assert_eq!(info.get("fps"), None);

        let info = encoder.info_at(start);
        assert_eq!(info.get("fps"), None);
    }

    #[test]
    fn frame_times_are_bounded() {
        let mut encoder = encoder();
        let start = Instant::now();
        for i in 0..250 {
            encoder.record_frame_time(start + Duration::from_millis(i));
        }

        assert_eq!(encoder.last_frame_times.len(), FRAME_TIMES_CAPACITY);
        assert_eq!(encoder.last_frame_times[0], start + Duration::from_millis(50));
    }

    #[test]
    fn drain_then_flush() {
        let mut encoder = encoder();
        let pixels = [1u8; 32];
        let image = encoder.packed_image(&pixels).unwrap();

        encoder.send_image(&image, &Options::new()).unwrap();
        encoder.send_image(&image, &Options::new()).unwrap();

        assert_eq!(encoder.receive_packet().unwrap().frame_info().unwrap().pts, 0);
        assert_eq!(encoder.receive_packet().unwrap().frame_info().unwrap().pts, 1);
        assert_eq!(encoder.receive_packet().unwrap_err(), Error::Drained);

        encoder.send_image(&image, &Options::new()).unwrap();
        encoder.send_flush();
        assert_eq!(encoder.send_image(&image, &Options::new()).unwrap_err(), Error::Flushed);
        assert!(encoder.receive_packet().is_ok());
        assert_eq!(encoder.receive_packet().unwrap_err(), Error::Flushed);
    }
}
