use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    builder::unwrap_mandatory,
    error::Result,
    image::PixelFormat,
    options::Options,
    packet::PacketView,
};

pub mod proxy;
pub mod utils;

mod puller;
mod pusher;

pub use proxy::{ContextParams, ProxyEncoder};
pub use puller::*;
pub use pusher::*;

/// Anything encoded packets can be pulled from, one at a time.
///
/// Returns [`crate::Error::Drained`] when nothing is ready yet and
/// [`crate::Error::Flushed`] once a flushed encoder has nothing left.
pub trait PacketSource {
    type Packet: PacketView;

    fn receive_packet(&mut self) -> Result<Self::Packet>;
}

pub struct ProxyEncoderBuilder<K, E, P> {
    width: Option<u32>,
    height: Option<u32>,
    src_format: Option<PixelFormat>,
    encoding: Option<String>,
    quality: Option<i32>,
    speed: Option<i32>,
    scaling: Option<(u32, u32)>,

    raw_buffer_key: Option<K>,
    encoded_buffer_key: Option<K>,
    encoder_flushed_error: Option<E>,
    frame_id_prop: Option<P>,

    options: Option<Options>,
}

impl<K, E, P> Default for ProxyEncoderBuilder<K, E, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E, P> ProxyEncoderBuilder<K, E, P> {
    pub fn new() -> Self {
        Self {
            width: None,
            height: None,
            src_format: None,
            encoding: None,
            quality: None,
            speed: None,
            scaling: None,
            raw_buffer_key: None,
            encoded_buffer_key: None,
            encoder_flushed_error: None,
            frame_id_prop: None,
            options: None,
        }
    }

    /// Context parameters, with defaults for everything but the geometry and
    /// source format.
    pub fn context_params(&self) -> Result<ContextParams> {
        Ok(ContextParams {
            width: unwrap_mandatory(self.width, "width")?,
            height: unwrap_mandatory(self.height, "height")?,
            src_format: unwrap_mandatory(self.src_format, "src_format")?,
            encoding: self.encoding.clone().unwrap_or_else(|| proxy::get_type().to_string()),
            quality: self.quality.unwrap_or(100),
            speed: self.speed.unwrap_or(100),
            scaling: self.scaling.unwrap_or((1, 1)),
        })
    }

    pub fn build(self) -> Result<(EncoderPusher<K>, EncoderPuller<K, E, P>)> {
        let params = self.context_params()?;

        let raw_buffer_key = unwrap_mandatory(self.raw_buffer_key, "raw_buffer_key")?;
        let encoded_buffer_key = unwrap_mandatory(self.encoded_buffer_key, "encoded_buffer_key")?;
        let encoder_flushed_error = unwrap_mandatory(self.encoder_flushed_error, "encoder_flushed_error")?;
        let frame_id_prop = unwrap_mandatory(self.frame_id_prop, "frame_id_prop")?;
        let options = self.options.unwrap_or_default();

        let encoder = {
            let mut encoder = ProxyEncoder::new();
            encoder.init_context(params);
            log::debug!("Initialized {}", encoder);

            Arc::new(Mutex::new(encoder))
        };

        Ok((
            EncoderPusher {
                encoder: encoder.clone(),
                raw_buffer_key,
                options,
            },
            EncoderPuller {
                encoder,
                encoded_buffer_key,
                encoder_flushed_error,
                frame_id_prop,
            },
        ))
    }

    builder_set!(width, u32);
    builder_set!(height, u32);
    builder_set!(src_format, PixelFormat);
    builder_set!(quality, i32);
    builder_set!(speed, i32);
    builder_set!(scaling, (u32, u32));
    builder_set!(raw_buffer_key, K);
    builder_set!(encoded_buffer_key, K);
    builder_set!(encoder_flushed_error, E);
    builder_set!(frame_id_prop, P);
    builder_set!(options, Options);

    pub fn encoding(mut self, encoding: &str) -> Self {
        self.encoding = Some(encoding.to_string());
        self
    }
}
