use std::sync::Arc;

use tokio::sync::Mutex;

use crate::options::Options;

use super::ProxyEncoder;

#[cfg_attr(not(feature = "pipeline"), allow(dead_code))]
pub struct EncoderPusher<K> {
    pub(super) encoder: Arc<Mutex<ProxyEncoder>>,
    pub(super) raw_buffer_key: K,
    pub(super) options: Options,
}

#[cfg(feature = "pipeline")]
mod processor {
    use async_trait::async_trait;
    use remotia::{
        buffers::BytesMut,
        traits::{BorrowFrameProperties, FrameProcessor},
    };

    use crate::encoders::utils::push::push_raw_buffer;

    use super::EncoderPusher;

    #[async_trait]
    impl<F, K> FrameProcessor<F> for EncoderPusher<K>
    where
        K: Send + Copy,
        F: BorrowFrameProperties<K, BytesMut> + Send + 'static,
    {
        async fn process(&mut self, frame_data: F) -> Option<F> {
            let mut encoder = self.encoder.lock().await;

            let raw_buffer = frame_data.get_ref(&self.raw_buffer_key).map(|buffer| &buffer[..]);
            push_raw_buffer(&mut encoder, raw_buffer, &self.options);

            Some(frame_data)
        }
    }
}
