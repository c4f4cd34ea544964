use std::sync::Arc;

use tokio::sync::Mutex;

use super::ProxyEncoder;

#[cfg_attr(not(feature = "pipeline"), allow(dead_code))]
pub struct EncoderPuller<K, EFE, P> {
    pub(super) encoder: Arc<Mutex<ProxyEncoder>>,
    pub(super) encoded_buffer_key: K,
    pub(super) encoder_flushed_error: EFE,
    pub(super) frame_id_prop: P,
}

impl<K, EFE, P> EncoderPuller<K, EFE, P> {
    pub fn flusher_on<E>(&self, flush_error: E) -> EncoderFlusher<E> {
        EncoderFlusher {
            encoder: self.encoder.clone(),
            flush_error,
        }
    }
}

pub struct EncoderFlusher<E> {
    pub(super) encoder: Arc<Mutex<ProxyEncoder>>,
    pub(crate) flush_error: E,
}

impl<E: PartialEq> EncoderFlusher<E> {
    /// Flushes the encoder when `error` is the one this flusher listens for.
    pub async fn flush_on(&self, error: Option<E>) -> bool {
        match error {
            Some(error) if error == self.flush_error => {
                log::debug!("Received flush error, flushing encoder...");
                self.encoder.lock().await.send_flush();
                true
            }
            _ => false,
        }
    }
}

#[cfg(feature = "pipeline")]
mod processor {
    use async_trait::async_trait;
    use remotia::{
        buffers::BytesMut,
        traits::{BorrowMutFrameProperties, FrameError, FrameProcessor, FrameProperties},
    };

    use crate::encoders::utils::pull::pull_encoded_buffer;

    use super::{EncoderFlusher, EncoderPuller};

    #[async_trait]
    impl<F, K, EFE, P> FrameProcessor<F> for EncoderPuller<K, EFE, P>
    where
        K: Send,
        P: Send + Copy,
        EFE: Send + Copy,
        F: FrameError<EFE> + BorrowMutFrameProperties<K, BytesMut> + FrameProperties<P, u128> + Send + 'static,
    {
        async fn process(&mut self, mut frame_data: F) -> Option<F> {
            let mut encoder = self.encoder.lock().await;

            let encoded_buffer = frame_data.get_mut_ref(&self.encoded_buffer_key);
            let received = match pull_encoded_buffer(&mut *encoder, encoded_buffer) {
                Some(received) => received,
                None => return Some(frame_data),
            };

            if let Some(frame_id) = received.last_pts {
                frame_data.set(self.frame_id_prop, frame_id as u128);
            }

            if received.flushed {
                frame_data.report_error(self.encoder_flushed_error);
            }

            Some(frame_data)
        }
    }

    #[async_trait]
    impl<F, E> FrameProcessor<F> for EncoderFlusher<E>
    where
        E: Send + Sync + Copy + std::cmp::PartialEq,
        F: FrameError<E> + Send + 'static,
    {
        async fn process(&mut self, frame_data: F) -> Option<F> {
            let error = frame_data.get_error();
            self.flush_on(error).await;

            Some(frame_data)
        }
    }
}
