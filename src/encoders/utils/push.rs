use log::{trace, warn};

use crate::{encoders::ProxyEncoder, options::Options};

/// Pushes one capture buffer into `encoder` as a packed image of the
/// context's geometry. Returns the client options of the queued packet.
pub fn push_raw_buffer(encoder: &mut ProxyEncoder, raw_buffer: Option<&[u8]>, options: &Options) -> Option<Options> {
    let raw_buffer = match raw_buffer {
        Some(buffer) => buffer,
        None => {
            warn!("No raw frame buffer in frame data, skipping push");
            return None;
        }
    };

    let sent = encoder
        .packed_image(raw_buffer)
        .and_then(|image| encoder.send_image(&image, options));

    match sent {
        Ok(client_options) => {
            trace!("Pushed frame to {}: {:?}", encoder, client_options);
            Some(client_options)
        }
        Err(e) => {
            warn!("Unable to push frame to {}: {}", encoder, e);
            None
        }
    }
}
