use std::{sync::Arc, time::Duration};

use bytes::BytesMut;
use clap::Parser;
use remotia_vpx_packets::{
    abi_version,
    encoders::{utils::packet::receive_encoded_packets, ContextParams, ProxyEncoder},
    image::PixelFormat,
    options::Options,
};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value_t = 320)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,

    #[arg(long, default_value_t = 30)]
    frames: u32,

    #[arg(short, long, default_value_t = 60)]
    framerate: u64,

    #[arg(short, long, default_value_t = 100)]
    quality: i32,

    #[arg(short, long, default_value_t = 100)]
    speed: i32,

    #[arg(long, default_value = "BGRX")]
    src_format: PixelFormat,
}

fn gradient(width: u32, height: u32, format: PixelFormat, frame: u32) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let mut pixels = vec![0u8; width as usize * height as usize * bpp];
    for (i, pixel) in pixels.chunks_mut(bpp).enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        pixel[0] = (x + frame) as u8;
        pixel[1] = (y + frame) as u8;
        pixel[2] = frame as u8;
    }
    pixels
}

fn frame_interval(framerate: u64) -> Duration {
    Duration::from_secs_f64(1.0 / framerate.max(1) as f64)
}

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Pushing synthetic frames through the proxy encoder (vpx encoder ABI {}).", abi_version());

    let args = Args::parse();

    let encoder = {
        let mut encoder = ProxyEncoder::new();
        encoder.init_context(ContextParams {
            width: args.width,
            height: args.height,
            src_format: args.src_format,
            encoding: "proxy".to_string(),
            quality: args.quality,
            speed: args.speed,
            scaling: (1, 1),
        });
        Arc::new(Mutex::new(encoder))
    };

    let pusher = {
        let encoder = encoder.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval(args.framerate));
            for frame in 0..args.frames {
                ticker.tick().await;
                let pixels = gradient(args.width, args.height, args.src_format, frame);

                let mut encoder = encoder.lock().await;
                let sent = encoder
                    .packed_image(&pixels)
                    .and_then(|image| encoder.send_image(&image, &Options::new()));
                if let Err(e) = sent {
                    log::error!("Unable to push frame {}: {}", frame, e);
                    break;
                }
            }
            encoder.lock().await.send_flush();
        })
    };

    let mut encoded = BytesMut::new();
    loop {
        let received = receive_encoded_packets(&mut *encoder.lock().await, &mut encoded);
        if received.packets > 0 {
            log::debug!("Pulled {} packets, last pts = {:?}", received.packets, received.last_pts);
        }
        if received.flushed {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    if let Err(e) = pusher.await {
        log::error!("Pusher task failed: {}", e);
    }

    let encoder = encoder.lock().await;
    log::info!("{} produced {} bytes", *encoder, encoded.len());
    for (key, value) in encoder.info().iter() {
        log::info!("  {} = {}", key, value);
    }
}
