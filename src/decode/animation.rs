//! GIF and WebP adapters.
//!
//! Both animated paths produce the same representation: every frame in one
//! contiguous RGBA buffer plus a per-frame millisecond delay table whose
//! length equals the frame count.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use tracing::debug;

use crate::decode::{DecodedImage, PixelData};
use crate::error::LoadError;

/// Floor for bogus zero/short frame delays, roughly 60 fps.
const MIN_FRAME_DELAY_MS: u32 = 16;

fn failed(e: impl std::fmt::Display) -> LoadError {
    LoadError::DecodeFailed(e.to_string())
}

pub fn decode_gif(path: &Path) -> Result<DecodedImage, LoadError> {
    let file = File::open(path).map_err(failed)?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(failed)?;
    let frames = decoder.into_frames().collect_frames().map_err(failed)?;
    if frames.is_empty() {
        return Err(LoadError::DecodeFailed("GIF contains no frames".into()));
    }

    let first = frames[0].buffer();
    let (width, height) = first.dimensions();
    let frame_bytes = (width as usize) * (height as usize) * 4;

    let mut buffer = Vec::with_capacity(frame_bytes * frames.len());
    let mut delays_ms = Vec::with_capacity(frames.len());
    for frame in &frames {
        let (numer, denom) = frame.delay().numer_denom_ms();
        delays_ms.push((numer / denom.max(1)).max(MIN_FRAME_DELAY_MS));
        let raster = frame.buffer();
        if raster.dimensions() != (width, height) {
            return Err(LoadError::DecodeFailed(
                "GIF frame size differs from canvas".into(),
            ));
        }
        buffer.extend_from_slice(raster.as_raw());
    }
    debug_assert_eq!(delays_ms.len(), frames.len());
    debug!(frames = frames.len(), width, height, "decoded GIF");

    Ok(DecodedImage {
        width,
        height,
        pixels: PixelData::Animated {
            frames: buffer,
            delays_ms,
            frame_count: frames.len(),
        },
        metadata: None,
        rotation: crate::metadata::Rotation::None,
    })
}

/// Animated WebP files carry an `ANMF` chunk near the start of the stream;
/// static ones never do.
fn has_animation_marker(path: &Path) -> Result<bool, LoadError> {
    let mut file = File::open(path).map_err(failed)?;
    let mut head = [0u8; 1024];
    let mut filled = 0;
    loop {
        match file.read(&mut head[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(failed(e)),
        }
    }
    Ok(head[..filled].windows(4).any(|w| w == b"ANMF"))
}

pub fn decode_webp(path: &Path) -> Result<DecodedImage, LoadError> {
    if !has_animation_marker(path)? {
        let img = image::open(path).map_err(failed)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        return Ok(DecodedImage::from_rgba(width, height, rgba.into_raw()));
    }
    decode_animated_webp(path)
}

fn decode_animated_webp(path: &Path) -> Result<DecodedImage, LoadError> {
    let data = std::fs::read(path).map_err(failed)?;
    let decoder = webp_animation::Decoder::new(&data)
        .map_err(|e| LoadError::DecodeFailed(format!("{e:?}")))?;

    let mut width = 0u32;
    let mut height = 0u32;
    let mut buffer = Vec::new();
    let mut delays_ms = Vec::new();
    // Frame timestamps mark where each frame ends; the delta is the delay.
    let mut prev_timestamp = 0i32;
    let mut frame_count = 0usize;

    for frame in decoder {
        let (w, h) = frame.dimensions();
        if frame_count == 0 {
            width = w;
            height = h;
        } else if (w, h) != (width, height) {
            return Err(LoadError::DecodeFailed(
                "animated WebP frame size differs from canvas".into(),
            ));
        }
        let timestamp = frame.timestamp();
        let delay = (timestamp - prev_timestamp).max(MIN_FRAME_DELAY_MS as i32) as u32;
        prev_timestamp = timestamp;

        buffer.extend_from_slice(frame.data());
        delays_ms.push(delay);
        frame_count += 1;
    }

    if frame_count == 0 {
        return Err(LoadError::DecodeFailed(
            "animated WebP contains no frames".into(),
        ));
    }
    debug_assert_eq!(delays_ms.len(), frame_count);
    debug!(frames = frame_count, width, height, "decoded animated WebP");

    Ok(DecodedImage {
        width,
        height,
        pixels: PixelData::Animated {
            frames: buffer,
            delays_ms,
            frame_count,
        },
        metadata: None,
        rotation: crate::metadata::Rotation::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn corrupt_gif_reports_decode_failed() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("broken.gif");
        std::fs::write(&path, b"GIF89a garbage that is not a gif").expect("write");

        let err = decode_gif(&path).expect_err("must fail");
        assert!(matches!(err, LoadError::DecodeFailed(_)));
    }

    #[test]
    fn gif_frames_share_one_buffer_with_matching_delays() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("anim.gif");
        {
            let file = std::fs::File::create(&path).expect("create");
            let mut encoder = GifEncoder::new(file);
            let frames = vec![
                Frame::from_parts(
                    RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(100, 1),
                ),
                Frame::from_parts(
                    RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(200, 1),
                ),
            ];
            encoder.encode_frames(frames).expect("encode");
        }

        let img = decode_gif(&path).expect("decode");
        assert_eq!(img.frame_count(), 2);
        assert_eq!((img.width, img.height), (4, 4));
        match &img.pixels {
            PixelData::Animated {
                frames,
                delays_ms,
                frame_count,
            } => {
                assert_eq!(*frame_count, delays_ms.len());
                assert_eq!(frames.len(), 2 * 4 * 4 * 4);
                assert_eq!(delays_ms, &[100, 200]);
            }
            PixelData::Static { .. } => panic!("expected animated pixels"),
        }
    }

    #[test]
    fn static_webp_has_no_animation_marker() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("flat.webp");
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]))
            .save(&path)
            .expect("save webp");

        assert!(!has_animation_marker(&path).expect("probe"));
        let img = decode_webp(&path).expect("decode");
        assert!(!img.is_animated());
        assert_eq!((img.width, img.height), (2, 2));
    }
}
