pub mod animation;
pub mod generic;
pub mod ppm;

use std::path::Path;

use crate::error::LoadError;
use crate::metadata::{ImageMetadata, Rotation};
use crate::scanner::FormatKind;

/// Pixel payload of a decode. Always 4 bytes per pixel RGBA regardless of the
/// source channel count.
#[derive(Debug)]
pub enum PixelData {
    Static {
        rgba: Vec<u8>,
    },
    /// All frames in one contiguous buffer, `width * height * 4` bytes each,
    /// with one millisecond delay per frame.
    Animated {
        frames: Vec<u8>,
        delays_ms: Vec<u32>,
        frame_count: usize,
    },
}

/// A decoded image, owned by exactly one party at a time: the decode worker
/// until commit, the shared image slot afterwards. Committing moves the value
/// in and drops the previous one; nothing else frees pixel buffers.
#[derive(Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: PixelData,
    pub metadata: Option<ImageMetadata>,
    pub rotation: Rotation,
}

impl DecodedImage {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: PixelData::Static { rgba },
            metadata: None,
            rotation: Rotation::None,
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.pixels, PixelData::Animated { .. })
    }

    pub fn frame_count(&self) -> usize {
        match &self.pixels {
            PixelData::Static { .. } => 1,
            PixelData::Animated { frame_count, .. } => *frame_count,
        }
    }

    /// Returns one frame of an animated image as a sub-slice of the shared
    /// buffer. Frame 0 of a static image is the whole buffer.
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        let frame_bytes = (self.width as usize) * (self.height as usize) * 4;
        match &self.pixels {
            PixelData::Static { rgba } => (index == 0 && !rgba.is_empty()).then_some(&rgba[..]),
            PixelData::Animated { frames, frame_count, .. } => {
                if index >= *frame_count {
                    return None;
                }
                frames.get(index * frame_bytes..(index + 1) * frame_bytes)
            }
        }
    }

    /// Hands out the CPU pixel buffer of a static image, leaving it empty.
    /// Called once the texture upload succeeded; animated frames stay
    /// resident because every frame must remain available.
    pub fn take_static_pixels(&mut self) -> Option<Vec<u8>> {
        match &mut self.pixels {
            PixelData::Static { rgba } if !rgba.is_empty() => Some(std::mem::take(rgba)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub parse_exif: bool,
    /// Largest texture dimension the GPU accepts; larger decodes are rejected.
    pub max_gpu: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            parse_exif: true,
            max_gpu: crate::context::DEFAULT_MAX_GPU,
        }
    }
}

/// Decodes `path` with the adapter selected by `kind`.
///
/// Oversized results are rejected here, after decode and before the caller
/// can commit them.
pub fn decode(
    path: &Path,
    kind: FormatKind,
    options: &DecodeOptions,
) -> Result<DecodedImage, LoadError> {
    let image = match kind {
        FormatKind::StaticRaster => decode_raster(path)?,
        FormatKind::Gif => animation::decode_gif(path)?,
        FormatKind::Webp => animation::decode_webp(path)?,
        FormatKind::Ppm => ppm::decode(path)?,
        FormatKind::GenericCodec | FormatKind::Unknown => {
            generic::decode(path, options.parse_exif)?
        }
    };
    check_size(&image, options.max_gpu)?;
    Ok(image)
}

fn check_size(image: &DecodedImage, max_gpu: u32) -> Result<(), LoadError> {
    if image.width > max_gpu || image.height > max_gpu {
        return Err(LoadError::ImageTooLarge {
            width: image.width,
            height: image.height,
            limit: max_gpu,
        });
    }
    Ok(())
}

/// Baseline raster adapter: decode straight to RGBA8 via the image crate.
fn decode_raster(path: &Path) -> Result<DecodedImage, LoadError> {
    let img = image::open(path).map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::from_rgba(width, height, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn raster_decode_produces_rgba() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("dot.png");
        RgbaImage::from_pixel(2, 3, Rgba([9, 8, 7, 255]))
            .save(&path)
            .expect("save png");

        let img = decode(&path, crate::scanner::FormatKind::StaticRaster, &DecodeOptions::default())
            .expect("decode");
        assert_eq!((img.width, img.height), (2, 3));
        assert_eq!(img.frame(0).map(|f| f.len()), Some(2 * 3 * 4));
        assert!(!img.is_animated());
    }

    #[test]
    fn oversized_image_is_rejected_before_commit() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("big.png");
        RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]))
            .save(&path)
            .expect("save png");

        let options = DecodeOptions {
            max_gpu: 3,
            ..DecodeOptions::default()
        };
        let err = decode(&path, crate::scanner::FormatKind::StaticRaster, &options)
            .expect_err("must reject");
        assert!(matches!(err, LoadError::ImageTooLarge { width: 4, height: 2, limit: 3 }));
    }

    #[test]
    fn static_pixels_can_be_taken_exactly_once() {
        let mut img = DecodedImage::from_rgba(1, 1, vec![1, 2, 3, 4]);
        assert_eq!(img.take_static_pixels(), Some(vec![1, 2, 3, 4]));
        assert_eq!(img.take_static_pixels(), None);
        assert_eq!(img.frame(0), None);
    }

    #[test]
    fn animated_frame_slicing() {
        let img = DecodedImage {
            width: 1,
            height: 1,
            pixels: PixelData::Animated {
                frames: vec![1, 1, 1, 1, 2, 2, 2, 2],
                delays_ms: vec![40, 60],
                frame_count: 2,
            },
            metadata: None,
            rotation: crate::metadata::Rotation::None,
        };
        assert_eq!(img.frame(0), Some(&[1u8, 1, 1, 1][..]));
        assert_eq!(img.frame(1), Some(&[2u8, 2, 2, 2][..]));
        assert_eq!(img.frame(2), None);
        assert_eq!(img.frame_count(), 2);
    }
}
