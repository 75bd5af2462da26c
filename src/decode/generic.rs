//! Generic-codec adapter: everything that is not GIF/WebP/PPM/baseline
//! raster goes through the installed codec stack, the image crate first and
//! rawler for RAW formats it cannot handle. This is also the only path that
//! attempts an EXIF parse.

use std::path::Path;

use image::{DynamicImage, ImageError};
use rawler::decoders::{Decoder as _, RawDecodeParams};
use rawler::imgop::develop::RawDevelop;
use rawler::rawsource::RawSource;
use tracing::debug;

use crate::decode::DecodedImage;
use crate::error::LoadError;
use crate::scanner::is_raw_extension;

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn decode(path: &Path, parse_exif: bool) -> Result<DecodedImage, LoadError> {
    let ext = extension_of(path);
    let img = open_dynamic(path, &ext)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut decoded = DecodedImage::from_rgba(width, height, rgba.into_raw());

    if parse_exif {
        if let Ok(meta) = crate::metadata::read(path) {
            decoded.rotation = meta.rotation;
            decoded.metadata = Some(meta);
        }
    }
    Ok(decoded)
}

fn open_dynamic(path: &Path, ext: &str) -> Result<DynamicImage, LoadError> {
    match image::open(path) {
        Ok(img) => Ok(img),
        Err(ImageError::Unsupported(_)) if !is_raw_extension(ext) => {
            Err(LoadError::CodecNotFound(ext.to_string()))
        }
        Err(err) if is_raw_extension(ext) => {
            debug!(error = %err, "image crate rejected RAW file, trying rawler");
            decode_raw(path, ext)
        }
        Err(err) => Err(LoadError::DecodeFailed(err.to_string())),
    }
}

fn decode_raw(path: &Path, ext: &str) -> Result<DynamicImage, LoadError> {
    let source =
        RawSource::new(path).map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
    // No decoder claims the file at all vs. the claimed decoder failing are
    // surfaced as different errors.
    rawler::get_decoder(&source).map_err(|_| LoadError::CodecNotFound(ext.to_string()))?;
    let raw =
        rawler::decode_file(path).map_err(|_| LoadError::CodecInitFailed(ext.to_string()))?;

    let develop = RawDevelop::default();
    let intermediate = develop
        .develop_intermediate(&raw)
        .map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
    intermediate
        .to_dynamic_image()
        .ok_or_else(|| LoadError::DecodeFailed("raw develop produced invalid image".into()))
}

/// Opens an image for thumbnailing, preferring embedded previews for RAW
/// files so the builder never pays for a full develop.
pub fn open_preview(path: &Path) -> Option<DynamicImage> {
    let ext = extension_of(path);
    if is_raw_extension(&ext) {
        if let Some(img) = open_embedded_raw_preview(path) {
            return Some(img);
        }
    }
    match open_dynamic(path, &ext) {
        Ok(img) => Some(img),
        Err(_) => image::open(path).ok(),
    }
}

fn open_embedded_raw_preview(path: &Path) -> Option<DynamicImage> {
    let source = RawSource::new(path).ok()?;
    let decoder = rawler::get_decoder(&source).ok()?;
    let params = RawDecodeParams::default();

    if let Ok(Some(img)) = decoder.preview_image(&source, &params) {
        return Some(img);
    }
    if let Ok(Some(img)) = decoder.thumbnail_image(&source, &params) {
        return Some(img);
    }
    if let Ok(Some(img)) = decoder.full_image(&source, &params) {
        return Some(img);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn decodes_jpeg_through_the_codec_stack() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("photo.jpg");
        // JPEG has no alpha channel, so the fixture is RGB.
        RgbImage::from_pixel(3, 2, Rgb([50, 60, 70]))
            .save(&path)
            .expect("save jpg");

        let img = decode(&path, false).expect("decode");
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.frame(0).map(|f| f.len()), Some(3 * 2 * 4));
        assert!(img.metadata.is_none());
    }

    #[test]
    fn unrecognized_content_is_codec_not_found() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("mystery.tga2");
        std::fs::write(&path, b"not an image at all").expect("write");

        let err = decode(&path, false).expect_err("must fail");
        assert!(matches!(err, LoadError::CodecNotFound(ext) if ext == "tga2"));
    }

    #[test]
    fn truncated_jpeg_is_decode_failed() {
        let tmp = tempdir().expect("tempdir");
        let good = tmp.path().join("good.jpg");
        RgbImage::from_pixel(16, 16, Rgb([1, 2, 3]))
            .save(&good)
            .expect("save jpg");
        let bytes = std::fs::read(&good).expect("read");
        let bad = tmp.path().join("bad.jpg");
        // Keep only the SOI marker and a little header, mid-segment.
        std::fs::write(&bad, &bytes[..20]).expect("write truncated");

        let err = decode(&bad, false).expect_err("must fail");
        assert!(matches!(err, LoadError::DecodeFailed(_)));
    }
}
