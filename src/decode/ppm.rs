//! Minimal binary PPM (`P6`) reader.
//!
//! Only the binary variant with a maxval of 255 is accepted. Rows are read in
//! blocks sized to a multiple of 3 so no pixel straddles two reads, and each
//! RGB triplet is expanded to RGBA with opaque alpha.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::decode::DecodedImage;
use crate::error::LoadError;

// Greatest multiple of 3 that fits one page of buffered reads.
const BLOCK: usize = 4095;

fn corrupt(reason: &str) -> LoadError {
    LoadError::CorruptFile(reason.to_string())
}

/// Reads one whitespace-delimited ASCII integer, skipping `#` comment lines.
fn read_header_value(reader: &mut impl BufRead) -> Result<u32, LoadError> {
    let mut digits = String::new();
    let mut in_comment = false;
    loop {
        let mut byte = [0u8; 1];
        reader
            .read_exact(&mut byte)
            .map_err(|_| corrupt("truncated header"))?;
        let c = byte[0];
        if in_comment {
            if c == b'\n' {
                in_comment = false;
            }
            continue;
        }
        match c {
            b'#' if digits.is_empty() => in_comment = true,
            c if c.is_ascii_whitespace() => {
                if !digits.is_empty() {
                    break;
                }
            }
            c if c.is_ascii_digit() => digits.push(c as char),
            _ => return Err(corrupt("malformed header")),
        }
    }
    digits.parse().map_err(|_| corrupt("malformed header"))
}

/// Fills `buf` as far as the stream allows. Unlike a bare `read`, a short
/// count here means end of file, so every block but the last stays a
/// multiple of 3.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub fn decode(path: &Path) -> Result<DecodedImage, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 2];
    reader
        .read_exact(&mut magic)
        .map_err(|_| corrupt("truncated header"))?;
    if &magic != b"P6" {
        return Err(corrupt("not a binary PPM (P6) file"));
    }

    let width = read_header_value(&mut reader)?;
    let height = read_header_value(&mut reader)?;
    let maxval = read_header_value(&mut reader)?;
    if maxval != 255 {
        return Err(corrupt("only maxval 255 is supported"));
    }
    if width == 0 || height == 0 {
        return Err(corrupt("zero-sized image"));
    }

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| corrupt("image dimensions overflow"))?;
    let out_len = pixel_count
        .checked_mul(4)
        .ok_or_else(|| corrupt("image dimensions overflow"))?;

    let mut data = vec![0xFFu8; out_len];
    let mut block = [0u8; BLOCK];
    let mut write = 0usize;
    loop {
        let read = read_full(&mut reader, &mut block)
            .map_err(|e| LoadError::DecodeFailed(e.to_string()))?;
        if read == 0 {
            break;
        }
        // Each block must carry whole pixels, and never more than fit.
        if read % 3 != 0 || write + (read / 3) * 4 > out_len {
            return Err(corrupt("pixel data does not match the header"));
        }
        for px in block[..read].chunks_exact(3) {
            data[write] = px[0];
            data[write + 1] = px[1];
            data[write + 2] = px[2];
            write += 4;
        }
    }
    if write != out_len {
        return Err(corrupt("pixel data does not match the header"));
    }

    Ok(DecodedImage::from_rgba(width, height, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_ppm(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("test.ppm");
        std::fs::write(&path, bytes).expect("write ppm");
        (tmp, path)
    }

    #[test]
    fn decodes_a_two_by_two_image() {
        let mut bytes = b"P6\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[
            1, 2, 3, 4, 5, 6, //
            7, 8, 9, 10, 11, 12,
        ]);
        let (_tmp, path) = write_ppm(&bytes);

        let img = decode(&path).expect("decode");
        assert_eq!((img.width, img.height), (2, 2));
        let rgba = img.frame(0).expect("frame");
        assert_eq!(&rgba[..8], &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(&rgba[8..], &[7, 8, 9, 255, 10, 11, 12, 255]);
    }

    #[test]
    fn skips_comment_lines_in_the_header() {
        let mut bytes = b"P6\n# shot on a potato\n1 1\n# another\n255\n".to_vec();
        bytes.extend_from_slice(&[100, 150, 200]);
        let (_tmp, path) = write_ppm(&bytes);

        let img = decode(&path).expect("decode");
        assert_eq!(img.frame(0).unwrap(), &[100, 150, 200, 255]);
    }

    #[test]
    fn rejects_maxval_other_than_255() {
        let mut bytes = b"P6\n1 1\n254\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        let (_tmp, path) = write_ppm(&bytes);

        let err = decode(&path).expect_err("must reject");
        assert!(matches!(err, LoadError::CorruptFile(_)));
    }

    #[test]
    fn rejects_ascii_ppm_magic() {
        let (_tmp, path) = write_ppm(b"P3\n1 1\n255\n1 2 3\n");
        let err = decode(&path).expect_err("must reject");
        assert!(matches!(err, LoadError::CorruptFile(_)));
    }

    #[test]
    fn rejects_truncated_pixel_data() {
        let mut bytes = b"P6\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6]); // only half the pixels
        let (_tmp, path) = write_ppm(&bytes);

        let err = decode(&path).expect_err("must reject");
        assert!(matches!(err, LoadError::CorruptFile(_)));
    }

    #[test]
    fn rejects_excess_pixel_data() {
        let mut bytes = b"P6\n1 1\n255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
        let (_tmp, path) = write_ppm(&bytes);

        let err = decode(&path).expect_err("must reject");
        assert!(matches!(err, LoadError::CorruptFile(_)));
    }

    #[test]
    fn rejects_garbage_header() {
        let (_tmp, path) = write_ppm(b"P6\nwide tall\n255\n");
        let err = decode(&path).expect_err("must reject");
        assert!(matches!(err, LoadError::CorruptFile(_)));
    }
}
