// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page decoding and photo encoding helpers for callers that work with files
// or byte buffers.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use scansplit_core::error::{Result, ScanSplitError};
use tracing::{debug, instrument};

/// Quality used when writing extracted photos.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Decode an encoded page (JPEG, PNG, TIFF, BMP, WebP) into RGB.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_page(data: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| ScanSplitError::ImageError(format!("failed to decode page: {}", err)))?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Page decoded from bytes"
    );
    Ok(image.to_rgb8())
}

/// Load a page from disk into RGB. The format is guessed from the content.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_page(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|err| {
            ScanSplitError::ImageError(format!("failed to open {}: {}", path.display(), err))
        })?;
    debug!(width = image.width(), height = image.height(), "Page loaded");
    Ok(image.to_rgb8())
}

/// Encode an RGB image as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|err| ScanSplitError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Write `image` as a JPEG file, creating missing parent directories.
#[instrument(skip(image), fields(path = %path.display()))]
pub fn save_jpeg(path: &Path, image: &RgbImage, quality: u8) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = encode_jpeg(image, quality)?;
    std::fs::write(path, bytes)?;
    debug!(
        width = image.width(),
        height = image.height(),
        "JPEG written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn sample() -> RgbImage {
        RgbImage::from_fn(32, 24, |x, y| Rgb([(x * 8) as u8, (y * 10) as u8, 90]))
    }

    #[test]
    fn png_bytes_decode_back_exactly() {
        let page = sample();
        let mut png = std::io::Cursor::new(Vec::new());
        page.write_to(&mut png, ImageFormat::Png).expect("png");
        let decoded = decode_page(png.get_ref()).expect("decode");
        assert_eq!(decoded, page);
    }

    #[test]
    fn jpeg_has_magic_bytes() {
        let bytes = encode_jpeg(&sample(), DEFAULT_JPEG_QUALITY).expect("jpeg");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(decode_page(&bytes).expect("decode").dimensions(), (32, 24));
    }

    #[test]
    fn garbage_is_an_image_error() {
        let err = decode_page(b"not an image").expect_err("must fail");
        assert!(matches!(err, ScanSplitError::ImageError(_)));
    }

    #[test]
    fn save_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deeper").join("photo_01.jpg");
        save_jpeg(&path, &sample(), 90).expect("save");
        assert_eq!(open_page(&path).expect("open").dimensions(), (32, 24));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = open_page(dir.path().join("absent.png")).expect_err("must fail");
        assert!(matches!(err, ScanSplitError::Io(_)));
    }
}
