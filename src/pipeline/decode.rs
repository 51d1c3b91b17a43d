//! Decoding: source file → upright `DynamicImage`.
//!
//! The container format is sniffed from the file's magic bytes, falling back
//! to the extension, so a mislabelled file still decodes. EXIF orientation is
//! applied to the pixels because the re-encoded output carries no EXIF block
//! and OCR engines expect upright text.
//!
//! Which formats can be decoded depends on the `image` features compiled in.
//! [`decoder_available`] answers that up front so HEIC/HEIF (no pure-Rust
//! decoder) is reported as unsupported instead of surfacing as a decode error.

use crate::error::FileError;
use crate::output::ImageCandidate;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use tracing::debug;

/// True if this build can decode files with the given extension.
pub fn decoder_available(extension: &str) -> bool {
    ImageFormat::from_extension(extension).is_some_and(|f| f.reading_enabled())
}

/// Check the decoder capability for a candidate before touching its bytes.
pub fn ensure_decodable(candidate: &ImageCandidate) -> Result<(), FileError> {
    if decoder_available(&candidate.extension) {
        return Ok(());
    }
    Err(FileError::UnsupportedFormat {
        path: candidate.path.clone(),
        extension: candidate.extension.clone(),
        detail: "no decoder for this format is available in this build".into(),
    })
}

/// Decode a candidate and apply its EXIF orientation.
pub fn decode(candidate: &ImageCandidate) -> Result<DynamicImage, FileError> {
    let path = &candidate.path;
    let decode_err = |detail: String| FileError::Decode {
        path: path.clone(),
        detail,
    };

    let reader = ImageReader::open(path)
        .map_err(|e| decode_err(format!("cannot open: {e}")))?
        .with_guessed_format()
        .map_err(|e| decode_err(format!("cannot read header: {e}")))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| decode_err(e.to_string()))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| decode_err(format!("bad orientation metadata: {e}")))?;

    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| decode_err(e.to_string()))?;
    img.apply_orientation(orientation);

    debug!(
        "Decoded {} → {}x{} {:?}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}
