//! Encoding: `DynamicImage` → PNG or TIFF on disk, with a resolution tag.
//!
//! `image`'s own encoders cannot write resolution metadata, so this stage
//! drives the `png` and `tiff` crates directly:
//!
//! * PNG — `pHYs` chunk in pixels per metre (300 DPI → 11 811 px/m), best
//!   compression.
//! * TIFF — `XResolution`/`YResolution` as `dpi/1` with `ResolutionUnit=Inch`,
//!   Deflate compression.
//!
//! Pixel layouts an encoder cannot take (float buffers, gray+alpha for TIFF)
//! are converted to the nearest 8/16-bit layout it can. Nothing else about the
//! pixels is touched.
//!
//! Output is written to a hidden temp file in the destination directory and
//! then persisted with no-clobber semantics: a failed encode leaves no partial
//! file behind, and a name that appeared after the destination was chosen is
//! still never overwritten.

use crate::config::{ConversionTarget, OutputFormat};
use crate::error::FileError;
use image::DynamicImage;
use std::borrow::Cow;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tiff::encoder::{colortype, compression::Deflate, Rational, TiffEncoder, TiffValue};
use tiff::tags::ResolutionUnit;
use tracing::debug;

const METRES_PER_INCH: f64 = 0.0254;

/// Convert DPI to the PNG `pHYs` unit (pixels per metre), rounded.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (f64::from(dpi) / METRES_PER_INCH).round() as u32
}

/// Encode `img` for `target` and create `destination`.
///
/// # Errors
/// [`FileError::Write`] if encoding fails, the temp file cannot be created,
/// or `destination` already exists.
pub fn write_image(
    img: &DynamicImage,
    destination: &Path,
    target: &ConversionTarget,
) -> Result<(), FileError> {
    let write_err = |detail: String| FileError::Write {
        path: destination.to_path_buf(),
        detail,
    };

    let dir = destination
        .parent()
        .ok_or_else(|| write_err("destination has no parent directory".into()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".ocrprep-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| write_err(format!("cannot create temp file: {e}")))?;

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        match target.format {
            OutputFormat::Png => encode_png(img, target.dpi, &mut out),
            OutputFormat::Tiff => encode_tiff(img, target.dpi, &mut out),
        }
        .map_err(write_err)?;
        out.flush()
            .map_err(|e| write_err(format!("flush failed: {e}")))?;
    }

    tmp.persist_noclobber(destination)
        .map_err(|e| write_err(e.error.to_string()))?;

    debug!(
        "Wrote {} ({}x{} @ {} DPI)",
        destination.display(),
        img.width(),
        img.height(),
        target.dpi
    );
    Ok(())
}

// ── PNG ──────────────────────────────────────────────────────────────────────

/// Encode as PNG with a `pHYs` chunk.
pub fn encode_png<W: Write>(img: &DynamicImage, dpi: u32, w: W) -> Result<(), String> {
    use png::{BitDepth, ColorType};

    let (color, depth, data): (ColorType, BitDepth, Cow<'_, [u8]>) = match img {
        DynamicImage::ImageLuma8(b) => (ColorType::Grayscale, BitDepth::Eight, b.as_raw().into()),
        DynamicImage::ImageLumaA8(b) => {
            (ColorType::GrayscaleAlpha, BitDepth::Eight, b.as_raw().into())
        }
        DynamicImage::ImageRgb8(b) => (ColorType::Rgb, BitDepth::Eight, b.as_raw().into()),
        DynamicImage::ImageRgba8(b) => (ColorType::Rgba, BitDepth::Eight, b.as_raw().into()),
        DynamicImage::ImageLuma16(b) => {
            (ColorType::Grayscale, BitDepth::Sixteen, be_bytes(b.as_raw()).into())
        }
        DynamicImage::ImageLumaA16(b) => (
            ColorType::GrayscaleAlpha,
            BitDepth::Sixteen,
            be_bytes(b.as_raw()).into(),
        ),
        DynamicImage::ImageRgb16(b) => {
            (ColorType::Rgb, BitDepth::Sixteen, be_bytes(b.as_raw()).into())
        }
        DynamicImage::ImageRgba16(b) => {
            (ColorType::Rgba, BitDepth::Sixteen, be_bytes(b.as_raw()).into())
        }
        other if other.color().has_alpha() => {
            (ColorType::Rgba, BitDepth::Eight, other.to_rgba8().into_raw().into())
        }
        other => (ColorType::Rgb, BitDepth::Eight, other.to_rgb8().into_raw().into()),
    };

    let ppm = dpi_to_ppm(dpi);
    let mut encoder = png::Encoder::new(w, img.width(), img.height());
    encoder.set_color(color);
    encoder.set_depth(depth);
    encoder.set_compression(png::Compression::Best);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder
        .write_header()
        .map_err(|e| format!("PNG header: {e}"))?;
    writer
        .write_image_data(&data)
        .map_err(|e| format!("PNG data: {e}"))?;
    writer.finish().map_err(|e| format!("PNG finish: {e}"))
}

/// PNG stores 16-bit samples big-endian.
fn be_bytes(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

// ── TIFF ─────────────────────────────────────────────────────────────────────

/// Encode as Deflate TIFF with X/Y resolution in inches.
pub fn encode_tiff<W: Write + Seek>(img: &DynamicImage, dpi: u32, w: W) -> Result<(), String> {
    let mut enc = TiffEncoder::new(w).map_err(|e| format!("TIFF header: {e}"))?;
    let (width, height) = (img.width(), img.height());

    match img {
        DynamicImage::ImageLuma8(b) => {
            write_tiff::<_, colortype::Gray8>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageRgb8(b) => {
            write_tiff::<_, colortype::RGB8>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageRgba8(b) => {
            write_tiff::<_, colortype::RGBA8>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageLuma16(b) => {
            write_tiff::<_, colortype::Gray16>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageRgb16(b) => {
            write_tiff::<_, colortype::RGB16>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageRgba16(b) => {
            write_tiff::<_, colortype::RGBA16>(&mut enc, width, height, dpi, b.as_raw())
        }
        DynamicImage::ImageLumaA16(_) => {
            let rgba = img.to_rgba16();
            write_tiff::<_, colortype::RGBA16>(&mut enc, width, height, dpi, rgba.as_raw())
        }
        other if other.color().has_alpha() => {
            let rgba = other.to_rgba8();
            write_tiff::<_, colortype::RGBA8>(&mut enc, width, height, dpi, rgba.as_raw())
        }
        other => {
            let rgb = other.to_rgb8();
            write_tiff::<_, colortype::RGB8>(&mut enc, width, height, dpi, rgb.as_raw())
        }
    }
    .map_err(|e| format!("TIFF data: {e}"))
}

fn write_tiff<W, C>(
    enc: &mut TiffEncoder<W>,
    width: u32,
    height: u32,
    dpi: u32,
    data: &[C::Inner],
) -> tiff::TiffResult<()>
where
    W: Write + Seek,
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = enc.new_image_with_compression::<C, _>(width, height, Deflate::default())?;
    image.resolution(ResolutionUnit::Inch, Rational { n: dpi, d: 1 });
    image.write_data(data)
}
