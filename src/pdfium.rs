//! pdfium-backed [`PageRenderer`] adapter.
//!
//! Binds the pdfium library through `pdfium-render` and encodes bitmaps with
//! the `image` crate. A fresh `Pdfium` binding and document load happen on
//! every call: pdfium keeps thread-local state internally, and per-call
//! state is exactly what the [`PageRenderer`] contract demands — the
//! resolution in the request is applied when the page is scaled, before any
//! pixel exists.
//!
//! pdfium's output is always a flattened composite raster (it exposes no
//! per-layer access), so every merge policy other than `None` maps to its
//! native compositing. The policy distinction matters to renderers that do
//! expose layers.

use crate::config::ColorSpace;
use crate::error::RenderError;
use crate::format::OutputFormat;
use crate::renderer::{PageRenderer, RenderRequest};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use tracing::debug;

/// JPEG quality used when the request carries none.
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// PDF page geometry is expressed in points, 72 per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders PDF pages through a system or bundled pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    password: Option<String>,
}

impl PdfiumRenderer {
    /// A renderer for unencrypted documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer that opens documents with the given user password.
    pub fn with_password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
        }
    }

    fn load<'a>(
        &self,
        pdfium: &'a Pdfium,
        document: &'a [u8],
    ) -> Result<PdfDocument<'a>, RenderError> {
        pdfium
            .load_pdf_from_byte_slice(document, self.password.as_deref())
            .map_err(|e| RenderError::unreadable(format!("{e:?}")))
    }
}

impl PageRenderer for PdfiumRenderer {
    fn page_count(&self, document: &[u8]) -> Result<usize, RenderError> {
        let pdfium = Pdfium::default();
        let document = self.load(&pdfium, document)?;
        Ok(document.pages().len() as usize)
    }

    fn render_page(&self, document: &[u8], request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        let pdfium = Pdfium::default();
        let document = self.load(&pdfium, document)?;
        let pages = document.pages();

        let page = pages
            .get(request.page_index as u16)
            .map_err(|e| RenderError::failed(format!("{e:?}")))?;

        // Scale from the page's physical size so the requested DPI holds
        // regardless of page dimensions; height follows proportionally.
        let width_px =
            (page.width().value / POINTS_PER_INCH * request.resolution as f32).round() as i32;
        let render_config = PdfRenderConfig::new().set_target_width(width_px.max(1));

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| RenderError::failed(format!("{e:?}")))?;

        let image = apply_colorspace(bitmap.as_image(), request.colorspace);
        debug!(
            "Rendered page index {} → {}x{} px at {} dpi",
            request.page_index,
            image.width(),
            image.height(),
            request.resolution
        );

        encode(&image, request.format, request.quality)
    }
}

fn apply_colorspace(image: DynamicImage, colorspace: Option<ColorSpace>) -> DynamicImage {
    match colorspace {
        None => image,
        Some(ColorSpace::Rgb) => DynamicImage::ImageRgb8(image.to_rgb8()),
        Some(ColorSpace::Grayscale) => DynamicImage::ImageLuma8(image.to_luma8()),
    }
}

/// Encode to the requested format; PNG is lossless and ignores quality.
fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    quality: Option<u8>,
) -> Result<Vec<u8>, RenderError> {
    let mut buf = Vec::new();

    if format.is_jpeg() {
        let quality = quality.unwrap_or(DEFAULT_JPEG_QUALITY).min(100);
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        // JPEG has no alpha channel; encode from the matching 8-bit buffer.
        match image {
            DynamicImage::ImageLuma8(gray) => encoder.encode_image(gray),
            other => encoder.encode_image(&other.to_rgb8()),
        }
        .map_err(|e| RenderError::failed(format!("JPEG encoding failed: {e}")))?;
    } else {
        image
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| RenderError::failed(format!("PNG encoding failed: {e}")))?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([200, 40, 40, 255])))
    }

    #[test]
    fn png_encoding_produces_png_magic() {
        let bytes = encode(&sample(), OutputFormat::Png, None).expect("encode");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_encoding_handles_alpha_input() {
        let bytes = encode(&sample(), OutputFormat::Jpg, Some(80)).expect("encode");
        // JPEG/JFIF starts with the SOI marker.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn grayscale_colorspace_converts_to_luma() {
        let gray = apply_colorspace(sample(), Some(ColorSpace::Grayscale));
        assert!(matches!(gray, DynamicImage::ImageLuma8(_)));

        let bytes = encode(&gray, OutputFormat::Jpeg, None).expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
