//! The renderer seam: the black-box capability that decodes a page and
//! encodes it as a raster image.
//!
//! This crate performs no decoding, compositing, or codec work of its own —
//! all of that happens behind [`PageRenderer`]. The crate ships a
//! pdfium-backed adapter ([`crate::pdfium::PdfiumRenderer`], feature
//! `pdfium`), and any other backend plugs into the same trait.
//!
//! ## Contract
//!
//! * Implementations must be `Send + Sync` — the session drives them from
//!   the blocking thread pool, possibly from several threads at once.
//! * Every call receives the complete [`RenderRequest`] up front and must
//!   create its own per-call renderer state. Sampling happens at decode time
//!   at `request.resolution`; there is no "set resolution later" escape
//!   hatch, which is exactly what makes concurrent renders safe.
//! * Page indices are 0-based here. The 1-based public contract ends at this
//!   boundary.

use crate::config::{ColorSpace, MergePolicy};
use crate::error::RenderError;
use crate::format::OutputFormat;

/// The immutable per-call snapshot handed to a renderer.
///
/// Built by the session from the [`crate::config::RasterConfig`] it
/// snapshotted at call entry; a renderer never observes half-updated
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// 0-based page index.
    pub page_index: usize,
    /// Raster resolution in DPI, applied at decode time.
    pub resolution: u32,
    /// Encoding of the returned bytes.
    pub format: OutputFormat,
    /// Target colorspace; `None` means the renderer's native colorspace.
    pub colorspace: Option<ColorSpace>,
    /// JPEG quality 0–100; `None` means the renderer's default.
    pub quality: Option<u8>,
    /// How multi-layer page content is composited before encoding.
    pub merge_policy: MergePolicy,
}

/// Render capability over an opaque paginated document.
pub trait PageRenderer: Send + Sync {
    /// Metadata-only probe: the number of pages in `document`.
    ///
    /// Fails with [`RenderError::Unreadable`] when the bytes cannot be
    /// parsed as the expected container format. The session calls this at
    /// most once per document and memoizes the result.
    fn page_count(&self, document: &[u8]) -> Result<usize, RenderError>;

    /// Rasterise one page into encoded image bytes in `request.format`.
    ///
    /// Returns a freshly owned buffer — implementations must not reuse an
    /// internal buffer across calls.
    fn render_page(&self, document: &[u8], request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}
