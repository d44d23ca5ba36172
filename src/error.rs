//! Error types for the pdf2img library.
//!
//! Two distinct error types reflect the two layers of the crate:
//!
//! * [`Pdf2ImgError`] — the public taxonomy returned by
//!   [`crate::session::RasterSession`] and the resource layer. Carries enough
//!   context (page numbers, paths, URLs) for a caller to act on the failure.
//!
//! * [`RenderError`] — the renderer seam. A [`crate::renderer::PageRenderer`]
//!   implementation knows nothing about sessions or page numbering; it reports
//!   only whether the document could not be parsed at all or a single render
//!   went wrong. The session adds page context when mapping into
//!   [`Pdf2ImgError`].
//!
//! Every validation error is raised immediately and locally — the single
//! deliberate exception is the lenient extension fallback in
//! [`crate::format::resolve_output_format`], which silently defaults to `jpg`.
//! There is no retry policy anywhere in this crate; retries belong to the
//! caller or to the external renderer/HTTP collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Source errors ─────────────────────────────────────────────────────
    /// The document resource failed validation at session construction.
    #[error("Invalid document source: {detail}\nCheck the path exists, the buffer is non-empty, or the URL is well-formed.")]
    InvalidSource { detail: String },

    /// HTTP URL was syntactically valid but the fetch failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the fetcher's configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Configuration errors ──────────────────────────────────────────────
    /// The requested output format is not in the supported set.
    #[error("Format '{format}' is not supported (expected one of: jpg, jpeg, png)")]
    UnsupportedFormat { format: String },

    /// The requested layer-merge policy is not recognised.
    #[error("Layer-merge policy '{policy}' is not recognised (expected one of: none, flatten, merge, mosaic)")]
    InvalidPolicy { policy: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// A page index outside `[1, page_count]` was requested.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The renderer could not parse the document bytes as the expected
    /// container format.
    #[error("Document is unreadable: {detail}")]
    DocumentUnreadable { detail: String },

    /// The renderer failed while rasterising a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// A page render exceeded the configured per-page deadline.
    #[error("Rendering page {page} timed out after {secs}s\nRaise or clear RasterConfig::render_timeout for large pages.")]
    RenderTimeout { page: usize, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output image file.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking render task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure reported by a [`crate::renderer::PageRenderer`] implementation.
///
/// Renderer-local on purpose: adapters stay decoupled from session concepts
/// like 1-based page numbers and output paths.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document bytes could not be parsed as the container format the
    /// renderer understands.
    #[error("unreadable document: {detail}")]
    Unreadable { detail: String },

    /// The document parsed, but rendering the requested page failed.
    #[error("render failed: {detail}")]
    Failed { detail: String },
}

impl RenderError {
    /// Shorthand for [`RenderError::Unreadable`].
    pub fn unreadable(detail: impl Into<String>) -> Self {
        RenderError::Unreadable {
            detail: detail.into(),
        }
    }

    /// Shorthand for [`RenderError::Failed`].
    pub fn failed(detail: impl Into<String>) -> Self {
        RenderError::Failed {
            detail: detail.into(),
        }
    }
}
