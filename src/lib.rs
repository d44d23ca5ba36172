//! # pdf2img
//!
//! Page-addressable rasterisation of PDF documents into image files.
//!
//! ## Why this crate?
//!
//! Turning "a PDF" into "a directory of page images" is mostly not a
//! rendering problem — it is an orchestration problem: where do the bytes
//! come from, how is configuration kept coherent while renders are in
//! flight, which format does each output file get, what happens on page 0 or
//! page N+1, and what is left on disk when page 7 of 12 fails. This crate
//! owns that orchestration and treats the renderer itself as a pluggable
//! black box behind the [`PageRenderer`] trait (a pdfium adapter ships by
//! default).
//!
//! ## Pipeline Overview
//!
//! ```text
//! source (file / bytes / URL)
//!  │
//!  ├─ 1. Resource  lazy, cached byte materialization (DocumentResource)
//!  ├─ 2. Session   page-count probe, validation, config snapshot
//!  ├─ 3. Render    PageRenderer on the blocking pool (pdfium by default)
//!  └─ 4. Output    RenderedImage buffer or {dir}/{prefix}{page}.{format}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{DocumentResource, RasterSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pdf2img::Pdf2ImgError> {
//!     let session = RasterSession::open(DocumentResource::from_file("document.pdf"))?;
//!     session.set_resolution(300).set_output_format("png")?;
//!
//!     println!("{} pages", session.page_count().await?);
//!
//!     // One page as an in-memory buffer …
//!     let image = session.render_page(1).await?;
//!     assert!(!image.is_empty());
//!
//!     // … or the whole document onto disk.
//!     for path in session.render_all_pages("out", "page-").await? {
//!         println!("wrote {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `pdfium` | on      | The pdfium-backed [`PageRenderer`] adapter |
//!
//! Disable `pdfium` to depend only on the orchestration layer and plug in
//! your own renderer:
//! ```toml
//! pdf2img = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod format;
#[cfg(feature = "pdfium")]
pub mod pdfium;
pub mod renderer;
pub mod resource;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ColorSpace, MergePolicy, RasterConfig};
pub use error::{Pdf2ImgError, RenderError};
pub use format::{resolve_output_format, OutputFormat};
#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;
pub use renderer::{PageRenderer, RenderRequest};
pub use resource::{DocumentResource, DocumentSource, HttpFetcher, RemoteFetcher};
pub use session::{RasterSession, RenderedImage};
