//! The rasterization session: configuration, page-count memoization, and
//! per-page orchestration.
//!
//! ## Why per-call snapshots?
//!
//! A single mutable renderer handle re-used across calls is a
//! shared-mutable-state hazard once callers render from several tasks.
//! Instead the session's [`RasterConfig`] lives behind an `RwLock` and is
//! **cloned once at the entry of every render call**; the clone is turned
//! into an immutable
//! [`crate::renderer::RenderRequest`] and handed to the renderer. A
//! concurrent `set_resolution` can therefore never tear an in-flight
//! render's view of the configuration, and two concurrent renders each
//! complete with the settings that were configured the moment they began.
//!
//! ## Why spawn_blocking?
//!
//! Rendering is CPU-bound and renderer backends (pdfium among them) are not
//! async-safe. `tokio::task::spawn_blocking` moves each render onto the
//! blocking thread pool so Tokio worker threads never stall mid-page.

use crate::config::{ColorSpace, MergePolicy, RasterConfig};
use crate::error::{Pdf2ImgError, RenderError};
use crate::format::{resolve_output_format, OutputFormat};
use crate::renderer::{PageRenderer, RenderRequest};
use crate::resource::DocumentResource;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// One encoded page image.
///
/// Owns its buffer; every render call produces a fresh instance, so handing
/// it to another task is always safe.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// 1-based page number this image was rendered from.
    pub page: usize,
    /// The encoding of `bytes`.
    pub format: OutputFormat,
    /// Encoded image data.
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    /// Consume the image, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Byte length of the encoded image.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the encoded buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A page-by-page rasterization session over one document.
///
/// Constructed from a [`DocumentResource`] and a [`PageRenderer`]; fails
/// fast when the resource is invalid. Setters are fluent and take `&self`,
/// so a session can be shared across tasks (`Arc<RasterSession>`) while
/// renders are in flight.
///
/// # Example
/// ```rust,no_run
/// use pdf2img::{DocumentResource, RasterSession};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), pdf2img::Pdf2ImgError> {
/// let session = RasterSession::open(DocumentResource::from_file("document.pdf"))?;
/// session.set_resolution(300).set_output_format("png")?;
///
/// let image = session.render_page(1).await?;
/// println!("page 1: {} bytes of {}", image.len(), image.format);
///
/// let written = session.render_all_pages("out", "page-").await?;
/// println!("{} files written", written.len());
/// # Ok(())
/// # }
/// ```
pub struct RasterSession {
    resource: DocumentResource,
    renderer: Arc<dyn PageRenderer>,
    config: RwLock<RasterConfig>,
    page_count: OnceCell<usize>,
}

impl std::fmt::Debug for RasterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSession")
            .field("resource", &self.resource)
            .field("renderer", &"<dyn PageRenderer>")
            .field("config", &self.config)
            .field("page_count", &self.page_count)
            .finish()
    }
}

impl RasterSession {
    /// Create a session over `resource`, rendering through `renderer`.
    ///
    /// Fails with [`Pdf2ImgError::InvalidSource`] when the resource reports
    /// invalid — no partial construction, no deferred surprise.
    pub fn new(
        resource: DocumentResource,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self, Pdf2ImgError> {
        Self::with_config(resource, renderer, RasterConfig::default())
    }

    /// Like [`RasterSession::new`] with an explicit starting configuration.
    pub fn with_config(
        resource: DocumentResource,
        renderer: Arc<dyn PageRenderer>,
        config: RasterConfig,
    ) -> Result<Self, Pdf2ImgError> {
        if !resource.is_valid() {
            return Err(Pdf2ImgError::InvalidSource {
                detail: resource.describe(),
            });
        }

        debug!("Session opened over {}", resource.describe());
        Ok(Self {
            resource,
            renderer,
            config: RwLock::new(config),
            page_count: OnceCell::new(),
        })
    }

    /// Create a session rendering through the bundled pdfium adapter.
    #[cfg(feature = "pdfium")]
    pub fn open(resource: DocumentResource) -> Result<Self, Pdf2ImgError> {
        Self::new(resource, Arc::new(crate::pdfium::PdfiumRenderer::new()))
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Set the raster resolution in DPI (floored at 1).
    pub fn set_resolution(&self, resolution: u32) -> &Self {
        self.config_mut().resolution = resolution.max(1);
        self
    }

    /// Set the output format by name (`jpg`, `jpeg`, or `png`).
    ///
    /// Fails with [`Pdf2ImgError::UnsupportedFormat`] for anything else;
    /// the previously configured format is left untouched on failure.
    pub fn set_output_format(&self, format: &str) -> Result<&Self, Pdf2ImgError> {
        let parsed: OutputFormat = format.parse()?;
        self.config_mut().format = Some(parsed);
        Ok(self)
    }

    /// Clear the configured format so it is derived from each output path's
    /// extension instead (with the lenient `jpg` fallback).
    pub fn clear_output_format(&self) -> &Self {
        self.config_mut().format = None;
        self
    }

    /// Set the layer-merge policy by name (`none`, `flatten`, `merge`, or
    /// `mosaic`). `none` skips merging entirely.
    ///
    /// Fails with [`Pdf2ImgError::InvalidPolicy`] for anything else.
    pub fn set_merge_policy(&self, policy: &str) -> Result<&Self, Pdf2ImgError> {
        let parsed: MergePolicy = policy.parse()?;
        self.config_mut().merge_policy = parsed;
        Ok(self)
    }

    /// Set the target colorspace.
    pub fn set_colorspace(&self, colorspace: ColorSpace) -> &Self {
        self.config_mut().colorspace = Some(colorspace);
        self
    }

    /// Set the JPEG compression quality (clamped to 100).
    pub fn set_quality(&self, quality: u8) -> &Self {
        self.config_mut().quality = Some(quality.min(100));
        self
    }

    /// Set or clear the per-page render deadline.
    ///
    /// On expiry the call fails with [`Pdf2ImgError::RenderTimeout`]; the
    /// abandoned blocking render still runs to completion on its pool
    /// thread (blocking work cannot be cancelled).
    pub fn set_render_timeout(&self, timeout: Option<Duration>) -> &Self {
        self.config_mut().render_timeout = timeout;
        self
    }

    /// The currently configured resolution.
    pub fn resolution(&self) -> u32 {
        self.config_read().resolution
    }

    /// The currently configured output format, if any.
    pub fn output_format(&self) -> Option<OutputFormat> {
        self.config_read().format
    }

    /// The currently configured layer-merge policy.
    pub fn merge_policy(&self) -> MergePolicy {
        self.config_read().merge_policy
    }

    /// A snapshot of the full configuration.
    pub fn config(&self) -> RasterConfig {
        self.config_read().clone()
    }

    // ── Rendering ─────────────────────────────────────────────────────────

    /// The number of pages in the document.
    ///
    /// The first call materializes the document bytes and runs the
    /// renderer's metadata probe on the blocking pool; the result is
    /// memoized for the session's lifetime. Fails with
    /// [`Pdf2ImgError::DocumentUnreadable`] when the bytes cannot be parsed.
    pub async fn page_count(&self) -> Result<usize, Pdf2ImgError> {
        self.page_count
            .get_or_try_init(|| self.probe_page_count())
            .await
            .copied()
    }

    /// Rasterise one page (1-based) into an owned, freshly encoded image.
    ///
    /// Validates `1 <= page <= page_count()` first
    /// ([`Pdf2ImgError::PageOutOfRange`] otherwise). The configuration is
    /// snapshotted at call entry; the format comes from the configured
    /// format, defaulting to `jpg`.
    pub async fn render_page(&self, page: usize) -> Result<RenderedImage, Pdf2ImgError> {
        self.validate_page(page).await?;
        let config = self.config();
        let format = resolve_output_format(None, config.format);
        self.render_with(page, &config, format).await
    }

    /// Rasterise one page and write it to `destination`.
    ///
    /// When `destination` is a directory the filename is synthesized as
    /// `{page}.{format}` inside it; otherwise the final format is resolved
    /// from the path's extension and the configured format. Returns the path
    /// actually written.
    pub async fn save_page(
        &self,
        page: usize,
        destination: impl AsRef<Path>,
    ) -> Result<PathBuf, Pdf2ImgError> {
        self.validate_page(page).await?;
        let config = self.config();
        let destination = destination.as_ref();

        let (path, format) = if destination.is_dir() {
            let format = resolve_output_format(None, config.format);
            let name = format!("{page}.{}", format.extension());
            (destination.join(name), format)
        } else {
            let format = resolve_output_format(Some(destination), config.format);
            (destination.to_path_buf(), format)
        };

        let image = self.render_with(page, &config, format).await?;
        write_image(&path, &image).await?;
        info!("Saved page {page} to {}", path.display());
        Ok(path)
    }

    /// Rasterise every page into `directory` as
    /// `{directory}/{prefix}{page}.{format}`, pages 1..=N in ascending
    /// order.
    ///
    /// Returns the written paths in page order. A zero-page document yields
    /// an empty `Vec`, not an error. The first render or write failure
    /// aborts the batch and is surfaced as-is; files already written remain
    /// on disk — there is no rollback.
    pub async fn render_all_pages(
        &self,
        directory: impl AsRef<Path>,
        prefix: &str,
    ) -> Result<Vec<PathBuf>, Pdf2ImgError> {
        let total = self.page_count().await?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let directory = directory.as_ref();
        // One snapshot for the whole batch: pages of one run must not mix
        // resolutions when a setter fires mid-iteration.
        let config = self.config();
        let format = resolve_output_format(None, config.format);

        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|e| Pdf2ImgError::WriteFailed {
                path: directory.to_path_buf(),
                source: e,
            })?;

        let mut written = Vec::with_capacity(total);
        for page in 1..=total {
            let image = self.render_with(page, &config, format).await?;
            let path = directory.join(format!("{prefix}{page}.{}", format.extension()));
            write_image(&path, &image).await?;
            debug!("Wrote page {page}/{total} to {}", path.display());
            written.push(path);
        }

        info!("Wrote {total} pages to {}", directory.display());
        Ok(written)
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    async fn validate_page(&self, page: usize) -> Result<(), Pdf2ImgError> {
        let total = self.page_count().await?;
        if page < 1 || page > total {
            return Err(Pdf2ImgError::PageOutOfRange { page, total });
        }
        Ok(())
    }

    /// Render `page` under an already-snapshotted `config`.
    async fn render_with(
        &self,
        page: usize,
        config: &RasterConfig,
        format: OutputFormat,
    ) -> Result<RenderedImage, Pdf2ImgError> {
        let request = RenderRequest {
            page_index: page - 1,
            resolution: config.resolution,
            format,
            colorspace: config.colorspace,
            quality: config.quality,
            merge_policy: config.merge_policy,
        };

        let bytes = self.document_bytes().await?;
        let renderer = Arc::clone(&self.renderer);
        let task = tokio::task::spawn_blocking(move || renderer.render_page(&bytes, &request));

        let joined = match config.render_timeout {
            Some(deadline) => tokio::time::timeout(deadline, task).await.map_err(|_| {
                Pdf2ImgError::RenderTimeout {
                    page,
                    secs: deadline.as_secs(),
                }
            })?,
            None => task.await,
        };

        let encoded = joined
            .map_err(|e| Pdf2ImgError::Internal(format!("render task panicked: {e}")))?
            .map_err(|e| match e {
                RenderError::Unreadable { detail } => Pdf2ImgError::DocumentUnreadable { detail },
                RenderError::Failed { detail } => Pdf2ImgError::RenderFailed { page, detail },
            })?;

        debug!("Rendered page {page} → {} bytes ({format})", encoded.len());
        Ok(RenderedImage {
            page,
            format,
            bytes: encoded,
        })
    }

    async fn probe_page_count(&self) -> Result<usize, Pdf2ImgError> {
        let bytes = self.document_bytes().await?;
        let renderer = Arc::clone(&self.renderer);

        let count = tokio::task::spawn_blocking(move || renderer.page_count(&bytes))
            .await
            .map_err(|e| Pdf2ImgError::Internal(format!("page-count task panicked: {e}")))?
            .map_err(|e| Pdf2ImgError::DocumentUnreadable {
                detail: e.to_string(),
            })?;

        info!("Document has {count} pages");
        Ok(count)
    }

    async fn document_bytes(&self) -> Result<Arc<[u8]>, Pdf2ImgError> {
        self.resource
            .data()
            .await?
            .ok_or_else(|| Pdf2ImgError::InvalidSource {
                detail: self.resource.describe(),
            })
    }

    // A panicked setter cannot leave the config torn (single-field writes),
    // so lock poisoning is recoverable.
    fn config_read(&self) -> RwLockReadGuard<'_, RasterConfig> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn config_mut(&self) -> RwLockWriteGuard<'_, RasterConfig> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn write_image(path: &Path, image: &RenderedImage) -> Result<(), Pdf2ImgError> {
    tokio::fs::write(path, &image.bytes)
        .await
        .map_err(|e| Pdf2ImgError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
