//! Document resources: where the document's raw bytes come from.
//!
//! The set of backing stores is fixed and known at design time — a local
//! file, an in-memory buffer, or a remote URL — so [`DocumentSource`] is a
//! closed sum type rather than open-ended dynamic dispatch. Only the HTTP
//! capability behind the remote variant is injected ([`RemoteFetcher`]),
//! because *how* bytes travel the network is not this crate's concern.
//!
//! ## Absent vs. empty
//!
//! [`DocumentResource::data`] on an invalid resource returns `Ok(None)` —
//! never an error and never a sentinel empty buffer. A zero-byte file is a
//! *valid* resource whose data is `Some` and empty; callers can always tell
//! "no document" from "empty document".
//!
//! ## Laziness and sharing
//!
//! Bytes are materialized on first use and cached for the resource's
//! lifetime. After materialization the buffer is immutable (`Arc<[u8]>`), so
//! the session and any number of concurrent render calls share it without
//! locks.

use crate::error::Pdf2ImgError;
use futures::future::BoxFuture;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Injected HTTP capability used by remote resources.
///
/// Implementations must be `Send + Sync`; the fetch runs at most once per
/// resource (the result is cached). Network-level retries, auth, and proxies
/// all live behind this seam.
pub trait RemoteFetcher: Send + Sync {
    /// Fetch the document bytes at `url`, or fail with
    /// [`Pdf2ImgError::DownloadFailed`] / [`Pdf2ImgError::DownloadTimeout`].
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, Pdf2ImgError>>;
}

/// The three backing stores a document can come from.
pub enum DocumentSource {
    /// Path-backed; contents read once via `tokio::fs` and cached.
    File(PathBuf),
    /// Byte-buffer-backed; zero-copy.
    Memory(Arc<[u8]>),
    /// URL-backed; fetched once through the injected [`RemoteFetcher`].
    Remote {
        url: String,
        fetcher: Arc<dyn RemoteFetcher>,
    },
}

impl fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::File(path) => f.debug_tuple("File").field(path).finish(),
            DocumentSource::Memory(bytes) => f
                .debug_struct("Memory")
                .field("len", &bytes.len())
                .finish(),
            DocumentSource::Remote { url, .. } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("fetcher", &"<dyn RemoteFetcher>")
                .finish(),
        }
    }
}

/// An opaque byte-owning document, lazily materialized.
#[derive(Debug)]
pub struct DocumentResource {
    source: DocumentSource,
    cache: OnceCell<Arc<[u8]>>,
}

impl DocumentResource {
    /// A resource backed by a local file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DocumentSource::File(path.into()),
            cache: OnceCell::new(),
        }
    }

    /// A resource backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: DocumentSource::Memory(Arc::from(bytes.into())),
            cache: OnceCell::new(),
        }
    }

    /// A resource backed by a remote URL, fetched through `fetcher`.
    pub fn from_url(url: impl Into<String>, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            source: DocumentSource::Remote {
                url: url.into(),
                fetcher,
            },
            cache: OnceCell::new(),
        }
    }

    /// Whether this resource can produce data at all.
    ///
    /// * `File` — path non-empty and the file exists.
    /// * `Memory` — buffer non-empty.
    /// * `Remote` — URL parses as http/https.
    pub fn is_valid(&self) -> bool {
        match &self.source {
            DocumentSource::File(path) => !path.as_os_str().is_empty() && path.exists(),
            DocumentSource::Memory(bytes) => !bytes.is_empty(),
            DocumentSource::Remote { url, .. } => reqwest::Url::parse(url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false),
        }
    }

    /// The document bytes, or `None` when the resource is invalid.
    ///
    /// The first call materializes (reads or fetches) the bytes; subsequent
    /// calls return the cached buffer. Materialization failures on a *valid*
    /// resource — a read error, a failed download — are errors, distinct from
    /// the `None` of an invalid resource.
    pub async fn data(&self) -> Result<Option<Arc<[u8]>>, Pdf2ImgError> {
        if !self.is_valid() {
            return Ok(None);
        }

        let bytes = self.cache.get_or_try_init(|| self.materialize()).await?;
        Ok(Some(Arc::clone(bytes)))
    }

    /// One-line description of the source for error messages.
    pub fn describe(&self) -> String {
        match &self.source {
            DocumentSource::File(path) => format!("file '{}'", path.display()),
            DocumentSource::Memory(bytes) => format!("{}-byte buffer", bytes.len()),
            DocumentSource::Remote { url, .. } => format!("url '{url}'"),
        }
    }

    async fn materialize(&self) -> Result<Arc<[u8]>, Pdf2ImgError> {
        match &self.source {
            DocumentSource::File(path) => {
                let bytes =
                    tokio::fs::read(path)
                        .await
                        .map_err(|e| Pdf2ImgError::InvalidSource {
                            detail: format!("cannot read '{}': {e}", path.display()),
                        })?;
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(Arc::from(bytes))
            }
            DocumentSource::Memory(bytes) => Ok(Arc::clone(bytes)),
            DocumentSource::Remote { url, fetcher } => {
                info!("Fetching document from: {url}");
                let bytes = fetcher.fetch(url).await?;
                info!("Fetched {} bytes from {url}", bytes.len());
                Ok(Arc::from(bytes))
            }
        }
    }
}

/// Default [`RemoteFetcher`] backed by `reqwest`.
///
/// One plain GET with a timeout. No retries — those belong to the caller or
/// to a custom fetcher implementation.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    /// A fetcher with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
        }
    }
}

impl RemoteFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>, Pdf2ImgError>> {
        Box::pin(async move {
            let client = reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| Pdf2ImgError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            let response = client.get(url).send().await.map_err(|e| {
                if e.is_timeout() {
                    Pdf2ImgError::DownloadTimeout {
                        url: url.to_string(),
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    Pdf2ImgError::DownloadFailed {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

            if !response.status().is_success() {
                return Err(Pdf2ImgError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status()),
                });
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Pdf2ImgError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            Ok(bytes.to_vec())
        })
    }
}
