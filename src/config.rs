//! Configuration types for page rasterisation.
//!
//! All rendering behaviour is controlled through [`RasterConfig`]. Keeping
//! every knob in one plain struct makes it trivial to snapshot per render
//! call, serialise for logging, and diff two runs to understand why their
//! outputs differ.
//!
//! The session never reads configuration field-by-field during a render: it
//! clones the whole struct at call entry (see
//! [`crate::session::RasterSession`]), so a concurrent setter call can never
//! tear an in-flight render's view of the configuration.

use crate::error::Pdf2ImgError;
use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Settings applied to a render call.
///
/// Obtained via [`Default`] and mutated through the session's fluent setters,
/// or constructed directly when the caller wants full control (e.g.
/// `format: None` to derive the format from the output path's extension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    /// Raster resolution in DPI. Default: 144.
    ///
    /// Resolution must reach the renderer before the page is decoded —
    /// raster libraries sample at decode time, so a resolution applied after
    /// decode silently produces default-resolution output. The session
    /// guarantees this by passing the snapshot inside every
    /// [`crate::renderer::RenderRequest`].
    pub resolution: u32,

    /// Output format. Default: `Some(Jpg)`.
    ///
    /// `None` means "derive from the requested output path's extension",
    /// with the lenient `jpg` fallback documented in [`crate::format`].
    pub format: Option<OutputFormat>,

    /// Layer-merge policy. Default: [`MergePolicy::Flatten`].
    ///
    /// [`MergePolicy::None`] skips merging entirely; any other value asks the
    /// renderer to composite multi-layer page content into a single image
    /// before encoding.
    pub merge_policy: MergePolicy,

    /// Target colorspace. Default: `None` (renderer's native, normally RGB).
    pub colorspace: Option<ColorSpace>,

    /// Compression quality 0–100, JPEG only. Default: `None` (renderer's
    /// default). PNG output is lossless and ignores this field.
    pub quality: Option<u8>,

    /// Per-page render deadline. Default: `None` (no deadline).
    ///
    /// Rendering is CPU- and memory-heavy for large pages; a caller that
    /// cannot tolerate an unbounded render sets this and receives
    /// [`Pdf2ImgError::RenderTimeout`] on expiry.
    pub render_timeout: Option<Duration>,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            resolution: 144,
            format: Some(OutputFormat::Jpg),
            merge_policy: MergePolicy::Flatten,
            colorspace: None,
            quality: None,
            render_timeout: None,
        }
    }
}

/// How multi-layer page content is composited before encoding.
///
/// A small closed set: the recognised merge modes plus `None`. Renderers
/// whose native output is already a flattened composite treat every
/// non-`None` value as their native compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Skip layer merging.
    None,
    /// Flatten all layers onto the page background. (default)
    #[default]
    Flatten,
    /// Merge layers without background compositing.
    Merge,
    /// Mosaic layers side by side on an enlarged canvas.
    Mosaic,
}

impl MergePolicy {
    /// True unless the policy is [`MergePolicy::None`].
    pub fn is_merging(&self) -> bool {
        !matches!(self, MergePolicy::None)
    }
}

impl FromStr for MergePolicy {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(MergePolicy::None),
            "flatten" => Ok(MergePolicy::Flatten),
            "merge" => Ok(MergePolicy::Merge),
            "mosaic" => Ok(MergePolicy::Mosaic),
            _ => Err(Pdf2ImgError::InvalidPolicy {
                policy: s.to_string(),
            }),
        }
    }
}

/// Target colorspace for the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// 8-bit RGB.
    Rgb,
    /// 8-bit grayscale.
    Grayscale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_tool() {
        let config = RasterConfig::default();
        assert_eq!(config.resolution, 144);
        assert_eq!(config.format, Some(OutputFormat::Jpg));
        assert_eq!(config.merge_policy, MergePolicy::Flatten);
        assert_eq!(config.colorspace, None);
        assert_eq!(config.quality, None);
        assert_eq!(config.render_timeout, None);
    }

    #[test]
    fn merge_policy_parses_recognised_set() {
        assert_eq!("none".parse::<MergePolicy>().unwrap(), MergePolicy::None);
        assert_eq!(
            "Flatten".parse::<MergePolicy>().unwrap(),
            MergePolicy::Flatten
        );
        assert_eq!("merge".parse::<MergePolicy>().unwrap(), MergePolicy::Merge);
        assert_eq!(
            "MOSAIC".parse::<MergePolicy>().unwrap(),
            MergePolicy::Mosaic
        );
    }

    #[test]
    fn merge_policy_rejects_unknown_value() {
        let err = "trim".parse::<MergePolicy>().unwrap_err();
        assert!(matches!(
            err,
            Pdf2ImgError::InvalidPolicy { ref policy } if policy == "trim"
        ));
    }

    #[test]
    fn none_policy_skips_merging() {
        assert!(!MergePolicy::None.is_merging());
        assert!(MergePolicy::Flatten.is_merging());
        assert!(MergePolicy::Mosaic.is_merging());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = RasterConfig {
            resolution: 300,
            format: None,
            merge_policy: MergePolicy::None,
            colorspace: Some(ColorSpace::Grayscale),
            quality: Some(85),
            render_timeout: Some(Duration::from_secs(30)),
        };
        let json = serde_json::to_string(&config).expect("config must serialise");
        let back: RasterConfig = serde_json::from_str(&json).expect("config must deserialise");
        assert_eq!(back, config);
    }
}
