//! Output format resolution.
//!
//! The final encoding of a rendered page is decided from two inputs: the
//! format configured on the session and the extension of the requested output
//! path. The configured format always wins; the extension is only consulted
//! when no format is configured.
//!
//! ## The lenient `jpg` fallback
//!
//! An unrecognised extension (`out.xyz`, no extension at all) silently
//! resolves to `jpg` rather than failing. This is deliberate, load-bearing
//! behaviour: callers pass arbitrary destination paths and rely on a save
//! never failing solely because of the path's spelling. Do not "fix" this
//! to an error.

use crate::error::Pdf2ImgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported output image formats.
///
/// `Jpg` and `Jpeg` encode identically (both JPEG); they are distinct
/// variants because the chosen name flows into output file extensions and
/// callers expect `setOutputFormat("jpeg")` to produce `.jpeg` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG, written with the `jpg` extension. (default)
    #[default]
    Jpg,
    /// JPEG, written with the `jpeg` extension.
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// The file extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// True for the two JPEG spellings.
    pub fn is_jpeg(&self) -> bool {
        matches!(self, OutputFormat::Jpg | OutputFormat::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Pdf2ImgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(OutputFormat::Jpg),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            _ => Err(Pdf2ImgError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Resolve the format a page must be encoded in.
///
/// Precedence:
/// 1. `configured` — the session's configured format wins outright.
/// 2. The lower-cased extension of `requested`, when it names a supported
///    format.
/// 3. `jpg` — the lenient fallback (see module docs).
pub fn resolve_output_format(
    requested: Option<&Path>,
    configured: Option<OutputFormat>,
) -> OutputFormat {
    if let Some(format) = configured {
        return format;
    }

    requested
        .and_then(|p| p.extension())
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse::<OutputFormat>().ok())
        .unwrap_or(OutputFormat::Jpg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn extension_wins_when_nothing_configured() {
        assert_eq!(
            resolve_output_format(Some(Path::new("out.png")), None),
            OutputFormat::Png
        );
        assert_eq!(
            resolve_output_format(Some(Path::new("out.JPEG")), None),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn unrecognised_extension_falls_back_to_jpg() {
        assert_eq!(
            resolve_output_format(Some(Path::new("out.xyz")), None),
            OutputFormat::Jpg
        );
        assert_eq!(
            resolve_output_format(Some(Path::new("no_extension")), None),
            OutputFormat::Jpg
        );
        assert_eq!(resolve_output_format(None, None), OutputFormat::Jpg);
    }

    #[test]
    fn configured_format_always_wins_over_extension() {
        assert_eq!(
            resolve_output_format(Some(Path::new("out.png")), Some(OutputFormat::Jpeg)),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn parse_accepts_supported_set_case_insensitively() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    }

    #[test]
    fn parse_rejects_unsupported_format() {
        let err = "bmp".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(
            err,
            Pdf2ImgError::UnsupportedFormat { ref format } if format == "bmp"
        ));
    }

    #[test]
    fn jpg_and_jpeg_keep_distinct_extensions() {
        assert_eq!(OutputFormat::Jpg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpeg");
        assert!(OutputFormat::Jpg.is_jpeg());
        assert!(OutputFormat::Jpeg.is_jpeg());
        assert!(!OutputFormat::Png.is_jpeg());
    }
}
