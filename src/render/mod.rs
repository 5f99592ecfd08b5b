//! QR encoding capability.
//!
//! # Data Flow
//! ```text
//! text + RenderOptions
//!     → QrEncoder (symbol encoding, module matrix)
//!     → one of: PNG bytes | SVG markup | PNG data URI
//! ```
//!
//! # Design Decisions
//! - Symbol encoding is delegated to the `qrcode` crate, never reimplemented
//! - The encoder is a trait so the handler can be driven by a fake in tests
//! - Rendering is pure: identical inputs yield byte-identical output

pub mod color;
pub mod encoder;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use color::HexColor;
pub use encoder::QrCodeEncoder;

/// Prefix of every data URI produced by [`QrEncoder::data_url`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// QR error correction tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    /// Parse the wire name. Matching is exact: "m" is not a level.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// Options shared by all three render operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Target image width in pixels.
    pub size: u32,
    /// Quiet zone width in modules.
    pub margin: u32,
    pub error_correction: ErrorCorrection,
    /// Dark module color, as supplied by the caller.
    pub dark: String,
    /// Light module color, as supplied by the caller.
    pub light: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: 300,
            margin: 1,
            error_correction: ErrorCorrection::M,
            dark: "#000000".to_string(),
            light: "#FFFFFF".to_string(),
        }
    }
}

/// Errors raised while producing a QR image.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Color should be defined as hex string, got '{0}'")]
    InvalidColor(String),

    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// The blocking encode task panicked or was cancelled.
    #[error("Encoder task failed: {0}")]
    Worker(String),
}

/// The three render entry points of the QR capability.
pub trait QrEncoder: Send + Sync {
    /// Raw PNG bytes.
    fn png(&self, text: &str, options: &RenderOptions) -> Result<Vec<u8>, EncodingError>;

    /// Standalone SVG document.
    fn svg(&self, text: &str, options: &RenderOptions) -> Result<String, EncodingError>;

    /// PNG embedded in a `data:` URI.
    fn data_url(&self, text: &str, options: &RenderOptions) -> Result<String, EncodingError> {
        let png = self.png(text, options)?;
        Ok(format!("{PNG_DATA_URI_PREFIX}{}", STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPng;

    impl QrEncoder for FixedPng {
        fn png(&self, _text: &str, _options: &RenderOptions) -> Result<Vec<u8>, EncodingError> {
            Ok(vec![1, 2, 3])
        }

        fn svg(&self, _text: &str, _options: &RenderOptions) -> Result<String, EncodingError> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_default_data_url_wraps_png() {
        let uri = FixedPng.data_url("x", &RenderOptions::default()).unwrap();
        assert_eq!(uri, "data:image/png;base64,AQID");
    }

    #[test]
    fn test_level_names_are_exact() {
        assert_eq!(ErrorCorrection::from_name("H"), Some(ErrorCorrection::H));
        assert_eq!(ErrorCorrection::from_name("h"), None);
        assert_eq!(ErrorCorrection::from_name("X"), None);
        assert_eq!(ErrorCorrection::from_name(""), None);
    }
}
