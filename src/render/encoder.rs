//! `qrcode`-backed encoder with `image` PNG output.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba};
use qrcode::render::{svg, Renderer};
use qrcode::{Color, QrCode};

use crate::render::{EncodingError, HexColor, QrEncoder, RenderOptions};

/// Default encoder: a stateless binding to the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder;

impl QrCodeEncoder {
    pub fn new() -> Self {
        Self
    }
}

/// Pixels per module when the requested size cannot fit the symbol.
const FALLBACK_SCALE: u32 = 4;

/// Module matrix for `text`, flattened row-major, plus its side length.
fn modules(text: &str, options: &RenderOptions) -> Result<(Vec<Color>, usize), EncodingError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), options.error_correction.into())?;
    Ok((code.to_colors(), code.width()))
}

/// Output side length in pixels: exactly `size`, unless the symbol plus
/// quiet zone has more modules than that, in which case each module gets
/// [`FALLBACK_SCALE`] pixels.
fn output_width(width: usize, options: &RenderOptions) -> u32 {
    let across = width as u32 + 2 * options.margin;
    if options.size >= across {
        options.size
    } else {
        across * FALLBACK_SCALE
    }
}

impl QrEncoder for QrCodeEncoder {
    fn png(&self, text: &str, options: &RenderOptions) -> Result<Vec<u8>, EncodingError> {
        let dark: HexColor = options.dark.parse()?;
        let light: HexColor = options.light.parse()?;
        let (colors, width) = modules(text, options)?;

        let target = output_width(width, options);

        // One pixel per module, then nearest-neighbour scaling to the exact width.
        let image = Renderer::<Rgba<u8>>::new(&colors, width, options.margin)
            .dark_color(dark.to_rgba())
            .light_color(light.to_rgba())
            .module_dimensions(1, 1)
            .build();
        let image = imageops::resize(&image, target, target, FilterType::Nearest);

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn svg(&self, text: &str, options: &RenderOptions) -> Result<String, EncodingError> {
        let dark = options.dark.parse::<HexColor>()?.to_css();
        let light = options.light.parse::<HexColor>()?.to_css();
        let (colors, width) = modules(text, options)?;

        let target = output_width(width, options);
        let across = width as u32 + 2 * options.margin;

        // Drawn in module units; the root size scales the view box.
        let markup = Renderer::<svg::Color<'_>>::new(&colors, width, options.margin)
            .dark_color(svg::Color(&dark))
            .light_color(svg::Color(&light))
            .module_dimensions(1, 1)
            .build();
        Ok(markup.replacen(
            &format!(r#" width="{across}" height="{across}" viewBox"#),
            &format!(r#" width="{target}" height="{target}" viewBox"#),
            1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn options() -> RenderOptions {
        RenderOptions::default()
    }

    #[test]
    fn test_png_has_signature_and_requested_size() {
        let bytes = QrCodeEncoder.png("hello", &options()).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 300);
        assert_eq!(decoded.height(), 300);
    }

    #[test]
    fn test_png_width_is_exact_for_uneven_sizes() {
        for size in [200, 299, 301, 512] {
            let mut opts = options();
            opts.size = size;
            let bytes = QrCodeEncoder.png("hello", &opts).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (size, size));
        }
    }

    #[test]
    fn test_png_uses_requested_colors() {
        let mut opts = options();
        opts.dark = "#ff0000".into();
        opts.light = "#00ff00".into();
        opts.margin = 2;

        let bytes = QrCodeEncoder.png("hello", &opts).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        // Corner is quiet zone, the finder pattern starts right after it.
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        let unit = decoded.width() / (21 + 4);
        assert_eq!(decoded.get_pixel(2 * unit, 2 * unit), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_zero_margin_starts_with_finder() {
        let mut opts = options();
        opts.margin = 0;
        let bytes = QrCodeEncoder.png("hello", &opts).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_size_below_symbol_uses_fallback_scale() {
        for size in [1, 10, 22] {
            let mut opts = options();
            opts.size = size;
            let bytes = QrCodeEncoder.png("hello", &opts).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap();
            assert_eq!(decoded.width(), (21 + 2) * 4);
        }

        let mut opts = options();
        opts.size = 23;
        let decoded = image::load_from_memory(&QrCodeEncoder.png("hello", &opts).unwrap()).unwrap();
        assert_eq!(decoded.width(), 23);
    }

    #[test]
    fn test_svg_root_has_requested_size() {
        let mut opts = options();
        opts.size = 250;
        let markup = QrCodeEncoder.svg("hello", &opts).unwrap();
        assert!(markup.contains(r#"width="250" height="250" viewBox="0 0 23 23""#));

        opts.size = 10;
        let markup = QrCodeEncoder.svg("hello", &opts).unwrap();
        assert!(markup.contains(r#"width="92" height="92""#));
    }

    #[test]
    fn test_svg_markup() {
        let mut opts = options();
        opts.dark = "#123456".into();
        let markup = QrCodeEncoder.svg("hello", &opts).unwrap();
        let root = markup.find("<svg").unwrap();
        assert!(markup[..root].trim_start().is_empty() || markup.starts_with("<?xml"));
        assert!(markup.contains("#123456"));
        assert!(markup.contains("#ffffff"));
        assert!(markup.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_deterministic() {
        let a = QrCodeEncoder.data_url("https://example.com", &options()).unwrap();
        let b = QrCodeEncoder.data_url("https://example.com", &options()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_error_correction_changes_output() {
        let mut high = options();
        high.error_correction = crate::render::ErrorCorrection::H;
        let m = QrCodeEncoder.png("https://example.com", &options()).unwrap();
        let h = QrCodeEncoder.png("https://example.com", &high).unwrap();
        assert_ne!(m, h);
    }

    #[test]
    fn test_bad_color_fails() {
        let mut opts = options();
        opts.light = "white".into();
        assert!(matches!(
            QrCodeEncoder.png("hello", &opts),
            Err(EncodingError::InvalidColor(_))
        ));
        assert!(matches!(
            QrCodeEncoder.svg("hello", &opts),
            Err(EncodingError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_data_too_long() {
        let mut opts = options();
        opts.error_correction = crate::render::ErrorCorrection::H;
        let text = "x".repeat(4000);
        assert!(matches!(
            QrCodeEncoder.png(&text, &opts),
            Err(EncodingError::Qr(_))
        ));
    }
}
