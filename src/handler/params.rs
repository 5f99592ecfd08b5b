//! Parameter resolution: loosely typed caller input to a typed [`QrRequest`].

use serde_json::Value;

use crate::config::{QrDefaults, RenderLimits};
use crate::handler::{OutputFormat, ValidationError};
use crate::http::request::Params;
use crate::render::{ErrorCorrection, RenderOptions};

/// A validated request, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrRequest {
    pub text: String,
    pub format: OutputFormat,
    pub options: RenderOptions,
}

/// Validate and normalize caller parameters.
///
/// Only a missing payload and an unknown format are errors. Every other
/// option falls back to its default when absent or unusable.
pub fn resolve(
    params: &Params,
    defaults: &QrDefaults,
    limits: &RenderLimits,
) -> Result<QrRequest, ValidationError> {
    let text = present_text(params.get("text"))
        .or_else(|| present_text(params.get("url")))
        .ok_or(ValidationError::MissingText)?;

    let format = match params.get("format").and_then(as_text) {
        None => defaults.format,
        Some(name) if name.is_empty() => defaults.format,
        Some(name) => {
            OutputFormat::from_name(&name).ok_or(ValidationError::InvalidFormat(name))?
        }
    };

    let size = params
        .get("size")
        .and_then(as_u32)
        .filter(|&size| size > 0)
        .unwrap_or(defaults.size)
        .min(limits.max_size);

    let margin = params
        .get("margin")
        .and_then(as_u32)
        .unwrap_or(defaults.margin)
        .min(limits.max_margin);

    let error_correction = params
        .get("errorCorrectionLevel")
        .and_then(Value::as_str)
        .and_then(ErrorCorrection::from_name)
        .unwrap_or(defaults.error_correction_level);

    let dark = color_param(params, "color").unwrap_or_else(|| defaults.color.clone());
    let light = color_param(params, "background").unwrap_or_else(|| defaults.background.clone());

    Ok(QrRequest {
        text,
        format,
        options: RenderOptions {
            size,
            margin,
            error_correction,
            dark,
            light,
        },
    })
}

/// Scalar rendered as text; objects, arrays and null are not text.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Payload text; `""`, `0` and `false` count as absent.
fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => as_text(other).filter(|text| !text.is_empty()),
    }
}

/// Non-negative integer from a JSON number or the leading digits of a
/// string (`"4px"` is 4, `"12.5"` is 12).
fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX)),
        Value::String(s) => {
            let s = s.trim_start();
            let s = s.strip_prefix('+').unwrap_or(s);
            let digits = &s[..s.bytes().take_while(u8::is_ascii_digit).count()];
            if digits.is_empty() {
                return None;
            }
            Some(digits.parse::<u32>().unwrap_or(u32::MAX))
        }
        _ => None,
    }
}

fn color_param(params: &Params, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    fn resolve_default(value: Value) -> Result<QrRequest, ValidationError> {
        resolve(&params(value), &QrDefaults::default(), &RenderLimits::default())
    }

    #[test]
    fn test_defaults() {
        let req = resolve_default(json!({"text": "hello"})).unwrap();
        assert_eq!(req.text, "hello");
        assert_eq!(req.format, OutputFormat::Base64);
        assert_eq!(req.options, RenderOptions::default());
    }

    #[test]
    fn test_url_fallback() {
        let req = resolve_default(json!({"text": "", "url": "https://example.com"})).unwrap();
        assert_eq!(req.text, "https://example.com");

        let req = resolve_default(json!({"url": "https://example.com"})).unwrap();
        assert_eq!(req.text, "https://example.com");
    }

    #[test]
    fn test_missing_text() {
        assert_eq!(resolve_default(json!({})), Err(ValidationError::MissingText));
        assert_eq!(
            resolve_default(json!({"text": "", "url": ""})),
            Err(ValidationError::MissingText)
        );
        assert_eq!(
            resolve_default(json!({"text": null, "format": "gif"})),
            Err(ValidationError::MissingText)
        );
    }

    #[test]
    fn test_numeric_text_is_stringified() {
        let req = resolve_default(json!({"text": 12345})).unwrap();
        assert_eq!(req.text, "12345");
        let req = resolve_default(json!({"text": true})).unwrap();
        assert_eq!(req.text, "true");
    }

    #[test]
    fn test_falsy_text_counts_as_missing() {
        for falsy in [json!(false), json!(0), json!(0.0)] {
            assert_eq!(
                resolve_default(json!({"text": falsy.clone()})),
                Err(ValidationError::MissingText)
            );
            let req = resolve_default(json!({"text": falsy, "url": "https://example.com"})).unwrap();
            assert_eq!(req.text, "https://example.com");
        }
        assert_eq!(
            resolve_default(json!({"url": false})),
            Err(ValidationError::MissingText)
        );
    }

    #[test]
    fn test_leading_digits_are_used() {
        let req = resolve_default(json!({"text": "a", "size": " 256px", "margin": "4px"})).unwrap();
        assert_eq!(req.options.size, 256);
        assert_eq!(req.options.margin, 4);

        let req = resolve_default(json!({"text": "a", "size": "+128", "margin": "2.9"})).unwrap();
        assert_eq!(req.options.size, 128);
        assert_eq!(req.options.margin, 2);

        let req = resolve_default(json!({"text": "a", "margin": "-3"})).unwrap();
        assert_eq!(req.options.margin, 1);
    }

    #[test]
    fn test_formats() {
        let req = resolve_default(json!({"text": "a", "format": "svg"})).unwrap();
        assert_eq!(req.format, OutputFormat::Svg);
        let req = resolve_default(json!({"text": "a", "format": "png"})).unwrap();
        assert_eq!(req.format, OutputFormat::Png);
        assert_eq!(
            resolve_default(json!({"text": "a", "format": "PNG"})),
            Err(ValidationError::InvalidFormat("PNG".into()))
        );
    }

    #[test]
    fn test_size_and_margin_parsing() {
        let req = resolve_default(json!({"text": "a", "size": "512", "margin": "4"})).unwrap();
        assert_eq!(req.options.size, 512);
        assert_eq!(req.options.margin, 4);

        let req = resolve_default(json!({"text": "a", "size": 128, "margin": 0})).unwrap();
        assert_eq!(req.options.size, 128);
        assert_eq!(req.options.margin, 0);
    }

    #[test]
    fn test_unusable_size_and_margin_fall_back() {
        for (size, margin) in [
            (json!("abc"), json!("x")),
            (json!(0), json!(-2)),
            (json!(-5), json!("")),
            (json!(null), json!([1])),
        ] {
            let req = resolve_default(json!({"text": "a", "size": size, "margin": margin})).unwrap();
            assert_eq!(req.options.size, 300);
            assert_eq!(req.options.margin, 1);
        }
    }

    #[test]
    fn test_limits_clamp() {
        let req = resolve_default(
            json!({"text": "a", "size": "99999999999", "margin": 1000}),
        )
        .unwrap();
        assert_eq!(req.options.size, 4096);
        assert_eq!(req.options.margin, 64);
    }

    #[test]
    fn test_unknown_level_defaults_to_m() {
        for level in [json!("X"), json!("h"), json!(3), json!("")] {
            let req =
                resolve_default(json!({"text": "a", "errorCorrectionLevel": level})).unwrap();
            assert_eq!(req.options.error_correction, ErrorCorrection::M);
        }
        let req = resolve_default(json!({"text": "a", "errorCorrectionLevel": "Q"})).unwrap();
        assert_eq!(req.options.error_correction, ErrorCorrection::Q);
    }

    #[test]
    fn test_colors_pass_through_unchecked() {
        let req =
            resolve_default(json!({"text": "a", "color": "red", "background": "#eee"})).unwrap();
        assert_eq!(req.options.dark, "red");
        assert_eq!(req.options.light, "#eee");
    }

    #[test]
    fn test_configured_defaults() {
        let defaults = QrDefaults {
            size: 100,
            format: OutputFormat::Svg,
            ..QrDefaults::default()
        };
        let req = resolve(
            &params(json!({"text": "a"})),
            &defaults,
            &RenderLimits::default(),
        )
        .unwrap();
        assert_eq!(req.options.size, 100);
        assert_eq!(req.format, OutputFormat::Svg);
    }
}
