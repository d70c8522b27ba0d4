use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde_json::Value;

use crate::error::CaptionError;

/// Prefix every accepted payload must start with.
pub const DATA_IMAGE_PREFIX: &str = "data:image";

/// An image inlined as a data URL, e.g. `data:image/png;base64,iVBOR...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload(String);

impl ImagePayload {
    /// Accepts a data URL as sent by the browser.
    pub fn parse(url: impl Into<String>) -> Result<Self, CaptionError> {
        let url = url.into();
        if url.is_empty() {
            return Err(CaptionError::MissingImage);
        }
        if !url.starts_with(DATA_IMAGE_PREFIX) {
            return Err(CaptionError::InvalidImageFormat);
        }
        Ok(Self(url))
    }

    /// Validates the `image` field of a caption request body.
    ///
    /// `null` and `""` count as missing; any other non-string is a format error.
    pub fn from_request_value(value: Option<&Value>) -> Result<Self, CaptionError> {
        match value {
            None | Some(Value::Null) => Err(CaptionError::MissingImage),
            Some(Value::String(url)) => Self::parse(url.as_str()),
            Some(_) => Err(CaptionError::InvalidImageFormat),
        }
    }

    /// Inline-encodes raw file contents, sniffing the media type from magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CaptionError> {
        let format = image::guess_format(bytes).map_err(|_| CaptionError::UnsupportedImage)?;
        let mime = mime_type(format).ok_or(CaptionError::UnsupportedImage)?;
        let encoded = general_purpose::STANDARD.encode(bytes);
        Ok(Self(format!("data:{mime};base64,{encoded}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Declared media type, e.g. `image/png`.
    pub fn media_type(&self) -> &str {
        let rest = &self.0["data:".len()..];
        let end = rest.find([';', ',']).unwrap_or(rest.len());
        &rest[..end]
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ImagePayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn mime_type(format: ImageFormat) -> Option<&'static str> {
    let mime = match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => return None,
    };
    Some(mime)
}
