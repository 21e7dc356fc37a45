//! # Image Decoder
//!
//! Turns a data-URI-encoded upload into raw bytes plus raster dimensions.
//! The accepted shape is `<mime-type>;base64,<payload>`; a leading `data:`
//! scheme prefix is tolerated since some clients send it verbatim.

use base64::Engine;
use mime::Mime;
use ri_core::error::{AppError, Result};

/// A decoded upload. Owned by one per-image pipeline task and dropped as
/// soon as the bytes have been hashed and stored.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    /// The MIME type as declared by the client. Stored alongside the blob;
    /// the raster decode above is what actually validates the content.
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// Decodes one submitted image payload.
///
/// Header problems (bad separators, unknown encoding marker, unparsable
/// media type) are `MalformedContentType`; payload problems (invalid base64,
/// bytes that are not a raster image) are `MalformedImageData`.
pub fn decode_data_uri(payload: &str) -> Result<DecodedImage> {
    let payload = payload.strip_prefix("data:").unwrap_or(payload);

    let (header, data) = payload
        .split_once(',')
        .ok_or_else(|| AppError::MalformedContentType("missing ',' separator".into()))?;
    let (media_type, marker) = header
        .split_once(';')
        .ok_or_else(|| AppError::MalformedContentType("missing ';' separator".into()))?;

    if marker != "base64" {
        return Err(AppError::MalformedContentType(format!(
            "unsupported encoding marker '{marker}'"
        )));
    }
    let mime_type: Mime = media_type.parse().map_err(|_| {
        AppError::MalformedContentType(format!("unparsable media type '{media_type}'"))
    })?;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| AppError::MalformedImageData(format!("invalid base64 payload: {e}")))?;

    let raster = image::load_from_memory(&bytes)
        .map_err(|e| AppError::MalformedImageData(e.to_string()))?;

    Ok(DecodedImage {
        width: raster.width(),
        height: raster.height(),
        mime_type: mime_type.to_string(),
        bytes,
    })
}
