//! Inbound image payloads and data URL normalization

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::error::{RelayError, Result};

/// MIME type assumed when the caller declares none
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// Image received from a caller, scoped to one request
#[derive(Debug, Clone)]
pub enum InboundImage {
    /// Raw bytes from a multipart upload
    Bytes {
        data: Bytes,
        mime_type: Option<String>,
    },
    /// Base64 payload from a JSON body, with or without a `data:` prefix
    Encoded {
        value: String,
        mime_type: Option<String>,
    },
}

impl InboundImage {
    pub fn from_bytes(data: impl Into<Bytes>, mime_type: Option<String>) -> Self {
        Self::Bytes {
            data: data.into(),
            mime_type,
        }
    }

    pub fn from_encoded(value: impl Into<String>, mime_type: Option<String>) -> Self {
        Self::Encoded {
            value: value.into(),
            mime_type,
        }
    }

    /// Payload size in bytes as received
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes { data, .. } => data.len(),
            Self::Encoded { value, .. } => value.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Bytes { data, .. } => data.is_empty(),
            Self::Encoded { value, .. } => value.trim().is_empty(),
        }
    }

    /// Normalize into a single `data:<mime>;base64,<payload>` URL
    ///
    /// Well-formed data URLs are returned unchanged.
    pub fn to_data_url(&self) -> Result<String> {
        match self {
            Self::Bytes { data, mime_type } => {
                if data.is_empty() {
                    return Err(RelayError::client_input("Uploaded image file is empty."));
                }
                let mime = image_mime(mime_type.as_deref()).unwrap_or(DEFAULT_MIME_TYPE);
                Ok(format!("data:{};base64,{}", mime, STANDARD.encode(data)))
            }
            Self::Encoded { value, mime_type } => normalize_encoded(value, mime_type.as_deref()),
        }
    }
}

fn normalize_encoded(value: &str, declared_mime: Option<&str>) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RelayError::client_input("Missing image data."));
    }

    if is_well_formed_data_url(value) {
        return Ok(value.to_string());
    }

    let (prefix_mime, payload) = match value.split_once(',') {
        Some((header, payload)) => (mime_from_header(header), payload.trim()),
        None => (None, value),
    };

    if payload.is_empty() {
        return Err(RelayError::client_input("Image data contains no base64 payload."));
    }

    let mime = prefix_mime
        .or_else(|| image_mime(declared_mime))
        .unwrap_or(DEFAULT_MIME_TYPE);

    Ok(format!("data:{};base64,{}", mime, payload))
}

/// `data:<mime>;base64,<payload>` with a non-empty payload
fn is_well_formed_data_url(value: &str) -> bool {
    match value.split_once(',') {
        Some((header, payload)) => {
            header.starts_with(DATA_URL_SCHEME)
                && header.ends_with(BASE64_MARKER)
                && !payload.is_empty()
        }
        None => false,
    }
}

/// Extract an `image/*` type from a possibly malformed data URL header
fn mime_from_header(header: &str) -> Option<&str> {
    let header = header.strip_prefix(DATA_URL_SCHEME).unwrap_or(header);
    let mime = header.split(';').next().unwrap_or_default().trim();
    image_mime(Some(mime))
}

fn image_mime(mime: Option<&str>) -> Option<&str> {
    mime.map(str::trim)
        .filter(|m| m.len() > "image/".len() && m.starts_with("image/"))
}
