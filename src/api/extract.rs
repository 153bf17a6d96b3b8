//! Image extraction from multipart uploads and JSON bodies

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};

use super::models::{IdentifyJsonRequest, IDENTIFY_FIELD};
use crate::error::{RelayError, Result};
use crate::lookup::InboundImage;

/// Image payload of an `/identify` request, dispatched on Content-Type
///
/// Never rejects. A body that cannot be read is carried as `Err` and a request
/// without an image as `Ok(None)`; the relay reports either after checking its
/// own configuration.
#[derive(Debug)]
pub struct ImagePayload(pub Result<Option<InboundImage>>);

#[async_trait]
impl<S> FromRequest<S> for ImagePayload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(Self(read_payload(req, state).await))
    }
}

async fn read_payload<S>(req: Request, state: &S) -> Result<Option<InboundImage>>
where
    S: Send + Sync,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| RelayError::client_input(e.body_text()))?;
        return read_image_field(multipart, IDENTIFY_FIELD).await;
    }

    if content_type.starts_with("application/json") {
        let Json(body) = Json::<IdentifyJsonRequest>::from_request(req, state)
            .await
            .map_err(|e| RelayError::client_input(e.body_text()))?;
        return Ok(body
            .image
            .map(|value| InboundImage::from_encoded(value, body.mime_type)));
    }

    Ok(None)
}

/// Read the first multipart field named `field_name` as an image
pub async fn read_image_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<Option<InboundImage>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::client_input(e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }

        let mime_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| RelayError::client_input(e.body_text()))?;

        return Ok(Some(InboundImage::from_bytes(data, mime_type)));
    }

    Ok(None)
}
