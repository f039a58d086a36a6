use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::ConnectionId;

use crate::app_state::AppState;
use crate::error::HttpError;
use crate::realtime::{AttachmentPost, HubEvent};

/// Type tag used when the form does not name one.
pub const DEFAULT_ATTACHMENT_TYPE: &str = "file";

/// Room for the text fields and multipart framing on top of the file cap.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    pub file_url: String,
}

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    sender_id: Option<String>,
    recipient_id: Option<String>,
    username: Option<String>,
    msg_type: Option<String>,
}

/// `POST /upload`
pub async fn upload(
    State(app): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<UploadResponse>, HttpError> {
    // A request that is not multipart at all simply carries no file.
    let multipart = multipart.map_err(|_| RelayError::NoFile)?;
    let res = handle_upload(&app, multipart).await?;
    Ok(Json(res))
}

async fn handle_upload(app: &AppState, mut multipart: Multipart) -> Result<UploadResponse> {
    let max_file_bytes = app.cfg().uploads.max_file_bytes;
    let form = read_form(&mut multipart, max_file_bytes).await?;

    let (original_name, data) = form.file.ok_or(RelayError::NoFile)?;
    let stored = app.store().store(&original_name, &data).await?;

    let post = AttachmentPost {
        sender_id: ConnectionId::from_optional(form.sender_id.as_deref()),
        recipient_id: ConnectionId::from_optional(form.recipient_id.as_deref()),
        username: form.username,
        msg_type: form
            .msg_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ATTACHMENT_TYPE.to_string()),
        file_url: stored.url.clone(),
    };
    app.hub().send(HubEvent::Attachment(post)).await?;

    Ok(UploadResponse {
        ok: true,
        file_url: stored.url,
    })
}

async fn read_form(multipart: &mut Multipart, max_file_bytes: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                // A plain text field called `file` is not an attachment.
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > max_file_bytes {
                    return Err(RelayError::PayloadTooLarge);
                }
                form.file = Some((file_name, data));
            }
            "senderId" => form.sender_id = Some(field.text().await.map_err(multipart_error)?),
            "recipientId" => form.recipient_id = Some(field.text().await.map_err(multipart_error)?),
            "username" => form.username = Some(field.text().await.map_err(multipart_error)?),
            "type" => form.msg_type = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> RelayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge
    } else {
        RelayError::Internal(format!("multipart: {}", e.body_text()))
    }
}
