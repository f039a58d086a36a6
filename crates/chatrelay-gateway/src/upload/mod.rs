//! Attachment upload endpoint and on-disk store.
//!
//! `POST /upload` stores the file, answers with its public URL, and hands the
//! attachment to the relay hub, which routes it like any other chat message.

pub mod handler;
pub mod storage;

pub use handler::{upload, UploadResponse, DEFAULT_ATTACHMENT_TYPE, FORM_OVERHEAD_BYTES};
pub use storage::{sanitize_file_name, stored_name, AttachmentStore, StoredAttachment, UPLOAD_ROUTE};
