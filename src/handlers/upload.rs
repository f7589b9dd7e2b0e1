// src/handlers/upload.rs - multipart form reading with the image allow-list
use std::collections::HashMap;

use actix_multipart::{Field, Multipart};
use futures::StreamExt;

use crate::error::FeedError;
use crate::services::image_storage::{ImageStorage, is_accepted_image};

pub const IMAGE_FIELD: &str = "image";

/// Text fields of the form plus the stored path of an accepted image.
#[derive(Debug, Default)]
pub struct UploadedForm {
    pub fields: HashMap<String, String>,
    pub image: Option<String>,
}

impl UploadedForm {
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Text value of the `image` field, used when an update keeps its picture.
    pub fn image_reference(&self) -> Option<String> {
        self.fields.get(IMAGE_FIELD).cloned()
    }
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>, FeedError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > max_bytes {
            return Err(FeedError::UnprocessableInput(format!(
                "Upload exceeds {} bytes",
                max_bytes
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Consumes a field that is not kept; no size limit applies.
async fn drain_field(field: &mut Field) -> Result<(), FeedError> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

/// Reads the whole form. A file in the `image` field is kept only when its
/// MIME type passes the allow-list; rejected files are dropped silently and the
/// form then looks like it carried no file. Nothing is written to storage until
/// the form has been read completely.
pub async fn read_post_form(
    mut payload: Multipart,
    images: &dyn ImageStorage,
    max_bytes: usize,
) -> Result<UploadedForm, FeedError> {
    let mut form = UploadedForm::default();
    let mut pending: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match file_name {
            Some(file_name) if name == IMAGE_FIELD => {
                if !is_accepted_image(field.content_type()) {
                    log::info!(
                        "dropping upload '{}' with type {:?}",
                        file_name,
                        field.content_type().map(|m| m.to_string())
                    );
                    drain_field(&mut field).await?;
                } else if pending.is_some() {
                    drain_field(&mut field).await?;
                } else {
                    let bytes = read_field(&mut field, max_bytes).await?;
                    if !bytes.is_empty() {
                        pending = Some((file_name, bytes));
                    }
                }
            }
            Some(file_name) => {
                log::debug!("ignoring file '{}' in field '{}'", file_name, name);
                drain_field(&mut field).await?;
            }
            None => {
                let bytes = read_field(&mut field, max_bytes).await?;
                let text = String::from_utf8(bytes).map_err(|_| {
                    FeedError::UnprocessableInput(format!("Field '{}' is not valid UTF-8", name))
                })?;
                form.fields.insert(name, text);
            }
        }
    }

    if let Some((file_name, bytes)) = pending {
        form.image = Some(images.store(&file_name, &bytes).await?);
    }
    Ok(form)
}
