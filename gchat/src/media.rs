//! Attachment resolution: uploads media lacking a remote identifier.

use futures_util::future::try_join_all;
use gprovider::{FileUpload, GigaChatTransport, Media, Message};

use crate::ChatError;

/// Uploads every media item without a remote id (one upload call per item,
/// concurrently) and assigns the returned ids in place. Media already
/// carrying an id is passed through with no upload.
///
/// All uploads complete before this returns, so request construction never
/// sees unresolved media. The returned list is the full ordered set of
/// attachment ids the request will reference, pre-existing ids included.
pub(crate) async fn resolve_attachments(
    transport: &dyn GigaChatTransport,
    messages: &mut [Message],
) -> Result<Vec<String>, ChatError> {
    let mut targets: Vec<(usize, usize)> = Vec::new();
    let mut uploads: Vec<FileUpload> = Vec::new();

    for (message_index, message) in messages.iter().enumerate() {
        if let Message::User { media, .. } = message {
            for (media_index, item) in media.iter().enumerate() {
                if !item.is_uploaded() {
                    targets.push((message_index, media_index));
                    uploads.push(file_upload_for(item));
                }
            }
        }
    }

    if !uploads.is_empty() {
        let uploaded = try_join_all(
            uploads
                .into_iter()
                .map(|upload| transport.upload_file(upload)),
        )
        .await
        .map_err(ChatError::from)?;

        for ((message_index, media_index), uploaded_file) in targets.into_iter().zip(uploaded) {
            if let Message::User { media, .. } = &mut messages[message_index] {
                media[media_index].id = Some(uploaded_file.id);
            }
        }
    }

    let mut ids = Vec::new();
    for message in messages.iter() {
        for item in message.media() {
            if let Some(id) = &item.id {
                ids.push(id.clone());
            }
        }
    }

    Ok(ids)
}

fn file_upload_for(media: &Media) -> FileUpload {
    let file_name = media
        .file_name
        .clone()
        .unwrap_or_else(|| default_file_name(&media.mime_type));
    FileUpload::new(media.data.clone(), media.mime_type.clone(), file_name)
}

fn default_file_name(mime_type: &str) -> String {
    match mime_type.rsplit_once('/') {
        Some((_, extension)) if !extension.is_empty() => format!("upload.{extension}"),
        _ => "upload".to_string(),
    }
}
