use crate::pipeline::UploadedImage;
use axum::{
    body::Bytes,
    extract::{
        Multipart,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use thiserror::Error;
use tracing::{debug, warn};

/// The only multipart field that may carry the photo.
pub const PHOTO_FIELD: &str = "photo";

/// Room for multipart boundaries and part headers on top of the file itself.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Why an upload was turned away before any engine ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("no 'photo' file in request")]
    NoFile,

    #[error("file exceeds {limit} bytes")]
    FileTooLarge { limit: usize },

    #[error("unexpected file field '{0}'")]
    UnexpectedField(String),

    #[error("more than one 'photo' file")]
    TooManyFiles,

    #[error("malformed multipart body: {0}")]
    Malformed(String),
}

impl UploadRejection {
    /// Stable machine-readable code reported as `{ "error": code }`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFile => "no_file",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::UnexpectedField(_) => "unexpected_field",
            Self::TooManyFiles => "too_many_files",
            Self::Malformed(_) => "invalid_multipart",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Pulls the single `photo` file out of a multipart request, enforcing `limit` bytes.
///
/// Text parts are skipped. A request that isn't multipart at all has no file.
pub async fn read_photo(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<UploadedImage, UploadRejection> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!("Request is not multipart: {}", rejection);
            return Err(UploadRejection::NoFile);
        }
    };

    let mut photo: Option<UploadedImage> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| classify(e, limit))?
    {
        if field.file_name().is_none() {
            debug!("Skipping text field {:?}", field.name());
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        if name != PHOTO_FIELD {
            warn!("Rejecting upload with unexpected file field '{}'", name);
            return Err(UploadRejection::UnexpectedField(name));
        }
        if photo.is_some() {
            warn!("Rejecting upload with more than one '{}' file", PHOTO_FIELD);
            return Err(UploadRejection::TooManyFiles);
        }

        let content_type = field.content_type().map(str::to_owned);
        let data = read_limited(field, limit).await?;
        debug!("Accepted '{}' file of {} bytes", PHOTO_FIELD, data.len());
        photo = Some(UploadedImage::new(data, content_type));
    }

    photo.ok_or(UploadRejection::NoFile)
}

/// Buffers one field in memory, stopping as soon as it grows past `limit`.
async fn read_limited(mut field: Field<'_>, limit: usize) -> Result<Bytes, UploadRejection> {
    let mut buffer = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| classify(e, limit))? {
        if buffer.len() + chunk.len() > limit {
            warn!("Rejecting upload larger than {} bytes", limit);
            return Err(UploadRejection::FileTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buffer))
}

fn classify(error: MultipartError, limit: usize) -> UploadRejection {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadRejection::FileTooLarge { limit }
    } else {
        UploadRejection::Malformed(error.body_text())
    }
}
