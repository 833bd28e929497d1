use axum::extract::{FromRef, FromRequest, Multipart, Request, multipart::Field};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::PortfolioError;
use crate::middleware::json_form::{content_type_of, json_or_default};
use crate::service::uploads::{StoredImage, UploadStore};

/// Name of the only file part accepted by upload routes.
pub const IMAGE_FIELD: &str = "image";

/// Form body of a skill or project submission.
///
/// `multipart/form-data` bodies have their text parts collected into `T` and
/// the `image` part streamed to the upload directory. JSON bodies fill `T`
/// directly and never carry a file. Any other body is left unparsed and `T`
/// falls back to its default.
#[derive(Debug)]
pub struct UploadForm<T> {
    pub fields: T,
    pub image: Option<StoredImage>,
}

impl<T> UploadForm<T> {
    pub fn image_path(&self) -> Option<&str> {
        self.image.as_ref().map(|img| img.relative_path.as_str())
    }
}

impl<S, T> FromRequest<S> for UploadForm<T>
where
    S: Send + Sync,
    UploadStore: FromRef<S>,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = PortfolioError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = content_type_of(&req);

        if content_type.starts_with("multipart/form-data") {
            let uploads = UploadStore::from_ref(state);
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| PortfolioError::InvalidBody(rejection.body_text()))?;
            return read_multipart(multipart, &uploads).await;
        }

        let fields = json_or_default(req, state, &content_type).await?;
        Ok(Self {
            fields,
            image: None,
        })
    }
}

async fn read_multipart<T>(
    mut multipart: Multipart,
    uploads: &UploadStore,
) -> Result<UploadForm<T>, PortfolioError>
where
    T: DeserializeOwned + Send,
{
    let mut text = Map::new();
    let mut image = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_owned) {
            // an empty file input still submits a part, with no file name
            Some(original) if original.is_empty() => continue,
            Some(original) => {
                if name != IMAGE_FIELD || image.is_some() {
                    return Err(PortfolioError::UnexpectedFile(name));
                }
                image = Some(save_field(&mut field, &original, uploads).await?);
            }
            None => {
                let value = field.text().await?;
                text.insert(name, Value::String(value));
            }
        }
    }

    let fields = serde_json::from_value(Value::Object(text))
        .map_err(|e| PortfolioError::InvalidBody(e.to_string()))?;
    Ok(UploadForm { fields, image })
}

async fn save_field(
    field: &mut Field<'_>,
    original_name: &str,
    uploads: &UploadStore,
) -> Result<StoredImage, PortfolioError> {
    let (mut file, image) = uploads.create(original_name).await?;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    debug!(
        original = %original_name,
        path = %image.absolute_path.display(),
        "upload written"
    );
    Ok(image)
}
