//! Storage for uploaded images.

use crate::error::HandlerError;
use crate::validation::ValidationErrors;
use actix_multipart::Multipart;
use actix_web::web;
use anyhow::Context;
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const IMAGE_FIELD: &str = "image";
pub const NO_FILE: &str = "No file was submitted.";
pub const EMPTY_FILE: &str = "The submitted file is empty.";
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCategory {
    Recipe,
    Ingredient,
}

impl ImageCategory {
    fn directory(&self) -> &'static str {
        match self {
            ImageCategory::Recipe => "recipe",
            ImageCategory::Ingredient => "ingredient",
        }
    }
}

/// Path under the media root for a new upload, e.g. `uploads/recipe/<uuid>.jpg`. The extension
/// of `filename` is kept, the rest of the name is replaced.
pub fn image_file_path(category: ImageCategory, filename: &str) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    format!(
        "uploads/{}/{}{}",
        category.directory(),
        Uuid::new_v4(),
        extension
    )
}

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> MediaStore {
        MediaStore { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` to `relative_path` under the media root, creating directories as needed.
    #[instrument(skip(self, contents))]
    pub async fn save(&self, relative_path: &str, contents: Vec<u8>) -> Result<(), anyhow::Error> {
        let path = self.root.join(relative_path);
        web::block(move || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Unable to create media directory")?;
            }
            fs::write(&path, contents)
                .with_context(|| format!("Unable to write {}", path.display()))
        })
        .await
        .context("Blocking error")??;
        info!("Saved image");
        Ok(())
    }

    /// Deletes an image that is no longer referenced. A missing file is not an error.
    #[instrument(skip(self))]
    pub async fn remove(&self, relative_path: &str) -> Result<(), anyhow::Error> {
        let path = self.root.join(relative_path);
        web::block(move || match fs::remove_file(&path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(e).with_context(|| format!("Unable to remove {}", path.display()))
            }
            _ => Ok(()),
        })
        .await
        .context("Blocking error")??;
        Ok(())
    }

    /// Removes `previous` once an entity stops pointing at it. Failures are only logged, the
    /// request that replaced or deleted the image has already succeeded.
    pub async fn discard(&self, previous: Option<String>) {
        if let Some(path) = previous {
            if let Err(e) = self.remove(&path).await {
                warn!(%path, "Unable to remove image: {:#}", e);
            }
        }
    }
}

/// Body returned by the upload endpoints.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ImageResponse {
    pub id: i32,
    pub image: Option<String>,
}

/// An uploaded file: the name the client gave it and its contents.
pub struct Upload {
    pub filename: String,
    pub contents: Vec<u8>,
}

/// Reads the `image` field of a multipart form. Other fields are skipped.
pub async fn read_image(mut payload: Multipart) -> Result<Upload, HandlerError> {
    while let Some(mut field) = payload.try_next().await? {
        let disposition = field.content_disposition();
        if disposition.get_name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(filename) = disposition.get_filename().map(str::to_owned) else {
            return Err(ValidationErrors::single(IMAGE_FIELD, NO_FILE).into());
        };

        let mut contents = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if contents.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(ValidationErrors::single(
                    IMAGE_FIELD,
                    format!("Ensure the file is no larger than {} bytes.", MAX_FILE_SIZE),
                )
                .into());
            }
            contents.extend_from_slice(&chunk);
        }
        if contents.is_empty() {
            return Err(ValidationErrors::single(IMAGE_FIELD, EMPTY_FILE).into());
        }
        return Ok(Upload { filename, contents });
    }

    Err(ValidationErrors::single(IMAGE_FIELD, NO_FILE).into())
}
