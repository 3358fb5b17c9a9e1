//! A single pollable (category, tag) pair
//!
//! A [`Tag`] knows three things: which API endpoint names its current image,
//! which local folder that image belongs in, and how to move the bytes from
//! one to the other. It holds no state beyond those paths, so one list of
//! tags can be shared by every polling loop.

use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};
use url::Url;

/// Size of each write when streaming an image to disk
pub const CHUNK_SIZE: usize = 1024;

/// An image written to disk by [`Tag::download`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedImage {
    /// Destination file
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
}

/// One configured tag
#[derive(Clone, Debug)]
pub struct Tag {
    category: String,
    name: String,
    endpoint: Url,
    local_dir: PathBuf,
}

impl Tag {
    /// Create a tag and make sure its local folder exists
    ///
    /// The folder is `download_dir/category/name`, with `strip_prefix` removed
    /// once from the front of `name`. Creating an already existing folder is
    /// not an error.
    pub async fn new(
        api_base: &Url,
        download_dir: &Path,
        strip_prefix: &str,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let category = category.into();
        let name = name.into();

        let endpoint = api_base.join(&name).map_err(|e| Error::Config {
            message: format!("tag {name:?} in category {category:?} does not form a valid URL: {e}"),
            key: None,
        })?;

        let folder = name.strip_prefix(strip_prefix).unwrap_or(&name);
        let local_dir = download_dir.join(&category).join(folder);

        tokio::fs::create_dir_all(&local_dir)
            .await
            .map_err(|source| Error::Path {
                path: local_dir.clone(),
                source,
            })?;

        Ok(Self {
            category,
            name,
            endpoint,
            local_dir,
        })
    }

    /// Category this tag is stored under
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Tag identifier as configured
    pub fn name(&self) -> &str {
        &self.name
    }

    /// API endpoint that resolves this tag to an image URL
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Folder images of this tag are written to
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    /// Local file an image URL maps to: `local_dir` plus everything after the last `/`
    pub fn file_for(&self, url: &str) -> Result<PathBuf> {
        let file_name = url.rsplit('/').next().unwrap_or(url);
        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return Err(Error::InvalidImageUrl(url.to_string()));
        }
        Ok(self.local_dir.join(file_name))
    }

    /// Ask the API for this tag's current image
    ///
    /// Returns `None` when that image is already on disk, otherwise the URL to
    /// download. Nothing is written.
    pub async fn resolve(&self, client: &reqwest::Client) -> Result<Option<String>> {
        let response = client.get(self.endpoint.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: self.endpoint.to_string(),
                status,
            });
        }

        let body = response.bytes().await?;
        let answer: Value = serde_json::from_slice(&body)?;
        let url = answer
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MissingUrl {
                endpoint: self.endpoint.to_string(),
            })?;

        let path = self.file_for(url)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| Error::Path {
                path: path.clone(),
                source,
            })?;

        if exists {
            trace!(tag = %self.name, path = %path.display(), "Image already present");
            return Ok(None);
        }

        Ok(Some(url.to_string()))
    }

    /// Fetch `url` and stream it into this tag's folder
    ///
    /// An existing file at the destination is overwritten. A transfer that
    /// fails midway leaves the truncated file behind.
    pub async fn download(&self, client: &reqwest::Client, url: &str) -> Result<SavedImage> {
        let path = self.file_for(url)?;

        let mut response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let io_err = |source: std::io::Error| Error::Path {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        let mut bytes = 0u64;

        while let Some(chunk) = response.chunk().await? {
            for piece in chunk.chunks(CHUNK_SIZE) {
                file.write_all(piece).await.map_err(io_err)?;
                bytes += piece.len() as u64;
            }
        }

        file.flush().await.map_err(io_err)?;

        debug!(tag = %self.name, path = %path.display(), bytes, "Image written");

        Ok(SavedImage { path, bytes })
    }
}
