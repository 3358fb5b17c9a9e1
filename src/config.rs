//! Configuration types for nekos-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default remote service
pub const DEFAULT_API_BASE: &str = "https://nekos.life/api/v2/";

/// How many resolve requests a loop issues before downloading a tag
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMode {
    /// Resolve once and download the URL that passed the existence check
    #[default]
    Once,
    /// Resolve again before downloading and fetch whatever the second call returns
    ///
    /// The image checked for local presence and the image downloaded may differ,
    /// and every download costs one extra API request. If the second answer is
    /// already on disk the tag is skipped for this pass; the pass itself goes on.
    Twice,
}

/// Main configuration for the poller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every tag identifier is appended to (default: "https://nekos.life/api/v2/")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Root of the downloaded tree (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// JSON file mapping category to tag identifiers (default: "./tags.json")
    #[serde(default = "default_tags_file")]
    pub tags_file: PathBuf,

    /// Prefix removed from a tag identifier to name its folder (default: "img/")
    #[serde(default = "default_strip_prefix")]
    pub strip_prefix: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Resolve behaviour before a download
    #[serde(default)]
    pub resolve_mode: ResolveMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            download_dir: default_download_dir(),
            tags_file: default_tags_file(),
            strip_prefix: default_strip_prefix(),
            request_timeout: default_request_timeout(),
            resolve_mode: ResolveMode::default(),
        }
    }
}

impl Config {
    /// Parse `api_base`, forcing a trailing slash so tag identifiers are
    /// appended to the path instead of replacing its last segment
    pub fn api_base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::config("api_base", format!("invalid URL {:?}: {e}", self.api_base)))?;

        if url.cannot_be_a_base() {
            return Err(Error::config(
                "api_base",
                format!("{} cannot be used as a base URL", self.api_base),
            ));
        }

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_tags_file() -> PathBuf {
    PathBuf::from("tags.json")
}

fn default_strip_prefix() -> String {
    "img/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Ordered mapping of category name to tag identifiers
///
/// Order follows the source document, which is also the order tags are
/// polled in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, Vec<String>)>,
}

impl TagMap {
    /// Build a map from `(category, tags)` pairs, keeping their order
    pub fn new<C, T, I>(entries: I) -> Self
    where
        C: Into<String>,
        T: Into<String>,
        I: IntoIterator<Item = (C, Vec<T>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(category, tags)| {
                    (category.into(), tags.into_iter().map(Into::into).collect())
                })
                .collect(),
        }
    }

    /// Parse a JSON object of the form `{"category": ["tag", ...], ...}`
    pub fn from_json(content: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut entries = Vec::with_capacity(object.len());
        for (category, value) in object {
            let tags: Vec<String> = serde_json::from_value(value).map_err(|e| {
                Error::config(
                    category.clone(),
                    format!("expected a list of tag strings: {e}"),
                )
            })?;
            entries.push((category, tags));
        }

        Ok(Self { entries })
    }

    /// Read and parse a tag file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::Path {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&content)
    }

    /// Iterate over every `(category, tag)` pair in polling order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(category, tags)| {
            tags.iter().map(move |tag| (category.as_str(), tag.as_str()))
        })
    }

    /// Total number of tags across all categories
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, tags)| tags.len()).sum()
    }

    /// True when no category holds any tag
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
