//! Command-line surface of the `nekos-dl` binary.

use clap::{ArgAction, Parser};
use nekos_dl::config::DEFAULT_API_BASE;
use nekos_dl::{Config, ResolveMode};
use std::path::PathBuf;
use std::time::Duration;

/// Poll an image API for a set of tags and mirror new images to disk.
#[derive(Debug, Parser)]
#[command(name = "nekos-dl", version)]
#[command(about = "Poll an image API for a set of tags and mirror new images to disk", long_about = None)]
pub struct Cli {
    /// Number of concurrent polling loops.
    pub loops: usize,

    /// JSON file mapping category names to lists of tag identifiers.
    #[arg(long, default_value = "tags.json", value_name = "PATH")]
    pub tags: PathBuf,

    /// Root directory for downloaded images.
    #[arg(long, default_value = "downloads", value_name = "DIR")]
    pub output: PathBuf,

    /// Base URL that tag identifiers are appended to.
    #[arg(long, default_value = DEFAULT_API_BASE, value_name = "URL")]
    pub api_base: String,

    /// Prefix removed from tag identifiers when naming their folders.
    #[arg(long, default_value = "img/", value_name = "PREFIX")]
    pub strip_prefix: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Resolve a tag a second time before downloading it and fetch the second answer.
    #[arg(long)]
    pub resolve_twice: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Runner configuration described by the flags
    pub fn config(&self) -> Config {
        Config {
            api_base: self.api_base.clone(),
            download_dir: self.output.clone(),
            tags_file: self.tags.clone(),
            strip_prefix: self.strip_prefix.clone(),
            request_timeout: Duration::from_secs(self.timeout),
            resolve_mode: if self.resolve_twice {
                ResolveMode::Twice
            } else {
                ResolveMode::Once
            },
        }
    }
}
