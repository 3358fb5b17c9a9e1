//! Polling loops over the configured tag list.
//!
//! A [`Runner`] owns the flattened tag list and one HTTP client. Any number of
//! loops can run against it at once; each loop walks the whole list per pass,
//! in order, and starts the next pass as soon as the current one ends.
//!
//! A pass stops at its first error. The error is logged at debug level and
//! otherwise dropped: there is no backoff and no distinction between
//! transient and permanent failures. Failures never go through the event
//! channel, so a tag that fails on every pass cannot crowd out download
//! notices.
//!
//! Loops do not coordinate. Two loops may both see an image as missing and
//! both download it to the same path; the last writer wins.


use crate::config::{Config, ResolveMode, TagMap};
use crate::error::Result;
use crate::tag::Tag;
use crate::types::{Event, LoopId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Buffer size of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Drives the polling loops
pub struct Runner {
    /// Shared by every loop, never copied
    tags: Arc<[Tag]>,
    /// One client for all loops so connections are pooled
    client: reqwest::Client,
    resolve_mode: ResolveMode,
    event_tx: broadcast::Sender<Event>,
}

impl Runner {
    /// Build the tag list from `tag_map`, creating every tag's folder
    ///
    /// Tags keep the map's order: categories in document order, tags in list
    /// order within each category.
    pub async fn new(tag_map: &TagMap, config: &Config) -> Result<Self> {
        let api_base = config.api_base_url()?;

        let mut tags = Vec::with_capacity(tag_map.len());
        for (category, name) in tag_map.pairs() {
            let tag = Tag::new(
                &api_base,
                &config.download_dir,
                &config.strip_prefix,
                category,
                name,
            )
            .await?;
            tags.push(tag);
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!(
            tags = tags.len(),
            api_base = %api_base,
            download_dir = %config.download_dir.display(),
            resolve_mode = ?config.resolve_mode,
            "Runner ready"
        );

        Ok(Self {
            tags: tags.into(),
            client,
            resolve_mode: config.resolve_mode,
            event_tx,
        })
    }

    /// The tag list, in polling order
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Subscribe to download notices
    ///
    /// Events emitted while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: Event) {
        // send() only fails when there are no receivers
        self.event_tx.send(event).ok();
    }

    /// Walk the tag list once
    ///
    /// Returns the number of images downloaded, or the first error hit. Tags
    /// after a failing one are not visited in this pass.
    pub async fn run_pass(&self, loop_id: LoopId) -> Result<usize> {
        let mut downloaded = 0;

        for tag in self.tags.iter() {
            let Some(url) = tag.resolve(&self.client).await? else {
                continue;
            };

            let url = match self.resolve_mode {
                ResolveMode::Once => url,
                ResolveMode::Twice => match tag.resolve(&self.client).await? {
                    Some(url) => url,
                    None => continue,
                },
            };

            let saved = tag.download(&self.client, &url).await?;

            debug!(
                loop_id,
                tag = tag.name(),
                path = %saved.path.display(),
                bytes = saved.bytes,
                "Downloaded"
            );

            self.emit_event(Event::Downloaded {
                loop_id,
                category: tag.category().to_string(),
                tag: tag.name().to_string(),
                path: saved.path,
                bytes: saved.bytes,
            });

            downloaded += 1;
        }

        Ok(downloaded)
    }

    /// Run passes forever
    ///
    /// A failed pass is logged and the next one starts immediately.
    pub async fn run_loop(&self, loop_id: LoopId) {
        debug!(loop_id, "Polling loop started");

        loop {
            if let Err(e) = self.run_pass(loop_id).await {
                debug!(loop_id, kind = %e.kind(), error = %e, "Pass abandoned");
            }

            // Keeps a loop that fails without awaiting I/O from starving the others
            tokio::task::yield_now().await;
        }
    }

    /// Spawn `loops` polling loops and wait for all of them
    ///
    /// Loops never finish on their own, so this only returns when `loops` is
    /// zero or every loop task has panicked. Dropping the future aborts all
    /// loops.
    pub async fn run(self: Arc<Self>, loops: usize) {
        let mut set = JoinSet::new();

        for loop_id in 0..loops {
            let runner = Arc::clone(&self);
            set.spawn(async move { runner.run_loop(loop_id).await });
        }

        info!(loops, tags = self.tags.len(), "Polling loops started");

        while let Some(result) = set.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Polling loop terminated");
            }
        }

        info!("All polling loops stopped");
    }
}
