//! Common test utilities for nekos-dl integration tests

use nekos_dl::{Config, Event};
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Upper bound on how long a test waits for a single event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Config pointing at `server` and writing below `root/downloads`
pub fn config_for(server: &MockServer, root: &Path) -> Config {
    Config {
        api_base: format!("{}/api/v2/", server.uri()),
        download_dir: root.join("downloads"),
        tags_file: root.join("tags.json"),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Serve `tag` as resolving to `image`, and `image` as `body`
pub async fn serve_tag(server: &MockServer, tag: &str, image: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/{tag}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "url": format!("{}{image}", server.uri()) })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(image))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Receive the next event or panic after [`EVENT_TIMEOUT`]
pub async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}
