//! End-to-end tests: tag file on disk, fake API, images mirrored to disk.

mod common;

use common::{config_for, next_event, serve_tag};
use nekos_dl::{Event, Runner, TagMap};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

const TAGS_JSON: &str = r#"{
    "img": ["img/cat", "img/neko"],
    "avatars": ["avatar"]
}"#;

async fn setup() -> (TempDir, MockServer, nekos_dl::Config) {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    let config = config_for(&server, temp_dir.path());

    tokio::fs::write(&config.tags_file, TAGS_JSON).await.unwrap();

    serve_tag(&server, "img/cat", "/c/1234.png", b"cat image").await;
    serve_tag(&server, "img/neko", "/n/neko_001.jpg", b"neko image").await;
    serve_tag(&server, "avatar", "/a/face.gif", b"avatar image").await;

    (temp_dir, server, config)
}

#[tokio::test]
async fn loops_mirror_every_tag_into_category_tree() {
    let (temp_dir, _server, config) = setup().await;

    let tags = TagMap::load(&config.tags_file).await.unwrap();
    let runner = Arc::new(Runner::new(&tags, &config).await.unwrap());
    let mut events = runner.subscribe();

    let handle = tokio::spawn(Arc::clone(&runner).run(2));

    let mut seen = BTreeSet::new();
    while seen.len() < 3 {
        if let Event::Downloaded { tag, .. } = next_event(&mut events).await {
            seen.insert(tag);
        }
    }

    // The other loop may be rewriting the same files; let it finish
    while tokio::time::timeout(Duration::from_millis(500), events.recv())
        .await
        .is_ok()
    {}
    handle.abort();

    let downloads = temp_dir.path().join("downloads");
    assert_eq!(
        std::fs::read(downloads.join("img/cat/1234.png")).unwrap(),
        b"cat image"
    );
    assert_eq!(
        std::fs::read(downloads.join("img/neko/neko_001.jpg")).unwrap(),
        b"neko image"
    );
    assert_eq!(
        std::fs::read(downloads.join("avatars/avatar/face.gif")).unwrap(),
        b"avatar image"
    );
}

#[tokio::test]
async fn restart_reuses_existing_tree() {
    let (_temp_dir, server, config) = setup().await;
    let tags = TagMap::load(&config.tags_file).await.unwrap();

    let first = Runner::new(&tags, &config).await.unwrap();
    assert_eq!(first.run_pass(0).await.unwrap(), 3);
    drop(first);

    let second = Runner::new(&tags, &config).await.unwrap();
    assert_eq!(second.run_pass(0).await.unwrap(), 0);

    let image_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| !r.url.path().starts_with("/api/"))
        .count();
    assert_eq!(image_requests, 3);
}
