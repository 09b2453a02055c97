mod common;

use std::{collections::HashSet, rc::Rc};

use chrono::{Local, TimeZone};
use common::{FakeTransport, header, json_response, test_config, with_header};
use serde_json::{Value, json};
use spofeed::{
    cli::host::{LocalChannel, LocalHost},
    config::SpotifyConfig,
    extension::{Extension, MenuAction},
    feed::{FeedError, FeedStatus, SpotifyFeed, SpotifyFeedHandler, host::Host},
    management::CredentialStore,
    spotify::http::ApiError,
    types::TokenResponse,
};
use tempfile::{TempDir, tempdir};

const SHOW_URL: &str = "https://open.spotify.com/show/show1";

fn authorized_extension(config: SpotifyConfig, transport: &FakeTransport) -> Extension {
    let mut store = CredentialStore::open(&config.cache_file);
    store.set_user_info(&TokenResponse {
        access_token: Some("token".to_string()),
        refresh_token: Some("refresh".to_string()),
        expires_in: Some(3600),
        ..Default::default()
    });

    Extension::new(config, transport.boxed())
}

fn setup() -> (TempDir, FakeTransport, Extension, LocalHost) {
    let dir = tempdir().unwrap();
    let transport = FakeTransport::new();
    let mut extension = authorized_extension(test_config(dir.path()), &transport);
    let mut host = LocalHost::new();
    extension.on_load(&mut host);
    (dir, transport, extension, host)
}

fn episode(id: &str, release_date: &str, duration_ms: u64) -> Value {
    json!({
        "id": id,
        "name": format!("Episode {id}"),
        "description": "D",
        "release_date": release_date,
        "release_date_precision": "day",
        "duration_ms": duration_ms,
        "external_urls": { "spotify": format!("https://open.spotify.com/episode/{id}") },
        "audio_preview_url": null
    })
}

fn episode_page(items: Vec<Value>) -> Value {
    json!({ "items": items, "next": null, "total": 1 })
}

fn show_body() -> Value {
    json!({
        "id": "show1",
        "name": "A Show",
        "description": "About things",
        "images": [
            { "url": "https://i/large", "height": 640, "width": 640 },
            { "url": "https://i/medium", "height": 300, "width": 300 },
            { "url": "https://i/small", "height": 64, "width": 64 }
        ],
        "available_markets": ["DE", "US"],
        "episodes": { "items": [] }
    })
}

fn fetch(host: &LocalHost, max_episodes: u32) -> SpotifyFeed {
    host.fetch(SHOW_URL, max_episodes).unwrap().feed
}

#[test]
fn test_new_episode_record() {
    let (_dir, transport, _extension, host) = setup();
    transport.push_json(
        200,
        episode_page(vec![json!({
            "id": "e1",
            "name": "Ep",
            "description": "D",
            "release_date": "2023-05-10",
            "release_date_precision": "day",
            "duration_ms": 65000,
            "external_urls": { "spotify": "https://u" }
        })]),
    );

    let result = fetch(&host, 0).get_new_episodes(&HashSet::new()).unwrap();

    assert_eq!(result.seen_guids, vec!["e1".to_string()]);
    assert_eq!(result.records.len(), 1);

    let record = &result.records[0];
    let midnight = Local
        .with_ymd_and_hms(2023, 5, 10, 0, 0, 0)
        .earliest()
        .unwrap()
        .timestamp();
    assert_eq!(record.guid, "e1");
    assert_eq!(record.title, "Ep");
    assert_eq!(record.description, "D");
    assert_eq!(record.url, "https://u");
    assert_eq!(record.link, "https://u");
    assert_eq!(record.published, midnight);
    assert_eq!(record.total_time, 65.0);
    assert_eq!(record.file_size, -1);
    assert_eq!(record.mime_type, "text/html");

    let request = &transport.requests()[0];
    assert_eq!(header(request, "Authorization"), Some("Bearer token"));
}

#[test]
fn test_known_episodes_are_seen_but_not_returned() {
    let (_dir, transport, _extension, host) = setup();
    let page = episode_page(vec![
        episode("e3", "2023-05-12", 1000),
        episode("e2", "2023-05-11", 1000),
        episode("e1", "2023-05-10", 1000),
    ]);
    transport.push_json(200, page.clone());
    transport.push_json(200, page);

    let feed = fetch(&host, 0);
    let known: HashSet<String> = ["e2".to_string()].into();
    let first = feed.get_new_episodes(&known).unwrap();

    assert_eq!(first.seen_guids, vec!["e3", "e2", "e1"]);
    let guids: Vec<&str> = first.records.iter().map(|r| r.guid.as_str()).collect();
    assert_eq!(guids, vec!["e3", "e1"]);

    // after importing, the next cycle has nothing new
    let everything: HashSet<String> = first.seen_guids.iter().cloned().collect();
    let second = feed.get_new_episodes(&everything).unwrap();
    assert!(second.records.is_empty());
    assert_eq!(second.seen_guids, first.seen_guids);
}

#[test]
fn test_import_saves_through_channel() {
    let (_dir, transport, extension, host) = setup();
    transport.push_json(
        200,
        episode_page(vec![episode("e2", "2024", 2000), episode("e1", "2023-11", 1500)]),
    );

    let mut channel = LocalChannel::new(SHOW_URL);
    extension.on_podcast_save(&mut channel);
    assert!(!channel.sync_to_mp3_player);

    let (saved, seen) = fetch(&host, 5)
        .import_new_episodes(&mut channel, &HashSet::new())
        .unwrap();

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].guid(), "e2");
    assert_eq!(saved[1].link(), "https://open.spotify.com/episode/e1");
    assert_eq!(seen, vec!["e2", "e1"]);

    let library = channel.library();
    let library = library.borrow();
    assert_eq!(library.len(), 2);

    // partial release dates resolve to the first day of the period
    let jan_first = Local
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .earliest()
        .unwrap()
        .timestamp();
    assert_eq!(library[0].published, jan_first);
    assert_eq!(library[1].total_time, 1.5);
}

#[test]
fn test_unreadable_release_date_fails_the_cycle() {
    let (_dir, transport, _extension, host) = setup();
    transport.push_json(200, episode_page(vec![episode("bad", "someday", 1000)]));

    let result = fetch(&host, 0).get_new_episodes(&HashSet::new());

    assert!(matches!(
        result,
        Err(FeedError::InvalidReleaseDate { episode_id, .. }) if episode_id == "bad"
    ));
}

#[test]
fn test_episode_limit_is_clamped() {
    let (_dir, transport, _extension, host) = setup();
    for _ in 0..3 {
        transport.push_json(200, episode_page(vec![]));
    }

    fetch(&host, 0).get_new_episodes(&HashSet::new()).unwrap();
    fetch(&host, 120).get_new_episodes(&HashSet::new()).unwrap();
    fetch(&host, 7).get_new_episodes(&HashSet::new()).unwrap();

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://api.spotify.com/v1/shows/show1/episodes?limit=50",
            "https://api.spotify.com/v1/shows/show1/episodes?limit=50",
            "https://api.spotify.com/v1/shows/show1/episodes?limit=7",
        ]
    );
}

#[test]
fn test_market_is_sent_when_configured() {
    let dir = tempdir().unwrap();
    let transport = FakeTransport::new();
    let mut config = test_config(dir.path());
    config.market = Some("DE".to_string());
    let mut extension = authorized_extension(config, &transport);
    let mut host = LocalHost::new();
    extension.on_load(&mut host);

    transport.push_json(200, episode_page(vec![]));
    fetch(&host, 10).get_new_episodes(&HashSet::new()).unwrap();

    assert!(transport.requests()[0].url.ends_with("?limit=10&market=DE"));
}

#[test]
fn test_episode_fetch_without_token_makes_no_api_call() {
    let dir = tempdir().unwrap();
    let transport = FakeTransport::new();
    let mut extension = Extension::new(test_config(dir.path()), transport.boxed());
    let mut host = LocalHost::new();
    extension.on_load(&mut host);

    let result = fetch(&host, 0).get_new_episodes(&HashSet::new());

    assert!(matches!(
        result,
        Err(FeedError::Api(ApiError::Unauthenticated(_)))
    ));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_show_info_is_read_through() {
    let (dir, transport, _extension, host) = setup();
    transport.push(with_header(
        with_header(json_response(200, show_body()), "ETag", "\"v1\""),
        "Last-Modified",
        "Wed, 10 May 2023 00:00:00 GMT",
    ));

    let feed = fetch(&host, 0);
    assert_eq!(feed.get_http_etag(), None);

    assert_eq!(feed.get_title().unwrap(), "A Show");
    assert_eq!(feed.get_title().unwrap(), "A Show");
    assert_eq!(feed.get_description().unwrap(), "About things");
    assert_eq!(feed.get_image().unwrap().as_deref(), Some("https://i/medium"));
    assert_eq!(feed.get_cover_url().unwrap().as_deref(), Some("https://i/medium"));
    assert_eq!(transport.request_count(), 1);
    assert_eq!(
        transport.requests()[0].url,
        "https://api.spotify.com/v1/shows/show1"
    );

    assert_eq!(feed.get_link(), SHOW_URL);
    assert_eq!(feed.get_http_etag().as_deref(), Some("\"v1\""));
    assert_eq!(
        feed.get_http_last_modified().as_deref(),
        Some("Wed, 10 May 2023 00:00:00 GMT")
    );
    assert!(feed.get_next_page().is_none());
    assert!(feed.get_payment_url().is_none());

    let raw: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("spotify_cache")).unwrap(),
    )
    .unwrap();
    let persisted = &raw["podcasts"]["show1"];
    assert_eq!(persisted["name"], "A Show");
    assert!(persisted.get("available_markets").is_none());
    assert!(persisted.get("episodes").is_none());
    assert_eq!(persisted["_headers"]["etag"], "\"v1\"");
}

#[test]
fn test_show_info_failure_is_not_cached() {
    let (_dir, transport, _extension, host) = setup();
    transport.push_json(500, json!({ "error": { "status": 500 } }));
    transport.push_json(200, show_body());

    let feed = fetch(&host, 0);

    assert!(matches!(
        feed.get_title(),
        Err(ApiError::Status { status: 500, .. })
    ));
    assert_eq!(feed.get_title().unwrap(), "A Show");
    assert_eq!(transport.request_count(), 2);
}

#[test]
fn test_cover_falls_back_to_only_image() {
    let (_dir, transport, _extension, host) = setup();
    transport.push_json(
        200,
        json!({ "name": "A Show", "images": [{ "url": "https://i/only" }] }),
    );

    let feed = fetch(&host, 0);

    assert_eq!(feed.get_image().unwrap().as_deref(), Some("https://i/only"));
}

#[test]
fn test_handle_url_ignores_other_feeds() {
    let (_dir, transport, extension, host) = setup();

    assert!(host.fetch("https://example.com/feed.xml", 0).is_none());
    assert!(host.fetch("https://open.spotify.com/show/", 0).is_none());
    assert!(extension.handler().handle_url("https://open.spotify.com/episode/e1", 0).is_none());

    let result = host.fetch(SHOW_URL, 0).unwrap();
    assert_eq!(result.status, FeedStatus::UpdatedFeed);
    assert_eq!(result.feed.show_id(), "show1");
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_podcast_delete_evicts_cached_show() {
    let (dir, transport, extension, host) = setup();
    transport.push_json(200, show_body());
    transport.push_json(200, show_body());

    fetch(&host, 0).get_title().unwrap();
    extension.on_podcast_delete(None);
    extension.on_podcast_delete(Some(&LocalChannel::new("https://example.com/feed.xml")));
    fetch(&host, 0).get_title().unwrap();
    assert_eq!(transport.request_count(), 1);

    extension.on_podcast_delete(Some(&LocalChannel::new(SHOW_URL)));
    assert!(
        CredentialStore::open(dir.path().join("spotify_cache"))
            .get_podcast("show1")
            .is_none()
    );

    fetch(&host, 0).get_title().unwrap();
    assert_eq!(transport.request_count(), 2);
}

#[derive(Default)]
struct RecordingHost {
    registry: bool,
    registered: Vec<Rc<SpotifyFeedHandler>>,
    custom: Vec<Rc<SpotifyFeedHandler>>,
}

impl Host for RecordingHost {
    fn supports_feed_registry(&self) -> bool {
        self.registry
    }

    fn register_feed_handler(&mut self, handler: Rc<SpotifyFeedHandler>) {
        self.registered.push(handler);
    }

    fn unregister_feed_handler(&mut self, handler: &Rc<SpotifyFeedHandler>) {
        self.registered.retain(|h| !Rc::ptr_eq(h, handler));
    }

    fn register_custom_handler(&mut self, handler: Rc<SpotifyFeedHandler>) {
        self.custom.push(handler);
    }
}

#[test]
fn test_registry_host_registers_and_unregisters() {
    let dir = tempdir().unwrap();
    let mut extension = Extension::new(test_config(dir.path()), FakeTransport::new().boxed());
    let mut host = RecordingHost {
        registry: true,
        ..Default::default()
    };

    extension.on_load(&mut host);
    assert_eq!(host.registered.len(), 1);
    assert!(Rc::ptr_eq(&host.registered[0], extension.handler()));
    assert!(host.custom.is_empty());

    extension.on_unload(&mut host);
    assert!(host.registered.is_empty());
}

#[test]
fn test_legacy_host_gets_custom_handler() {
    let dir = tempdir().unwrap();
    let mut extension = Extension::new(test_config(dir.path()), FakeTransport::new().boxed());
    let mut host = RecordingHost::default();

    extension.on_load(&mut host);
    assert!(host.registered.is_empty());
    assert_eq!(host.custom.len(), 1);

    // the custom handler stays installed
    extension.on_unload(&mut host);
    assert_eq!(host.custom.len(), 1);
}

#[test]
fn test_menus() {
    let dir = tempdir().unwrap();
    let extension = Extension::new(test_config(dir.path()), FakeTransport::new().boxed());

    let menu = extension.on_create_menu();
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].label, "Spotify: Settings");
    assert_eq!(menu[0].action, MenuAction::OpenSettings);

    let context = extension.on_episodes_context_menu(&["https://a", "https://b"]);
    assert_eq!(context[0].label, "Open in web browser");
    assert_eq!(
        context[0].action,
        MenuAction::OpenInBrowser(vec!["https://a".to_string(), "https://b".to_string()])
    );
}

#[test]
fn test_settings_and_redirect_flow() {
    let dir = tempdir().unwrap();
    let transport = FakeTransport::new();
    let mut extension = Extension::new(test_config(dir.path()), transport.boxed());
    let mut host = LocalHost::new();
    extension.on_load(&mut host);

    let url = extension.run_menu_action(&MenuAction::OpenSettings).unwrap();
    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    let state = extension.authorizer().pending().unwrap().state.clone();

    // ordinary navigation is not the callback
    assert!(!extension.on_redirect("https://accounts.spotify.com/login"));

    // a forged callback is consumed but never reaches the token endpoint
    assert!(extension.on_redirect("gpodder://spotify-extension/callback/?state=forged&code=c"));
    assert_eq!(transport.request_count(), 0);
    assert!(extension.authorizer().pending().is_some());

    transport.push_json(
        200,
        json!({ "access_token": "a", "refresh_token": "r", "expires_in": 3600 }),
    );
    let callback = format!("gpodder://spotify-extension/callback/?code=c&state={state}");
    assert!(extension.on_redirect(&callback));
    assert_eq!(transport.request_count(), 1);
    assert!(extension.authorizer().pending().is_none());

    let service = extension.service().borrow();
    assert_eq!(service.store.get_user().access_token.as_deref(), Some("a"));
}
