use serde_json::json;
use spofeed::management::CredentialStore;
use spofeed::types::{ShowInfo, TokenResponse};
use spofeed::utils;
use tempfile::tempdir;

fn show_info_with_bulk() -> ShowInfo {
    serde_json::from_value(json!({
        "id": "show1",
        "name": "A Show",
        "description": "About things",
        "publisher": "Someone",
        "images": [
            { "url": "https://i/large", "height": 640, "width": 640 },
            { "url": "https://i/medium", "height": 300, "width": 300 }
        ],
        "available_markets": ["DE", "US"],
        "episodes": { "items": [{ "id": "e1" }], "total": 1 }
    }))
    .unwrap()
}

#[test]
fn test_load_missing_file_gives_empty_document() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::open(dir.path().join("does_not_exist"));

    assert!(store.document().podcasts.is_empty());
    assert_eq!(store.get_user(), &Default::default());
}

#[test]
fn test_load_corrupt_file_gives_empty_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_cache");
    std::fs::write(&path, "{ not json").unwrap();

    let store = CredentialStore::open(&path);

    assert!(store.document().podcasts.is_empty());
    assert!(store.get_user().access_token.is_none());
}

#[test]
fn test_load_fills_missing_sections() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_cache");
    std::fs::write(&path, r#"{"user": {"access_token": "abc"}}"#).unwrap();

    let store = CredentialStore::open(&path);

    assert!(store.document().podcasts.is_empty());
    assert_eq!(store.get_user().access_token.as_deref(), Some("abc"));
    assert_eq!(store.get_user().expires_at, None);
}

#[test]
fn test_set_podcast_info_strips_bulky_keys() {
    let dir = tempdir().unwrap();
    let mut store = CredentialStore::open(dir.path().join("spotify_cache"));
    let info = show_info_with_bulk();

    store.set_podcast_info("show1", &info);
    let cached = store.get_podcast("show1").unwrap();

    assert!(!cached.extra.contains_key("available_markets"));
    assert!(!cached.extra.contains_key("episodes"));
    assert_eq!(cached.name, info.name);
    assert_eq!(cached.description, info.description);
    assert_eq!(cached.images, info.images);
    assert_eq!(cached.extra.get("publisher"), info.extra.get("publisher"));
    assert_eq!(cached.extra.get("id"), info.extra.get("id"));

    // the caller's copy is untouched
    assert!(info.extra.contains_key("available_markets"));
}

#[test]
fn test_set_podcast_info_persists_without_bulky_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_cache");
    let mut store = CredentialStore::open(&path);

    store.set_podcast_info("show1", &show_info_with_bulk());

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let persisted = &raw["podcasts"]["show1"];
    assert_eq!(persisted["name"], "A Show");
    assert!(persisted.get("available_markets").is_none());
    assert!(persisted.get("episodes").is_none());

    let reloaded = CredentialStore::open(&path);
    assert_eq!(reloaded.get_podcast("show1"), store.get_podcast("show1"));
}

#[test]
fn test_set_user_info_merges_and_derives_expiry() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_cache");
    let mut store = CredentialStore::open(&path);

    let before = utils::now_seconds();
    store.set_user_info(&TokenResponse {
        access_token: Some("access-1".to_string()),
        refresh_token: Some("refresh-1".to_string()),
        scope: Some("".to_string()),
        expires_in: Some(3600),
        token_type: Some("Bearer".to_string()),
    });
    let after = utils::now_seconds();

    let user = store.get_user();
    let expires_at = user.expires_at.unwrap();
    assert!(expires_at >= before + 3600 && expires_at <= after + 3600);

    // a refresh response without a refresh token keeps the stored one
    store.set_user_info(&TokenResponse {
        access_token: Some("access-2".to_string()),
        expires_in: Some(3600),
        ..Default::default()
    });

    let reloaded = CredentialStore::open(&path);
    assert_eq!(reloaded.get_user().access_token.as_deref(), Some("access-2"));
    assert_eq!(reloaded.get_user().refresh_token.as_deref(), Some("refresh-1"));
}

#[test]
fn test_delete_podcast_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spotify_cache");
    let mut store = CredentialStore::open(&path);

    store.set_podcast_info("show1", &show_info_with_bulk());
    store.delete_podcast_info("show1");
    assert!(store.get_podcast("show1").is_none());

    // absent ids are fine
    store.delete_podcast_info("show1");
    store.delete_podcast_info("never-cached");

    assert!(CredentialStore::open(&path).get_podcast("show1").is_none());
}

#[test]
fn test_save_failure_is_swallowed() {
    let dir = tempdir().unwrap();
    // the cache path is a directory, so every write fails
    let mut store = CredentialStore::open(dir.path());

    store.set_podcast_info("show1", &show_info_with_bulk());

    assert_eq!(store.get_podcast("show1").unwrap().name, "A Show");
}
