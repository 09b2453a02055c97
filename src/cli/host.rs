use std::{cell::RefCell, rc::Rc};

use crate::{
    feed::{
        FetchResult, SpotifyFeedHandler,
        host::{Channel, EpisodeHandle, Host},
    },
    types::EpisodeRecord,
};

/// Episodes saved during one harness run.
pub type Library = Rc<RefCell<Vec<EpisodeRecord>>>;

/// In-memory stand-in for the podcast manager.
#[derive(Default)]
pub struct LocalHost {
    handler: Option<Rc<SpotifyFeedHandler>>,
}

impl LocalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the registered handler for the feed behind `url`.
    pub fn fetch(&self, url: &str, max_episodes: u32) -> Option<FetchResult> {
        self.handler
            .as_ref()
            .and_then(|handler| handler.fetch_episodes(url, max_episodes))
    }
}

impl Host for LocalHost {
    fn supports_feed_registry(&self) -> bool {
        true
    }

    fn register_feed_handler(&mut self, handler: Rc<SpotifyFeedHandler>) {
        self.handler = Some(handler);
    }

    fn unregister_feed_handler(&mut self, handler: &Rc<SpotifyFeedHandler>) {
        if self
            .handler
            .as_ref()
            .is_some_and(|registered| Rc::ptr_eq(registered, handler))
        {
            self.handler = None;
        }
    }

    fn register_custom_handler(&mut self, handler: Rc<SpotifyFeedHandler>) {
        self.handler = Some(handler);
    }
}

pub struct LocalChannel {
    url: String,
    pub sync_to_mp3_player: bool,
    library: Library,
}

impl LocalChannel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sync_to_mp3_player: true,
            library: Library::default(),
        }
    }

    pub fn library(&self) -> Library {
        self.library.clone()
    }
}

impl Channel for LocalChannel {
    fn url(&self) -> &str {
        &self.url
    }

    fn set_sync_to_mp3_player(&mut self, enabled: bool) {
        self.sync_to_mp3_player = enabled;
    }

    fn episode_factory(&mut self, record: &EpisodeRecord) -> Box<dyn EpisodeHandle> {
        Box::new(LocalEpisode {
            record: record.clone(),
            library: self.library.clone(),
        })
    }
}

struct LocalEpisode {
    record: EpisodeRecord,
    library: Library,
}

impl EpisodeHandle for LocalEpisode {
    fn guid(&self) -> &str {
        &self.record.guid
    }

    fn link(&self) -> &str {
        &self.record.link
    }

    fn save(&mut self) {
        self.library.borrow_mut().push(self.record.clone());
    }
}
