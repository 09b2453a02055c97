//! # Feed Module
//!
//! Presents a Spotify show to the host as a custom podcast feed. The host
//! asks the feed for channel metadata (served from the show cache) and for
//! new episodes (fetched fresh every cycle and deduplicated by GUID).

pub mod episodes;
pub mod host;

use std::collections::HashSet;

use crate::{
    feed::{
        episodes::NewEpisodes,
        host::{Channel, EpisodeHandle},
    },
    management::SharedService,
    spotify::http::ApiError,
    utils,
};

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Episode {episode_id} has an unreadable release date {release_date:?}")]
    InvalidReleaseDate {
        episode_id: String,
        release_date: String,
    },
}

/// Outcome reported to a registry host for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    UpdatedFeed,
}

pub struct FetchResult {
    pub status: FeedStatus,
    pub feed: SpotifyFeed,
}

/// One show seen as a feed.
pub struct SpotifyFeed {
    service: SharedService,
    show_id: String,
    max_episodes: u32,
}

impl SpotifyFeed {
    pub fn new(service: SharedService, show_id: impl Into<String>, max_episodes: u32) -> Self {
        Self {
            service,
            show_id: show_id.into(),
            max_episodes,
        }
    }

    /// A feed for `url` when it is a show URL.
    pub fn handle_url(service: &SharedService, url: &str, max_episodes: u32) -> Option<Self> {
        let show_id = utils::extract_show_id(url)?;
        Some(Self::new(service.clone(), show_id, max_episodes))
    }

    pub fn show_id(&self) -> &str {
        &self.show_id
    }

    pub fn get_title(&self) -> Result<String, ApiError> {
        self.service.borrow_mut().shows().title(&self.show_id)
    }

    pub fn get_description(&self) -> Result<String, ApiError> {
        self.service.borrow_mut().shows().description(&self.show_id)
    }

    pub fn get_image(&self) -> Result<Option<String>, ApiError> {
        self.service.borrow_mut().shows().cover_url(&self.show_id)
    }

    pub fn get_cover_url(&self) -> Result<Option<String>, ApiError> {
        self.get_image()
    }

    pub fn get_link(&self) -> String {
        utils::show_url(&self.show_id)
    }

    pub fn get_http_etag(&self) -> Option<String> {
        self.service.borrow_mut().shows().etag(&self.show_id)
    }

    pub fn get_http_last_modified(&self) -> Option<String> {
        self.service.borrow_mut().shows().last_modified(&self.show_id)
    }

    /// Shows are fetched as a single page.
    pub fn get_next_page(&self) -> Option<SpotifyFeed> {
        None
    }

    pub fn get_payment_url(&self) -> Option<String> {
        None
    }

    /// Fetches the current episode page and returns the records the host
    /// lacks together with every GUID seen upstream.
    pub fn get_new_episodes(&self, existing_guids: &HashSet<String>) -> Result<NewEpisodes, FeedError> {
        let episodes = {
            let mut service = self.service.borrow_mut();
            let service = &mut *service;
            service
                .client
                .get_show_episodes(&mut service.store, &self.show_id, self.max_episodes)?
        };

        episodes::collect_new_episodes(&episodes, existing_guids)
    }

    /// Like [`get_new_episodes`](Self::get_new_episodes), but hands every new
    /// record to the channel's episode factory and saves it.
    pub fn import_new_episodes(
        &self,
        channel: &mut dyn Channel,
        existing_guids: &HashSet<String>,
    ) -> Result<(Vec<Box<dyn EpisodeHandle>>, Vec<String>), FeedError> {
        let NewEpisodes {
            records,
            seen_guids,
        } = self.get_new_episodes(existing_guids)?;

        let saved = records
            .iter()
            .map(|record| {
                let mut episode = channel.episode_factory(record);
                episode.save();
                episode
            })
            .collect();

        Ok((saved, seen_guids))
    }
}

/// The callback registered with the host.
pub struct SpotifyFeedHandler {
    service: SharedService,
}

impl SpotifyFeedHandler {
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }

    /// Entry point of hosts with a custom URL handler.
    pub fn handle_url(&self, url: &str, max_episodes: u32) -> Option<SpotifyFeed> {
        SpotifyFeed::handle_url(&self.service, url, max_episodes)
    }

    /// Entry point of hosts with a feed registry. `None` means the channel
    /// is not a Spotify show and another handler should take it.
    pub fn fetch_episodes(&self, channel_url: &str, max_episodes: u32) -> Option<FetchResult> {
        self.handle_url(channel_url, max_episodes)
            .map(|feed| FetchResult {
                status: FeedStatus::UpdatedFeed,
                feed,
            })
    }
}
