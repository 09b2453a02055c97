use crate::{
    management::CredentialStore,
    spotify::{SpotifyClient, http::ApiError},
    types::ShowInfo,
    utils,
};

/// Read-through view over the store's show map.
///
/// A miss fetches from the API and writes the result back. Failures are not
/// cached, and entries never expire; they are replaced by a later fetch or
/// removed by [`evict`](Self::evict).
pub struct ShowCache<'a> {
    store: &'a mut CredentialStore,
    client: &'a mut SpotifyClient,
}

impl<'a> ShowCache<'a> {
    pub fn new(store: &'a mut CredentialStore, client: &'a mut SpotifyClient) -> Self {
        Self { store, client }
    }

    pub fn info(&mut self, show_id: &str) -> Result<ShowInfo, ApiError> {
        if let Some(info) = self.store.get_podcast(show_id) {
            return Ok(info.clone());
        }

        let info = self.client.get_show_info(self.store, show_id)?;
        self.store.set_podcast_info(show_id, &info);

        // Hand back what was persisted, not the raw response.
        Ok(self
            .store
            .get_podcast(show_id)
            .cloned()
            .unwrap_or(info))
    }

    pub fn title(&mut self, show_id: &str) -> Result<String, ApiError> {
        Ok(self.info(show_id)?.name)
    }

    pub fn description(&mut self, show_id: &str) -> Result<String, ApiError> {
        Ok(self.info(show_id)?.description)
    }

    pub fn cover_url(&mut self, show_id: &str) -> Result<Option<String>, ApiError> {
        Ok(self.info(show_id)?.cover_image_url().map(str::to_string))
    }

    pub fn link(&self, show_id: &str) -> String {
        utils::show_url(show_id)
    }

    /// Stored validators, without going to the network.
    pub fn etag(&self, show_id: &str) -> Option<String> {
        self.store
            .get_podcast(show_id)
            .and_then(|info| info.headers.etag.clone())
    }

    pub fn last_modified(&self, show_id: &str) -> Option<String> {
        self.store
            .get_podcast(show_id)
            .and_then(|info| info.headers.last_modified.clone())
    }

    pub fn evict(&mut self, show_id: &str) {
        self.store.delete_podcast_info(show_id);
    }
}
