use crate::{
    management::CredentialStore,
    spotify::{
        SpotifyClient,
        http::{ApiError, HttpRequest},
    },
    types::{Episode, EpisodePage, HttpCacheHeaders, ShowInfo},
};

/// Upstream hard maximum for one episode page.
pub const EPISODE_LIMIT_MAX: u32 = 50;

/// Clamps a requested episode count to `1..=50`; `0` means the maximum.
pub fn episode_limit(max_episodes: u32) -> u32 {
    if max_episodes == 0 {
        return EPISODE_LIMIT_MAX;
    }
    max_episodes.clamp(1, EPISODE_LIMIT_MAX)
}

impl SpotifyClient {
    /// Retrieves show metadata.
    ///
    /// The response validators (`etag`, `last-modified`) are kept in the
    /// `_headers` part of the result. They are stored only; requests are
    /// never made conditional.
    pub fn get_show_info(
        &mut self,
        store: &mut CredentialStore,
        show_id: &str,
    ) -> Result<ShowInfo, ApiError> {
        let response = self.api_get(store, &format!("shows/{show_id}"), &[])?;

        let mut info: ShowInfo = response.json()?;
        info.headers = HttpCacheHeaders {
            etag: response.header("etag").map(str::to_string),
            last_modified: response.header("last-modified").map(str::to_string),
        };

        Ok(info)
    }

    /// Retrieves the first page of a show's episodes, newest first.
    ///
    /// Only one page is ever requested, so at most fifty episodes come back.
    pub fn get_show_episodes(
        &mut self,
        store: &mut CredentialStore,
        show_id: &str,
        max_episodes: u32,
    ) -> Result<Vec<Episode>, ApiError> {
        let limit = episode_limit(max_episodes).to_string();
        let response = self.api_get(
            store,
            &format!("shows/{show_id}/episodes"),
            &[("limit", limit.as_str())],
        )?;

        let page: EpisodePage = response.json()?;
        if page.next.is_some() {
            log::debug!(
                "Show {} has more than {} episodes, only the first page is used.",
                show_id,
                page.items.len()
            );
        }

        Ok(page.items)
    }

    pub(crate) fn show_request(&self, path: &str, query: &[(&str, &str)]) -> HttpRequest {
        let mut params: Vec<(&str, &str)> = query.to_vec();
        if let Some(market) = self.market.as_deref() {
            params.push(("market", market));
        }

        let base = format!("{}/{}", self.api_url.trim_end_matches('/'), path);
        let url = if params.is_empty() {
            base
        } else {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&params)
                .finish();
            format!("{base}?{query}")
        };

        HttpRequest::get(url)
    }
}
