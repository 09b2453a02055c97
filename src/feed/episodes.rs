use std::collections::HashSet;

use crate::{
    feed::FeedError,
    types::{Episode, EpisodeRecord},
    utils,
};

/// Spotify episodes link to a web page, there is no audio enclosure.
pub const EPISODE_MIME_TYPE: &str = "text/html";
pub const UNKNOWN_FILE_SIZE: i64 = -1;

/// Result of one adapter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEpisodes {
    /// Records whose GUID the host did not know yet, in upstream order.
    pub records: Vec<EpisodeRecord>,
    /// Every GUID seen upstream, known or not. The host prunes episodes
    /// missing from this list.
    pub seen_guids: Vec<String>,
}

/// Normalizes one API episode. The GUID is the episode id.
pub fn to_episode_record(episode: &Episode) -> Result<EpisodeRecord, FeedError> {
    let published = utils::parse_release_date(&episode.release_date)
        .and_then(utils::local_midnight_timestamp)
        .ok_or_else(|| FeedError::InvalidReleaseDate {
            episode_id: episode.id.clone(),
            release_date: episode.release_date.clone(),
        })?;

    let link = episode.external_urls.spotify.clone();

    Ok(EpisodeRecord {
        guid: episode.id.clone(),
        title: episode.name.clone(),
        description: episode.description.clone().unwrap_or_default(),
        url: link.clone(),
        link,
        published,
        total_time: episode.duration_ms.unwrap_or(0) as f64 / 1000.0,
        file_size: UNKNOWN_FILE_SIZE,
        mime_type: EPISODE_MIME_TYPE,
    })
}

/// Splits an episode list into records the host lacks and the full list of
/// seen GUIDs.
pub fn collect_new_episodes(
    episodes: &[Episode],
    existing_guids: &HashSet<String>,
) -> Result<NewEpisodes, FeedError> {
    let mut result = NewEpisodes::default();

    for episode in episodes {
        result.seen_guids.push(episode.id.clone());

        if !existing_guids.contains(&episode.id) {
            result.records.push(to_episode_record(episode)?);
        }
    }

    Ok(result)
}
