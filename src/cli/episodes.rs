use std::{collections::HashSet, time::Duration};

use chrono::{Local, TimeZone};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{Table, Tabled};

use crate::{
    cli::host::{LocalChannel, LocalHost},
    error,
    extension::Extension,
    success,
    types::EpisodeRecord,
};

#[derive(Tabled)]
pub struct EpisodeTableRow {
    pub date: String,
    pub title: String,
    pub duration: String,
    pub guid: String,
}

impl From<&EpisodeRecord> for EpisodeTableRow {
    fn from(record: &EpisodeRecord) -> Self {
        let date = Local
            .timestamp_opt(record.published, 0)
            .single()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let seconds = record.total_time.round() as u64;

        Self {
            date,
            title: record.title.clone(),
            duration: format!("{}:{:02}", seconds / 60, seconds % 60),
            guid: record.guid.clone(),
        }
    }
}

/// Fetches a show the way the host's feed refresh does and lists the
/// episodes that were imported.
pub fn episodes(extension: &Extension, host: &LocalHost, url: &str, max_episodes: u32) {
    let Some(result) = host.fetch(url, max_episodes) else {
        error!("{} is not a Spotify show URL.", url);
    };

    let mut channel = LocalChannel::new(url);
    extension.on_podcast_save(&mut channel);

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching episodes...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let imported = result
        .feed
        .import_new_episodes(&mut channel, &HashSet::new());
    pb.finish_and_clear();

    let seen = match imported {
        Ok((_, seen)) => seen,
        Err(e) => error!("Cannot fetch episodes. Err: {}", e),
    };

    let library = channel.library();
    let rows: Vec<EpisodeTableRow> = library.borrow().iter().map(EpisodeTableRow::from).collect();

    println!("{}", Table::new(rows));
    success!(
        "{} episodes imported, {} seen upstream.",
        library.borrow().len(),
        seen.len()
    );
}
