use colored::Colorize;

use crate::{
    cli::host::{LocalChannel, LocalHost},
    error,
    extension::Extension,
    success, warning,
};

pub fn show(host: &LocalHost, url: &str) {
    let Some(result) = host.fetch(url, 0) else {
        error!("{} is not a Spotify show URL.", url);
    };
    let feed = result.feed;

    let title = match feed.get_title() {
        Ok(title) => title,
        Err(e) => error!("Cannot load show metadata. Err: {}", e),
    };

    println!("{}", title.bold());
    println!("{}", feed.get_link().blue());

    match feed.get_cover_url() {
        Ok(Some(cover)) => println!("cover: {}", cover),
        Ok(None) => {}
        Err(e) => warning!("No cover image. Err: {}", e),
    }
    if let Some(etag) = feed.get_http_etag() {
        println!("etag: {}", etag.dimmed());
    }
    if let Some(last_modified) = feed.get_http_last_modified() {
        println!("last-modified: {}", last_modified.dimmed());
    }

    match feed.get_description() {
        Ok(description) if !description.is_empty() => println!("\n{}", description),
        Ok(_) => {}
        Err(e) => warning!("No description. Err: {}", e),
    }
}

pub fn forget(extension: &Extension, url: &str) {
    let channel = LocalChannel::new(url);
    extension.on_podcast_delete(Some(&channel));
    success!("Forgot cached metadata for {}", url);
}
