//! Spotify shows as podcast feeds.
//!
//! This library turns a Spotify show URL into a synthetic podcast feed for a
//! podcast manager. It authenticates against the Spotify Web API, caches show
//! metadata in a single JSON document and normalizes episode lists into the
//! records the host stores.
//!
//! # Modules
//!
//! - `cli` - Commands of the developer host harness
//! - `config` - Configuration management and environment variables
//! - `extension` - Lifecycle hooks the host calls
//! - `feed` - Feed surface, episode normalization and host capabilities
//! - `management` - Credential store, token provider and show cache
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE primitives, show URLs and release dates

pub mod cli;
pub mod config;
pub mod extension;
pub mod feed;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Opening the authorization page...");
/// info!("{} new episodes", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the harness binary uses this. Library code logs and returns errors,
/// it never terminates the host process.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
