//! # CLI Module
//!
//! Commands of the developer harness. The harness plays the podcast manager:
//! it loads the extension into an in-memory [`host::LocalHost`], then drives
//! the same hooks a real host would call.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the settings (PKCE authorization) flow from a terminal
//! - [`show`] - Prints channel metadata served through the show cache
//! - [`episodes`] - Runs one feed refresh and lists imported episodes
//! - [`forget`] - Removes a show from the cache, as deleting a podcast does
//!
//! Nothing the harness imports is kept between runs; only the extension's
//! own cache document is persisted.

mod auth;
mod episodes;
pub mod host;
mod show;

pub use auth::auth;
pub use episodes::episodes;
pub use show::forget;
pub use show::show;
