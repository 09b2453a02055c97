use std::rc::Rc;

use crate::{feed::SpotifyFeedHandler, types::EpisodeRecord};

/// A persisted episode created by the host.
pub trait EpisodeHandle {
    fn guid(&self) -> &str;
    fn link(&self) -> &str;
    fn save(&mut self);
}

/// The host's podcast subscription.
pub trait Channel {
    fn url(&self) -> &str;
    fn set_sync_to_mp3_player(&mut self, enabled: bool);
    /// Turns a record into a host episode. The episode is not persisted
    /// until [`EpisodeHandle::save`] is called.
    fn episode_factory(&mut self, record: &EpisodeRecord) -> Box<dyn EpisodeHandle>;
}

/// The registration surfaces a host may offer for custom feeds.
pub trait Host {
    /// Whether the host has a feed-handler registry with unregistration.
    fn supports_feed_registry(&self) -> bool;

    fn register_feed_handler(&mut self, handler: Rc<SpotifyFeedHandler>);

    fn unregister_feed_handler(&mut self, handler: &Rc<SpotifyFeedHandler>);

    /// Older hosts only accept a URL handler and never release it.
    fn register_custom_handler(&mut self, handler: Rc<SpotifyFeedHandler>);
}

/// How the extension hooks into the host, picked once at load time.
pub trait FeedRegistrar {
    fn register(&self, host: &mut dyn Host, handler: Rc<SpotifyFeedHandler>);
    fn unregister(&self, host: &mut dyn Host, handler: &Rc<SpotifyFeedHandler>);
}

/// Hosts with a feed-handler registry: the fetch callback is added on load
/// and removed on unload.
pub struct RegistryRegistrar;

impl FeedRegistrar for RegistryRegistrar {
    fn register(&self, host: &mut dyn Host, handler: Rc<SpotifyFeedHandler>) {
        host.register_feed_handler(handler);
    }

    fn unregister(&self, host: &mut dyn Host, handler: &Rc<SpotifyFeedHandler>) {
        host.unregister_feed_handler(handler);
    }
}

/// Hosts without a registry: the URL handler is installed once and stays.
pub struct CustomHandlerRegistrar;

impl FeedRegistrar for CustomHandlerRegistrar {
    fn register(&self, host: &mut dyn Host, handler: Rc<SpotifyFeedHandler>) {
        host.register_custom_handler(handler);
    }

    fn unregister(&self, _host: &mut dyn Host, _handler: &Rc<SpotifyFeedHandler>) {
        log::debug!("Host has no feed registry, nothing to unregister.");
    }
}

pub fn negotiate(host: &dyn Host) -> Box<dyn FeedRegistrar> {
    if host.supports_feed_registry() {
        Box::new(RegistryRegistrar)
    } else {
        log::debug!("Feed registry not available. Using fallback to a custom URL handler.");
        Box::new(CustomHandlerRegistrar)
    }
}
