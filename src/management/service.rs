use std::{cell::RefCell, rc::Rc};

use crate::{
    config::SpotifyConfig,
    management::{CredentialStore, ShowCache},
    spotify::{SpotifyClient, http::HttpTransport},
};

/// Everything a fetch cycle touches: the cache document and the API client.
pub struct SpotifyService {
    pub store: CredentialStore,
    pub client: SpotifyClient,
}

/// The service is shared between the extension hooks and the feed handler
/// registered with the host. Everything runs on the host's calling thread.
pub type SharedService = Rc<RefCell<SpotifyService>>;

impl SpotifyService {
    /// A service whose store is bound to the configured cache file but not
    /// loaded yet.
    pub fn new(config: SpotifyConfig, transport: Box<dyn HttpTransport>) -> Self {
        Self {
            store: CredentialStore::new(config.cache_file.clone()),
            client: SpotifyClient::new(config, transport),
        }
    }

    pub fn from_config(config: SpotifyConfig) -> Self {
        Self {
            store: CredentialStore::new(config.cache_file.clone()),
            client: SpotifyClient::from_config(config),
        }
    }

    pub fn shared(self) -> SharedService {
        Rc::new(RefCell::new(self))
    }

    pub fn shows(&mut self) -> ShowCache<'_> {
        ShowCache::new(&mut self.store, &mut self.client)
    }
}
