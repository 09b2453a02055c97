//! Lifecycle hooks the host calls on the extension.

use std::rc::Rc;

use crate::{
    config::SpotifyConfig,
    feed::{
        SpotifyFeedHandler,
        host::{Channel, FeedRegistrar, Host, negotiate},
    },
    management::{Authorizer, SharedService, SpotifyService},
    spotify::{auth::AuthorizationError, http::HttpTransport},
    utils,
};

pub const TITLE: &str = "Spotify Extension";
pub const DESCRIPTION: &str = "Check for new episodes in Spotify podcasts.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Show the authorization page in the host's embedded browser.
    OpenSettings,
    /// Open these episode links in the system browser.
    OpenInBrowser(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
}

pub struct Extension {
    config: SpotifyConfig,
    service: SharedService,
    handler: Rc<SpotifyFeedHandler>,
    authorizer: Authorizer,
    registrar: Option<Box<dyn FeedRegistrar>>,
}

impl Extension {
    pub fn new(config: SpotifyConfig, transport: Box<dyn HttpTransport>) -> Self {
        let service = SpotifyService::new(config.clone(), transport).shared();
        Self::with_service(config, service)
    }

    pub fn from_config(config: SpotifyConfig) -> Self {
        let service = SpotifyService::from_config(config.clone()).shared();
        Self::with_service(config, service)
    }

    fn with_service(config: SpotifyConfig, service: SharedService) -> Self {
        Self {
            config,
            handler: Rc::new(SpotifyFeedHandler::new(service.clone())),
            service,
            authorizer: Authorizer::new(),
            registrar: None,
        }
    }

    pub fn service(&self) -> &SharedService {
        &self.service
    }

    pub fn handler(&self) -> &Rc<SpotifyFeedHandler> {
        &self.handler
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Loads the cache document and registers the feed handler the way the
    /// host supports.
    pub fn on_load(&mut self, host: &mut dyn Host) {
        log::debug!("Loading Spotify extension.");

        self.service.borrow_mut().store.load();

        let registrar = negotiate(host);
        registrar.register(host, self.handler.clone());
        self.registrar = Some(registrar);
    }

    pub fn on_unload(&mut self, host: &mut dyn Host) {
        log::debug!("Unloading Spotify extension.");

        if let Some(registrar) = self.registrar.take() {
            registrar.unregister(host, &self.handler);
        }
    }

    /// Spotify shows are never synced to a device.
    pub fn on_podcast_save(&self, channel: &mut dyn Channel) {
        channel.set_sync_to_mp3_player(false);
    }

    /// Drops the cached metadata of a removed show. Some hosts do not say
    /// which channel was removed; then there is nothing to do.
    pub fn on_podcast_delete(&self, channel: Option<&dyn Channel>) {
        let Some(channel) = channel else {
            return;
        };

        if let Some(show_id) = utils::extract_show_id(channel.url()) {
            self.service.borrow_mut().shows().evict(&show_id);
        }
    }

    pub fn on_create_menu(&self) -> Vec<MenuEntry> {
        vec![MenuEntry {
            label: "Spotify: Settings".to_string(),
            action: MenuAction::OpenSettings,
        }]
    }

    pub fn on_episodes_context_menu(&self, episode_links: &[&str]) -> Vec<MenuEntry> {
        vec![MenuEntry {
            label: "Open in web browser".to_string(),
            action: MenuAction::OpenInBrowser(
                episode_links.iter().map(|link| link.to_string()).collect(),
            ),
        }]
    }

    /// Runs a menu action. Returns the URL the embedded browser should load
    /// for [`MenuAction::OpenSettings`].
    pub fn run_menu_action(&mut self, action: &MenuAction) -> Option<String> {
        match action {
            MenuAction::OpenSettings => Some(self.open_settings()),
            MenuAction::OpenInBrowser(links) => {
                open_in_browser(links);
                None
            }
        }
    }

    /// Authorization page URL for the pending session.
    pub fn open_settings(&mut self) -> String {
        self.authorizer.authorization_url(&self.config)
    }

    pub fn is_redirect(&self, uri: &str) -> bool {
        uri.starts_with(&self.config.redirect_uri)
    }

    /// Called for every redirect the embedded browser follows. Returns
    /// whether the URI was the authorization callback.
    ///
    /// Authorization failures are logged, no token is issued and the user
    /// retries from the settings window.
    pub fn on_redirect(&mut self, uri: &str) -> bool {
        if !self.is_redirect(uri) {
            return false;
        }

        if let Err(e) = self.complete_authorization(uri) {
            log::error!("OAuth failed. {}", e);
        }
        true
    }

    pub fn complete_authorization(&mut self, redirect_uri: &str) -> Result<(), AuthorizationError> {
        let mut service = self.service.borrow_mut();
        let service = &mut *service;

        self.authorizer.complete(
            redirect_uri,
            service.client.tokens(),
            service.client.transport(),
            &mut service.store,
        )
    }
}

/// Opens every link with the system browser, logging the ones that fail.
pub fn open_in_browser(links: &[String]) {
    for link in links {
        if let Err(e) = webbrowser::open(link) {
            log::warn!("Failed to open {} in a browser: {}", link, e);
        }
    }
}
