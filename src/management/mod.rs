mod auth;
mod service;
mod show;
mod store;

pub use auth::Authorizer;
pub use auth::TokenError;
pub use auth::TokenProvider;
pub use auth::is_token_expired;
pub use service::SharedService;
pub use service::SpotifyService;
pub use show::ShowCache;
pub use store::CacheDocument;
pub use store::CredentialStore;
pub use store::StoreError;
