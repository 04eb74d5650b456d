//! Concrete backends for the Vitrin collaborator traits: the in-memory TTL
//! session store, the commerce REST client, the content-generation and
//! intent-resolver HTTP clients, the Telegram messaging transport, and the
//! TOML settings repository.

pub mod commerce_client;
pub mod generation_client;
mod http;
pub mod image_fetcher;
pub mod intent_client;
pub mod memory_session_store;
pub mod settings_repository;
pub mod telegram_transport;

pub use commerce_client::RestCommerceClient;
pub use generation_client::HttpContentGenerator;
pub use image_fetcher::HttpImageFetcher;
pub use intent_client::HttpIntentResolver;
pub use memory_session_store::MemorySessionStore;
pub use settings_repository::TomlSettingsRepository;
pub use telegram_transport::TelegramTransport;
