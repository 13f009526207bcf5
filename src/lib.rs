pub mod alert;
pub mod card;
pub mod chat;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod thread_store;

pub use alert::{AckEvent, AlertKind, AlertRecord, TriggerEvent};
pub use card::{build_card, ChatCard};
pub use chat::ChatClient;
pub use config::AppConfig;
pub use error::ForwardError;
pub use forwarder::{AlertForwarder, ForwardOutcome};
pub use thread_store::{ThreadMapping, ThreadStore};
