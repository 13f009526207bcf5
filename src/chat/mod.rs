pub mod client;

pub use client::{ChatClient, CONTENT_TYPE_JSON};
