pub mod content_store;
pub mod error;
pub mod fetcher;
pub mod memo;
