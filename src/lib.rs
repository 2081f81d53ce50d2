//! Wenku8 - client for the wenku8 light novel site.
//!
//! This library provides:
//! - Decoders that turn the site's HTML pages into typed records
//! - A session guard (login check plus search cooldown)
//! - A client facade that fetches pages in GBK or Big5 and decodes them

pub mod client;
pub mod config;
pub mod console;
pub mod error;
mod extract;
pub mod lang;
pub mod models;
pub mod pages;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use client::Wenku8Client;
pub use config::Config;
pub use console::Console;
pub use error::{ClientError, ConfigError};
pub use lang::{Lang, LoginValidity, NovelSortMethod, SearchMethod};
pub use models::{
    Availability, Bookmark, BookshelfItem, Chapter, ListingStats, NovelIndex, NovelInfo,
    NovelStats, PageControl, SearchItem, SearchResult, Volume,
};
pub use transport::{HttpTransport, RawResponse, Transport};
