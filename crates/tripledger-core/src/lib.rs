//! # tripledger-core
//!
//! Itinerary aggregation for email messages.
//!
//! This crate provides:
//! - **Itinerary Service** - extracts reservations from a message's HTML body
//!   and attachments, merges them, refines the result and caches it
//! - **Mail collaborators** - traits for connecting to a mail store and
//!   reading message content, plus a local `.eml` directory store
//! - **Cache stores** - in-memory LRU, `SQLite`, and a disabled cache
//! - **Settings** - JSON configuration for the service and its backends

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod account;
pub mod cache;
pub mod config;
mod error;
pub mod mail;
pub mod service;

pub use account::{Account, AccountId};
pub use cache::{CacheError, CacheKey, CacheStore, MemoryCache, NoCache, SqliteCache};
pub use config::{CacheBackend, CacheSettings, EngineKind, ExtractorSettings, Settings};
pub use error::{Error, Result};
pub use mail::{LocalMailStore, MailConnector, MailError, MessageReader, RawAttachment};
pub use service::{ItineraryService, ServiceOptions};

pub use tripledger_itinerary::{Extractor, Itinerary, Reservation, ReservationKind};
