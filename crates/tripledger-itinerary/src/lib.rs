//! # tripledger-itinerary
//!
//! Travel itinerary model and extraction engines for email content.
//!
//! ## Features
//!
//! - **Itinerary model**: ordered collection of schema.org reservations
//! - **Merge**: union of itineraries with structural de-duplication
//! - **JSON interchange**: deterministic JSON array serialization
//! - **Extraction engines**: built-in JSON-LD scanner and an adapter for the
//!   external `kitinerary-extractor` program
//!
//! ## Quick Start
//!
//! ```ignore
//! use tripledger_itinerary::{Extractor, Itinerary, JsonLdExtractor};
//!
//! let engine = JsonLdExtractor::default();
//! let from_body = engine.extract(html.as_bytes()).await?;
//! let from_attachment = engine.extract(&attachment).await?;
//!
//! let merged = from_body.merge(from_attachment);
//! let refined = engine.extract(merged.to_json().as_bytes()).await?;
//! println!("{}", refined.to_json());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod itinerary;
mod reservation;

pub mod extract;

pub use error::{ExtractError, Result};
pub use extract::{Extractor, JsonLdExtractor, KItineraryConfig, KItineraryExtractor};
pub use itinerary::Itinerary;
pub use reservation::{Reservation, ReservationKind};
