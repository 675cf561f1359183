//! Extraction engines.
//!
//! An engine turns one document (an HTML body, an attachment, or the JSON
//! form of an already merged itinerary) into an [`Itinerary`]. Engines are
//! used behind the [`Extractor`] trait so callers can swap them freely.

mod jsonld;
mod kitinerary;

pub use jsonld::JsonLdExtractor;
pub use kitinerary::{KItineraryConfig, KItineraryExtractor};

use async_trait::async_trait;

use crate::Itinerary;
use crate::error::Result;

/// A document-to-itinerary extraction engine.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts reservations from a document.
    ///
    /// Input that contains no reservations yields an empty itinerary.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot process the input at all.
    async fn extract(&self, input: &[u8]) -> Result<Itinerary>;

    /// Short engine name for logging.
    fn name(&self) -> &'static str;
}
