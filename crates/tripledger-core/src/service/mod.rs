//! Core services.
//!
//! This module provides the service layer that ties the mail collaborators,
//! the extraction engine and the result cache together.

pub mod itinerary;

pub use itinerary::{ItineraryService, ServiceOptions};
