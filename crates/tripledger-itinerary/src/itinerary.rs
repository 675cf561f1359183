//! Itinerary aggregate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::reservation::{Reservation, ReservationKind};

/// An ordered collection of reservations extracted from one or more documents.
///
/// Serializes as a JSON array of reservation objects. Object keys are emitted
/// in sorted order, so equal itineraries always serialize to identical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary {
    reservations: Vec<Reservation>,
}

impl Itinerary {
    /// Creates an empty itinerary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reservations: Vec::new(),
        }
    }

    /// Builds an itinerary from reservations, collapsing exact duplicates.
    #[must_use]
    pub fn from_reservations(reservations: impl IntoIterator<Item = Reservation>) -> Self {
        let mut itinerary = Self::new();
        for reservation in reservations {
            itinerary.push(reservation);
        }
        itinerary
    }

    /// Adds a reservation unless a structurally equal one is already present.
    ///
    /// Returns `true` if the reservation was added.
    pub fn push(&mut self, reservation: Reservation) -> bool {
        if self.reservations.contains(&reservation) {
            return false;
        }
        self.reservations.push(reservation);
        true
    }

    /// Merges two itineraries.
    ///
    /// The result holds every entry of `self` in order, followed by each entry
    /// of `other` that is not already present. Distinct entries are never
    /// dropped, and `a.merge(a.clone()) == a`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.merge_from(other);
        self
    }

    /// In-place variant of [`Itinerary::merge`].
    pub fn merge_from(&mut self, other: Self) {
        for reservation in other.reservations {
            self.push(reservation);
        }
    }

    /// Number of reservations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Whether no reservations were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Whether the itinerary holds a structurally equal reservation.
    #[must_use]
    pub fn contains(&self, reservation: &Reservation) -> bool {
        self.reservations.contains(reservation)
    }

    /// The reservations, in order.
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Iterates over reservations of one kind.
    pub fn of_kind(&self, kind: ReservationKind) -> impl Iterator<Item = &Reservation> {
        self.reservations.iter().filter(move |r| r.kind() == kind)
    }

    /// Parses an itinerary from its JSON array form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON array of objects.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parses an itinerary from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a JSON array of objects.
    pub fn from_slice(json: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(json)
    }

    /// Serializes to the JSON array form.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.reservations
                .iter()
                .cloned()
                .map(Reservation::into_value)
                .collect(),
        )
    }
}

impl IntoIterator for Itinerary {
    type Item = Reservation;
    type IntoIter = std::vec::IntoIter<Reservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.reservations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Itinerary {
    type Item = &'a Reservation;
    type IntoIter = std::slice::Iter<'a, Reservation>;

    fn into_iter(self) -> Self::IntoIter {
        self.reservations.iter()
    }
}

impl FromIterator<Reservation> for Itinerary {
    fn from_iter<T: IntoIterator<Item = Reservation>>(iter: T) -> Self {
        Self::from_reservations(iter)
    }
}
