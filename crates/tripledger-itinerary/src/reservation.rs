//! Reservation entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Broad category of a reservation, derived from its schema.org `@type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationKind {
    /// `FlightReservation`.
    Flight,
    /// `LodgingReservation`.
    Lodging,
    /// `TrainReservation`.
    Train,
    /// `BusReservation`.
    Bus,
    /// `RentalCarReservation`.
    RentalCar,
    /// `EventReservation`.
    Event,
    /// `FoodEstablishmentReservation`.
    Restaurant,
    /// Any other reservation type.
    Other,
}

impl ReservationKind {
    /// Classifies a schema.org type name.
    ///
    /// Accepts both bare names (`FlightReservation`) and IRIs
    /// (`http://schema.org/FlightReservation`).
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        let name = name.rsplit('/').next().unwrap_or(name);
        match name {
            "FlightReservation" => Self::Flight,
            "LodgingReservation" => Self::Lodging,
            "TrainReservation" => Self::Train,
            "BusReservation" => Self::Bus,
            "RentalCarReservation" => Self::RentalCar,
            "EventReservation" => Self::Event,
            "FoodEstablishmentReservation" => Self::Restaurant,
            _ => Self::Other,
        }
    }
}

/// A single reservation as produced by an extraction engine.
///
/// The payload is an opaque JSON-LD object; only a few well-known fields are
/// exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reservation(Map<String, Value>);

impl Reservation {
    /// Wraps a JSON object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Converts a JSON value into a reservation if it is a reservation object.
    ///
    /// A reservation object is a JSON object whose `@type` ends in
    /// `Reservation`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if is_reservation_type(fields.get("@type")) => {
                Some(Self(fields))
            }
            _ => None,
        }
    }

    /// The reservation `@type`.
    ///
    /// For multi-typed entries this is the first type ending in
    /// `Reservation`.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self.0.get("@type")? {
            Value::String(name) => Some(name),
            Value::Array(names) => names
                .iter()
                .filter_map(Value::as_str)
                .find(|name| name.ends_with("Reservation")),
            _ => None,
        }
    }

    /// The reservation category.
    #[must_use]
    pub fn kind(&self) -> ReservationKind {
        self.type_name()
            .map_or(ReservationKind::Other, ReservationKind::from_type_name)
    }

    /// Booking reference, if present.
    #[must_use]
    pub fn reservation_number(&self) -> Option<&str> {
        self.0
            .get("reservationNumber")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The reserved thing (flight, lodging business, train trip, ...).
    #[must_use]
    pub fn reservation_for(&self) -> Option<&Value> {
        self.0.get("reservationFor")
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields of the reservation.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutable access to the fields.
    pub const fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Converts back into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn is_reservation_type(ty: Option<&Value>) -> bool {
    match ty {
        Some(Value::String(name)) => name.ends_with("Reservation"),
        // JSON-LD allows multiple types
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| name.ends_with("Reservation")),
        _ => false,
    }
}
