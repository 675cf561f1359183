//! Built-in JSON-LD extraction engine.
//!
//! Booking confirmation mails from airlines, hotels and rail operators
//! commonly embed schema.org reservations as
//! `<script type="application/ld+json">` blocks. This engine collects those
//! blocks from HTML, or reads JSON input directly, and folds together
//! entries that describe the same booking.

use std::collections::HashMap;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use super::Extractor;
use crate::error::{ExtractError, Result};
use crate::{Itinerary, Reservation};

/// Default input size limit (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Reservation fields that tell apart entries sharing a booking reference.
const DISTINGUISHING_FIELDS: [&str; 2] = ["reservationFor", "underName"];

/// Extraction engine for schema.org JSON-LD reservations.
#[derive(Debug, Clone)]
pub struct JsonLdExtractor {
    max_input_bytes: usize,
}

impl Default for JsonLdExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INPUT_BYTES)
    }
}

impl JsonLdExtractor {
    /// Creates an engine that rejects inputs larger than `max_input_bytes`.
    #[must_use]
    pub const fn new(max_input_bytes: usize) -> Self {
        Self { max_input_bytes }
    }

    /// Synchronous extraction, shared by the async trait implementation.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InputTooLarge`] for oversized input and
    /// [`ExtractError::InvalidJson`] for input that starts like JSON but
    /// does not parse.
    pub fn extract_sync(&self, input: &[u8]) -> Result<Itinerary> {
        if input.len() > self.max_input_bytes {
            return Err(ExtractError::InputTooLarge {
                size: input.len(),
                limit: self.max_input_bytes,
            });
        }

        let text = String::from_utf8_lossy(input);
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();

        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            let value: Value = serde_json::from_str(trimmed)?;
            return Ok(itinerary_from_value(value));
        }

        let mut candidates = Vec::new();
        for block in ld_json_blocks(&text) {
            match serde_json::from_str::<Value>(unwrap_script_body(&block)) {
                Ok(value) => collect_reservations(value, &mut candidates),
                Err(e) => tracing::debug!(?e, "Skipping invalid ld+json block"),
            }
        }

        Ok(reconcile(candidates))
    }
}

#[async_trait]
impl Extractor for JsonLdExtractor {
    async fn extract(&self, input: &[u8]) -> Result<Itinerary> {
        self.extract_sync(input)
    }

    fn name(&self) -> &'static str {
        "json-ld"
    }
}

/// Collects and reconciles all reservations found in a JSON document.
pub(super) fn itinerary_from_value(value: Value) -> Itinerary {
    let mut candidates = Vec::new();
    collect_reservations(value, &mut candidates);
    reconcile(candidates)
}

/// Bodies of the `<script type="application/ld+json">` elements in a document.
fn ld_json_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    #[allow(clippy::expect_used)] // literal selector
    let scripts = Selector::parse("script[type]").expect("valid script selector");

    document
        .select(&scripts)
        .filter(|script| {
            script.value().attr("type").is_some_and(|ty| {
                let mime = ty.split(';').next().unwrap_or(ty);
                mime.trim().eq_ignore_ascii_case("application/ld+json")
            })
        })
        .map(|script| script.text().collect())
        .collect()
}

/// Strips comment and CDATA wrappers some senders put around script bodies.
fn unwrap_script_body(block: &str) -> &str {
    let mut body = block.trim();
    for (open, close) in [("<!--", "-->"), ("<![CDATA[", "]]>")] {
        if let Some(inner) = body.strip_prefix(open).and_then(|b| b.strip_suffix(close)) {
            body = inner.trim();
        }
    }
    body
}

fn collect_reservations(value: Value, out: &mut Vec<Reservation>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_reservations(item, out);
            }
        }
        Value::Object(mut fields) => {
            if let Some(graph) = fields.remove("@graph") {
                collect_reservations(graph, out);
            }
            if let Some(reservation) = Reservation::from_value(Value::Object(fields)) {
                out.push(reservation);
            }
        }
        _ => {}
    }
}

/// Identity of the booking a reservation describes.
fn booking_key(reservation: &Reservation) -> Option<String> {
    let ty = reservation.type_name()?;
    if let Some(number) = reservation.reservation_number() {
        return Some(format!("{ty}\0#{}", number.trim().to_uppercase()));
    }
    reservation
        .reservation_for()
        .map(|target| format!("{ty}\0@{target}"))
}

/// Folds entries describing the same booking into one, keeping first-seen order.
///
/// A booking reference can cover several trips or travellers, so entries
/// sharing a key are only folded when they are [`same_booking`].
fn reconcile(candidates: Vec<Reservation>) -> Itinerary {
    let mut merged: Vec<Reservation> = Vec::with_capacity(candidates.len());
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();

    for reservation in candidates {
        let Some(key) = booking_key(&reservation) else {
            merged.push(reservation);
            continue;
        };
        let slots = seen.entry(key).or_default();
        let target = slots
            .iter()
            .copied()
            .find(|&index| same_booking(&merged[index], &reservation));
        if let Some(index) = target {
            fill_missing(merged[index].fields_mut(), reservation.fields());
        } else {
            slots.push(merged.len());
            merged.push(reservation);
        }
    }

    Itinerary::from_reservations(merged)
}

/// Whether two entries can describe the same reserved thing for the same person.
fn same_booking(a: &Reservation, b: &Reservation) -> bool {
    DISTINGUISHING_FIELDS
        .iter()
        .all(|field| match (a.get(field), b.get(field)) {
            (Some(left), Some(right)) => compatible(left, right),
            _ => true,
        })
}

/// Equal values, or objects whose shared fields are pairwise compatible.
fn compatible(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Object(left), Value::Object(right)) => left
            .iter()
            .all(|(key, value)| right.get(key).is_none_or(|other| compatible(value, other))),
        _ => left == right,
    }
}

/// Copies fields absent from `target`; on conflict the existing value wins.
fn fill_missing(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (None, _) => {
                target.insert(key.clone(), value.clone());
            }
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                fill_missing(existing, incoming);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ReservationKind;
    use serde_json::json;

    const CONFIRMATION_HTML: &str = r#"<html><head>
<script type="application/ld+json">
{
  "@context": "http://schema.org",
  "@type": "FlightReservation",
  "reservationNumber": "RXJ34P",
  "reservationFor": {
    "@type": "Flight",
    "flightNumber": "AB123",
    "departureAirport": { "@type": "Airport", "iataCode": "TXL" },
    "arrivalAirport": { "@type": "Airport", "iataCode": "VIE" }
  }
}
</script>
<SCRIPT TYPE='application/ld+json'><!--
[{"@type": "LodgingReservation", "reservationFor": {"@type": "LodgingBusiness", "name": "Hotel Test"}}]
--></SCRIPT>
<script type="application/ld+json">{ not json }</script>
<script type="text/javascript">var x = {"@type": "FlightReservation"};</script>
</head><body>Your booking</body></html>"#;

    #[test]
    fn test_extracts_reservations_from_html() {
        let itinerary = JsonLdExtractor::default()
            .extract_sync(CONFIRMATION_HTML.as_bytes())
            .unwrap();

        assert_eq!(itinerary.len(), 2);
        let flight = &itinerary.reservations()[0];
        assert_eq!(flight.kind(), ReservationKind::Flight);
        assert_eq!(flight.reservation_number(), Some("RXJ34P"));
        assert_eq!(
            itinerary.reservations()[1].kind(),
            ReservationKind::Lodging
        );
    }

    #[test]
    fn test_plain_text_and_binary_yield_nothing() {
        let engine = JsonLdExtractor::default();
        assert!(engine.extract_sync(b"Hello, no bookings here").unwrap().is_empty());
        assert!(engine.extract_sync(b"%PDF-1.7\n\x00\xff\xfe").unwrap().is_empty());
        assert!(engine.extract_sync(b"").unwrap().is_empty());
    }

    #[test]
    fn test_json_input_is_read_directly() {
        let input = json!({
            "@context": "http://schema.org",
            "@graph": [
                { "@type": "TrainReservation", "reservationNumber": "T1" },
                { "@type": "Person", "name": "Jane" }
            ]
        });
        let itinerary = JsonLdExtractor::default()
            .extract_sync(input.to_string().as_bytes())
            .unwrap();
        assert_eq!(itinerary.len(), 1);
        assert_eq!(itinerary.reservations()[0].kind(), ReservationKind::Train);
    }

    #[test]
    fn test_invalid_json_input_is_an_error() {
        let result = JsonLdExtractor::default().extract_sync(b"[{\"@type\": ");
        assert!(matches!(result, Err(ExtractError::InvalidJson(_))));
    }

    #[test]
    fn test_input_limit() {
        let result = JsonLdExtractor::new(4).extract_sync(b"<html></html>");
        assert!(matches!(
            result,
            Err(ExtractError::InputTooLarge { size: 13, limit: 4 })
        ));
    }

    fn flight(pnr: &str, number: &str, departure: &str, passenger: &str) -> Value {
        json!({
            "@type": "FlightReservation",
            "reservationNumber": pnr,
            "underName": { "@type": "Person", "name": passenger },
            "reservationFor": {
                "@type": "Flight",
                "flightNumber": number,
                "departureTime": departure
            }
        })
    }

    #[test]
    fn test_partial_entries_of_one_booking_are_folded() {
        let input = json!([
            {
                "@type": "FlightReservation",
                "reservationNumber": "rxj34p",
                "reservationFor": { "@type": "Flight", "flightNumber": "AB123" }
            },
            flight("RXJ34P", "AB123", "2026-11-02T08:15:00+01:00", "Jane Doe")
        ]);
        let itinerary = JsonLdExtractor::default()
            .extract_sync(input.to_string().as_bytes())
            .unwrap();

        assert_eq!(itinerary.len(), 1);
        let flight = &itinerary.reservations()[0];
        assert_eq!(flight.reservation_number(), Some("rxj34p"));
        assert_eq!(flight.get("underName").unwrap()["name"], "Jane Doe");
        let target = flight.reservation_for().unwrap();
        assert_eq!(target["flightNumber"], "AB123");
        assert_eq!(target["departureTime"], "2026-11-02T08:15:00+01:00");
    }

    #[test]
    fn test_round_trip_on_one_booking_reference() {
        let outbound = flight("RXJ34P", "AB123", "2026-11-02T08:15:00+01:00", "Jane Doe");
        let inbound = flight("RXJ34P", "AB124", "2026-11-09T18:40:00+01:00", "Jane Doe");
        let html = format!(
            r#"<html><head>
<script type="application/ld+json">{outbound}</script>
<script type="application/ld+json">{inbound}</script>
</head></html>"#
        );
        let itinerary = JsonLdExtractor::default()
            .extract_sync(html.as_bytes())
            .unwrap();

        assert_eq!(itinerary.len(), 2);
        let numbers: Vec<_> = itinerary
            .reservations()
            .iter()
            .map(|r| r.reservation_for().unwrap()["flightNumber"].clone())
            .collect();
        assert_eq!(numbers, [json!("AB123"), json!("AB124")]);

        // Refining the result keeps both legs
        let refined = JsonLdExtractor::default()
            .extract_sync(itinerary.to_json().as_bytes())
            .unwrap();
        assert_eq!(refined, itinerary);
    }

    #[test]
    fn test_passengers_sharing_a_booking_stay_separate() {
        let input = json!([
            flight("RXJ34P", "AB123", "2026-11-02T08:15:00+01:00", "Jane Doe"),
            flight("RXJ34P", "AB123", "2026-11-02T08:15:00+01:00", "John Doe")
        ]);
        let itinerary = JsonLdExtractor::default()
            .extract_sync(input.to_string().as_bytes())
            .unwrap();

        assert_eq!(itinerary.len(), 2);
        assert_eq!(itinerary.reservations()[0].get("underName").unwrap()["name"], "Jane Doe");
        assert_eq!(itinerary.reservations()[1].get("underName").unwrap()["name"], "John Doe");
    }

    #[test]
    fn test_conflicting_departure_blocks_folding() {
        let input = json!([
            flight("RXJ34P", "AB123", "2026-11-02T08:15:00+01:00", "Jane Doe"),
            flight("RXJ34P", "AB123", "2026-11-03T08:15:00+01:00", "Jane Doe")
        ]);
        let itinerary = JsonLdExtractor::default()
            .extract_sync(input.to_string().as_bytes())
            .unwrap();
        assert_eq!(itinerary.len(), 2);
    }

    #[test]
    fn test_compatible() {
        assert!(compatible(&json!({ "a": 1 }), &json!({ "a": 1, "b": 2 })));
        assert!(compatible(&json!({ "a": { "x": 1 } }), &json!({ "a": { "y": 2 } })));
        assert!(!compatible(&json!({ "a": { "x": 1 } }), &json!({ "a": { "x": 2 } })));
        assert!(!compatible(&json!("AB123"), &json!({ "flightNumber": "AB123" })));
    }

    #[test]
    fn test_scripts_outside_elements_are_ignored() {
        let html = r#"<html><body>
<!-- <script type="application/ld+json">{"@type": "FlightReservation", "reservationNumber": "C1"}</script> -->
<div title='<script type="application/ld+json">{"@type": "BusReservation", "reservationNumber": "A1"}</script>'>x</div>
<script type=" Application/LD+JSON; charset=utf-8 ">{"@type": "TrainReservation", "reservationNumber": "T1"}</script>
</body></html>"#;
        let itinerary = JsonLdExtractor::default()
            .extract_sync(html.as_bytes())
            .unwrap();

        assert_eq!(itinerary.len(), 1);
        assert_eq!(itinerary.reservations()[0].kind(), ReservationKind::Train);
    }

    #[test]
    fn test_distinct_bookings_survive_refinement() {
        let input = json!([
            { "@type": "FlightReservation", "reservationFor": { "flightNumber": "AB123" } },
            { "@type": "LodgingReservation", "reservationFor": { "name": "Hotel Test" } }
        ]);
        let first = JsonLdExtractor::default()
            .extract_sync(input.to_string().as_bytes())
            .unwrap();
        let second = JsonLdExtractor::default()
            .extract_sync(first.to_json().as_bytes())
            .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unwrap_script_body() {
        assert_eq!(unwrap_script_body("  <!-- [] -->  "), "[]");
        assert_eq!(unwrap_script_body("<![CDATA[{}]]>"), "{}");
        assert_eq!(unwrap_script_body("{}"), "{}");
    }
}
