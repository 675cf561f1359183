//! Property tests for itinerary merging and JSON interchange.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;
use tripledger_itinerary::{Itinerary, Reservation};

fn flight(number: &str) -> Reservation {
    Reservation::from_value(json!({
        "@type": "FlightReservation",
        "reservationFor": { "@type": "Flight", "flightNumber": number }
    }))
    .unwrap()
}

fn hotel(name: &str) -> Reservation {
    Reservation::from_value(json!({
        "@type": "LodgingReservation",
        "reservationFor": { "@type": "LodgingBusiness", "name": name }
    }))
    .unwrap()
}

fn itinerary(flights: &BTreeSet<String>, hotels: &BTreeSet<String>) -> Itinerary {
    flights
        .iter()
        .map(|f| flight(f))
        .chain(hotels.iter().map(|h| hotel(h)))
        .collect()
}

proptest! {
    #[test]
    fn merge_of_disjoint_sources_is_order_independent(
        flights in prop::collection::btree_set("[A-Z]{2}[0-9]{1,4}", 0..6),
        hotels in prop::collection::btree_set("[A-Za-z ]{1,12}", 0..6),
    ) {
        let body = itinerary(&flights, &BTreeSet::new());
        let attachment = itinerary(&BTreeSet::new(), &hotels);

        let forward = body.clone().merge(attachment.clone());
        let backward = attachment.merge(body);

        prop_assert_eq!(forward.len(), flights.len() + hotels.len());
        prop_assert_eq!(backward.len(), forward.len());
        for entry in &forward {
            prop_assert!(backward.contains(entry));
        }
    }

    #[test]
    fn merge_is_idempotent_and_associative(
        a in prop::collection::btree_set("[A-Z]{2}[0-9]{1,3}", 0..5),
        b in prop::collection::btree_set("[A-Z]{2}[0-9]{1,3}", 0..5),
        c in prop::collection::btree_set("[A-Z]{2}[0-9]{1,3}", 0..5),
    ) {
        let empty = BTreeSet::new();
        let a = itinerary(&a, &empty);
        let b = itinerary(&b, &empty);
        let c = itinerary(&c, &empty);

        prop_assert_eq!(a.clone().merge(a.clone()), a.clone());
        prop_assert_eq!(
            a.clone().merge(b.clone()).merge(c.clone()),
            a.merge(b.merge(c))
        );
    }

    #[test]
    fn json_round_trip(
        flights in prop::collection::btree_set("[A-Z]{2}[0-9]{1,4}", 0..6),
        hotels in prop::collection::btree_set("[^\"\\\\]{0,16}", 0..6),
    ) {
        let original = itinerary(&flights, &hotels);
        let json = original.to_json();
        let parsed = Itinerary::from_json(&json).unwrap();
        prop_assert_eq!(&parsed, &original);
        prop_assert_eq!(parsed.to_json(), json);
    }
}
