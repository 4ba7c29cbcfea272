// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::problem::flight::{AirportCode, FlightId};
use chrono::{DateTime, FixedOffset};
use freightplan_core::prelude::Money;
use smallvec::SmallVec;

/// The label written in place of a flight sequence when a cargo has no
/// itinerary.
pub const DENIED_SEQUENCE: &str = "DENIED";

/// One flight within an itinerary, with the dwell spent waiting for it.
/// For the first leg the dwell runs from the cargo's ready time.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub flight_id: FlightId,
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub departure: DateTime<FixedOffset>,
    pub arrival: DateTime<FixedOffset>,
    pub dwell_before_minutes: i64,
}

/// A scored itinerary for one cargo, or the distinguished denial option
/// (no legs, margin equal to the configured goodwill loss).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOption {
    pub legs: SmallVec<[RouteLeg; 4]>,
    pub operating_cost: Money,
    pub handling_cost: Money,
    pub sla_penalty: Money,
    pub margin: Money,
    pub transit_hours: f64,
    pub on_time: bool,
    pub notes: String,
}

impl RouteOption {
    #[inline]
    pub fn is_denied(&self) -> bool {
        self.legs.is_empty()
    }

    /// Operating plus handling cost; penalties are reported separately.
    #[inline]
    pub fn total_cost(&self) -> Money {
        self.operating_cost + self.handling_cost
    }

    #[inline]
    pub fn first_departure(&self) -> Option<DateTime<FixedOffset>> {
        self.legs.first().map(|l| l.departure)
    }

    #[inline]
    pub fn last_arrival(&self) -> Option<DateTime<FixedOffset>> {
        self.legs.last().map(|l| l.arrival)
    }

    #[inline]
    pub fn leg_ids(&self) -> impl Iterator<Item = &FlightId> {
        self.legs.iter().map(|l| &l.flight_id)
    }

    /// Space-delimited flight identifiers, or `DENIED` for the denial
    /// option.
    pub fn flight_sequence(&self) -> String {
        if self.is_denied() {
            return DENIED_SEQUENCE.to_owned();
        }
        self.legs
            .iter()
            .map(|l| l.flight_id.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, m, 0)
            .unwrap()
    }

    fn leg(id: &str, dep: DateTime<FixedOffset>, arr: DateTime<FixedOffset>) -> RouteLeg {
        RouteLeg {
            flight_id: FlightId::from_str_id(id),
            origin: AirportCode::from_str_id("DEL"),
            destination: AirportCode::from_str_id("BOM"),
            departure: dep,
            arrival: arr,
            dwell_before_minutes: 0,
        }
    }

    fn itinerary() -> RouteOption {
        RouteOption {
            legs: [leg("F1", ts(8, 0), ts(10, 0)), leg("F2", ts(11, 30), ts(14, 0))]
                .into_iter()
                .collect(),
            operating_cost: Money::new(20_000.0),
            handling_cost: Money::new(3_000.0),
            sla_penalty: Money::zero(),
            margin: Money::new(77_000.0),
            transit_hours: 6.0,
            on_time: true,
            notes: String::new(),
        }
    }

    #[test]
    fn test_flight_sequence_is_space_delimited() {
        assert_eq!(itinerary().flight_sequence(), "F1 F2");
    }

    #[test]
    fn test_denied_option_reports_denied() {
        let denied = RouteOption {
            legs: SmallVec::new(),
            operating_cost: Money::zero(),
            handling_cost: Money::zero(),
            sla_penalty: Money::new(25_000.0),
            margin: Money::new(-25_000.0),
            transit_hours: 0.0,
            on_time: false,
            notes: "no feasible itinerary".to_owned(),
        };
        assert!(denied.is_denied());
        assert_eq!(denied.flight_sequence(), DENIED_SEQUENCE);
        assert!(denied.first_departure().is_none());
    }

    #[test]
    fn test_total_cost_excludes_penalty() {
        let r = itinerary();
        assert_eq!(r.total_cost(), Money::new(23_000.0));
    }

    #[test]
    fn test_endpoints() {
        let r = itinerary();
        assert_eq!(r.first_departure(), Some(ts(8, 0)));
        assert_eq!(r.last_arrival(), Some(ts(14, 0)));
    }
}
