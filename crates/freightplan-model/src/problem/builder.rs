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

use crate::problem::cargo::{Cargo, CargoManifest};
use crate::problem::err::DataError;
use crate::problem::flight::{AirportCode, Flight, FlightSchedule};
use crate::problem::prob::Problem;
use crate::problem::rules::{ConnectionRule, RuleIndex};
use std::collections::HashSet;

/// Accumulates validated entities and rejects identifier collisions at
/// build time.
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    flights: Vec<Flight>,
    cargo: Vec<Cargo>,
    rules: Vec<ConnectionRule>,
}

impl ProblemBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_flight(&mut self, flight: Flight) -> &mut Self {
        self.flights.push(flight);
        self
    }

    #[inline]
    pub fn add_cargo(&mut self, cargo: Cargo) -> &mut Self {
        self.cargo.push(cargo);
        self
    }

    #[inline]
    pub fn add_rule(&mut self, rule: ConnectionRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    #[inline]
    pub fn with_flights<I: IntoIterator<Item = Flight>>(mut self, flights: I) -> Self {
        self.flights.extend(flights);
        self
    }

    #[inline]
    pub fn with_cargo<I: IntoIterator<Item = Cargo>>(mut self, cargo: I) -> Self {
        self.cargo.extend(cargo);
        self
    }

    #[inline]
    pub fn with_rules<I: IntoIterator<Item = ConnectionRule>>(mut self, rules: I) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn build(self) -> Result<Problem, DataError> {
        let mut schedule = FlightSchedule::new();
        for flight in self.flights {
            let id = flight.id().clone();
            if schedule.insert(flight).is_some() {
                return Err(DataError::DuplicateFlight(id));
            }
        }

        let mut manifest = CargoManifest::new();
        for cargo in self.cargo {
            let id = cargo.id().clone();
            if manifest.insert(cargo).is_some() {
                return Err(DataError::DuplicateCargo(id));
            }
        }

        // Every airport a rule names must belong to some flight or cargo.
        let mut known: HashSet<&AirportCode> = HashSet::new();
        for flight in schedule.iter() {
            known.insert(flight.origin());
            known.insert(flight.destination());
        }
        for cargo in manifest.iter() {
            known.insert(cargo.origin());
            known.insert(cargo.destination());
        }
        for rule in &self.rules {
            let referenced = [Some(rule.origin()), Some(rule.destination()), rule.via()];
            for airport in referenced.into_iter().flatten() {
                if !known.contains(airport) {
                    return Err(DataError::UnknownRuleAirport {
                        origin: rule.origin().clone(),
                        destination: rule.destination().clone(),
                        airport: airport.clone(),
                    });
                }
            }
        }

        let rules: RuleIndex = self.rules.into_iter().collect();
        Ok(Problem::new(schedule, manifest, rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::cargo::{CargoId, Priority};
    use crate::problem::flight::{AirportCode, FlightId};
    use chrono::{DateTime, FixedOffset, TimeZone};
    use freightplan_core::prelude::{Money, Volume, Weight};

    fn rule(origin: &str, destination: &str, via: Option<&str>) -> ConnectionRule {
        ConnectionRule::new(
            AirportCode::from_str_id(origin),
            AirportCode::from_str_id(destination),
            via.map(AirportCode::from_str_id),
            60,
            180,
            Money::zero(),
        )
        .unwrap()
    }

    fn ts(h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, 0, 0)
            .unwrap()
    }

    fn flight(id: &str) -> Flight {
        Flight::new(
            FlightId::from_str_id(id),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("BOM"),
            ts(8),
            ts(10),
            Weight::new(10_000.0),
            Volume::new(50.0),
            10.0,
        )
        .unwrap()
    }

    fn cargo(id: &str) -> Cargo {
        Cargo::new(
            CargoId::from_str_id(id),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("BOM"),
            Weight::new(100.0),
            Volume::new(1.0),
            Money::new(10_000.0),
            Priority::Low,
            false,
            24.0,
            ts(6),
            ts(20),
            1.0,
            100.0,
        )
        .unwrap()
    }

    #[test]
    fn test_build_collects_entities() {
        let mut b = ProblemBuilder::new();
        b.add_flight(flight("F1")).add_cargo(cargo("C1"));
        let problem = b.build().unwrap();
        assert_eq!(problem.flights().len(), 1);
        assert_eq!(problem.cargo().len(), 1);
        assert!(problem.rules().is_empty());
    }

    #[test]
    fn test_duplicate_flight_rejected() {
        let mut b = ProblemBuilder::new();
        b.add_flight(flight("F1")).add_flight(flight("F1"));
        assert!(matches!(b.build(), Err(DataError::DuplicateFlight(_))));
    }

    #[test]
    fn test_duplicate_cargo_rejected() {
        let mut b = ProblemBuilder::new();
        b.add_cargo(cargo("C1")).add_cargo(cargo("C1"));
        assert!(matches!(b.build(), Err(DataError::DuplicateCargo(_))));
    }

    #[test]
    fn test_rule_with_unknown_airport_is_rejected() {
        let mut b = ProblemBuilder::new();
        b.add_flight(flight("F1"))
            .add_cargo(cargo("C1"))
            .add_rule(rule("DEL", "BOM", Some("XXX")));
        match b.build() {
            Err(DataError::UnknownRuleAirport { airport, .. }) => {
                assert_eq!(airport.as_str(), "XXX");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_rule_with_unknown_endpoint_is_rejected() {
        let mut b = ProblemBuilder::new();
        b.add_flight(flight("F1"))
            .add_cargo(cargo("C1"))
            .add_rule(rule("DEL", "ZZZ", None));
        assert!(matches!(
            b.build(),
            Err(DataError::UnknownRuleAirport { .. })
        ));
    }

    #[test]
    fn test_rule_over_known_airports_is_accepted() {
        let mut b = ProblemBuilder::new();
        b.add_flight(flight("F1"))
            .add_cargo(cargo("C1"))
            .add_rule(rule("DEL", "BOM", Some("DEL")))
            .add_rule(rule("DEL", "BOM", None));
        let problem = b.build().unwrap();
        assert_eq!(problem.rules().len(), 2);
    }
}
