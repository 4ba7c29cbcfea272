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

use crate::routing::score::{denied_option, score_itinerary};
use crate::routing::FlightsByOrigin;
use freightplan_model::common::{hours_between, minutes_between};
use freightplan_model::prelude::{Cargo, Flight, RouteOption, RuleIndex};

pub const NO_FEASIBLE_ITINERARY: &str = "no feasible itinerary";

/// Depth-first itinerary search over the temporal flight graph.
///
/// A leg extends a partial path when it departs from the current
/// airport, respects the connection window against the previous leg
/// (or the cargo's ready time for the first leg), keeps cumulative
/// elapsed time within the cargo's transit limit and does not revisit
/// a flight. Paths are capped at `max_legs` legs and stop at the
/// destination.
///
/// Never fails: a cargo with no feasible itinerary gets the denial
/// option as its only choice, so every gene position stays valid.
#[derive(Debug, Clone)]
pub struct RouteEnumerator<'a> {
    flights: &'a FlightsByOrigin<'a>,
    rules: &'a RuleIndex,
    max_legs: usize,
    denial_factor: f64,
}

impl<'a> RouteEnumerator<'a> {
    #[inline]
    pub fn new(
        flights: &'a FlightsByOrigin<'a>,
        rules: &'a RuleIndex,
        max_legs: usize,
        denial_factor: f64,
    ) -> Self {
        Self {
            flights,
            rules,
            max_legs,
            denial_factor,
        }
    }

    /// All feasible itineraries for `cargo`, on-time options first, then
    /// by ascending operating+handling cost. Late itineraries stay in
    /// the list (they carry an SLA penalty but remain eligible), which
    /// keeps guaranteed cargo shippable when nothing arrives on time.
    pub fn enumerate(&self, cargo: &Cargo) -> Vec<RouteOption> {
        let mut out = Vec::new();
        let mut path: Vec<&'a Flight> = Vec::with_capacity(self.max_legs);
        self.dfs(cargo, &mut path, &mut out);

        out.sort_by(|a, b| {
            b.on_time
                .cmp(&a.on_time)
                .then_with(|| a.total_cost().value().total_cmp(&b.total_cost().value()))
                .then_with(|| a.transit_hours.total_cmp(&b.transit_hours))
                .then_with(|| a.flight_sequence().cmp(&b.flight_sequence()))
        });

        if out.is_empty() {
            out.push(denied_option(cargo, self.denial_factor, NO_FEASIBLE_ITINERARY));
        }
        out
    }

    fn dfs(&self, cargo: &Cargo, path: &mut Vec<&'a Flight>, out: &mut Vec<RouteOption>) {
        let current = match path.last() {
            Some(leg) => leg.destination(),
            None => cargo.origin(),
        };

        for &flight in self.flights.departing(current) {
            if path.iter().any(|f| f.id() == flight.id()) {
                continue;
            }
            match path.last() {
                None => {
                    if flight.departure() < cargo.ready_time() {
                        continue;
                    }
                }
                Some(prev) => {
                    let dwell = minutes_between(prev.arrival(), flight.departure());
                    let window =
                        self.rules
                            .window(cargo.origin(), cargo.destination(), prev.destination());
                    if !window.contains(dwell) {
                        continue;
                    }
                }
            }

            let first_departure = path
                .first()
                .map(|f| f.departure())
                .unwrap_or_else(|| flight.departure());
            if hours_between(first_departure, flight.arrival()) > cargo.max_transit_hours() {
                continue;
            }

            if flight.destination() == cargo.destination() {
                path.push(flight);
                out.push(score_itinerary(cargo, path, self.rules));
                path.pop();
                continue;
            }

            if path.len() + 1 >= self.max_legs {
                continue;
            }
            path.push(flight);
            self.dfs(cargo, path, out);
            path.pop();
        }
    }
}
