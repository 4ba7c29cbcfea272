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

use freightplan_core::prelude::Money;
use freightplan_model::common::{hours_between, minutes_between};
use freightplan_model::prelude::{Cargo, Flight, RouteLeg, RouteOption, RuleIndex};
use smallvec::SmallVec;

/// Scores a connected leg chain for `cargo`. The caller guarantees the
/// chain is structurally feasible (timing, windows, leg cap); this
/// computes the deterministic economics:
///
/// * operating cost: per-leg cost rate times cargo weight
/// * handling cost: connection fees plus the cargo's per-kg handling rate
/// * SLA penalty: hours past `due_by` times the cargo's penalty rate
/// * margin: revenue minus all of the above
pub fn score_itinerary(cargo: &Cargo, legs: &[&Flight], rules: &RuleIndex) -> RouteOption {
    debug_assert!(!legs.is_empty());

    let weight = cargo.weight().value();
    let mut route_legs: SmallVec<[RouteLeg; 4]> = SmallVec::with_capacity(legs.len());
    let mut operating = Money::zero();
    let mut fees = Money::zero();

    for (i, flight) in legs.iter().enumerate() {
        let dwell_before = if i == 0 {
            minutes_between(cargo.ready_time(), flight.departure()).max(0)
        } else {
            let prev = legs[i - 1];
            let window = rules.window(cargo.origin(), cargo.destination(), prev.destination());
            fees += window.fee;
            minutes_between(prev.arrival(), flight.departure())
        };
        operating += Money::new(flight.cost_per_kg() * weight);
        route_legs.push(RouteLeg {
            flight_id: flight.id().clone(),
            origin: flight.origin().clone(),
            destination: flight.destination().clone(),
            departure: flight.departure(),
            arrival: flight.arrival(),
            dwell_before_minutes: dwell_before,
        });
    }

    let handling = fees + Money::new(cargo.handling_cost_per_kg() * weight);

    let first_departure = legs[0].departure();
    let last_arrival = legs[legs.len() - 1].arrival();
    let lateness_hours = hours_between(cargo.due_by(), last_arrival).max(0.0);
    let sla_penalty = Money::new(lateness_hours * cargo.sla_penalty_per_hour());
    let on_time = last_arrival <= cargo.due_by();

    let margin = cargo.revenue() - operating - handling - sla_penalty;

    // Late itineraries stay eligible; the note records why the option
    // carries a penalty.
    let notes = if on_time {
        String::new()
    } else {
        format!(
            "late arrival {:.1} h past due time, SLA penalty applied",
            lateness_hours
        )
    };

    RouteOption {
        legs: route_legs,
        operating_cost: operating,
        handling_cost: handling,
        sla_penalty,
        margin,
        transit_hours: hours_between(first_departure, last_arrival),
        on_time,
        notes,
    }
}

/// The denial fallback: no legs, and a goodwill loss of
/// `denial_factor` times the cargo's revenue.
pub fn denied_option(cargo: &Cargo, denial_factor: f64, notes: &str) -> RouteOption {
    let penalty = cargo.revenue() * denial_factor;
    RouteOption {
        legs: SmallVec::new(),
        operating_cost: Money::zero(),
        handling_cost: Money::zero(),
        sla_penalty: penalty,
        margin: -penalty,
        transit_hours: 0.0,
        on_time: false,
        notes: notes.to_owned(),
    }
}
