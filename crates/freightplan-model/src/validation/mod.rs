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

use crate::common::hours_between;
use crate::plan::alert::AlertKind;
use crate::plan::assignment::{CargoStatus, PlanSolution};
use crate::problem::cargo::CargoId;
use crate::problem::flight::FlightId;
use crate::problem::prob::Problem;

const MARGIN_SUM_TOLERANCE: f64 = 1e-6;
const CAPACITY_TOLERANCE: f64 = 1e-9;
const TRANSIT_TOLERANCE_HOURS: f64 = 1e-9;

/// One way a plan fails its own contract. An empty violation list means
/// the plan honors every published invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnknownCargo { cargo: CargoId },
    UnknownFlight { cargo: CargoId, flight: FlightId },
    DisconnectedLegs { cargo: CargoId, position: usize },
    WrongEndpoints { cargo: CargoId },
    DepartsBeforeReady { cargo: CargoId },
    DwellOutsideWindow { cargo: CargoId, at: FlightId, minutes: i64, min: i64, max: i64 },
    LateWithoutPenalty { cargo: CargoId },
    TransitExceeded { cargo: CargoId, hours: f64, limit: f64 },
    OverCapacityWithoutBreachAlert { flight: FlightId },
    PriorityUnprotected { cargo: CargoId },
    MarginSumMismatch { expected: f64, actual: f64 },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Violation::*;
        match self {
            UnknownCargo { cargo } => write!(f, "Assignment references unknown cargo {cargo}"),
            UnknownFlight { cargo, flight } => {
                write!(f, "Cargo {cargo} is routed over unknown flight {flight}")
            }
            DisconnectedLegs { cargo, position } => {
                write!(f, "Cargo {cargo} itinerary breaks between legs {position} and {}", position + 1)
            }
            WrongEndpoints { cargo } => {
                write!(f, "Cargo {cargo} itinerary does not run origin to destination")
            }
            DepartsBeforeReady { cargo } => {
                write!(f, "Cargo {cargo} departs before its ready time")
            }
            DwellOutsideWindow { cargo, at, minutes, min, max } => write!(
                f,
                "Cargo {cargo} dwells {minutes} min at {at}, outside [{min}, {max}]"
            ),
            LateWithoutPenalty { cargo } => {
                write!(f, "Cargo {cargo} arrives late but carries no SLA penalty")
            }
            TransitExceeded { cargo, hours, limit } => {
                write!(f, "Cargo {cargo} transit {hours:.2} h exceeds its {limit:.2} h limit")
            }
            OverCapacityWithoutBreachAlert { flight } => {
                write!(f, "Flight {flight} is over capacity without a capacity breach alert")
            }
            PriorityUnprotected { cargo } => write!(
                f,
                "Guaranteed cargo {cargo} is undelivered without a priority guarantee alert"
            ),
            MarginSumMismatch { expected, actual } => write!(
                f,
                "Total margin {actual:.4} does not match the per-cargo sum {expected:.4}"
            ),
        }
    }
}

/// Re-checks a produced plan against the problem it was planned for.
/// Used by the test suite; embedders can call it to harden ingestion of
/// externally produced plans.
pub fn validate_solution(problem: &Problem, solution: &PlanSolution) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_routes(problem, solution, &mut violations);
    check_capacities(problem, solution, &mut violations);
    check_priority_guarantee(problem, solution, &mut violations);
    check_margin_sum(solution, &mut violations);

    violations
}

fn check_routes(problem: &Problem, solution: &PlanSolution, out: &mut Vec<Violation>) {
    for (cargo_id, assignment) in &solution.assignments {
        let Some(cargo) = problem.cargo().get(cargo_id) else {
            out.push(Violation::UnknownCargo {
                cargo: cargo_id.clone(),
            });
            continue;
        };
        if assignment.status != CargoStatus::Delivered {
            continue;
        }
        let route = &assignment.route;
        let legs = &route.legs;
        if legs.is_empty() {
            out.push(Violation::WrongEndpoints {
                cargo: cargo_id.clone(),
            });
            continue;
        }

        for leg in legs.iter() {
            if !problem.flights().contains_id(&leg.flight_id) {
                out.push(Violation::UnknownFlight {
                    cargo: cargo_id.clone(),
                    flight: leg.flight_id.clone(),
                });
            }
        }

        if legs.first().map(|l| &l.origin) != Some(cargo.origin())
            || legs.last().map(|l| &l.destination) != Some(cargo.destination())
        {
            out.push(Violation::WrongEndpoints {
                cargo: cargo_id.clone(),
            });
        }

        if legs[0].departure < cargo.ready_time() {
            out.push(Violation::DepartsBeforeReady {
                cargo: cargo_id.clone(),
            });
        }

        for (i, pair) in legs.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.destination != next.origin || next.departure < prev.arrival {
                out.push(Violation::DisconnectedLegs {
                    cargo: cargo_id.clone(),
                    position: i,
                });
                continue;
            }
            let window = problem
                .rules()
                .window(cargo.origin(), cargo.destination(), &prev.destination);
            let dwell = (next.departure - prev.arrival).num_minutes();
            if !window.contains(dwell) {
                out.push(Violation::DwellOutsideWindow {
                    cargo: cargo_id.clone(),
                    at: next.flight_id.clone(),
                    minutes: dwell,
                    min: window.min_minutes,
                    max: window.max_minutes,
                });
            }
        }

        let arrival = legs.last().map(|l| l.arrival).expect("non-empty legs");
        if arrival > cargo.due_by() && assignment.route.sla_penalty.value() <= 0.0 {
            out.push(Violation::LateWithoutPenalty {
                cargo: cargo_id.clone(),
            });
        }

        let transit = hours_between(legs[0].departure, arrival);
        if transit > cargo.max_transit_hours() + TRANSIT_TOLERANCE_HOURS {
            out.push(Violation::TransitExceeded {
                cargo: cargo_id.clone(),
                hours: transit,
                limit: cargo.max_transit_hours(),
            });
        }
    }
}

fn check_capacities(problem: &Problem, solution: &PlanSolution, out: &mut Vec<Violation>) {
    for (flight_id, load) in &solution.flight_loads {
        let Some(flight) = problem.flights().get(flight_id) else {
            continue;
        };
        let over_weight =
            load.weight.value() > flight.weight_capacity().value() + CAPACITY_TOLERANCE;
        let over_volume =
            load.volume.value() > flight.volume_capacity().value() + CAPACITY_TOLERANCE;
        if over_weight || over_volume {
            let has_breach_alert = solution.alerts.iter().any(|a| {
                a.kind == AlertKind::CapacityBreach && a.flight_id.as_ref() == Some(flight_id)
            });
            if !has_breach_alert {
                out.push(Violation::OverCapacityWithoutBreachAlert {
                    flight: flight_id.clone(),
                });
            }
        }
    }
}

fn check_priority_guarantee(problem: &Problem, solution: &PlanSolution, out: &mut Vec<Violation>) {
    for cargo in problem.cargo().iter() {
        if !cargo.priority().is_guaranteed() {
            continue;
        }
        let delivered = solution
            .assignments
            .get(cargo.id())
            .map(|a| a.status == CargoStatus::Delivered)
            .unwrap_or(false);
        if delivered {
            continue;
        }
        let has_violation_alert = solution.alerts.iter().any(|a| {
            a.kind == AlertKind::PriorityGuaranteeViolation
                && a.cargo_id.as_ref() == Some(cargo.id())
        });
        if !has_violation_alert {
            out.push(Violation::PriorityUnprotected {
                cargo: cargo.id().clone(),
            });
        }
    }
}

fn check_margin_sum(solution: &PlanSolution, out: &mut Vec<Violation>) {
    let expected: f64 = solution
        .assignments
        .values()
        .map(|a| a.margin.value())
        .sum();
    let actual = solution.total_margin.value();
    let scale = expected.abs().max(1.0);
    if (expected - actual).abs() > MARGIN_SUM_TOLERANCE * scale {
        out.push(Violation::MarginSumMismatch { expected, actual });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::alert::{Alert, Severity};
    use crate::plan::assignment::{CargoAssignment, FlightLoad};
    use crate::plan::route::{RouteLeg, RouteOption};
    use crate::problem::builder::ProblemBuilder;
    use crate::problem::cargo::{Cargo, Priority};
    use crate::problem::flight::{AirportCode, Flight};
    use chrono::{DateTime, FixedOffset, TimeZone};
    use freightplan_core::prelude::{Money, Volume, Weight};
    use smallvec::SmallVec;

    fn ts(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, m, 0)
            .unwrap()
    }

    fn problem() -> Problem {
        let mut b = ProblemBuilder::new();
        b.add_flight(
            Flight::new(
                FlightId::from_str_id("F1"),
                AirportCode::from_str_id("DEL"),
                AirportCode::from_str_id("BOM"),
                ts(8, 0),
                ts(10, 0),
                Weight::new(1_000.0),
                Volume::new(10.0),
                10.0,
            )
            .unwrap(),
        );
        b.add_cargo(
            Cargo::new(
                CargoId::from_str_id("C1"),
                AirportCode::from_str_id("DEL"),
                AirportCode::from_str_id("BOM"),
                Weight::new(500.0),
                Volume::new(2.0),
                Money::new(50_000.0),
                Priority::High,
                false,
                12.0,
                ts(6, 0),
                ts(12, 0),
                1.0,
                100.0,
            )
            .unwrap(),
        );
        b.build().unwrap()
    }

    fn delivered_assignment() -> CargoAssignment {
        let leg = RouteLeg {
            flight_id: FlightId::from_str_id("F1"),
            origin: AirportCode::from_str_id("DEL"),
            destination: AirportCode::from_str_id("BOM"),
            departure: ts(8, 0),
            arrival: ts(10, 0),
            dwell_before_minutes: 120,
        };
        CargoAssignment {
            cargo_id: CargoId::from_str_id("C1"),
            route: RouteOption {
                legs: [leg].into_iter().collect(),
                operating_cost: Money::new(5_000.0),
                handling_cost: Money::new(500.0),
                sla_penalty: Money::zero(),
                margin: Money::new(44_500.0),
                transit_hours: 2.0,
                on_time: true,
                notes: String::new(),
            },
            status: CargoStatus::Delivered,
            margin: Money::new(44_500.0),
            reason: None,
        }
    }

    fn solution_with(assignment: CargoAssignment) -> PlanSolution {
        let margin = assignment.margin;
        let mut sol = PlanSolution {
            total_margin: margin,
            ..Default::default()
        };
        sol.flight_loads.insert(
            FlightId::from_str_id("F1"),
            FlightLoad {
                flight_id: FlightId::from_str_id("F1"),
                boarded: vec![assignment.cargo_id.clone()],
                weight: Weight::new(500.0),
                volume: Volume::new(2.0),
                revenue: Money::new(50_000.0),
                over_capacity: false,
            },
        );
        sol.assignments.insert(assignment.cargo_id.clone(), assignment);
        sol
    }

    #[test]
    fn test_clean_plan_has_no_violations() {
        let violations = validate_solution(&problem(), &solution_with(delivered_assignment()));
        assert!(violations.is_empty(), "unexpected: {violations:?}");
    }

    #[test]
    fn test_departure_before_ready_is_flagged() {
        let mut assignment = delivered_assignment();
        assignment.route.legs[0].departure = ts(5, 0);
        let violations = validate_solution(&problem(), &solution_with(assignment));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::DepartsBeforeReady { .. })));
    }

    #[test]
    fn test_over_capacity_needs_breach_alert() {
        let mut sol = solution_with(delivered_assignment());
        sol.flight_loads
            .get_mut(&FlightId::from_str_id("F1"))
            .unwrap()
            .weight = Weight::new(1_500.0);
        let violations = validate_solution(&problem(), &sol);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::OverCapacityWithoutBreachAlert { .. })));

        sol.alerts.push(
            Alert::new(AlertKind::CapacityBreach, Severity::Critical, "over")
                .with_flight(FlightId::from_str_id("F1")),
        );
        let violations = validate_solution(&problem(), &sol);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_undelivered_guaranteed_cargo_needs_alert() {
        let mut assignment = delivered_assignment();
        assignment.status = CargoStatus::Rolled;
        assignment.margin = Money::new(-12_500.0);
        let mut sol = solution_with(assignment);
        sol.total_margin = Money::new(-12_500.0);
        let violations = validate_solution(&problem(), &sol);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::PriorityUnprotected { .. })));

        sol.alerts.push(
            Alert::new(AlertKind::PriorityGuaranteeViolation, Severity::Critical, "rolled")
                .with_cargo(CargoId::from_str_id("C1")),
        );
        let violations = validate_solution(&problem(), &sol);
        assert!(violations.is_empty());
    }

    #[test]
    fn test_margin_sum_mismatch_is_flagged() {
        let mut sol = solution_with(delivered_assignment());
        sol.total_margin = Money::new(1.0);
        let violations = validate_solution(&problem(), &sol);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::MarginSumMismatch { .. })));
    }

    #[test]
    fn test_late_delivery_requires_penalty() {
        let mut assignment = delivered_assignment();
        assignment.route.legs[0].arrival = ts(13, 0);
        let violations = validate_solution(&problem(), &solution_with(assignment));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::LateWithoutPenalty { .. })));
    }
}
