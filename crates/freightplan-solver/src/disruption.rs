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

use crate::config::MarginThreshold;
use freightplan_core::prelude::{Volume, Weight};
use freightplan_model::prelude::{
    Alert, AlertKind, CargoStatus, FlightId, FlightSchedule, PlanSolution, Severity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Delay,
    Cancel,
    Swap,
}

/// One what-if mutation of the flight set, as supplied in the events
/// JSON array.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisruptionEvent {
    pub event_type: EventKind,
    pub flight_id: String,
    #[serde(default)]
    pub delay_minutes: i64,
    #[serde(default)]
    pub new_weight_capacity_kg: Option<f64>,
    #[serde(default)]
    pub new_volume_capacity_m3: Option<f64>,
}

pub fn events_from_json(s: &str) -> Result<Vec<DisruptionEvent>, serde_json::Error> {
    serde_json::from_str(s)
}

/// Applies events in input order to a cloned schedule, one
/// `disruption_applied` alert per event (info when applied, warning when
/// the flight is unknown). Non-positive delays change nothing.
pub fn apply_events(
    schedule: &FlightSchedule,
    events: &[DisruptionEvent],
) -> (FlightSchedule, Vec<Alert>) {
    let mut adjusted = schedule.clone();
    let mut alerts = Vec::new();

    for event in events {
        let flight_id = FlightId::from_str_id(&event.flight_id);
        let Some(flight) = adjusted.get(&flight_id).cloned() else {
            alerts.push(
                Alert::new(
                    AlertKind::DisruptionApplied,
                    Severity::Warning,
                    format!(
                        "Disruption references unknown flight {}",
                        event.flight_id
                    ),
                )
                .with_flight(flight_id),
            );
            continue;
        };

        match event.event_type {
            EventKind::Delay => {
                if event.delay_minutes <= 0 {
                    continue;
                }
                adjusted.insert(flight.delayed_by(event.delay_minutes));
                alerts.push(
                    Alert::new(
                        AlertKind::DisruptionApplied,
                        Severity::Info,
                        format!(
                            "Flight {} delayed by {} minutes",
                            event.flight_id, event.delay_minutes
                        ),
                    )
                    .with_flight(flight_id),
                );
            }
            EventKind::Cancel => {
                adjusted.remove(&flight_id);
                alerts.push(
                    Alert::new(
                        AlertKind::DisruptionApplied,
                        Severity::Info,
                        format!("Flight {} cancelled", event.flight_id),
                    )
                    .with_flight(flight_id),
                );
            }
            EventKind::Swap => {
                let weight = event.new_weight_capacity_kg.map(Weight::new);
                let volume = event.new_volume_capacity_m3.map(Volume::new);
                let swapped = flight.with_capacities(weight, volume);
                alerts.push(
                    Alert::new(
                        AlertKind::DisruptionApplied,
                        Severity::Info,
                        format!(
                            "Aircraft swap on {}: capacity set to {:.0} kg / {:.1} m3",
                            event.flight_id,
                            swapped.weight_capacity().value(),
                            swapped.volume_capacity().value(),
                        ),
                    )
                    .with_flight(flight_id),
                );
                adjusted.insert(swapped);
            }
        }
    }
    (adjusted, alerts)
}

/// Structural diff between the baseline plan and a re-optimized
/// scenario, in ascending cargo order.
pub fn diff_plans(
    baseline: &PlanSolution,
    scenario: &PlanSolution,
    threshold: &MarginThreshold,
) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let cargo_ids: BTreeSet<_> = baseline
        .assignments
        .keys()
        .chain(scenario.assignments.keys())
        .cloned()
        .collect();

    for cargo_id in cargo_ids {
        let base = baseline.assignments.get(&cargo_id);
        let Some(new) = scenario.assignments.get(&cargo_id) else {
            alerts.push(
                Alert::new(
                    AlertKind::CargoMissing,
                    Severity::Critical,
                    format!("Cargo {} missing from disrupted plan", cargo_id.as_str()),
                )
                .with_cargo(cargo_id.clone()),
            );
            continue;
        };
        let Some(base) = base else {
            continue;
        };

        let margin_delta = new.margin - base.margin;

        if base.status != new.status {
            let severity = match (base.status, new.status) {
                (_, CargoStatus::Delivered) => Severity::Info,
                (CargoStatus::Delivered, CargoStatus::Rolled) => Severity::Warning,
                _ => Severity::Critical,
            };
            alerts.push(
                Alert::new(
                    AlertKind::StatusChange,
                    severity,
                    format!(
                        "Cargo {} status changed {} -> {}",
                        cargo_id.as_str(),
                        base.status,
                        new.status
                    ),
                )
                .with_cargo(cargo_id.clone())
                .with_status(new.status)
                .with_margin_delta(margin_delta),
            );
            continue;
        }

        if new.status == CargoStatus::Delivered
            && base.route.flight_sequence() != new.route.flight_sequence()
        {
            alerts.push(
                Alert::new(
                    AlertKind::Reroute,
                    Severity::Warning,
                    format!(
                        "Cargo {} rerouted: {} -> {}",
                        cargo_id.as_str(),
                        base.route.flight_sequence(),
                        new.route.flight_sequence()
                    ),
                )
                .with_cargo(cargo_id.clone())
                .with_status(new.status)
                .with_margin_delta(margin_delta),
            );
            continue;
        }

        if threshold.exceeded(margin_delta.value(), base.margin.value()) {
            let severity = if margin_delta.value() < 0.0 {
                Severity::Warning
            } else {
                Severity::Info
            };
            let direction = if margin_delta.value() < 0.0 {
                "decreased"
            } else {
                "increased"
            };
            alerts.push(
                Alert::new(
                    AlertKind::MarginChange,
                    severity,
                    format!(
                        "Cargo {} margin {} by ₹{:.0}",
                        cargo_id.as_str(),
                        direction,
                        margin_delta.value().abs()
                    ),
                )
                .with_cargo(cargo_id.clone())
                .with_status(new.status)
                .with_margin_delta(margin_delta),
            );
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use freightplan_core::prelude::Money;
    use freightplan_model::prelude::{AirportCode, CargoAssignment, CargoId, Flight, RouteOption};
    use smallvec::SmallVec;

    fn ts(h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, 0, 0)
            .unwrap()
    }

    fn schedule() -> FlightSchedule {
        [Flight::new(
            FlightId::from_str_id("F1"),
            AirportCode::from_str_id("AAA"),
            AirportCode::from_str_id("BBB"),
            ts(8),
            ts(10),
            Weight::new(1_000.0),
            Volume::new(10.0),
            10.0,
        )
        .unwrap()]
        .into_iter()
        .collect()
    }

    fn event(kind: EventKind, flight: &str) -> DisruptionEvent {
        DisruptionEvent {
            event_type: kind,
            flight_id: flight.to_owned(),
            delay_minutes: 0,
            new_weight_capacity_kg: None,
            new_volume_capacity_m3: None,
        }
    }

    fn assignment(status: CargoStatus, margin: f64, sequence: &[&str]) -> CargoAssignment {
        let legs = sequence
            .iter()
            .map(|id| freightplan_model::prelude::RouteLeg {
                flight_id: FlightId::from_str_id(id),
                origin: AirportCode::from_str_id("AAA"),
                destination: AirportCode::from_str_id("BBB"),
                departure: ts(8),
                arrival: ts(10),
                dwell_before_minutes: 0,
            })
            .collect::<SmallVec<_>>();
        CargoAssignment {
            cargo_id: CargoId::from_str_id("C1"),
            route: RouteOption {
                legs,
                operating_cost: Money::zero(),
                handling_cost: Money::zero(),
                sla_penalty: Money::zero(),
                margin: Money::new(margin),
                transit_hours: 2.0,
                on_time: true,
                notes: String::new(),
            },
            status,
            margin: Money::new(margin),
            reason: None,
        }
    }

    fn plan_with(assignment: CargoAssignment) -> PlanSolution {
        let margin = assignment.margin;
        let mut sol = PlanSolution {
            total_margin: margin,
            ..Default::default()
        };
        sol.assignments.insert(assignment.cargo_id.clone(), assignment);
        sol
    }

    #[test]
    fn test_delay_shifts_schedule_and_alerts() {
        let mut e = event(EventKind::Delay, "F1");
        e.delay_minutes = 120;
        let (adjusted, alerts) = apply_events(&schedule(), &[e]);
        let f = adjusted.get(&FlightId::from_str_id("F1")).unwrap();
        assert_eq!(f.departure(), ts(10));
        assert_eq!(f.arrival(), ts(12));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::DisruptionApplied);
        assert_eq!(alerts[0].severity, Severity::Info);
    }

    #[test]
    fn test_non_positive_delay_is_ignored() {
        let (adjusted, alerts) = apply_events(&schedule(), &[event(EventKind::Delay, "F1")]);
        assert_eq!(adjusted, schedule());
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_cancel_removes_flight() {
        let (adjusted, alerts) = apply_events(&schedule(), &[event(EventKind::Cancel, "F1")]);
        assert!(adjusted.is_empty());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Info);
    }

    #[test]
    fn test_swap_replaces_only_given_axes() {
        let mut e = event(EventKind::Swap, "F1");
        e.new_weight_capacity_kg = Some(2_000.0);
        let (adjusted, alerts) = apply_events(&schedule(), &[e]);
        let f = adjusted.get(&FlightId::from_str_id("F1")).unwrap();
        assert_eq!(f.weight_capacity().value(), 2_000.0);
        assert_eq!(f.volume_capacity().value(), 10.0);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_unknown_flight_warns() {
        let (adjusted, alerts) = apply_events(&schedule(), &[event(EventKind::Cancel, "NOPE")]);
        assert_eq!(adjusted.len(), 1);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_events_apply_in_input_order() {
        let mut delay = event(EventKind::Delay, "F1");
        delay.delay_minutes = 60;
        let cancel = event(EventKind::Cancel, "F1");
        let (adjusted, alerts) = apply_events(&schedule(), &[delay, cancel]);
        assert!(adjusted.is_empty());
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn test_events_json_roundtrip() {
        let json = r#"[
            {"event_type": "delay", "flight_id": "F1", "delay_minutes": 45},
            {"event_type": "swap", "flight_id": "F2", "new_weight_capacity_kg": 9000}
        ]"#;
        let events = events_from_json(json).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventKind::Delay);
        assert_eq!(events[0].delay_minutes, 45);
        assert_eq!(events[1].event_type, EventKind::Swap);
        assert_eq!(events[1].new_weight_capacity_kg, Some(9_000.0));
        assert!(events_from_json(r#"[{"event_type": "explode", "flight_id": "F1"}]"#).is_err());
    }

    #[test]
    fn test_diff_status_change_severities() {
        let threshold = MarginThreshold::default();

        let base = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F1"]));
        let new = plan_with(assignment(CargoStatus::Denied, -250.0, &[]));
        let alerts = diff_plans(&base, &new, &threshold);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::StatusChange);
        assert_eq!(alerts[0].severity, Severity::Critical);

        let new = plan_with(assignment(CargoStatus::Rolled, -250.0, &["F1"]));
        let alerts = diff_plans(&base, &new, &threshold);
        assert_eq!(alerts[0].severity, Severity::Warning);

        let base_rolled = plan_with(assignment(CargoStatus::Rolled, -250.0, &["F1"]));
        let new_delivered = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F1"]));
        let alerts = diff_plans(&base_rolled, &new_delivered, &threshold);
        assert_eq!(alerts[0].severity, Severity::Info);
    }

    #[test]
    fn test_diff_reroute_for_delivered_sequence_change() {
        let base = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F1"]));
        let new = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F2"]));
        let alerts = diff_plans(&base, &new, &MarginThreshold::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Reroute);
        assert_eq!(alerts[0].severity, Severity::Warning);
    }

    #[test]
    fn test_diff_margin_change_threshold() {
        let base = plan_with(assignment(CargoStatus::Delivered, 100_000.0, &["F1"]));
        // An 8k move on a 100k baseline stays under the 10% bound.
        let quiet = plan_with(assignment(CargoStatus::Delivered, 92_000.0, &["F1"]));
        assert!(diff_plans(&base, &quiet, &MarginThreshold::default()).is_empty());

        let loud = plan_with(assignment(CargoStatus::Delivered, 85_000.0, &["F1"]));
        let alerts = diff_plans(&base, &loud, &MarginThreshold::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MarginChange);
        assert_eq!(alerts[0].severity, Severity::Warning);
        assert_eq!(alerts[0].margin_delta, Some(Money::new(-15_000.0)));
    }

    #[test]
    fn test_diff_cargo_missing() {
        let base = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F1"]));
        let empty = PlanSolution::default();
        let alerts = diff_plans(&base, &empty, &MarginThreshold::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::CargoMissing);
        assert_eq!(alerts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_identical_plans_produce_no_alerts() {
        let base = plan_with(assignment(CargoStatus::Delivered, 1_000.0, &["F1"]));
        assert!(diff_plans(&base, &base.clone(), &MarginThreshold::default()).is_empty());
    }
}
