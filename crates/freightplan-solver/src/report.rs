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

use crate::disruption::DisruptionEvent;
use crate::pipeline::PlanReport;
use freightplan_model::prelude::{Alert, Problem, Severity};
use serde::Serialize;
use std::collections::BTreeMap;

#[inline]
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// The structured equivalent of the four output files, served to the
/// HTTP collaborator as one JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct PlanPayload {
    pub summary: SummaryPayload,
    pub cargo: BTreeMap<String, CargoPayload>,
    pub flights: BTreeMap<String, FlightPayload>,
    pub alerts: Vec<AlertPayload>,
    pub events: Vec<DisruptionEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryPayload {
    pub total_margin: f64,
    pub delivered: usize,
    pub rolled: usize,
    pub denied: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CargoPayload {
    pub status: &'static str,
    pub margin: f64,
    pub reason: Option<String>,
    pub origin: String,
    pub destination: String,
    pub priority: &'static str,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub revenue_inr: f64,
    pub route: Vec<LegPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegPayload {
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub dwell_before_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlightPayload {
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub weight_capacity_kg: f64,
    pub volume_capacity_m3: f64,
    pub weight_utilization_pct: f64,
    pub volume_utilization_pct: f64,
    pub assigned: Vec<AssignedCargoPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignedCargoPayload {
    pub cargo_id: String,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub revenue_inr: f64,
    pub priority: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
    pub alert_type: &'static str,
    pub severity: &'static str,
    pub message: String,
    pub cargo_id: Option<String>,
    pub flight_id: Option<String>,
    pub status: Option<&'static str>,
    pub margin_delta: Option<f64>,
}

impl AlertPayload {
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            alert_type: alert.kind.as_str(),
            severity: alert.severity.as_str(),
            message: alert.message.clone(),
            cargo_id: alert.cargo_id.as_ref().map(|c| c.as_str().to_owned()),
            flight_id: alert.flight_id.as_ref().map(|f| f.as_str().to_owned()),
            status: alert.status.map(|s| s.as_str()),
            margin_delta: alert.margin_delta.map(|m| round2(m.value())),
        }
    }
}

impl PlanPayload {
    pub fn build(problem: &Problem, report: &PlanReport) -> Self {
        let (delivered, rolled, denied) = report.scenario.status_counts();
        let summary = SummaryPayload {
            total_margin: round2(report.scenario.total_margin.value()),
            delivered,
            rolled,
            denied,
            total: report.scenario.assignments.len(),
        };

        let mut cargo = BTreeMap::new();
        for (cargo_id, assignment) in &report.scenario.assignments {
            let Some(entity) = problem.cargo().get(cargo_id) else {
                continue;
            };
            let route = assignment
                .route
                .legs
                .iter()
                .map(|leg| LegPayload {
                    flight_id: leg.flight_id.as_str().to_owned(),
                    origin: leg.origin.as_str().to_owned(),
                    destination: leg.destination.as_str().to_owned(),
                    departure: leg.departure.to_rfc3339(),
                    arrival: leg.arrival.to_rfc3339(),
                    dwell_before_minutes: leg.dwell_before_minutes,
                })
                .collect();
            cargo.insert(
                cargo_id.as_str().to_owned(),
                CargoPayload {
                    status: assignment.status.as_str(),
                    margin: round2(assignment.margin.value()),
                    reason: assignment.reason.clone(),
                    origin: entity.origin().as_str().to_owned(),
                    destination: entity.destination().as_str().to_owned(),
                    priority: entity.priority().as_str(),
                    weight_kg: entity.weight().value(),
                    volume_m3: entity.volume().value(),
                    revenue_inr: entity.revenue().value(),
                    route,
                },
            );
        }

        let mut flights = BTreeMap::new();
        for flight in report.flights.iter() {
            let load = report.scenario.flight_loads.get(flight.id());
            let assigned = load
                .map(|l| {
                    l.boarded
                        .iter()
                        .filter_map(|cargo_id| problem.cargo().get(cargo_id))
                        .map(|c| AssignedCargoPayload {
                            cargo_id: c.id().as_str().to_owned(),
                            weight_kg: c.weight().value(),
                            volume_m3: c.volume().value(),
                            revenue_inr: c.revenue().value(),
                            priority: c.priority().as_str(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let weight_util = load
                .map(|l| l.weight.ratio(flight.weight_capacity()) * 100.0)
                .unwrap_or(0.0);
            let volume_util = load
                .map(|l| l.volume.ratio(flight.volume_capacity()) * 100.0)
                .unwrap_or(0.0);
            flights.insert(
                flight.id().as_str().to_owned(),
                FlightPayload {
                    origin: flight.origin().as_str().to_owned(),
                    destination: flight.destination().as_str().to_owned(),
                    departure: flight.departure().to_rfc3339(),
                    arrival: flight.arrival().to_rfc3339(),
                    weight_capacity_kg: flight.weight_capacity().value(),
                    volume_capacity_m3: flight.volume_capacity().value(),
                    weight_utilization_pct: round2(weight_util),
                    volume_utilization_pct: round2(volume_util),
                    assigned,
                },
            );
        }

        Self {
            summary,
            cargo,
            flights,
            alerts: report.alerts.iter().map(AlertPayload::from_alert).collect(),
            events: report.events.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Contents of `plan_summary.json`: totals, per-flight utilization and
/// alert counts.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryFile {
    pub summary: SummarySection,
    pub capacity: Vec<CapacityRow>,
    pub alert_counts: AlertCounts,
    pub alerts: Vec<AlertPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummarySection {
    pub total_margin: f64,
    pub cargo_counts: CargoCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct CargoCounts {
    pub delivered: usize,
    pub rolled: usize,
    pub denied: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityRow {
    pub flight_id: String,
    pub weight_utilization_pct: f64,
    pub volume_utilization_pct: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AlertCounts {
    pub info: usize,
    pub warning: usize,
    pub critical: usize,
}

impl SummaryFile {
    pub fn build(report: &PlanReport) -> Self {
        let (delivered, rolled, denied) = report.scenario.status_counts();

        let capacity = report
            .flights
            .iter()
            .map(|flight| {
                let load = report.scenario.flight_loads.get(flight.id());
                CapacityRow {
                    flight_id: flight.id().as_str().to_owned(),
                    weight_utilization_pct: round2(
                        load.map(|l| l.weight.ratio(flight.weight_capacity()) * 100.0)
                            .unwrap_or(0.0),
                    ),
                    volume_utilization_pct: round2(
                        load.map(|l| l.volume.ratio(flight.volume_capacity()) * 100.0)
                            .unwrap_or(0.0),
                    ),
                }
            })
            .collect();

        let mut counts = AlertCounts::default();
        for alert in &report.alerts {
            match alert.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Critical => counts.critical += 1,
            }
        }

        Self {
            summary: SummarySection {
                total_margin: round2(report.scenario.total_margin.value()),
                cargo_counts: CargoCounts {
                    delivered,
                    rolled,
                    denied,
                    total: report.scenario.assignments.len(),
                },
            },
            capacity,
            alert_counts: counts,
            alerts: report.alerts.iter().map(AlertPayload::from_alert).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::pipeline::run_plan;
    use crate::support::stop::StopToken;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use freightplan_core::prelude::{Money, Volume, Weight};
    use freightplan_model::prelude::{AirportCode, Cargo, CargoId, Flight, FlightId, Priority};
    use freightplan_model::problem::builder::ProblemBuilder;

    fn ts(h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, 0, 0)
            .unwrap()
    }

    fn problem() -> Problem {
        let mut b = ProblemBuilder::new();
        b.add_flight(
            Flight::new(
                FlightId::from_str_id("F1"),
                AirportCode::from_str_id("AAA"),
                AirportCode::from_str_id("BBB"),
                ts(8),
                ts(10),
                Weight::new(10_000.0),
                Volume::new(50.0),
                10.0,
            )
            .unwrap(),
        );
        b.add_flight(
            Flight::new(
                FlightId::from_str_id("F2"),
                AirportCode::from_str_id("BBB"),
                AirportCode::from_str_id("CCC"),
                ts(14),
                ts(16),
                Weight::new(10_000.0),
                Volume::new(50.0),
                10.0,
            )
            .unwrap(),
        );
        b.add_cargo(
            Cargo::new(
                CargoId::from_str_id("C1"),
                AirportCode::from_str_id("AAA"),
                AirportCode::from_str_id("BBB"),
                Weight::new(2_000.0),
                Volume::new(8.0),
                Money::new(100_000.0),
                Priority::Low,
                false,
                24.0,
                ts(6),
                ts(20),
                0.0,
                100.0,
            )
            .unwrap(),
        );
        b.build().unwrap()
    }

    fn report() -> (Problem, PlanReport) {
        let problem = problem();
        let config = PlanConfig {
            population_size: 8,
            generations: 10,
            ..PlanConfig::default()
        };
        let report = run_plan(&problem, &config, &[], &StopToken::new());
        (problem, report)
    }

    #[test]
    fn test_payload_mirrors_plan() {
        let (problem, report) = report();
        let payload = PlanPayload::build(&problem, &report);

        assert_eq!(payload.summary.delivered, 1);
        assert_eq!(payload.summary.total, 1);
        assert_eq!(payload.summary.total_margin, 80_000.0);

        let cargo = &payload.cargo["C1"];
        assert_eq!(cargo.status, "delivered");
        assert_eq!(cargo.route.len(), 1);
        assert_eq!(cargo.route[0].flight_id, "F1");
        assert_eq!(cargo.priority, "low");

        // Both flights are present; the unused one shows zero load.
        let used = &payload.flights["F1"];
        assert_eq!(used.assigned.len(), 1);
        assert_eq!(used.weight_utilization_pct, 20.0);
        let unused = &payload.flights["F2"];
        assert!(unused.assigned.is_empty());
        assert_eq!(unused.weight_utilization_pct, 0.0);
    }

    #[test]
    fn test_payload_serializes_to_json() {
        let (problem, report) = report();
        let json = PlanPayload::build(&problem, &report).to_json_pretty().unwrap();
        assert!(json.contains("\"total_margin\""));
        assert!(json.contains("\"C1\""));
        assert!(json.contains("\"delivered\""));
    }

    #[test]
    fn test_summary_file_counts_alerts() {
        let (_, report) = report();
        let summary = SummaryFile::build(&report);
        assert_eq!(summary.summary.cargo_counts.delivered, 1);
        assert_eq!(summary.capacity.len(), 2);
        let total_alerts =
            summary.alert_counts.info + summary.alert_counts.warning + summary.alert_counts.critical;
        assert_eq!(total_alerts, report.alerts.len());
    }
}
