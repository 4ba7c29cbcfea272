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

use freightplan_model::prelude::{Alert, FlightSchedule, PlanSolution, Problem};
use std::io::Write;

/// `plan_routes.csv`: one row per cargo, in ascending cargo order.
pub fn write_plan_routes<W: Write>(
    w: W,
    problem: &Problem,
    solution: &PlanSolution,
) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(w);
    out.write_record([
        "cargo_id",
        "status",
        "reason",
        "flight_sequence",
        "etds",
        "etas",
        "total_cost",
        "revenue",
        "margin",
        "transit_hours",
        "sla_penalty",
        "handling_penalty",
        "notes",
    ])?;

    for (cargo_id, assignment) in &solution.assignments {
        let route = &assignment.route;
        let revenue = problem
            .cargo()
            .get(cargo_id)
            .map(|c| c.revenue().value())
            .unwrap_or(0.0);
        let etds: Vec<String> = route.legs.iter().map(|l| l.departure.to_rfc3339()).collect();
        let etas: Vec<String> = route.legs.iter().map(|l| l.arrival.to_rfc3339()).collect();
        out.write_record([
            cargo_id.as_str().to_owned(),
            assignment.status.as_str().to_owned(),
            assignment.reason.clone().unwrap_or_default(),
            route.flight_sequence(),
            etds.join("|"),
            etas.join("|"),
            format!("{:.2}", route.total_cost().value()),
            format!("{:.2}", revenue),
            format!("{:.2}", assignment.margin.value()),
            format!("{:.2}", route.transit_hours),
            format!("{:.2}", route.sla_penalty.value()),
            format!("{:.2}", route.handling_cost.value()),
            route.notes.clone(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// `flight_loads.csv`: one row per flight in departure order, including
/// unused flights with zero load.
pub fn write_flight_loads<W: Write>(
    w: W,
    flights: &FlightSchedule,
    solution: &PlanSolution,
) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(w);
    out.write_record([
        "flight_id",
        "origin",
        "destination",
        "scheduled_departure",
        "scheduled_arrival",
        "weight_capacity_kg",
        "volume_capacity_m3",
        "assigned_cargo",
        "total_weight",
        "total_volume",
        "weight_utilization_pct",
        "volume_utilization_pct",
        "revenue_sum",
    ])?;

    for flight in flights.departure_order() {
        let load = solution.flight_loads.get(flight.id());
        let assigned = load
            .map(|l| {
                l.boarded
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        let weight = load.map(|l| l.weight.value()).unwrap_or(0.0);
        let volume = load.map(|l| l.volume.value()).unwrap_or(0.0);
        let revenue = load.map(|l| l.revenue.value()).unwrap_or(0.0);
        out.write_record([
            flight.id().as_str().to_owned(),
            flight.origin().as_str().to_owned(),
            flight.destination().as_str().to_owned(),
            flight.departure().to_rfc3339(),
            flight.arrival().to_rfc3339(),
            format!("{:.2}", flight.weight_capacity().value()),
            format!("{:.2}", flight.volume_capacity().value()),
            assigned,
            format!("{:.2}", weight),
            format!("{:.2}", volume),
            format!("{:.2}", weight / flight.weight_capacity().value() * 100.0),
            format!("{:.2}", volume / flight.volume_capacity().value() * 100.0),
            format!("{:.2}", revenue),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// `alerts.csv`: the alert stream in emission order.
pub fn write_alerts<W: Write>(w: W, alerts: &[Alert]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(w);
    out.write_record([
        "alert_type",
        "severity",
        "message",
        "cargo_id",
        "flight_id",
        "status",
        "margin_delta",
    ])?;

    for alert in alerts {
        out.write_record([
            alert.kind.as_str().to_owned(),
            alert.severity.as_str().to_owned(),
            alert.message.clone(),
            alert
                .cargo_id
                .as_ref()
                .map(|c| c.as_str().to_owned())
                .unwrap_or_default(),
            alert
                .flight_id
                .as_ref()
                .map(|f| f.as_str().to_owned())
                .unwrap_or_default(),
            alert.status.map(|s| s.as_str().to_owned()).unwrap_or_default(),
            alert
                .margin_delta
                .map(|m| format!("{:.2}", m.value()))
                .unwrap_or_default(),
        ])?;
    }
    out.flush()?;
    Ok(())
}
