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

use crate::config::PlanConfig;
use crate::knapsack::{self, FlightCandidate};
use crate::routing::catalog::RouteCatalog;
use freightplan_core::prelude::Money;
use freightplan_model::prelude::{
    Alert, AlertKind, Cargo, CargoAssignment, CargoStatus, Flight, FlightLoad, PlanSolution,
    Problem, Severity,
};
use std::collections::BTreeMap;

/// Small per-leg fitness deduction so equal-margin plans tie-break
/// toward fewer legs.
pub const COMPLEXITY_PENALTY_PER_LEG: f64 = 1.0;

/// One simulated plan plus the GA's view of it.
#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub solution: PlanSolution,
    pub fitness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimStatus {
    Pending,
    Delivered,
    Rolled,
    Denied,
}

/// Read-only context shared by every fitness evaluation of a run. Safe
/// to use from parallel workers; each simulation owns its scratch
/// state.
#[derive(Debug)]
pub struct SimContext<'a> {
    problem: &'a Problem,
    catalog: &'a RouteCatalog,
    config: &'a PlanConfig,
    cargos: Vec<&'a Cargo>,
    flight_order: Vec<&'a Flight>,
}

impl<'a> SimContext<'a> {
    pub fn new(problem: &'a Problem, catalog: &'a RouteCatalog, config: &'a PlanConfig) -> Self {
        let cargos: Vec<&'a Cargo> = problem.cargo().iter().collect();
        debug_assert!(
            cargos
                .iter()
                .zip(catalog.cargo_ids())
                .all(|(c, id)| c.id() == id),
            "catalog order must match the manifest order"
        );
        Self {
            problem,
            catalog,
            config,
            cargos,
            flight_order: problem.flights().departure_order(),
        }
    }

    #[inline]
    pub fn catalog(&self) -> &'a RouteCatalog {
        self.catalog
    }

    #[inline]
    pub fn config(&self) -> &'a PlanConfig {
        self.config
    }

    #[inline]
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Walks the schedule in departure order, letting the selector
    /// arbitrate each flight. Losers are rolled immediately and vacate
    /// their later legs; nothing downstream is re-optimized.
    pub fn simulate(&self, genes: &[usize]) -> SimOutcome {
        assert_eq!(genes.len(), self.catalog.cargo_count());

        let n = genes.len();
        let mut routes = Vec::with_capacity(n);
        let mut status = vec![SimStatus::Pending; n];
        let mut next_leg = vec![0usize; n];
        let mut reasons: Vec<Option<String>> = vec![None; n];
        let mut alerts: Vec<Alert> = Vec::new();

        for (i, &gene) in genes.iter().enumerate() {
            let route = self.catalog.route(i, gene);
            if route.is_denied() {
                status[i] = SimStatus::Denied;
                reasons[i] = Some(route.notes.clone());
            }
            routes.push(route);
        }

        let mut flight_loads: BTreeMap<_, FlightLoad> = BTreeMap::new();

        for &flight in &self.flight_order {
            let mut waitlist: Vec<usize> = Vec::new();
            for i in 0..n {
                if status[i] != SimStatus::Pending {
                    continue;
                }
                let legs = &routes[i].legs;
                if next_leg[i] < legs.len() && &legs[next_leg[i]].flight_id == flight.id() {
                    waitlist.push(i);
                }
            }
            if waitlist.is_empty() {
                continue;
            }

            let candidates: Vec<FlightCandidate> = waitlist
                .iter()
                .map(|&i| {
                    let cargo = self.cargos[i];
                    FlightCandidate {
                        cargo_id: cargo.id().clone(),
                        weight: cargo.weight(),
                        volume: cargo.volume(),
                        revenue: cargo.revenue(),
                        revenue_density: cargo.revenue_density(),
                        priority: cargo.priority(),
                        dwell_hours: routes[i].legs[next_leg[i]].dwell_before_minutes as f64 / 60.0,
                    }
                })
                .collect();

            let selection =
                knapsack::select(flight, &candidates, &self.config.knapsack_weights);
            alerts.extend(selection.alerts.iter().cloned());

            for &i in &waitlist {
                let cargo_id = self.cargos[i].id();
                if selection.boarded.binary_search(cargo_id).is_ok() {
                    next_leg[i] += 1;
                    if next_leg[i] == routes[i].legs.len() {
                        status[i] = SimStatus::Delivered;
                    }
                } else {
                    status[i] = SimStatus::Rolled;
                    reasons[i] = Some(format!(
                        "lost capacity contention on flight {}",
                        flight.id().as_str()
                    ));
                }
            }

            flight_loads.insert(
                flight.id().clone(),
                FlightLoad {
                    flight_id: selection.flight_id,
                    boarded: selection.boarded,
                    weight: selection.weight,
                    volume: selection.volume,
                    revenue: selection.revenue,
                    over_capacity: selection.over_capacity,
                },
            );
        }

        // A pending cargo here means its remaining legs never flew.
        for i in 0..n {
            if status[i] == SimStatus::Pending {
                status[i] = SimStatus::Rolled;
                reasons[i] = Some("itinerary incomplete".to_owned());
            }
        }

        let mut assignments = BTreeMap::new();
        let mut total_margin = Money::zero();
        let mut total_legs = 0usize;

        for i in 0..n {
            let cargo = self.cargos[i];
            total_legs += routes[i].legs.len();
            let (final_status, margin) = match status[i] {
                SimStatus::Delivered => (CargoStatus::Delivered, routes[i].margin),
                SimStatus::Denied => (CargoStatus::Denied, routes[i].margin),
                SimStatus::Rolled => (
                    CargoStatus::Rolled,
                    -(cargo.revenue() * self.config.denial_factor),
                ),
                SimStatus::Pending => unreachable!("pending resolved above"),
            };
            total_margin += margin;

            if cargo.priority().is_guaranteed() && final_status != CargoStatus::Delivered {
                let reason = reasons[i].as_deref().unwrap_or("undelivered");
                alerts.push(
                    Alert::new(
                        AlertKind::PriorityGuaranteeViolation,
                        Severity::Critical,
                        format!(
                            "Cargo {} ({} priority) could not be delivered: {}",
                            cargo.id().as_str(),
                            cargo.priority(),
                            reason
                        ),
                    )
                    .with_cargo(cargo.id().clone())
                    .with_status(final_status),
                );
            }

            assignments.insert(
                cargo.id().clone(),
                CargoAssignment {
                    cargo_id: cargo.id().clone(),
                    route: routes[i].clone(),
                    status: final_status,
                    margin,
                    reason: reasons[i].clone(),
                },
            );
        }

        let fitness = total_margin.value() - COMPLEXITY_PENALTY_PER_LEG * total_legs as f64;
        SimOutcome {
            solution: PlanSolution {
                assignments,
                flight_loads,
                total_margin,
                alerts,
            },
            fitness,
        }
    }
}
