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
use crate::disruption::{apply_events, diff_plans, DisruptionEvent};
use crate::ga::engine::GaEngine;
use crate::routing::catalog::RouteCatalog;
use crate::sim::SimContext;
use crate::support::rng::scenario_seed;
use crate::support::stop::{Deadline, StopToken};
use freightplan_model::prelude::{
    Alert, AlertKind, CargoStatus, FlightSchedule, PlanSolution, Problem, Severity,
};

/// Everything one planning run produced: the baseline plan, the
/// post-disruption plan (identical to the baseline when no events were
/// given), the schedule the final plan was made against, and the full
/// alert stream for the output files.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub baseline: PlanSolution,
    pub scenario: PlanSolution,
    pub flights: FlightSchedule,
    pub events: Vec<DisruptionEvent>,
    pub alerts: Vec<Alert>,
    pub generations_run: usize,
    pub timed_out: bool,
}

/// Runs the whole pipeline: enumerate routes, search, and when events
/// are present, mutate the schedule, re-optimize with the derived
/// scenario seed and diff the plans. Optimization never fails; every
/// well-formed input yields a complete report.
pub fn run_plan(
    problem: &Problem,
    config: &PlanConfig,
    events: &[DisruptionEvent],
    stop: &StopToken,
) -> PlanReport {
    let catalog = RouteCatalog::build(problem, config.max_legs, config.denial_factor);
    let ctx = SimContext::new(problem, &catalog, config);
    let baseline_run = GaEngine::new(&ctx).run(
        config.seed,
        stop,
        Deadline::from_budget_ms(config.optimization_budget_ms),
    );
    tracing::info!(
        generations = baseline_run.generations_run,
        total_margin = baseline_run.best.solution.total_margin.value(),
        delivered = baseline_run.best.solution.delivered_count(),
        "baseline optimization finished"
    );

    let baseline = baseline_run.best.solution;
    let mut timed_out = baseline_run.timed_out;
    let mut generations_run = baseline_run.generations_run;

    let (scenario, flights, disruption_alerts) = if events.is_empty() {
        (baseline.clone(), problem.flights().clone(), Vec::new())
    } else {
        let (adjusted, mut event_alerts) = apply_events(problem.flights(), events);
        let scenario_problem = problem.with_flights(adjusted.clone());
        let scenario_catalog =
            RouteCatalog::build(&scenario_problem, config.max_legs, config.denial_factor);
        let scenario_ctx = SimContext::new(&scenario_problem, &scenario_catalog, config);
        let scenario_run = GaEngine::new(&scenario_ctx).run(
            scenario_seed(config.seed),
            stop,
            Deadline::from_budget_ms(config.optimization_budget_ms),
        );
        tracing::info!(
            events = events.len(),
            generations = scenario_run.generations_run,
            total_margin = scenario_run.best.solution.total_margin.value(),
            "disruption re-optimization finished"
        );
        timed_out |= scenario_run.timed_out;
        generations_run = scenario_run.generations_run;

        let scenario = scenario_run.best.solution;
        event_alerts.extend(diff_plans(
            &baseline,
            &scenario,
            &config.disruption_margin_threshold,
        ));
        (scenario, adjusted, event_alerts)
    };

    let mut alerts = scenario.alerts.clone();
    if timed_out {
        alerts.push(Alert::new(
            AlertKind::PartialOptimization,
            Severity::Info,
            "optimization budget exhausted, returning best plan found so far",
        ));
    }
    alerts.extend(baseline_exceptions(&scenario));
    alerts.extend(disruption_alerts);

    PlanReport {
        baseline,
        scenario,
        flights,
        events: events.to_vec(),
        alerts,
        generations_run,
        timed_out,
    }
}

/// One warning per cargo the final plan does not deliver.
fn baseline_exceptions(solution: &PlanSolution) -> Vec<Alert> {
    solution
        .assignments
        .values()
        .filter(|a| a.status != CargoStatus::Delivered)
        .map(|a| {
            let message = a
                .reason
                .clone()
                .unwrap_or_else(|| format!("Cargo {} not delivered", a.cargo_id.as_str()));
            Alert::new(AlertKind::BaselineException, Severity::Warning, message)
                .with_cargo(a.cargo_id.clone())
                .with_status(a.status)
        })
        .collect()
}
