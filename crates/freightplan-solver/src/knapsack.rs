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

use crate::config::KnapsackWeights;
use freightplan_core::prelude::{band_score, Money, Volume, Weight};
use freightplan_model::prelude::{Alert, AlertKind, CargoId, Flight, FlightId, Priority, Severity};

/// Above this many low-priority candidates the subset search switches
/// from exhaustive enumeration to greedy construction with 2-opt
/// improvement.
pub const EXHAUSTIVE_LIMIT: usize = 12;

/// Utilization band the subset score rewards.
const BAND_LO: f64 = 0.6;
const BAND_HI: f64 = 0.9;

const TWO_OPT_MAX_ROUNDS: usize = 64;

/// One cargo contending for a flight, with the per-flight figures the
/// selector scores on.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightCandidate {
    pub cargo_id: CargoId,
    pub weight: Weight,
    pub volume: Volume,
    pub revenue: Money,
    pub revenue_density: f64,
    pub priority: Priority,
    pub dwell_hours: f64,
}

/// What the selector decided for one flight. `boarded` and `bumped`
/// partition the candidates; both are in ascending cargo-id order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightSelection {
    pub flight_id: FlightId,
    pub boarded: Vec<CargoId>,
    pub bumped: Vec<CargoId>,
    pub weight: Weight,
    pub volume: Volume,
    pub revenue: Money,
    pub over_capacity: bool,
    pub alerts: Vec<Alert>,
}

/// Chooses what boards `flight` out of `candidates`.
///
/// Guaranteed-tier cargo (high and medium) is reserved first. When the
/// reservation fits both axes, the remaining capacity is filled with
/// the low-priority subset maximizing the weighted score of revenue
/// density, priority weight, utilization band and dwell. When the
/// reservation itself oversubscribes the flight, the emergency override
/// boards the whole guaranteed tier anyway, raises a critical capacity
/// breach alert and bumps every low candidate.
///
/// Identical inputs give identical output; every tie breaks on
/// ascending cargo identifier.
pub fn select(
    flight: &Flight,
    candidates: &[FlightCandidate],
    weights: &KnapsackWeights,
) -> FlightSelection {
    let mut ordered: Vec<&FlightCandidate> = candidates.iter().collect();
    ordered.sort_by(|a, b| a.cargo_id.cmp(&b.cargo_id));

    let guaranteed: Vec<&FlightCandidate> = ordered
        .iter()
        .copied()
        .filter(|c| c.priority.is_guaranteed())
        .collect();
    let low: Vec<&FlightCandidate> = ordered
        .iter()
        .copied()
        .filter(|c| !c.priority.is_guaranteed())
        .collect();

    let reserved_weight: Weight = guaranteed.iter().map(|c| c.weight).sum();
    let reserved_volume: Volume = guaranteed.iter().map(|c| c.volume).sum();

    let fits = reserved_weight <= flight.weight_capacity()
        && reserved_volume <= flight.volume_capacity();

    if fits {
        let chosen = choose_low_subset(flight, &low, reserved_weight, reserved_volume, weights);
        let mut boarded: Vec<&FlightCandidate> = guaranteed.clone();
        let mut bumped: Vec<&FlightCandidate> = Vec::new();
        for (i, &candidate) in low.iter().enumerate() {
            if chosen[i] {
                boarded.push(candidate);
            } else {
                bumped.push(candidate);
            }
        }
        boarded.sort_by(|a, b| a.cargo_id.cmp(&b.cargo_id));
        return finish(flight, boarded, bumped, false, Vec::new());
    }

    // Emergency override: the guaranteed tier boards even over capacity
    // so the delivery guarantee holds; everything else is bumped.
    let alert = Alert::new(
        AlertKind::CapacityBreach,
        Severity::Critical,
        format!(
            "Emergency override on flight {}: guaranteed load {:.0} kg / {:.1} m3 exceeds capacity {:.0} kg / {:.1} m3",
            flight.id().as_str(),
            reserved_weight.value(),
            reserved_volume.value(),
            flight.weight_capacity().value(),
            flight.volume_capacity().value(),
        ),
    )
    .with_flight(flight.id().clone());

    finish(flight, guaranteed, low, true, vec![alert])
}

fn finish(
    flight: &Flight,
    boarded: Vec<&FlightCandidate>,
    bumped: Vec<&FlightCandidate>,
    over_capacity: bool,
    alerts: Vec<Alert>,
) -> FlightSelection {
    FlightSelection {
        flight_id: flight.id().clone(),
        weight: boarded.iter().map(|c| c.weight).sum(),
        volume: boarded.iter().map(|c| c.volume).sum(),
        revenue: boarded.iter().map(|c| c.revenue).sum(),
        boarded: boarded.iter().map(|c| c.cargo_id.clone()).collect(),
        bumped: bumped.iter().map(|c| c.cargo_id.clone()).collect(),
        over_capacity,
        alerts,
    }
}

/// Picks the low-priority subset. Returns a selection mask parallel to
/// `low`.
fn choose_low_subset(
    flight: &Flight,
    low: &[&FlightCandidate],
    base_weight: Weight,
    base_volume: Volume,
    weights: &KnapsackWeights,
) -> Vec<bool> {
    if low.is_empty() {
        return Vec::new();
    }
    if low.len() <= EXHAUSTIVE_LIMIT {
        exhaustive_subset(flight, low, base_weight, base_volume, weights)
    } else {
        greedy_subset(flight, low, base_weight, base_volume, weights)
    }
}

fn subset_score(
    flight: &Flight,
    low: &[&FlightCandidate],
    mask: &[bool],
    base_weight: Weight,
    base_volume: Volume,
    weights: &KnapsackWeights,
) -> f64 {
    let mut density = 0.0;
    let mut priority = 0.0;
    let mut dwell = 0.0;
    let mut total_weight = base_weight;
    let mut total_volume = base_volume;
    for (i, candidate) in low.iter().enumerate() {
        if mask[i] {
            density += candidate.revenue_density;
            priority += candidate.priority.score();
            dwell += candidate.dwell_hours;
            total_weight += candidate.weight;
            total_volume += candidate.volume;
        }
    }
    // Band on whichever axis is tighter, i.e. the more utilized one.
    let utilization = total_weight
        .ratio(flight.weight_capacity())
        .max(total_volume.ratio(flight.volume_capacity()));
    weights.revenue_density * density + weights.priority * priority
        + weights.utilization * band_score(utilization, BAND_LO, BAND_HI)
        - weights.dwell * dwell
}

fn mask_fits(
    flight: &Flight,
    low: &[&FlightCandidate],
    mask: &[bool],
    base_weight: Weight,
    base_volume: Volume,
) -> bool {
    let mut w = base_weight;
    let mut v = base_volume;
    for (i, candidate) in low.iter().enumerate() {
        if mask[i] {
            w += candidate.weight;
            v += candidate.volume;
        }
    }
    w <= flight.weight_capacity() && v <= flight.volume_capacity()
}

fn exhaustive_subset(
    flight: &Flight,
    low: &[&FlightCandidate],
    base_weight: Weight,
    base_volume: Volume,
    weights: &KnapsackWeights,
) -> Vec<bool> {
    let n = low.len();
    let mut best_mask = vec![false; n];
    let mut best_score = subset_score(flight, low, &best_mask, base_weight, base_volume, weights);

    let mut mask = vec![false; n];
    for bits in 1u32..(1u32 << n) {
        for (i, slot) in mask.iter_mut().enumerate() {
            *slot = bits & (1 << i) != 0;
        }
        if !mask_fits(flight, low, &mask, base_weight, base_volume) {
            continue;
        }
        let score = subset_score(flight, low, &mask, base_weight, base_volume, weights);
        if score > best_score {
            best_score = score;
            best_mask.copy_from_slice(&mask);
        }
    }
    best_mask
}

fn greedy_subset(
    flight: &Flight,
    low: &[&FlightCandidate],
    base_weight: Weight,
    base_volume: Volume,
    weights: &KnapsackWeights,
) -> Vec<bool> {
    let n = low.len();
    let mut mask = vec![false; n];

    // Candidates are id-ordered; a stable sort by descending density
    // keeps the id order on ties.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| low[b].revenue_density.total_cmp(&low[a].revenue_density));

    fill_greedy(flight, low, &mut mask, &order, base_weight, base_volume);
    let mut score = subset_score(flight, low, &mask, base_weight, base_volume, weights);

    // 2-opt: swap one selected against one unselected while the score
    // improves, refilling after each accepted swap.
    for _ in 0..TWO_OPT_MAX_ROUNDS {
        let mut improved = false;
        'swaps: for i in 0..n {
            if !mask[i] {
                continue;
            }
            for j in 0..n {
                if mask[j] {
                    continue;
                }
                let mut trial = mask.clone();
                trial[i] = false;
                trial[j] = true;
                if !mask_fits(flight, low, &trial, base_weight, base_volume) {
                    continue;
                }
                fill_greedy(flight, low, &mut trial, &order, base_weight, base_volume);
                let trial_score =
                    subset_score(flight, low, &trial, base_weight, base_volume, weights);
                if trial_score > score {
                    score = trial_score;
                    mask.copy_from_slice(&trial);
                    improved = true;
                    break 'swaps;
                }
            }
        }
        if !improved {
            break;
        }
    }
    mask
}

fn fill_greedy(
    flight: &Flight,
    low: &[&FlightCandidate],
    mask: &mut [bool],
    order: &[usize],
    base_weight: Weight,
    base_volume: Volume,
) {
    let mut w = base_weight;
    let mut v = base_volume;
    for (i, candidate) in low.iter().enumerate() {
        if mask[i] {
            w += candidate.weight;
            v += candidate.volume;
        }
    }
    for &i in order {
        if mask[i] {
            continue;
        }
        let candidate = low[i];
        if w + candidate.weight <= flight.weight_capacity()
            && v + candidate.volume <= flight.volume_capacity()
        {
            mask[i] = true;
            w += candidate.weight;
            v += candidate.volume;
        }
    }
}
