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

use crate::plan::alert::Alert;
use crate::plan::route::RouteOption;
use crate::problem::cargo::CargoId;
use crate::problem::flight::FlightId;
use freightplan_core::prelude::{Money, Volume, Weight};
use std::collections::BTreeMap;

/// Final fate of a cargo in a plan. *Rolled* means a feasible route
/// existed but lost a capacity contest; *denied* means no feasible route
/// existed (or the denial option was chosen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CargoStatus {
    Delivered,
    Rolled,
    Denied,
}

impl CargoStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoStatus::Delivered => "delivered",
            CargoStatus::Rolled => "rolled",
            CargoStatus::Denied => "denied",
        }
    }
}

impl std::fmt::Display for CargoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome for one cargo: its chosen route, realized margin and,
/// when not delivered, the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoAssignment {
    pub cargo_id: CargoId,
    pub route: RouteOption,
    pub status: CargoStatus,
    pub margin: Money,
    pub reason: Option<String>,
}

/// What one flight actually carries in a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightLoad {
    pub flight_id: FlightId,
    pub boarded: Vec<CargoId>,
    pub weight: Weight,
    pub volume: Volume,
    pub revenue: Money,
    pub over_capacity: bool,
}

/// A complete assignment of every cargo, the per-flight loads, the total
/// margin and the alerts raised while producing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSolution {
    pub assignments: BTreeMap<CargoId, CargoAssignment>,
    pub flight_loads: BTreeMap<FlightId, FlightLoad>,
    pub total_margin: Money,
    pub alerts: Vec<Alert>,
}

impl PlanSolution {
    /// Delivered / rolled / denied counts, in that order.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let mut delivered = 0;
        let mut rolled = 0;
        let mut denied = 0;
        for a in self.assignments.values() {
            match a.status {
                CargoStatus::Delivered => delivered += 1,
                CargoStatus::Rolled => rolled += 1,
                CargoStatus::Denied => denied += 1,
            }
        }
        (delivered, rolled, denied)
    }

    #[inline]
    pub fn delivered_count(&self) -> usize {
        self.status_counts().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    fn assignment(id: &str, status: CargoStatus) -> CargoAssignment {
        CargoAssignment {
            cargo_id: CargoId::from_str_id(id),
            route: RouteOption {
                legs: SmallVec::new(),
                operating_cost: Money::zero(),
                handling_cost: Money::zero(),
                sla_penalty: Money::zero(),
                margin: Money::zero(),
                transit_hours: 0.0,
                on_time: false,
                notes: String::new(),
            },
            status,
            margin: Money::zero(),
            reason: None,
        }
    }

    #[test]
    fn test_status_counts() {
        let mut sol = PlanSolution::default();
        for (id, status) in [
            ("C1", CargoStatus::Delivered),
            ("C2", CargoStatus::Delivered),
            ("C3", CargoStatus::Rolled),
            ("C4", CargoStatus::Denied),
        ] {
            sol.assignments
                .insert(CargoId::from_str_id(id), assignment(id, status));
        }
        assert_eq!(sol.status_counts(), (2, 1, 1));
        assert_eq!(sol.delivered_count(), 2);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(CargoStatus::Delivered.as_str(), "delivered");
        assert_eq!(CargoStatus::Rolled.as_str(), "rolled");
        assert_eq!(CargoStatus::Denied.as_str(), "denied");
    }
}
