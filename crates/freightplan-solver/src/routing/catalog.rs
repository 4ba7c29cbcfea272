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

use crate::routing::enumerate::RouteEnumerator;
use crate::routing::FlightsByOrigin;
use freightplan_model::prelude::{CargoId, Problem, RouteOption};

/// The per-run arena of route options. Options live here for the whole
/// pipeline; individuals reference them as (cargo position, option
/// index) pairs, so genes are plain integers. Cargo positions follow
/// identifier order and are stable across runs with equal input.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    cargo_ids: Vec<CargoId>,
    options: Vec<Vec<RouteOption>>,
    on_time: Vec<Vec<usize>>,
}

impl RouteCatalog {
    pub fn build(problem: &Problem, max_legs: usize, denial_factor: f64) -> Self {
        let by_origin = FlightsByOrigin::build(problem.flights());
        let enumerator = RouteEnumerator::new(&by_origin, problem.rules(), max_legs, denial_factor);

        let mut cargo_ids = Vec::with_capacity(problem.cargo().len());
        let mut options = Vec::with_capacity(problem.cargo().len());
        let mut on_time = Vec::with_capacity(problem.cargo().len());

        for cargo in problem.cargo().iter() {
            let routes = enumerator.enumerate(cargo);
            let on_time_indices: Vec<usize> = routes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.on_time)
                .map(|(i, _)| i)
                .collect();
            cargo_ids.push(cargo.id().clone());
            options.push(routes);
            on_time.push(on_time_indices);
        }

        Self {
            cargo_ids,
            options,
            on_time,
        }
    }

    #[inline]
    pub fn cargo_count(&self) -> usize {
        self.cargo_ids.len()
    }

    #[inline]
    pub fn cargo_ids(&self) -> &[CargoId] {
        &self.cargo_ids
    }

    #[inline]
    pub fn options_for(&self, cargo_index: usize) -> &[RouteOption] {
        &self.options[cargo_index]
    }

    #[inline]
    pub fn on_time_indices(&self, cargo_index: usize) -> &[usize] {
        &self.on_time[cargo_index]
    }

    /// Resolves a gene to its route option. Genes wrap modulo the option
    /// count, so any integer is a valid choice.
    #[inline]
    pub fn route(&self, cargo_index: usize, gene: usize) -> &RouteOption {
        let opts = &self.options[cargo_index];
        &opts[gene % opts.len()]
    }
}
