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

pub mod catalog;
pub mod enumerate;
pub mod score;

use freightplan_model::prelude::{AirportCode, Flight, FlightSchedule};
use std::collections::HashMap;

/// Flights grouped by departure airport, each group in ascending
/// (departure, id) order so route enumeration visits them
/// deterministically.
#[derive(Debug, Clone)]
pub struct FlightsByOrigin<'a> {
    groups: HashMap<&'a AirportCode, Vec<&'a Flight>>,
}

impl<'a> FlightsByOrigin<'a> {
    pub fn build(schedule: &'a FlightSchedule) -> Self {
        let mut groups: HashMap<&'a AirportCode, Vec<&'a Flight>> = HashMap::new();
        for flight in schedule.iter() {
            groups.entry(flight.origin()).or_default().push(flight);
        }
        for list in groups.values_mut() {
            list.sort_by(|a, b| a.departure().cmp(&b.departure()).then_with(|| a.id().cmp(b.id())));
        }
        Self { groups }
    }

    #[inline]
    pub fn departing(&self, airport: &AirportCode) -> &[&'a Flight] {
        self.groups.get(airport).map(Vec::as_slice).unwrap_or(&[])
    }
}
