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

use crate::problem::cargo::CargoManifest;
use crate::problem::flight::FlightSchedule;
use crate::problem::rules::RuleIndex;

/// One planning instance: the flights that will fly, the cargo to place
/// on them and the connection rules between legs. Read-only once built;
/// the disruption engine derives instances with an adjusted schedule.
#[derive(Debug, Clone)]
pub struct Problem {
    flights: FlightSchedule,
    cargo: CargoManifest,
    rules: RuleIndex,
}

impl Problem {
    #[inline]
    pub fn new(flights: FlightSchedule, cargo: CargoManifest, rules: RuleIndex) -> Self {
        Self {
            flights,
            cargo,
            rules,
        }
    }

    #[inline]
    pub fn flights(&self) -> &FlightSchedule {
        &self.flights
    }

    #[inline]
    pub fn cargo(&self) -> &CargoManifest {
        &self.cargo
    }

    #[inline]
    pub fn rules(&self) -> &RuleIndex {
        &self.rules
    }

    /// The same instance planned against a different flight schedule.
    #[inline]
    pub fn with_flights(&self, flights: FlightSchedule) -> Self {
        Self {
            flights,
            cargo: self.cargo.clone(),
            rules: self.rules.clone(),
        }
    }
}
