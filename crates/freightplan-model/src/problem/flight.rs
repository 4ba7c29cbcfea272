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

use crate::common::{Identifier, IdentifierMarkerName};
use chrono::{DateTime, Duration, FixedOffset};
use freightplan_core::prelude::{Volume, Weight};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlightIdMarker;

impl IdentifierMarkerName for FlightIdMarker {
    const NAME: &'static str = "FlightId";
}

pub type FlightId = Identifier<String, FlightIdMarker>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportMarker;

impl IdentifierMarkerName for AirportMarker {
    const NAME: &'static str = "Airport";
}

pub type AirportCode = Identifier<String, AirportMarker>;

#[derive(Debug, Clone, PartialEq)]
pub enum FlightError {
    ArrivalNotAfterDeparture { id: FlightId },
    NonPositiveCapacity { id: FlightId, field: &'static str },
    NegativeCost { id: FlightId },
    SameOriginDestination { id: FlightId },
}

impl std::fmt::Display for FlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightError::ArrivalNotAfterDeparture { id } => {
                write!(f, "Flight {} must arrive after it departs", id)
            }
            FlightError::NonPositiveCapacity { id, field } => {
                write!(f, "Flight {} has a non-positive {}", id, field)
            }
            FlightError::NegativeCost { id } => {
                write!(f, "Flight {} has a negative operating cost", id)
            }
            FlightError::SameOriginDestination { id } => {
                write!(f, "Flight {} departs and arrives at the same airport", id)
            }
        }
    }
}

impl std::error::Error for FlightError {}

/// A scheduled flight leg with fixed capacities and a per-kg operating
/// cost. Immutable once built; disruptions produce adjusted copies via
/// [`Flight::delayed_by`] and [`Flight::with_capacities`].
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    id: FlightId,
    origin: AirportCode,
    destination: AirportCode,
    departure: DateTime<FixedOffset>,
    arrival: DateTime<FixedOffset>,
    weight_capacity: Weight,
    volume_capacity: Volume,
    cost_per_kg: f64,
}

impl Flight {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FlightId,
        origin: AirportCode,
        destination: AirportCode,
        departure: DateTime<FixedOffset>,
        arrival: DateTime<FixedOffset>,
        weight_capacity: Weight,
        volume_capacity: Volume,
        cost_per_kg: f64,
    ) -> Result<Self, FlightError> {
        if arrival <= departure {
            return Err(FlightError::ArrivalNotAfterDeparture { id });
        }
        if origin == destination {
            return Err(FlightError::SameOriginDestination { id });
        }
        if weight_capacity.value() <= 0.0 {
            return Err(FlightError::NonPositiveCapacity {
                id,
                field: "weight capacity",
            });
        }
        if volume_capacity.value() <= 0.0 {
            return Err(FlightError::NonPositiveCapacity {
                id,
                field: "volume capacity",
            });
        }
        if cost_per_kg < 0.0 {
            return Err(FlightError::NegativeCost { id });
        }
        Ok(Self {
            id,
            origin,
            destination,
            departure,
            arrival,
            weight_capacity,
            volume_capacity,
            cost_per_kg,
        })
    }

    #[inline]
    pub fn id(&self) -> &FlightId {
        &self.id
    }

    #[inline]
    pub fn origin(&self) -> &AirportCode {
        &self.origin
    }

    #[inline]
    pub fn destination(&self) -> &AirportCode {
        &self.destination
    }

    #[inline]
    pub fn departure(&self) -> DateTime<FixedOffset> {
        self.departure
    }

    #[inline]
    pub fn arrival(&self) -> DateTime<FixedOffset> {
        self.arrival
    }

    #[inline]
    pub fn weight_capacity(&self) -> Weight {
        self.weight_capacity
    }

    #[inline]
    pub fn volume_capacity(&self) -> Volume {
        self.volume_capacity
    }

    #[inline]
    pub fn cost_per_kg(&self) -> f64 {
        self.cost_per_kg
    }

    /// The same flight shifted by a positive number of minutes.
    pub fn delayed_by(&self, minutes: i64) -> Self {
        let delta = Duration::minutes(minutes);
        Self {
            departure: self.departure + delta,
            arrival: self.arrival + delta,
            ..self.clone()
        }
    }

    /// The same flight with replaced capacities; `None` keeps the
    /// current value.
    pub fn with_capacities(&self, weight: Option<Weight>, volume: Option<Volume>) -> Self {
        Self {
            weight_capacity: weight.unwrap_or(self.weight_capacity),
            volume_capacity: volume.unwrap_or(self.volume_capacity),
            ..self.clone()
        }
    }
}

/// All flights of a run, keyed by identifier. Iteration order is the
/// identifier order, which keeps every downstream walk deterministic.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightSchedule(BTreeMap<FlightId, Flight>);

impl FlightSchedule {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, flight: Flight) -> Option<Flight> {
        self.0.insert(flight.id().clone(), flight)
    }

    #[inline]
    pub fn remove(&mut self, id: &FlightId) -> Option<Flight> {
        self.0.remove(id)
    }

    #[inline]
    pub fn get(&self, id: &FlightId) -> Option<&Flight> {
        self.0.get(id)
    }

    #[inline]
    pub fn contains_id(&self, id: &FlightId) -> bool {
        self.0.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.0.values()
    }

    /// Flights in ascending departure order; equal departures break by
    /// flight identifier.
    pub fn departure_order(&self) -> Vec<&Flight> {
        let mut out: Vec<&Flight> = self.0.values().collect();
        out.sort_by(|a, b| a.departure().cmp(&b.departure()).then_with(|| a.id().cmp(b.id())));
        out
    }
}

impl FromIterator<Flight> for FlightSchedule {
    fn from_iter<I: IntoIterator<Item = Flight>>(iter: I) -> Self {
        let mut s = Self::new();
        for f in iter {
            s.insert(f);
        }
        s
    }
}
