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
use crate::problem::flight::AirportCode;
use chrono::{DateTime, FixedOffset};
use freightplan_core::prelude::{Money, Volume, Weight};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CargoIdMarker;

impl IdentifierMarkerName for CargoIdMarker {
    const NAME: &'static str = "CargoId";
}

pub type CargoId = Identifier<String, CargoIdMarker>;

const REVENUE_DENSITY_EPSILON: f64 = 1e-6;

/// Commercial priority tier of a shipment. High and medium tiers carry a
/// delivery guarantee; low tier competes on value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Scoring weight used by the selector (3/2/1).
    #[inline]
    pub fn score(&self) -> f64 {
        match self {
            Priority::High => 3.0,
            Priority::Medium => 2.0,
            Priority::Low => 1.0,
        }
    }

    /// Whether this tier is covered by the delivery guarantee.
    #[inline]
    pub fn is_guaranteed(&self) -> bool {
        !matches!(self, Priority::Low)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePriorityError {
    value: String,
}

impl ParsePriorityError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for ParsePriorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a priority (expected high, medium or low)",
            self.value
        )
    }
}

impl std::error::Error for ParsePriorityError {}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ParsePriorityError {
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CargoError {
    SameOriginDestination { id: CargoId },
    DueNotAfterReady { id: CargoId },
    NonPositive { id: CargoId, field: &'static str },
    NegativeRate { id: CargoId, field: &'static str },
}

impl std::fmt::Display for CargoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CargoError::SameOriginDestination { id } => {
                write!(f, "Cargo {} has identical origin and destination", id)
            }
            CargoError::DueNotAfterReady { id } => {
                write!(f, "Cargo {} must be due after its ready time", id)
            }
            CargoError::NonPositive { id, field } => {
                write!(f, "Cargo {} has a non-positive {}", id, field)
            }
            CargoError::NegativeRate { id, field } => {
                write!(f, "Cargo {} has a negative {}", id, field)
            }
        }
    }
}

impl std::error::Error for CargoError {}

/// A shipment to plan: physical size, commercial value, timing
/// constraints and the cost rates its route will be scored with.
#[derive(Debug, Clone, PartialEq)]
pub struct Cargo {
    id: CargoId,
    origin: AirportCode,
    destination: AirportCode,
    weight: Weight,
    volume: Volume,
    revenue: Money,
    priority: Priority,
    perishable: bool,
    max_transit_hours: f64,
    ready_time: DateTime<FixedOffset>,
    due_by: DateTime<FixedOffset>,
    handling_cost_per_kg: f64,
    sla_penalty_per_hour: f64,
}

impl Cargo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CargoId,
        origin: AirportCode,
        destination: AirportCode,
        weight: Weight,
        volume: Volume,
        revenue: Money,
        priority: Priority,
        perishable: bool,
        max_transit_hours: f64,
        ready_time: DateTime<FixedOffset>,
        due_by: DateTime<FixedOffset>,
        handling_cost_per_kg: f64,
        sla_penalty_per_hour: f64,
    ) -> Result<Self, CargoError> {
        if origin == destination {
            return Err(CargoError::SameOriginDestination { id });
        }
        if due_by <= ready_time {
            return Err(CargoError::DueNotAfterReady { id });
        }
        for (field, value) in [
            ("weight", weight.value()),
            ("volume", volume.value()),
            ("revenue", revenue.value()),
            ("max transit limit", max_transit_hours),
        ] {
            if value <= 0.0 {
                return Err(CargoError::NonPositive { id, field });
            }
        }
        for (field, value) in [
            ("handling cost rate", handling_cost_per_kg),
            ("SLA penalty rate", sla_penalty_per_hour),
        ] {
            if value < 0.0 {
                return Err(CargoError::NegativeRate { id, field });
            }
        }
        Ok(Self {
            id,
            origin,
            destination,
            weight,
            volume,
            revenue,
            priority,
            perishable,
            max_transit_hours,
            ready_time,
            due_by,
            handling_cost_per_kg,
            sla_penalty_per_hour,
        })
    }

    #[inline]
    pub fn id(&self) -> &CargoId {
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
    pub fn weight(&self) -> Weight {
        self.weight
    }

    #[inline]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[inline]
    pub fn revenue(&self) -> Money {
        self.revenue
    }

    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    pub fn perishable(&self) -> bool {
        self.perishable
    }

    #[inline]
    pub fn max_transit_hours(&self) -> f64 {
        self.max_transit_hours
    }

    #[inline]
    pub fn ready_time(&self) -> DateTime<FixedOffset> {
        self.ready_time
    }

    #[inline]
    pub fn due_by(&self) -> DateTime<FixedOffset> {
        self.due_by
    }

    #[inline]
    pub fn handling_cost_per_kg(&self) -> f64 {
        self.handling_cost_per_kg
    }

    #[inline]
    pub fn sla_penalty_per_hour(&self) -> f64 {
        self.sla_penalty_per_hour
    }

    /// Revenue per kilogram, guarded against degenerate weights.
    #[inline]
    pub fn revenue_density(&self) -> f64 {
        self.revenue.value() / self.weight.value().max(REVENUE_DENSITY_EPSILON)
    }
}

/// All cargo of a run, keyed by identifier; iteration follows identifier
/// order so gene positions are stable across runs.
#[repr(transparent)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CargoManifest(BTreeMap<CargoId, Cargo>);

impl CargoManifest {
    #[inline]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[inline]
    pub fn insert(&mut self, cargo: Cargo) -> Option<Cargo> {
        self.0.insert(cargo.id().clone(), cargo)
    }

    #[inline]
    pub fn get(&self, id: &CargoId) -> Option<&Cargo> {
        self.0.get(id)
    }

    #[inline]
    pub fn contains_id(&self, id: &CargoId) -> bool {
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
    pub fn iter(&self) -> impl Iterator<Item = &Cargo> {
        self.0.values()
    }
}

impl FromIterator<Cargo> for CargoManifest {
    fn from_iter<I: IntoIterator<Item = Cargo>>(iter: I) -> Self {
        let mut m = Self::new();
        for c in iter {
            m.insert(c);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(19800)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 1, h, 0, 0)
            .unwrap()
    }

    fn cargo(id: &str, priority: Priority) -> Cargo {
        Cargo::new(
            CargoId::from_str_id(id),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("MAA"),
            Weight::new(500.0),
            Volume::new(2.0),
            Money::new(80_000.0),
            priority,
            false,
            24.0,
            ts(6),
            ts(20),
            1.5,
            400.0,
        )
        .unwrap()
    }

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_scores_and_guarantee() {
        assert_eq!(Priority::High.score(), 3.0);
        assert_eq!(Priority::Medium.score(), 2.0);
        assert_eq!(Priority::Low.score(), 1.0);
        assert!(Priority::High.is_guaranteed());
        assert!(Priority::Medium.is_guaranteed());
        assert!(!Priority::Low.is_guaranteed());
    }

    #[test]
    fn test_rejects_same_origin_destination() {
        let err = Cargo::new(
            CargoId::from_str_id("C1"),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("DEL"),
            Weight::new(1.0),
            Volume::new(1.0),
            Money::new(1.0),
            Priority::Low,
            false,
            1.0,
            ts(6),
            ts(20),
            0.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, CargoError::SameOriginDestination { .. }));
    }

    #[test]
    fn test_rejects_due_before_ready() {
        let err = Cargo::new(
            CargoId::from_str_id("C1"),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("MAA"),
            Weight::new(1.0),
            Volume::new(1.0),
            Money::new(1.0),
            Priority::Low,
            false,
            1.0,
            ts(20),
            ts(20),
            0.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, CargoError::DueNotAfterReady { .. }));
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let err = Cargo::new(
            CargoId::from_str_id("C1"),
            AirportCode::from_str_id("DEL"),
            AirportCode::from_str_id("MAA"),
            Weight::new(-1.0),
            Volume::new(1.0),
            Money::new(1.0),
            Priority::Low,
            false,
            1.0,
            ts(6),
            ts(20),
            0.0,
            0.0,
        )
        .unwrap_err();
        assert!(matches!(err, CargoError::NonPositive { field: "weight", .. }));
    }

    #[test]
    fn test_revenue_density() {
        let c = cargo("C1", Priority::Low);
        assert_eq!(c.revenue_density(), 160.0);
    }

    #[test]
    fn test_manifest_iterates_in_id_order() {
        let manifest: CargoManifest = [cargo("C2", Priority::Low), cargo("C1", Priority::High)]
            .into_iter()
            .collect();
        let ids: Vec<&str> = manifest.iter().map(|c| c.id().as_str()).collect();
        assert_eq!(ids, vec!["C1", "C2"]);
    }
}
