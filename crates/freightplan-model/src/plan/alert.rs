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

use crate::plan::assignment::CargoStatus;
use crate::problem::cargo::CargoId;
use crate::problem::flight::FlightId;
use freightplan_core::prelude::Money;

/// What an alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    StatusChange,
    Reroute,
    MarginChange,
    CargoMissing,
    BaselineException,
    DisruptionApplied,
    CapacityBreach,
    PriorityGuaranteeViolation,
    PartialOptimization,
}

impl AlertKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::StatusChange => "status_change",
            AlertKind::Reroute => "reroute",
            AlertKind::MarginChange => "margin_change",
            AlertKind::CargoMissing => "cargo_missing",
            AlertKind::BaselineException => "baseline_exception",
            AlertKind::DisruptionApplied => "disruption_applied",
            AlertKind::CapacityBreach => "capacity_breach",
            AlertKind::PriorityGuaranteeViolation => "priority_guarantee_violation",
            AlertKind::PartialOptimization => "partial_optimization",
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A planning condition surfaced to operators. Alerts never abort the
/// pipeline; they annotate the plan that was produced anyway.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub cargo_id: Option<CargoId>,
    pub flight_id: Option<FlightId>,
    pub status: Option<CargoStatus>,
    pub margin_delta: Option<Money>,
}

impl Alert {
    #[inline]
    pub fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            cargo_id: None,
            flight_id: None,
            status: None,
            margin_delta: None,
        }
    }

    #[inline]
    pub fn with_cargo(mut self, id: CargoId) -> Self {
        self.cargo_id = Some(id);
        self
    }

    #[inline]
    pub fn with_flight(mut self, id: FlightId) -> Self {
        self.flight_id = Some(id);
        self
    }

    #[inline]
    pub fn with_status(mut self, status: CargoStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[inline]
    pub fn with_margin_delta(mut self, delta: Money) -> Self {
        self.margin_delta = Some(delta);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(AlertKind::StatusChange.as_str(), "status_change");
        assert_eq!(AlertKind::CapacityBreach.as_str(), "capacity_breach");
        assert_eq!(
            AlertKind::PriorityGuaranteeViolation.as_str(),
            "priority_guarantee_violation"
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn test_builder_attaches_references() {
        let alert = Alert::new(AlertKind::CapacityBreach, Severity::Critical, "over limit")
            .with_flight(FlightId::from_str_id("F1"))
            .with_cargo(CargoId::from_str_id("C1"))
            .with_status(CargoStatus::Delivered)
            .with_margin_delta(Money::new(-500.0));
        assert_eq!(alert.flight_id.as_ref().unwrap().as_str(), "F1");
        assert_eq!(alert.cargo_id.as_ref().unwrap().as_str(), "C1");
        assert_eq!(alert.status, Some(CargoStatus::Delivered));
        assert_eq!(alert.margin_delta, Some(Money::new(-500.0)));
    }
}
