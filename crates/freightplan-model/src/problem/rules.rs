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

use crate::problem::flight::AirportCode;
use freightplan_core::prelude::Money;
use std::collections::HashMap;

/// Connection window applied when no rule matches an itinerary pair.
pub const DEFAULT_MIN_CONNECT_MINUTES: i64 = 60;
pub const DEFAULT_MAX_CONNECT_MINUTES: i64 = 720;

#[derive(Debug, Clone, PartialEq)]
pub enum RuleError {
    NegativeMinimum { origin: AirportCode, destination: AirportCode },
    WindowInverted { origin: AirportCode, destination: AirportCode },
    NegativeFee { origin: AirportCode, destination: AirportCode },
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleError::NegativeMinimum { origin, destination } => write!(
                f,
                "Connection rule {} -> {} has a negative minimum window",
                origin, destination
            ),
            RuleError::WindowInverted { origin, destination } => write!(
                f,
                "Connection rule {} -> {} closes before it opens",
                origin, destination
            ),
            RuleError::NegativeFee { origin, destination } => write!(
                f,
                "Connection rule {} -> {} has a negative handling fee",
                origin, destination
            ),
        }
    }
}

impl std::error::Error for RuleError {}

/// How legs of an itinerary for the (origin, destination) market may
/// connect, optionally refined to one connection airport. A rule with no
/// connection airport is the wildcard fallback for that market.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRule {
    origin: AirportCode,
    destination: AirportCode,
    via: Option<AirportCode>,
    min_connect_minutes: i64,
    max_connect_minutes: i64,
    handling_fee: Money,
}

impl ConnectionRule {
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        via: Option<AirportCode>,
        min_connect_minutes: i64,
        max_connect_minutes: i64,
        handling_fee: Money,
    ) -> Result<Self, RuleError> {
        if min_connect_minutes < 0 {
            return Err(RuleError::NegativeMinimum { origin, destination });
        }
        if max_connect_minutes < min_connect_minutes {
            return Err(RuleError::WindowInverted { origin, destination });
        }
        if handling_fee.value() < 0.0 {
            return Err(RuleError::NegativeFee { origin, destination });
        }
        Ok(Self {
            origin,
            destination,
            via,
            min_connect_minutes,
            max_connect_minutes,
            handling_fee,
        })
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
    pub fn via(&self) -> Option<&AirportCode> {
        self.via.as_ref()
    }

    #[inline]
    pub fn min_connect_minutes(&self) -> i64 {
        self.min_connect_minutes
    }

    #[inline]
    pub fn max_connect_minutes(&self) -> i64 {
        self.max_connect_minutes
    }

    #[inline]
    pub fn handling_fee(&self) -> Money {
        self.handling_fee
    }
}

/// Resolved connection constraints for one dwell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionWindow {
    pub min_minutes: i64,
    pub max_minutes: i64,
    pub fee: Money,
}

impl ConnectionWindow {
    #[inline]
    pub fn contains(&self, dwell_minutes: i64) -> bool {
        dwell_minutes >= self.min_minutes && dwell_minutes <= self.max_minutes
    }
}

impl Default for ConnectionWindow {
    fn default() -> Self {
        Self {
            min_minutes: DEFAULT_MIN_CONNECT_MINUTES,
            max_minutes: DEFAULT_MAX_CONNECT_MINUTES,
            fee: Money::zero(),
        }
    }
}

type RuleKey = (AirportCode, AirportCode, Option<AirportCode>);

/// Lookup index over connection rules. Resolution order for a dwell at
/// `via` on the (origin, destination) market: exact rule, wildcard rule,
/// built-in default window.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    rules: HashMap<RuleKey, ConnectionRule>,
}

impl RuleIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule: ConnectionRule) -> Option<ConnectionRule> {
        let key = (
            rule.origin().clone(),
            rule.destination().clone(),
            rule.via().cloned(),
        );
        self.rules.insert(key, rule)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn window(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        via: &AirportCode,
    ) -> ConnectionWindow {
        let exact = (origin.clone(), destination.clone(), Some(via.clone()));
        if let Some(rule) = self.rules.get(&exact) {
            return ConnectionWindow {
                min_minutes: rule.min_connect_minutes(),
                max_minutes: rule.max_connect_minutes(),
                fee: rule.handling_fee(),
            };
        }
        let wildcard = (origin.clone(), destination.clone(), None);
        if let Some(rule) = self.rules.get(&wildcard) {
            return ConnectionWindow {
                min_minutes: rule.min_connect_minutes(),
                max_minutes: rule.max_connect_minutes(),
                fee: rule.handling_fee(),
            };
        }
        ConnectionWindow::default()
    }
}

impl FromIterator<ConnectionRule> for RuleIndex {
    fn from_iter<I: IntoIterator<Item = ConnectionRule>>(iter: I) -> Self {
        let mut idx = Self::new();
        for r in iter {
            idx.insert(r);
        }
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ap(code: &str) -> AirportCode {
        AirportCode::from_str_id(code)
    }

    fn rule(via: Option<&str>, min: i64, max: i64, fee: f64) -> ConnectionRule {
        ConnectionRule::new(
            ap("DEL"),
            ap("MAA"),
            via.map(ap),
            min,
            max,
            Money::new(fee),
        )
        .unwrap()
    }

    #[test]
    fn test_exact_beats_wildcard() {
        let idx: RuleIndex = [rule(None, 45, 600, 100.0), rule(Some("BOM"), 90, 180, 250.0)]
            .into_iter()
            .collect();
        let w = idx.window(&ap("DEL"), &ap("MAA"), &ap("BOM"));
        assert_eq!(w.min_minutes, 90);
        assert_eq!(w.max_minutes, 180);
        assert_eq!(w.fee, Money::new(250.0));
    }

    #[test]
    fn test_wildcard_fallback() {
        let idx: RuleIndex = [rule(Some("BOM"), 90, 180, 250.0)].into_iter().collect();
        let w = idx.window(&ap("DEL"), &ap("MAA"), &ap("HYD"));
        assert_eq!(
            (w.min_minutes, w.max_minutes),
            (DEFAULT_MIN_CONNECT_MINUTES, DEFAULT_MAX_CONNECT_MINUTES)
        );
        assert!(w.fee.is_zero());

        let idx: RuleIndex = [rule(None, 45, 600, 100.0), rule(Some("BOM"), 90, 180, 250.0)]
            .into_iter()
            .collect();
        let w = idx.window(&ap("DEL"), &ap("MAA"), &ap("HYD"));
        assert_eq!((w.min_minutes, w.max_minutes), (45, 600));
    }

    #[test]
    fn test_default_window_when_nothing_matches() {
        let idx = RuleIndex::new();
        let w = idx.window(&ap("DEL"), &ap("MAA"), &ap("BOM"));
        assert_eq!(w, ConnectionWindow::default());
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let w = ConnectionWindow {
            min_minutes: 60,
            max_minutes: 180,
            fee: Money::zero(),
        };
        assert!(w.contains(60));
        assert!(w.contains(180));
        assert!(!w.contains(59));
        assert!(!w.contains(181));
    }

    #[test]
    fn test_rule_validation() {
        assert!(matches!(
            ConnectionRule::new(ap("A"), ap("B"), None, -1, 10, Money::zero()),
            Err(RuleError::NegativeMinimum { .. })
        ));
        assert!(matches!(
            ConnectionRule::new(ap("A"), ap("B"), None, 60, 30, Money::zero()),
            Err(RuleError::WindowInverted { .. })
        ));
        assert!(matches!(
            ConnectionRule::new(ap("A"), ap("B"), None, 0, 30, Money::new(-1.0)),
            Err(RuleError::NegativeFee { .. })
        ));
    }
}
