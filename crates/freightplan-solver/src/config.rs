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

use serde::Deserialize;
use std::io::Read;

/// Weights of the low-priority subset score: revenue density, priority
/// weight, utilization band and dwell hours.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KnapsackWeights {
    pub revenue_density: f64,
    pub priority: f64,
    pub utilization: f64,
    pub dwell: f64,
}

impl Default for KnapsackWeights {
    fn default() -> Self {
        Self {
            revenue_density: 1.0,
            priority: 0.5,
            utilization: 0.3,
            dwell: 0.05,
        }
    }
}

/// A margin move is alerted when it exceeds the larger of the absolute
/// amount and the relative share of the baseline margin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginThreshold {
    pub absolute: f64,
    pub relative: f64,
}

impl Default for MarginThreshold {
    fn default() -> Self {
        Self {
            absolute: 5_000.0,
            relative: 0.10,
        }
    }
}

impl MarginThreshold {
    /// Whether a delta against `baseline_margin` is large enough to
    /// surface.
    #[inline]
    pub fn exceeded(&self, delta: f64, baseline_margin: f64) -> bool {
        delta.abs() > self.absolute.max(self.relative * baseline_margin.abs())
    }
}

/// The recognized tuning surface. Everything not listed here is fixed
/// behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanConfig {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub seed: u64,
    pub max_legs: usize,
    pub denial_factor: f64,
    pub knapsack_weights: KnapsackWeights,
    pub disruption_margin_threshold: MarginThreshold,
    pub optimization_budget_ms: Option<u64>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            population_size: 80,
            generations: 120,
            crossover_rate: 0.8,
            mutation_rate: 0.15,
            seed: 42,
            max_legs: 4,
            denial_factor: 0.25,
            knapsack_weights: KnapsackWeights::default(),
            disruption_margin_threshold: MarginThreshold::default(),
            optimization_budget_ms: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl PlanConfig {
    pub fn from_json_reader<R: Read>(rdr: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(rdr)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_published_values() {
        let cfg = PlanConfig::default();
        assert_eq!(cfg.population_size, 80);
        assert_eq!(cfg.generations, 120);
        assert_eq!(cfg.crossover_rate, 0.8);
        assert_eq!(cfg.mutation_rate, 0.15);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.max_legs, 4);
        assert_eq!(cfg.denial_factor, 0.25);
        assert_eq!(cfg.knapsack_weights, KnapsackWeights::default());
        assert!(cfg.optimization_budget_ms.is_none());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg = PlanConfig::from_json_str(r#"{"seed": 7, "generations": 10}"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.generations, 10);
        assert_eq!(cfg.population_size, 80);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(PlanConfig::from_json_str(r#"{"tournament": 5}"#).is_err());
    }

    #[test]
    fn test_margin_threshold_uses_larger_bound() {
        let t = MarginThreshold::default();
        // 10% of 100k is 10k, which dominates the 5k absolute floor.
        assert!(!t.exceeded(8_000.0, 100_000.0));
        assert!(t.exceeded(12_000.0, 100_000.0));
        // For small baselines the absolute floor dominates.
        assert!(!t.exceeded(-4_000.0, 10_000.0));
        assert!(t.exceeded(-6_000.0, 10_000.0));
    }

    #[test]
    fn test_nested_weights_deserialize() {
        let cfg = PlanConfig::from_json_str(
            r#"{"knapsack_weights": {"revenue_density": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(cfg.knapsack_weights.revenue_density, 2.0);
        assert_eq!(cfg.knapsack_weights.dwell, 0.05);
    }
}
