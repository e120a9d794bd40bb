//! Composite Risk Score Calculator
//!
//! The arithmetic heart of the i-Score methodology: a weighted linear
//! combination of named risk factors, clamped to the 0-100 band.
//!
//! Pure and deterministic: same factors + same weights = same score,
//! no hidden state, no side effects.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::RiskLevel;

/// Tolerance for the "weights sum to 1.0" invariant
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Named risk-factor inputs for one entity (values conventionally 0-100)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorSet {
    factors: BTreeMap<String, f64>,
}

impl RiskFactorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.factors.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.factors.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Flatten to a plain map (used for API breakdowns)
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.factors.clone()
    }
}

impl FromIterator<(String, f64)> for RiskFactorSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            factors: iter.into_iter().collect(),
        }
    }
}

/// Fixed per-entity-type weighting used to combine factors into one score.
///
/// Invariant (checked at construction): every weight is finite and
/// non-negative, and the weights sum to 1.0 within tolerance. The all-zero
/// scheme is also accepted and always yields a score of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightScheme {
    weights: BTreeMap<String, f64>,
}

impl WeightScheme {
    pub fn new<I, S>(weights: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let weights: BTreeMap<String, f64> =
            weights.into_iter().map(|(k, v)| (k.into(), v)).collect();

        let mut sum = 0.0;
        for (name, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(AppError::invalid_weight(name, *weight));
            }
            sum += weight;
        }

        if sum != 0.0 && (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::weight_sum(sum));
        }

        Ok(Self { weights })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Derived composite score in the 0-100 band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeScore(f64);

impl CompositeScore {
    /// Clamp a raw weighted sum into the valid band
    pub fn from_raw(raw: f64) -> Self {
        Self(raw.clamp(0.0, 100.0))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.0)
    }
}

/// Compute the composite score of `factors` under `weights`.
///
/// Every factor referenced by a non-zero weight must be present; the first
/// absent one fails the whole computation with an error naming that key.
/// Zero-weight entries may be missing from `factors` without consequence.
pub fn compute_score(factors: &RiskFactorSet, weights: &WeightScheme) -> AppResult<CompositeScore> {
    let mut total = 0.0;

    for (name, weight) in weights.iter() {
        if weight == 0.0 {
            continue;
        }
        let value = factors
            .get(name)
            .ok_or_else(|| AppError::missing_factor(name))?;
        total += weight * value;
    }

    Ok(CompositeScore::from_raw(total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    fn example_factors() -> RiskFactorSet {
        RiskFactorSet::new()
            .with("political", 50.0)
            .with("economic", 60.0)
            .with("corruption", 40.0)
            .with("development", 70.0)
    }

    fn example_weights() -> WeightScheme {
        WeightScheme::new([
            ("political", 0.4),
            ("economic", 0.3),
            ("corruption", 0.2),
            ("development", 0.1),
        ])
        .unwrap()
    }

    #[test]
    fn test_worked_example() {
        // 50*0.4 + 60*0.3 + 40*0.2 + 70*0.1 = 53.0
        let score = compute_score(&example_factors(), &example_weights()).unwrap();
        assert!((score.value() - 53.0).abs() < 1e-9, "got {}", score.value());
    }

    #[test]
    fn test_deterministic() {
        let a = compute_score(&example_factors(), &example_weights()).unwrap();
        let b = compute_score(&example_factors(), &example_weights()).unwrap();
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_missing_factor_names_key() {
        let factors = RiskFactorSet::new().with("political", 50.0);
        let err = compute_score(&factors, &example_weights()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ScoreMissingFactor);
        assert!(err.message.contains("economic"), "message was: {}", err.message);
    }

    #[test]
    fn test_zero_weight_factor_may_be_absent() {
        let weights = WeightScheme::new([("present", 1.0), ("absent", 0.0)]).unwrap();
        let factors = RiskFactorSet::new().with("present", 42.0);
        let score = compute_score(&factors, &weights).unwrap();
        assert!((score.value() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_weights_scores_zero() {
        let weights = WeightScheme::new([("a", 0.0), ("b", 0.0)]).unwrap();
        let score = compute_score(&example_factors(), &weights).unwrap();
        assert_eq!(score.value(), 0.0);
    }

    #[test]
    fn test_score_stays_in_band() {
        let factors = RiskFactorSet::new().with("a", 100.0).with("b", 100.0);
        let weights = WeightScheme::new([("a", 0.5), ("b", 0.5)]).unwrap();
        let score = compute_score(&factors, &weights).unwrap();
        assert!(score.value() <= 100.0);

        let negative = RiskFactorSet::new().with("a", -500.0).with("b", 0.0);
        let score = compute_score(&negative, &weights).unwrap();
        assert_eq!(score.value(), 0.0);
    }

    #[test]
    fn test_scaling_linearity() {
        let k = 0.5;
        let scaled: RiskFactorSet = example_factors()
            .iter()
            .map(|(name, value)| (name.to_string(), value * k))
            .collect();

        let base = compute_score(&example_factors(), &example_weights()).unwrap();
        let halved = compute_score(&scaled, &example_weights()).unwrap();
        assert!((halved.value() - base.value() * k).abs() < 1e-9);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let err = WeightScheme::new([("a", -0.1), ("b", 1.1)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ScoreInvalidWeight);
    }

    #[test]
    fn test_bad_weight_sum_rejected() {
        let err = WeightScheme::new([("a", 0.4), ("b", 0.4)]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ScoreWeightSum);
    }

    #[test]
    fn test_risk_level_banding() {
        assert_eq!(CompositeScore::from_raw(10.0).level(), RiskLevel::Low);
        assert_eq!(CompositeScore::from_raw(95.0).level(), RiskLevel::Critical);
    }
}
