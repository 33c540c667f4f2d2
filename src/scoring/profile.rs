//! Weight profiles: the tunable half of the scoring engine.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::IrError;

/// A rankable signal extracted from an enriched record.
///
/// Group factors (trade count, distinct insiders, title-weighted count,
/// cluster count) only carry values on rolled-up records; on single
/// transactions they are null for every record and drop out of the blend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Dollar value of the trade; the signed net value on rolled-up records.
    TradeValue,
    /// Number of qualifying transactions behind a rolled-up record.
    TradeCount,
    /// Number of distinct insiders behind a rolled-up record.
    DistinctInsiders,
    /// Sum of title multipliers over a rolled-up record's transactions.
    TitleWeightedCount,
    /// Reported change in insider ownership (aggregated on rollups).
    OwnershipChange,
    /// Transactions inside the ticker's recent trading cluster window.
    ClusterCount,
    /// Market capitalization; smaller caps rank higher.
    MarketCap,
    /// Days between the record's anchor date and the run's reference date;
    /// fresher records rank higher.
    Recency,
    /// Current price relative to the insider's price; cheaper ranks higher.
    PriceDiff,
}

impl Factor {
    /// The factor's wire name, as used in serialized weight maps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TradeValue => "trade_value",
            Self::TradeCount => "trade_count",
            Self::DistinctInsiders => "distinct_insiders",
            Self::TitleWeightedCount => "title_weighted_count",
            Self::OwnershipChange => "ownership_change",
            Self::ClusterCount => "cluster_count",
            Self::MarketCap => "market_cap",
            Self::Recency => "recency",
            Self::PriceDiff => "price_diff",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named set of factor weights plus the timing-bonus knobs.
///
/// Weights do not have to sum to one; the blend divides by the sum of the
/// participating weights, so uniformly scaling every weight leaves the
/// ranking unchanged.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightProfile {
    /// Identifier used by preset storage and log output.
    pub name: String,
    /// Factor weights; absent factors count as zero.
    pub weights: BTreeMap<Factor, f64>,
    /// Whether recent records receive the timing bonus.
    #[serde(default)]
    pub timing_bonus_enabled: bool,
    /// Age in days (against the reference date) up to which the bonus applies.
    #[serde(default = "default_bonus_days")]
    pub timing_bonus_days: i64,
    /// Multiplier applied to the final score of records inside the window.
    #[serde(default = "default_bonus_mult")]
    pub timing_bonus_multiplier: f64,
}

const fn default_bonus_days() -> i64 {
    2
}

const fn default_bonus_mult() -> f64 {
    1.10
}

impl Default for WeightProfile {
    /// The stock profile: rolled-up conviction signals plus market context,
    /// timing bonus on.
    fn default() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(Factor::TitleWeightedCount, 0.90);
        weights.insert(Factor::TradeCount, 0.10);
        weights.insert(Factor::OwnershipChange, 0.85);
        weights.insert(Factor::ClusterCount, 0.60);
        weights.insert(Factor::MarketCap, 0.60);
        weights.insert(Factor::Recency, 0.75);
        weights.insert(Factor::PriceDiff, 0.70);
        Self {
            name: "default".to_string(),
            weights,
            timing_bonus_enabled: true,
            timing_bonus_days: default_bonus_days(),
            timing_bonus_multiplier: default_bonus_mult(),
        }
    }
}

impl WeightProfile {
    /// Creates an empty profile with the timing bonus off.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weights: BTreeMap::new(),
            timing_bonus_enabled: false,
            timing_bonus_days: default_bonus_days(),
            timing_bonus_multiplier: default_bonus_mult(),
        }
    }

    /// Sets the weight for one factor.
    #[must_use]
    pub fn weight(mut self, factor: Factor, weight: f64) -> Self {
        self.weights.insert(factor, weight);
        self
    }

    /// Turns the timing bonus on or off.
    #[must_use]
    pub const fn timing_bonus(mut self, enabled: bool) -> Self {
        self.timing_bonus_enabled = enabled;
        self
    }

    /// Sets the timing-bonus window in days.
    #[must_use]
    pub const fn timing_bonus_days(mut self, days: i64) -> Self {
        self.timing_bonus_days = days;
        self
    }

    /// Sets the timing-bonus multiplier.
    #[must_use]
    pub const fn timing_bonus_multiplier(mut self, multiplier: f64) -> Self {
        self.timing_bonus_multiplier = multiplier;
        self
    }

    /// Checks the profile before any work happens.
    ///
    /// # Errors
    /// Returns [`IrError::Config`] when the profile is unusable: no name, no
    /// weights, a negative or non-finite weight, every weight zero, a
    /// negative bonus window, or a non-positive bonus multiplier.
    pub fn validate(&self) -> Result<(), IrError> {
        if self.name.trim().is_empty() {
            return Err(IrError::Config("weight profile has no name".into()));
        }
        if self.weights.is_empty() {
            return Err(IrError::Config(format!(
                "weight profile '{}' has no weights",
                self.name
            )));
        }
        for (factor, w) in &self.weights {
            if !w.is_finite() || *w < 0.0 {
                return Err(IrError::Config(format!(
                    "weight for {factor} must be finite and non-negative, got {w}"
                )));
            }
        }
        if !self.weights.values().any(|w| *w > 0.0) {
            return Err(IrError::Config(format!(
                "weight profile '{}' has no positive weight",
                self.name
            )));
        }
        if self.timing_bonus_days < 0 {
            return Err(IrError::Config("timing bonus window cannot be negative".into()));
        }
        if !self.timing_bonus_multiplier.is_finite() || self.timing_bonus_multiplier <= 0.0 {
            return Err(IrError::Config(format!(
                "timing bonus multiplier must be positive, got {}",
                self.timing_bonus_multiplier
            )));
        }
        Ok(())
    }
}
