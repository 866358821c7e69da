//! Per-tonne formulation cost.

use crate::{Result, error::TwinError, feature::FeatureVector};

/// Cost at or above which a formulation is flagged as expensive.
pub const DEFAULT_REFERENCE_COST: f64 = 7_500.0;

/// Raw-material and processing prices in CNY per tonne.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialPrices {
    /// Recycled polypropylene base resin.
    pub base_resin: f64,
    /// POE toughener.
    pub toughener: f64,
    /// Talc filler.
    pub filler: f64,
    /// Flat compounding charge.
    pub processing: f64,
    /// Reference cost used for [`CostTrend`].
    pub reference: f64,
}

impl Default for MaterialPrices {
    fn default() -> Self {
        Self {
            base_resin: 6_000.0,
            toughener: 14_000.0,
            filler: 2_000.0,
            processing: 800.0,
            reference: DEFAULT_REFERENCE_COST,
        }
    }
}

impl MaterialPrices {
    /// Checks that every price is finite.
    ///
    /// # Errors
    /// Returns [`TwinError::InvalidConfig`] naming the first non-finite price.
    pub fn validate(&self) -> Result<()> {
        let prices = [
            ("prices.base_resin", self.base_resin),
            ("prices.toughener", self.toughener),
            ("prices.filler", self.filler),
            ("prices.processing", self.processing),
            ("prices.reference", self.reference),
        ];
        match prices.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((parameter, value)) => Err(TwinError::invalid_config(
                parameter,
                format!("price must be finite (got {value})"),
            )),
            None => Ok(()),
        }
    }
}

/// Whether a formulation costs less than the reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostTrend {
    /// Cheaper than the reference cost.
    BelowReference,
    /// At or above the reference cost.
    AboveReference,
}

/// A formulation's cost and how it compares with the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostEstimate {
    /// CNY per tonne.
    pub per_tonne: f64,
    /// Comparison with [`MaterialPrices::reference`].
    pub trend: CostTrend,
}

/// Cost per tonne of the blend described by `features`.
///
/// The toughener and filler percentages displace base resin; the balance is
/// not clamped, so percentages summing past 100 give a negative resin share.
///
/// # Examples
/// ```
/// use polytwin_core::{FeatureVector, MaterialPrices, formulation_cost};
///
/// let cost = formulation_cost(&FeatureVector::default(), &MaterialPrices::default());
/// assert!((cost - 7_600.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn formulation_cost(features: &FeatureVector, prices: &MaterialPrices) -> f64 {
    let resin_share = (100.0 - features.toughener - features.filler) / 100.0;
    let toughener_share = features.toughener / 100.0;
    let filler_share = features.filler / 100.0;
    resin_share.mul_add(
        prices.base_resin,
        toughener_share.mul_add(
            prices.toughener,
            filler_share.mul_add(prices.filler, prices.processing),
        ),
    )
}

/// Cost plus its [`CostTrend`].
#[must_use]
pub fn estimate_cost(features: &FeatureVector, prices: &MaterialPrices) -> CostEstimate {
    let per_tonne = formulation_cost(features, prices);
    let trend = if per_tonne < prices.reference {
        CostTrend::BelowReference
    } else {
        CostTrend::AboveReference
    };
    CostEstimate { per_tonne, trend }
}
