//! Profitability calculation
//!
//! Maps the cost and price fields of one FBA product to its derived fees,
//! profit, margin and ROI. The calculation is pure: no I/O, no failure modes.

use serde::{Deserialize, Serialize};

/// ROI at or above this percentage is rated `Good`
pub const ROI_GOOD_THRESHOLD: f64 = 40.0;

/// ROI at or above this percentage (and below the good threshold) is rated `Warning`
pub const ROI_WARNING_THRESHOLD: f64 = 25.0;

/// Cost and price fields entered for a single product
///
/// Omitted fields fall back to the calculator form defaults
/// (15% referral, 2 months to sell, everything else zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculatorInputs {
    pub buy_cost: f64,
    pub shipping_per_unit: f64,
    pub prep_cost: f64,
    pub sale_price: f64,
    pub referral_percent: f64,
    pub fba_fee: f64,
    pub monthly_storage_per_unit: f64,
    pub expected_months_to_sell: f64,
    /// Accepted and stored, but does not affect any output.
    pub vat_included: bool,
}

impl Default for CalculatorInputs {
    fn default() -> Self {
        Self {
            buy_cost: 0.0,
            shipping_per_unit: 0.0,
            prep_cost: 0.0,
            sale_price: 0.0,
            referral_percent: 15.0,
            fba_fee: 0.0,
            monthly_storage_per_unit: 0.0,
            expected_months_to_sell: 2.0,
            vat_included: false,
        }
    }
}

/// Values derived from a [`CalculatorInputs`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorOutputs {
    pub landed_cost: f64,
    pub referral_fee: f64,
    pub storage_total: f64,
    pub total_fees: f64,
    pub net_profit: f64,
    pub margin_percent: f64,
    pub roi_percent: f64,
}

impl CalculatorOutputs {
    pub fn severity(&self) -> RoiSeverity {
        RoiSeverity::from_roi(self.roi_percent)
    }
}

/// Compute profitability for one set of inputs.
///
/// Margin is 0 when the sale price is not positive and ROI is 0 when the
/// landed cost is not positive, so no division by zero can occur.
pub fn calculate(inputs: &CalculatorInputs) -> CalculatorOutputs {
    let landed_cost = inputs.buy_cost + inputs.shipping_per_unit + inputs.prep_cost;
    let referral_fee = inputs.sale_price * (inputs.referral_percent / 100.0);
    let storage_total = inputs.monthly_storage_per_unit * inputs.expected_months_to_sell;
    let total_fees = referral_fee + inputs.fba_fee + storage_total;
    let net_profit = inputs.sale_price - landed_cost - total_fees;

    let margin_percent = if inputs.sale_price > 0.0 {
        (net_profit / inputs.sale_price) * 100.0
    } else {
        0.0
    };
    let roi_percent = if landed_cost > 0.0 {
        (net_profit / landed_cost) * 100.0
    } else {
        0.0
    };

    CalculatorOutputs {
        landed_cost,
        referral_fee,
        storage_total,
        total_fees,
        net_profit,
        margin_percent,
        roi_percent,
    }
}

/// Traffic-light rating of a ROI percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoiSeverity {
    Good,
    Warning,
    Poor,
}

impl RoiSeverity {
    /// Lower bounds are inclusive: 40 is good, 25 is warning.
    pub fn from_roi(roi_percent: f64) -> Self {
        if roi_percent >= ROI_GOOD_THRESHOLD {
            RoiSeverity::Good
        } else if roi_percent >= ROI_WARNING_THRESHOLD {
            RoiSeverity::Warning
        } else {
            RoiSeverity::Poor
        }
    }
}

impl std::fmt::Display for RoiSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoiSeverity::Good => write!(f, "good"),
            RoiSeverity::Warning => write!(f, "warning"),
            RoiSeverity::Poor => write!(f, "poor"),
        }
    }
}
