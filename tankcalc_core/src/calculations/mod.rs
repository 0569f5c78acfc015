//! # Engineering Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Calculation results (JSON-serializable)
//! - a pure function from `&*Input` to `*Result`
//!
//! ## Available Calculations
//!
//! - [`shell_thickness`] - API 650 / API 620 shell course thickness
//! - [`heat_exchanger`] - Shell-and-tube exchanger sizing (Kern + Bell-Delaware)

pub mod design_case;
pub mod heat_exchanger;
pub mod shell_thickness;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;

// Re-export commonly used types
pub use design_case::DesignCase;
pub use heat_exchanger::{HeatExchangerInput, HeatExchangerResult};
pub use shell_thickness::{ShellCalcInput, ShellCalcResult};

/// Pass/fail status of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "NOT OK")]
    NotOk,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Ok => "OK",
            CheckStatus::NotOk => "NOT OK",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a numeric output is not a usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegenerateReason {
    NotANumber,
    Infinite,
}

impl DegenerateReason {
    /// Classify `value`, or `None` when it is finite
    pub fn of(value: f64) -> Option<Self> {
        if value.is_nan() {
            Some(DegenerateReason::NotANumber)
        } else if value.is_infinite() {
            Some(DegenerateReason::Infinite)
        } else {
            None
        }
    }
}

/// Enum wrapper for all calculation types.
///
/// This allows storing heterogeneous calculations in a single collection
/// while maintaining type safety and clean serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    /// Tank shell course thickness
    ShellThickness(ShellCalcInput),
    /// Shell-and-tube heat exchanger sizing
    HeatExchanger(HeatExchangerInput),
}

impl CalculationItem {
    /// Get the user-provided label for this calculation
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::ShellThickness(s) => &s.label,
            CalculationItem::HeatExchanger(h) => &h.label,
        }
    }

    /// Get the calculation type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::ShellThickness(_) => "ShellThickness",
            CalculationItem::HeatExchanger(_) => "HeatExchanger",
        }
    }

    /// Run the calculation this item describes
    pub fn run(&self) -> CalcResult<CalculationOutput> {
        match self {
            CalculationItem::ShellThickness(input) => {
                shell_thickness::run_shell_thickness(input).map(CalculationOutput::ShellThickness)
            }
            CalculationItem::HeatExchanger(input) => Ok(CalculationOutput::HeatExchanger(input.calculate())),
        }
    }
}

/// Result of running a [`CalculationItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    ShellThickness(ShellCalcResult),
    HeatExchanger(HeatExchangerResult),
}

impl CalculationOutput {
    /// Overall pass/fail: every course adequate, or both pressure drops within allowables
    pub fn passes(&self) -> bool {
        match self {
            CalculationOutput::ShellThickness(r) => r.passes(),
            CalculationOutput::HeatExchanger(r) => r.passes_hydraulics(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_reason() {
        assert_eq!(DegenerateReason::of(1.0), None);
        assert_eq!(DegenerateReason::of(f64::NAN), Some(DegenerateReason::NotANumber));
        assert_eq!(DegenerateReason::of(f64::NEG_INFINITY), Some(DegenerateReason::Infinite));
    }

    #[test]
    fn test_check_status_serialization() {
        assert_eq!(serde_json::to_string(&CheckStatus::NotOk).unwrap(), "\"NOT OK\"");
        assert_eq!(CheckStatus::Ok.to_string(), "OK");
    }
}
