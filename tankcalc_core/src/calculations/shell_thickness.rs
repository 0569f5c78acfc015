//! # Shell Thickness Calculation
//!
//! Course-by-course shell thickness for vertical cylindrical tanks.
//!
//! ## Methods
//!
//! - **API 650 one-foot method**: the hydrostatic head is evaluated 0.3 m
//!   (1 ft) above the bottom seam of each course:
//!   `t = C·D·(H − offset)·G / (S·E) + CA`, with C = 4.9 (SI, mm) or 2.6 (US, in).
//! - **API 620 hoop stress basis**: thin-wall cylinder under internal plus
//!   hydrostatic pressure: `t = P·R / (S·E − 0.6·P) + CA`. A non-positive
//!   denominator gives an infinite thickness.
//!
//! Every active design case is evaluated for every course; the case with
//! the largest required thickness governs. Required thickness is floored at
//! `min_nominal_thickness + CA`.
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::calculations::shell_thickness::{run_shell_thickness, ShellCalcInput, ShellCaseInput};
//! use tankcalc_core::calculations::DesignCase;
//! use tankcalc_core::standard_selector::DesignStandard;
//! use tankcalc_core::units::UnitSystem;
//!
//! let input = ShellCalcInput {
//!     label: "TK-101".to_string(),
//!     units: UnitSystem::SI,
//!     standard: DesignStandard::Api650,
//!     diameter: 30.0,
//!     courses: vec![2.0],
//!     specific_gravity: 1.0,
//!     corrosion_allowance: 2.0,
//!     design_pressure: 0.0,
//!     allowable_stress_design: 160.0,
//!     allowable_stress_test: 171.0,
//!     joint_efficiency: 1.0,
//!     min_nominal_thickness: 6.0,
//!     adopted_thicknesses: vec![10.0],
//!     active_cases: vec![ShellCaseInput { key: DesignCase::Operating, liquid_height: 1.8 }],
//! };
//!
//! let result = run_shell_thickness(&input).unwrap();
//! assert_eq!(result.results[0].t_required, 8.0);
//! assert!(result.results[0].is_min_controlled);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::design_case::DesignCase;
use super::CheckStatus;
use crate::errors::{CalcError, CalcResult};
use crate::interpolation::round_up_to_standard;
use crate::standard_selector::DesignStandard;
use crate::units::UnitSystem;

/// API 650 one-foot method offset above the bottom seam (m)
pub const ONE_FOOT_OFFSET_SI: f64 = 0.3;
/// API 650 one-foot method offset above the bottom seam (ft)
pub const ONE_FOOT_OFFSET_US: f64 = 1.0;
/// API 650 design formula constant, SI form (t in mm)
pub const API_650_CONSTANT_SI: f64 = 4.9;
/// API 650 design formula constant, US form (t in inches)
pub const API_650_CONSTANT_US: f64 = 2.6;
/// Hydrostatic pressure of water per unit head (kPa/m)
pub const WATER_HEAD_KPA_PER_M: f64 = 9.80665;
/// Hydrostatic pressure of water per unit head (psi/ft)
pub const WATER_HEAD_PSI_PER_FT: f64 = 0.433;

/// Liquid height for one active design case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellCaseInput {
    pub key: DesignCase,
    /// Design liquid level above the tank bottom (m / ft)
    pub liquid_height: f64,
}

/// Input parameters for a shell thickness calculation.
///
/// All lengths, thicknesses, stresses and pressures are in the units named
/// by `units` (see [`UnitSystem`]).
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "TK-101",
///   "units": "SI",
///   "standard": "API_650",
///   "diameter": 30.0,
///   "courses": [2.4, 2.4, 2.4],
///   "specific_gravity": 0.85,
///   "corrosion_allowance": 2.0,
///   "design_pressure": 0.0,
///   "allowable_stress_design": 160.0,
///   "allowable_stress_test": 171.0,
///   "joint_efficiency": 0.85,
///   "min_nominal_thickness": 6.0,
///   "adopted_thicknesses": [14.0, 10.0, 8.0],
///   "active_cases": [
///     { "key": "operating", "liquid_height": 6.8 },
///     { "key": "hydrotest", "liquid_height": 7.2 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellCalcInput {
    /// User label for this tank (e.g., "TK-101")
    #[serde(default)]
    pub label: String,

    pub units: UnitSystem,
    pub standard: DesignStandard,

    /// Tank nominal diameter (m / ft)
    pub diameter: f64,

    /// Course heights, bottom to top (m / ft)
    pub courses: Vec<f64>,

    /// Design specific gravity of the stored product
    pub specific_gravity: f64,

    /// Corrosion allowance (mm / in)
    pub corrosion_allowance: f64,

    /// Internal gauge pressure (kPa / psi), used by API 620 only
    #[serde(default)]
    pub design_pressure: f64,

    /// Allowable stress, design condition (MPa / psi)
    pub allowable_stress_design: f64,

    /// Allowable stress, hydrostatic test (MPa / psi)
    pub allowable_stress_test: f64,

    /// Weld joint efficiency, 0 < E <= 1
    pub joint_efficiency: f64,

    /// Minimum nominal thickness excluding corrosion allowance (mm / in)
    pub min_nominal_thickness: f64,

    /// Adopted plate thickness per course, including CA (mm / in)
    pub adopted_thicknesses: Vec<f64>,

    /// Design cases to evaluate, in evaluation order
    pub active_cases: Vec<ShellCaseInput>,
}

impl ShellCalcInput {
    /// Validate input parameters.
    ///
    /// Runs before any per-course work so a failure never leaves a partial
    /// table behind.
    pub fn validate(&self) -> CalcResult<()> {
        if self.standard == DesignStandard::OutOfScope {
            return Err(CalcError::invalid_input(
                "standard",
                self.standard.to_string(),
                "Design envelope is outside API 650 and API 620; no shell method applies",
            ));
        }
        let e = self.joint_efficiency;
        if !(e > 0.0 && e <= 1.0) {
            return Err(CalcError::invalid_input(
                "joint_efficiency",
                e.to_string(),
                "Joint efficiency must be in the range (0, 1]",
            ));
        }
        if self.adopted_thicknesses.len() != self.courses.len() {
            return Err(CalcError::count_mismatch(
                "adopted_thicknesses",
                self.courses.len(),
                self.adopted_thicknesses.len(),
            ));
        }
        if self.courses.is_empty() {
            return Err(CalcError::invalid_input("courses", "[]", "At least one course is required"));
        }
        if let Some((i, h)) = self
            .courses
            .iter()
            .enumerate()
            .find(|(_, h)| !(h.is_finite() && **h > 0.0))
        {
            return Err(CalcError::invalid_input(
                format!("courses[{}]", i),
                h.to_string(),
                "Course height must be positive",
            ));
        }
        if !(self.diameter.is_finite() && self.diameter > 0.0) {
            return Err(CalcError::invalid_input(
                "diameter",
                self.diameter.to_string(),
                "Diameter must be a positive finite number",
            ));
        }
        if !(self.specific_gravity.is_finite() && self.specific_gravity > 0.0) {
            return Err(CalcError::invalid_input(
                "specific_gravity",
                self.specific_gravity.to_string(),
                "Specific gravity must be a positive finite number",
            ));
        }
        if !(self.corrosion_allowance >= 0.0) {
            return Err(CalcError::invalid_input(
                "corrosion_allowance",
                self.corrosion_allowance.to_string(),
                "Corrosion allowance cannot be negative",
            ));
        }
        if !(self.min_nominal_thickness >= 0.0) {
            return Err(CalcError::invalid_input(
                "min_nominal_thickness",
                self.min_nominal_thickness.to_string(),
                "Minimum nominal thickness cannot be negative",
            ));
        }
        if !(self.allowable_stress_design > 0.0) {
            return Err(CalcError::invalid_input(
                "allowable_stress_design",
                self.allowable_stress_design.to_string(),
                "Allowable design stress must be positive",
            ));
        }
        if !(self.allowable_stress_test > 0.0) {
            return Err(CalcError::invalid_input(
                "allowable_stress_test",
                self.allowable_stress_test.to_string(),
                "Allowable test stress must be positive",
            ));
        }
        if self.active_cases.is_empty() {
            return Err(CalcError::invalid_input(
                "active_cases",
                "[]",
                "At least one design case must be active",
            ));
        }
        if let Some(case) = self.active_cases.iter().find(|c| !c.liquid_height.is_finite()) {
            return Err(CalcError::invalid_input(
                format!("active_cases.{}.liquid_height", case.key),
                case.liquid_height.to_string(),
                "Liquid height must be a finite number",
            ));
        }
        Ok(())
    }

    /// Minimum required thickness including corrosion allowance
    pub fn floor_thickness(&self) -> f64 {
        self.min_nominal_thickness + self.corrosion_allowance
    }

    /// One-foot method offset for the unit system (m / ft)
    pub fn one_foot_offset(&self) -> f64 {
        match self.units {
            UnitSystem::SI => ONE_FOOT_OFFSET_SI,
            UnitSystem::US => ONE_FOOT_OFFSET_US,
        }
    }

    /// Total shell height (sum of course heights)
    pub fn shell_height(&self) -> f64 {
        self.courses.iter().sum()
    }

    /// Raw thickness for one case at effective head `h_eff`, including CA.
    fn calculated_thickness(&self, case: DesignCase, h_eff: f64) -> f64 {
        let g = case.specific_gravity(self.specific_gravity);
        let s = case.allowable_stress(self.allowable_stress_design, self.allowable_stress_test);
        let e = self.joint_efficiency;
        let ca = self.corrosion_allowance;

        match self.standard {
            DesignStandard::Api650 => {
                let c = match self.units {
                    UnitSystem::SI => API_650_CONSTANT_SI,
                    UnitSystem::US => API_650_CONSTANT_US,
                };
                c * self.diameter * h_eff * g / (s * e) + ca
            }
            DesignStandard::Api620 => {
                let p_hydro = match self.units {
                    UnitSystem::SI => WATER_HEAD_KPA_PER_M * g * h_eff,
                    UnitSystem::US => WATER_HEAD_PSI_PER_FT * g * h_eff,
                };
                let p_int = if case.includes_internal_pressure() {
                    self.design_pressure.max(0.0)
                } else {
                    0.0
                };
                let p_total = p_int + p_hydro;

                // SI: kPa -> MPa, radius m -> mm. US: psi, radius ft -> in.
                let (p, radius) = match self.units {
                    UnitSystem::SI => (p_total / 1000.0, self.diameter * 1000.0 / 2.0),
                    UnitSystem::US => (p_total, self.diameter * 6.0),
                };
                let denom = s * e - 0.6 * p;
                if denom <= 0.0 {
                    f64::INFINITY
                } else {
                    p * radius / denom + ca
                }
            }
            DesignStandard::OutOfScope => f64::NAN,
        }
    }
}

/// Result for one shell course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseResult {
    /// Course number, 1 = bottom
    pub course_no: usize,
    pub course_height: f64,
    /// Height of the bottom seam above the tank bottom
    pub bottom_elevation: f64,

    /// Raw calculated thickness per case (formula + CA, before the floor)
    pub calc_by_case: BTreeMap<DesignCase, f64>,
    /// Required thickness per case (after the floor)
    pub required_by_case: BTreeMap<DesignCase, f64>,

    pub governing_case: DesignCase,
    /// Raw thickness of the governing case
    pub t_calc_governing: f64,
    /// Required thickness of the governing case
    pub t_required: f64,
    /// True when the floor, not the formula, sets `t_required`
    pub is_min_controlled: bool,

    pub t_adopted: f64,
    /// t_required / t_adopted
    pub utilization: f64,
    pub status: CheckStatus,

    /// Smallest standard plate not thinner than `t_required`
    pub t_standard: f64,
}

impl CourseResult {
    /// Check if the adopted plate is adequate
    pub fn passes(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    /// False when any reported thickness or the utilization is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.t_calc_governing.is_finite() && self.t_required.is_finite() && self.utilization.is_finite()
    }
}

/// Results of a shell thickness calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellCalcResult {
    pub units: UnitSystem,
    pub standard: DesignStandard,
    /// Method label (e.g., "API 650 One-Foot Method")
    pub method: String,
    pub course_count: usize,
    /// Minimum nominal thickness + CA applied to every course
    pub floor_thickness: f64,
    pub results: Vec<CourseResult>,
    pub notes: Vec<String>,
}

impl ShellCalcResult {
    /// Check if every course passes
    pub fn passes(&self) -> bool {
        self.results.iter().all(CourseResult::passes)
    }

    /// Course with the highest utilization
    pub fn critical_course(&self) -> Option<&CourseResult> {
        self.results
            .iter()
            .max_by(|a, b| a.utilization.total_cmp(&b.utilization))
    }

    /// True when every course sits on the minimum thickness
    pub fn all_at_floor(&self) -> bool {
        !self.results.is_empty()
            && self
                .results
                .iter()
                .all(|r| (r.t_required - self.floor_thickness).abs() < 1e-6)
    }
}

/// Method label for a standard
pub fn method_label(standard: DesignStandard) -> &'static str {
    match standard {
        DesignStandard::Api650 => "API 650 One-Foot Method",
        DesignStandard::Api620 => "API 620 Hoop Stress Basis",
        DesignStandard::OutOfScope => "Out of scope",
    }
}

/// Run the shell thickness calculation.
///
/// # Returns
///
/// * `Ok(ShellCalcResult)` - One [`CourseResult`] per course, bottom first
/// * `Err(CalcError::InvalidInput)` - A value is out of range
/// * `Err(CalcError::CountMismatch)` - Adopted thicknesses do not match the courses
///
/// Degenerate design points (API 620 stress exceeded) are reported as an
/// infinite thickness in the result, not as an error.
pub fn run_shell_thickness(input: &ShellCalcInput) -> CalcResult<ShellCalcResult> {
    input.validate()?;

    let units = input.units;
    let offset = input.one_foot_offset();
    let floor = input.floor_thickness();
    let eps = match units {
        UnitSystem::SI => 1e-6,
        UnitSystem::US => 1e-9,
    };

    let notes = match input.standard {
        DesignStandard::Api650 => vec![
            "API 650 one-foot method: hydrostatic head evaluated 0.3 m / 1 ft above the bottom seam of each course.".to_string(),
            "t_required = max(t_calc, min nominal thickness + CA); courses below the minimum plateau at that value.".to_string(),
        ],
        DesignStandard::Api620 => vec![
            "API 620 thin-walled cylinder hoop stress basis: P_total = P_internal + P_hydrostatic.".to_string(),
            "External pressure / vacuum buckling is not checked here; it belongs to the stability check.".to_string(),
        ],
        DesignStandard::OutOfScope => Vec::new(),
    };

    let mut results = Vec::with_capacity(input.courses.len());
    let mut bottom_elevation = 0.0;

    for (i, &course_height) in input.courses.iter().enumerate() {
        let mut calc_by_case = BTreeMap::new();
        let mut required_by_case = BTreeMap::new();

        let mut governing_case = input.active_cases[0].key;
        let mut governing_req = f64::NEG_INFINITY;
        let mut governing_calc = 0.0;

        for case in &input.active_cases {
            let depth_above_seam = (case.liquid_height - bottom_elevation).max(0.0);
            let h_eff = (depth_above_seam - offset).max(0.0);

            let t_calc = input.calculated_thickness(case.key, h_eff);
            let t_req = t_calc.max(floor);

            calc_by_case.insert(case.key, t_calc);
            required_by_case.insert(case.key, t_req);

            // `>=`: a later case with an equal requirement takes over.
            if t_req >= governing_req {
                governing_req = t_req;
                governing_calc = t_calc;
                governing_case = case.key;
            }
        }

        let t_adopted = input.adopted_thicknesses[i];
        let utilization = if t_adopted > 0.0 {
            governing_req / t_adopted
        } else {
            f64::INFINITY
        };
        let status = if t_adopted >= governing_req {
            CheckStatus::Ok
        } else {
            CheckStatus::NotOk
        };
        let is_min_controlled = governing_req <= floor + eps && governing_calc < floor - eps;

        results.push(CourseResult {
            course_no: i + 1,
            course_height,
            bottom_elevation,
            calc_by_case,
            required_by_case,
            governing_case,
            t_calc_governing: governing_calc,
            t_required: governing_req,
            is_min_controlled,
            t_adopted,
            utilization,
            status,
            t_standard: round_up_to_standard(governing_req, units),
        });

        bottom_elevation += course_height;
    }

    Ok(ShellCalcResult {
        units,
        standard: input.standard,
        method: method_label(input.standard).to_string(),
        course_count: input.courses.len(),
        floor_thickness: floor,
        results,
        notes,
    })
}

/// Standard plate thickness for each course, bottom first.
pub fn suggest_adopted_thicknesses(input: &ShellCalcInput) -> CalcResult<Vec<f64>> {
    let result = run_shell_thickness(input)?;
    Ok(result.results.iter().map(|r| r.t_standard).collect())
}
