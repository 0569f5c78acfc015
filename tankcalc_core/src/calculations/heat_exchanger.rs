//! # Shell-and-Tube Heat Exchanger Sizing
//!
//! Kern-style thermal sizing with Bell-Delaware shell-side correction
//! factors and pressure-drop breakdown.
//!
//! The hot fluid flows through the shell, the cold fluid through the tubes.
//! All quantities are SI: kg/s, °C, J/kg·K, Pa·s, W/m·K, kg/m³, m, W/m²·K,
//! m²·K/W; allowable pressure drops are in bar.
//!
//! ## Sequence
//!
//! 1. Heat duty from the hot stream, back-calculated cold flow
//! 2. LMTD with the one-shell-pass F correction
//! 3. Required area, tube count, bundle and shell diameter
//! 4. Tube-side and shell-side film coefficients from jh charts
//! 5. Overall coefficient and deviation from the assumed U; the design is
//!    acceptable while |deviation| < [`DEVIATION_LIMIT_PERCENT`]
//! 6. Tube-side and shell-side pressure drops
//!
//! The calculation never fails: a temperature cross, zero viscosity or a
//! zero conductivity yields NaN or infinite fields, which
//! [`HeatExchangerResult::degenerate_fields`] lists.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{CheckStatus, DegenerateReason};
use crate::tables::{
    clearance_row, pitch_constants, ClearanceRow, PitchConstants, SHELL_JF, SHELL_JH, SQUARE_PITCH,
    TRIANGULAR_PITCH, TUBE_JF, TUBE_JH,
};
use crate::units::{Bar, Pascals};

/// Tubesheet allowance deducted from each tube end (m)
pub const TUBESHEET_ALLOWANCE: f64 = 0.005;

/// Largest |Uo − U_assume| / U_assume (%) accepted without a redesign
pub const DEVIATION_LIMIT_PERCENT: f64 = 30.0;

/// Shell-to-baffle leakage area ratio
const LEAKAGE_RATIO: f64 = 0.04;
/// Bundle bypass area ratio
const BYPASS_RATIO: f64 = 0.05;
/// Window loss coefficient
const WINDOW_LOSS_COEFF: f64 = 0.5;
/// Window velocity relative to cross-flow velocity
const WINDOW_VELOCITY_FACTOR: f64 = 1.2;

// ============================================================================
// Inputs
// ============================================================================

/// Process data for one stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidProperties {
    #[serde(default)]
    pub label: String,
    /// Mass flow rate (kg/s)
    pub mass_flow: f64,
    /// Inlet temperature (°C)
    pub temp_in: f64,
    /// Outlet temperature (°C)
    pub temp_out: f64,
    /// Allowable pressure drop (bar)
    pub allowable_dp: f64,
    /// Fouling resistance (m²·K/W)
    pub fouling_resistance: f64,
    /// Specific heat (J/kg·K)
    pub cp: f64,
    /// Dynamic viscosity (Pa·s)
    pub mu: f64,
    /// Thermal conductivity (W/m·K)
    pub k: f64,
    /// Density (kg/m³)
    pub rho: f64,
}

impl FluidProperties {
    /// Absolute temperature change across the exchanger
    pub fn temperature_change(&self) -> f64 {
        (self.temp_in - self.temp_out).abs()
    }

    pub fn reynolds(&self, velocity: f64, length: f64) -> f64 {
        self.rho * velocity * length / self.mu
    }

    pub fn prandtl(&self) -> f64 {
        self.cp * self.mu / self.k
    }

    /// Dynamic pressure ρu²/2 at `velocity`
    fn dynamic_pressure(&self, velocity: f64) -> f64 {
        self.rho * velocity.powi(2) / 2.0
    }
}

/// Tube layout pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchType {
    #[default]
    Triangular,
    Square,
}

impl PitchType {
    pub fn display_name(&self) -> &'static str {
        match self {
            PitchType::Triangular => "Triangular",
            PitchType::Square => "Square",
        }
    }

    /// Bundle constants (K1, n1) for a tube-pass count
    pub fn bundle_constants(&self, tube_passes: u32) -> PitchConstants {
        match self {
            PitchType::Triangular => pitch_constants(&TRIANGULAR_PITCH, tube_passes),
            PitchType::Square => pitch_constants(&SQUARE_PITCH, tube_passes),
        }
    }

    /// Shell-side equivalent diameter for pitch `pt` and tube OD `od`
    pub fn equivalent_diameter(&self, pt: f64, od: f64) -> f64 {
        match self {
            PitchType::Triangular => (1.1 * pt.powi(2) - 0.917 * od.powi(2)) / od,
            PitchType::Square => (1.27 * pt.powi(2) - od.powi(2)) / od,
        }
    }
}

/// Tube geometry and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TubeSpecs {
    /// Outside diameter (m)
    pub od: f64,
    /// Inside diameter (m)
    pub id: f64,
    /// Tube length (m)
    pub length: f64,
    /// Wall thickness (m)
    pub thickness: f64,
    #[serde(default)]
    pub material: String,
    /// Tube wall conductivity (W/m·K)
    pub material_conductivity: f64,
    pub pitch_type: PitchType,
    /// Tube pitch / OD (typically 1.25)
    pub pitch_ratio: f64,
}

impl TubeSpecs {
    /// Tube pitch (m)
    pub fn pitch(&self) -> f64 {
        self.pitch_ratio * self.od
    }

    /// Inside flow area of one tube (m²)
    pub fn flow_area(&self) -> f64 {
        PI * self.id.powi(2) / 4.0
    }

    /// Outside heat-transfer area of one tube, net of tubesheets (m²)
    pub fn outside_area(&self) -> f64 {
        PI * self.od * (self.length - 2.0 * TUBESHEET_ALLOWANCE)
    }

    pub fn length_to_diameter(&self) -> f64 {
        self.length / self.id
    }
}

/// Floating-head / tubesheet construction, which sets the shell clearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShellHeadType {
    #[default]
    Fixed,
    #[serde(rename = "Split-ring")]
    SplitRing,
    #[serde(rename = "Pull-through")]
    PullThrough,
}

impl ShellHeadType {
    pub const ALL: [ShellHeadType; 3] = [
        ShellHeadType::Fixed,
        ShellHeadType::SplitRing,
        ShellHeadType::PullThrough,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ShellHeadType::Fixed => "Fixed",
            ShellHeadType::SplitRing => "Split-ring",
            ShellHeadType::PullThrough => "Pull-through",
        }
    }

    /// Diametral clearance for this head type (m)
    pub fn clearance(&self, row: &ClearanceRow) -> f64 {
        let mm = match self {
            ShellHeadType::Fixed => row.fixed_mm,
            ShellHeadType::SplitRing => row.split_ring_mm,
            ShellHeadType::PullThrough => row.pull_through_mm,
        };
        mm / 1000.0
    }
}

/// Shell and baffle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellSpecs {
    pub head_type: ShellHeadType,
    /// Shell passes; 0 disables the F correction
    pub passes: u32,
    pub tube_passes: u32,
    /// Baffle spacing / shell diameter
    pub baffle_ratio: f64,
    /// Baffle cut (% of shell diameter)
    pub baffle_cut: f64,
}

/// Complete heat exchanger sizing input.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "E-101",
///   "hot":  { "mass_flow": 10.0, "temp_in": 100.0, "temp_out": 60.0, "allowable_dp": 0.7,
///             "fouling_resistance": 0.0002, "cp": 2200.0, "mu": 0.0005, "k": 0.13, "rho": 750.0 },
///   "cold": { "mass_flow": 10.53, "temp_in": 30.0, "temp_out": 50.0, "allowable_dp": 0.7,
///             "fouling_resistance": 0.0002, "cp": 4180.0, "mu": 0.0008, "k": 0.6, "rho": 995.0 },
///   "tube": { "od": 0.02, "id": 0.016, "length": 4.88, "thickness": 0.002,
///             "material_conductivity": 45.0, "pitch_type": "triangular", "pitch_ratio": 1.25 },
///   "shell": { "head_type": "Split-ring", "passes": 1, "tube_passes": 2,
///              "baffle_ratio": 0.4, "baffle_cut": 25.0 },
///   "u_assume": 500.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatExchangerInput {
    #[serde(default)]
    pub label: String,
    /// Shell-side stream
    pub hot: FluidProperties,
    /// Tube-side stream
    pub cold: FluidProperties,
    pub tube: TubeSpecs,
    pub shell: ShellSpecs,
    /// Assumed overall coefficient (W/m²·K)
    pub u_assume: f64,
}

impl HeatExchangerInput {
    /// Run the sizing calculation
    pub fn calculate(&self) -> HeatExchangerResult {
        perform_calculation(&self.hot, &self.cold, &self.tube, &self.shell, self.u_assume)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Hydraulic and thermal results for one side of the exchanger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideResult {
    /// Flow velocity (m/s)
    pub velocity: f64,
    pub re: f64,
    pub pr: f64,
    /// Film coefficient (W/m²·K)
    pub h: f64,
    /// Pressure drop (Pa)
    pub pressure_drop: f64,
}

/// Bell-Delaware correction factors and shell-side pressure-drop components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BellDelawareFactors {
    /// Baffle cut and spacing
    pub jc: f64,
    /// Baffle leakage
    pub jl: f64,
    /// Bundle bypass
    pub jb: f64,
    /// Unequal end spacing
    pub js: f64,
    /// Laminar gradient
    pub jr: f64,
    pub dp_cross: f64,
    pub dp_window: f64,
    pub dp_leak: f64,
    pub dp_bypass: f64,
    pub dp_end: f64,
}

impl BellDelawareFactors {
    /// Combined correction applied to the ideal shell-side coefficient
    pub fn combined(&self) -> f64 {
        self.jc * self.jl * self.jb * self.js * self.jr
    }

    /// Sum of the shell-side pressure-drop components (Pa)
    pub fn total_pressure_drop(&self) -> f64 {
        self.dp_cross + self.dp_window + self.dp_leak + self.dp_bypass + self.dp_end
    }
}

/// Calculated pressure drop against the allowable for one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicCheck {
    pub allowable_pa: f64,
    pub actual_pa: f64,
    /// actual / allowable
    pub utilization: f64,
    pub status: CheckStatus,
}

impl HydraulicCheck {
    pub fn new(allowable: Bar, actual: Pascals) -> Self {
        let allowable_pa = Pascals::from(allowable).0;
        let actual_pa = actual.0;
        let utilization = if allowable_pa > 0.0 {
            actual_pa / allowable_pa
        } else {
            f64::INFINITY
        };
        let status = if actual_pa <= allowable_pa {
            CheckStatus::Ok
        } else {
            CheckStatus::NotOk
        };
        HydraulicCheck {
            allowable_pa,
            actual_pa,
            utilization,
            status,
        }
    }

    pub fn passes(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HydraulicChecks {
    pub tube_side: HydraulicCheck,
    pub shell_side: HydraulicCheck,
}

/// Results of a heat exchanger sizing calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatExchangerResult {
    /// Heat duty (W)
    pub heat_load: f64,
    /// Cold stream flow needed to absorb the duty (kg/s)
    pub cold_flowrate: f64,
    /// Log mean temperature difference (K)
    pub lmtd: f64,
    /// LMTD correction factor
    pub f_corr: f64,
    /// Corrected mean temperature difference (K)
    pub tm: f64,
    /// Area required at the assumed U (m²)
    pub area_required: f64,
    /// Outside area of one tube (m²)
    pub area_one_tube: f64,
    /// Tube count; kept as f64 so a degenerate area stays visible
    pub num_tubes: f64,
    /// Area provided by `num_tubes` (m²)
    pub area_considered: f64,
    /// Bundle diameter (m)
    pub bundle_diameter: f64,
    /// Diametral shell-bundle clearance (m)
    pub bundle_clearance: f64,
    /// Shell inside diameter (m)
    pub shell_diameter: f64,
    pub tube_side: SideResult,
    pub shell_side: SideResult,
    /// Calculated overall coefficient (W/m²·K)
    pub overall_uo: f64,
    /// (Uo − U_assume) / U_assume (%)
    pub deviation: f64,
    pub bell_delaware: BellDelawareFactors,
    pub hydraulic_checks: HydraulicChecks,
}

impl HeatExchangerResult {
    /// Every scalar output as `(quantity, value, unit)`, in report order.
    pub fn summary_rows(&self) -> Vec<(&'static str, f64, &'static str)> {
        vec![
            ("Heat load", self.heat_load, "W"),
            ("Cold flowrate", self.cold_flowrate, "kg/s"),
            ("LMTD", self.lmtd, "K"),
            ("F correction", self.f_corr, "-"),
            ("Corrected MTD", self.tm, "K"),
            ("Area required", self.area_required, "m2"),
            ("Area per tube", self.area_one_tube, "m2"),
            ("Number of tubes", self.num_tubes, "-"),
            ("Area considered", self.area_considered, "m2"),
            ("Bundle diameter", self.bundle_diameter, "m"),
            ("Bundle clearance", self.bundle_clearance, "m"),
            ("Shell diameter", self.shell_diameter, "m"),
            ("Tube velocity", self.tube_side.velocity, "m/s"),
            ("Tube Re", self.tube_side.re, "-"),
            ("Tube Pr", self.tube_side.pr, "-"),
            ("Tube hi", self.tube_side.h, "W/m2K"),
            ("Tube pressure drop", self.tube_side.pressure_drop, "Pa"),
            ("Shell velocity", self.shell_side.velocity, "m/s"),
            ("Shell Re", self.shell_side.re, "-"),
            ("Shell Pr", self.shell_side.pr, "-"),
            ("Shell hs", self.shell_side.h, "W/m2K"),
            ("Shell pressure drop", self.shell_side.pressure_drop, "Pa"),
            ("Overall Uo", self.overall_uo, "W/m2K"),
            ("Deviation", self.deviation, "%"),
            ("Jc", self.bell_delaware.jc, "-"),
            ("Jl", self.bell_delaware.jl, "-"),
            ("Jb", self.bell_delaware.jb, "-"),
            ("Js", self.bell_delaware.js, "-"),
            ("Jr", self.bell_delaware.jr, "-"),
            ("dP cross-flow", self.bell_delaware.dp_cross, "Pa"),
            ("dP window", self.bell_delaware.dp_window, "Pa"),
            ("dP leakage", self.bell_delaware.dp_leak, "Pa"),
            ("dP bypass", self.bell_delaware.dp_bypass, "Pa"),
            ("dP end zones", self.bell_delaware.dp_end, "Pa"),
        ]
    }

    /// Quantities that came out NaN or infinite
    pub fn degenerate_fields(&self) -> Vec<(&'static str, DegenerateReason)> {
        self.summary_rows()
            .into_iter()
            .filter_map(|(name, value, _)| DegenerateReason::of(value).map(|reason| (name, reason)))
            .collect()
    }

    pub fn is_finite(&self) -> bool {
        self.degenerate_fields().is_empty()
    }

    /// Check if both pressure drops are within their allowables
    pub fn passes_hydraulics(&self) -> bool {
        self.hydraulic_checks.tube_side.passes() && self.hydraulic_checks.shell_side.passes()
    }

    /// True when |deviation| is below [`DEVIATION_LIMIT_PERCENT`]. A NaN
    /// deviation is never acceptable.
    pub fn design_acceptable(&self) -> bool {
        self.deviation.abs() < DEVIATION_LIMIT_PERCENT
    }

    /// Verdict line for reports
    pub fn design_verdict(&self) -> &'static str {
        if self.design_acceptable() {
            "Design is acceptable"
        } else {
            "Redesign recommended"
        }
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// Log mean temperature difference for counter-current flow.
///
/// Returns 0 on a temperature cross (either terminal difference ≤ 0) and the
/// terminal difference when both ends are equal.
pub fn calculate_lmtd(th_in: f64, th_out: f64, tc_in: f64, tc_out: f64) -> f64 {
    let dt1 = th_in - tc_out;
    let dt2 = th_out - tc_in;
    if dt1 <= 0.0 || dt2 <= 0.0 {
        return 0.0;
    }
    if (dt1 - dt2).abs() < 1e-6 {
        return dt1;
    }
    (dt1 - dt2) / (dt1 / dt2).ln()
}

/// LMTD correction factor F for one shell pass and an even number of tube
/// passes. `shell_passes == 0` returns 1.
pub fn calculate_f(th_in: f64, th_out: f64, tc_in: f64, tc_out: f64, shell_passes: u32) -> f64 {
    if shell_passes == 0 {
        return 1.0;
    }
    let r = (th_in - th_out) / (tc_out - tc_in);
    let p = (tc_out - tc_in) / (th_in - tc_in);

    if (r - 1.0).abs() < 1e-4 {
        let wp = p / (2.0 - p);
        return wp / ((1.0 + wp) / (1.0 - wp)).ln();
    }

    let s = (r * r + 1.0).sqrt() / (r - 1.0);
    let num = s * ((1.0 - p) / (1.0 - p * r)).ln();
    let den = ((2.0 - p * (r + 1.0 - s)) / (2.0 - p * (r + 1.0 + s))).ln();
    num / den
}

/// Size a shell-and-tube exchanger.
///
/// # Arguments
///
/// * `hot` - Shell-side stream
/// * `cold` - Tube-side stream
/// * `tube` - Tube geometry
/// * `shell` - Shell and baffle configuration
/// * `u_assume` - Assumed overall coefficient (W/m²·K)
pub fn perform_calculation(
    hot: &FluidProperties,
    cold: &FluidProperties,
    tube: &TubeSpecs,
    shell: &ShellSpecs,
    u_assume: f64,
) -> HeatExchangerResult {
    // Duty
    let heat_load = hot.mass_flow * hot.cp * hot.temperature_change();
    let cold_flowrate = heat_load / (cold.cp * cold.temperature_change());

    let lmtd = calculate_lmtd(hot.temp_in, hot.temp_out, cold.temp_in, cold.temp_out);
    let f_corr = calculate_f(hot.temp_in, hot.temp_out, cold.temp_in, cold.temp_out, shell.passes);
    let tm = f_corr * lmtd;

    // Area and tube count
    let area_required = heat_load / (u_assume * tm);
    let area_one_tube = tube.outside_area();
    let num_tubes = (area_required / area_one_tube).ceil();
    let area_considered = num_tubes * area_one_tube;

    // Bundle and shell
    let PitchConstants { k1, n1 } = tube.pitch_type.bundle_constants(shell.tube_passes);
    let bundle_diameter = tube.od * (num_tubes / k1).powf(1.0 / n1);
    let bundle_clearance = shell.head_type.clearance(&clearance_row(bundle_diameter));
    let shell_diameter = bundle_diameter + bundle_clearance;

    // Tube side (cold)
    let tubes_per_pass = num_tubes / shell.tube_passes as f64;
    let tube_velocity = cold.mass_flow / (cold.rho * tubes_per_pass * tube.flow_area());
    let tube_re = cold.reynolds(tube_velocity, tube.id);
    let tube_pr = cold.prandtl();
    let ld_column = TUBE_JH.nearest_column(tube.length_to_diameter());
    let tube_jh = TUBE_JH.lookup(tube_re, ld_column);
    let hi = tube_jh * tube_re * tube_pr.powf(0.33) * cold.k / tube.id;

    // Shell side (hot)
    let pt = tube.pitch();
    let baffle_spacing = shell_diameter * shell.baffle_ratio;
    let cross_flow_area = shell_diameter * baffle_spacing * (pt - tube.od) / pt;
    let de = tube.pitch_type.equivalent_diameter(pt, tube.od);
    let shell_velocity = hot.mass_flow / (hot.rho * cross_flow_area);
    let shell_re = hot.reynolds(shell_velocity, de);
    let shell_pr = hot.prandtl();
    let cut_column = SHELL_JH.nearest_column(shell.baffle_cut);
    let shell_jh = SHELL_JH.lookup(shell_re, cut_column);
    let hs_ideal = shell_jh * shell_re * shell_pr.powf(0.33) * hot.k / de;

    // Bell-Delaware corrections
    let theta_c = 2.0 * (1.0 - 2.0 * shell.baffle_cut / 100.0).acos();
    let fc = 1.0 - (theta_c - theta_c.sin()) / PI;
    let jc = 0.55 + 0.72 * fc;
    let jl = 0.44 + 0.56 * (-1.33 * LEAKAGE_RATIO).exp();
    let jb = (-1.25 * BYPASS_RATIO).exp();
    let js = 1.0;
    let jr = if shell_re > 100.0 {
        1.0
    } else {
        (10.0 / shell_re).powf(0.1)
    };
    let hs = hs_ideal * jc * jl * jb * js * jr;

    // Overall coefficient referred to the tube OD
    let wall = tube.od * (tube.od / tube.id).ln() / (2.0 * tube.material_conductivity);
    let inv_uo = 1.0 / hs
        + hot.fouling_resistance
        + wall
        + (tube.od / tube.id) * (cold.fouling_resistance + 1.0 / hi);
    let overall_uo = 1.0 / inv_uo;
    let deviation = (overall_uo - u_assume) / u_assume * 100.0;

    // Tube-side pressure drop
    let tube_jf = TUBE_JF.lookup(tube_re, 0);
    let tube_dp = (shell.tube_passes as f64 / 2.0)
        * (8.0 * tube_jf * tube.length_to_diameter() + 2.5)
        * cold.dynamic_pressure(tube_velocity);

    // Shell-side pressure drop
    let shell_jf = SHELL_JF.lookup(shell_re, SHELL_JF.nearest_column(shell.baffle_cut));
    let shell_dyn = hot.dynamic_pressure(shell_velocity);
    let crosses = tube.length / baffle_spacing;
    let dp_cross = crosses * shell_jf * shell_dyn;
    let windows = (tube.length / baffle_spacing).ceil() - 1.0;
    let dp_window = windows * WINDOW_LOSS_COEFF * hot.dynamic_pressure(shell_velocity * WINDOW_VELOCITY_FACTOR);
    let dp_leak = dp_cross * (1.0 - jl) / jl;
    let dp_bypass = dp_cross * (1.0 - jb) / jb;
    let dp_end = 2.0 * shell_dyn;

    let bell_delaware = BellDelawareFactors {
        jc,
        jl,
        jb,
        js,
        jr,
        dp_cross,
        dp_window,
        dp_leak,
        dp_bypass,
        dp_end,
    };
    let shell_dp = bell_delaware.total_pressure_drop();

    let hydraulic_checks = HydraulicChecks {
        tube_side: HydraulicCheck::new(Bar(cold.allowable_dp), Pascals(tube_dp)),
        shell_side: HydraulicCheck::new(Bar(hot.allowable_dp), Pascals(shell_dp)),
    };

    HeatExchangerResult {
        heat_load,
        cold_flowrate,
        lmtd,
        f_corr,
        tm,
        area_required,
        area_one_tube,
        num_tubes,
        area_considered,
        bundle_diameter,
        bundle_clearance,
        shell_diameter,
        tube_side: SideResult {
            velocity: tube_velocity,
            re: tube_re,
            pr: tube_pr,
            h: hi,
            pressure_drop: tube_dp,
        },
        shell_side: SideResult {
            velocity: shell_velocity,
            re: shell_re,
            pr: shell_pr,
            h: hs,
            pressure_drop: shell_dp,
        },
        overall_uo,
        deviation,
        bell_delaware,
        hydraulic_checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kerosene_water() -> HeatExchangerInput {
        HeatExchangerInput {
            label: "E-101".to_string(),
            hot: FluidProperties {
                label: "Kerosene".to_string(),
                mass_flow: 10.0,
                temp_in: 100.0,
                temp_out: 60.0,
                allowable_dp: 0.7,
                fouling_resistance: 0.0002,
                cp: 2200.0,
                mu: 0.0005,
                k: 0.13,
                rho: 750.0,
            },
            cold: FluidProperties {
                label: "Cooling water".to_string(),
                mass_flow: 10.53,
                temp_in: 30.0,
                temp_out: 50.0,
                allowable_dp: 0.7,
                fouling_resistance: 0.0002,
                cp: 4180.0,
                mu: 0.0008,
                k: 0.6,
                rho: 995.0,
            },
            tube: TubeSpecs {
                od: 0.020,
                id: 0.016,
                length: 4.88,
                thickness: 0.002,
                material: "Carbon steel".to_string(),
                material_conductivity: 45.0,
                pitch_type: PitchType::Triangular,
                pitch_ratio: 1.25,
            },
            shell: ShellSpecs {
                head_type: ShellHeadType::SplitRing,
                passes: 1,
                tube_passes: 2,
                baffle_ratio: 0.4,
                baffle_cut: 25.0,
            },
            u_assume: 500.0,
        }
    }

    #[test]
    fn test_duty_and_cold_flow() {
        let result = kerosene_water().calculate();
        assert_eq!(result.heat_load, 880_000.0);
        assert_relative_eq!(result.cold_flowrate, 880_000.0 / (4180.0 * 20.0), epsilon = 1e-12);
        assert_relative_eq!(result.cold_flowrate, 10.526, epsilon = 1e-3);
    }

    #[test]
    fn test_lmtd() {
        let lmtd = calculate_lmtd(100.0, 60.0, 30.0, 50.0);
        assert!(lmtd.is_finite() && lmtd > 0.0);
        assert_relative_eq!(lmtd, 20.0 / (50.0_f64 / 30.0).ln(), epsilon = 1e-12);

        // Temperature cross
        assert_eq!(calculate_lmtd(50.0, 40.0, 30.0, 60.0), 0.0);
        assert_eq!(calculate_lmtd(100.0, 30.0, 30.0, 50.0), 0.0);

        // Balanced terminal differences
        assert_eq!(calculate_lmtd(100.0, 60.0, 40.0, 80.0), 20.0);
    }

    #[test]
    fn test_f_correction() {
        assert_eq!(calculate_f(100.0, 60.0, 30.0, 50.0, 0), 1.0);

        let f = calculate_f(100.0, 60.0, 30.0, 50.0, 1);
        assert!(f > 0.0 && f <= 1.0);
        assert_relative_eq!(f, 0.9046, epsilon = 1e-3);

        // R == 1 branch
        let p: f64 = 20.0 / 70.0;
        let wp = p / (2.0 - p);
        let expected = wp / ((1.0 + wp) / (1.0 - wp)).ln();
        assert_relative_eq!(calculate_f(100.0, 80.0, 30.0, 50.0, 1), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_area_and_geometry() {
        let result = kerosene_water().calculate();
        assert_eq!(result.num_tubes, result.num_tubes.round());
        assert!(result.num_tubes >= 1.0);
        assert!(result.area_considered >= result.area_required);
        assert_relative_eq!(result.area_one_tube, PI * 0.020 * 4.87, epsilon = 1e-12);
        assert_relative_eq!(
            result.shell_diameter,
            result.bundle_diameter + result.bundle_clearance,
            epsilon = 1e-12
        );
        assert!(result.bundle_clearance > 0.0);
        assert_relative_eq!(result.tm, result.f_corr * result.lmtd, epsilon = 1e-12);
    }

    #[test]
    fn test_bell_delaware_factors() {
        let result = kerosene_water().calculate();
        let bd = result.bell_delaware;

        let theta: f64 = 2.0 * (0.5_f64).acos();
        let fc = 1.0 - (theta - theta.sin()) / PI;
        assert_relative_eq!(bd.jc, 0.55 + 0.72 * fc, epsilon = 1e-12);
        assert_relative_eq!(bd.jl, 0.44 + 0.56 * (-1.33_f64 * 0.04).exp(), epsilon = 1e-12);
        assert_relative_eq!(bd.jb, (-1.25_f64 * 0.05).exp(), epsilon = 1e-12);
        assert_eq!(bd.js, 1.0);
        assert!(result.shell_side.re > 100.0);
        assert_eq!(bd.jr, 1.0);

        assert_relative_eq!(result.shell_side.pressure_drop, bd.total_pressure_drop(), epsilon = 1e-9);
        assert_relative_eq!(bd.dp_leak, bd.dp_cross * (1.0 - bd.jl) / bd.jl, epsilon = 1e-9);
    }

    #[test]
    fn test_overall_coefficient_and_deviation() {
        let input = kerosene_water();
        let result = input.calculate();
        assert!(result.overall_uo > 0.0);
        assert!(result.overall_uo < result.tube_side.h);
        assert_relative_eq!(
            result.deviation,
            (result.overall_uo - input.u_assume) / input.u_assume * 100.0,
            epsilon = 1e-9
        );
        assert!(result.is_finite());
    }

    #[test]
    fn test_design_verdict_limit() {
        let mut result = kerosene_water().calculate();

        for deviation in [0.0, 29.9, -29.9] {
            result.deviation = deviation;
            assert!(result.design_acceptable(), "deviation {}", deviation);
            assert_eq!(result.design_verdict(), "Design is acceptable");
        }
        for deviation in [30.0, -30.0, 45.0, f64::INFINITY, f64::NAN] {
            result.deviation = deviation;
            assert!(!result.design_acceptable(), "deviation {}", deviation);
            assert_eq!(result.design_verdict(), "Redesign recommended");
        }
    }

    #[test]
    fn test_hydraulic_checks() {
        let result = kerosene_water().calculate();
        let checks = result.hydraulic_checks;
        assert_eq!(checks.tube_side.allowable_pa, 70_000.0);
        assert_eq!(checks.tube_side.actual_pa, result.tube_side.pressure_drop);
        assert_eq!(checks.shell_side.actual_pa, result.shell_side.pressure_drop);
        for check in [checks.tube_side, checks.shell_side] {
            assert_eq!(check.passes(), check.actual_pa <= check.allowable_pa);
        }

        let zero = HydraulicCheck::new(Bar(0.0), Pascals(10.0));
        assert!(zero.utilization.is_infinite());
        assert_eq!(zero.status, CheckStatus::NotOk);
    }

    #[test]
    fn test_zero_viscosity_is_degenerate() {
        let mut input = kerosene_water();
        input.cold.mu = 0.0;
        let result = input.calculate();
        assert!(result.tube_side.re.is_infinite());
        assert!(!result.is_finite());
        let names: Vec<&str> = result.degenerate_fields().iter().map(|(n, _)| *n).collect();
        assert!(names.contains(&"Tube Re"));
    }

    #[test]
    fn test_temperature_cross_is_degenerate() {
        let mut input = kerosene_water();
        input.cold.temp_out = 110.0;
        let result = input.calculate();
        assert_eq!(result.lmtd, 0.0);
        assert!(result.area_required.is_infinite() || result.area_required.is_nan());
        assert!(!result.is_finite());
    }

    #[test]
    fn test_head_type_serialization() {
        let json = serde_json::to_string(&ShellHeadType::SplitRing).unwrap();
        assert_eq!(json, "\"Split-ring\"");
        let parsed: ShellHeadType = serde_json::from_str("\"Pull-through\"").unwrap();
        assert_eq!(parsed, ShellHeadType::PullThrough);

        let input = kerosene_water();
        let roundtrip: HeatExchangerInput =
            serde_json::from_str(&serde_json::to_string(&input).unwrap()).unwrap();
        assert_eq!(roundtrip, input);
    }
}
