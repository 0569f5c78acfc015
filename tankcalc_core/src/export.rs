//! # CSV Export
//!
//! Plain-text tables for spreadsheets. Numbers use a fixed number of
//! decimals; NaN and infinite values are written as `-`.
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::export::format_value;
//!
//! assert_eq!(format_value(3.378125, 4), "3.3781");
//! assert_eq!(format_value(f64::INFINITY, 4), "-");
//! ```

use crate::calculations::heat_exchanger::HeatExchangerResult;
use crate::calculations::shell_thickness::ShellCalcResult;

/// Header row of the shell course table
pub const SHELL_CSV_HEADER: &str = "Course,Governing Case,t_calc,t_required,t_adopted,Utilization,Status";

/// Header row of the heat exchanger summary
pub const HX_CSV_HEADER: &str = "Quantity,Value,Unit";

const CSV_DECIMALS: usize = 4;

/// Format a number with `decimals` places, or `-` when it is not finite.
pub fn format_value(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:.*}", decimals, value)
    } else {
        "-".to_string()
    }
}

/// Quote a field containing a comma, quote or newline
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Course table for a shell thickness result, one row per course.
pub fn shell_results_csv(result: &ShellCalcResult) -> String {
    let mut lines = Vec::with_capacity(result.results.len() + 1);
    lines.push(SHELL_CSV_HEADER.to_string());
    for r in &result.results {
        lines.push(
            [
                r.course_no.to_string(),
                csv_field(r.governing_case.display_name()),
                format_value(r.t_calc_governing, CSV_DECIMALS),
                format_value(r.t_required, CSV_DECIMALS),
                format_value(r.t_adopted, CSV_DECIMALS),
                format_value(r.utilization, CSV_DECIMALS),
                r.status.to_string(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// Quantity/value/unit table for a heat exchanger result, closed by the
/// design verdict row.
pub fn heat_exchanger_csv(result: &HeatExchangerResult) -> String {
    std::iter::once(HX_CSV_HEADER.to_string())
        .chain(result.summary_rows().into_iter().map(|(name, value, unit)| {
            format!("{},{},{}", csv_field(name), format_value(value, CSV_DECIMALS), unit)
        }))
        .chain(std::iter::once(format!("Design check,{},-", result.design_verdict())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Note shown when every course sits on the minimum thickness.
pub fn minimum_thickness_note(result: &ShellCalcResult) -> Option<String> {
    result.all_at_floor().then(|| {
        format!(
            "Every course is controlled by the minimum thickness: t_required = {:.2} {} for all courses.",
            result.floor_thickness,
            result.units.thickness_unit()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::shell_thickness::{run_shell_thickness, ShellCalcInput, ShellCaseInput};
    use crate::calculations::DesignCase;
    use crate::standard_selector::DesignStandard;
    use crate::units::UnitSystem;

    fn input() -> ShellCalcInput {
        ShellCalcInput {
            label: "TK-1".to_string(),
            units: UnitSystem::SI,
            standard: DesignStandard::Api650,
            diameter: 30.0,
            courses: vec![2.0, 2.0],
            specific_gravity: 1.0,
            corrosion_allowance: 2.0,
            design_pressure: 0.0,
            allowable_stress_design: 160.0,
            allowable_stress_test: 171.0,
            joint_efficiency: 1.0,
            min_nominal_thickness: 6.0,
            adopted_thicknesses: vec![10.0, 0.0],
            active_cases: vec![ShellCaseInput {
                key: DesignCase::Operating,
                liquid_height: 1.8,
            }],
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.8, 4), "0.8000");
        assert_eq!(format_value(-1.23456, 2), "-1.23");
        assert_eq!(format_value(f64::NAN, 4), "-");
        assert_eq!(format_value(f64::NEG_INFINITY, 1), "-");
    }

    #[test]
    fn test_shell_csv() {
        let result = run_shell_thickness(&input()).unwrap();
        let csv = shell_results_csv(&result);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], SHELL_CSV_HEADER);
        assert_eq!(lines[1], "1,Operating,3.3781,8.0000,10.0000,0.8000,OK");
        // Zero adopted thickness: infinite utilization
        assert_eq!(lines[2], "2,Operating,2.0000,8.0000,0.0000,-,NOT OK");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_minimum_thickness_note() {
        let result = run_shell_thickness(&input()).unwrap();
        assert_eq!(result.notes.len(), 2);
        let note = minimum_thickness_note(&result).unwrap();
        assert!(note.contains("t_required = 8.00 mm"));

        let mut deep = input();
        deep.active_cases[0].liquid_height = 20.0;
        let result = run_shell_thickness(&deep).unwrap();
        assert_eq!(minimum_thickness_note(&result), None);
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
