//! # PDF Generation Module
//!
//! Calculation reports rendered with Typst.
//!
//! ## Architecture
//!
//! - Typst templates are embedded as string constants
//! - `{{PLACEHOLDER}}` markers are replaced with escaped data
//! - Fonts come from `typst-assets`, so no files are read at runtime
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tankcalc_core::calculations::shell_thickness::{run_shell_thickness, ShellCalcInput};
//! use tankcalc_core::pdf::render_shell_pdf;
//!
//! # fn demo(input: ShellCalcInput) -> tankcalc_core::CalcResult<()> {
//! let result = run_shell_thickness(&input)?;
//! let pdf_bytes = render_shell_pdf(&input, &result, "Tank Farm B")?;
//! std::fs::write("shell_report.pdf", pdf_bytes).unwrap();
//! # Ok(())
//! # }
//! ```

use chrono::{Datelike, Utc};
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::calculations::heat_exchanger::{HeatExchangerInput, HeatExchangerResult, DEVIATION_LIMIT_PERCENT};
use crate::calculations::shell_thickness::{ShellCalcInput, ShellCalcResult};
use crate::errors::{CalcError, CalcResult};
use crate::export::{format_value, minimum_thickness_note};

// ============================================================================
// Typst World Implementation
// ============================================================================

/// A single-document Typst world with bundled fonts and no file access.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        let book = FontBook::from_fonts(&fonts);

        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), u8::try_from(now.month()).ok()?, u8::try_from(now.day()).ok()?)
    }
}

// ============================================================================
// PDF Templates
// ============================================================================

/// Page setup shared by every report
const PAGE_SETUP: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 8pt, fill: gray)[TankCalc Engineering Calculations]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 8pt)[{{PROJECT_NAME}}]],
      align(center)[#text(size: 8pt)[Page #counter(page).display()]],
      align(right)[#text(size: 8pt)[{{DATE}}]],
    )
  ]
)

#set text(font: "Libertinus Serif", size: 10pt)
"##;

/// Shell thickness report body
const SHELL_TEMPLATE: &str = r##"
#align(center)[
  #block(width: 100%, fill: rgb("#eef2f5"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Tank Shell Thickness Calculation]
    #v(4pt)
    #text(size: 12pt)[{{TANK_LABEL}}]
  ]
]

#v(10pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Project*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 3pt,
      [Project:], [{{PROJECT_NAME}}],
      [Date:], [{{DATE}}],
      [Units:], [{{UNITS}}],
    )
  ],
  [
    *Design Basis*
    #v(4pt)
    {{STANDARD}} \
    {{METHOD}}
  ]
)

== Design Data

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
  [Nominal diameter (D)], [{{DIAMETER}}], [{{LEN_UNIT}}],
  [Number of courses], [{{COURSE_COUNT}}], [],
  [Specific gravity (G)], [{{SG}}], [],
  [Corrosion allowance (CA)], [{{CA}}], [{{THK_UNIT}}],
  [Joint efficiency (E)], [{{E}}], [],
  [Allowable stress, design (S#sub[d])], [{{SD}}], [{{STRESS_UNIT}}],
  [Allowable stress, test (S#sub[t])], [{{ST}}], [{{STRESS_UNIT}}],
  [Minimum nominal thickness], [{{TMIN}}], [{{THK_UNIT}}],
  [Design pressure], [{{DESIGN_PRESSURE}}], [{{PRESSURE_UNIT}}],
)

#v(8pt)

*Design cases*

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Case*], [*Liquid height*], [*Unit*]),
{{CASE_ROWS}}
)

== Course Results

#table(
  columns: (auto, auto, 1fr, auto, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (center, right, left, right, right, right, right, center),
  table.header([*No.*], [*Height*], [*Governing*], [*t#sub[calc]*], [*t#sub[req]*], [*t#sub[adopt]*], [*Util.*], [*Status*]),
{{COURSE_ROWS}}
)

#text(size: 8pt)[Thicknesses in {{THK_UNIT}}, heights in {{LEN_UNIT}}. (min) marks courses controlled by the minimum thickness.]

#v(8pt)

*Notes*

{{NOTES}}

#v(12pt)

#let pass_status = "{{OVERALL_PASS}}"
#align(center)[
  #block(
    width: auto,
    fill: if pass_status == "PASS" { rgb("#d4edda") } else { rgb("#f8d7da") },
    inset: 14pt,
    radius: 4pt
  )[
    #text(size: 14pt, weight: "bold")[
      #if pass_status == "PASS" [ALL COURSES ADEQUATE] else [ADOPTED THICKNESS INSUFFICIENT]
    ]
  ]
]

#v(16pt)
#text(size: 8pt, fill: gray)[
  Calculations should be verified by a qualified engineer.
]
"##;

/// Heat exchanger report body
const HX_TEMPLATE: &str = r##"
#align(center)[
  #block(width: 100%, fill: rgb("#eef2f5"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Shell-and-Tube Heat Exchanger Sizing]
    #v(4pt)
    #text(size: 12pt)[{{HX_LABEL}}]
  ]
]

#v(10pt)

#table(
  columns: (auto, 1fr),
  stroke: none,
  row-gutter: 3pt,
  [Project:], [{{PROJECT_NAME}}],
  [Date:], [{{DATE}}],
  [Method:], [Kern with Bell-Delaware corrections],
)

== Process Data

#table(
  columns: (1fr, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, left),
  table.header([*Property*], [*Shell (hot)*], [*Tube (cold)*], [*Unit*]),
{{FLUID_ROWS}}
)

== Mechanical Data

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
{{MECH_ROWS}}
)

== Results

#table(
  columns: (1fr, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Quantity*], [*Value*], [*Unit*]),
{{RESULT_ROWS}}
)

== Hydraulic Check

#table(
  columns: (1fr, auto, auto, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, right, right, center),
  table.header([*Side*], [*Actual (Pa)*], [*Allowable (Pa)*], [*Util.*], [*Status*]),
{{HYDRAULIC_ROWS}}
)

#v(12pt)

#let design_ok = "{{DESIGN_OK}}"
#align(center)[
  #block(
    width: auto,
    fill: if design_ok == "YES" { rgb("#d4edda") } else { rgb("#f8d7da") },
    inset: 14pt,
    radius: 4pt
  )[
    #text(size: 14pt, weight: "bold")[{{VERDICT}}]
  ]
]

#v(12pt)
#text(size: 8pt, fill: gray)[
  Calculations should be verified by a qualified engineer.
]
"##;

// ============================================================================
// PDF Rendering Functions
// ============================================================================

/// Render a shell thickness calculation to PDF.
///
/// # Arguments
///
/// * `input` - The shell calculation input
/// * `result` - Result of [`run_shell_thickness`](crate::calculations::shell_thickness::run_shell_thickness)
/// * `project_name` - Shown in the header block and page footer
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF file as bytes
/// * `Err(CalcError::ReportFailed)` - If Typst compilation fails
pub fn render_shell_pdf(input: &ShellCalcInput, result: &ShellCalcResult, project_name: &str) -> CalcResult<Vec<u8>> {
    let units = input.units;
    let thk = |v: f64| num(v, 2);

    let case_rows = input
        .active_cases
        .iter()
        .map(|c| {
            format!(
                "  [{}], [{}], [{}],",
                escape_typst(c.key.display_name()),
                num(c.liquid_height, 3),
                units.length_unit()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let course_rows = result
        .results
        .iter()
        .map(|r| {
            let governing = if r.is_min_controlled {
                format!("{} (min)", r.governing_case.display_name())
            } else {
                r.governing_case.display_name().to_string()
            };
            format!(
                "  [{}], [{}], [{}], [{}], [{}], [{}], [{}], [{}],",
                r.course_no,
                num(r.course_height, 3),
                escape_typst(&governing),
                thk(r.t_calc_governing),
                thk(r.t_required),
                thk(r.t_adopted),
                num(r.utilization, 3),
                r.status,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let notes = shell_note_items(result).join("\n");

    let body = SHELL_TEMPLATE
        .replace("{{TANK_LABEL}}", &escape_typst(&input.label))
        .replace("{{UNITS}}", units.display_name())
        .replace("{{STANDARD}}", input.standard.display_name())
        .replace("{{METHOD}}", &escape_typst(&result.method))
        .replace("{{DIAMETER}}", &num(input.diameter, 3))
        .replace("{{COURSE_COUNT}}", &result.course_count.to_string())
        .replace("{{SG}}", &num(input.specific_gravity, 3))
        .replace("{{CA}}", &thk(input.corrosion_allowance))
        .replace("{{E}}", &num(input.joint_efficiency, 2))
        .replace("{{SD}}", &num(input.allowable_stress_design, 1))
        .replace("{{ST}}", &num(input.allowable_stress_test, 1))
        .replace("{{TMIN}}", &thk(input.min_nominal_thickness))
        .replace("{{DESIGN_PRESSURE}}", &num(input.design_pressure, 2))
        .replace("{{LEN_UNIT}}", units.length_unit())
        .replace("{{THK_UNIT}}", units.thickness_unit())
        .replace("{{STRESS_UNIT}}", units.stress_unit())
        .replace("{{PRESSURE_UNIT}}", units.pressure_unit())
        .replace("{{CASE_ROWS}}", &case_rows)
        .replace("{{COURSE_ROWS}}", &course_rows)
        .replace("{{NOTES}}", &notes)
        .replace("{{OVERALL_PASS}}", if result.passes() { "PASS" } else { "FAIL" });

    compile_pdf("Shell thickness", fill_page(body, project_name))
}

/// Render a heat exchanger sizing calculation to PDF.
pub fn render_heat_exchanger_pdf(
    input: &HeatExchangerInput,
    result: &HeatExchangerResult,
    project_name: &str,
) -> CalcResult<Vec<u8>> {
    let (hot, cold) = (&input.hot, &input.cold);
    let fluid_rows = [
        ("Fluid", escape_typst(&hot.label), escape_typst(&cold.label), ""),
        ("Mass flow", num(hot.mass_flow, 3), num(cold.mass_flow, 3), "kg/s"),
        ("Inlet temperature", num(hot.temp_in, 1), num(cold.temp_in, 1), "°C"),
        ("Outlet temperature", num(hot.temp_out, 1), num(cold.temp_out, 1), "°C"),
        ("Specific heat", num(hot.cp, 0), num(cold.cp, 0), "J/kg K"),
        ("Viscosity", num(hot.mu, 6), num(cold.mu, 6), "Pa s"),
        ("Conductivity", num(hot.k, 4), num(cold.k, 4), "W/m K"),
        ("Density", num(hot.rho, 1), num(cold.rho, 1), "kg/m3"),
        ("Fouling resistance", num(hot.fouling_resistance, 5), num(cold.fouling_resistance, 5), "m2 K/W"),
        ("Allowable pressure drop", num(hot.allowable_dp, 3), num(cold.allowable_dp, 3), "bar"),
    ]
    .iter()
    .map(|(name, h, c, unit)| format!("  [{}], [{}], [{}], [{}],", name, h, c, unit))
    .collect::<Vec<_>>()
    .join("\n");

    let tube = &input.tube;
    let shell = &input.shell;
    let mech_rows = [
        ("Tube OD", num(tube.od * 1000.0, 2), "mm"),
        ("Tube ID", num(tube.id * 1000.0, 2), "mm"),
        ("Tube length", num(tube.length, 3), "m"),
        ("Tube material", escape_typst(&tube.material), ""),
        ("Wall conductivity", num(tube.material_conductivity, 1), "W/m K"),
        ("Pitch", format!("{} x {}", tube.pitch_type.display_name(), num(tube.pitch_ratio, 2)), "OD"),
        ("Head type", shell.head_type.display_name().to_string(), ""),
        ("Shell passes", shell.passes.to_string(), ""),
        ("Tube passes", shell.tube_passes.to_string(), ""),
        ("Baffle spacing ratio", num(shell.baffle_ratio, 2), "Ds"),
        ("Baffle cut", num(shell.baffle_cut, 0), "%"),
        ("Assumed U", num(input.u_assume, 1), "W/m2 K"),
    ]
    .iter()
    .map(|(name, value, unit)| format!("  [{}], [{}], [{}],", name, value, unit))
    .collect::<Vec<_>>()
    .join("\n");

    let result_rows = result
        .summary_rows()
        .into_iter()
        .map(|(name, value, unit)| {
            format!(
                "  [{}], [{}], [{}],",
                escape_typst(name),
                num(value, 4),
                escape_typst(unit)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let checks = &result.hydraulic_checks;
    let hydraulic_rows = [("Tube side", &checks.tube_side), ("Shell side", &checks.shell_side)]
        .iter()
        .map(|(side, check)| {
            format!(
                "  [{}], [{}], [{}], [{}], [{}],",
                side,
                num(check.actual_pa, 0),
                num(check.allowable_pa, 0),
                num(check.utilization, 3),
                check.status,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = HX_TEMPLATE
        .replace("{{HX_LABEL}}", &escape_typst(&input.label))
        .replace("{{FLUID_ROWS}}", &fluid_rows)
        .replace("{{MECH_ROWS}}", &mech_rows)
        .replace("{{RESULT_ROWS}}", &result_rows)
        .replace("{{HYDRAULIC_ROWS}}", &hydraulic_rows)
        .replace("{{DESIGN_OK}}", if result.design_acceptable() { "YES" } else { "NO" })
        .replace("{{VERDICT}}", &escape_typst(&verdict_text(result)));

    compile_pdf("Heat exchanger", fill_page(body, project_name))
}

/// Bullet items for the notes section, the minimum thickness note last
fn shell_note_items(result: &ShellCalcResult) -> Vec<String> {
    result
        .notes
        .iter()
        .cloned()
        .chain(minimum_thickness_note(result))
        .map(|n| format!("- {}", escape_typst(&n)))
        .collect()
}

fn verdict_text(result: &HeatExchangerResult) -> String {
    format!(
        "{} (deviation {} %, limit {} %)",
        result.design_verdict(),
        format_value(result.deviation, 1),
        DEVIATION_LIMIT_PERCENT
    )
}

/// Prepend the page setup and fill the shared placeholders
fn fill_page(body: String, project_name: &str) -> String {
    format!("{}{}", PAGE_SETUP, body)
        .replace("{{PROJECT_NAME}}", &escape_typst(project_name))
        .replace("{{DATE}}", &Utc::now().format("%Y-%m-%d").to_string())
}

/// Compile Typst source to PDF bytes
fn compile_pdf(report: &str, source: String) -> CalcResult<Vec<u8>> {
    let world = PdfWorld::new(source);

    let document = typst::compile(&world).output.map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed(report, format!("Typst compilation: {}", messages.join("; ")))
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CalcError::report_failed(report, format!("PDF export: {}", messages.join("; ")))
    })
}

/// Formatted number, escaped for Typst markup
fn num(value: f64, decimals: usize) -> String {
    escape_typst(&format_value(value, decimals))
}

/// Escape Typst markup characters in user-provided text
fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '"' | '~' | '=' | '-' | '+' | '/') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
