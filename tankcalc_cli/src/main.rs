//! # TankCalc CLI
//!
//! Runs every calculation in a `.tkc` project file and prints the results.
//!
//! ```text
//! tankcalc_cli <project.tkc> [--csv DIR] [--pdf DIR] [--json]
//! tankcalc_cli --list DIR
//! tankcalc_cli                      (interactive API 650 demo)
//! ```
//!
//! `--help` prints the full option list.

use std::fs;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tankcalc_core::calculations::heat_exchanger::{HeatExchangerInput, HeatExchangerResult, DEVIATION_LIMIT_PERCENT};
use tankcalc_core::calculations::shell_thickness::{
    run_shell_thickness, suggest_adopted_thicknesses, ShellCalcInput, ShellCalcResult, ShellCaseInput,
};
use tankcalc_core::export::{format_value, heat_exchanger_csv, minimum_thickness_note, shell_results_csv};
use tankcalc_core::file_io::{list_projects, load_project_with_lock_check};
use tankcalc_core::pdf::{render_heat_exchanger_pdf, render_shell_pdf};
use tankcalc_core::{CalcError, CalcResult, CalculationItem, CalculationOutput, DesignCase, DesignStandard, UnitSystem};

/// Course counts accepted by the interactive demo
const DEMO_COURSES: RangeInclusive<usize> = 1..=40;

#[derive(Parser, Debug)]
#[command(name = "tankcalc_cli")]
#[command(about = "Runs the calculations in a TankCalc project file", long_about = None)]
struct Cli {
    /// Project file (.tkc); without one an interactive API 650 demo runs
    project: Option<PathBuf>,

    /// Write one CSV table per item into DIR
    #[arg(long, value_name = "DIR", requires = "project")]
    csv: Option<PathBuf>,

    /// Write one PDF report per item into DIR
    #[arg(long, value_name = "DIR", requires = "project")]
    pdf: Option<PathBuf>,

    /// List the projects saved in DIR
    #[arg(long, value_name = "DIR", conflicts_with = "project")]
    list: Option<PathBuf>,

    /// Print every result as JSON after the tables
    #[arg(long, requires = "project")]
    json: bool,
}

/// What the command line asks for
#[derive(Debug, PartialEq)]
enum Command {
    Run {
        project: PathBuf,
        csv_dir: Option<PathBuf>,
        pdf_dir: Option<PathBuf>,
        json: bool,
    },
    List(PathBuf),
    Demo,
}

impl Cli {
    fn into_command(self) -> Command {
        match (self.list, self.project) {
            (Some(dir), _) => Command::List(dir),
            (None, Some(project)) => Command::Run {
                project,
                csv_dir: self.csv,
                pdf_dir: self.pdf,
                json: self.json,
            },
            (None, None) => Command::Demo,
        }
    }
}

fn prompt<T: FromStr + Copy>(prompt: &str, default: T) -> T {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

/// `Some(n)` when `n` courses is a count the demo accepts
fn demo_course_count(n: usize) -> Option<usize> {
    DEMO_COURSES.contains(&n).then_some(n)
}

fn prompt_course_count(default: usize) -> usize {
    loop {
        let n = prompt("Number of courses [6]: ", default);
        match demo_course_count(n) {
            Some(n) => return n,
            None => println!(
                "  Enter between {} and {} courses.",
                DEMO_COURSES.start(),
                DEMO_COURSES.end()
            ),
        }
    }
}

fn status_icon(ok: bool) -> &'static str {
    if ok {
        "✓"
    } else {
        "✗"
    }
}

fn report_error(context: &str, e: &CalcError) {
    eprintln!("Error ({}): {}", context, e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

fn rule() {
    println!("═══════════════════════════════════════════════════════════════════");
}

fn print_shell(label: &str, input: &ShellCalcInput, result: &ShellCalcResult) {
    let units = input.units;
    rule();
    println!("  SHELL THICKNESS: {}", label);
    println!("  {} / {}", input.standard, result.method);
    rule();
    println!(
        "  {:>3}  {:<22} {:>9} {:>9} {:>9} {:>7}  {}",
        "No",
        "Governing case",
        "t_calc",
        "t_req",
        "t_adopt",
        "util",
        "status"
    );
    for r in &result.results {
        let case = if r.is_min_controlled {
            format!("{} (min)", r.governing_case.display_name())
        } else {
            r.governing_case.display_name().to_string()
        };
        println!(
            "  {:>3}  {:<22} {:>9} {:>9} {:>9} {:>7}  {} {}",
            r.course_no,
            case,
            format_value(r.t_calc_governing, 3),
            format_value(r.t_required, 3),
            format_value(r.t_adopted, 3),
            format_value(r.utilization, 3),
            status_icon(r.passes()),
            r.status
        );
    }
    println!("  (thickness in {})", units.thickness_unit());
    println!();
    for note in result.notes.iter().cloned().chain(minimum_thickness_note(result)) {
        println!("  - {}", note);
    }
    if result.results.iter().any(|r| !r.is_finite()) {
        println!("  ! Some courses have no finite thickness: allowable stress exceeded.");
    }
    println!();
    println!("  RESULT: {}", if result.passes() { "PASS" } else { "FAIL" });
    println!();
}

fn print_heat_exchanger(label: &str, result: &HeatExchangerResult) {
    rule();
    println!("  HEAT EXCHANGER: {}", label);
    rule();
    for (name, value, unit) in result.summary_rows() {
        println!("  {:<22} {:>14} {}", name, format_value(value, 4), unit);
    }
    println!();
    let checks = &result.hydraulic_checks;
    for (side, check) in [("Tube side", &checks.tube_side), ("Shell side", &checks.shell_side)] {
        println!(
            "  {:<10} dP {:>12} / {:>12} Pa  {} {}",
            side,
            format_value(check.actual_pa, 0),
            format_value(check.allowable_pa, 0),
            status_icon(check.passes()),
            check.status
        );
    }
    for (name, reason) in result.degenerate_fields() {
        println!("  ! {} is {:?}", name, reason);
    }
    println!();
    println!(
        "  {} {} (|deviation| {} %, limit {} %)",
        status_icon(result.design_acceptable()),
        result.design_verdict(),
        format_value(result.deviation.abs(), 1),
        DEVIATION_LIMIT_PERCENT
    );
    println!();
}

/// File stem for an item's exports
fn export_stem(label: &str, fallback: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> CalcResult<()> {
    fs::create_dir_all(dir)
        .map_err(|e| CalcError::file_error("create directory", dir.display().to_string(), e.to_string()))?;
    let path = dir.join(name);
    fs::write(&path, contents)
        .map_err(|e| CalcError::file_error("write", path.display().to_string(), e.to_string()))?;
    println!("  wrote {}", path.display());
    Ok(())
}

fn export_shell(
    stem: &str,
    input: &ShellCalcInput,
    result: &ShellCalcResult,
    project_name: &str,
    csv_dir: Option<&Path>,
    pdf_dir: Option<&Path>,
) -> CalcResult<()> {
    if let Some(dir) = csv_dir {
        write_file(dir, &format!("{}.csv", stem), shell_results_csv(result).as_bytes())?;
    }
    if let Some(dir) = pdf_dir {
        write_file(dir, &format!("{}.pdf", stem), &render_shell_pdf(input, result, project_name)?)?;
    }
    Ok(())
}

fn export_heat_exchanger(
    stem: &str,
    input: &HeatExchangerInput,
    result: &HeatExchangerResult,
    project_name: &str,
    csv_dir: Option<&Path>,
    pdf_dir: Option<&Path>,
) -> CalcResult<()> {
    if let Some(dir) = csv_dir {
        write_file(dir, &format!("{}.csv", stem), heat_exchanger_csv(result).as_bytes())?;
    }
    if let Some(dir) = pdf_dir {
        write_file(dir, &format!("{}.pdf", stem), &render_heat_exchanger_pdf(input, result, project_name)?)?;
    }
    Ok(())
}

fn run_project(path: &Path, csv_dir: Option<&Path>, pdf_dir: Option<&Path>, json: bool) -> bool {
    let (project, lock) = match load_project_with_lock_check(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_error(&path.display().to_string(), &e);
            return false;
        }
    };

    let name = &project.meta.project_name;
    println!("TankCalc - {}", name);
    if !project.meta.location.is_empty() {
        println!("Location: {}", project.meta.location);
    }
    println!("Units: {}   Items: {}", project.settings.units, project.item_count());
    if let Some(lock) = lock {
        println!("Note: locked by {} since {}", lock.holder(), lock.locked_at.to_rfc3339());
    }
    let decision = project.recommend_standard();
    println!(
        "Recommended standard: {} ({:?} confidence)",
        decision.recommended, decision.confidence
    );
    println!();

    let mut ok = true;
    let mut outputs = Vec::new();

    for (id, item, result) in project.run_all() {
        let label = item.label();
        let stem = export_stem(label, &id.to_string());
        let exported = match (item, &result) {
            (CalculationItem::ShellThickness(input), Ok(CalculationOutput::ShellThickness(r))) => {
                print_shell(label, input, r);
                export_shell(&stem, input, r, name, csv_dir, pdf_dir)
            }
            (CalculationItem::HeatExchanger(input), Ok(CalculationOutput::HeatExchanger(r))) => {
                print_heat_exchanger(label, r);
                export_heat_exchanger(&stem, input, r, name, csv_dir, pdf_dir)
            }
            (_, Err(e)) => Err(e.clone()),
            _ => Err(CalcError::internal(format!("{} produced a mismatched result", item.calc_type()))),
        };

        if let Err(e) = exported {
            report_error(&format!("{} {}", item.calc_type(), label), &e);
            ok = false;
        }
        if let Ok(output) = result {
            outputs.push(serde_json::json!({ "id": id, "label": label, "output": output }));
        }
    }

    if json {
        println!("JSON Output:");
        match serde_json::to_string_pretty(&outputs) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                report_error("json", &CalcError::from(e));
                ok = false;
            }
        }
    }

    ok
}

fn run_list(dir: &Path) -> bool {
    match list_projects(dir) {
        Ok(projects) => {
            if projects.is_empty() {
                println!("No projects in {}", dir.display());
            }
            for meta in projects {
                println!(
                    "{}  {:<30} {:<3} {:<8} {}",
                    meta.modified.format("%Y-%m-%d %H:%M"),
                    meta.name,
                    meta.units,
                    meta.standard,
                    meta.path.display()
                );
            }
            true
        }
        Err(e) => {
            report_error("list", &e);
            false
        }
    }
}

fn run_demo() -> bool {
    println!("TankCalc CLI - API 650 Shell Thickness");
    println!("======================================");
    println!();

    let diameter = prompt("Tank diameter (m) [30.0]: ", 30.0);
    let course_count = prompt_course_count(6);
    let course_height = prompt("Course height (m) [2.4]: ", 2.4);
    let liquid_height = prompt("Design liquid height (m) [13.5]: ", 13.5);

    let mut input = ShellCalcInput {
        label: "CLI-Demo".to_string(),
        units: UnitSystem::SI,
        standard: DesignStandard::Api650,
        diameter,
        courses: vec![course_height; course_count],
        specific_gravity: 1.0,
        corrosion_allowance: 2.0,
        design_pressure: 0.0,
        allowable_stress_design: 160.0,
        allowable_stress_test: 171.0,
        joint_efficiency: 0.85,
        min_nominal_thickness: 6.0,
        adopted_thicknesses: vec![0.0; course_count],
        active_cases: vec![
            ShellCaseInput {
                key: DesignCase::Operating,
                liquid_height,
            },
            ShellCaseInput {
                key: DesignCase::Hydrotest,
                liquid_height,
            },
        ],
    };

    println!();
    println!("SG 1.0, CA 2 mm, E 0.85, Sd 160 MPa, St 171 MPa, min 6 mm");
    println!("Adopting the next standard plate for every course...");
    println!();

    let result = suggest_adopted_thicknesses(&input).and_then(|plates| {
        input.adopted_thicknesses = plates;
        run_shell_thickness(&input)
    });

    match result {
        Ok(result) => {
            print_shell(&input.label, &input, &result);
            println!("JSON Output (for API use):");
            if let Ok(json) = serde_json::to_string_pretty(&result) {
                println!("{}", json);
            }
            true
        }
        Err(e) => {
            report_error("demo", &e);
            false
        }
    }
}

fn main() -> ExitCode {
    let ok = match Cli::parse().into_command() {
        Command::Demo => run_demo(),
        Command::List(dir) => run_list(&dir),
        Command::Run {
            project,
            csv_dir,
            pdf_dir,
            json,
        } => run_project(&project, csv_dir.as_deref(), pdf_dir.as_deref(), json),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("tankcalc_cli").chain(args.iter().copied())).map(Cli::into_command)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cmd = parse(&["farm.tkc", "--csv", "out", "--json"]).unwrap();
        assert_eq!(
            cmd,
            Command::Run {
                project: PathBuf::from("farm.tkc"),
                csv_dir: Some(PathBuf::from("out")),
                pdf_dir: None,
                json: true,
            }
        );
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(parse(&[]).unwrap(), Command::Demo);
        assert_eq!(
            parse(&["--list", "projects"]).unwrap(),
            Command::List(PathBuf::from("projects"))
        );
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--csv"]).is_err());
        assert_eq!(parse(&["--bogus", "a.tkc"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["a.tkc", "b.tkc"]).is_err());
        assert_eq!(
            parse(&["--json"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["a.tkc", "--list", "projects"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_demo_course_count_range() {
        assert_eq!(demo_course_count(0), None);
        assert_eq!(demo_course_count(1), Some(1));
        assert_eq!(demo_course_count(40), Some(40));
        assert_eq!(demo_course_count(41), None);
        assert_eq!(demo_course_count(1_000_000), None);
    }

    #[test]
    fn test_export_stem() {
        assert_eq!(export_stem("TK-101 / crude", "x"), "TK-101___crude");
        assert_eq!(export_stem("", "fallback-id"), "fallback-id");
    }
}
