//! # Reference Tables
//!
//! Static design data consumed by the calculation engines:
//!
//! - Bundle-diameter constants (K1, n1) per pitch pattern and tube passes
//! - Bundle-to-shell diametral clearance per head type
//! - Tube-side heat-transfer factor `jh` vs Reynolds number per L/D ratio
//! - Tube-side friction factor `jf` vs Reynolds number
//! - Shell-side `jh` and `jf` vs Reynolds number per baffle cut
//! - Standard plate thicknesses for rounding up adopted thickness
//!
//! Factor tables are held as immutable rows and sorted once by Reynolds
//! number on first use; every lookup goes through
//! [`crate::interpolation::lookup_clamped`].
//!
//! ## Data Source
//!
//! Values follow the charts in Sinnott, *Coulson & Richardson's Chemical
//! Engineering Design* Vol. 6, ch. 12 (Table 12.4, Figs. 12.10, 12.23,
//! 12.24, 12.29, 12.30), digitised at the tabulated Reynolds numbers.

use once_cell::sync::Lazy;

use crate::interpolation::{lookup_clamped, nearest_bucket};

// ============================================================================
// Bundle Diameter Constants
// ============================================================================

/// Constants of the bundle diameter correlation `Db = do (Nt / K1)^(1/n1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchConstants {
    pub k1: f64,
    pub n1: f64,
}

/// Triangular pitch (pt = 1.25 do), keyed by tube passes
pub const TRIANGULAR_PITCH: [(u32, PitchConstants); 5] = [
    (1, PitchConstants { k1: 0.319, n1: 2.142 }),
    (2, PitchConstants { k1: 0.249, n1: 2.207 }),
    (4, PitchConstants { k1: 0.175, n1: 2.285 }),
    (6, PitchConstants { k1: 0.0743, n1: 2.499 }),
    (8, PitchConstants { k1: 0.0365, n1: 2.675 }),
];

/// Square pitch (pt = 1.25 do), keyed by tube passes
pub const SQUARE_PITCH: [(u32, PitchConstants); 5] = [
    (1, PitchConstants { k1: 0.215, n1: 2.207 }),
    (2, PitchConstants { k1: 0.156, n1: 2.291 }),
    (4, PitchConstants { k1: 0.158, n1: 2.263 }),
    (6, PitchConstants { k1: 0.0402, n1: 2.617 }),
    (8, PitchConstants { k1: 0.0331, n1: 2.643 }),
];

/// Tube-pass count whose constants apply when the requested count is not tabulated
pub const FALLBACK_TUBE_PASSES: u32 = 8;

/// Find (K1, n1) for a tube-pass count, falling back to the 8-pass row.
pub fn pitch_constants(table: &[(u32, PitchConstants)], tube_passes: u32) -> PitchConstants {
    let find = |passes: u32| table.iter().find(|(p, _)| *p == passes).map(|(_, c)| *c);
    find(tube_passes)
        .or_else(|| find(FALLBACK_TUBE_PASSES))
        .unwrap_or(PitchConstants { k1: 0.0365, n1: 2.675 })
}

// ============================================================================
// Bundle Clearance
// ============================================================================

/// Diametral shell-bundle clearance at a bundle diameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearanceRow {
    /// Bundle diameter (m)
    pub dia_m: f64,
    /// Fixed tubesheet / U-tube clearance (mm)
    pub fixed_mm: f64,
    /// Split-ring floating head clearance (mm)
    pub split_ring_mm: f64,
    /// Pull-through floating head clearance (mm)
    pub pull_through_mm: f64,
}

const BUNDLE_CLEARANCE_ROWS: [ClearanceRow; 6] = [
    ClearanceRow { dia_m: 0.2, fixed_mm: 10.0, split_ring_mm: 50.0, pull_through_mm: 88.0 },
    ClearanceRow { dia_m: 0.4, fixed_mm: 12.0, split_ring_mm: 58.0, pull_through_mm: 90.0 },
    ClearanceRow { dia_m: 0.6, fixed_mm: 14.0, split_ring_mm: 66.0, pull_through_mm: 91.0 },
    ClearanceRow { dia_m: 0.8, fixed_mm: 16.0, split_ring_mm: 74.0, pull_through_mm: 92.0 },
    ClearanceRow { dia_m: 1.0, fixed_mm: 18.0, split_ring_mm: 82.0, pull_through_mm: 94.0 },
    ClearanceRow { dia_m: 1.2, fixed_mm: 20.0, split_ring_mm: 90.0, pull_through_mm: 95.0 },
];

/// Clearance rows sorted by bundle diameter
pub static BUNDLE_CLEARANCE: Lazy<Vec<ClearanceRow>> = Lazy::new(|| {
    let mut rows = BUNDLE_CLEARANCE_ROWS.to_vec();
    rows.sort_by(|a, b| a.dia_m.total_cmp(&b.dia_m));
    rows
});

/// First clearance row whose diameter is at least `bundle_diameter_m`,
/// or the last row when the bundle is larger than the table.
pub fn clearance_row(bundle_diameter_m: f64) -> ClearanceRow {
    BUNDLE_CLEARANCE
        .iter()
        .find(|row| row.dia_m >= bundle_diameter_m)
        .or_else(|| BUNDLE_CLEARANCE.last())
        .copied()
        .unwrap_or(BUNDLE_CLEARANCE_ROWS[BUNDLE_CLEARANCE_ROWS.len() - 1])
}

// ============================================================================
// Heat Transfer and Friction Factors
// ============================================================================

/// One tabulated Reynolds number with a value per secondary key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorRow {
    pub re: f64,
    pub values: &'static [f64],
}

/// A factor chart: rows by Reynolds number, columns by a secondary key
/// (L/D ratio, baffle cut %, or a single column).
#[derive(Debug, Clone)]
pub struct FactorTable {
    pub name: &'static str,
    /// Secondary key of each column
    pub keys: &'static [f64],
    rows: Vec<FactorRow>,
}

impl FactorTable {
    /// Build a table, sorting rows by Reynolds number.
    pub fn new(name: &'static str, keys: &'static [f64], rows: &[FactorRow]) -> Self {
        let mut rows = rows.to_vec();
        rows.sort_by(|a, b| a.re.total_cmp(&b.re));
        FactorTable { name, keys, rows }
    }

    /// Rows in ascending Reynolds order
    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    /// Column whose secondary key is closest to `key`
    pub fn nearest_column(&self, key: f64) -> usize {
        nearest_bucket(self.keys, key)
    }

    /// Factor at Reynolds number `re` in `column`, clamped to the end rows.
    pub fn lookup(&self, re: f64, column: usize) -> f64 {
        lookup_clamped(
            re,
            &self.rows,
            |row| row.re,
            |row| row.values.get(column).copied().unwrap_or(0.0),
        )
    }
}

/// L/D ratios of the tube-side jh chart
pub const TUBE_LD_BUCKETS: [f64; 5] = [24.0, 48.0, 120.0, 240.0, 500.0];

/// Baffle cuts (%) of the shell-side charts
pub const SHELL_CUT_BUCKETS: [f64; 4] = [15.0, 25.0, 35.0, 45.0];

const SINGLE_COLUMN: [f64; 1] = [0.0];

const TUBE_JH_ROWS: [FactorRow; 13] = [
    FactorRow { re: 10.0, values: &[0.1389, 0.1103, 0.0812, 0.0645, 0.0505] },
    FactorRow { re: 50.0, values: &[0.0475, 0.0377, 0.0278, 0.0221, 0.0173] },
    FactorRow { re: 100.0, values: &[0.0299, 0.0238, 0.0175, 0.0139, 0.0109] },
    FactorRow { re: 500.0, values: &[0.0102, 0.0081, 0.0060, 0.0047, 0.0037] },
    FactorRow { re: 1_000.0, values: &[0.0064, 0.0051, 0.0038, 0.0030, 0.0023] },
    FactorRow { re: 2_000.0, values: &[0.0041, 0.0032, 0.0024, 0.0019, 0.0015] },
    FactorRow { re: 3_000.0, values: &[0.0036, 0.0031, 0.0027, 0.0024, 0.0022] },
    FactorRow { re: 5_000.0, values: &[0.0042, 0.0040, 0.0039, 0.0039, 0.0039] },
    FactorRow { re: 10_000.0, values: &[0.0040, 0.0038, 0.0037, 0.0037, 0.0037] },
    FactorRow { re: 30_000.0, values: &[0.0030, 0.0029, 0.0029, 0.0029, 0.0029] },
    FactorRow { re: 100_000.0, values: &[0.0023, 0.0023, 0.0023, 0.0023, 0.0023] },
    FactorRow { re: 300_000.0, values: &[0.0018, 0.0018, 0.0018, 0.0018, 0.0018] },
    FactorRow { re: 1_000_000.0, values: &[0.00145, 0.00145, 0.00145, 0.00145, 0.00145] },
];

const TUBE_JF_ROWS: [FactorRow; 9] = [
    FactorRow { re: 10.0, values: &[0.8] },
    FactorRow { re: 100.0, values: &[0.08] },
    FactorRow { re: 1_000.0, values: &[0.008] },
    FactorRow { re: 2_000.0, values: &[0.004] },
    FactorRow { re: 3_000.0, values: &[0.0052] },
    FactorRow { re: 10_000.0, values: &[0.0039] },
    FactorRow { re: 100_000.0, values: &[0.0023] },
    FactorRow { re: 300_000.0, values: &[0.0018] },
    FactorRow { re: 1_000_000.0, values: &[0.00145] },
];

const SHELL_JH_ROWS: [FactorRow; 6] = [
    FactorRow { re: 10.0, values: &[0.150, 0.130, 0.120, 0.110] },
    FactorRow { re: 100.0, values: &[0.053, 0.046, 0.042, 0.039] },
    FactorRow { re: 1_000.0, values: &[0.0184, 0.0160, 0.0147, 0.0136] },
    FactorRow { re: 10_000.0, values: &[0.0067, 0.0058, 0.0053, 0.0049] },
    FactorRow { re: 100_000.0, values: &[0.0023, 0.0020, 0.0018, 0.0017] },
    FactorRow { re: 1_000_000.0, values: &[0.00083, 0.00072, 0.00066, 0.00061] },
];

const SHELL_JF_ROWS: [FactorRow; 6] = [
    FactorRow { re: 10.0, values: &[1.12, 0.90, 0.77, 0.68] },
    FactorRow { re: 100.0, values: &[0.25, 0.20, 0.17, 0.15] },
    FactorRow { re: 1_000.0, values: &[0.100, 0.080, 0.068, 0.060] },
    FactorRow { re: 10_000.0, values: &[0.0625, 0.050, 0.0425, 0.0375] },
    FactorRow { re: 100_000.0, values: &[0.044, 0.035, 0.030, 0.026] },
    FactorRow { re: 1_000_000.0, values: &[0.031, 0.025, 0.021, 0.019] },
];

/// Tube-side heat transfer factor, columns by L/D
pub static TUBE_JH: Lazy<FactorTable> =
    Lazy::new(|| FactorTable::new("tube jh", &TUBE_LD_BUCKETS, &TUBE_JH_ROWS));

/// Tube-side friction factor, single column
pub static TUBE_JF: Lazy<FactorTable> =
    Lazy::new(|| FactorTable::new("tube jf", &SINGLE_COLUMN, &TUBE_JF_ROWS));

/// Shell-side heat transfer factor, columns by baffle cut
pub static SHELL_JH: Lazy<FactorTable> =
    Lazy::new(|| FactorTable::new("shell jh", &SHELL_CUT_BUCKETS, &SHELL_JH_ROWS));

/// Shell-side friction factor, columns by baffle cut
pub static SHELL_JF: Lazy<FactorTable> =
    Lazy::new(|| FactorTable::new("shell jf", &SHELL_CUT_BUCKETS, &SHELL_JF_ROWS));

// ============================================================================
// Standard Plates
// ============================================================================

/// Standard plate thicknesses (mm)
pub const STANDARD_PLATES_MM: [f64; 12] = [6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 25.0, 28.0, 32.0];

/// Standard plate thicknesses (in)
pub const STANDARD_PLATES_IN: [f64; 7] = [0.25, 0.3125, 0.375, 0.5, 0.625, 0.75, 1.0];
