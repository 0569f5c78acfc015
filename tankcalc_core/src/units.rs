//! # Unit Types
//!
//! The unit system tag carried by every tank calculation, plus lightweight
//! newtype wrappers for the few conversions the engines actually perform.
//!
//! ## Unit Systems
//!
//! The shell engine never converts between systems. Formula constants are
//! selected by the [`UnitSystem`] tag and the tag is copied unchanged onto the
//! result:
//!
//! | Quantity    | SI  | US  |
//! |-------------|-----|-----|
//! | Length      | m   | ft  |
//! | Thickness   | mm  | in  |
//! | Stress      | MPa | psi |
//! | Pressure    | kPa | psi |
//! | Temperature | °C  | °F  |
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::units::{Kpa, Psi, UnitSystem};
//!
//! let p: Kpa = Psi(2.5).into();
//! assert!((p.0 - 17.237).abs() < 1e-3);
//! assert_eq!(UnitSystem::US.thickness_unit(), "in");
//! ```

use serde::{Deserialize, Serialize};

/// kPa per psi
pub const KPA_PER_PSI: f64 = 6.894_757;

/// Pa per bar
pub const PA_PER_BAR: f64 = 1.0e5;

// ============================================================================
// Unit System
// ============================================================================

/// Unit system tag for tank calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitSystem {
    /// Metric: m, mm, MPa, kPa, °C
    #[default]
    SI,
    /// US customary: ft, in, psi, °F
    US,
}

impl UnitSystem {
    /// All unit systems for UI selection
    pub const ALL: [UnitSystem; 2] = [UnitSystem::SI, UnitSystem::US];

    /// Unit for diameters, course heights and liquid heights
    pub fn length_unit(&self) -> &'static str {
        match self {
            UnitSystem::SI => "m",
            UnitSystem::US => "ft",
        }
    }

    /// Unit for plate thickness and corrosion allowance
    pub fn thickness_unit(&self) -> &'static str {
        match self {
            UnitSystem::SI => "mm",
            UnitSystem::US => "in",
        }
    }

    /// Unit for allowable stresses
    pub fn stress_unit(&self) -> &'static str {
        match self {
            UnitSystem::SI => "MPa",
            UnitSystem::US => "psi",
        }
    }

    /// Unit for design pressure and vacuum
    pub fn pressure_unit(&self) -> &'static str {
        match self {
            UnitSystem::SI => "kPa",
            UnitSystem::US => "psi",
        }
    }

    /// Unit for design temperatures
    pub fn temperature_unit(&self) -> &'static str {
        match self {
            UnitSystem::SI => "°C",
            UnitSystem::US => "°F",
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            UnitSystem::SI => "SI (m, mm, MPa)",
            UnitSystem::US => "US (ft, in, psi)",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::SI => write!(f, "SI"),
            UnitSystem::US => write!(f, "US"),
        }
    }
}

// ============================================================================
// Pressure Units
// ============================================================================

/// Pressure in kilopascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kpa(pub f64);

/// Pressure in pounds per square inch
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Psi(pub f64);

/// Pressure in pascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pascals(pub f64);

/// Pressure in bar
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bar(pub f64);

impl From<Psi> for Kpa {
    fn from(psi: Psi) -> Self {
        Kpa(psi.0 * KPA_PER_PSI)
    }
}

impl From<Bar> for Pascals {
    fn from(bar: Bar) -> Self {
        Pascals(bar.0 * PA_PER_BAR)
    }
}

// ============================================================================
// Temperature Units
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Celsius(pub f64);

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fahrenheit(pub f64);

impl From<Fahrenheit> for Celsius {
    fn from(f: Fahrenheit) -> Self {
        Celsius((f.0 - 32.0) * 5.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_psi_to_kpa() {
        let kpa: Kpa = Psi(15.0).into();
        assert_relative_eq!(kpa.0, 103.421, epsilon = 1e-3);
        assert_relative_eq!(Kpa::from(Psi(0.0)).0, 0.0);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        let c: Celsius = Fahrenheit(212.0).into();
        assert_relative_eq!(c.0, 100.0);
        assert_relative_eq!(Celsius::from(Fahrenheit(-40.0)).0, -40.0);
    }

    #[test]
    fn test_bar_to_pascals() {
        let pa: Pascals = Bar(0.7).into();
        assert_relative_eq!(pa.0, 70_000.0);
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(UnitSystem::SI.length_unit(), "m");
        assert_eq!(UnitSystem::US.stress_unit(), "psi");
        assert_eq!(UnitSystem::SI.pressure_unit(), "kPa");
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&UnitSystem::US).unwrap(), "\"US\"");
        let p = Kpa(17.2);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "17.2");
        let roundtrip: Kpa = serde_json::from_str(&json).unwrap();
        assert_eq!(p, roundtrip);
    }
}
