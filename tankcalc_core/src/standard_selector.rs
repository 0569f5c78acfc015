//! # Design Standard Selection
//!
//! Recommends the tank design standard (API 650 or API 620) from the design
//! envelope entered at project setup: internal pressure, vacuum and the
//! design temperature range.
//!
//! ## Thresholds
//!
//! | Condition                     | Limit                | Effect                          |
//! |-------------------------------|----------------------|---------------------------------|
//! | Internal pressure             | ≤ 17.2 kPa (2.5 psig)| API 650 (Annex F when P > 0)    |
//! | Internal pressure             | ≤ 103.4 kPa (15 psig)| API 620                         |
//! | Internal pressure             | > 103.4 kPa          | Out of scope, warning           |
//! | Vacuum                        | > 0.25 kPa           | API 650 Annex V                 |
//! | Vacuum                        | > 6.9 kPa            | Warning                         |
//! | Maximum temperature           | > 93 °C              | API 650 Annex M                 |
//! | Maximum temperature           | > 260 °C             | Out of scope, warning           |
//! | Maximum temperature (API 620) | > 121 °C             | Warning                         |
//! | Minimum temperature           | < −40 °C             | API 620 Annex R                 |
//! | Minimum temperature           | < −168 °C            | Out of scope, warning           |
//!
//! The limits are the scope limits of API 650 (Annexes F, M, V) and API 620
//! (Annexes Q, R). An envelope outside both yields
//! [`DesignStandard::OutOfScope`], which no shell method accepts.
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::standard_selector::{recommend_standard, DesignEnvelope, DesignStandard};
//! use tankcalc_core::units::UnitSystem;
//!
//! let envelope = DesignEnvelope {
//!     units: UnitSystem::SI,
//!     design_pressure: 5.0,
//!     design_vacuum: 0.0,
//!     t_min: 0.0,
//!     t_max: 60.0,
//! };
//! let decision = recommend_standard(&envelope);
//! assert_eq!(decision.recommended, DesignStandard::Api650);
//! ```

use serde::{Deserialize, Serialize};

use crate::units::{Celsius, Fahrenheit, Kpa, Psi, UnitSystem};

/// API 650 Annex F internal pressure limit (kPa)
pub const API_650_MAX_PRESSURE_KPA: f64 = 17.2;
/// API 620 internal pressure limit (kPa)
pub const API_620_MAX_PRESSURE_KPA: f64 = 103.4;
/// API 650 default external pressure (kPa)
pub const API_650_DEFAULT_VACUUM_KPA: f64 = 0.25;
/// API 650 Annex V external pressure limit (kPa)
pub const API_650_MAX_VACUUM_KPA: f64 = 6.9;
/// API 650 basic design temperature limit (°C)
pub const API_650_BASIC_MAX_TEMP_C: f64 = 93.0;
/// API 650 Annex M design temperature limit (°C)
pub const API_650_MAX_TEMP_C: f64 = 260.0;
/// API 620 maximum design temperature (°C)
pub const API_620_MAX_TEMP_C: f64 = 121.0;
/// Low-temperature threshold for API 620 Annex R (°C)
pub const API_620_ANNEX_R_TEMP_C: f64 = -40.0;
/// API 620 Annex Q minimum design temperature (°C)
pub const API_620_MIN_TEMP_C: f64 = -168.0;

/// Tank design standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DesignStandard {
    /// API 650, welded tanks for oil storage (one-foot method)
    #[default]
    #[serde(rename = "API_650")]
    Api650,
    /// API 620, large low-pressure storage tanks (hoop stress basis)
    #[serde(rename = "API_620")]
    Api620,
    /// Envelope outside both standards
    #[serde(rename = "OUT_OF_SCOPE")]
    OutOfScope,
}

impl DesignStandard {
    /// Standards a shell calculation can run under
    pub const ALL: [DesignStandard; 2] = [DesignStandard::Api650, DesignStandard::Api620];

    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            DesignStandard::Api650 => "API 650",
            DesignStandard::Api620 => "API 620",
            DesignStandard::OutOfScope => "Out of scope",
        }
    }
}

impl std::fmt::Display for DesignStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Design envelope from project setup, in the project's unit system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignEnvelope {
    pub units: UnitSystem,
    /// Internal gauge pressure (kPa / psi)
    pub design_pressure: f64,
    /// External pressure / vacuum magnitude (kPa / psi)
    pub design_vacuum: f64,
    /// Minimum design metal temperature (°C / °F)
    pub t_min: f64,
    /// Maximum design temperature (°C / °F)
    pub t_max: f64,
}

impl Default for DesignEnvelope {
    fn default() -> Self {
        DesignEnvelope {
            units: UnitSystem::SI,
            design_pressure: 0.0,
            design_vacuum: 0.0,
            t_min: 0.0,
            t_max: 40.0,
        }
    }
}

/// Envelope values normalised to kPa and °C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEnvelope {
    pub design_pressure_kpa: f64,
    pub design_vacuum_kpa: f64,
    pub t_min_c: f64,
    pub t_max_c: f64,
}

impl DesignEnvelope {
    /// Convert to kPa and °C
    pub fn normalized(&self) -> NormalizedEnvelope {
        match self.units {
            UnitSystem::SI => NormalizedEnvelope {
                design_pressure_kpa: self.design_pressure,
                design_vacuum_kpa: self.design_vacuum,
                t_min_c: self.t_min,
                t_max_c: self.t_max,
            },
            UnitSystem::US => NormalizedEnvelope {
                design_pressure_kpa: Kpa::from(Psi(self.design_pressure)).0,
                design_vacuum_kpa: Kpa::from(Psi(self.design_vacuum)).0,
                t_min_c: Celsius::from(Fahrenheit(self.t_min)).0,
                t_max_c: Celsius::from(Fahrenheit(self.t_max)).0,
            },
        }
    }
}

/// How firmly the envelope points to the recommended standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Outcome of [`recommend_standard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardDecision {
    pub recommended: DesignStandard,
    pub confidence: Confidence,
    pub reasons: Vec<String>,
    pub warnings: Vec<String>,
    pub normalized: NormalizedEnvelope,
}

/// Recommend a design standard for the envelope.
pub fn recommend_standard(envelope: &DesignEnvelope) -> StandardDecision {
    let n = envelope.normalized();
    let mut reasons = Vec::new();
    let mut warnings = Vec::new();
    let mut out_of_scope = false;

    let p = n.design_pressure_kpa.max(0.0);
    let mut recommended = if p <= API_650_MAX_PRESSURE_KPA {
        if p > 0.0 {
            reasons.push(format!(
                "Internal pressure {:.2} kPa is within API 650 Annex F (<= {} kPa).",
                p, API_650_MAX_PRESSURE_KPA
            ));
        } else {
            reasons.push("Atmospheric tank: API 650 basic design applies.".to_string());
        }
        DesignStandard::Api650
    } else {
        if p <= API_620_MAX_PRESSURE_KPA {
            reasons.push(format!(
                "Internal pressure {:.2} kPa exceeds API 650 (> {} kPa) and is within API 620 (<= {} kPa).",
                p, API_650_MAX_PRESSURE_KPA, API_620_MAX_PRESSURE_KPA
            ));
        } else {
            out_of_scope = true;
            warnings.push(format!(
                "Internal pressure {:.2} kPa exceeds API 620 (> {} kPa); design as a pressure vessel.",
                p, API_620_MAX_PRESSURE_KPA
            ));
        }
        DesignStandard::Api620
    };

    let vacuum = n.design_vacuum_kpa.max(0.0);
    if vacuum > API_650_MAX_VACUUM_KPA {
        warnings.push(format!(
            "Vacuum {:.2} kPa exceeds API 650 Annex V (> {} kPa); a stiffened shell stability check is required.",
            vacuum, API_650_MAX_VACUUM_KPA
        ));
    } else if vacuum > API_650_DEFAULT_VACUUM_KPA {
        reasons.push(format!(
            "Vacuum {:.2} kPa exceeds {} kPa: API 650 Annex V external pressure design applies.",
            vacuum, API_650_DEFAULT_VACUUM_KPA
        ));
    }

    if n.t_min_c < API_620_ANNEX_R_TEMP_C {
        if recommended == DesignStandard::Api650 {
            recommended = DesignStandard::Api620;
        }
        reasons.push(format!(
            "Minimum temperature {:.1} °C is below {} °C: API 620 Annex R/Q low-temperature service.",
            n.t_min_c, API_620_ANNEX_R_TEMP_C
        ));
        if n.t_min_c < API_620_MIN_TEMP_C {
            out_of_scope = true;
            warnings.push(format!(
                "Minimum temperature {:.1} °C is below API 620 Annex Q ({} °C).",
                n.t_min_c, API_620_MIN_TEMP_C
            ));
        }
    }

    match recommended {
        DesignStandard::Api650 => {
            if n.t_max_c > API_650_MAX_TEMP_C {
                out_of_scope = true;
                warnings.push(format!(
                    "Maximum temperature {:.1} °C exceeds API 650 Annex M ({} °C).",
                    n.t_max_c, API_650_MAX_TEMP_C
                ));
            } else if n.t_max_c > API_650_BASIC_MAX_TEMP_C {
                reasons.push(format!(
                    "Maximum temperature {:.1} °C exceeds {} °C: API 650 Annex M elevated temperature.",
                    n.t_max_c, API_650_BASIC_MAX_TEMP_C
                ));
            }
        }
        DesignStandard::Api620 => {
            if n.t_max_c > API_620_MAX_TEMP_C {
                warnings.push(format!(
                    "Maximum temperature {:.1} °C exceeds API 620 ({} °C).",
                    n.t_max_c, API_620_MAX_TEMP_C
                ));
            }
        }
        DesignStandard::OutOfScope => {}
    }

    if out_of_scope {
        recommended = DesignStandard::OutOfScope;
    }

    let confidence = if out_of_scope || warnings.len() > 1 {
        Confidence::Low
    } else if warnings.len() == 1 {
        Confidence::Medium
    } else {
        Confidence::High
    };

    StandardDecision {
        recommended,
        confidence,
        reasons,
        warnings,
        normalized: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn si(pressure: f64, vacuum: f64, t_min: f64, t_max: f64) -> DesignEnvelope {
        DesignEnvelope {
            units: UnitSystem::SI,
            design_pressure: pressure,
            design_vacuum: vacuum,
            t_min,
            t_max,
        }
    }

    #[test]
    fn test_atmospheric_tank_is_api_650() {
        let d = recommend_standard(&si(0.0, 0.0, 5.0, 50.0));
        assert_eq!(d.recommended, DesignStandard::Api650);
        assert_eq!(d.confidence, Confidence::High);
        assert!(d.warnings.is_empty());
    }

    #[test]
    fn test_pressure_threshold_boundaries() {
        assert_eq!(recommend_standard(&si(17.2, 0.0, 5.0, 50.0)).recommended, DesignStandard::Api650);
        assert_eq!(recommend_standard(&si(17.3, 0.0, 5.0, 50.0)).recommended, DesignStandard::Api620);

        let beyond = recommend_standard(&si(150.0, 0.0, 5.0, 50.0));
        assert_eq!(beyond.recommended, DesignStandard::OutOfScope);
        assert_eq!(beyond.confidence, Confidence::Low);
        assert_eq!(beyond.warnings.len(), 1);
    }

    #[test]
    fn test_us_envelope_is_normalized() {
        let envelope = DesignEnvelope {
            units: UnitSystem::US,
            design_pressure: 5.0,
            design_vacuum: 0.0,
            t_min: 32.0,
            t_max: 212.0,
        };
        let d = recommend_standard(&envelope);
        assert!((d.normalized.design_pressure_kpa - 34.47).abs() < 0.01);
        assert!((d.normalized.t_max_c - 100.0).abs() < 1e-9);
        assert_eq!(d.recommended, DesignStandard::Api620);
    }

    #[test]
    fn test_low_temperature_moves_to_api_620() {
        let d = recommend_standard(&si(0.0, 0.0, -50.0, 20.0));
        assert_eq!(d.recommended, DesignStandard::Api620);
        assert_eq!(d.confidence, Confidence::High);
    }

    #[test]
    fn test_elevated_temperature_and_vacuum() {
        let annex_m = recommend_standard(&si(0.0, 1.0, 5.0, 150.0));
        assert_eq!(annex_m.recommended, DesignStandard::Api650);
        assert!(annex_m.reasons.iter().any(|r| r.contains("Annex M")));
        assert!(annex_m.reasons.iter().any(|r| r.contains("Annex V")));

        let hot = recommend_standard(&si(0.0, 10.0, 5.0, 300.0));
        assert_eq!(hot.recommended, DesignStandard::OutOfScope);
        assert_eq!(hot.warnings.len(), 2);
        assert_eq!(hot.confidence, Confidence::Low);
    }

    #[test]
    fn test_cryogenic_envelope_is_out_of_scope() {
        let d = recommend_standard(&si(0.0, 0.0, -196.0, 20.0));
        assert_eq!(d.recommended, DesignStandard::OutOfScope);
        assert_eq!(d.confidence, Confidence::Low);
        assert!(!DesignStandard::ALL.contains(&d.recommended));

        let annex_q = recommend_standard(&si(0.0, 0.0, -160.0, 20.0));
        assert_eq!(annex_q.recommended, DesignStandard::Api620);
    }

    #[test]
    fn test_standard_serialization() {
        assert_eq!(
            serde_json::to_string(&DesignStandard::OutOfScope).unwrap(),
            "\"OUT_OF_SCOPE\""
        );
        assert_eq!(serde_json::to_string(&DesignStandard::Api620).unwrap(), "\"API_620\"");
        let s: DesignStandard = serde_json::from_str("\"API_650\"").unwrap();
        assert_eq!(s, DesignStandard::Api650);
    }
}
