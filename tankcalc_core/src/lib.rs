//! # tankcalc_core - Tank and Heat Exchanger Calculation Engine
//!
//! `tankcalc_core` is the computational heart of TankCalc: storage-tank shell
//! thickness to API 650 / API 620 and shell-and-tube heat exchanger sizing.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **No panics on bad numbers**: degenerate design points come back as
//!   NaN or infinity and are reported, not thrown
//!
//! ## Quick Start
//!
//! ```rust
//! use tankcalc_core::project::Project;
//! use tankcalc_core::units::UnitSystem;
//!
//! let project = Project::new("Terminal Expansion", "Cilegon", UnitSystem::SI);
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Shell thickness and heat exchanger engines
//! - [`standard_selector`] - API 650 / API 620 recommendation from the design envelope
//! - [`tables`] - Reference charts (jh, jf, bundle constants, clearances, plates)
//! - [`interpolation`] - Table lookup and rounding helpers
//! - [`project`] - Project container, metadata, and settings
//! - [`file_io`] - File operations with atomic saves and locking
//! - [`export`] - CSV output
//! - [`pdf`] - Typst PDF reports
//! - [`units`] - Unit system and type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod interpolation;
pub mod pdf;
pub mod project;
pub mod standard_selector;
pub mod tables;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{CalculationItem, CalculationOutput, CheckStatus, DegenerateReason, DesignCase};
pub use errors::{CalcError, CalcResult};
pub use file_io::{list_projects, load_project, save_project, FileLock, SavedProjectMeta};
pub use project::{GlobalSettings, Project, ProjectMetadata};
pub use standard_selector::DesignStandard;
pub use units::UnitSystem;
