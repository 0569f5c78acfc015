//! # Project Data Structures
//!
//! The `Project` struct is the root container for all calculation data.
//! Projects serialize to `.tkc` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, name, location, timestamps)
//! ├── settings: GlobalSettings (unit system, design envelope, standard)
//! └── items: HashMap<Uuid, CalculationItem> (all calculations)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tankcalc_core::project::Project;
//! use tankcalc_core::units::UnitSystem;
//!
//! let project = Project::new("Terminal Expansion", "Cilegon", UnitSystem::SI);
//!
//! // Serialize to JSON
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("Terminal Expansion"));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{CalculationItem, CalculationOutput};
use crate::errors::CalcResult;
use crate::standard_selector::{recommend_standard, DesignEnvelope, DesignStandard, StandardDecision};
use crate::units::UnitSystem;

/// Current schema version for .tkc files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// This is the top-level struct that gets serialized to `.tkc` files.
/// Items are stored in a flat UUID-keyed map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, name, location)
    pub meta: ProjectMetadata,

    /// Global settings (units, design envelope)
    pub settings: GlobalSettings,

    /// All calculation items, keyed by UUID
    pub items: HashMap<Uuid, CalculationItem>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `project_name` - Project or facility name
    /// * `location` - Site location (may be empty)
    /// * `units` - Unit system for tank calculations
    ///
    /// # Example
    ///
    /// ```rust
    /// use tankcalc_core::project::Project;
    /// use tankcalc_core::units::UnitSystem;
    ///
    /// let project = Project::new("Tank Farm B", "Balikpapan", UnitSystem::US);
    /// assert_eq!(project.meta.project_name, "Tank Farm B");
    /// assert_eq!(project.settings.units, UnitSystem::US);
    /// ```
    pub fn new(project_name: impl Into<String>, location: impl Into<String>, units: UnitSystem) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                project_name: project_name.into(),
                location: location.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::for_units(units),
            items: HashMap::new(),
        }
    }

    /// Add a calculation item to the project.
    ///
    /// Returns the UUID assigned to the item.
    pub fn add_item(&mut self, item: CalculationItem) -> Uuid {
        let id = Uuid::new_v4();
        self.items.insert(id, item);
        self.touch();
        id
    }

    /// Remove a calculation item by UUID.
    ///
    /// Returns the removed item if it existed.
    pub fn remove_item(&mut self, id: &Uuid) -> Option<CalculationItem> {
        let item = self.items.remove(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    /// Get a calculation item by UUID.
    pub fn get_item(&self, id: &Uuid) -> Option<&CalculationItem> {
        self.items.get(id)
    }

    /// Get a mutable reference to a calculation item by UUID.
    ///
    /// Marks the project as modified when the item exists.
    pub fn get_item_mut(&mut self, id: &Uuid) -> Option<&mut CalculationItem> {
        if self.items.contains_key(id) {
            self.meta.modified = Utc::now();
            self.items.get_mut(id)
        } else {
            None
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Items ordered by label, then UUID.
    pub fn sorted_items(&self) -> Vec<(&Uuid, &CalculationItem)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|a, b| a.1.label().cmp(b.1.label()).then(a.0.cmp(b.0)));
        items
    }

    /// Run every item, in [`Project::sorted_items`] order.
    pub fn run_all(&self) -> Vec<(Uuid, &CalculationItem, CalcResult<CalculationOutput>)> {
        self.sorted_items()
            .into_iter()
            .map(|(id, item)| (*id, item, item.run()))
            .collect()
    }

    /// Standard of the first shell calculation, or the project default.
    pub fn primary_standard(&self) -> DesignStandard {
        self.sorted_items()
            .into_iter()
            .find_map(|(_, item)| match item {
                CalculationItem::ShellThickness(input) => Some(input.standard),
                _ => None,
            })
            .unwrap_or(self.settings.default_standard)
    }

    /// Recommend a design standard from the project's design envelope.
    pub fn recommend_standard(&self) -> StandardDecision {
        recommend_standard(&self.settings.envelope)
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", UnitSystem::SI)
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub project_name: String,

    /// Site location
    #[serde(default)]
    pub location: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Global project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Unit system for tank calculations
    pub units: UnitSystem,

    /// Pressure and temperature envelope used for standard selection
    pub envelope: DesignEnvelope,

    /// Standard applied to new shell calculations
    pub default_standard: DesignStandard,
}

impl GlobalSettings {
    pub fn for_units(units: UnitSystem) -> Self {
        let envelope = match units {
            UnitSystem::SI => DesignEnvelope::default(),
            UnitSystem::US => DesignEnvelope {
                units,
                t_min: 32.0,
                t_max: 104.0,
                ..DesignEnvelope::default()
            },
        };
        GlobalSettings {
            units,
            envelope,
            default_standard: DesignStandard::Api650,
        }
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings::for_units(UnitSystem::SI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::shell_thickness::{ShellCalcInput, ShellCaseInput};
    use crate::calculations::DesignCase;

    fn shell_item(label: &str, standard: DesignStandard) -> CalculationItem {
        CalculationItem::ShellThickness(ShellCalcInput {
            label: label.to_string(),
            units: UnitSystem::SI,
            standard,
            diameter: 30.0,
            courses: vec![2.0],
            specific_gravity: 1.0,
            corrosion_allowance: 2.0,
            design_pressure: 0.0,
            allowable_stress_design: 160.0,
            allowable_stress_test: 171.0,
            joint_efficiency: 1.0,
            min_nominal_thickness: 6.0,
            adopted_thicknesses: vec![10.0],
            active_cases: vec![ShellCaseInput {
                key: DesignCase::Operating,
                liquid_height: 1.8,
            }],
        })
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("Terminal Expansion", "Cilegon", UnitSystem::SI);
        assert_eq!(project.meta.project_name, "Terminal Expansion");
        assert_eq!(project.meta.location, "Cilegon");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.units, UnitSystem::SI);
        assert_eq!(project.settings.envelope.units, UnitSystem::SI);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Tank Farm B", "Balikpapan", UnitSystem::US);
        project.add_item(shell_item("TK-1", DesignStandard::Api650));
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Tank Farm B"));
        assert!(json.contains("\"type\": \"ShellThickness\""));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.project_name, "Tank Farm B");
        assert_eq!(roundtrip.settings.units, UnitSystem::US);
        assert_eq!(roundtrip.item_count(), 1);
    }

    #[test]
    fn test_add_remove_item() {
        let mut project = Project::new("P", "", UnitSystem::SI);

        let id = project.add_item(shell_item("TK-1", DesignStandard::Api650));
        assert_eq!(project.item_count(), 1);
        assert!(project.get_item(&id).is_some());

        if let Some(CalculationItem::ShellThickness(input)) = project.get_item_mut(&id) {
            input.diameter = 35.0;
        }
        match project.get_item(&id) {
            Some(CalculationItem::ShellThickness(input)) => assert_eq!(input.diameter, 35.0),
            other => panic!("unexpected item: {:?}", other),
        }

        let removed = project.remove_item(&id);
        assert!(removed.is_some());
        assert_eq!(project.item_count(), 0);
        assert!(project.remove_item(&id).is_none());
    }

    #[test]
    fn test_run_all_in_label_order() {
        let mut project = Project::new("P", "", UnitSystem::SI);
        project.add_item(shell_item("TK-2", DesignStandard::Api620));
        project.add_item(shell_item("TK-1", DesignStandard::Api650));

        let runs = project.run_all();
        let labels: Vec<&str> = runs.iter().map(|(_, item, _)| item.label()).collect();
        assert_eq!(labels, vec!["TK-1", "TK-2"]);
        assert!(runs.iter().all(|(_, _, r)| r.is_ok()));
        assert_eq!(project.primary_standard(), DesignStandard::Api650);
    }

    #[test]
    fn test_primary_standard_defaults() {
        let project = Project::default();
        assert_eq!(project.primary_standard(), DesignStandard::Api650);
        assert_eq!(project.recommend_standard().recommended, DesignStandard::Api650);
    }
}
