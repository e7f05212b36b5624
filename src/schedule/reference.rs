//! Vaccine reference table: the static definition of every vaccine the app
//! knows, bundled at compile time from `resources/vaccines.json`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ReferenceError;
use crate::models::enums::VaccineCategory;

const BUNDLED_VACCINES: &str = include_str!("../../resources/vaccines.json");

/// One vaccine and its recommended dose timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccineDefinition {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category: VaccineCategory,
    pub short_description: String,
    /// Human-readable timing summary shown in the knowledge base.
    pub schedule: String,
    /// Months after birth for each dose, in administration order.
    pub age_offsets_months: Vec<u32>,
    pub content: VaccineContent,
}

impl VaccineDefinition {
    pub fn dose_count(&self) -> u32 {
        self.age_offsets_months.len() as u32
    }
}

/// Long-form knowledge-base sections for a vaccine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaccineContent {
    pub introduction: String,
    pub target: String,
    pub effect: String,
    pub side_effects: String,
    pub contraindications: String,
    #[serde(default)]
    pub preparation: Vec<String>,
}

#[derive(Deserialize)]
struct ReferenceFile {
    vaccines: Vec<VaccineDefinition>,
}

/// Immutable, validated set of vaccine definitions.
#[derive(Debug, Clone)]
pub struct VaccineCatalog {
    definitions: Vec<VaccineDefinition>,
}

impl VaccineCatalog {
    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self, ReferenceError> {
        Self::from_json(BUNDLED_VACCINES)
    }

    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let file: ReferenceFile =
            serde_json::from_str(json).map_err(|e| ReferenceError::Parse(e.to_string()))?;
        Self::from_definitions(file.vaccines)
    }

    pub fn from_definitions(definitions: Vec<VaccineDefinition>) -> Result<Self, ReferenceError> {
        let mut ids = HashSet::new();
        let mut slugs = HashSet::new();
        for def in &definitions {
            if !ids.insert(def.id.as_str()) {
                return Err(ReferenceError::Duplicate {
                    field: "id",
                    value: def.id.clone(),
                });
            }
            if !slugs.insert(def.slug.as_str()) {
                return Err(ReferenceError::Duplicate {
                    field: "slug",
                    value: def.slug.clone(),
                });
            }
            if def.age_offsets_months.is_empty() {
                return Err(ReferenceError::NoDoses(def.id.clone()));
            }
            if def.age_offsets_months.windows(2).any(|w| w[0] > w[1]) {
                return Err(ReferenceError::OffsetsOutOfOrder(def.id.clone()));
            }
        }
        Ok(Self { definitions })
    }

    pub fn get(&self, vaccine_id: &str) -> Option<&VaccineDefinition> {
        self.definitions.iter().find(|d| d.id == vaccine_id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&VaccineDefinition> {
        self.definitions.iter().find(|d| d.slug == slug)
    }

    pub fn all(&self) -> &[VaccineDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Load the bundled vaccine definitions. Called once at startup.
pub fn load_vaccine_definitions() -> Result<VaccineCatalog, ReferenceError> {
    let catalog = VaccineCatalog::bundled()?;
    tracing::debug!(count = catalog.len(), "Vaccine reference table loaded");
    Ok(catalog)
}

#[cfg(test)]
pub(crate) fn test_definition(id: &str, offsets: &[u32]) -> VaccineDefinition {
    VaccineDefinition {
        id: id.into(),
        name: format!("{} vaccine", id.to_uppercase()),
        slug: id.into(),
        category: VaccineCategory::NationalProgram,
        short_description: String::new(),
        schedule: String::new(),
        age_offsets_months: offsets.to_vec(),
        content: VaccineContent {
            introduction: String::new(),
            target: String::new(),
            effect: String::new(),
            side_effects: String::new(),
            contraindications: String::new(),
            preparation: Vec::new(),
        },
    }
}
