//! Vaccine knowledge base: browse, search and slug lookup over the catalog.

use serde::{Deserialize, Serialize};

use crate::models::enums::VaccineCategory;
use crate::schedule::{VaccineCatalog, VaccineDefinition};

/// Filters for [`list`]. Empty filters match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgeQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<VaccineCategory>,
}

/// Card shown in the knowledge base list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub category: VaccineCategory,
    pub short_description: String,
    pub schedule: String,
}

impl From<&VaccineDefinition> for KnowledgeSummary {
    fn from(def: &VaccineDefinition) -> Self {
        Self {
            id: def.id.clone(),
            slug: def.slug.clone(),
            name: def.name.clone(),
            category: def.category,
            short_description: def.short_description.clone(),
            schedule: def.schedule.clone(),
        }
    }
}

/// Definitions matching the query, in catalog order. The text query is a
/// case-insensitive substring match on name or short description.
pub fn list(catalog: &VaccineCatalog, query: &KnowledgeQuery) -> Vec<KnowledgeSummary> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    catalog
        .all()
        .iter()
        .filter(|def| query.category.map_or(true, |c| def.category == c))
        .filter(|def| match &needle {
            Some(n) => {
                def.name.to_lowercase().contains(n)
                    || def.short_description.to_lowercase().contains(n)
            }
            None => true,
        })
        .map(KnowledgeSummary::from)
        .collect()
}

pub fn get_by_slug<'a>(catalog: &'a VaccineCatalog, slug: &str) -> Option<&'a VaccineDefinition> {
    catalog.get_by_slug(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> VaccineCatalog {
        VaccineCatalog::bundled().unwrap()
    }

    #[test]
    fn empty_query_lists_everything() {
        let catalog = catalog();
        assert_eq!(list(&catalog, &KnowledgeQuery::default()).len(), catalog.len());
    }

    #[test]
    fn text_query_is_case_insensitive() {
        let found = list(
            &catalog(),
            &KnowledgeQuery {
                q: Some("  HEPATITIS ".into()),
                category: None,
            },
        );
        let ids: Vec<_> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["hepb", "hepa"]);
    }

    #[test]
    fn category_filter() {
        let found = list(
            &catalog(),
            &KnowledgeQuery {
                q: None,
                category: Some(VaccineCategory::NationalProgram),
            },
        );
        assert_eq!(found.len(), 5);
        assert!(found
            .iter()
            .all(|s| s.category == VaccineCategory::NationalProgram));
    }

    #[test]
    fn slug_lookup() {
        let catalog = catalog();
        assert_eq!(get_by_slug(&catalog, "mmr").unwrap().id, "mmr");
        assert!(get_by_slug(&catalog, "hepb").is_none());
    }
}
