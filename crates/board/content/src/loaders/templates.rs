//! Partner template catalog loader.

use std::path::Path;
use std::sync::Arc;

use board_core::{PartnerTemplate, Personality, TemplateId};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Template data structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TemplateRon {
    id: u32,
    name: String,
    #[serde(default = "default_max_hp")]
    max_hp: i32,
    #[serde(default = "default_one")]
    attack: i32,
    #[serde(default = "default_one")]
    salary: i32,
    #[serde(default)]
    personality: Personality,
    #[serde(default)]
    first_warning: String,
    #[serde(default)]
    final_warning: String,
    #[serde(default)]
    portrait: String,
}

fn default_max_hp() -> i32 {
    5
}

fn default_one() -> i32 {
    1
}

/// Loader for partner template catalogs from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load partner templates from a RON file.
    ///
    /// RON format: a list of template records. Duplicate ids are rejected.
    pub fn load(path: &Path) -> LoadResult<Vec<Arc<PartnerTemplate>>> {
        let content = read_file(path)?;
        let raw: Vec<TemplateRon> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse template catalog RON: {e}"))?;

        let mut templates: Vec<Arc<PartnerTemplate>> = Vec::with_capacity(raw.len());
        for record in raw {
            let id = TemplateId(record.id);
            if templates.iter().any(|t| t.id == id) {
                return Err(anyhow::anyhow!("duplicate partner template id {id}"));
            }
            templates.push(Arc::new(PartnerTemplate {
                id,
                name: record.name,
                max_hp: record.max_hp,
                attack: record.attack,
                salary: record.salary,
                personality: record.personality,
                first_warning: record.first_warning,
                final_warning: record.final_warning,
                portrait: record.portrait,
            }));
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CATALOG_RON: &str = r#"[
    (id: 0, name: "Moss", max_hp: 5, attack: 2, salary: 1,
     personality: Nice, first_warning: "Um, my pay?", final_warning: "I'm done."),
    (id: 1, name: "Brick", attack: 4, salary: 3, personality: Mean),
]"#;

    #[test]
    fn loads_a_catalog_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG_RON.as_bytes()).unwrap();

        let templates = TemplateLoader::load(file.path()).unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "Moss");
        assert_eq!(templates[1].max_hp, 5); // default
        assert_eq!(templates[1].attack, 4);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[(id: 0, name: "A"), (id: 0, name: "B")]"#)
            .unwrap();

        assert!(TemplateLoader::load(file.path()).is_err());
    }
}
