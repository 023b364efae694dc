//! Catalog schema definitions.

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

/// Freshness window used when the catalog does not set one.
pub const DEFAULT_FRESH_FOR_S: f64 = 300.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub settings: CatalogSettings,
    #[serde(default)]
    pub parts: Vec<PartDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogSettings {
    /// Row limit for BOMs built from this catalog (0 or absent = unlimited).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_parts: Option<usize>,
    /// How long a fetched part stays fresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh_for_s: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartDef {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildDef {
    pub part: String,
    #[serde(default = "default_child_quantity")]
    pub quantity: f64,
}

fn default_child_quantity() -> f64 {
    1.0
}

impl Catalog {
    pub fn part(&self, id: &str) -> Option<&PartDef> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn fresh_for_s(&self) -> f64 {
        self.settings.fresh_for_s.unwrap_or(DEFAULT_FRESH_FOR_S)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_quantity_defaults_to_one() {
        let yaml = r#"
version: 1
name: Tiny
parts:
  - id: root
    title: Root
    cost: 2.5
    children:
      - part: leaf
  - id: leaf
    title: Leaf
"#;
        let catalog: Catalog = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(catalog.parts.len(), 2);
        assert_eq!(catalog.part("root").unwrap().children[0].quantity, 1.0);
        assert_eq!(catalog.part("leaf").unwrap().cost, 0.0);
        assert_eq!(catalog.settings, CatalogSettings::default());
        assert_eq!(catalog.fresh_for_s(), DEFAULT_FRESH_FOR_S);
    }
}
