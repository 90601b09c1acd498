//! Structural frameworks, materials catalog and patents

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structural framework offered for builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// 1-10
    pub structural_rating: u8,
    pub material: String,
    pub smart_enabled: bool,
    pub description: String,
}

/// Catalog material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: String,
    pub grade: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// MPa; absent for non-structural materials
    #[serde(default)]
    pub strength: Option<f64>,
    /// W/(m·K)
    pub thermal_conductivity: f64,
    /// kgCO2e/kg
    pub embodied_carbon: f64,
    pub is_smart: bool,
}

/// Patent filing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patent {
    pub id: String,
    pub title: String,
    pub filing_date: NaiveDate,
    /// `granted`, `pending`, `filed`
    pub status: String,
    pub description: String,
}

/// Body of `/api/frameworks`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworksCatalog {
    pub frameworks: Vec<Framework>,
    pub materials: Vec<Material>,
    pub patents: Vec<Patent>,
}

impl FrameworksCatalog {
    /// Materials flagged as smart (responsive) materials
    pub fn smart_materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter().filter(|m| m.is_smart)
    }
}
