//! Factory floor: production lines, work orders, 3D scene

use crate::Level;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Operating state of a production line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Producing
    Running,
    /// Staffed but not producing
    Idle,
    /// Down for maintenance
    Maintenance,
    /// Value not known to this client
    #[default]
    #[serde(other)]
    Unknown,
}

/// One production line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLine {
    pub id: String,
    pub name: String,
    pub status: LineStatus,
    /// Units per shift
    pub throughput: u32,
    /// Percent, 0-100
    pub efficiency: f64,
    pub product: String,
}

/// Work order scheduled on the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: String,
    pub product: String,
    pub quantity: u32,
    /// `in_progress`, `scheduled`, `completed`
    pub status: String,
    pub due_date: NaiveDate,
    pub priority: Level,
}

impl WorkOrder {
    /// Completed orders are no longer open
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status != "completed"
    }
}

/// Aggregates shown on the factory header cards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FabricMetrics {
    pub active_lines: u32,
    pub avg_efficiency: f64,
    pub total_throughput: u32,
    pub open_orders: u32,
    pub lines_change: i32,
    pub efficiency_change: f64,
}

/// Body of `/api/fabric`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FabricOverview {
    pub production_lines: Vec<ProductionLine>,
    pub work_orders: Vec<WorkOrder>,
    pub metrics: FabricMetrics,
}

/// Object placed in the factory scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: String,
    /// Primitive: `box`, `cylinder`
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub position: [f64; 3],
    pub scale: [f64; 3],
    /// CSS hex colour
    pub color: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Body of `/api/fabric/scene`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FabricScene {
    pub objects: Vec<SceneObject>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_metrics_object_decodes() {
        let body = r#"{"production_lines":[],"work_orders":[],"metrics":{}}"#;
        let overview: FabricOverview = serde_json::from_str(body).unwrap();
        assert_eq!(overview, FabricOverview::default());
    }

    #[test]
    fn decodes_generator_line_and_order() {
        let body = r#"{
            "production_lines": [
                {"id": "l1", "name": "Line A", "status": "running", "throughput": 80,
                 "efficiency": 91.4, "product": "EcoContainer 20ft"}
            ],
            "work_orders": [
                {"id": "w1", "product": "Planta Module A", "quantity": 12,
                 "status": "completed", "due_date": "2025-03-01", "priority": "high"}
            ],
            "metrics": {"active_lines": 1, "avg_efficiency": 91.4, "total_throughput": 80,
                        "open_orders": 0, "lines_change": 1, "efficiency_change": 2.3}
        }"#;
        let overview: FabricOverview = serde_json::from_str(body).unwrap();
        assert_eq!(overview.production_lines[0].status, LineStatus::Running);
        assert_eq!(overview.work_orders[0].priority, Level::High);
        assert!(!overview.work_orders[0].is_open());
        assert_eq!(overview.metrics.active_lines, 1);
    }

    #[test]
    fn scene_object_type_field_is_renamed() {
        let body = r##"{"objects":[{"id":"o","type":"cylinder","name":"Paint Booth",
            "position":[1.5,0.6,-2.0],"scale":[1.2,1.1,1.9],"color":"#8b5cf6",
            "metadata":{"zone":"Zone E","capacity":120}}]}"##;
        let scene: FabricScene = serde_json::from_str(body).unwrap();
        assert_eq!(scene.objects[0].kind, "cylinder");
        assert_eq!(scene.objects[0].metadata["capacity"], 120);
        let back = serde_json::to_value(&scene).unwrap();
        assert_eq!(back["objects"][0]["type"], "cylinder");
    }
}
