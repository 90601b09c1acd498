//! Snapshot fixtures
//!
//! Small bodies in the exact shape the static snapshot generator writes to
//! `<base>/api/<id>`.

use serde_json::{json, Value};

pub const HEALTH: &str = "health.json";
pub const FABRIC: &str = "fabric.json";
pub const FABRIC_SCENE: &str = "fabric-scene.json";
pub const FRAMEWORKS: &str = "frameworks.json";
pub const SALES: &str = "sales.json";
pub const INTELLIGENCE: &str = "intelligence.json";
pub const DEPLOY: &str = "deploy.json";
pub const PARTNERS: &str = "partners.json";

pub fn health() -> Value {
    json!({
        "status": "ok",
        "db_connected": false,
        "redis_connected": false,
        "version": "0.1.0-static"
    })
}

pub fn fabric() -> Value {
    json!({
        "production_lines": [
            {"id": "pl-1", "name": "Line A - Containers", "status": "running",
             "throughput": 84, "efficiency": 92.5, "product": "EcoContainer 40ft"},
            {"id": "pl-2", "name": "Line B - Modules", "status": "maintenance",
             "throughput": 0, "efficiency": 0.0, "product": "Planta Module S"}
        ],
        "work_orders": [
            {"id": "wo-1", "product": "EcoContainer 40ft", "quantity": 12,
             "status": "in_progress", "due_date": "2025-04-18", "priority": "high"}
        ],
        "metrics": {
            "active_lines": 1, "avg_efficiency": 92.5, "total_throughput": 84,
            "open_orders": 1, "lines_change": 0, "efficiency_change": 1.4
        }
    })
}

/// Body with empty collections and no metrics fields
pub fn fabric_empty() -> Value {
    json!({"production_lines": [], "work_orders": [], "metrics": {}})
}

pub fn fabric_scene() -> Value {
    json!({
        "objects": [
            {"id": "obj-1", "type": "box", "name": "Welding Station",
             "position": [0.0, 0.5, 0.0], "scale": [2.0, 1.0, 1.5], "color": "#22c55e",
             "metadata": {"zone": "Zone A", "capacity": 40}},
            {"id": "obj-2", "type": "cylinder", "name": "Paint Booth",
             "position": [3.0, 0.6, -2.0], "scale": [1.2, 1.1, 1.9], "color": "#8b5cf6",
             "metadata": {}}
        ]
    })
}

pub fn frameworks() -> Value {
    json!({
        "frameworks": [
            {"id": "fw-1", "name": "EcoFrame Modular", "type": "modular",
             "structural_rating": 9, "material": "S355 steel", "smart_enabled": true,
             "description": "Bolted modular steel frame"}
        ],
        "materials": [
            {"id": "mat-1", "name": "S355 Structural Steel", "category": "steel", "grade": "S355",
             "properties": {"yield_mpa": 355}, "strength": 355.0,
             "thermal_conductivity": 50.0, "embodied_carbon": 1.55, "is_smart": false},
            {"id": "mat-2", "name": "Low-E Smart Glass", "category": "glass", "grade": "A",
             "properties": {}, "strength": null,
             "thermal_conductivity": 1.1, "embodied_carbon": 0.9, "is_smart": true}
        ],
        "patents": [
            {"id": "pt-1", "title": "Interlocking container joint", "filing_date": "2024-06-02",
             "status": "pending", "description": "Tool-free joint for stacked modules"}
        ]
    })
}

pub fn sales() -> Value {
    json!({
        "pipeline": [
            {"name": "Discovery", "count": 14, "value": 1_400_000.0},
            {"name": "Proposal", "count": 6, "value": 820_000.0},
            {"name": "Won", "count": 3, "value": 450_000.0}
        ],
        "leads": [
            {"id": "ld-1", "company": "Casa Verde Lda", "contact": "Ana Sousa", "score": 82,
             "stage": "proposal", "value": 180_000.0, "last_activity": "2025-03-28"}
        ],
        "metrics": {
            "total_revenue": 2_300_000.0, "conversion_rate": 21.4,
            "avg_deal_size": 150_000.0, "pipeline_value": 2_670_000.0
        },
        "revenue_chart": [
            {"month": "Jan", "revenue": 310_000.0, "target": 300_000.0},
            {"month": "Feb", "revenue": 280_000.0, "target": 300_000.0}
        ]
    })
}

pub fn intelligence() -> Value {
    json!({
        "insights": [
            {"id": "in-1", "title": "Steel lead time rising", "category": "supply",
             "summary": "Average S355 lead time up 3 days", "date": "2025-03-30", "impact": "high"}
        ],
        "forecasts": [
            {"period": "Q1 2025", "actual": 96.0, "forecast": 94.0, "lower_bound": 88.0, "upper_bound": 101.0},
            {"period": "Q2 2025", "actual": null, "forecast": 101.0, "lower_bound": 92.0, "upper_bound": 110.0}
        ],
        "kpis": [
            {"name": "Defect Rate", "value": 1.8, "unit": "%", "change": -0.4, "trend": "down"}
        ]
    })
}

pub fn deploy() -> Value {
    json!({
        "deliveries": [
            {"id": "dl-1", "destination": "Porto", "status": "in_transit", "eta": "2025-04-09",
             "progress": 60, "items": 4}
        ],
        "jobs": [
            {"id": "job-1", "site": "Braga Residential", "type": "installation",
             "status": "active", "started": "2025-03-17", "team": "Team North"}
        ],
        "metrics": {"active_deliveries": 1, "in_transit": 1, "active_sites": 1, "completed": 7}
    })
}

pub fn partners() -> Value {
    json!({
        "partners": [
            {"id": "pt-1", "name": "EcoBuild Portugal", "type": "manufacturer",
             "region": "Southern EU", "country": "Portugal", "capacity_utilization": 72.0,
             "capacity": 300, "compliance_status": "compliant", "active_projects": 4,
             "rating": 5, "lead_time": 14}
        ],
        "metrics": {"total_partners": 1, "regions": 1, "compliant": 1, "avg_utilization": 72.0}
    })
}

/// Every snapshot, keyed by id
pub fn all() -> Vec<(&'static str, Value)> {
    vec![
        (HEALTH, health()),
        (FABRIC, fabric()),
        (FABRIC_SCENE, fabric_scene()),
        (FRAMEWORKS, frameworks()),
        (SALES, sales()),
        (INTELLIGENCE, intelligence()),
        (DEPLOY, deploy()),
        (PARTNERS, partners()),
    ]
}
