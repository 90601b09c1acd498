//! Request bodies for mutating endpoints
//!
//! None of these endpoints has a static snapshot; they only ever reach the
//! live API.

use serde::{Deserialize, Serialize};

/// `POST /auth/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/sales/leads`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadCreate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LeadCreate {
    /// New lead in the default region
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            company: None,
            region: "Lisboa".to_string(),
            notes: None,
        }
    }

    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }
}

/// `PATCH /api/sales/leads/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub status: String,
}

/// `POST /api/factory/workorders`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderCreate {
    pub bom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_line_id: Option<String>,
    /// 1 (highest) - 5
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end: Option<String>,
}

impl WorkOrderCreate {
    /// Work order for a BOM at the default priority
    pub fn for_bom(bom_id: impl Into<String>) -> Self {
        Self {
            bom_id: bom_id.into(),
            production_line_id: None,
            priority: 3,
            scheduled_start: None,
            scheduled_end: None,
        }
    }
}

/// `PATCH /api/factory/workorders/{id}/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderStatusUpdate {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// `POST /api/materials/select`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSelection {
    pub material_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub reason: String,
    pub selected_by: String,
}

/// `POST /api/intelligence/forecast`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub horizon_periods: u32,
    pub confidence_level: f64,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            horizon_periods: 6,
            confidence_level: 0.95,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lead_create_omits_unset_optionals() {
        let body = serde_json::to_value(LeadCreate::new("Ana Silva", "ana@example.pt")).unwrap();
        assert_eq!(body["region"], "Lisboa");
        assert!(body.get("phone").is_none());
    }

    #[test]
    fn work_order_defaults_to_priority_three() {
        assert_eq!(WorkOrderCreate::for_bom("bom-1").priority, 3);
    }
}
