//! Logistics and on-site deployment tracking

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub destination: String,
    /// `preparing`, `in_transit`, `delivered`
    pub status: String,
    pub eta: NaiveDate,
    /// Percent, 0-100
    pub progress: u8,
    pub items: u32,
}

/// Installation / commissioning job at a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentJob {
    pub id: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub started: NaiveDate,
    pub team: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentMetrics {
    pub active_deliveries: u32,
    pub in_transit: u32,
    pub active_sites: u32,
    pub completed: u32,
}

/// Body of `/api/deploy`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentOverview {
    pub deliveries: Vec<Delivery>,
    pub jobs: Vec<DeploymentJob>,
    pub metrics: DeploymentMetrics,
}
