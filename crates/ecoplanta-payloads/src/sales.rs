//! Sales CRM: pipeline, leads, revenue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregate for one pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: String,
    pub count: u32,
    pub value: f64,
}

/// CRM lead as listed on the sales board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub company: String,
    pub contact: String,
    /// 0-100
    pub score: u8,
    pub stage: String,
    pub value: f64,
    pub last_activity: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesMetrics {
    pub total_revenue: f64,
    /// Percent
    pub conversion_rate: f64,
    pub avg_deal_size: f64,
    pub pipeline_value: f64,
}

/// One month of the revenue chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub month: String,
    pub revenue: f64,
    pub target: f64,
}

/// Body of `/api/sales`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesOverview {
    pub pipeline: Vec<PipelineStage>,
    pub leads: Vec<Lead>,
    pub metrics: SalesMetrics,
    #[serde(default)]
    pub revenue_chart: Vec<RevenuePoint>,
}

impl SalesOverview {
    /// Sum of all pipeline stage values
    #[must_use]
    pub fn pipeline_total(&self) -> f64 {
        self.pipeline.iter().map(|s| s.value).sum()
    }
}
