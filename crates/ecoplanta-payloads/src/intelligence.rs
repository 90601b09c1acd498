//! Analytics / ML insight feed

use crate::Level;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a KPI relative to the previous period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub date: NaiveDate,
    pub impact: Level,
}

/// Forecast point; `actual` is absent for future periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub period: String,
    #[serde(default)]
    pub actual: Option<f64>,
    pub forecast: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub change: f64,
    pub trend: Trend,
}

/// Body of `/api/intelligence`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntelligenceFeed {
    pub insights: Vec<Insight>,
    pub forecasts: Vec<Forecast>,
    pub kpis: Vec<Kpi>,
}
