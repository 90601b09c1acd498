//! EcoPlanta dashboard payloads
//!
//! Typed shapes of the JSON bodies exchanged with the dashboard API.
//!
//! Every resource that has a static snapshot is modelled here exactly as the
//! snapshot generator writes it. The live backend may answer with a different
//! shape (summary counters in place of full lists); the client then treats
//! the body as undecodable and serves the snapshot while connectivity stays
//! `Online`.
//!
//! # Modules
//!
//! | Module | Resource |
//! |--------|----------|
//! | [`health`] | `/health` |
//! | [`fabric`] | `/api/fabric`, `/api/fabric/scene` |
//! | [`frameworks`] | `/api/frameworks` |
//! | [`sales`] | `/api/sales` |
//! | [`intelligence`] | `/api/intelligence` |
//! | [`deploy`] | `/api/deploy` |
//! | [`partners`] | `/api/partners` |
//! | [`requests`] | bodies of mutating endpoints |

#![allow(missing_docs)]
#![warn(unreachable_pub)]

pub mod deploy;
pub mod fabric;
pub mod frameworks;
pub mod health;
pub mod intelligence;
pub mod partners;
pub mod requests;
pub mod sales;

pub use deploy::{Delivery, DeploymentJob, DeploymentMetrics, DeploymentOverview};
pub use fabric::{
    FabricMetrics, FabricOverview, FabricScene, LineStatus, ProductionLine, SceneObject, WorkOrder,
};
pub use frameworks::{Framework, FrameworksCatalog, Material, Patent};
pub use health::HealthStatus;
pub use intelligence::{Forecast, Insight, IntelligenceFeed, Kpi, Trend};
pub use partners::{Partner, PartnerMetrics, PartnerNetwork};
pub use requests::{
    ForecastRequest, LeadCreate, LeadUpdate, MaterialSelection, TokenRequest, WorkOrderCreate,
    WorkOrderStatusUpdate,
};
pub use sales::{Lead, PipelineStage, RevenuePoint, SalesMetrics, SalesOverview};

/// Untyped JSON document, used for live-only endpoints without a snapshot
pub type Document = serde_json::Value;

/// Coarse priority/impact level shared by several modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// High
    High,
    /// Medium
    Medium,
    /// Low
    Low,
    /// Value not known to this client
    #[default]
    #[serde(other)]
    Unknown,
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_unknown_values_do_not_fail() {
        let level: Level = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(level, Level::Unknown);
    }

    #[test]
    fn level_roundtrips_snake_case() {
        assert_eq!(serde_json::to_string(&Level::High).unwrap(), "\"high\"");
    }
}
