//! Typed dashboard API
//!
//! One method per backend route. Snapshot-backed resources return their
//! typed payloads; the long tail of live-only detail and action routes
//! returns an untyped [`Document`].

#![allow(missing_docs)]

use crate::client::{ApiRequest, Fetched, ResilientClient};
use crate::config::ClientConfig;
use crate::connectivity::ConnectivityMonitor;
use crate::endpoint::{Access, Endpoint, EndpointTable};
use crate::error::{ConfigError, FetchResult};
use ecoplanta_payloads::{
    DeploymentOverview, Document, FabricOverview, FabricScene, ForecastRequest, FrameworksCatalog,
    HealthStatus, IntelligenceFeed, LeadCreate, LeadUpdate, MaterialSelection, PartnerNetwork,
    SalesOverview, TokenRequest, WorkOrderCreate, WorkOrderStatusUpdate,
};
use reqwest::Method;
use serde::Serialize;

/// Route templates
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const ME: &str = "/me";
    pub const AUTH_TOKEN: &str = "/auth/token";

    pub const FABRIC: &str = "/api/fabric";
    pub const FABRIC_SCENE: &str = "/api/fabric/scene";

    pub const FRAMEWORKS: &str = "/api/frameworks";
    pub const FRAMEWORK: &str = "/api/frameworks/{id}";
    pub const FRAMEWORK_BOM_VARIANTS: &str = "/api/frameworks/{id}/bom-variants";

    pub const WORK_ORDERS: &str = "/api/factory/workorders";
    pub const WORK_ORDER: &str = "/api/factory/workorders/{id}";
    pub const WORK_ORDER_STATUS: &str = "/api/factory/workorders/{id}/status";
    pub const INVENTORY: &str = "/api/factory/inventory";
    pub const QA: &str = "/api/factory/qa";
    pub const BOM: &str = "/api/factory/bom/{id}";

    pub const MATERIALS: &str = "/api/materials";
    pub const MATERIALS_SMART: &str = "/api/materials/smart";
    pub const MATERIALS_COMPARE: &str = "/api/materials/compare";
    pub const MATERIALS_AUDIT_TRAIL: &str = "/api/materials/audit-trail";
    pub const MATERIALS_SELECT: &str = "/api/materials/select";
    pub const MATERIAL: &str = "/api/materials/{id}";

    pub const SALES: &str = "/api/sales";
    pub const SALES_LEADS: &str = "/api/sales/leads";
    pub const SALES_LEAD: &str = "/api/sales/leads/{id}";
    pub const SALES_PIPELINE_STATS: &str = "/api/sales/pipeline/stats";

    pub const INTELLIGENCE: &str = "/api/intelligence";
    pub const MODELS: &str = "/api/intelligence/models";
    pub const MODEL: &str = "/api/intelligence/models/{id}";
    pub const FORECAST: &str = "/api/intelligence/forecast";
    pub const ANOMALY_DETECT: &str = "/api/intelligence/anomaly-detect";
    pub const FEATURE_STORE: &str = "/api/intelligence/feature-store";
    pub const TRAIN: &str = "/api/intelligence/train";
    pub const TRAIN_JOB: &str = "/api/intelligence/train/{id}";

    pub const PATENTS: &str = "/api/patents";
    pub const PATENT: &str = "/api/patents/{id}";
    pub const PATENT_EXPERIMENTS: &str = "/api/patents/{id}/experiments";

    pub const DEPLOY: &str = "/api/deploy";

    pub const PARTNERS: &str = "/api/partners";
    pub const PARTNERS_OPTIMIZE: &str = "/api/partners/optimize";
}

/// `(access, path template, snapshot)` for every dashboard route
pub const ROUTES: &[(Access, &str, Option<&str>)] = &[
    (Access::Query, paths::HEALTH, Some("health.json")),
    (Access::Query, paths::ME, None),
    (Access::Mutation, paths::AUTH_TOKEN, None),
    (Access::Query, paths::FABRIC, Some("fabric.json")),
    (Access::Query, paths::FABRIC_SCENE, Some("fabric-scene.json")),
    (Access::Query, paths::FRAMEWORKS, Some("frameworks.json")),
    (Access::Query, paths::FRAMEWORK, None),
    (Access::Query, paths::FRAMEWORK_BOM_VARIANTS, None),
    (Access::Query, paths::WORK_ORDERS, None),
    (Access::Mutation, paths::WORK_ORDERS, None),
    (Access::Query, paths::WORK_ORDER, None),
    (Access::Mutation, paths::WORK_ORDER_STATUS, None),
    (Access::Query, paths::INVENTORY, None),
    (Access::Query, paths::QA, None),
    (Access::Query, paths::BOM, None),
    (Access::Query, paths::MATERIALS, None),
    (Access::Query, paths::MATERIALS_SMART, None),
    (Access::Query, paths::MATERIALS_COMPARE, None),
    (Access::Query, paths::MATERIALS_AUDIT_TRAIL, None),
    (Access::Mutation, paths::MATERIALS_SELECT, None),
    (Access::Query, paths::MATERIAL, None),
    (Access::Query, paths::SALES, Some("sales.json")),
    (Access::Mutation, paths::SALES_LEADS, None),
    (Access::Mutation, paths::SALES_LEAD, None),
    (Access::Query, paths::SALES_PIPELINE_STATS, None),
    (Access::Query, paths::INTELLIGENCE, Some("intelligence.json")),
    (Access::Query, paths::MODELS, None),
    (Access::Query, paths::MODEL, None),
    (Access::Mutation, paths::FORECAST, None),
    (Access::Mutation, paths::ANOMALY_DETECT, None),
    (Access::Query, paths::FEATURE_STORE, None),
    (Access::Mutation, paths::TRAIN, None),
    (Access::Query, paths::TRAIN_JOB, None),
    (Access::Query, paths::PATENTS, None),
    (Access::Query, paths::PATENT, None),
    (Access::Mutation, paths::PATENT_EXPERIMENTS, None),
    (Access::Query, paths::DEPLOY, Some("deploy.json")),
    (Access::Query, paths::PARTNERS, Some("partners.json")),
    (Access::Query, paths::PARTNERS_OPTIMIZE, None),
];

/// Default endpoint table of the dashboard
///
/// # Errors
/// `ConfigError` if [`ROUTES`] is inconsistent (caught by unit tests).
pub fn dashboard_endpoints() -> Result<EndpointTable, ConfigError> {
    EndpointTable::new(ROUTES.iter().map(|&(access, path, fallback)| {
        let endpoint = match access {
            Access::Query => Endpoint::query(path),
            Access::Mutation => Endpoint::mutation(path),
        };
        match fallback {
            Some(id) => endpoint.with_fallback(id),
            None => endpoint,
        }
    }))
}

/// Substitute `{param}` segments of a template, in order
///
/// Values are percent-encoded so an id can never add path segments.
fn fill(template: &str, params: &[&str]) -> String {
    let mut params = params.iter();
    template
        .split('/')
        .map(|segment| {
            if segment.starts_with('{') && segment.ends_with('}') {
                params.next().map_or_else(String::new, |value| encode_component(value))
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Append `key=value` pairs, skipping `None`
fn with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let query: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|value| format!("{}={}", key, encode_component(value)))
        })
        .collect();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

/// Percent-encode everything outside RFC 3986 unreserved characters
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(char::from(byte));
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Filters of the material catalogue listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilter {
    pub category: Option<String>,
    pub grade: Option<String>,
    pub smart_only: bool,
    pub min_strength: Option<f64>,
}

impl MaterialFilter {
    fn to_path(&self) -> String {
        with_query(
            paths::MATERIALS,
            &[
                ("category", self.category.clone()),
                ("grade", self.grade.clone()),
                ("smart_only", self.smart_only.then(|| "true".to_string())),
                ("min_strength", self.min_strength.map(|v| v.to_string())),
            ],
        )
    }
}

/// Every snapshot-backed resource, loaded together
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOverview {
    pub health: HealthStatus,
    pub fabric: FabricOverview,
    pub scene: FabricScene,
    pub frameworks: FrameworksCatalog,
    pub sales: SalesOverview,
    pub intelligence: IntelligenceFeed,
    pub deploy: DeploymentOverview,
    pub partners: PartnerNetwork,
}

/// Typed dashboard API over a [`ResilientClient`]
#[derive(Debug, Clone)]
pub struct DashboardApi {
    client: ResilientClient,
}

impl DashboardApi {
    /// Wrap an existing client
    #[must_use]
    pub fn new(client: ResilientClient) -> Self {
        Self { client }
    }

    /// Client over the default dashboard endpoint table
    ///
    /// # Errors
    /// `ConfigError` if the configuration is invalid.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ResilientClient::new(config, dashboard_endpoints()?)?))
    }

    /// Underlying client
    #[inline]
    #[must_use]
    pub fn client(&self) -> &ResilientClient {
        &self.client
    }

    /// Connectivity reader for status indicators
    #[must_use]
    pub fn connectivity(&self) -> ConnectivityMonitor {
        self.client.connectivity()
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: impl Into<String>) -> FetchResult<T> {
        self.client.fetch(&ApiRequest::get(path)).await
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: impl Into<String>,
        body: &impl Serialize,
    ) -> FetchResult<T> {
        let request = ApiRequest::mutation(method, path).with_json(body)?;
        self.client.fetch(&request).await
    }

    // Snapshot-backed resources

    pub async fn health(&self) -> FetchResult<HealthStatus> {
        self.get(paths::HEALTH).await
    }

    /// Health together with whether it came from a snapshot
    pub async fn health_with_source(&self) -> FetchResult<Fetched<HealthStatus>> {
        self.client
            .fetch_with_source(&ApiRequest::get(paths::HEALTH))
            .await
    }

    pub async fn fabric(&self) -> FetchResult<FabricOverview> {
        self.get(paths::FABRIC).await
    }

    pub async fn fabric_scene(&self) -> FetchResult<FabricScene> {
        self.get(paths::FABRIC_SCENE).await
    }

    pub async fn frameworks(&self) -> FetchResult<FrameworksCatalog> {
        self.get(paths::FRAMEWORKS).await
    }

    pub async fn sales(&self) -> FetchResult<SalesOverview> {
        self.get(paths::SALES).await
    }

    pub async fn intelligence(&self) -> FetchResult<IntelligenceFeed> {
        self.get(paths::INTELLIGENCE).await
    }

    pub async fn deploy(&self) -> FetchResult<DeploymentOverview> {
        self.get(paths::DEPLOY).await
    }

    pub async fn partners(&self) -> FetchResult<PartnerNetwork> {
        self.get(paths::PARTNERS).await
    }

    /// All snapshot-backed resources, fetched concurrently
    ///
    /// Fails with the first error; each resource falls back independently.
    pub async fn overview(&self) -> FetchResult<DashboardOverview> {
        let (health, fabric, scene, frameworks, sales, intelligence, deploy, partners) = futures::try_join!(
            self.health(),
            self.fabric(),
            self.fabric_scene(),
            self.frameworks(),
            self.sales(),
            self.intelligence(),
            self.deploy(),
            self.partners(),
        )?;
        Ok(DashboardOverview {
            health,
            fabric,
            scene,
            frameworks,
            sales,
            intelligence,
            deploy,
            partners,
        })
    }

    // Auth

    pub async fn me(&self) -> FetchResult<Document> {
        self.get(paths::ME).await
    }

    pub async fn login(&self, body: &TokenRequest) -> FetchResult<Document> {
        self.send(Method::POST, paths::AUTH_TOKEN, body).await
    }

    // Frameworks

    pub async fn framework(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::FRAMEWORK, &[id])).await
    }

    pub async fn framework_bom_variants(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::FRAMEWORK_BOM_VARIANTS, &[id])).await
    }

    // Factory

    pub async fn work_orders(&self) -> FetchResult<Document> {
        self.get(paths::WORK_ORDERS).await
    }

    pub async fn work_order(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::WORK_ORDER, &[id])).await
    }

    pub async fn create_work_order(&self, body: &WorkOrderCreate) -> FetchResult<Document> {
        self.send(Method::POST, paths::WORK_ORDERS, body).await
    }

    pub async fn update_work_order_status(
        &self,
        id: &str,
        body: &WorkOrderStatusUpdate,
    ) -> FetchResult<Document> {
        self.send(Method::PATCH, fill(paths::WORK_ORDER_STATUS, &[id]), body)
            .await
    }

    pub async fn inventory(&self) -> FetchResult<Document> {
        self.get(paths::INVENTORY).await
    }

    pub async fn qa_records(&self) -> FetchResult<Document> {
        self.get(paths::QA).await
    }

    pub async fn bom(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::BOM, &[id])).await
    }

    // Materials

    pub async fn materials(&self, filter: &MaterialFilter) -> FetchResult<Document> {
        self.get(filter.to_path()).await
    }

    pub async fn smart_materials(&self) -> FetchResult<Document> {
        self.get(paths::MATERIALS_SMART).await
    }

    /// Side-by-side comparison of two or more materials
    pub async fn compare_materials(&self, ids: &[&str]) -> FetchResult<Document> {
        let path = with_query(paths::MATERIALS_COMPARE, &[("ids", Some(ids.join(",")))]);
        self.get(path).await
    }

    pub async fn material_audit_trail(&self) -> FetchResult<Document> {
        self.get(paths::MATERIALS_AUDIT_TRAIL).await
    }

    pub async fn select_material(&self, body: &MaterialSelection) -> FetchResult<Document> {
        self.send(Method::POST, paths::MATERIALS_SELECT, body).await
    }

    pub async fn material(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::MATERIAL, &[id])).await
    }

    // Sales

    pub async fn create_lead(&self, body: &LeadCreate) -> FetchResult<Document> {
        self.send(Method::POST, paths::SALES_LEADS, body).await
    }

    pub async fn update_lead(&self, id: &str, body: &LeadUpdate) -> FetchResult<Document> {
        self.send(Method::PATCH, fill(paths::SALES_LEAD, &[id]), body)
            .await
    }

    pub async fn pipeline_stats(&self) -> FetchResult<Document> {
        self.get(paths::SALES_PIPELINE_STATS).await
    }

    // Intelligence / ML

    pub async fn models(&self) -> FetchResult<Document> {
        self.get(paths::MODELS).await
    }

    pub async fn model(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::MODEL, &[id])).await
    }

    pub async fn forecast(&self, body: &ForecastRequest) -> FetchResult<Document> {
        self.send(Method::POST, paths::FORECAST, body).await
    }

    pub async fn detect_anomalies(&self, body: &impl Serialize) -> FetchResult<Document> {
        self.send(Method::POST, paths::ANOMALY_DETECT, body).await
    }

    pub async fn feature_store(&self) -> FetchResult<Document> {
        self.get(paths::FEATURE_STORE).await
    }

    pub async fn submit_training_job(&self, body: &impl Serialize) -> FetchResult<Document> {
        self.send(Method::POST, paths::TRAIN, body).await
    }

    pub async fn training_job(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::TRAIN_JOB, &[id])).await
    }

    // Patents

    pub async fn patents(&self) -> FetchResult<Document> {
        self.get(paths::PATENTS).await
    }

    pub async fn patent(&self, id: &str) -> FetchResult<Document> {
        self.get(fill(paths::PATENT, &[id])).await
    }

    pub async fn add_patent_experiment(
        &self,
        id: &str,
        body: &impl Serialize,
    ) -> FetchResult<Document> {
        self.send(Method::POST, fill(paths::PATENT_EXPERIMENTS, &[id]), body)
            .await
    }

    // Partners

    pub async fn optimize_partners(&self) -> FetchResult<Document> {
        self.get(paths::PARTNERS_OPTIMIZE).await
    }
}
