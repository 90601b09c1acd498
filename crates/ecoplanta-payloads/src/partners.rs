//! Partner network

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub id: String,
    pub name: String,
    /// `manufacturer`, `supplier`, `logistics`
    #[serde(rename = "type")]
    pub kind: String,
    pub region: String,
    pub country: String,
    /// Percent of capacity in use
    pub capacity_utilization: f64,
    pub capacity: u32,
    pub compliance_status: String,
    pub active_projects: u32,
    /// 1-5
    pub rating: u8,
    /// Days
    pub lead_time: u32,
}

impl Partner {
    #[inline]
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.compliance_status == "compliant"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartnerMetrics {
    pub total_partners: u32,
    pub regions: u32,
    pub compliant: u32,
    pub avg_utilization: f64,
}

/// Body of `/api/partners`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerNetwork {
    pub partners: Vec<Partner>,
    pub metrics: PartnerMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_partner() {
        let body = r#"{"partners":[{"id":"p","name":"EcoBuild Portugal","type":"manufacturer",
            "region":"Southern EU","country":"Portugal","capacity_utilization":72,
            "capacity":300,"compliance_status":"review_needed","active_projects":4,
            "rating":5,"lead_time":14}],"metrics":{"total_partners":1}}"#;
        let network: PartnerNetwork = serde_json::from_str(body).unwrap();
        assert!(!network.partners[0].is_compliant());
        assert_eq!(network.metrics.total_partners, 1);
        assert_eq!(network.metrics.regions, 0);
    }
}
