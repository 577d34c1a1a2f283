use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: HealthState,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    #[schema(example = 3600)]
    pub uptime_secs: u64,
    #[schema(example = 3)]
    pub active_sessions: usize,
    pub checks: HealthChecks,
}

#[derive(Serialize, Debug, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    /// Serving, but some option combinations cannot be assembled
    Degraded,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub prompt_template: TemplateCheck,
}

/// Completeness of the loaded prompt template
#[derive(Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCheck {
    #[schema(example = true)]
    pub status: bool,
    /// `category.key` entries the template lacks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fragments: Vec<String>,
}
