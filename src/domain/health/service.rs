use std::sync::OnceLock;
use std::time::Instant;

use super::dto::{HealthChecks, HealthState, HealthStatus, TemplateCheck};
use crate::domain::prompt::PromptTemplate;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the server start time. Call once from `main`.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

pub fn get_uptime_secs() -> u64 {
    START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0)
}

pub fn check_template(template: &PromptTemplate) -> TemplateCheck {
    let missing_fragments: Vec<String> = template
        .missing_fragments()
        .into_iter()
        .map(|(category, key)| format!("{}.{}", category, key))
        .collect();

    TemplateCheck {
        status: missing_fragments.is_empty(),
        missing_fragments,
    }
}

pub fn check_health(template: &PromptTemplate, active_sessions: usize) -> HealthStatus {
    let prompt_template = check_template(template);
    let status = if prompt_template.status {
        HealthState::Healthy
    } else {
        HealthState::Degraded
    };

    HealthStatus {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: get_uptime_secs(),
        active_sessions,
        checks: HealthChecks { prompt_template },
    }
}
