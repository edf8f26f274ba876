use metrics_exporter_prometheus::PrometheusHandle;
use merchant_onboarding::backend::{AdminAccounts, InMemoryApplicationRepository, MerchantBackendService};
use merchant_onboarding::config::AppConfig;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type Backend = MerchantBackendService<InMemoryApplicationRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backend service over an empty in-memory store, seeded with the configured admin.
pub(crate) fn build_backend(config: &AppConfig) -> Arc<Backend> {
    let repository = Arc::new(InMemoryApplicationRepository::new());
    let accounts = Arc::new(AdminAccounts::from_config(&config.admin));
    Arc::new(MerchantBackendService::new(
        repository,
        accounts,
        config.dashboard.page_size,
    ))
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    use merchant_onboarding::config::{
        AdminAccountConfig, ApiConfig, AppEnvironment, DashboardConfig, ServerConfig,
        TelemetryConfig,
    };

    AppConfig {
        environment: AppEnvironment::Test,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        telemetry: TelemetryConfig {
            log_level: "warn".to_string(),
        },
        api: ApiConfig::default(),
        dashboard: DashboardConfig::default(),
        admin: AdminAccountConfig {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            local_store: None,
        },
    }
}
