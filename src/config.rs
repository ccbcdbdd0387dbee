use std::net::SocketAddr;

/// Environment-derived service configuration, read once at startup.
/// Changing MODEL_PATH requires a process restart; there is no live reload.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub model_path: String,
    pub bind: SocketAddr,
    /// Per-request feature-vector debug logging (LOG_PRED=1).
    pub log_pred: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let model_path =
            std::env::var("MODEL_PATH").unwrap_or_else(|_| "models/beach-risk-v5.pt".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let bind = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], port)));
        let log_pred = std::env::var("LOG_PRED").ok().as_deref() == Some("1");

        Self { model_path, bind, log_pred }
    }
}
