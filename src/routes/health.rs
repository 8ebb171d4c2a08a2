/// Liveness probe for orchestrators.
pub async fn health_handler() -> &'static str {
    "Healthy"
}
