use crate::response::ApiResponse;

/// GET /health: liveness check, no auth.
pub async fn health() -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(
        "Service is healthy",
        serde_json::json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
