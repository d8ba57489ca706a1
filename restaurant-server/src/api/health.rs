//! Health check endpoint

use super::Json;

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "restaurant-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
