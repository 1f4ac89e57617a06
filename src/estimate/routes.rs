//! HTTP handlers for the estimate workflow.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::cache::CacheStats;
use crate::error::Result;
use crate::estimate::models::Prefecture;
use crate::AppState;

use super::requests::{EstimateRequest, OrderSubmission};
use super::responses::{BreakdownResponse, OrderResponse};
use super::services;

/// Estimate API routes, mounted under `/api`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prefectures", get(list_prefectures))
        .route("/estimate", post(estimate))
        .route("/orders", post(create_order))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/invalidate", post(invalidate_cache))
}

/// GET /api/prefectures
async fn list_prefectures(State(state): State<AppState>) -> Result<Json<Vec<Prefecture>>> {
    let prefectures = services::prefectures(&state.db, &state.cache).await?;
    Ok(Json(prefectures.as_ref().clone()))
}

/// POST /api/estimate
async fn estimate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<BreakdownResponse>> {
    let Json(form) = payload?;
    let request = form.to_order_request()?;
    let breakdown = services::estimate_move(&state.db, &state.cache, &state.pricing, &request).await?;
    Ok(Json(breakdown.into()))
}

/// POST /api/orders
async fn create_order(
    State(state): State<AppState>,
    payload: std::result::Result<Json<OrderSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let Json(submission) = payload?;
    let (contact, request) = submission.validate()?;
    let order =
        services::register_order(&state.db, &state.cache, &state.pricing, &contact, &request)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            order_id: order.order_id,
            breakdown: order.breakdown.into(),
        }),
    ))
}

/// GET /api/cache/stats
async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// POST /api/cache/invalidate
async fn invalidate_cache(State(state): State<AppState>) -> Json<Value> {
    state.cache.invalidate_all();
    Json(json!({ "invalidated": true }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::cache::AppCache;
    use crate::estimate::reference::sample_tables;
    use crate::estimate::PricingConfig;
    use crate::AppState;

    use super::*;

    /// State whose cache already holds reference data, so no database is touched
    async fn warm_state() -> AppState {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let cache = AppCache::default();
        cache.put_reference(Arc::new(sample_tables())).await;
        cache
            .put_prefectures(Arc::new(
                [(1, "Hokkaido"), (2, "Aomori"), (3, "Iwate")]
                    .into_iter()
                    .map(|(id, name)| Prefecture {
                        prefecture_id: id,
                        prefecture_name: name.to_string(),
                    })
                    .collect(),
            ))
            .await;
        AppState {
            db,
            cache,
            pricing: PricingConfig::default(),
        }
    }

    async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = crate::app(state)
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_estimate_endpoint() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/estimate",
            json!({
                "old_prefecture_id": 1,
                "new_prefecture_id": 2,
                "moving_month": "0",
                "box": 50,
                "washing_machine_installation": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["distance_km"], 120);
        assert_eq!(json["seasonal_subtotal"], 63000);
        assert_eq!(json["optional_service_fee"], 5000);
        assert_eq!(json["total"], 68000);
    }

    #[tokio::test]
    async fn test_estimate_rejects_unknown_month() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/estimate",
            json!({
                "old_prefecture_id": 1,
                "new_prefecture_id": 2,
                "moving_month": "7",
                "box": 50
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error_type"], "validation_error");
    }

    #[tokio::test]
    async fn test_estimate_rejects_unknown_prefecture() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/estimate",
            json!({
                "old_prefecture_id": 1,
                "new_prefecture_id": 9999,
                "moving_month": "2",
                "box": 5
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error_type"], "validation_error");
        assert_eq!(json["details"][0], "Unknown prefecture 9999");
    }

    #[tokio::test]
    async fn test_estimate_missing_distance_is_internal_error() {
        // Both prefectures exist but no distance row connects them
        let (status, json) = post_json(
            warm_state().await,
            "/api/estimate",
            json!({
                "old_prefecture_id": 1,
                "new_prefecture_id": 3,
                "moving_month": "2",
                "box": 5
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Internal error");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_json() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/estimate",
            json!({
                "old_prefecture_id": 1,
                "new_prefecture_id": 2,
                "box": "many"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error_type"], "validation_error");
        assert!(json["details"][0]
            .as_str()
            .unwrap()
            .starts_with("Malformed request body"));
    }

    #[tokio::test]
    async fn test_order_missing_fields_uses_error_json() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/orders",
            json!({ "customer_name": "Sato" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error_type"], "validation_error");
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let response = crate::app(warm_state().await)
            .oneshot(Request::get("/api/cache/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["reference_cached"].is_boolean());
        assert!(json["prefectures_cached"].is_boolean());
    }

    #[tokio::test]
    async fn test_order_validation_happens_before_database() {
        let (status, json) = post_json(
            warm_state().await,
            "/api/orders",
            json!({
                "customer_name": "",
                "tel": "03-0000-0000",
                "email": "a@example.com",
                "old_address": "Sapporo",
                "new_address": "Sendai",
                "old_prefecture_id": 1,
                "new_prefecture_id": 2,
                "moving_month": "2",
                "bed": -1
            }),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_prefectures_from_cache() {
        let response = crate::app(warm_state().await)
            .oneshot(Request::get("/api/prefectures").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json[0]["prefecture_name"], "Hokkaido");
    }
}
