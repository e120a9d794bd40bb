//! API surface tests using in-process router requests

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sentinel_iscore::api::{create_router, handlers::AppState};
use sentinel_iscore::models::config::{DatasetSizes, Settings};
use serde_json::Value;
use tower::ServiceExt;

fn test_settings() -> Settings {
    Settings {
        dataset_sizes: DatasetSizes {
            countries: 8,
            suppliers: 40,
            products: 15,
            trade_routes: 10,
            companies: 5,
            risk_events: 20,
        },
        ..Default::default()
    }
}

async fn test_app() -> axum::Router {
    let state = Arc::new(AppState::new(&test_settings()).unwrap());
    create_router(state)
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get_json(test_app().await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_list_countries_with_pagination() {
    let (status, body) = get_json(test_app().await, "/v1/countries?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["total_count"], 8);
    assert_eq!(data["items"].as_array().unwrap().len(), 3);
    assert_eq!(data["limit"], 3);
}

#[tokio::test]
async fn test_country_detail_includes_statistics() {
    let (status, body) = get_json(test_app().await, "/v1/countries/1").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert!(data["country_code"].is_string());
    assert!(data["statistics"]["supplier_count"].is_number());
    assert!(data["statistics"]["risk_level"].is_string());
}

#[tokio::test]
async fn test_risk_score_for_country() {
    let app = test_app().await;
    let (status, body) = get_json(app.clone(), "/v1/risk-score/country/1").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["entity_type"], "country");
    assert_eq!(data["entity_id"], 1);
    assert_eq!(data["cached"], false);
    let score = data["risk_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(data["breakdown"]["political_stability"].is_number());

    // Second request is served from the cache
    let (status, body) = get_json(app, "/v1/risk-score/country/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cached"], true);
    assert_eq!(body["data"]["risk_score"].as_f64().unwrap(), score);
}

#[tokio::test]
async fn test_risk_score_unknown_entity_type_is_bad_request() {
    let (status, body) = get_json(test_app().await, "/v1/risk-score/warehouse/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_risk_score_missing_entity_is_not_found() {
    let (status, body) = get_json(test_app().await, "/v1/risk-score/supplier/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_supply_chain_risk_breakdown() {
    let (status, body) = get_json(test_app().await, "/v1/supply-chain-risk/1").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["company_id"], 1);
    assert!(data["overall_risk_score"].as_f64().unwrap() <= 100.0);
    assert!(data["supplier_risk"].is_number());
    assert!(data["concentration_risk"].is_number());
    assert!(data["supplier_count"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_risk_alerts_filtering() {
    let (status, body) = get_json(test_app().await, "/v1/risk-alerts?severity_min=40").await;
    assert_eq!(status, StatusCode::OK);

    for alert in body["data"]["alerts"].as_array().unwrap() {
        assert!(alert["severity"].as_f64().unwrap() >= 40.0);
        assert_eq!(alert["is_active"], true);
    }
}

#[tokio::test]
async fn test_risk_alerts_bad_event_type() {
    let (status, _) = get_json(test_app().await, "/v1/risk-alerts?event_type=volcano").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let (status, body) = get_json(test_app().await, "/v1/dashboard-summary").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["summary"]["total_countries"], 8);
    assert!(data["risk_metrics"]["average_country_risk"].is_number());
}

#[tokio::test]
async fn test_stats_endpoint() {
    let app = test_app().await;
    // Score something first so the telemetry has content
    let _ = get_json(app.clone(), "/v1/risk-score/product/1").await;

    let (status, body) = get_json(app, "/v1/stats").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert!(data["telemetry"]["total_scored"].as_u64().unwrap() >= 1);
    assert!(data["cache"]["entries"].as_u64().unwrap() >= 1);
    assert!(data["api_version"].is_string());
}

#[tokio::test]
async fn test_invalid_api_key_is_rejected() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/countries")
                .header("X-API-Key", "not-a-valid-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_trade_route_listing_filters_by_type() {
    let (status, body) = get_json(test_app().await, "/v1/trade-routes?route_type=sea").await;
    assert_eq!(status, StatusCode::OK);

    for route in body["data"]["items"].as_array().unwrap() {
        assert_eq!(route["route_type"], "sea");
    }
}
