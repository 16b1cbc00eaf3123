//! Static HTTP route table.
//!
//! | Method | Path        | Body                                     |
//! |--------|-------------|------------------------------------------|
//! | GET    | `/`         | HTML home page                           |
//! | GET    | `/health`   | `{"status":"ok","version":…}`            |
//! | GET    | `/api/info` | `{"name":…,"version":…,"runtime":{…}}`   |
//! | *      | *           | `404 {"error":"Not Found"}`              |
//!
//! Handlers hold no state, so the router is safe to share across
//! concurrently served connections.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

/// Application name reported by `/api/info`.
pub const APP_NAME: &str = "@denovibe/app";

/// Application version reported by `/health` and `/api/info`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One served route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: &'static str,
    /// Request path.
    pub path: &'static str,
}

/// Every route [`router`] serves, in registration order.
pub const ROUTES: &[RouteInfo] = &[
    RouteInfo {
        method: "GET",
        path: "/",
    },
    RouteInfo {
        method: "GET",
        path: "/health",
    },
    RouteInfo {
        method: "GET",
        path: "/api/info",
    },
];

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>denovibe</title>
</head>
<body>
  <h1>denovibe</h1>
  <p>A GitHub DevOps boilerplate template.</p>
  <ul>
    <li><a href="/health">Health check</a></li>
    <li><a href="/api/info">App info</a></li>
  </ul>
</body>
</html>"#;

/// Build the application router.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(home).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .route("/api/info", get(info).fallback(not_found))
        .fallback(not_found)
}

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

async fn info() -> Json<serde_json::Value> {
    Json(json!({
        "name": APP_NAME,
        "version": VERSION,
        "runtime": {
            "name": "tokio",
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "family": std::env::consts::FAMILY,
        },
    }))
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
}
