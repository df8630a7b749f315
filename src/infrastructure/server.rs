// Server module - Builds the HTTP application and serves it

use axum::{Router, middleware};
use axum::http::HeaderValue;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api_docs::ApiDoc;
use crate::infrastructure::AppState;
use crate::infrastructure::config::Config;

/// Build the full application router: `/api` routes, Swagger UI and middleware
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api_router = api::api_router(state);

    let app = Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_router);

    with_middleware(app, config)
}

fn with_middleware(app: Router, config: &Config) -> Router {
    let timeout = Duration::from_millis(config.request_timeout_ms);

    app.layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(api::error::timeout_as_json))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    layer.allow_origin(allowed)
}

/// Bind to the configured address and serve until the process stops
pub async fn serve(state: AppState, config: &Config) -> std::io::Result<()> {
    let app = build_router(state, config);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!("Book catalog listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out_with_json_body() {
        let config = Config {
            request_timeout_ms: 10,
            ..Config::default()
        };
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "late"
            }),
        );

        let app = with_middleware(slow, &config);
        let req = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
