//! API router with Swagger documentation

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::FromRef, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::SharedUserService;
use crate::interfaces::http::common::{ErrorResponse, ViolationDto};
use crate::interfaces::http::modules::{health, metrics, request_id, users};

/// Path the OpenAPI document is served from.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// State shared by every route.
///
/// Axum extracts the specific handler state via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub user_service: SharedUserService,
    pub metrics_handle: PrometheusHandle,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(user_service: SharedUserService, metrics_handle: PrometheusHandle) -> Self {
        Self {
            user_service,
            metrics_handle,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiState> for users::UserHandlerState {
    fn from_ref(s: &ApiState) -> Self {
        users::UserHandlerState {
            user_service: s.user_service.clone(),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            user_service: s.user_service.clone(),
            started_at: s.started_at.clone(),
        }
    }
}

impl FromRef<ApiState> for metrics::MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        metrics::MetricsState {
            handle: s.metrics_handle.clone(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        metrics::prometheus_metrics,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(
        health::HealthResponse,
        health::ComponentHealth,
        users::UserDto,
        users::UserRequest,
        ErrorResponse,
        ViolationDto,
    )),
    tags(
        (name = "Health", description = "Liveness, storage health and metrics"),
        (name = "Users", description = "User records with validation and derived age"),
    ),
    info(
        title = "User Service API",
        version = "1.0.0",
        description = "CRUD over user records. Ages are derived from the date of birth at read time.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // `/api/users/` is served the same as `/api/users`.
    let collection = get(users::list_users).post(users::create_user);
    let user_routes: Router<ApiState> = Router::new()
        .route("/api/users", collection.clone())
        .route("/api/users/", collection)
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        );

    let swagger_routes = SwaggerUi::new("/docs").url(OPENAPI_PATH, ApiDoc::openapi());

    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Health and metrics
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        // Users
        .merge(user_routes)
        // Middleware
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .with_state(state)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    use crate::application::UserService;
    use crate::domain::UserRepositoryInterface;
    use crate::infrastructure::InMemoryUserRepository;
    use crate::shared::system_clock;

    fn app() -> Router {
        let repo: Arc<dyn UserRepositoryInterface> = Arc::new(InMemoryUserRepository::new());
        let service = Arc::new(UserService::new(repo, system_clock()));
        let handle = PrometheusBuilder::new().build_recorder().handle();
        create_api_router(ApiState::new(service, handle))
    }

    async fn get(uri: &str) -> axum::response::Response {
        app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn users_collection_is_routed() {
        let resp = get("/api/users").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(request_id::REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn users_collection_accepts_trailing_slash() {
        let resp = get("/api/users/").await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"[]");
    }

    #[tokio::test]
    async fn health_is_ok_on_memory_store() {
        assert_eq!(get("/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_renders() {
        let resp = get("/metrics").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn openapi_document_lists_user_paths() {
        let resp = get(OPENAPI_PATH).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/api/users"].is_object());
        assert!(doc["paths"]["/api/users/{id}"].is_object());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        assert_eq!(get("/api/nope").await.status(), StatusCode::NOT_FOUND);
    }
}
