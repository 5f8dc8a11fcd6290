//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::application::SharedUserService;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub user_service: SharedUserService,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: ComponentHealth,
}

/// Component health status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is degraded", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.started_at.elapsed().as_secs();

    let ping_start = Instant::now();
    let storage = match state.user_service.ping().await {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(ping_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    };

    let (http_status, overall) = if storage.status == "ok" {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        http_status,
        Json(HealthResponse {
            status: overall.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            storage,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::UserService;
    use crate::domain::{
        DomainError, DomainResult, NewUser, User, UserRepositoryInterface,
    };
    use crate::infrastructure::InMemoryUserRepository;
    use crate::shared::system_clock;

    struct DownRepository;

    #[async_trait]
    impl UserRepositoryInterface for DownRepository {
        async fn list_users(&self) -> DomainResult<Vec<User>> {
            Ok(Vec::new())
        }
        async fn get_user_by_id(&self, _id: i32) -> DomainResult<Option<User>> {
            Ok(None)
        }
        async fn create_user(&self, _user: NewUser) -> DomainResult<User> {
            Err(DomainError::Storage("down".into()))
        }
        async fn update_user(&self, _user: User) -> DomainResult<()> {
            Err(DomainError::Storage("down".into()))
        }
        async fn delete_user(&self, _id: i32) -> DomainResult<()> {
            Ok(())
        }
        async fn ping(&self) -> DomainResult<()> {
            Err(DomainError::Storage("connection refused".into()))
        }
    }

    fn state(repo: Arc<dyn UserRepositoryInterface>) -> HealthState {
        HealthState {
            user_service: Arc::new(UserService::new(repo, system_clock())),
            started_at: Arc::new(Instant::now()),
        }
    }

    #[tokio::test]
    async fn healthy_store_reports_ok() {
        let (status, Json(body)) =
            health_check(State(state(Arc::new(InMemoryUserRepository::new())))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.storage.status, "ok");
    }

    #[tokio::test]
    async fn failing_ping_reports_degraded() {
        let (status, Json(body)) = health_check(State(state(Arc::new(DownRepository)))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert!(body.storage.latency_ms.is_none());
    }
}
