//! Reusable server runtime
//!
//! [`ServerHandle`] owns the full lifecycle: storage selection, migrations,
//! the REST API task, metrics and graceful shutdown. The CLI binary and the
//! integration tests both start the service through it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::application::{SharedUserService, UserService};
use crate::config::{AppConfig, StorageKind};
use crate::domain::UserRepositoryInterface;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, DatabaseConfig, InMemoryUserRepository, UserRepository};
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};
use crate::shared::system_clock;

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running user service.
///
/// # Examples
///
/// ```rust,no_run
/// use user_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Service the HTTP layer delegates to.
    pub user_service: SharedUserService,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to. With `api_port = 0` this carries
    /// the port the OS picked.
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service with the given options.
    ///
    /// 1. Install the Prometheus metrics recorder
    /// 2. Open the configured storage (and migrate it, if enabled)
    /// 3. Bind and spawn the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        info!("Starting user service...");

        let prometheus_handle = prometheus_handle();

        // ── Storage ────────────────────────────────────────────
        let (repo, db): (Arc<dyn UserRepositoryInterface>, Option<DatabaseConnection>) =
            match app_cfg.database.storage {
                StorageKind::Sqlite => {
                    let db = init_database(&DatabaseConfig::from(&app_cfg.database)).await?;
                    if opts.auto_migrate {
                        info!("Running database migrations...");
                        Migrator::up(&db, None).await?;
                        info!("Migrations completed");
                    }
                    (Arc::new(UserRepository::new(db.clone())), Some(db))
                }
                StorageKind::Memory => {
                    warn!("Using in-memory storage; records are lost on restart");
                    (Arc::new(InMemoryUserRepository::new()), None)
                }
            };

        let user_service: SharedUserService = Arc::new(UserService::new(repo, system_clock()));

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiState::new(user_service.clone(), prometheus_handle));

        let listener = tokio::net::TcpListener::bind(app_cfg.api_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            shutdown_signal.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            user_service,
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Run until the server stops, either because shutdown was triggered
    /// or because the API task ended on its own. In-flight requests get
    /// `server.shutdown_timeout` seconds to finish before being dropped.
    pub async fn wait(self) {
        let Self {
            shutdown,
            mut api_task,
            db,
            ..
        } = self;
        let signal = shutdown.signal();

        let stopped_early = tokio::select! {
            _ = signal.wait() => false,
            result = &mut api_task => {
                if let Err(e) = result {
                    error!("REST API server task panicked: {}", e);
                }
                true
            }
        };

        if !stopped_early {
            let drained = shutdown
                .drain(async {
                    if let Err(e) = (&mut api_task).await {
                        error!("REST API server task panicked: {}", e);
                    }
                })
                .await;
            if !drained {
                api_task.abort();
            }
        }
        info!("REST API server stopped");

        if let Some(db) = db {
            match db.close().await {
                Ok(()) => info!("Database connection closed"),
                Err(e) => warn!("Error closing database connection: {}", e),
            }
        }

        info!("User service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down user service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Process-wide Prometheus handle.
///
/// The global recorder can only be installed once per process, so a second
/// `start` (or a test harness that already installed one) reuses it.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                warn!("Prometheus recorder unavailable, /metrics will stay empty: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    use crate::config::{DatabaseSettings, ServerConfig};

    fn options(storage: StorageKind, url: &str) -> ServerOptions {
        ServerOptions {
            config: AppConfig {
                server: ServerConfig {
                    api_host: "127.0.0.1".into(),
                    api_port: 0,
                    shutdown_timeout: 5,
                },
                database: DatabaseSettings {
                    storage,
                    url: url.into(),
                    max_connections: 1,
                },
                ..AppConfig::default()
            },
            auto_migrate: true,
        }
    }

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn serves_health_and_shuts_down_with_memory_storage() {
        let handle = ServerHandle::start(options(StorageKind::Memory, ""))
            .await
            .unwrap();
        assert!(handle.is_running());

        let response = raw_get(handle.local_addr, "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn migrates_sqlite_storage_on_start() {
        let handle = ServerHandle::start(options(StorageKind::Sqlite, "sqlite::memory:"))
            .await
            .unwrap();

        let response = raw_get(handle.local_addr, "/api/users").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("[]"), "{response}");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_server() {
        let handle = ServerHandle::start(options(StorageKind::Memory, ""))
            .await
            .unwrap();
        let signal = handle.shutdown_signal();
        let waiter = tokio::spawn(handle.wait());

        signal.trigger();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
