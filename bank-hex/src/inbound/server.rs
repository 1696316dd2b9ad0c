//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use bank_types::{BankRepository, IdentifierGenerator, SecretVerifier};

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use crate::{AuthorizationPolicy, LedgerService, PaymentService};

/// HTTP Server for the bank API.
pub struct HttpServer<R, V, G>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    state: Arc<AppState<R, V, G>>,
}

impl<R, V, G> HttpServer<R, V, G>
where
    R: BankRepository,
    V: SecretVerifier,
    G: IdentifierGenerator,
{
    /// Wires both services over one repository and one authorization policy.
    pub fn new(repo: Arc<R>, verifier: V, generator: G, admin_name: impl Into<String>) -> Self {
        let policy = Arc::new(AuthorizationPolicy::new(verifier));
        let state = AppState {
            ledger: LedgerService::new(repo.clone(), policy.clone(), generator),
            payments: PaymentService::new(repo.clone(), policy),
            repo,
            admin_name: admin_name.into(),
        };

        Self {
            state: Arc::new(state),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/bootstrap", post(handlers::bootstrap::<R, V, G>))
            .route("/api/keys", post(handlers::issue_api_key::<R, V, G>))
            .route("/api/accounts", post(handlers::create_account::<R, V, G>))
            .route("/api/accounts/top-up", post(handlers::top_up::<R, V, G>))
            .route("/api/accounts/lock", post(handlers::lock::<R, V, G>))
            .route("/api/accounts/unlock", post(handlers::unlock::<R, V, G>))
            .route("/api/payments", post(handlers::create_payment::<R, V, G>))
            .route(
                "/api/payments/{id}/send",
                post(handlers::send_payment::<R, V, G>),
            )
            .route("/api/messages", get(handlers::list_messages::<R, V, G>))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R, V, G>,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
