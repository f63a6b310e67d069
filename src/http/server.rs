//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (mutation queue, reload coordinator, renderer)
//! - Create the Axum router with public and admin routes
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until shutdown is triggered

use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::ServiceConfig;
use crate::directory::{ConfigStore, MutationQueue};
use crate::http::handlers::{add_user, del_user, health, subscription};
use crate::lifecycle::{Shutdown, ShutdownListener};
use crate::reload::{ReloadCoordinator, ServiceRestarter};
use crate::subscription::SubscriptionRenderer;

/// Application state injected into handlers.
pub struct AppState<R> {
    pub queue: MutationQueue,
    pub store: ConfigStore,
    pub reload: ReloadCoordinator<R>,
    pub renderer: SubscriptionRenderer,
    token: Arc<str>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            store: self.store.clone(),
            reload: self.reload.clone(),
            renderer: self.renderer.clone(),
            token: self.token.clone(),
        }
    }
}

impl<R> AppState<R> {
    /// Compare a presented token with the configured secret.
    pub fn token_matches(&self, presented: Option<&str>) -> bool {
        presented.is_some_and(|t| t == &*self.token)
    }
}

/// HTTP server for the control plane.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    worker: JoinHandle<()>,
}

impl HttpServer {
    /// Create the server and spawn the mutation worker. Must run inside a tokio runtime.
    pub fn new<R: ServiceRestarter>(config: ServiceConfig, restarter: R, shutdown: &Shutdown) -> Self {
        let store = ConfigStore::new(PathBuf::from(&config.storage.config_file));
        let (queue, worker) = MutationQueue::spawn(
            store.clone(),
            config.listener.mutation_queue_capacity,
            shutdown.listener(),
        );

        let state = AppState {
            queue,
            store,
            reload: ReloadCoordinator::new(restarter, &config.reload),
            renderer: SubscriptionRenderer::new(&config.storage.sub_file, &config.subscription),
            token: Arc::from(config.auth.token.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            worker,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<R: ServiceRestarter>(config: &ServiceConfig, state: AppState<R>) -> Router {
        let public = Router::new()
            .route("/health", get(health))
            .route("/add_user", post(add_user::<R>))
            .route("/del_user", post(del_user::<R>))
            .route("/sub/{id}", get(subscription::<R>))
            .with_state(state.clone());

        public.merge(setup_admin_router(state)).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.listener.request_timeout_secs,
                ))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownListener,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            config_file = %self.config.storage.config_file,
            service = %self.config.reload.service_name,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        // worker stops on the same signal once its queue is drained
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Mutation worker panicked");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
