pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_auth_middleware;
use self::handlers::get_users;
use crate::http::server::AppState;
use crate::reload::ServiceRestarter;

pub fn setup_admin_router<R: ServiceRestarter>(state: AppState<R>) -> Router {
    Router::new()
        .route("/users", get(get_users::<R>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware::<R>,
        ))
        .with_state(state)
}
