//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{auth::auth_middleware, tenant::tenant_middleware},
};

pub mod associations;
pub mod audit;
pub mod auth;
pub mod documents;
pub mod health;
pub mod organizations;
pub mod work_orders;

/// Creates the API router with public and protected routes.
///
/// Protected routes sit behind two layers, outermost first: JWT
/// authentication, then tenant-context resolution. A request that fails
/// either never reaches a handler, so no tenant-scoped statement can run
/// without a validated context.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(organizations::routes())
        .merge(associations::routes())
        .merge(documents::routes())
        .merge(work_orders::routes())
        .merge(audit::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
