//! Demo routes, one per access policy.

use crate::access;
use crate::plans::Perm;
use crate::state::AppState;
use axum::{Extension, Json, Router, middleware::from_fn_with_state, routing::get};
use serde_json::{Value, json};

/// `/login` always sets a cookie, `/public` accepts anyone, `/private` requires a cookie.
pub fn router(state: AppState) -> Router {
    let login_routes = Router::new()
        .route("/login", get(login))
        .layer(from_fn_with_state(state.access.clone(), access::set));
    let public_routes = Router::new()
        .route("/public", get(public))
        .layer(from_fn_with_state(state.access.clone(), access::vet));
    let private_routes = Router::new()
        .route("/private", get(private))
        .layer(from_fn_with_state(state.access.clone(), access::chk));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(login_routes)
        .merge(public_routes)
        .merge(private_routes)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "ok": true, "service": "sigil-server" }))
}

async fn login(Extension(perm): Extension<Perm>) -> Json<Value> {
    Json(json!({ "perm": perm.value }))
}

async fn public(Extension(perm): Extension<Perm>) -> Json<Value> {
    Json(json!({ "perm": perm.value, "area": "public" }))
}

async fn private(Extension(perm): Extension<Perm>) -> Json<Value> {
    Json(json!({ "perm": perm.value, "area": "private" }))
}
