use axum::{
    Router,
    routing::{get, post, put},
};

use super::admin_controller;
use super::controller::{change_password, get_profile, update_profile};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/password", put(change_password))
}

/// Mounted under `/api/admin/users` behind `require_admin`.
pub fn init_admin_users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(admin_controller::list_users).post(admin_controller::create_user),
        )
        .route(
            "/{id}",
            get(admin_controller::get_user)
                .put(admin_controller::update_user)
                .delete(admin_controller::delete_user),
        )
        .route("/{id}/suspend", post(admin_controller::suspend_user))
        .route("/{id}/reinstate", post(admin_controller::reinstate_user))
}
