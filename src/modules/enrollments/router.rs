use axum::{
    Router,
    routing::{get, post},
};

use super::controller::{enroll, my_enrollments, withdraw};
use crate::state::AppState;

/// `POST /{id}` takes a course id, `DELETE /{id}` an enrollment id.
pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(my_enrollments))
        .route("/{id}", post(enroll).delete(withdraw))
}
