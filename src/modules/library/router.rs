use axum::{
    Router,
    routing::{get, post, put},
};

use super::controller::{
    checkout, create_book, create_category, delete_book, get_book, get_card, get_fine,
    issue_card, list_books, list_categories, list_overdue, my_history, pay_fine, return_book,
    update_book, update_card_status, user_history,
};
use crate::state::AppState;

/// Reads are open to any authenticated user; mutations check for staff
/// in the handler.
pub fn init_library_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/cards/{user_id}", get(get_card).post(issue_card))
        .route("/cards/{user_id}/status", put(update_card_status))
        .route("/history", get(my_history))
        .route("/history/{user_id}", get(user_history))
        .route("/fines/{issue_id}", get(get_fine))
        .route("/fines/{issue_id}/pay", post(pay_fine))
}

/// Mounted under `/api/library/circulation` behind `require_staff`.
pub fn init_circulation_router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/overdue", get(list_overdue))
        .route("/{issue_id}/return", put(return_book))
}
