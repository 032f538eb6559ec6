use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use schoolhub_core::AppError;
use tracing::instrument;
use uuid::Uuid;

use super::circulation::{CirculationService, fine_summary};
use super::model::{
    Book, BookCategory, BookFilterParams, BookIssue, CheckoutDto, CreateBookDto,
    CreateCategoryDto, FinePayment, FineSummary, IssueCardParams, IssueWithDetails, LibraryCard,
    PaginatedBooksResponse, PayFineDto, UpdateBookDto, UpdateCardStatusDto,
};
use super::service::LibraryService;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireStaff, check_self_or_staff};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Create a book category
#[utoipa::path(
    post,
    path = "/api/library/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = BookCategory),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 409, description = "Category already exists", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<BookCategory>), AppError> {
    let category = LibraryService::create_category(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// List book categories
#[utoipa::path(
    get,
    path = "/api/library/categories",
    responses(
        (status = 200, description = "Active categories", body = Vec<BookCategory>)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookCategory>>, AppError> {
    let categories = LibraryService::list_categories(&state.db).await?;
    Ok(Json(categories))
}

/// Add a book to the catalogue
#[utoipa::path(
    post,
    path = "/api/library/books",
    request_body = CreateBookDto,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Unknown category", body = ErrorResponse),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 409, description = "ISBN already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn create_book(
    State(state): State<AppState>,
    _staff: RequireStaff,
    ValidatedJson(dto): ValidatedJson<CreateBookDto>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = LibraryService::create_book(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Search the catalogue
#[utoipa::path(
    get,
    path = "/api/library/books",
    params(
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Match on title, author or ISBN"),
        schoolhub_core::PaginationParams
    ),
    responses(
        (status = 200, description = "Paginated books", body = PaginatedBooksResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(filters): Query<BookFilterParams>,
) -> Result<Json<PaginatedBooksResponse>, AppError> {
    let books = LibraryService::list_books(&state.db, filters).await?;
    Ok(Json(books))
}

/// Get a book
#[utoipa::path(
    get,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book found", body = Book),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(book.id = %id))]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, AppError> {
    let book = LibraryService::get_book(&state.db, id).await?;
    Ok(Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBookDto,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Total copies below copies on loan", body = ErrorResponse),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(book.id = %id))]
pub async fn update_book(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateBookDto>,
) -> Result<Json<Book>, AppError> {
    let book = LibraryService::update_book(&state.db, id, dto).await?;
    Ok(Json(book))
}

/// Remove a book from the catalogue
#[utoipa::path(
    delete,
    path = "/api/library/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deactivated"),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(book.id = %id))]
pub async fn delete_book(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    LibraryService::delete_book(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue or renew a library card
#[utoipa::path(
    post,
    path = "/api/library/cards/{user_id}",
    params(("user_id" = Uuid, Path, description = "Card holder"), IssueCardParams),
    responses(
        (status = 201, description = "Card issued or renewed", body = LibraryCard),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User already has an active card", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %user_id))]
pub async fn issue_card(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(user_id): Path<Uuid>,
    Query(params): Query<IssueCardParams>,
) -> Result<(StatusCode, Json<LibraryCard>), AppError> {
    let card = LibraryService::issue_card(
        &state.db,
        &state.library_config,
        user_id,
        params.valid_for_years,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// Get a user's library card
#[utoipa::path(
    get,
    path = "/api/library/cards/{user_id}",
    params(("user_id" = Uuid, Path, description = "Card holder")),
    responses(
        (status = 200, description = "Library card", body = LibraryCard),
        (status = 403, description = "Not staff and not the card holder", body = ErrorResponse),
        (status = 404, description = "Library card not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %user_id))]
pub async fn get_card(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<LibraryCard>, AppError> {
    check_self_or_staff(&auth_user, user_id)?;
    let card = LibraryService::get_card(&state.db, user_id).await?;
    Ok(Json(card))
}

/// Block, expire or reactivate a card
#[utoipa::path(
    put,
    path = "/api/library/cards/{user_id}/status",
    params(("user_id" = Uuid, Path, description = "Card holder")),
    request_body = UpdateCardStatusDto,
    responses(
        (status = 200, description = "Card status updated", body = LibraryCard),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Library card not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %user_id))]
pub async fn update_card_status(
    State(state): State<AppState>,
    _staff: RequireStaff,
    Path(user_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCardStatusDto>,
) -> Result<Json<LibraryCard>, AppError> {
    let card = LibraryService::update_card_status(&state.db, user_id, dto.status).await?;
    Ok(Json(card))
}

/// Check a book out to a card holder
#[utoipa::path(
    post,
    path = "/api/library/circulation/checkout",
    request_body = CheckoutDto,
    responses(
        (status = 201, description = "Book issued", body = BookIssue),
        (status = 400, description = "Card, fine, loan limit or availability problem", body = ErrorResponse),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    staff: AuthUser,
    ValidatedJson(dto): ValidatedJson<CheckoutDto>,
) -> Result<(StatusCode, Json<BookIssue>), AppError> {
    let issue =
        CirculationService::checkout(&state.db, &state.library_config, staff.user_id()?, dto)
            .await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/api/library/circulation/{issue_id}/return",
    params(("issue_id" = Uuid, Path, description = "Issue record ID")),
    responses(
        (status = 200, description = "Book returned, fine assessed", body = BookIssue),
        (status = 400, description = "Already returned", body = ErrorResponse),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Issue record not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(issue.id = %issue_id))]
pub async fn return_book(
    State(state): State<AppState>,
    staff: AuthUser,
    Path(issue_id): Path<Uuid>,
) -> Result<Json<BookIssue>, AppError> {
    let issue = CirculationService::return_book(
        &state.db,
        &state.library_config,
        staff.user_id()?,
        issue_id,
    )
    .await?;
    Ok(Json(issue))
}

/// List overdue loans
#[utoipa::path(
    get,
    path = "/api/library/circulation/overdue",
    responses(
        (status = 200, description = "Issued items past their due date", body = Vec<IssueWithDetails>),
        (status = 403, description = "Staff access required", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn list_overdue(
    State(state): State<AppState>,
) -> Result<Json<Vec<IssueWithDetails>>, AppError> {
    let issues = CirculationService::list_overdue(&state.db).await?;
    Ok(Json(issues))
}

/// The caller's borrowing history
#[utoipa::path(
    get,
    path = "/api/library/history",
    responses(
        (status = 200, description = "Loans, newest first", body = Vec<IssueWithDetails>)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn my_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<IssueWithDetails>>, AppError> {
    let issues = CirculationService::history(&state.db, auth_user.user_id()?).await?;
    Ok(Json(issues))
}

/// A user's borrowing history
#[utoipa::path(
    get,
    path = "/api/library/history/{user_id}",
    params(("user_id" = Uuid, Path, description = "Borrower")),
    responses(
        (status = 200, description = "Loans, newest first", body = Vec<IssueWithDetails>),
        (status = 403, description = "Not staff and not the borrower", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(user.id = %user_id))]
pub async fn user_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<IssueWithDetails>>, AppError> {
    check_self_or_staff(&auth_user, user_id)?;
    let issues = CirculationService::history(&state.db, user_id).await?;
    Ok(Json(issues))
}

/// Fine owed on a loan
#[utoipa::path(
    get,
    path = "/api/library/fines/{issue_id}",
    params(("issue_id" = Uuid, Path, description = "Issue record ID")),
    responses(
        (status = 200, description = "Assessed and accrued fine", body = FineSummary),
        (status = 403, description = "Not staff and not the borrower", body = ErrorResponse),
        (status = 404, description = "Issue record not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(issue.id = %issue_id))]
pub async fn get_fine(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(issue_id): Path<Uuid>,
) -> Result<Json<FineSummary>, AppError> {
    let issue = CirculationService::get_issue(&state.db, issue_id).await?;
    check_self_or_staff(&auth_user, issue.user_id)?;
    Ok(Json(fine_summary(
        &issue,
        Utc::now(),
        state.library_config.fine_per_day_cents,
    )))
}

/// Record payment of an assessed fine
#[utoipa::path(
    post,
    path = "/api/library/fines/{issue_id}/pay",
    params(("issue_id" = Uuid, Path, description = "Issue record ID")),
    request_body = PayFineDto,
    responses(
        (status = 201, description = "Payment recorded", body = FinePayment),
        (status = 400, description = "No fine, already paid, or wrong amount", body = ErrorResponse),
        (status = 403, description = "Staff access required", body = ErrorResponse),
        (status = 404, description = "Issue record not found", body = ErrorResponse)
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all, fields(issue.id = %issue_id))]
pub async fn pay_fine(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(issue_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<PayFineDto>,
) -> Result<(StatusCode, Json<FinePayment>), AppError> {
    let payment =
        CirculationService::pay_fine(&state.db, staff.user_id()?, issue_id, dto).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
