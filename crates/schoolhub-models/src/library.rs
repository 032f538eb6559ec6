//! Library catalogue, cards, circulation and fines.
//!
//! Money is always integer cents.

use chrono::{DateTime, Utc};
use schoolhub_core::serde::{deserialize_optional_string, deserialize_optional_uuid};
use schoolhub_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "card_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Expired,
    Blocked,
}

/// Overdue is not a stored status; it is an `Issued` row past its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "issue_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Issued,
    Returned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "payment_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Cash,
    Card,
    Online,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Category name is required"))]
    #[schema(example = "Fiction")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub category_id: Option<Uuid>,
    pub price_cents: Option<i64>,
    pub pages: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub rack_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_total_copies() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBookDto {
    #[validate(length(min = 10, max = 20, message = "ISBN must be 10-20 characters"))]
    #[schema(example = "9780261102217")]
    pub isbn: String,
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 255, message = "Author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    #[validate(range(min = 0, max = 9999))]
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Pages cannot be negative"))]
    pub pages: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default = "default_total_copies")]
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: i32,
    pub rack_number: Option<String>,
}

/// Partial update. Changing `total_copies` shifts `available_copies` by
/// the same amount.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookDto {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub publisher: Option<String>,
    #[validate(range(min = 0, max = 9999))]
    pub publication_year: Option<i32>,
    pub edition: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 0, message = "Pages cannot be negative"))]
    pub pages: Option<i32>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: Option<i32>,
    pub rack_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub category_id: Option<Uuid>,
    /// Case-insensitive match on title, author or ISBN
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedBooksResponse {
    pub data: Vec<Book>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryCard {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "LIB-20250301-042917")]
    pub card_number: String,
    pub issue_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: CardStatus,
    pub max_books: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct IssueCardParams {
    /// Years until expiry, capped at 100. Missing or non-positive uses the configured default.
    pub valid_for_years: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCardStatusDto {
    pub status: CardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookIssue {
    pub id: Uuid,
    pub book_id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: IssueStatus,
    pub fine_amount_cents: i64,
    pub fine_paid: bool,
    pub issued_by: Option<Uuid>,
    pub received_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issue row joined with book and borrower details, for history and
/// overdue listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct IssueWithDetails {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub isbn: String,
    pub user_id: Uuid,
    pub borrower_name: String,
    pub card_number: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: IssueStatus,
    pub fine_amount_cents: i64,
    pub fine_paid: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutDto {
    pub book_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PayFineDto {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,
    pub payment_mode: PaymentMode,
    #[validate(length(max = 100))]
    pub reference_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FinePayment {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub amount_cents: i64,
    pub payment_date: DateTime<Utc>,
    pub received_by: Option<Uuid>,
    pub payment_mode: PaymentMode,
    pub reference_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FineSummary {
    pub issue_id: Uuid,
    /// Fine fixed at return time
    pub assessed_cents: i64,
    /// Fine the borrower would owe if the book were returned now
    pub accrued_cents: i64,
    pub paid: bool,
}
