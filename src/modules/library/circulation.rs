//! Checkout, return and fines.
//!
//! Checkout and return each touch a `books` row and a `book_issues` row;
//! both run in a single transaction with the rows locked `FOR UPDATE`, so
//! `available_copies` always equals `total_copies` minus the number of
//! `issued` rows for that book.

use chrono::{DateTime, Duration, Utc};
use schoolhub_config::LibraryConfig;
use schoolhub_core::AppError;
use schoolhub_observability as observability;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{
    BookIssue, CardStatus, CheckoutDto, FinePayment, FineSummary, IssueStatus, IssueWithDetails,
    LibraryCard, PayFineDto,
};

const ISSUE_COLUMNS: &str = "id, book_id, card_id, user_id, issue_date, due_date, return_date, \
    status, fine_amount_cents, fine_paid, issued_by, received_by, created_at, updated_at";

const ISSUE_WITH_DETAILS_SELECT: &str = "SELECT i.id, i.book_id, b.title AS book_title, b.isbn,
        i.user_id, u.first_name || ' ' || u.last_name AS borrower_name, c.card_number,
        i.issue_date, i.due_date, i.return_date, i.status, i.fine_amount_cents, i.fine_paid
     FROM book_issues i
     JOIN books b ON b.id = i.book_id
     JOIN users u ON u.id = i.user_id
     JOIN library_cards c ON c.id = i.card_id";

/// Whole days late times the daily rate. Partial days are not charged.
pub fn compute_overdue_fine(
    due_date: DateTime<Utc>,
    returned_at: DateTime<Utc>,
    fine_per_day_cents: i64,
) -> i64 {
    let days_late = (returned_at - due_date).num_days();
    if days_late <= 0 {
        0
    } else {
        days_late.saturating_mul(fine_per_day_cents.max(0))
    }
}

pub fn due_date(issued_at: DateTime<Utc>, loan_days: i64) -> DateTime<Utc> {
    issued_at + Duration::days(loan_days.max(1))
}

/// The stored fine once returned; while still out, what it would be now.
pub fn fine_summary(issue: &BookIssue, now: DateTime<Utc>, fine_per_day_cents: i64) -> FineSummary {
    let accrued_cents = match issue.status {
        IssueStatus::Returned => issue.fine_amount_cents,
        IssueStatus::Issued => compute_overdue_fine(issue.due_date, now, fine_per_day_cents),
    };

    FineSummary {
        issue_id: issue.id,
        assessed_cents: issue.fine_amount_cents,
        accrued_cents,
        paid: issue.fine_paid,
    }
}

/// Rejects cards that cannot borrow right now.
pub fn ensure_card_usable(card: &LibraryCard, now: DateTime<Utc>) -> Result<(), AppError> {
    match card.status {
        CardStatus::Blocked => Err(AppError::bad_request(anyhow::anyhow!(
            "Library card is blocked"
        ))),
        CardStatus::Expired => Err(AppError::bad_request(anyhow::anyhow!(
            "Library card has expired"
        ))),
        CardStatus::Active if card.expiry_date <= now => Err(AppError::bad_request(
            anyhow::anyhow!("Library card has expired"),
        )),
        CardStatus::Active => Ok(()),
    }
}

/// Checks a payment against an issue's fine. Only the exact assessed
/// amount settles it.
pub fn validate_fine_payment(issue: &BookIssue, amount_cents: i64) -> Result<(), AppError> {
    if issue.fine_amount_cents == 0 {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "No fine assessed for this issue"
        )));
    }
    if issue.fine_paid {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Fine has already been paid"
        )));
    }
    if amount_cents != issue.fine_amount_cents {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Payment must equal the assessed fine of {} cents",
            issue.fine_amount_cents
        )));
    }
    Ok(())
}

fn issue_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Issue record not found"))
}

pub struct CirculationService;

impl CirculationService {
    #[instrument(skip(db, config, dto), fields(book.id = %dto.book_id, user.id = %dto.user_id, db.operation = "INSERT", db.table = "book_issues"))]
    pub async fn checkout(
        db: &PgPool,
        config: &LibraryConfig,
        issued_by: Uuid,
        dto: CheckoutDto,
    ) -> Result<BookIssue, AppError> {
        let now = Utc::now();
        let mut tx = db.begin().await?;

        let card = sqlx::query_as::<_, LibraryCard>(
            "SELECT id, user_id, card_number, issue_date, expiry_date, status, max_books, created_at, updated_at
             FROM library_cards WHERE user_id = $1 FOR UPDATE",
        )
        .bind(dto.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("No active library card found")))?;

        ensure_card_usable(&card, now)?;

        let unpaid_fines: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_issues
             WHERE user_id = $1 AND fine_amount_cents > 0 AND fine_paid = FALSE",
        )
        .bind(dto.user_id)
        .fetch_one(&mut *tx)
        .await?;

        if unpaid_fines > 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Outstanding fines must be paid before borrowing"
            )));
        }

        let on_loan: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_issues WHERE user_id = $1 AND status = 'issued'",
        )
        .bind(dto.user_id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan >= i64::from(card.max_books) {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Maximum of {} books already on loan",
                card.max_books
            )));
        }

        let available: i32 = sqlx::query_scalar(
            "SELECT available_copies FROM books WHERE id = $1 AND is_active = TRUE FOR UPDATE",
        )
        .bind(dto.book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Book not found")))?;

        if available <= 0 {
            return Err(AppError::bad_request(anyhow::anyhow!("No copies available")));
        }

        sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(dto.book_id)
        .execute(&mut *tx)
        .await?;

        let issue = sqlx::query_as::<_, BookIssue>(&format!(
            "INSERT INTO book_issues (book_id, card_id, user_id, issue_date, due_date, issued_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            ISSUE_COLUMNS
        ))
        .bind(dto.book_id)
        .bind(card.id)
        .bind(dto.user_id)
        .bind(now)
        .bind(due_date(now, config.loan_days))
        .bind(issued_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        observability::track_book_checked_out();
        info!(issue.id = %issue.id, due_date = %issue.due_date, "Book checked out");

        Ok(issue)
    }

    #[instrument(skip(db, config), fields(db.operation = "UPDATE", db.table = "book_issues"))]
    pub async fn return_book(
        db: &PgPool,
        config: &LibraryConfig,
        received_by: Uuid,
        issue_id: Uuid,
    ) -> Result<BookIssue, AppError> {
        let now = Utc::now();
        let mut tx = db.begin().await?;

        let issue = sqlx::query_as::<_, BookIssue>(&format!(
            "SELECT {} FROM book_issues WHERE id = $1 FOR UPDATE",
            ISSUE_COLUMNS
        ))
        .bind(issue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(issue_not_found)?;

        if issue.status == IssueStatus::Returned {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Book has already been returned"
            )));
        }

        let fine = compute_overdue_fine(issue.due_date, now, config.fine_per_day_cents);

        let returned = sqlx::query_as::<_, BookIssue>(&format!(
            "UPDATE book_issues SET
                status = 'returned', return_date = $2, received_by = $3,
                fine_amount_cents = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            ISSUE_COLUMNS
        ))
        .bind(issue_id)
        .bind(now)
        .bind(received_by)
        .bind(fine)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET available_copies = available_copies + 1, updated_at = NOW()
             WHERE id = $1 AND available_copies < total_copies",
        )
        .bind(issue.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        observability::track_book_returned(fine > 0);
        if fine > 0 {
            warn!(issue.id = %issue_id, fine_cents = fine, "Book returned late");
        } else {
            info!(issue.id = %issue_id, "Book returned");
        }

        Ok(returned)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_issues"))]
    pub async fn list_overdue(db: &PgPool) -> Result<Vec<IssueWithDetails>, AppError> {
        let issues = sqlx::query_as::<_, IssueWithDetails>(&format!(
            "{} WHERE i.status = 'issued' AND i.due_date < NOW() ORDER BY i.due_date ASC",
            ISSUE_WITH_DETAILS_SELECT
        ))
        .fetch_all(db)
        .await?;

        Ok(issues)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_issues"))]
    pub async fn history(db: &PgPool, user_id: Uuid) -> Result<Vec<IssueWithDetails>, AppError> {
        let issues = sqlx::query_as::<_, IssueWithDetails>(&format!(
            "{} WHERE i.user_id = $1 ORDER BY i.issue_date DESC",
            ISSUE_WITH_DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(issues)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_issues"))]
    pub async fn get_issue(db: &PgPool, issue_id: Uuid) -> Result<BookIssue, AppError> {
        sqlx::query_as::<_, BookIssue>(&format!(
            "SELECT {} FROM book_issues WHERE id = $1",
            ISSUE_COLUMNS
        ))
        .bind(issue_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(issue_not_found)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "fine_payments"))]
    pub async fn pay_fine(
        db: &PgPool,
        received_by: Uuid,
        issue_id: Uuid,
        dto: PayFineDto,
    ) -> Result<FinePayment, AppError> {
        let mut tx = db.begin().await?;

        let issue = sqlx::query_as::<_, BookIssue>(&format!(
            "SELECT {} FROM book_issues WHERE id = $1 FOR UPDATE",
            ISSUE_COLUMNS
        ))
        .bind(issue_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(issue_not_found)?;

        validate_fine_payment(&issue, dto.amount_cents)?;

        let payment = sqlx::query_as::<_, FinePayment>(
            "INSERT INTO fine_payments (issue_id, amount_cents, received_by, payment_mode, reference_no)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, issue_id, amount_cents, payment_date, received_by, payment_mode, reference_no, created_at",
        )
        .bind(issue_id)
        .bind(dto.amount_cents)
        .bind(received_by)
        .bind(dto.payment_mode)
        .bind(&dto.reference_no)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE book_issues SET fine_paid = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(issue_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        observability::track_fine_paid(payment.amount_cents);
        info!(issue.id = %issue_id, payment.id = %payment.id, amount_cents = payment.amount_cents, "Fine paid");

        Ok(payment)
    }
}
