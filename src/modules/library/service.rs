//! Catalogue and library cards.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rand::Rng;
use schoolhub_config::LibraryConfig;
use schoolhub_core::{AppError, PaginationMeta, contains_pattern};
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::model::{
    Book, BookCategory, BookFilterParams, CardStatus, CreateBookDto, CreateCategoryDto,
    LibraryCard, PaginatedBooksResponse, UpdateBookDto,
};

const BOOK_COLUMNS: &str = "id, isbn, title, author, publisher, publication_year, edition, \
    category_id, price_cents, pages, description, cover_image, total_copies, available_copies, \
    rack_number, is_active, created_at, updated_at";

const CARD_COLUMNS: &str =
    "id, user_id, card_number, issue_date, expiry_date, status, max_books, created_at, updated_at";

/// `LIB-YYYYMMDD-NNNNNN`, six random digits.
pub fn generate_card_number<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    format!(
        "LIB-{}-{:06}",
        date.format("%Y%m%d"),
        rng.gen_range(0..1_000_000u32)
    )
}

pub const MAX_CARD_VALIDITY_YEARS: i32 = 100;

pub fn card_expiry(issued: DateTime<Utc>, years: i32) -> DateTime<Utc> {
    u32::try_from(years.max(1))
        .ok()
        .and_then(|years| years.checked_mul(12))
        .and_then(|months| issued.checked_add_months(Months::new(months)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Missing or non-positive requests fall back to the configured validity.
/// Longer requests are capped at [`MAX_CARD_VALIDITY_YEARS`].
pub fn validity_years(requested: Option<i32>, config: &LibraryConfig) -> i32 {
    match requested {
        Some(years) if years > 0 => years.min(MAX_CARD_VALIDITY_YEARS),
        _ => config.card_validity_years,
    }
}

/// New `available_copies` after `total_copies` changes to `new_total`.
/// The copies on loan stay on loan, so the total cannot drop below them.
pub fn adjust_available_copies(
    total: i32,
    available: i32,
    new_total: i32,
) -> Result<i32, AppError> {
    let on_loan = total - available;
    if new_total < on_loan {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Total copies cannot be less than the {} copies currently on loan",
            on_loan
        )));
    }
    Ok(available + (new_total - total))
}

/// Whether an existing card blocks issuing a new one.
pub fn card_is_current(card: &LibraryCard, now: DateTime<Utc>) -> bool {
    card.status == CardStatus::Active && card.expiry_date > now
}

fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow::anyhow!("{}", message));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow::anyhow!("Category not found"));
        }
    }
    error!(error = %e, "Database error writing library record");
    AppError::from(e)
}

fn book_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Book not found"))
}

pub struct LibraryService;

impl LibraryService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "book_categories"))]
    pub async fn create_category(
        db: &PgPool,
        dto: CreateCategoryDto,
    ) -> Result<BookCategory, AppError> {
        let category = sqlx::query_as::<_, BookCategory>(
            "INSERT INTO book_categories (name, description) VALUES ($1, $2)
             RETURNING id, name, description, is_active, created_at, updated_at",
        )
        .bind(dto.name.trim())
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "Category already exists"))?;

        info!(category.id = %category.id, "Book category created");
        Ok(category)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "book_categories"))]
    pub async fn list_categories(db: &PgPool) -> Result<Vec<BookCategory>, AppError> {
        let categories = sqlx::query_as::<_, BookCategory>(
            "SELECT id, name, description, is_active, created_at, updated_at
             FROM book_categories WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(db)
        .await?;

        Ok(categories)
    }

    #[instrument(skip(db, dto), fields(book.isbn = %dto.isbn, db.operation = "INSERT", db.table = "books"))]
    pub async fn create_book(db: &PgPool, dto: CreateBookDto) -> Result<Book, AppError> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (isbn, title, author, publisher, publication_year, edition, category_id,
                                price_cents, pages, description, cover_image, total_copies,
                                available_copies, rack_number)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12, $13)
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(dto.isbn.trim())
        .bind(dto.title.trim())
        .bind(dto.author.trim())
        .bind(&dto.publisher)
        .bind(dto.publication_year)
        .bind(&dto.edition)
        .bind(dto.category_id)
        .bind(dto.price_cents)
        .bind(dto.pages)
        .bind(&dto.description)
        .bind(&dto.cover_image)
        .bind(dto.total_copies)
        .bind(&dto.rack_number)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this ISBN already exists"))?;

        info!(book.id = %book.id, "Book created");
        Ok(book)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "books"))]
    pub async fn list_books(
        db: &PgPool,
        filters: BookFilterParams,
    ) -> Result<PaginatedBooksResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE is_active = TRUE");
        let mut params: Vec<String> = Vec::new();

        if let Some(category_id) = filters.category_id {
            params.push(category_id.to_string());
            where_clause.push_str(&format!(" AND category_id = ${}::uuid", params.len()));
        }

        if let Some(search) = &filters.search {
            params.push(contains_pattern(search));
            where_clause.push_str(&format!(
                " AND (title ILIKE ${n} ESCAPE '\\' OR author ILIKE ${n} ESCAPE '\\' \
                 OR isbn ILIKE ${n} ESCAPE '\\')",
                n = params.len()
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM books{}", where_clause);
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {} FROM books{} ORDER BY title ASC LIMIT {} OFFSET {}",
            BOOK_COLUMNS, where_clause, limit, offset
        );
        let mut data_sql = sqlx::query_as::<_, Book>(&data_query);
        for param in &params {
            data_sql = data_sql.bind(param);
        }
        let books = data_sql.fetch_all(db).await?;

        debug!(total, returned = books.len(), "Books fetched");

        Ok(PaginatedBooksResponse {
            data: books,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "books"))]
    pub async fn get_book(db: &PgPool, book_id: Uuid) -> Result<Book, AppError> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1 AND is_active = TRUE",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(book_not_found)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "books"))]
    pub async fn update_book(
        db: &PgPool,
        book_id: Uuid,
        dto: UpdateBookDto,
    ) -> Result<Book, AppError> {
        let mut tx = db.begin().await?;

        let current = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1 AND is_active = TRUE FOR UPDATE",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(book_not_found)?;

        let (total_copies, available_copies) = match dto.total_copies {
            Some(new_total) => (
                new_total,
                adjust_available_copies(
                    current.total_copies,
                    current.available_copies,
                    new_total,
                )?,
            ),
            None => (current.total_copies, current.available_copies),
        };

        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                publisher = COALESCE($4, publisher),
                publication_year = COALESCE($5, publication_year),
                edition = COALESCE($6, edition),
                category_id = COALESCE($7, category_id),
                price_cents = COALESCE($8, price_cents),
                pages = COALESCE($9, pages),
                description = COALESCE($10, description),
                cover_image = COALESCE($11, cover_image),
                total_copies = $12,
                available_copies = $13,
                rack_number = COALESCE($14, rack_number),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .bind(dto.title.as_deref().map(str::trim))
        .bind(dto.author.as_deref().map(str::trim))
        .bind(dto.publisher)
        .bind(dto.publication_year)
        .bind(dto.edition)
        .bind(dto.category_id)
        .bind(dto.price_cents)
        .bind(dto.pages)
        .bind(dto.description)
        .bind(dto.cover_image)
        .bind(total_copies)
        .bind(available_copies)
        .bind(dto.rack_number)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "A book with this ISBN already exists"))?;

        tx.commit().await?;

        info!(book.id = %book.id, total_copies, available_copies, "Book updated");
        Ok(book)
    }

    /// Soft delete; issue history keeps pointing at the row.
    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "books"))]
    pub async fn delete_book(db: &PgPool, book_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE books SET is_active = FALSE, updated_at = NOW()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(book_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(book_not_found());
        }

        info!(book.id = %book_id, "Book deactivated");
        Ok(())
    }

    /// Issues a card, or renews an expired or blocked one in place.
    #[instrument(skip(db, config), fields(db.operation = "UPSERT", db.table = "library_cards"))]
    pub async fn issue_card(
        db: &PgPool,
        config: &LibraryConfig,
        user_id: Uuid,
        valid_for_years: Option<i32>,
    ) -> Result<LibraryCard, AppError> {
        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(db)
                .await?;

        if !user_exists {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let now = Utc::now();
        let years = validity_years(valid_for_years, config);
        let expiry = card_expiry(now, years);
        let card_number = generate_card_number(now.date_naive(), &mut rand::thread_rng());

        let existing = Self::find_card(db, user_id).await?;

        let card = match existing {
            Some(card) if card_is_current(&card, now) => {
                return Err(AppError::conflict(anyhow::anyhow!(
                    "User already has an active library card"
                )));
            }
            Some(card) => {
                let renewed = sqlx::query_as::<_, LibraryCard>(&format!(
                    "UPDATE library_cards SET
                        card_number = $2, issue_date = $3, expiry_date = $4,
                        status = 'active', updated_at = NOW()
                     WHERE id = $1
                     RETURNING {}",
                    CARD_COLUMNS
                ))
                .bind(card.id)
                .bind(&card_number)
                .bind(now)
                .bind(expiry)
                .fetch_one(db)
                .await
                .map_err(|e| conflict_on_unique(e, "Card number already in use, please retry"))?;

                info!(card.id = %renewed.id, previous_status = ?card.status, "Library card renewed");
                renewed
            }
            None => {
                let created = sqlx::query_as::<_, LibraryCard>(&format!(
                    "INSERT INTO library_cards (user_id, card_number, issue_date, expiry_date, max_books)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING {}",
                    CARD_COLUMNS
                ))
                .bind(user_id)
                .bind(&card_number)
                .bind(now)
                .bind(expiry)
                .bind(config.default_max_books)
                .fetch_one(db)
                .await
                .map_err(|e| conflict_on_unique(e, "User already has a library card"))?;

                info!(card.id = %created.id, "Library card issued");
                created
            }
        };

        Ok(card)
    }

    async fn find_card(db: &PgPool, user_id: Uuid) -> Result<Option<LibraryCard>, AppError> {
        let card = sqlx::query_as::<_, LibraryCard>(&format!(
            "SELECT {} FROM library_cards WHERE user_id = $1",
            CARD_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(card)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "library_cards"))]
    pub async fn get_card(db: &PgPool, user_id: Uuid) -> Result<LibraryCard, AppError> {
        Self::find_card(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Library card not found")))
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "library_cards"))]
    pub async fn update_card_status(
        db: &PgPool,
        user_id: Uuid,
        status: CardStatus,
    ) -> Result<LibraryCard, AppError> {
        let card = sqlx::query_as::<_, LibraryCard>(&format!(
            "UPDATE library_cards SET status = $2, updated_at = NOW()
             WHERE user_id = $1
             RETURNING {}",
            CARD_COLUMNS
        ))
        .bind(user_id)
        .bind(status)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Library card not found")))?;

        info!(card.id = %card.id, status = ?status, "Library card status changed");
        Ok(card)
    }
}
