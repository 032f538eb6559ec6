use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Words;
use fake::faker::name::en::Name;
use rayon::prelude::*;
use sqlx::PgPool;
use uuid::Uuid;

use super::SEED_ISBN_PREFIX;
use super::models::BookSeed;

pub const CATEGORIES: &[&str] = &["Fiction", "Science", "History", "Mathematics", "Reference"];

pub fn seed_isbn(idx: usize) -> String {
    format!("{}{:09}", SEED_ISBN_PREFIX, idx + 1)
}

fn title_case(words: Vec<String>) -> String {
    words
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn generate_books(count: usize) -> Vec<BookSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| BookSeed {
            isbn: seed_isbn(idx),
            title: title_case(Words(2..5).fake()),
            author: Name().fake(),
            publisher: CompanyName().fake(),
            publication_year: (1950..2025).fake(),
            pages: (80..900).fake(),
            total_copies: (1..6).fake(),
            category: CATEGORIES[idx % CATEGORIES.len()],
        })
        .collect()
}

pub async fn insert_books(db: &PgPool, books: &[BookSeed]) -> Result<u64, sqlx::Error> {
    let mut tx = db.begin().await?;

    for name in CATEGORIES {
        sqlx::query("INSERT INTO book_categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    let mut inserted = 0;
    for book in books {
        let category_id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM book_categories WHERE name = $1")
                .bind(book.category)
                .fetch_optional(&mut *tx)
                .await?;

        inserted += sqlx::query(
            "INSERT INTO books (isbn, title, author, publisher, publication_year, pages,
                                category_id, total_copies, available_copies)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             ON CONFLICT (isbn) DO NOTHING",
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(book.pages)
        .bind(category_id)
        .bind(book.total_copies)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn clear_books(db: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM books WHERE isbn LIKE $1")
        .bind(format!("{}%", SEED_ISBN_PREFIX))
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_isbn_length() {
        let isbn = seed_isbn(0);
        assert_eq!(isbn, "SEED000000001");
        assert!((10..=20).contains(&isbn.len()));
    }

    #[test]
    fn test_generated_books_are_consistent() {
        let books = generate_books(12);
        assert_eq!(books.len(), 12);
        for book in &books {
            assert!(book.total_copies >= 1);
            assert!(CATEGORIES.contains(&book.category));
            assert!(!book.title.is_empty());
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(
            title_case(vec!["quick".to_string(), "fox".to_string()]),
            "Quick Fox"
        );
    }
}
