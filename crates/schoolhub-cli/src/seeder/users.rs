use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use rayon::prelude::*;
use schoolhub_auth::UserRole;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::SEED_EMAIL_DOMAIN;
use super::models::UserSeed;

/// Seeded accounts sign in with `<role>123!`, e.g. `teacher123!`.
pub fn seed_password(role: UserRole) -> String {
    format!("{}123!", role.as_str())
}

/// bcrypt is slow; hash each role's shared password once, in parallel, at
/// a low cost. Production accounts use the default cost.
pub fn hash_role_passwords(
    roles: &[UserRole],
) -> Result<Vec<(UserRole, String)>, bcrypt::BcryptError> {
    roles
        .par_iter()
        .map(|&role| bcrypt::hash(seed_password(role), 4).map(|hash| (role, hash)))
        .collect()
}

pub fn seed_email(first_name: &str, last_name: &str, role: UserRole, idx: usize) -> String {
    format!(
        "{}.{}+{}{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        role.as_str(),
        idx,
        SEED_EMAIL_DOMAIN
    )
}

pub fn generate_users(count: usize, role: UserRole, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            UserSeed {
                email: seed_email(&first_name, &last_name, role, idx),
                first_name,
                last_name,
                password_hash: password_hash.to_string(),
                role,
            }
        })
        .collect()
}

/// 5 params per user
const BATCH_SIZE: usize = 1000;

pub async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let mut query = String::from(
            "INSERT INTO users (first_name, last_name, email, password_hash, role) VALUES ",
        );
        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let p = i * 5;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${}, ${})",
                p + 1,
                p + 2,
                p + 3,
                p + 4,
                p + 5
            ));
        }
        query.push_str(" ON CONFLICT (email) DO NOTHING RETURNING id");

        let mut q = sqlx::query_scalar::<_, Uuid>(&query);
        for user in chunk {
            q = q
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role);
        }
        ids.extend(q.fetch_all(&mut *tx).await?);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

pub async fn clear_users(db: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1 AND role <> 'admin'")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_email_is_unique_per_index() {
        let a = seed_email("Ada", "Lovelace", UserRole::Student, 1);
        let b = seed_email("Ada", "Lovelace", UserRole::Student, 2);
        assert_eq!(a, "ada.lovelace+student1@example.com");
        assert_ne!(a, b);
    }

    #[test]
    fn test_generate_users_assigns_role() {
        let users = generate_users(10, UserRole::Teacher, "hash");
        assert_eq!(users.len(), 10);
        assert!(users.iter().all(|u| u.role == UserRole::Teacher));
        assert!(users.iter().all(|u| u.email.ends_with("@example.com")));
    }

    #[test]
    fn test_role_passwords_verify() {
        let hashes = hash_role_passwords(&[UserRole::Teacher, UserRole::Student]).unwrap();
        for (role, hash) in hashes {
            assert!(bcrypt::verify(seed_password(role), &hash).unwrap());
        }
    }
}
